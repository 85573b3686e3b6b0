use minicbor::encode::Write;
use minicbor::{Decoder, Encoder};

use super::{cbor, Error, RegistryItem, RegistryType, CRYPTO_PSBT};

/// A partially signed Bitcoin transaction, carried as an opaque byte string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CryptoPSBT {
    psbt: Vec<u8>,
}

impl CryptoPSBT {
    /// # Errors
    ///
    /// Fails for an empty transaction.
    pub fn new(psbt: Vec<u8>) -> Result<Self, Error> {
        if psbt.is_empty() {
            return Err(Error::InvalidArgument("psbt must not be empty".into()));
        }
        Ok(Self { psbt })
    }

    #[must_use]
    pub fn psbt(&self) -> &[u8] {
        &self.psbt
    }
}

impl RegistryItem for CryptoPSBT {
    fn registry_type() -> RegistryType {
        CRYPTO_PSBT
    }

    fn encode_cbor<W: Write>(
        &self,
        e: &mut Encoder<W>,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.bytes(&self.psbt)?;
        Ok(())
    }

    fn decode_cbor(d: &mut Decoder<'_>) -> Result<Self, Error> {
        Self::new(d.bytes()?.to_vec())
            .map_err(|_| cbor::invalid(CRYPTO_PSBT.ur_type(), "psbt", "must not be empty"))
    }
}
