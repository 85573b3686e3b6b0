use minicbor::encode::Write;
use minicbor::{Decoder, Encoder};

use super::{cbor, CryptoHDKey, Error, RegistryItem, RegistryType, CRYPTO_MULTI_ACCOUNTS};

const MASTER_FINGERPRINT: u64 = 1;
const KEYS: u64 = 2;
const DEVICE: u64 = 3;

/// A batch of derived keys exported by one device for one master key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CryptoMultiAccounts {
    master_fingerprint: u32,
    keys: Vec<CryptoHDKey>,
    device: Option<String>,
}

impl CryptoMultiAccounts {
    /// # Errors
    ///
    /// Fails if `keys` is empty.
    pub fn new(
        master_fingerprint: u32,
        keys: Vec<CryptoHDKey>,
        device: Option<String>,
    ) -> Result<Self, Error> {
        if keys.is_empty() {
            return Err(Error::InvalidArgument("at least one key is required".into()));
        }
        Ok(Self {
            master_fingerprint,
            keys,
            device,
        })
    }

    #[must_use]
    pub fn master_fingerprint(&self) -> u32 {
        self.master_fingerprint
    }

    #[must_use]
    pub fn keys(&self) -> &[CryptoHDKey] {
        &self.keys
    }

    #[must_use]
    pub fn device(&self) -> Option<&str> {
        self.device.as_deref()
    }
}

impl RegistryItem for CryptoMultiAccounts {
    fn registry_type() -> RegistryType {
        CRYPTO_MULTI_ACCOUNTS
    }

    fn encode_cbor<W: Write>(
        &self,
        e: &mut Encoder<W>,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.map(2 + u64::from(self.device.is_some()))?;
        e.u64(MASTER_FINGERPRINT)?.u32(self.master_fingerprint)?;
        e.u64(KEYS)?.array(self.keys.len() as u64)?;
        for key in &self.keys {
            key.encode_tagged(e)?;
        }
        if let Some(device) = &self.device {
            e.u64(DEVICE)?.str(device)?;
        }
        Ok(())
    }

    fn decode_cbor(d: &mut Decoder<'_>) -> Result<Self, Error> {
        let ur_type = CRYPTO_MULTI_ACCOUNTS.ur_type();
        let (mut master_fingerprint, mut keys, mut device) = (None, None, None);
        cbor::decode_map(d, |key, d| {
            match key {
                MASTER_FINGERPRINT => master_fingerprint = Some(d.u32()?),
                KEYS => {
                    let len = cbor::array_len(d)?;
                    keys = Some(
                        (0..len)
                            .map(|_| CryptoHDKey::decode_tagged(d))
                            .collect::<Result<Vec<_>, _>>()?,
                    );
                }
                DEVICE => device = Some(d.str()?.to_owned()),
                _ => d.skip()?,
            }
            Ok(())
        })?;
        let master_fingerprint = cbor::required(master_fingerprint, ur_type, "master_fingerprint")?;
        let keys = cbor::required(keys, ur_type, "keys")?;
        Self::new(master_fingerprint, keys, device)
            .map_err(|_| cbor::invalid(ur_type, "keys", "must not be empty"))
    }
}
