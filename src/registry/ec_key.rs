use minicbor::encode::Write;
use minicbor::{Decoder, Encoder};

use super::{cbor, Error, RegistryItem, RegistryType, CRYPTO_ECKEY};

const CURVE: u64 = 1;
const PRIVATE: u64 = 2;
const DATA: u64 = 3;

/// A bare elliptic-curve key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CryptoECKey {
    curve: Option<u64>,
    is_private_key: Option<bool>,
    data: Vec<u8>,
}

impl CryptoECKey {
    /// # Errors
    ///
    /// Fails for empty key data.
    pub fn new(
        curve: Option<u64>,
        is_private_key: Option<bool>,
        data: Vec<u8>,
    ) -> Result<Self, Error> {
        if data.is_empty() {
            return Err(Error::InvalidArgument("key data must not be empty".into()));
        }
        Ok(Self {
            curve,
            is_private_key,
            data,
        })
    }

    /// The curve, `0` (secp256k1) when unset.
    #[must_use]
    pub fn curve(&self) -> u64 {
        self.curve.unwrap_or(0)
    }

    #[must_use]
    pub fn is_private_key(&self) -> bool {
        self.is_private_key.unwrap_or(false)
    }

    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl RegistryItem for CryptoECKey {
    fn registry_type() -> RegistryType {
        CRYPTO_ECKEY
    }

    fn encode_cbor<W: Write>(
        &self,
        e: &mut Encoder<W>,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.map(1 + u64::from(self.curve.is_some()) + u64::from(self.is_private_key.is_some()))?;
        if let Some(curve) = self.curve {
            e.u64(CURVE)?.u64(curve)?;
        }
        if let Some(private) = self.is_private_key {
            e.u64(PRIVATE)?.bool(private)?;
        }
        e.u64(DATA)?.bytes(&self.data)?;
        Ok(())
    }

    fn decode_cbor(d: &mut Decoder<'_>) -> Result<Self, Error> {
        let ur_type = CRYPTO_ECKEY.ur_type();
        let (mut curve, mut is_private_key, mut data) = (None, None, None);
        cbor::decode_map(d, |key, d| {
            match key {
                CURVE => curve = Some(d.u64()?),
                PRIVATE => is_private_key = Some(d.bool()?),
                DATA => data = Some(d.bytes()?.to_vec()),
                _ => d.skip()?,
            }
            Ok(())
        })?;
        let data = cbor::required(data, ur_type, "data")?;
        Self::new(curve, is_private_key, data)
            .map_err(|_| cbor::invalid(ur_type, "data", "must not be empty"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "8c05c4b4f3e88840a4f4b5f155cfd69473ea169f3d0431b7a6787a23777f08aa";
    const CBOR: &str =
        "a202f50358208c05c4b4f3e88840a4f4b5f155cfd69473ea169f3d0431b7a6787a23777f08aa";

    #[test]
    fn test_encode() {
        let key = CryptoECKey::new(None, Some(true), hex::decode(KEY).unwrap()).unwrap();
        assert_eq!(hex::encode(key.to_bytes().unwrap()), CBOR);

        let mut encoder = key.to_ur_encoder(1000).unwrap();
        assert!(encoder.is_single_part());
        assert_eq!(
            encoder.single_part().unwrap(),
            "ur:crypto-eckey/oeaoykaxhdcxlkahssqzwfvslofzoxwkrewngotktbmwjkwdcmnefsaaehrlolkskncnktlbaypkrphsmyid"
        );
        assert!(encoder.next_part().unwrap().starts_with("ur:crypto-eckey/1-1/"));
    }

    #[test]
    fn test_decode() {
        let key = CryptoECKey::from_bytes(&hex::decode(CBOR).unwrap()).unwrap();
        assert_eq!(key.curve(), 0);
        assert!(key.is_private_key());
        assert_eq!(key.data(), hex::decode(KEY).unwrap());
    }

    #[test]
    fn test_decode_errors() {
        assert_eq!(
            CryptoECKey::from_bytes(&hex::decode("a102f5").unwrap()).unwrap_err(),
            Error::MissingField {
                ur_type: "crypto-eckey",
                field: "data"
            }
        );
        assert!(matches!(
            CryptoECKey::from_bytes(&hex::decode("a10340").unwrap()),
            Err(Error::InvalidField { field: "data", .. })
        ));
        assert!(CryptoECKey::new(None, None, Vec::new()).is_err());
    }
}
