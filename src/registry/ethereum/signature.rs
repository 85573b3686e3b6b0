use minicbor::encode::Write;
use minicbor::{Decoder, Encoder};

use crate::registry::{cbor, Error, RegistryItem, RegistryType, ETH_SIGNATURE};

const REQUEST_ID: u64 = 1;
const SIGNATURE: u64 = 2;
const ORIGIN: u64 = 3;

/// The signature an air-gapped signer returns for an [`EthSignRequest`].
///
/// [`EthSignRequest`]: super::EthSignRequest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EthSignature {
    request_id: Option<[u8; 16]>,
    signature: Vec<u8>,
    origin: Option<String>,
}

impl EthSignature {
    /// # Errors
    ///
    /// Fails for an empty signature or a request id that isn't 16 bytes long.
    pub fn new(
        request_id: Option<&[u8]>,
        signature: Vec<u8>,
        origin: Option<String>,
    ) -> Result<Self, Error> {
        if signature.is_empty() {
            return Err(Error::InvalidArgument("signature must not be empty".into()));
        }
        Ok(Self {
            request_id: request_id.map(cbor::check_request_id).transpose()?,
            signature,
            origin,
        })
    }

    #[must_use]
    pub fn request_id(&self) -> Option<&[u8; 16]> {
        self.request_id.as_ref()
    }

    #[must_use]
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    #[must_use]
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }
}

impl RegistryItem for EthSignature {
    fn registry_type() -> RegistryType {
        ETH_SIGNATURE
    }

    fn encode_cbor<W: Write>(
        &self,
        e: &mut Encoder<W>,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.map(1 + u64::from(self.request_id.is_some()) + u64::from(self.origin.is_some()))?;
        if let Some(id) = &self.request_id {
            e.u64(REQUEST_ID)?;
            cbor::write_request_id(e, id)?;
        }
        e.u64(SIGNATURE)?.bytes(&self.signature)?;
        if let Some(origin) = &self.origin {
            e.u64(ORIGIN)?.str(origin)?;
        }
        Ok(())
    }

    fn decode_cbor(d: &mut Decoder<'_>) -> Result<Self, Error> {
        let ur_type = ETH_SIGNATURE.ur_type();
        let (mut request_id, mut signature, mut origin) = (None, None, None);
        cbor::decode_map(d, |key, d| {
            match key {
                REQUEST_ID => request_id = Some(cbor::request_id(d, ur_type)?),
                SIGNATURE => signature = Some(d.bytes()?.to_vec()),
                ORIGIN => origin = Some(d.str()?.to_owned()),
                _ => d.skip()?,
            }
            Ok(())
        })?;
        let signature = cbor::required(signature, ur_type, "signature")?;
        if signature.is_empty() {
            return Err(cbor::invalid(ur_type, "signature", "must not be empty"));
        }
        Ok(Self {
            request_id,
            signature,
            origin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CBOR: &str = "a301d825509b1deb4d3b7d4bad9bdd2b0d7b3dcb6d0258410102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f202122232425262728292a2b2c2d2e2f303132333435363738393a3b3c3d3e3f404103686d6574616d61736b";

    #[test]
    fn test_round_trip() {
        let id = hex::decode("9b1deb4d3b7d4bad9bdd2b0d7b3dcb6d").unwrap();
        let signature: Vec<u8> = (1..=65).collect();
        let value =
            EthSignature::new(Some(id.as_slice()), signature.clone(), Some("metamask".into()))
                .unwrap();
        assert_eq!(hex::encode(value.to_bytes().unwrap()), CBOR);

        let decoded = EthSignature::from_bytes(&hex::decode(CBOR).unwrap()).unwrap();
        assert_eq!(decoded.request_id().unwrap()[..], id[..]);
        assert_eq!(decoded.signature(), signature);
        assert_eq!(decoded.origin(), Some("metamask"));
        assert_eq!(decoded, value);
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            EthSignature::new(Some(&[1, 2, 3][..]), vec![1], None),
            Err(Error::InvalidArgument(_))
        ));
        assert!(EthSignature::new(None, Vec::new(), None).is_err());
        assert_eq!(
            EthSignature::from_bytes(&hex::decode("a103636b6579").unwrap()).unwrap_err(),
            Error::MissingField {
                ur_type: "eth-signature",
                field: "signature"
            }
        );
        // request id without the uuid tag
        assert_eq!(
            EthSignature::from_bytes(
                &hex::decode("a20150000000000000000000000000000000000241ff").unwrap()
            )
            .unwrap_err(),
            Error::UnexpectedTag {
                expected: 37,
                found: None
            }
        );
    }
}
