use minicbor::encode::Write;
use minicbor::{Decoder, Encoder};

use crate::registry::{cbor, Error, RegistryItem, RegistryType, SOL_SIGNATURE};

const REQUEST_ID: u64 = 1;
const SIGNATURE: u64 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolSignature {
    request_id: Option<[u8; 16]>,
    signature: Vec<u8>,
}

impl SolSignature {
    /// # Errors
    ///
    /// Fails for an empty signature or a request id that isn't 16 bytes long.
    pub fn new(request_id: Option<&[u8]>, signature: Vec<u8>) -> Result<Self, Error> {
        if signature.is_empty() {
            return Err(Error::InvalidArgument("signature must not be empty".into()));
        }
        Ok(Self {
            request_id: request_id.map(cbor::check_request_id).transpose()?,
            signature,
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
}

impl RegistryItem for SolSignature {
    fn registry_type() -> RegistryType {
        SOL_SIGNATURE
    }

    fn encode_cbor<W: Write>(
        &self,
        e: &mut Encoder<W>,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.map(1 + u64::from(self.request_id.is_some()))?;
        if let Some(id) = &self.request_id {
            e.u64(REQUEST_ID)?;
            cbor::write_request_id(e, id)?;
        }
        e.u64(SIGNATURE)?.bytes(&self.signature)?;
        Ok(())
    }

    fn decode_cbor(d: &mut Decoder<'_>) -> Result<Self, Error> {
        let ur_type = SOL_SIGNATURE.ur_type();
        let (mut request_id, mut signature) = (None, None);
        cbor::decode_map(d, |key, d| {
            match key {
                REQUEST_ID => request_id = Some(cbor::request_id(d, ur_type)?),
                SIGNATURE => signature = Some(d.bytes()?.to_vec()),
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
        })
    }
}
