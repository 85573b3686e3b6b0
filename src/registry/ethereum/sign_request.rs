use minicbor::encode::Write;
use minicbor::{Decoder, Encoder};

use crate::registry::{cbor, CryptoKeyPath, Error, RegistryItem, RegistryType, ETH_SIGN_REQUEST};

const REQUEST_ID: u64 = 1;
const SIGN_DATA: u64 = 2;
const DATA_TYPE: u64 = 3;
const CHAIN_ID: u64 = 4;
const DERIVATION_PATH: u64 = 5;
const ADDRESS: u64 = 6;
const ORIGIN: u64 = 7;

/// What the signer is asked to sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataType {
    #[default]
    Transaction = 1,
    TypedData = 2,
    PersonalMessage = 3,
    TypedTransaction = 4,
}

impl TryFrom<u64> for DataType {
    type Error = u64;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Transaction),
            2 => Ok(Self::TypedData),
            3 => Ok(Self::PersonalMessage),
            4 => Ok(Self::TypedTransaction),
            other => Err(other),
        }
    }
}

/// A request for an air-gapped signer to sign Ethereum data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EthSignRequest {
    request_id: Option<[u8; 16]>,
    sign_data: Vec<u8>,
    data_type: DataType,
    chain_id: Option<u64>,
    derivation_path: CryptoKeyPath,
    address: Option<Vec<u8>>,
    origin: Option<String>,
}

impl EthSignRequest {
    /// # Errors
    ///
    /// Fails for empty `sign_data`.
    pub fn new(
        sign_data: Vec<u8>,
        data_type: DataType,
        derivation_path: CryptoKeyPath,
    ) -> Result<Self, Error> {
        if sign_data.is_empty() {
            return Err(Error::InvalidArgument("sign data must not be empty".into()));
        }
        Ok(Self {
            request_id: None,
            sign_data,
            data_type,
            chain_id: None,
            derivation_path,
            address: None,
            origin: None,
        })
    }

    /// # Errors
    ///
    /// Fails unless `request_id` is 16 bytes long.
    pub fn with_request_id(mut self, request_id: &[u8]) -> Result<Self, Error> {
        self.request_id = Some(cbor::check_request_id(request_id)?);
        Ok(self)
    }

    #[must_use]
    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    #[must_use]
    pub fn with_address(mut self, address: Vec<u8>) -> Self {
        self.address = Some(address);
        self
    }

    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    #[must_use]
    pub fn request_id(&self) -> Option<&[u8; 16]> {
        self.request_id.as_ref()
    }

    #[must_use]
    pub fn sign_data(&self) -> &[u8] {
        &self.sign_data
    }

    #[must_use]
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    #[must_use]
    pub fn chain_id(&self) -> Option<u64> {
        self.chain_id
    }

    #[must_use]
    pub fn derivation_path(&self) -> &CryptoKeyPath {
        &self.derivation_path
    }

    #[must_use]
    pub fn address(&self) -> Option<&[u8]> {
        self.address.as_deref()
    }

    #[must_use]
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }
}

impl RegistryItem for EthSignRequest {
    fn registry_type() -> RegistryType {
        ETH_SIGN_REQUEST
    }

    fn encode_cbor<W: Write>(
        &self,
        e: &mut Encoder<W>,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        let len = 3
            + u64::from(self.request_id.is_some())
            + u64::from(self.chain_id.is_some())
            + u64::from(self.address.is_some())
            + u64::from(self.origin.is_some());
        e.map(len)?;
        if let Some(id) = &self.request_id {
            e.u64(REQUEST_ID)?;
            cbor::write_request_id(e, id)?;
        }
        e.u64(SIGN_DATA)?.bytes(&self.sign_data)?;
        e.u64(DATA_TYPE)?.u8(self.data_type as u8)?;
        if let Some(chain_id) = self.chain_id {
            e.u64(CHAIN_ID)?.u64(chain_id)?;
        }
        e.u64(DERIVATION_PATH)?;
        self.derivation_path.encode_tagged(e)?;
        if let Some(address) = &self.address {
            e.u64(ADDRESS)?.bytes(address)?;
        }
        if let Some(origin) = &self.origin {
            e.u64(ORIGIN)?.str(origin)?;
        }
        Ok(())
    }

    fn decode_cbor(d: &mut Decoder<'_>) -> Result<Self, Error> {
        let ur_type = ETH_SIGN_REQUEST.ur_type();
        let (mut request_id, mut sign_data, mut data_type, mut chain_id) = (None, None, None, None);
        let (mut derivation_path, mut address, mut origin) = (None, None, None);
        cbor::decode_map(d, |key, d| {
            match key {
                REQUEST_ID => request_id = Some(cbor::request_id(d, ur_type)?),
                SIGN_DATA => sign_data = Some(d.bytes()?.to_vec()),
                DATA_TYPE => {
                    let value = d.u64()?;
                    data_type = Some(DataType::try_from(value).map_err(|other| {
                        cbor::invalid(
                            ur_type,
                            "data_type",
                            format!("expected 1 to 4, received {other}"),
                        )
                    })?);
                }
                CHAIN_ID => chain_id = Some(d.u64()?),
                DERIVATION_PATH => derivation_path = Some(CryptoKeyPath::decode_tagged(d)?),
                ADDRESS => address = Some(d.bytes()?.to_vec()),
                ORIGIN => origin = Some(d.str()?.to_owned()),
                _ => d.skip()?,
            }
            Ok(())
        })?;

        let sign_data = cbor::required(sign_data, ur_type, "sign_data")?;
        let data_type = cbor::required(data_type, ur_type, "data_type")?;
        let derivation_path = cbor::required(derivation_path, ur_type, "derivation_path")?;
        let mut request = Self::new(sign_data, data_type, derivation_path)
            .map_err(|_| cbor::invalid(ur_type, "sign_data", "must not be empty"))?;
        request.request_id = request_id;
        request.chain_id = chain_id;
        request.address = address;
        request.origin = origin;
        Ok(request)
    }
}
