//! A handle-based surface for callers that cannot hold Rust values.
//!
//! [`Boundary`] owns every encoder, decoder and registry object it hands out
//! and gives the caller an opaque [`Handle`] instead. Arguments and results
//! are primitives, byte vectors, strings and further handles, so a thin
//! binding layer can expose the methods one to one. Handles stay valid until
//! they are passed to [`Boundary::free`]; using a freed handle is an error,
//! not undefined behavior.
//!
//! ```
//! use ur_registry::boundary::Boundary;
//!
//! let mut boundary = Boundary::default();
//! let psbt = boundary.crypto_psbt_construct(b"psbt").unwrap();
//! let encoder = boundary.object_ur_encoder(psbt).unwrap();
//! let part = boundary.ur_encoder_next_part(encoder).unwrap();
//!
//! let decoder = boundary.ur_decoder_new();
//! boundary.ur_decoder_receive(decoder, &part).unwrap();
//! assert!(boundary.ur_decoder_is_complete(decoder).unwrap());
//! let received = boundary.ur_decoder_resolve(decoder, "crypto-psbt").unwrap();
//! assert_eq!(boundary.crypto_psbt_data(received).unwrap(), b"psbt");
//!
//! for handle in [psbt, encoder, decoder, received] {
//!     boundary.free(handle);
//! }
//! assert!(boundary.is_empty());
//! ```

use tracing::{debug, trace, warn};

use crate::config::Config;
use crate::error::Error;
use crate::fountain::Progress;
use crate::handle::{Arena, Handle};
use crate::registry::ethereum::{DataType, EthSignRequest, EthSignature};
use crate::registry::solana::{SignType, SolSignRequest, SolSignature};
use crate::registry::{
    CryptoAccount, CryptoHDKey, CryptoKeyPath, CryptoMultiAccounts, CryptoOutput, CryptoPSBT,
    RegistryItem, RegistryObject, TagRegistry, Variant,
};

const UR_ENCODER: &str = "ur-encoder";
const UR_DECODER: &str = "ur-decoder";

#[derive(Debug)]
enum Object {
    Encoder(crate::ur::Encoder),
    Decoder(crate::ur::Decoder),
    Registry(RegistryObject),
}

impl Object {
    fn kind(&self) -> &'static str {
        match self {
            Self::Encoder(_) => UR_ENCODER,
            Self::Decoder(_) => UR_DECODER,
            Self::Registry(object) => object.ur_type(),
        }
    }
}

fn wrong(expected: &'static str, found: &'static str) -> Error {
    debug!(expected, found, "handle refers to another kind of object");
    Error::WrongObject { expected, found }
}

fn argument(reason: String) -> Error {
    crate::registry::Error::InvalidArgument(reason).into()
}

/// Owner of every object handed across the boundary.
#[derive(Debug)]
pub struct Boundary {
    objects: Arena<Object>,
    registry: TagRegistry,
    config: Config,
}

impl Default for Boundary {
    fn default() -> Self {
        Self {
            objects: Arena::new(),
            registry: TagRegistry::default(),
            config: Config::default(),
        }
    }
}

impl Boundary {
    /// # Errors
    ///
    /// Fails if `config` is invalid.
    pub fn new(registry: TagRegistry, config: Config) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            objects: Arena::new(),
            registry,
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of live handles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Releases the object behind `handle`.
    ///
    /// Returns whether anything was released; freeing a handle twice is a no-op.
    pub fn free(&mut self, handle: Handle) -> bool {
        match self.objects.remove(handle) {
            Some(object) => {
                trace!(handle = handle.to_raw(), kind = object.kind(), "released");
                true
            }
            None => {
                debug!(handle = handle.to_raw(), "ignoring release of stale handle");
                false
            }
        }
    }

    /// Takes ownership of a registry object built on the Rust side.
    pub fn insert(&mut self, object: impl Into<RegistryObject>) -> Handle {
        self.objects.insert(Object::Registry(object.into()))
    }

    /// Borrows the registry object behind `handle`.
    ///
    /// # Errors
    ///
    /// Fails for stale handles and handles to encoders or decoders.
    pub fn registry_object(&self, handle: Handle) -> Result<&RegistryObject, Error> {
        match self.object(handle)? {
            Object::Registry(object) => Ok(object),
            other => Err(wrong("registry object", other.kind())),
        }
    }

    fn object(&self, handle: Handle) -> Result<&Object, Error> {
        self.objects.get(handle).ok_or_else(|| {
            warn!(handle = handle.to_raw(), "stale or unknown handle");
            Error::StaleHandle
        })
    }

    fn object_mut(&mut self, handle: Handle) -> Result<&mut Object, Error> {
        self.objects.get_mut(handle).ok_or_else(|| {
            warn!(handle = handle.to_raw(), "stale or unknown handle");
            Error::StaleHandle
        })
    }

    fn item<T: Variant>(&self, handle: Handle) -> Result<&T, Error> {
        let expected = T::registry_type().ur_type();
        let object = self.registry_object(handle)?;
        T::from_object(object).ok_or_else(|| wrong(expected, object.ur_type()))
    }

    fn encoder(&mut self, handle: Handle) -> Result<&mut crate::ur::Encoder, Error> {
        match self.object_mut(handle)? {
            Object::Encoder(encoder) => Ok(encoder),
            other => Err(wrong(UR_ENCODER, other.kind())),
        }
    }

    fn decoder(&self, handle: Handle) -> Result<&crate::ur::Decoder, Error> {
        match self.object(handle)? {
            Object::Decoder(decoder) => Ok(decoder),
            other => Err(wrong(UR_DECODER, other.kind())),
        }
    }

    fn decoder_mut(&mut self, handle: Handle) -> Result<&mut crate::ur::Decoder, Error> {
        match self.object_mut(handle)? {
            Object::Decoder(decoder) => Ok(decoder),
            other => Err(wrong(UR_DECODER, other.kind())),
        }
    }

    pub fn ur_decoder_new(&mut self) -> Handle {
        self.objects
            .insert(Object::Decoder(crate::ur::Decoder::default()))
    }

    /// Feeds one scanned UR to the decoder. Upper-case input is accepted.
    ///
    /// Returns whether the part contributed new information. A rejected part
    /// leaves the decoder unchanged.
    ///
    /// # Errors
    ///
    /// Fails for stale handles and for malformed or inconsistent parts.
    pub fn ur_decoder_receive(&mut self, handle: Handle, part: &str) -> Result<bool, Error> {
        let decoder = self.decoder_mut(handle)?;
        decoder.receive(&part.to_lowercase()).map_err(|e| {
            debug!(handle = handle.to_raw(), error = %e, "rejected part");
            Error::from(e)
        })
    }

    /// # Errors
    ///
    /// Fails for stale handles.
    pub fn ur_decoder_is_complete(&self, handle: Handle) -> Result<bool, Error> {
        Ok(self.decoder(handle)?.complete())
    }

    /// # Errors
    ///
    /// Fails for stale handles.
    pub fn ur_decoder_progress(&self, handle: Handle) -> Result<Progress, Error> {
        Ok(self.decoder(handle)?.progress())
    }

    /// The UR type of the transfer, once the first part has been accepted.
    ///
    /// # Errors
    ///
    /// Fails for stale handles.
    pub fn ur_decoder_ur_type(&self, handle: Handle) -> Result<Option<String>, Error> {
        Ok(self.decoder(handle)?.ur_type().map(str::to_owned))
    }

    /// The reassembled CBOR payload.
    ///
    /// # Errors
    ///
    /// Fails for stale handles, before completion, and for payloads that fail
    /// their checksum.
    pub fn ur_decoder_result(&self, handle: Handle) -> Result<Vec<u8>, Error> {
        self.decoder(handle)?.message()?.ok_or(Error::Incomplete)
    }

    /// Decodes the completed payload as `target_type` and returns a handle to
    /// the new registry object.
    ///
    /// # Errors
    ///
    /// Fails before completion, when the transfer carries another UR type, and
    /// when the payload isn't a valid object of that type.
    pub fn ur_decoder_resolve(
        &mut self,
        handle: Handle,
        target_type: &str,
    ) -> Result<Handle, Error> {
        let decoder = self.decoder(handle)?;
        let message = decoder.message()?.ok_or(Error::Incomplete)?;
        if let Some(received) = decoder.ur_type() {
            if received != target_type {
                return Err(crate::ur::Error::TypeMismatch {
                    expected: target_type.to_owned(),
                    received: received.to_owned(),
                }
                .into());
            }
        }
        let object = self.registry.decode(target_type, &message)?;
        Ok(self.insert(object))
    }

    /// Creates an encoder for an arbitrary payload of the given UR type.
    ///
    /// # Errors
    ///
    /// Fails for an empty payload or an illegal UR type.
    pub fn ur_encoder_new(&mut self, payload: &[u8], ur_type: &str) -> Result<Handle, Error> {
        let encoder = crate::ur::Encoder::new(payload, self.config.max_fragment_length, ur_type)?;
        let encoder = match self.config.max_degree {
            Some(max_degree) => encoder.with_max_degree(max_degree)?,
            None => encoder,
        };
        Ok(self.objects.insert(Object::Encoder(encoder)))
    }

    /// Creates an encoder streaming the registry object behind `handle`.
    ///
    /// # Errors
    ///
    /// Fails for stale handles and handles that aren't registry objects.
    pub fn object_ur_encoder(&mut self, handle: Handle) -> Result<Handle, Error> {
        let encoder = self.registry_object(handle)?.to_ur_encoder_with(&self.config)?;
        Ok(self.objects.insert(Object::Encoder(encoder)))
    }

    /// The next UR to display.
    ///
    /// A payload that fits one fragment is always rendered in single-part form.
    ///
    /// # Errors
    ///
    /// Fails for stale handles.
    pub fn ur_encoder_next_part(&mut self, handle: Handle) -> Result<String, Error> {
        let config = self.config;
        let encoder = self.encoder(handle)?;
        let part = if encoder.is_single_part() {
            encoder.single_part()?
        } else {
            encoder.next_part()?
        };
        Ok(config.render(part))
    }

    /// # Errors
    ///
    /// Fails for stale handles.
    pub fn ur_encoder_is_single(&mut self, handle: Handle) -> Result<bool, Error> {
        Ok(self.encoder(handle)?.is_single_part())
    }

    /// # Errors
    ///
    /// Fails for stale handles.
    pub fn ur_encoder_fragment_count(&mut self, handle: Handle) -> Result<usize, Error> {
        Ok(self.encoder(handle)?.fragment_count())
    }

    /// # Errors
    ///
    /// Fails for empty data.
    pub fn crypto_psbt_construct(&mut self, data: &[u8]) -> Result<Handle, Error> {
        Ok(self.insert(CryptoPSBT::new(data.to_vec())?))
    }

    /// # Errors
    ///
    /// Fails for stale or mistyped handles.
    pub fn crypto_psbt_data(&self, handle: Handle) -> Result<Vec<u8>, Error> {
        Ok(self.item::<CryptoPSBT>(handle)?.psbt().to_vec())
    }

    /// Builds a derived public key with an optional origin path.
    ///
    /// # Errors
    ///
    /// Fails for empty key data, a chain code that isn't 32 bytes long, or a
    /// malformed path.
    pub fn crypto_hd_key_construct(
        &mut self,
        key: &[u8],
        chain_code: Option<&[u8]>,
        path: Option<&str>,
        source_fingerprint: Option<u32>,
        name: Option<&str>,
    ) -> Result<Handle, Error> {
        let mut hd_key = CryptoHDKey::new_extended_key(key.to_vec())?;
        if let Some(chain_code) = chain_code {
            hd_key = hd_key.with_chain_code(chain_code.to_vec())?;
        }
        if let Some(path) = path {
            hd_key = hd_key.with_origin(CryptoKeyPath::from_path(path, source_fingerprint)?);
        }
        if let Some(name) = name {
            hd_key = hd_key.with_name(name);
        }
        Ok(self.insert(hd_key))
    }

    /// # Errors
    ///
    /// Fails for stale or mistyped handles.
    pub fn crypto_hd_key_key_data(&self, handle: Handle) -> Result<Vec<u8>, Error> {
        Ok(self.item::<CryptoHDKey>(handle)?.key().to_vec())
    }

    /// # Errors
    ///
    /// Fails for stale or mistyped handles.
    pub fn crypto_hd_key_chain_code(&self, handle: Handle) -> Result<Option<Vec<u8>>, Error> {
        Ok(self.item::<CryptoHDKey>(handle)?.chain_code().map(<[u8]>::to_vec))
    }

    /// # Errors
    ///
    /// Fails for stale or mistyped handles.
    pub fn crypto_hd_key_is_private(&self, handle: Handle) -> Result<bool, Error> {
        Ok(self.item::<CryptoHDKey>(handle)?.is_private_key())
    }

    /// # Errors
    ///
    /// Fails for stale or mistyped handles.
    pub fn crypto_hd_key_name(&self, handle: Handle) -> Result<Option<String>, Error> {
        Ok(self.item::<CryptoHDKey>(handle)?.name().map(str::to_owned))
    }

    /// # Errors
    ///
    /// Fails for stale or mistyped handles.
    pub fn crypto_hd_key_note(&self, handle: Handle) -> Result<Option<String>, Error> {
        Ok(self.item::<CryptoHDKey>(handle)?.note().map(str::to_owned))
    }

    /// The origin path, such as `44'/501'/0'/0'`.
    ///
    /// # Errors
    ///
    /// Fails for stale or mistyped handles.
    pub fn crypto_hd_key_path(&self, handle: Handle) -> Result<Option<String>, Error> {
        Ok(self
            .item::<CryptoHDKey>(handle)?
            .origin()
            .and_then(CryptoKeyPath::path))
    }

    /// # Errors
    ///
    /// Fails for stale or mistyped handles.
    pub fn crypto_hd_key_source_fingerprint(&self, handle: Handle) -> Result<Option<u32>, Error> {
        Ok(self.item::<CryptoHDKey>(handle)?.source_fingerprint())
    }

    /// # Errors
    ///
    /// Fails for stale or mistyped handles.
    pub fn crypto_hd_key_parent_fingerprint(&self, handle: Handle) -> Result<Option<u32>, Error> {
        Ok(self.item::<CryptoHDKey>(handle)?.parent_fingerprint())
    }

    /// # Errors
    ///
    /// Fails for stale or mistyped handles.
    pub fn crypto_hd_key_account_index(
        &self,
        handle: Handle,
        level: usize,
    ) -> Result<Option<u32>, Error> {
        Ok(self.item::<CryptoHDKey>(handle)?.account_index(level))
    }

    /// # Errors
    ///
    /// Fails for stale or mistyped handles.
    pub fn crypto_hd_key_depth(&self, handle: Handle) -> Result<Option<u8>, Error> {
        Ok(self.item::<CryptoHDKey>(handle)?.depth())
    }

    /// # Errors
    ///
    /// Fails for stale or mistyped handles.
    pub fn crypto_hd_key_bip32_key(&self, handle: Handle) -> Result<String, Error> {
        Ok(self.item::<CryptoHDKey>(handle)?.bip32_key())
    }

    /// # Errors
    ///
    /// Fails for stale or mistyped handles.
    pub fn crypto_multi_accounts_master_fingerprint(&self, handle: Handle) -> Result<u32, Error> {
        Ok(self.item::<CryptoMultiAccounts>(handle)?.master_fingerprint())
    }

    /// # Errors
    ///
    /// Fails for stale or mistyped handles.
    pub fn crypto_multi_accounts_device(&self, handle: Handle) -> Result<Option<String>, Error> {
        Ok(self
            .item::<CryptoMultiAccounts>(handle)?
            .device()
            .map(str::to_owned))
    }

    /// # Errors
    ///
    /// Fails for stale or mistyped handles.
    pub fn crypto_multi_accounts_keys_len(&self, handle: Handle) -> Result<usize, Error> {
        Ok(self.item::<CryptoMultiAccounts>(handle)?.keys().len())
    }

    /// Returns a new handle to a copy of the key at `index`.
    ///
    /// # Errors
    ///
    /// Fails for stale or mistyped handles and out-of-range indexes.
    pub fn crypto_multi_accounts_key(
        &mut self,
        handle: Handle,
        index: usize,
    ) -> Result<Handle, Error> {
        let keys = self.item::<CryptoMultiAccounts>(handle)?.keys();
        let key = keys.get(index).cloned().ok_or(Error::OutOfRange {
            index,
            len: keys.len(),
        })?;
        Ok(self.insert(key))
    }

    /// # Errors
    ///
    /// Fails for stale or mistyped handles.
    pub fn crypto_account_master_fingerprint(&self, handle: Handle) -> Result<u32, Error> {
        Ok(self.item::<CryptoAccount>(handle)?.master_fingerprint())
    }

    /// # Errors
    ///
    /// Fails for stale or mistyped handles.
    pub fn crypto_account_outputs_len(&self, handle: Handle) -> Result<usize, Error> {
        Ok(self.item::<CryptoAccount>(handle)?.output_descriptors().len())
    }

    /// Returns a new handle to a copy of the output descriptor at `index`.
    ///
    /// # Errors
    ///
    /// Fails for stale or mistyped handles and out-of-range indexes.
    pub fn crypto_account_output(&mut self, handle: Handle, index: usize) -> Result<Handle, Error> {
        let outputs = self.item::<CryptoAccount>(handle)?.output_descriptors();
        let output = outputs.get(index).cloned().ok_or(Error::OutOfRange {
            index,
            len: outputs.len(),
        })?;
        Ok(self.insert(output))
    }

    /// The script expressions wrapped around the key, e.g. `sh(wpkh(hdkey))`.
    ///
    /// # Errors
    ///
    /// Fails for stale or mistyped handles.
    pub fn crypto_output_descriptor(&self, handle: Handle) -> Result<String, Error> {
        Ok(self.item::<CryptoOutput>(handle)?.to_string())
    }

    /// Returns a handle to a copy of the output's HD key, if it has one.
    ///
    /// # Errors
    ///
    /// Fails for stale or mistyped handles.
    pub fn crypto_output_hd_key(&mut self, handle: Handle) -> Result<Option<Handle>, Error> {
        let hd_key = self.item::<CryptoOutput>(handle)?.hd_key().cloned();
        Ok(hd_key.map(|key| self.insert(key)))
    }

    /// Builds an Ethereum sign request from positional arguments.
    ///
    /// # Errors
    ///
    /// Fails for empty sign data, an unknown data type, a request id that
    /// isn't 16 bytes long, or a malformed path.
    #[allow(clippy::too_many_arguments)]
    pub fn eth_sign_request_construct(
        &mut self,
        request_id: Option<&[u8]>,
        sign_data: &[u8],
        data_type: u32,
        chain_id: Option<u64>,
        path: &str,
        source_fingerprint: u32,
        address: Option<&[u8]>,
        origin: Option<&str>,
    ) -> Result<Handle, Error> {
        let data_type = DataType::try_from(u64::from(data_type))
            .map_err(|value| argument(format!("unknown data type {value}")))?;
        let path = CryptoKeyPath::from_path(path, Some(source_fingerprint))?;
        let mut request = EthSignRequest::new(sign_data.to_vec(), data_type, path)?;
        if let Some(request_id) = request_id {
            request = request.with_request_id(request_id)?;
        }
        if let Some(chain_id) = chain_id {
            request = request.with_chain_id(chain_id);
        }
        if let Some(address) = address {
            request = request.with_address(address.to_vec());
        }
        if let Some(origin) = origin {
            request = request.with_origin(origin);
        }
        Ok(self.insert(request))
    }

    /// # Errors
    ///
    /// Fails for stale or mistyped handles.
    pub fn eth_sign_request_request_id(&self, handle: Handle) -> Result<Option<Vec<u8>>, Error> {
        Ok(self
            .item::<EthSignRequest>(handle)?
            .request_id()
            .map(|id| id.to_vec()))
    }

    /// # Errors
    ///
    /// Fails for stale or mistyped handles.
    pub fn eth_sign_request_sign_data(&self, handle: Handle) -> Result<Vec<u8>, Error> {
        Ok(self.item::<EthSignRequest>(handle)?.sign_data().to_vec())
    }

    /// # Errors
    ///
    /// Fails for stale or mistyped handles.
    pub fn eth_sign_request_data_type(&self, handle: Handle) -> Result<u32, Error> {
        Ok(self.item::<EthSignRequest>(handle)?.data_type() as u32)
    }

    /// # Errors
    ///
    /// Fails for stale or mistyped handles.
    pub fn eth_sign_request_chain_id(&self, handle: Handle) -> Result<Option<u64>, Error> {
        Ok(self.item::<EthSignRequest>(handle)?.chain_id())
    }

    /// # Errors
    ///
    /// Fails for stale or mistyped handles.
    pub fn eth_sign_request_path(&self, handle: Handle) -> Result<Option<String>, Error> {
        Ok(self.item::<EthSignRequest>(handle)?.derivation_path().path())
    }

    /// # Errors
    ///
    /// Fails for stale or mistyped handles.
    pub fn eth_sign_request_address(&self, handle: Handle) -> Result<Option<Vec<u8>>, Error> {
        Ok(self
            .item::<EthSignRequest>(handle)?
            .address()
            .map(<[u8]>::to_vec))
    }

    /// # Errors
    ///
    /// Fails for stale or mistyped handles.
    pub fn eth_sign_request_origin(&self, handle: Handle) -> Result<Option<String>, Error> {
        Ok(self
            .item::<EthSignRequest>(handle)?
            .origin()
            .map(str::to_owned))
    }

    /// # Errors
    ///
    /// Fails for an empty signature or a request id that isn't 16 bytes long.
    pub fn eth_signature_construct(
        &mut self,
        request_id: Option<&[u8]>,
        signature: &[u8],
        origin: Option<&str>,
    ) -> Result<Handle, Error> {
        let signature =
            EthSignature::new(request_id, signature.to_vec(), origin.map(str::to_owned))?;
        Ok(self.insert(signature))
    }

    /// # Errors
    ///
    /// Fails for stale or mistyped handles.
    pub fn eth_signature_request_id(&self, handle: Handle) -> Result<Option<Vec<u8>>, Error> {
        Ok(self
            .item::<EthSignature>(handle)?
            .request_id()
            .map(|id| id.to_vec()))
    }

    /// # Errors
    ///
    /// Fails for stale or mistyped handles.
    pub fn eth_signature_signature(&self, handle: Handle) -> Result<Vec<u8>, Error> {
        Ok(self.item::<EthSignature>(handle)?.signature().to_vec())
    }

    /// # Errors
    ///
    /// Fails for stale or mistyped handles.
    pub fn eth_signature_origin(&self, handle: Handle) -> Result<Option<String>, Error> {
        Ok(self.item::<EthSignature>(handle)?.origin().map(str::to_owned))
    }

    /// Builds a Solana sign request from positional arguments.
    ///
    /// # Errors
    ///
    /// Fails for empty sign data, an unknown sign type, a request id that
    /// isn't 16 bytes long, or a malformed path.
    #[allow(clippy::too_many_arguments)]
    pub fn sol_sign_request_construct(
        &mut self,
        request_id: Option<&[u8]>,
        sign_data: &[u8],
        path: &str,
        source_fingerprint: u32,
        address: Option<&[u8]>,
        origin: Option<&str>,
        sign_type: u32,
    ) -> Result<Handle, Error> {
        let sign_type = SignType::try_from(u64::from(sign_type))
            .map_err(|value| argument(format!("unknown sign type {value}")))?;
        let path = CryptoKeyPath::from_path(path, Some(source_fingerprint))?;
        let mut request = SolSignRequest::new(sign_data.to_vec(), path, sign_type)?;
        if let Some(request_id) = request_id {
            request = request.with_request_id(request_id)?;
        }
        if let Some(address) = address {
            request = request.with_address(address.to_vec());
        }
        if let Some(origin) = origin {
            request = request.with_origin(origin);
        }
        Ok(self.insert(request))
    }

    /// # Errors
    ///
    /// Fails for stale or mistyped handles.
    pub fn sol_sign_request_request_id(&self, handle: Handle) -> Result<Option<Vec<u8>>, Error> {
        Ok(self
            .item::<SolSignRequest>(handle)?
            .request_id()
            .map(|id| id.to_vec()))
    }

    /// # Errors
    ///
    /// Fails for stale or mistyped handles.
    pub fn sol_sign_request_sign_data(&self, handle: Handle) -> Result<Vec<u8>, Error> {
        Ok(self.item::<SolSignRequest>(handle)?.sign_data().to_vec())
    }

    /// # Errors
    ///
    /// Fails for stale or mistyped handles.
    pub fn sol_sign_request_path(&self, handle: Handle) -> Result<Option<String>, Error> {
        Ok(self.item::<SolSignRequest>(handle)?.derivation_path().path())
    }

    /// # Errors
    ///
    /// Fails for stale or mistyped handles.
    pub fn sol_sign_request_sign_type(&self, handle: Handle) -> Result<u32, Error> {
        Ok(self.item::<SolSignRequest>(handle)?.sign_type() as u32)
    }

    /// # Errors
    ///
    /// Fails for an empty signature or a request id that isn't 16 bytes long.
    pub fn sol_signature_construct(
        &mut self,
        request_id: Option<&[u8]>,
        signature: &[u8],
    ) -> Result<Handle, Error> {
        Ok(self.insert(SolSignature::new(request_id, signature.to_vec())?))
    }

    /// # Errors
    ///
    /// Fails for stale or mistyped handles.
    pub fn sol_signature_request_id(&self, handle: Handle) -> Result<Option<Vec<u8>>, Error> {
        Ok(self
            .item::<SolSignature>(handle)?
            .request_id()
            .map(|id| id.to_vec()))
    }

    /// # Errors
    ///
    /// Fails for stale or mistyped handles.
    pub fn sol_signature_signature(&self, handle: Handle) -> Result<Vec<u8>, Error> {
        Ok(self.item::<SolSignature>(handle)?.signature().to_vec())
    }
}
