use std::collections::BTreeMap;
use std::fmt;

use minicbor::Decoder;
use tracing::{debug, trace};

use super::ethereum::{EthSignRequest, EthSignature};
use super::solana::{SolSignRequest, SolSignature};
use super::{
    cbor, CryptoAccount, CryptoCoinInfo, CryptoECKey, CryptoHDKey, CryptoKeyPath,
    CryptoMultiAccounts, CryptoOutput, CryptoPSBT, Error, RegistryItem, RegistryObject,
    RegistryType,
};

type DecodeFn = fn(&mut Decoder<'_>) -> Result<RegistryObject, Error>;

#[derive(Clone, Copy)]
struct Entry {
    registry_type: RegistryType,
    decode: DecodeFn,
}

fn decode_as<T>(d: &mut Decoder<'_>) -> Result<RegistryObject, Error>
where
    T: RegistryItem + Into<RegistryObject>,
{
    Ok(T::decode_cbor(d)?.into())
}

/// Maps UR types and CBOR tags to the decoders of the objects they name.
///
/// The table is built once and passed to whatever needs to resolve payloads;
/// nothing about it is global.
///
/// ```
/// use ur_registry::registry::{CryptoPSBT, RegistryItem, RegistryObject, TagRegistry};
/// let registry = TagRegistry::default();
/// let psbt = CryptoPSBT::new(vec![1, 2, 3]).unwrap();
/// let object = registry.decode("crypto-psbt", &psbt.to_bytes().unwrap()).unwrap();
/// assert_eq!(object, RegistryObject::Psbt(psbt));
///
/// let restricted = TagRegistry::empty().with::<CryptoPSBT>();
/// assert!(restricted.decode("crypto-hdkey", &[0xa0]).is_err());
/// ```
#[derive(Clone)]
pub struct TagRegistry {
    by_type: BTreeMap<&'static str, Entry>,
    by_tag: BTreeMap<u64, &'static str>,
}

impl TagRegistry {
    /// A table that knows no types.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            by_type: BTreeMap::new(),
            by_tag: BTreeMap::new(),
        }
    }

    /// Adds `T`, replacing any entry with the same UR type or tag.
    pub fn register<T>(&mut self) -> &mut Self
    where
        T: RegistryItem + Into<RegistryObject>,
    {
        let registry_type = T::registry_type();
        let ur_type = registry_type.ur_type();
        if let Some(previous) = self.by_type.get(ur_type) {
            self.by_tag.remove(&previous.registry_type.tag());
        }
        if let Some(previous) = self.by_tag.insert(registry_type.tag(), ur_type) {
            if previous != ur_type {
                debug!(ur_type, replaced = previous, "tag taken over by another type");
                self.by_type.remove(previous);
            }
        }
        self.by_type.insert(
            ur_type,
            Entry {
                registry_type,
                decode: decode_as::<T>,
            },
        );
        self
    }

    #[must_use]
    pub fn with<T>(mut self) -> Self
    where
        T: RegistryItem + Into<RegistryObject>,
    {
        self.register::<T>();
        self
    }

    #[must_use]
    pub fn contains(&self, ur_type: &str) -> bool {
        self.by_type.contains_key(ur_type)
    }

    /// The UR type registered for `tag`.
    #[must_use]
    pub fn ur_type(&self, tag: u64) -> Option<&'static str> {
        self.by_tag.get(&tag).copied()
    }

    pub fn registry_types(&self) -> impl Iterator<Item = RegistryType> + '_ {
        self.by_type.values().map(|entry| entry.registry_type)
    }

    /// Decodes the untagged payload of a UR of type `ur_type`.
    ///
    /// # Errors
    ///
    /// Fails for unregistered types and for payloads the type's decoder rejects.
    pub fn decode(&self, ur_type: &str, bytes: &[u8]) -> Result<RegistryObject, Error> {
        let entry = self.by_type.get(ur_type).ok_or_else(|| {
            debug!(ur_type, "no decoder registered");
            Error::UnknownType(ur_type.to_owned())
        })?;
        trace!(ur_type, len = bytes.len(), "decoding registry object");
        let mut d = Decoder::new(bytes);
        let object = (entry.decode)(&mut d)?;
        cbor::finish(&d)?;
        Ok(object)
    }

    /// Decodes a tagged item, picking the decoder by its leading tag.
    ///
    /// # Errors
    ///
    /// Fails for untagged input, unregistered tags, and payloads the matching
    /// decoder rejects.
    pub fn decode_tagged(&self, bytes: &[u8]) -> Result<RegistryObject, Error> {
        let mut d = Decoder::new(bytes);
        let tag = cbor::peek_tag(&mut d)?
            .ok_or_else(|| Error::Cbor("expected a tagged item".into()))?;
        let ur_type = self.ur_type(tag).ok_or(Error::UnknownTag(tag))?;
        d.tag()?;
        let entry = self.by_type.get(ur_type).ok_or(Error::UnknownTag(tag))?;
        let object = (entry.decode)(&mut d)?;
        cbor::finish(&d)?;
        Ok(object)
    }
}

impl fmt::Debug for TagRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.by_tag.iter().map(|(tag, ur_type)| (ur_type, tag)))
            .finish()
    }
}

impl Default for TagRegistry {
    /// A table with every builtin object.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register::<CryptoHDKey>()
            .register::<CryptoKeyPath>()
            .register::<CryptoCoinInfo>()
            .register::<CryptoECKey>()
            .register::<CryptoOutput>()
            .register::<CryptoAccount>()
            .register::<CryptoPSBT>()
            .register::<EthSignRequest>()
            .register::<EthSignature>()
            .register::<SolSignRequest>()
            .register::<SolSignature>()
            .register::<CryptoMultiAccounts>();
        registry
    }
}
