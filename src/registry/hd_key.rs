use minicbor::encode::Write;
use minicbor::{Decoder, Encoder};

use super::{
    cbor, CryptoCoinInfo, CryptoKeyPath, Error, RegistryItem, RegistryType, CRYPTO_HDKEY,
};

const IS_MASTER: u64 = 1;
const IS_PRIVATE: u64 = 2;
const KEY_DATA: u64 = 3;
const CHAIN_CODE: u64 = 4;
const USE_INFO: u64 = 5;
const ORIGIN: u64 = 6;
const CHILDREN: u64 = 7;
const PARENT_FINGERPRINT: u64 = 8;
const NAME: u64 = 9;
const NOTE: u64 = 10;

const CHAIN_CODE_LENGTH: usize = 32;
const XPRV_VERSION: [u8; 4] = [0x04, 0x88, 0xad, 0xe4];
const XPUB_VERSION: [u8; 4] = [0x04, 0x88, 0xb2, 0x1e];

/// A BIP-32 hierarchical deterministic key, either a master key or a derived
/// key with its derivation metadata.
///
/// ```
/// use ur_registry::registry::{CryptoHDKey, CryptoKeyPath};
/// let key = CryptoHDKey::new_extended_key(vec![0x02; 33])
///     .unwrap()
///     .with_origin(CryptoKeyPath::from_path("m/44'/60'/0'", Some(0x1234_5678)).unwrap())
///     .with_name("Keystone");
/// assert_eq!(key.source_fingerprint(), Some(0x1234_5678));
/// assert_eq!(key.account_index(2), Some(0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CryptoHDKey {
    is_master: bool,
    is_private_key: Option<bool>,
    key: Vec<u8>,
    chain_code: Option<Vec<u8>>,
    use_info: Option<CryptoCoinInfo>,
    origin: Option<CryptoKeyPath>,
    children: Option<CryptoKeyPath>,
    parent_fingerprint: Option<u32>,
    name: Option<String>,
    note: Option<String>,
}

fn check_key(key: &[u8]) -> Result<(), Error> {
    if key.is_empty() {
        return Err(Error::InvalidArgument("key data must not be empty".into()));
    }
    Ok(())
}

fn check_chain_code(chain_code: &[u8]) -> Result<(), Error> {
    if chain_code.len() != CHAIN_CODE_LENGTH {
        return Err(Error::InvalidArgument(format!(
            "chain code must be {CHAIN_CODE_LENGTH} bytes, received {}",
            chain_code.len()
        )));
    }
    Ok(())
}

impl CryptoHDKey {
    /// # Errors
    ///
    /// Fails for empty key data or a chain code that isn't 32 bytes long.
    pub fn new_master_key(key: Vec<u8>, chain_code: Vec<u8>) -> Result<Self, Error> {
        check_key(&key)?;
        check_chain_code(&chain_code)?;
        Ok(Self {
            is_master: true,
            key,
            chain_code: Some(chain_code),
            ..Self::default()
        })
    }

    /// Creates a derived key; the optional fields are set with the `with_*` builders.
    ///
    /// # Errors
    ///
    /// Fails for empty key data.
    pub fn new_extended_key(key: Vec<u8>) -> Result<Self, Error> {
        check_key(&key)?;
        Ok(Self {
            key,
            ..Self::default()
        })
    }

    #[must_use]
    pub fn with_private(mut self, is_private_key: bool) -> Self {
        self.is_private_key = Some(is_private_key);
        self
    }

    /// # Errors
    ///
    /// Fails for a chain code that isn't 32 bytes long.
    pub fn with_chain_code(mut self, chain_code: Vec<u8>) -> Result<Self, Error> {
        check_chain_code(&chain_code)?;
        self.chain_code = Some(chain_code);
        Ok(self)
    }

    #[must_use]
    pub fn with_use_info(mut self, use_info: CryptoCoinInfo) -> Self {
        self.use_info = Some(use_info);
        self
    }

    #[must_use]
    pub fn with_origin(mut self, origin: CryptoKeyPath) -> Self {
        self.origin = Some(origin);
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: CryptoKeyPath) -> Self {
        self.children = Some(children);
        self
    }

    #[must_use]
    pub fn with_parent_fingerprint(mut self, fingerprint: u32) -> Self {
        self.parent_fingerprint = Some(fingerprint);
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    #[must_use]
    pub fn is_master(&self) -> bool {
        self.is_master
    }

    #[must_use]
    pub fn is_private_key(&self) -> bool {
        self.is_private_key.unwrap_or(false)
    }

    #[must_use]
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    #[must_use]
    pub fn chain_code(&self) -> Option<&[u8]> {
        self.chain_code.as_deref()
    }

    #[must_use]
    pub fn use_info(&self) -> Option<&CryptoCoinInfo> {
        self.use_info.as_ref()
    }

    #[must_use]
    pub fn origin(&self) -> Option<&CryptoKeyPath> {
        self.origin.as_ref()
    }

    #[must_use]
    pub fn children(&self) -> Option<&CryptoKeyPath> {
        self.children.as_ref()
    }

    #[must_use]
    pub fn parent_fingerprint(&self) -> Option<u32> {
        self.parent_fingerprint
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    /// The fingerprint of the key the origin path starts from.
    #[must_use]
    pub fn source_fingerprint(&self) -> Option<u32> {
        self.origin.as_ref().and_then(CryptoKeyPath::source_fingerprint)
    }

    /// The depth recorded on the origin path.
    #[must_use]
    pub fn depth(&self) -> Option<u8> {
        self.origin.as_ref().and_then(CryptoKeyPath::depth)
    }

    /// The unhardened index of the origin component at `level`.
    #[must_use]
    pub fn account_index(&self, level: usize) -> Option<u32> {
        self.origin
            .as_ref()?
            .components()
            .get(level)
            .and_then(|component| component.index())
    }

    /// Serializes the key as a Base58Check `xpub`/`xprv` string.
    ///
    /// Depth and child number come from the origin path; a missing parent
    /// fingerprint or chain code is filled with zeros.
    #[must_use]
    pub fn bip32_key(&self) -> String {
        let (version, depth, index) = if self.is_master {
            (XPRV_VERSION, 0, 0)
        } else {
            let components = self.origin.as_ref().map_or(&[][..], CryptoKeyPath::components);
            let depth = u8::try_from(components.len()).unwrap_or(u8::MAX);
            let index = components
                .last()
                .and_then(|component| component.canonical_index())
                .unwrap_or(0);
            let version = if self.is_private_key() {
                XPRV_VERSION
            } else {
                XPUB_VERSION
            };
            (version, depth, index)
        };

        let mut output = Vec::with_capacity(78);
        output.extend_from_slice(&version);
        output.push(depth);
        output.extend_from_slice(&self.parent_fingerprint.unwrap_or(0).to_be_bytes());
        output.extend_from_slice(&index.to_be_bytes());
        match &self.chain_code {
            Some(chain_code) => output.extend_from_slice(chain_code),
            None => output.extend_from_slice(&[0; CHAIN_CODE_LENGTH]),
        }
        output.extend_from_slice(&self.key);
        bs58::encode(output).with_check().into_string()
    }
}

impl RegistryItem for CryptoHDKey {
    fn registry_type() -> RegistryType {
        CRYPTO_HDKEY
    }

    fn encode_cbor<W: Write>(
        &self,
        e: &mut Encoder<W>,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        if self.is_master {
            e.map(3)?;
            e.u64(IS_MASTER)?.bool(true)?;
            e.u64(KEY_DATA)?.bytes(&self.key)?;
            e.u64(CHAIN_CODE)?.bytes(self.chain_code.as_deref().unwrap_or_default())?;
            return Ok(());
        }

        let len = 1
            + u64::from(self.is_private_key.is_some())
            + u64::from(self.chain_code.is_some())
            + u64::from(self.use_info.is_some())
            + u64::from(self.origin.is_some())
            + u64::from(self.children.is_some())
            + u64::from(self.parent_fingerprint.is_some())
            + u64::from(self.name.is_some())
            + u64::from(self.note.is_some());
        e.map(len)?;
        if let Some(private) = self.is_private_key {
            e.u64(IS_PRIVATE)?.bool(private)?;
        }
        e.u64(KEY_DATA)?.bytes(&self.key)?;
        if let Some(chain_code) = &self.chain_code {
            e.u64(CHAIN_CODE)?.bytes(chain_code)?;
        }
        if let Some(use_info) = &self.use_info {
            e.u64(USE_INFO)?;
            use_info.encode_tagged(e)?;
        }
        if let Some(origin) = &self.origin {
            e.u64(ORIGIN)?;
            origin.encode_tagged(e)?;
        }
        if let Some(children) = &self.children {
            e.u64(CHILDREN)?;
            children.encode_tagged(e)?;
        }
        if let Some(fingerprint) = self.parent_fingerprint {
            e.u64(PARENT_FINGERPRINT)?.u32(fingerprint)?;
        }
        if let Some(name) = &self.name {
            e.u64(NAME)?.str(name)?;
        }
        if let Some(note) = &self.note {
            e.u64(NOTE)?.str(note)?;
        }
        Ok(())
    }

    fn decode_cbor(d: &mut Decoder<'_>) -> Result<Self, Error> {
        let ur_type = CRYPTO_HDKEY.ur_type();
        let mut key = Self::default();
        let mut key_data = None;
        cbor::decode_map(d, |field, d| {
            match field {
                IS_MASTER => key.is_master = d.bool()?,
                IS_PRIVATE => key.is_private_key = Some(d.bool()?),
                KEY_DATA => key_data = Some(d.bytes()?.to_vec()),
                CHAIN_CODE => key.chain_code = Some(d.bytes()?.to_vec()),
                USE_INFO => key.use_info = Some(CryptoCoinInfo::decode_tagged(d)?),
                ORIGIN => key.origin = Some(CryptoKeyPath::decode_tagged(d)?),
                CHILDREN => key.children = Some(CryptoKeyPath::decode_tagged(d)?),
                PARENT_FINGERPRINT => key.parent_fingerprint = Some(d.u32()?),
                NAME => key.name = Some(d.str()?.to_owned()),
                NOTE => key.note = Some(d.str()?.to_owned()),
                _ => d.skip()?,
            }
            Ok(())
        })?;

        key.key = cbor::required(key_data, ur_type, "key_data")?;
        if key.key.is_empty() {
            return Err(cbor::invalid(ur_type, "key_data", "must not be empty"));
        }
        if key.is_master {
            let chain_code = cbor::required(key.chain_code, ur_type, "chain_code")?;
            return Self::new_master_key(key.key, chain_code)
                .map_err(|err| cbor::invalid(ur_type, "chain_code", err.to_string()));
        }
        if let Some(chain_code) = &key.chain_code {
            check_chain_code(chain_code)
                .map_err(|err| cbor::invalid(ur_type, "chain_code", err.to_string()))?;
        }
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Network, PathComponent};

    const MASTER: &str = "a301f503582100e8f32e723decf4051aefac8e2c93c9c5b214313817cdb01a1494b917c8436b35045820873dff81c02f525623fd1fe5167eac3a55a049de3d314bb42ee227ffed37d508";
    const DERIVED: &str = "a5035821026fe2355745bb2db3630bbc80ef5d58951c963c841f54170ba6e5c12be7fc12a6045820ced155c72456255881793514edc5bd9447e7f74abb88c6d6b6480fd016ee8c8505d90131a1020106d90130a1018a182cf501f501f500f401f4081ae9181cf3";

    fn derived_key() -> CryptoHDKey {
        let component = |index, hardened| PathComponent::new(Some(index), hardened).unwrap();
        CryptoHDKey::new_extended_key(
            hex::decode("026fe2355745bb2db3630bbc80ef5d58951c963c841f54170ba6e5c12be7fc12a6")
                .unwrap(),
        )
        .unwrap()
        .with_chain_code(
            hex::decode("ced155c72456255881793514edc5bd9447e7f74abb88c6d6b6480fd016ee8c85")
                .unwrap(),
        )
        .unwrap()
        .with_use_info(CryptoCoinInfo::new(None, Some(Network::TestNet)))
        .with_origin(CryptoKeyPath::new(
            vec![
                component(44, true),
                component(1, true),
                component(1, true),
                component(0, false),
                component(1, false),
            ],
            None,
            None,
        ))
        .with_parent_fingerprint(0xe918_1cf3)
    }

    #[test]
    fn test_encode_master() {
        let key = CryptoHDKey::new_master_key(
            hex::decode("00e8f32e723decf4051aefac8e2c93c9c5b214313817cdb01a1494b917c8436b35")
                .unwrap(),
            hex::decode("873dff81c02f525623fd1fe5167eac3a55a049de3d314bb42ee227ffed37d508")
                .unwrap(),
        )
        .unwrap();
        assert_eq!(hex::encode(key.to_bytes().unwrap()), MASTER);
    }

    #[test]
    fn test_encode_derived() {
        let key = derived_key();
        assert_eq!(hex::encode(key.to_bytes().unwrap()), DERIVED);
        assert_eq!(
            key.to_ur_encoder(400).unwrap().next_part().unwrap(),
            "ur:crypto-hdkey/1-1/lpadadcsiocyihbdaehnhdioonaxhdclaojlvoechgferkdpqdiabdrflawshlhdmdcemtfnlrctghchbdolvwsednvdztbgolaahdcxtottgostdkhfdahdlykkecbbweskrymwflvdylgerkloswtbrpfdbsticmwylklpahtaadehoyaoadamtaaddyoyadlecsdwykadykadykaewkadwkaycywlcscewfcpghbziy"
        );
    }

    #[test]
    fn test_decode_master() {
        let key = CryptoHDKey::from_bytes(&hex::decode(MASTER).unwrap()).unwrap();
        assert!(key.is_master());
        assert_eq!(
            hex::encode(key.key()),
            "00e8f32e723decf4051aefac8e2c93c9c5b214313817cdb01a1494b917c8436b35"
        );
        assert_eq!(
            hex::encode(key.chain_code().unwrap()),
            "873dff81c02f525623fd1fe5167eac3a55a049de3d314bb42ee227ffed37d508"
        );
        assert!(key.bip32_key().starts_with("xprv"));
    }

    #[test]
    fn test_decode_derived() {
        let key = CryptoHDKey::from_bytes(&hex::decode(DERIVED).unwrap()).unwrap();
        assert_eq!(key, derived_key());
        assert!(!key.is_master());
        assert!(!key.is_private_key());
        assert_eq!(key.use_info().unwrap().coin_type(), 0);
        assert_eq!(key.use_info().unwrap().network(), Network::TestNet);
        assert_eq!(key.origin().unwrap().path().unwrap(), "44'/1'/1'/0/1");
        assert_eq!(key.parent_fingerprint(), Some(0xe918_1cf3));
        assert_eq!(key.account_index(2), Some(1));
        assert_eq!(key.account_index(7), None);
        assert_eq!(key.depth(), None);
        assert_eq!(key.source_fingerprint(), None);
        assert_eq!(
            key.bip32_key(),
            "xpub6H8Qkexp9BdSgEwPAnhiEjp7NMXVEZWoAFWwon5mSwbuPZMfSUTpPwAP1Q2q2kYMRgRQ8udBpEj89wburY1vW7AWDuYpByteGogpB6pPprX"
        );
    }

    #[test]
    fn test_children_round_trip() {
        let key = derived_key()
            .with_children(CryptoKeyPath::from_path("0/*", None).unwrap())
            .with_name("Keystone")
            .with_note("account.standard");
        let bytes = key.to_bytes().unwrap();
        let decoded = CryptoHDKey::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.children().unwrap().path().unwrap(), "0/*");
        assert!(decoded.origin().is_some());
        assert_eq!(decoded.name(), Some("Keystone"));
        assert_eq!(decoded.note(), Some("account.standard"));
        assert_eq!(decoded, key);
    }

    #[test]
    fn test_decode_errors() {
        // master key without chain code
        assert_eq!(
            CryptoHDKey::from_bytes(&hex::decode("a201f5034101").unwrap()).unwrap_err(),
            Error::MissingField {
                ur_type: "crypto-hdkey",
                field: "chain_code"
            }
        );
        // no key data
        assert!(matches!(
            CryptoHDKey::from_bytes(&hex::decode("a102f4").unwrap()),
            Err(Error::MissingField {
                field: "key_data",
                ..
            })
        ));
        // short chain code
        assert!(matches!(
            CryptoHDKey::from_bytes(&hex::decode("a20341010441ff").unwrap()),
            Err(Error::InvalidField {
                field: "chain_code",
                ..
            })
        ));
        // origin tagged as coin info
        assert_eq!(
            CryptoHDKey::from_bytes(&hex::decode("a203410106d90131a0").unwrap())
                .unwrap_err(),
            Error::UnexpectedTag {
                expected: 304,
                found: Some(305)
            }
        );
    }

    #[test]
    fn test_constructor_validation() {
        assert!(matches!(
            CryptoHDKey::new_master_key(vec![0; 33], vec![0; 31]),
            Err(Error::InvalidArgument(_))
        ));
        assert!(CryptoHDKey::new_extended_key(Vec::new()).is_err());
        assert!(CryptoHDKey::new_extended_key(vec![2; 33])
            .unwrap()
            .with_chain_code(vec![0; 33])
            .is_err());
    }
}
