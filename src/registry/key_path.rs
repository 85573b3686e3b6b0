use std::fmt;

use minicbor::data::Type;
use minicbor::encode::Write;
use minicbor::{Decoder, Encoder};

use super::{cbor, Error, RegistryItem, RegistryType, CRYPTO_KEYPATH};

const COMPONENTS: u64 = 1;
const SOURCE_FINGERPRINT: u64 = 2;
const DEPTH: u64 = 3;

/// One step of a BIP-32 derivation path: a child index or a wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathComponent {
    index: Option<u32>,
    hardened: bool,
}

impl PathComponent {
    pub const HARDEN_BIT: u32 = 0x8000_0000;

    /// Creates a component; `None` stands for the `*` wildcard.
    ///
    /// # Errors
    ///
    /// Fails if `index` has the hardened bit set; hardening is given separately.
    pub fn new(index: Option<u32>, hardened: bool) -> Result<Self, Error> {
        match index {
            Some(i) if i & Self::HARDEN_BIT != 0 => Err(Error::InvalidArgument(format!(
                "invalid index {i}: most significant bit cannot be set"
            ))),
            _ => Ok(Self { index, hardened }),
        }
    }

    #[must_use]
    pub fn index(&self) -> Option<u32> {
        self.index
    }

    /// The index as it is fed to key derivation, hardened bit included.
    #[must_use]
    pub fn canonical_index(&self) -> Option<u32> {
        self.index
            .map(|i| if self.hardened { i | Self::HARDEN_BIT } else { i })
    }

    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.index.is_none()
    }

    #[must_use]
    pub fn is_hardened(&self) -> bool {
        self.hardened
    }
}

impl fmt::Display for PathComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(i) => write!(f, "{i}")?,
            None => f.write_str("*")?,
        }
        if self.hardened {
            f.write_str("'")?;
        }
        Ok(())
    }
}

/// A derivation path with an optional source fingerprint and depth.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CryptoKeyPath {
    components: Vec<PathComponent>,
    source_fingerprint: Option<u32>,
    depth: Option<u8>,
}

impl CryptoKeyPath {
    #[must_use]
    pub fn new(
        components: Vec<PathComponent>,
        source_fingerprint: Option<u32>,
        depth: Option<u8>,
    ) -> Self {
        Self {
            components,
            source_fingerprint,
            depth,
        }
    }

    /// Parses a textual path such as `m/44'/60'/0'/0/*`.
    ///
    /// The `m/` prefix is optional; hardened steps are marked with `'` or `h`.
    ///
    /// ```
    /// use ur_registry::registry::CryptoKeyPath;
    /// let path = CryptoKeyPath::from_path("m/44h/60'/0'/0/*", Some(0xe918_1cf3)).unwrap();
    /// assert_eq!(path.path().unwrap(), "44'/60'/0'/0/*");
    /// ```
    ///
    /// # Errors
    ///
    /// Fails on empty steps, non-numeric indexes, or indexes with the hardened bit set.
    pub fn from_path(path: &str, source_fingerprint: Option<u32>) -> Result<Self, Error> {
        let trimmed = path
            .strip_prefix("m/")
            .or_else(|| path.strip_prefix("M/"))
            .unwrap_or(path);
        let components = match trimmed {
            "" | "m" | "M" => Vec::new(),
            steps => steps
                .split('/')
                .map(parse_component)
                .collect::<Result<_, _>>()?,
        };
        Ok(Self::new(components, source_fingerprint, None))
    }

    #[must_use]
    pub fn components(&self) -> &[PathComponent] {
        &self.components
    }

    #[must_use]
    pub fn source_fingerprint(&self) -> Option<u32> {
        self.source_fingerprint
    }

    #[must_use]
    pub fn depth(&self) -> Option<u8> {
        self.depth
    }

    /// Renders the components as `44'/60'/0'/0/*`, or `None` for an empty path.
    #[must_use]
    pub fn path(&self) -> Option<String> {
        if self.components.is_empty() {
            return None;
        }
        Some(
            self.components
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("/"),
        )
    }
}

fn parse_component(step: &str) -> Result<PathComponent, Error> {
    let (index, hardened) = match step.strip_suffix('\'').or_else(|| step.strip_suffix('h')) {
        Some(index) => (index, true),
        None => (step, false),
    };
    if index == "*" {
        return PathComponent::new(None, hardened);
    }
    let index = index
        .parse::<u32>()
        .map_err(|_| Error::InvalidArgument(format!("invalid path component {step:?}")))?;
    PathComponent::new(Some(index), hardened)
}

impl RegistryItem for CryptoKeyPath {
    fn registry_type() -> RegistryType {
        CRYPTO_KEYPATH
    }

    fn encode_cbor<W: Write>(
        &self,
        e: &mut Encoder<W>,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        let len =
            1 + u64::from(self.source_fingerprint.is_some()) + u64::from(self.depth.is_some());
        e.map(len)?;
        e.u64(COMPONENTS)?.array(2 * self.components.len() as u64)?;
        for component in &self.components {
            match component.index {
                Some(index) => e.u32(index)?,
                None => e.array(0)?,
            };
            e.bool(component.hardened)?;
        }
        if let Some(fingerprint) = self.source_fingerprint {
            e.u64(SOURCE_FINGERPRINT)?.u32(fingerprint)?;
        }
        if let Some(depth) = self.depth {
            e.u64(DEPTH)?.u8(depth)?;
        }
        Ok(())
    }

    fn decode_cbor(d: &mut Decoder<'_>) -> Result<Self, Error> {
        let mut path = Self::default();
        cbor::decode_map(d, |key, d| {
            match key {
                COMPONENTS => path.components = decode_components(d)?,
                SOURCE_FINGERPRINT => path.source_fingerprint = Some(d.u32()?),
                DEPTH => path.depth = Some(d.u8()?),
                _ => d.skip()?,
            }
            Ok(())
        })?;
        Ok(path)
    }
}

fn decode_components(d: &mut Decoder<'_>) -> Result<Vec<PathComponent>, Error> {
    let ur_type = CRYPTO_KEYPATH.ur_type();
    let len = cbor::array_len(d)?;
    if len % 2 != 0 {
        return Err(cbor::invalid(
            ur_type,
            "components",
            "expected index and hardened flag pairs",
        ));
    }
    let mut components = Vec::new();
    for _ in 0..len / 2 {
        let index = match d.datatype()? {
            Type::Array => {
                if cbor::array_len(d)? != 0 {
                    return Err(cbor::invalid(
                        ur_type,
                        "components",
                        "key ranges are not supported",
                    ));
                }
                None
            }
            _ => Some(d.u32()?),
        };
        let hardened = d.bool()?;
        let component = PathComponent::new(index, hardened)
            .map_err(|_| cbor::invalid(ur_type, "components", "index has the hardened bit set"))?;
        components.push(component);
    }
    Ok(components)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(index: u32, hardened: bool) -> PathComponent {
        PathComponent::new(Some(index), hardened).unwrap()
    }

    #[test]
    fn test_encode() {
        let path = CryptoKeyPath::new(
            vec![
                component(44, true),
                component(118, true),
                component(0, true),
                component(0, false),
                PathComponent::new(None, false).unwrap(),
            ],
            Some(0x7885_4a07),
            None,
        );
        assert_eq!(
            hex::encode(path.to_bytes().unwrap()),
            "a2018a182cf51876f500f500f480f4021a78854a07"
        );
        assert_eq!(path.path().unwrap(), "44'/118'/0'/0/*");
    }

    #[test]
    fn test_decode() {
        let bytes = hex::decode("a30188182cf51901f5f500f500f5021a23d048f00305").unwrap();
        let path = CryptoKeyPath::from_bytes(&bytes).unwrap();
        assert_eq!(path.path().unwrap(), "44'/501'/0'/0'");
        assert_eq!(path.source_fingerprint(), Some(0x23d0_48f0));
        assert_eq!(path.depth(), Some(5));
        assert_eq!(path.components()[1].canonical_index(), Some(0x8000_01f5));
        assert_eq!(path.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_decode_errors() {
        // odd number of component items
        assert!(matches!(
            CryptoKeyPath::from_bytes(&hex::decode("a10181182c").unwrap()),
            Err(Error::InvalidField { .. })
        ));
        // index with the hardened bit set
        assert!(matches!(
            CryptoKeyPath::from_bytes(&hex::decode("a101821a8000002cf5").unwrap()),
            Err(Error::InvalidField { .. })
        ));
        // key range
        assert!(matches!(
            CryptoKeyPath::from_bytes(&hex::decode("a1018282000af4").unwrap()),
            Err(Error::InvalidField { .. })
        ));
        // depth above 255
        assert!(matches!(
            CryptoKeyPath::from_bytes(&hex::decode("a103190100").unwrap()),
            Err(Error::Cbor(_))
        ));
    }

    #[test]
    fn test_from_path() {
        let path = CryptoKeyPath::from_path("m/44'/60h/0'/0/1", None).unwrap();
        assert_eq!(path.path().unwrap(), "44'/60'/0'/0/1");
        assert_eq!(path.components().len(), 5);
        assert!(path.components()[1].is_hardened());
        assert!(!path.components()[4].is_hardened());

        let path = CryptoKeyPath::from_path("44'/*'", Some(1)).unwrap();
        assert!(path.components()[1].is_wildcard());
        assert_eq!(path.path().unwrap(), "44'/*'");

        assert_eq!(CryptoKeyPath::from_path("m", None).unwrap().path(), None);
        assert!(CryptoKeyPath::from_path("m/44'//0", None).is_err());
        assert!(CryptoKeyPath::from_path("m/x", None).is_err());
        assert!(CryptoKeyPath::from_path("m/2147483648", None).is_err());
    }

    #[test]
    fn test_harden_bit_rejected() {
        assert!(matches!(
            PathComponent::new(Some(0x8000_0000), false),
            Err(Error::InvalidArgument(_))
        ));
    }
}
