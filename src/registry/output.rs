use std::fmt;

use minicbor::encode::Write;
use minicbor::{Decoder, Encoder};

use super::{
    cbor, CryptoECKey, CryptoHDKey, Error, RegistryItem, RegistryType, CRYPTO_ECKEY,
    CRYPTO_HDKEY, CRYPTO_OUTPUT,
};

/// Output descriptor script functions, each identified by its CBOR tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptExpression {
    ScriptHash,
    WitnessScriptHash,
    PublicKey,
    PublicKeyHash,
    WitnessPublicKeyHash,
    Combo,
    Taproot,
}

impl ScriptExpression {
    #[must_use]
    pub fn tag(self) -> u64 {
        match self {
            Self::ScriptHash => 400,
            Self::WitnessScriptHash => 401,
            Self::PublicKey => 402,
            Self::PublicKeyHash => 403,
            Self::WitnessPublicKeyHash => 404,
            Self::Combo => 405,
            Self::Taproot => 409,
        }
    }

    #[must_use]
    pub fn from_tag(tag: u64) -> Option<Self> {
        Some(match tag {
            400 => Self::ScriptHash,
            401 => Self::WitnessScriptHash,
            402 => Self::PublicKey,
            403 => Self::PublicKeyHash,
            404 => Self::WitnessPublicKeyHash,
            405 => Self::Combo,
            409 => Self::Taproot,
            _ => return None,
        })
    }

    /// The descriptor function name, e.g. `wpkh`.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::ScriptHash => "sh",
            Self::WitnessScriptHash => "wsh",
            Self::PublicKey => "pk",
            Self::PublicKeyHash => "pkh",
            Self::WitnessPublicKeyHash => "wpkh",
            Self::Combo => "combo",
            Self::Taproot => "tr",
        }
    }
}

/// The key at the core of an output descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputKey {
    HDKey(CryptoHDKey),
    ECKey(CryptoECKey),
}

impl From<CryptoHDKey> for OutputKey {
    fn from(key: CryptoHDKey) -> Self {
        Self::HDKey(key)
    }
}

impl From<CryptoECKey> for OutputKey {
    fn from(key: CryptoECKey) -> Self {
        Self::ECKey(key)
    }
}

/// A key wrapped in zero or more script expressions, outermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CryptoOutput {
    script_expressions: Vec<ScriptExpression>,
    key: OutputKey,
}

impl CryptoOutput {
    #[must_use]
    pub fn new(script_expressions: Vec<ScriptExpression>, key: impl Into<OutputKey>) -> Self {
        Self {
            script_expressions,
            key: key.into(),
        }
    }

    #[must_use]
    pub fn script_expressions(&self) -> &[ScriptExpression] {
        &self.script_expressions
    }

    #[must_use]
    pub fn key(&self) -> &OutputKey {
        &self.key
    }

    #[must_use]
    pub fn hd_key(&self) -> Option<&CryptoHDKey> {
        match &self.key {
            OutputKey::HDKey(key) => Some(key),
            OutputKey::ECKey(_) => None,
        }
    }
}

impl fmt::Display for CryptoOutput {
    /// Renders the descriptor shape, e.g. `sh(wpkh(hdkey))`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for expression in &self.script_expressions {
            write!(f, "{}(", expression.name())?;
        }
        match self.key {
            OutputKey::HDKey(_) => f.write_str("hdkey")?,
            OutputKey::ECKey(_) => f.write_str("eckey")?,
        }
        for _ in &self.script_expressions {
            f.write_str(")")?;
        }
        Ok(())
    }
}

impl RegistryItem for CryptoOutput {
    fn registry_type() -> RegistryType {
        CRYPTO_OUTPUT
    }

    fn encode_cbor<W: Write>(
        &self,
        e: &mut Encoder<W>,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        for expression in &self.script_expressions {
            cbor::tag(e, expression.tag())?;
        }
        match &self.key {
            OutputKey::HDKey(key) => key.encode_tagged(e),
            OutputKey::ECKey(key) => key.encode_tagged(e),
        }
    }

    fn decode_cbor(d: &mut Decoder<'_>) -> Result<Self, Error> {
        let mut script_expressions = Vec::new();
        loop {
            let found = cbor::peek_tag(d)?;
            match found {
                Some(tag) if tag == CRYPTO_HDKEY.tag() => {
                    let key = CryptoHDKey::decode_tagged(d)?;
                    return Ok(Self::new(script_expressions, key));
                }
                Some(tag) if tag == CRYPTO_ECKEY.tag() => {
                    let key = CryptoECKey::decode_tagged(d)?;
                    return Ok(Self::new(script_expressions, key));
                }
                Some(tag) => match ScriptExpression::from_tag(tag) {
                    Some(expression) => {
                        d.tag()?;
                        script_expressions.push(expression);
                    }
                    None => {
                        return Err(Error::UnexpectedTag {
                            expected: CRYPTO_HDKEY.tag(),
                            found,
                        })
                    }
                },
                None => {
                    return Err(Error::UnexpectedTag {
                        expected: CRYPTO_HDKEY.tag(),
                        found,
                    })
                }
            }
        }
    }
}
