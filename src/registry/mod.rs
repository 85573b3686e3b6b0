//! Typed CBOR objects carried inside URs.
//!
//! Every object implements [`RegistryItem`], which ties it to a UR type and a
//! CBOR tag and provides the canonical byte encoding. Objects nest: an
//! account holds outputs, an output holds a tagged key, a key holds tagged
//! key paths and coin info.
//!
//! ```
//! use ur_registry::registry::{CryptoPSBT, RegistryItem};
//! let psbt = CryptoPSBT::new(vec![0x70, 0x73, 0x62, 0x74]).unwrap();
//! let bytes = psbt.to_bytes().unwrap();
//! assert_eq!(bytes, [0x44, 0x70, 0x73, 0x62, 0x74]);
//! assert_eq!(CryptoPSBT::from_bytes(&bytes).unwrap(), psbt);
//! ```
//!
//! Encoding is canonical: map keys ascend, integers use their shortest form,
//! and all arrays and maps have a definite length. Decoding skips map keys it
//! doesn't know and rejects anything else that deviates from the schema.

mod account;
mod cbor;
mod coin_info;
mod ec_key;
pub mod ethereum;
mod hd_key;
mod key_path;
mod lookup;
mod multi_accounts;
mod object;
mod output;
mod psbt;
mod registry_types;
pub mod solana;
mod traits;

pub use account::CryptoAccount;
pub use coin_info::{CryptoCoinInfo, Network};
pub use ec_key::CryptoECKey;
pub use hd_key::CryptoHDKey;
pub use key_path::{CryptoKeyPath, PathComponent};
pub use lookup::TagRegistry;
pub use multi_accounts::CryptoMultiAccounts;
pub use object::RegistryObject;
pub(crate) use object::Variant;
pub use output::{CryptoOutput, OutputKey, ScriptExpression};
pub use psbt::CryptoPSBT;
pub use registry_types::*;
pub use traits::RegistryItem;

use crate::error::ErrorKind;

/// Errors raised while building, encoding or decoding registry objects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The bytes are not well-formed CBOR of the expected shape.
    #[error("malformed CBOR: {0}")]
    Cbor(String),
    /// Indefinite-length arrays and maps are not canonical.
    #[error("indefinite-length items are not supported")]
    IndefiniteLength,
    /// Extra bytes follow the top-level item.
    #[error("{0} trailing bytes after CBOR item")]
    TrailingBytes(usize),
    /// A required field is absent.
    #[error("{field} is required for {ur_type}")]
    MissingField {
        ur_type: &'static str,
        field: &'static str,
    },
    /// A field is present but out of range.
    #[error("invalid {field} in {ur_type}: {reason}")]
    InvalidField {
        ur_type: &'static str,
        field: &'static str,
        reason: String,
    },
    /// A tagged item carries a different tag than the schema requires.
    #[error("expected CBOR tag {expected}, found {found:?}")]
    UnexpectedTag { expected: u64, found: Option<u64> },
    /// The lookup table has no decoder for the UR type.
    #[error("unsupported UR type {0}")]
    UnknownType(String),
    /// The lookup table has no decoder for the CBOR tag.
    #[error("unsupported CBOR tag {0}")]
    UnknownTag(u64),
    /// A constructor was given values that violate the schema.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            _ => ErrorKind::Schema,
        }
    }
}

impl From<minicbor::decode::Error> for Error {
    fn from(e: minicbor::decode::Error) -> Self {
        Self::Cbor(e.to_string())
    }
}
