//! Crate-wide error type and the coarse classification callers act on.

/// How a caller should react to an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or missing CBOR fields. Surfaced, never retried.
    Schema,
    /// Conflicting or malformed UR parts. Discard the offending part and continue.
    Protocol,
    /// The reassembled payload is corrupt. Restart the whole transfer.
    Checksum,
    /// Bad construction parameters or a bad handle.
    InvalidArgument,
}

/// Errors surfaced by the public surface of the crate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Bytewords(#[from] crate::bytewords::Error),

    #[error(transparent)]
    Fountain(#[from] crate::fountain::Error),

    #[error(transparent)]
    Ur(#[from] crate::ur::Error),

    #[error(transparent)]
    Registry(#[from] crate::registry::Error),

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Config(&'static str),

    /// The handle was never issued, or its object has been freed.
    #[error("stale or unknown handle")]
    StaleHandle,

    /// The handle refers to an object of another kind.
    #[error("handle refers to {found}, expected {expected}")]
    WrongObject {
        expected: &'static str,
        found: &'static str,
    },

    /// An index argument is past the end of a collection.
    #[error("index {index} out of range for {len} elements")]
    OutOfRange { index: usize, len: usize },

    /// The decoder has no message yet.
    #[error("no complete message received yet")]
    Incomplete,
}

impl Error {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Bytewords(e) => e.kind(),
            Self::Fountain(e) => e.kind(),
            Self::Ur(e) => e.kind(),
            Self::Registry(e) => e.kind(),
            Self::Config(_)
            | Self::StaleHandle
            | Self::WrongObject { .. }
            | Self::OutOfRange { .. }
            | Self::Incomplete => ErrorKind::InvalidArgument,
        }
    }
}
