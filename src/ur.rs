//! Split up big payloads into constantly sized URIs which can be recombined by a decoder.
//!
//! The `ur` module provides thin wrappers around fountain en- and decoders
//! which turn these fountain parts into URIs. To this end the fountain part
//! attributes (data, checksum, indexes being used, etc.) are combined with
//! CBOR into a self-describing byte payload and encoded with the `bytewords`
//! encoding into URIs suitable for web transport and QR codes.
//!
//! A UR looks like `ur:<type>/<seq>-<count>/<body>` when it is one part of a
//! multipart transfer, or `ur:<type>/<body>` when the whole payload fits in
//! one string.
//!
//! ```
//! let data = String::from("Ten chars!").repeat(10);
//! let mut encoder = ur_registry::ur::Encoder::bytes(data.as_bytes(), 5).unwrap();
//! let part = encoder.next_part().unwrap();
//! assert_eq!(
//!     part,
//!     "ur:bytes/1-20/lpadbbcsiecyvdidatkpfeghihjtcxiabdfevlms"
//! );
//! let mut decoder = ur_registry::ur::Decoder::default();
//! while !decoder.complete() {
//!     let part = encoder.next_part().unwrap();
//!     // Simulate some communication loss
//!     if encoder.current_index() & 1 > 0 {
//!         decoder.receive(&part).unwrap();
//!     }
//! }
//! assert_eq!(decoder.message().unwrap(), Some(data.as_bytes().to_vec()));
//! ```
//!
//! Decoders accept upper-case input, since QR codes in alphanumeric mode
//! carry URs in capitals.

use tracing::debug;

use crate::bytewords::Style;
use crate::error::ErrorKind;

/// Errors that can happen during encoding and decoding of URs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Bytewords(#[from] crate::bytewords::Error),
    #[error(transparent)]
    Fountain(#[from] crate::fountain::Error),
    /// The string doesn't start with `ur:`.
    #[error("invalid scheme")]
    InvalidScheme,
    /// The type component is missing or contains illegal characters.
    #[error("invalid UR type {0:?}")]
    InvalidType(String),
    /// An encoder was asked to emit an illegal type.
    #[error("UR type {0:?} must consist of lower-case letters, digits and hyphens")]
    IllegalType(String),
    /// The `<seq>-<count>` component is malformed.
    #[error("invalid sequence indicator {0:?}")]
    InvalidIndices(String),
    /// The `<seq>-<count>` component disagrees with the part it carries.
    #[error("sequence indicator {indicator} does not match part {part}")]
    IndicesMismatch { indicator: String, part: String },
    /// The UR belongs to a transfer of a different type.
    #[error("UR type mismatch: expected {expected}, received {received}")]
    TypeMismatch { expected: String, received: String },
    /// A single-part UR arrived while a multipart transfer was in progress.
    #[error("single-part UR received during a multipart transfer")]
    UnexpectedSinglePart,
}

impl Error {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Bytewords(e) => e.kind(),
            Self::Fountain(e) => e.kind(),
            Self::IllegalType(_) => ErrorKind::InvalidArgument,
            Self::InvalidScheme
            | Self::InvalidType(_)
            | Self::InvalidIndices(_)
            | Self::IndicesMismatch { .. }
            | Self::TypeMismatch { .. }
            | Self::UnexpectedSinglePart => ErrorKind::Protocol,
        }
    }
}

/// The shape of a decoded UR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// The UR carries the whole payload.
    SinglePart,
    /// The UR carries one fountain part.
    MultiPart,
}

fn is_valid_type(ur_type: &str) -> bool {
    !ur_type.is_empty()
        && ur_type
            .bytes()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == b'-')
}

fn check_type(ur_type: &str) -> Result<(), Error> {
    if is_valid_type(ur_type) {
        Ok(())
    } else {
        Err(Error::IllegalType(ur_type.into()))
    }
}

/// Encodes a data payload into a single URI.
///
/// # Examples
///
/// ```
/// assert_eq!(
///     ur_registry::ur::encode(b"data", "bytes").unwrap(),
///     "ur:bytes/iehsjyhspmwfwfia"
/// );
/// ```
///
/// # Errors
///
/// Fails if `ur_type` is not a legal UR type.
pub fn encode(data: &[u8], ur_type: &str) -> Result<String, Error> {
    check_type(ur_type)?;
    let body = crate::bytewords::encode(data, Style::Minimal);
    Ok(format!("ur:{ur_type}/{body}"))
}

struct Parsed {
    ur_type: String,
    indices: Option<String>,
    payload: Vec<u8>,
}

fn parse(value: &str) -> Result<Parsed, Error> {
    let lowered = value.to_ascii_lowercase();
    let rest = lowered.strip_prefix("ur:").ok_or(Error::InvalidScheme)?;
    let (ur_type, rest) = rest
        .split_once('/')
        .ok_or_else(|| Error::InvalidType(rest.into()))?;
    if !is_valid_type(ur_type) {
        return Err(Error::InvalidType(ur_type.into()));
    }
    let (indices, body) = match rest.split_once('/') {
        Some((indices, body)) => (Some(indices.to_string()), body),
        None => (None, rest),
    };
    Ok(Parsed {
        ur_type: ur_type.into(),
        indices,
        payload: crate::bytewords::decode(body, Style::Minimal)?,
    })
}

fn parse_indices(indices: &str) -> Result<(u32, u32), Error> {
    let invalid = || Error::InvalidIndices(indices.into());
    let (sequence, count) = indices.split_once('-').ok_or_else(invalid)?;
    let sequence: u32 = sequence.parse().map_err(|_| invalid())?;
    let count: u32 = count.parse().map_err(|_| invalid())?;
    if sequence == 0 || count == 0 {
        return Err(invalid());
    }
    Ok((sequence, count))
}

/// Decodes a single URI (either single- or multi-part) into a byte payload.
///
/// For a multipart UR the payload is the CBOR-encoded fountain part.
///
/// # Errors
///
/// Fails if the scheme, type or bytewords body is malformed.
pub fn decode(value: &str) -> Result<(Kind, Vec<u8>), Error> {
    let parsed = parse(value)?;
    let kind = match parsed.indices {
        Some(indices) => {
            parse_indices(&indices)?;
            Kind::MultiPart
        }
        None => Kind::SinglePart,
    };
    Ok((kind, parsed.payload))
}

/// A uniform resource encoder with an underlying fountain encoding.
///
/// # Examples
///
/// See the [`crate::ur`] module documentation for an example.
#[derive(Debug, Clone)]
pub struct Encoder {
    fountain: crate::fountain::Encoder,
    message: Vec<u8>,
    ur_type: String,
}

impl Encoder {
    /// Creates a new [`Encoder`] for given a message payload.
    ///
    /// The emitted fountain parts will respect the maximum fragment length argument.
    ///
    /// # Examples
    ///
    /// See the [`crate::ur`] module documentation for an example.
    ///
    /// # Errors
    ///
    /// If an empty message or a zero maximum fragment length is passed, or
    /// `ur_type` is not a legal UR type, an error will be returned.
    pub fn new(message: &[u8], max_fragment_length: usize, ur_type: &str) -> Result<Self, Error> {
        check_type(ur_type)?;
        Ok(Self {
            fountain: crate::fountain::Encoder::new(message, max_fragment_length)?,
            message: message.to_vec(),
            ur_type: ur_type.into(),
        })
    }

    /// Creates a new [`bytes`](https://github.com/BlockchainCommons/Research/blob/master/papers/bcr-2020-006-urtypes.md#arbitrary-content-bytes-bytes)
    /// [`Encoder`] for given a message payload.
    ///
    /// # Errors
    ///
    /// If an empty message or a zero maximum fragment length is passed, an error
    /// will be returned.
    pub fn bytes(message: &[u8], max_fragment_length: usize) -> Result<Self, Error> {
        Self::new(message, max_fragment_length, "bytes")
    }

    /// Limits the number of fragments mixed into one part.
    ///
    /// # Errors
    ///
    /// Fails if `max_degree` is zero.
    pub fn with_max_degree(mut self, max_degree: usize) -> Result<Self, Error> {
        self.fountain = self.fountain.with_max_degree(max_degree)?;
        Ok(self)
    }

    /// Returns the URI corresponding to the next fountain part.
    ///
    /// # Examples
    ///
    /// See the [`crate::ur`] module documentation for an example.
    ///
    /// # Errors
    ///
    /// Only fails if the part cannot be serialized, which an in-memory buffer rules out.
    pub fn next_part(&mut self) -> Result<String, Error> {
        let part = self.fountain.next_part();
        let body = crate::bytewords::encode(&part.cbor()?, Style::Minimal);
        Ok(format!("ur:{}/{}/{}", self.ur_type, part.sequence_id(), body))
    }

    /// Returns the whole message as one single-part URI.
    ///
    /// # Errors
    ///
    /// Never fails for an encoder that was successfully constructed.
    pub fn single_part(&self) -> Result<String, Error> {
        encode(&self.message, &self.ur_type)
    }

    /// Whether the message fits in a single fragment.
    #[must_use]
    pub fn is_single_part(&self) -> bool {
        self.fountain.fragment_count() == 1
    }

    /// Returns the current count of already emitted parts.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.fountain.current_sequence()
    }

    /// Returns the number of segments the original message has been split up into.
    #[must_use]
    pub fn fragment_count(&self) -> usize {
        self.fountain.fragment_count()
    }

    #[must_use]
    pub fn ur_type(&self) -> &str {
        &self.ur_type
    }
}

/// A uniform resource decoder able to receive URIs that encode a fountain part.
///
/// # Examples
///
/// See the [`crate::ur`] module documentation for an example.
#[derive(Debug, Default)]
pub struct Decoder {
    fountain: crate::fountain::Decoder,
    ur_type: Option<String>,
    single: Option<Vec<u8>>,
}

impl Decoder {
    /// Receives a URI representing a CBOR and `bytewords`-encoded fountain part
    /// or a whole single-part payload.
    ///
    /// Returns whether the UR contributed new information.
    ///
    /// # Errors
    ///
    /// If the encoding is malformed, belongs to a transfer of another type, or
    /// carries a part inconsistent with the parts received so far, an error is
    /// returned and the decoder is left as it was.
    pub fn receive(&mut self, value: &str) -> Result<bool, Error> {
        if self.complete() {
            return Ok(false);
        }
        let parsed = parse(value)?;
        if let Some(expected) = &self.ur_type {
            if *expected != parsed.ur_type {
                debug!(%expected, received = %parsed.ur_type, "rejecting UR of another type");
                return Err(Error::TypeMismatch {
                    expected: expected.clone(),
                    received: parsed.ur_type,
                });
            }
        }

        let progressed = match parsed.indices {
            None => {
                if self.fountain.expected_fragment_count().is_some() {
                    debug!(ur_type = %parsed.ur_type, "rejecting single-part UR mid-transfer");
                    return Err(Error::UnexpectedSinglePart);
                }
                self.single = Some(parsed.payload);
                true
            }
            Some(indices) => {
                let (sequence, count) = parse_indices(&indices)?;
                let part = crate::fountain::Part::from_cbor(&parsed.payload)?;
                if part.sequence() != sequence || part.sequence_count() != count {
                    return Err(Error::IndicesMismatch {
                        indicator: indices,
                        part: part.sequence_id(),
                    });
                }
                self.fountain.receive(&part)?
            }
        };
        self.ur_type.get_or_insert(parsed.ur_type);
        Ok(progressed)
    }

    /// Returns whether the decoder is complete and hence the message available.
    #[must_use]
    pub fn complete(&self) -> bool {
        self.single.is_some() || self.fountain.complete()
    }

    /// If [`complete`], returns the decoded message, `None` otherwise.
    ///
    /// # Errors
    ///
    /// If an inconsistent internal state is detected, an error will be returned.
    ///
    /// [`complete`]: Decoder::complete
    pub fn message(&self) -> Result<Option<Vec<u8>>, Error> {
        match &self.single {
            Some(message) => Ok(Some(message.clone())),
            None => Ok(self.fountain.message()?),
        }
    }

    /// The type of the UR being received, known after the first accepted part.
    #[must_use]
    pub fn ur_type(&self) -> Option<&str> {
        self.ur_type.as_deref()
    }

    /// Reports which fragments are still missing.
    #[must_use]
    pub fn progress(&self) -> crate::fountain::Progress {
        match self.single {
            Some(_) => crate::fountain::Progress {
                expected: Some(1),
                resolved: 1,
                processed: 1,
                ..crate::fountain::Progress::default()
            },
            None => self.fountain.progress(),
        }
    }

    /// Decodes the completed payload into the registry object its UR type names.
    ///
    /// # Errors
    ///
    /// Fails if the message isn't complete yet, or the registry doesn't know the
    /// type or rejects the payload.
    pub fn resolve(
        &self,
        registry: &crate::registry::TagRegistry,
    ) -> Result<crate::registry::RegistryObject, crate::error::Error> {
        let message = self.message()?.ok_or(crate::error::Error::Incomplete)?;
        let ur_type = self.ur_type().ok_or(crate::error::Error::Incomplete)?;
        Ok(registry.decode(ur_type, &message)?)
    }
}
