//! Split up big payloads into constantly sized chunks which can be recombined by a decoder.
//!
//! The `fountain` module provides an implementation of a fountain encoder, which splits
//! up a byte payload into multiple segments and emits an unbounded stream of parts which
//! can be recombined at the receiving decoder side. The emitted parts are either original
//! payload segments, or constructed by xor-ing a certain set of payload segments.
//!
//! A seeded pseudo-random generator is used to determine which segments to combine into a
//! part. The seed depends only on the part's sequence number and the message checksum, so
//! any decoder recomputes the same combination from the part header alone.
//!
//! ```
//! let data = String::from("Ten chars!").repeat(10);
//! let mut encoder = ur_registry::fountain::Encoder::new(data.as_bytes(), 25).unwrap();
//! let mut decoder = ur_registry::fountain::Decoder::default();
//! while !decoder.complete() {
//!     assert_eq!(decoder.message().unwrap(), None);
//!     let part = encoder.next_part();
//!     decoder.receive(&part).unwrap();
//! }
//! assert_eq!(decoder.message().unwrap(), Some(data.as_bytes().to_vec()));
//! ```
//!
//! The decoder keeps every received combination in reduced row-echelon form over GF(2), so
//! it completes as soon as the received parts determine every segment, regardless of the
//! order or multiplicity in which they arrived.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, trace, warn};

use crate::error::ErrorKind;

/// Errors that can happen during fountain encoding and decoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The encoder was given an empty message.
    #[error("expected non-empty message")]
    EmptyMessage,
    /// The encoder was given a zero maximum fragment length.
    #[error("expected positive maximum fragment length")]
    InvalidFragmentLen,
    /// The encoder was given a zero degree limit.
    #[error("expected positive maximum degree")]
    InvalidMaxDegree,
    /// The message length doesn't fit the 32-bit part header.
    #[error("message of {0} bytes is too long for a part header")]
    MessageTooLong(usize),
    /// The part carries no data.
    #[error("expected non-empty part")]
    EmptyPart,
    /// The part header is malformed on its own.
    #[error("invalid part: {0}")]
    InvalidPart(&'static str),
    /// The part belongs to a different transmission than the parts received before.
    #[error("part inconsistent with previous ones: {field} is {found}, expected {expected}")]
    InconsistentPart {
        field: &'static str,
        expected: u64,
        found: u64,
    },
    /// The reassembled message doesn't match the checksum announced by the parts.
    #[error("invalid checksum: expected {expected:#010x}, computed {computed:#010x}")]
    InvalidChecksum { expected: u32, computed: u32 },
    /// The part's CBOR representation couldn't be read or written.
    #[error("CBOR error: {0}")]
    Cbor(String),
}

impl Error {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyMessage
            | Self::InvalidFragmentLen
            | Self::InvalidMaxDegree
            | Self::MessageTooLong(_) => ErrorKind::InvalidArgument,
            Self::EmptyPart | Self::InvalidPart(_) | Self::InconsistentPart { .. } => {
                ErrorKind::Protocol
            }
            Self::InvalidChecksum { .. } => ErrorKind::Checksum,
            Self::Cbor(_) => ErrorKind::Schema,
        }
    }
}

/// Computes the nominal fragment length: the smallest length that splits `data_length`
/// bytes into as few fragments as `max_fragment_length` allows.
#[must_use]
pub fn fragment_length(data_length: usize, max_fragment_length: usize) -> usize {
    let fragment_count = data_length.div_ceil(max_fragment_length);
    data_length.div_ceil(fragment_count.max(1))
}

/// Splits `data` into fragments of `fragment_length` bytes, zero-padding the last one.
#[must_use]
pub fn partition(mut data: Vec<u8>, fragment_length: usize) -> Vec<Vec<u8>> {
    let padding = (fragment_length - (data.len() % fragment_length)) % fragment_length;
    data.resize(data.len() + padding, 0);
    data.chunks(fragment_length).map(<[u8]>::to_vec).collect()
}

/// Concatenates fragments and strips the padding beyond `message_length`.
///
/// # Errors
///
/// Fails if the fragments hold fewer than `message_length` bytes.
pub fn join(data: Vec<Vec<u8>>, message_length: usize) -> Result<Vec<u8>, Error> {
    if data.iter().map(Vec::len).sum::<usize>() < message_length {
        return Err(Error::InvalidPart("insufficient data"));
    }
    let mut flattened: Vec<u8> = data.into_iter().flatten().collect();
    flattened.truncate(message_length);
    Ok(flattened)
}

/// Returns the fragment indexes combined into the part with the given 1-based sequence number.
///
/// A zero sequence number or fragment count names no fragments.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn choose_fragments(sequence: usize, fragment_count: usize, checksum: u32) -> Vec<usize> {
    if sequence == 0 || fragment_count == 0 {
        return Vec::new();
    }
    if sequence <= fragment_count {
        return vec![sequence - 1];
    }
    let mut seed = [0_u8; 8];
    seed[..4].copy_from_slice(&(sequence as u32).to_be_bytes());
    seed[4..].copy_from_slice(&checksum.to_be_bytes());
    let mut rng = crate::xoshiro::Xoshiro256::new(&seed);
    let degree = crate::sampler::choose_degree(fragment_count, &mut rng);
    let mut indexes = rng.shuffled((0..fragment_count).collect());
    indexes.truncate(degree);
    indexes
}

fn xor_into(v1: &mut [u8], v2: &[u8]) {
    for (x1, &x2) in v1.iter_mut().zip(v2.iter()) {
        *x1 ^= x2;
    }
}

/// One element of the fountain stream: a single fragment or the xor of several.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    sequence: u32,
    sequence_count: u32,
    message_length: u32,
    checksum: u32,
    data: Vec<u8>,
}

impl<C> minicbor::Encode<C> for Part {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.array(5)?
            .u32(self.sequence)?
            .u32(self.sequence_count)?
            .u32(self.message_length)?
            .u32(self.checksum)?
            .bytes(&self.data)?;
        Ok(())
    }
}

impl<'b, C> minicbor::Decode<'b, C> for Part {
    fn decode(
        d: &mut minicbor::Decoder<'b>,
        _ctx: &mut C,
    ) -> Result<Self, minicbor::decode::Error> {
        if d.array()? != Some(5) {
            return Err(minicbor::decode::Error::message(
                "invalid CBOR array length",
            ));
        }
        Ok(Self {
            sequence: d.u32()?,
            sequence_count: d.u32()?,
            message_length: d.u32()?,
            checksum: d.u32()?,
            data: d.bytes()?.to_vec(),
        })
    }
}

impl Part {
    #[must_use]
    pub fn new(
        sequence: u32,
        sequence_count: u32,
        message_length: u32,
        checksum: u32,
        data: Vec<u8>,
    ) -> Self {
        Self {
            sequence,
            sequence_count,
            message_length,
            checksum,
            data,
        }
    }

    /// Decodes a part from its CBOR array representation.
    ///
    /// # Errors
    ///
    /// Fails if the bytes aren't a five-element array of four integers and a byte string.
    pub fn from_cbor(cbor: &[u8]) -> Result<Self, Error> {
        minicbor::decode(cbor).map_err(|e| Error::Cbor(e.to_string()))
    }

    /// Encodes the part as the CBOR array carried inside a multipart UR.
    ///
    /// # Errors
    ///
    /// Only fails if the CBOR writer fails, which an in-memory buffer does not.
    pub fn cbor(&self) -> Result<Vec<u8>, Error> {
        minicbor::to_vec(self).map_err(|e| Error::Cbor(e.to_string()))
    }

    /// The fragment indexes xor-ed into this part, empty for a malformed header.
    #[must_use]
    pub fn indexes(&self) -> Vec<usize> {
        choose_fragments(
            self.sequence as usize,
            self.sequence_count as usize,
            self.checksum,
        )
    }

    /// Whether the part is a single, unmixed fragment.
    #[must_use]
    pub fn is_simple(&self) -> bool {
        self.sequence != 0 && self.sequence <= self.sequence_count
    }

    /// The `<sequence>-<count>` path component of a multipart UR.
    #[must_use]
    pub fn sequence_id(&self) -> String {
        format!("{}-{}", self.sequence, self.sequence_count)
    }

    #[must_use]
    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    #[must_use]
    pub fn sequence_count(&self) -> u32 {
        self.sequence_count
    }

    #[must_use]
    pub fn message_length(&self) -> u32 {
        self.message_length
    }

    #[must_use]
    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// An encoder emitting the infinite fountain part sequence for one message.
///
/// The first `fragment_count()` parts are the plain fragments in order; every later part
/// is a pseudo-randomly chosen combination of fragments.
#[derive(Debug, Clone)]
pub struct Encoder {
    fragments: Vec<Vec<u8>>,
    message_length: u32,
    checksum: u32,
    current_sequence: u32,
    max_degree: Option<usize>,
}

impl Encoder {
    /// Creates an encoder splitting `message` into fragments of at most
    /// `max_fragment_length` bytes.
    ///
    /// # Errors
    ///
    /// Fails for an empty message, a zero `max_fragment_length`, or a message longer than
    /// a part header can describe.
    pub fn new(message: &[u8], max_fragment_length: usize) -> Result<Self, Error> {
        if message.is_empty() {
            return Err(Error::EmptyMessage);
        }
        if max_fragment_length == 0 {
            return Err(Error::InvalidFragmentLen);
        }
        let message_length =
            u32::try_from(message.len()).map_err(|_| Error::MessageTooLong(message.len()))?;
        let fragment_length = fragment_length(message.len(), max_fragment_length);
        Ok(Self {
            fragments: partition(message.to_vec(), fragment_length),
            message_length,
            checksum: crate::crc32().checksum(message),
            current_sequence: 0,
            max_degree: None,
        })
    }

    /// Limits mixed parts to at most `max_degree` fragments.
    ///
    /// Mixed sequence numbers whose combination is larger are skipped rather than altered,
    /// so every emitted part stays decodable by any UR decoder.
    ///
    /// # Errors
    ///
    /// Fails if `max_degree` is zero.
    pub fn with_max_degree(mut self, max_degree: usize) -> Result<Self, Error> {
        if max_degree == 0 {
            return Err(Error::InvalidMaxDegree);
        }
        self.max_degree = Some(max_degree);
        Ok(self)
    }

    /// Emits the next part of the fountain stream.
    #[allow(clippy::cast_possible_truncation)]
    pub fn next_part(&mut self) -> Part {
        loop {
            // sequence number 0 is reserved, so wrapping restarts the stream at 1
            self.current_sequence = self.current_sequence.wrapping_add(1).max(1);
            let indexes = choose_fragments(
                self.current_sequence as usize,
                self.fragments.len(),
                self.checksum,
            );
            if self.max_degree.map_or(false, |max| indexes.len() > max) {
                trace!(
                    sequence = self.current_sequence,
                    degree = indexes.len(),
                    "skipping part above degree limit"
                );
                continue;
            }
            let mut mixed = vec![0; self.fragment_length()];
            for index in indexes {
                xor_into(&mut mixed, &self.fragments[index]);
            }
            return Part {
                sequence: self.current_sequence,
                sequence_count: self.fragments.len() as u32,
                message_length: self.message_length,
                checksum: self.checksum,
                data: mixed,
            };
        }
    }

    /// The sequence number of the most recently emitted part, `0` before the first.
    #[must_use]
    pub fn current_sequence(&self) -> usize {
        self.current_sequence as usize
    }

    #[must_use]
    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    #[must_use]
    pub fn fragment_length(&self) -> usize {
        self.fragments.first().map_or(0, Vec::len)
    }

    #[must_use]
    pub fn message_length(&self) -> usize {
        self.message_length as usize
    }

    #[must_use]
    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    /// Whether every plain fragment has been emitted at least once.
    #[must_use]
    pub fn complete(&self) -> bool {
        self.current_sequence() >= self.fragment_count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Params {
    sequence_count: u32,
    message_length: u32,
    checksum: u32,
    fragment_length: usize,
}

impl Params {
    fn of(part: &Part) -> Result<Self, Error> {
        if part.data.is_empty() {
            return Err(Error::EmptyPart);
        }
        if part.sequence == 0 {
            return Err(Error::InvalidPart("sequence number must be positive"));
        }
        if part.sequence_count == 0 {
            return Err(Error::InvalidPart("sequence count must be positive"));
        }
        let capacity = part.data.len() as u64 * u64::from(part.sequence_count);
        let message_length = u64::from(part.message_length);
        if message_length == 0
            || message_length > capacity
            || message_length <= capacity - part.data.len() as u64
        {
            return Err(Error::InvalidPart(
                "message length does not match fragment count",
            ));
        }
        Ok(Self {
            sequence_count: part.sequence_count,
            message_length: part.message_length,
            checksum: part.checksum,
            fragment_length: part.data.len(),
        })
    }

    fn check(&self, other: &Self) -> Result<(), Error> {
        let fields = [
            (
                "sequence count",
                u64::from(self.sequence_count),
                u64::from(other.sequence_count),
            ),
            (
                "message length",
                u64::from(self.message_length),
                u64::from(other.message_length),
            ),
            (
                "checksum",
                u64::from(self.checksum),
                u64::from(other.checksum),
            ),
            (
                "fragment length",
                self.fragment_length as u64,
                other.fragment_length as u64,
            ),
        ];
        for (field, expected, found) in fields {
            if expected != found {
                return Err(Error::InconsistentPart {
                    field,
                    expected,
                    found,
                });
            }
        }
        Ok(())
    }
}

/// A linear combination of fragments: the set of xor-ed indexes and the xor of their data.
#[derive(Debug, Clone)]
struct Equation {
    indexes: BTreeSet<usize>,
    data: Vec<u8>,
}

impl Equation {
    fn absorb(&mut self, other: &Self) {
        self.indexes = &self.indexes ^ &other.indexes;
        xor_into(&mut self.data, &other.data);
    }

    fn resolved(&self) -> Option<usize> {
        match self.indexes.len() {
            1 => self.indexes.iter().next().copied(),
            _ => None,
        }
    }
}

/// Snapshot of a decoder's progress, suitable for driving a UI hint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Progress {
    /// Number of fragments in the message, once the first part has arrived.
    pub expected: Option<usize>,
    /// Number of fragments recovered so far.
    pub resolved: usize,
    /// Number of mixed combinations still waiting for more parts.
    pub pending: usize,
    /// Number of valid parts received, including duplicates.
    pub processed: usize,
    /// Indexes of fragments not yet recovered.
    pub missing: Vec<usize>,
}

impl Progress {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn estimated_percent_complete(&self) -> f64 {
        match self.expected {
            Some(expected) if expected > 0 => self.resolved as f64 / expected as f64,
            _ => 0.0,
        }
    }
}

/// A decoder capable of receiving and recombining fountain-encoded transmissions.
///
/// # Examples
///
/// See the [`crate::fountain`] module documentation for an example.
#[derive(Debug, Default)]
pub struct Decoder {
    rows: BTreeMap<usize, Equation>,
    received: BTreeSet<Vec<usize>>,
    params: Option<Params>,
    processed: usize,
    message: Option<Vec<u8>>,
    failure: Option<Error>,
}

impl Decoder {
    /// Receives a fountain-encoded part into the decoder.
    ///
    /// Returns whether the part contributed new information. Duplicates, combinations
    /// already implied by earlier parts, and parts arriving after completion return
    /// `Ok(false)`.
    ///
    /// # Errors
    ///
    /// If the part is malformed or inconsistent with previously received parts, an error
    /// is returned and the decoder state is left untouched. If the message is reassembled
    /// but fails its checksum, [`Error::InvalidChecksum`] is returned and the decoder stays
    /// failed.
    pub fn receive(&mut self, part: &Part) -> Result<bool, Error> {
        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }
        if self.complete() {
            return Ok(false);
        }

        let params = Params::of(part)?;
        match &self.params {
            Some(expected) => {
                if let Err(e) = expected.check(&params) {
                    debug!(sequence = part.sequence, error = %e, "rejecting part");
                    return Err(e);
                }
            }
            None => self.params = Some(params),
        }
        self.processed += 1;

        let mut indexes = part.indexes();
        indexes.sort_unstable();
        if !self.received.insert(indexes.clone()) {
            trace!(sequence = part.sequence, "duplicate part");
            return Ok(false);
        }

        let progressed = self.insert(Equation {
            indexes: indexes.into_iter().collect(),
            data: part.data.clone(),
        });
        if progressed && self.rows.len() == params.sequence_count as usize {
            self.finish(params)?;
        }
        Ok(progressed)
    }

    /// Adds a combination, keeping every stored row free of any other row's pivot.
    fn insert(&mut self, mut equation: Equation) -> bool {
        for (pivot, row) in &self.rows {
            if equation.indexes.contains(pivot) {
                equation.absorb(row);
            }
        }
        let Some(&pivot) = equation.indexes.iter().next() else {
            return false;
        };
        for row in self.rows.values_mut() {
            if row.indexes.contains(&pivot) {
                row.absorb(&equation);
                if let Some(index) = row.resolved() {
                    trace!(index, "fragment resolved");
                }
            }
        }
        if equation.resolved().is_some() {
            trace!(index = pivot, "fragment resolved");
        }
        self.rows.insert(pivot, equation);
        true
    }

    fn finish(&mut self, params: Params) -> Result<(), Error> {
        // full rank, so every row has collapsed to its own pivot
        let fragments = self.rows.values().map(|row| row.data.clone()).collect();
        let message = join(fragments, params.message_length as usize)?;
        let computed = crate::crc32().checksum(&message);
        if computed != params.checksum {
            warn!(
                expected = params.checksum,
                computed, "reassembled message failed its checksum"
            );
            let failure = Error::InvalidChecksum {
                expected: params.checksum,
                computed,
            };
            self.failure = Some(failure.clone());
            return Err(failure);
        }
        debug!(
            message_length = message.len(),
            parts = self.processed,
            "fountain decoding complete"
        );
        self.message = Some(message);
        Ok(())
    }

    /// Returns the decoded message, or `None` while it is still being received.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidChecksum`] if the reassembled message was corrupt.
    pub fn message(&self) -> Result<Option<Vec<u8>>, Error> {
        match &self.failure {
            Some(failure) => Err(failure.clone()),
            None => Ok(self.message.clone()),
        }
    }

    /// Whether the message has been recovered and verified.
    #[must_use]
    pub fn complete(&self) -> bool {
        self.message.is_some()
    }

    /// The number of fragments announced by the received parts.
    #[must_use]
    pub fn expected_fragment_count(&self) -> Option<usize> {
        self.params.map(|p| p.sequence_count as usize)
    }

    /// Reports what has been recovered and which fragments are still missing.
    #[must_use]
    pub fn progress(&self) -> Progress {
        let expected = self.expected_fragment_count();
        let resolved: BTreeSet<usize> = self.rows.values().filter_map(Equation::resolved).collect();
        Progress {
            expected,
            resolved: resolved.len(),
            pending: self.rows.len() - resolved.len(),
            processed: self.processed,
            missing: (0..expected.unwrap_or(0))
                .filter(|i| !resolved.contains(i))
                .collect(),
        }
    }
}
