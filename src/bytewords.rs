//! The bytewords alphabet layer underneath every UR.
//!
//! Each byte maps to one of 256 four-letter words, or to the first and last
//! letter of that word in the minimal style used inside URs. A big-endian
//! CRC32 of the payload is appended before encoding, so transcription and scan
//! errors surface on decode rather than as corrupt payloads.
//!
//! ```
//! use ur_registry::bytewords::{decode, encode, Style};
//!
//! assert_eq!(encode(&[0x00, 0x2a, 0xff], Style::Standard), "able door zoom ruby dice zaps real");
//! assert_eq!(encode(&[0x00, 0x2a, 0xff], Style::Uri), "able-door-zoom-ruby-dice-zaps-real");
//! assert_eq!(encode(&[0x00, 0x2a, 0xff], Style::Minimal), "aedrzmrydezsrl");
//!
//! // QR codes in alphanumeric mode carry capitals
//! assert_eq!(decode("AEDRZMRYDEZSRL", Style::Minimal).unwrap(), [0x00, 0x2a, 0xff]);
//! ```

use crate::constants::{MINIMALS, MINIMAL_IDXS, WORDS, WORD_IDXS};
use crate::error::ErrorKind;

const CHECKSUM_LEN: usize = 4;

/// How the words of an encoding are spelled and joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// `able door zoom`
    Standard,
    /// `able-door-zoom`
    Uri,
    /// `aedrzm`, as found in URs
    Minimal,
}

impl Style {
    fn separator(self) -> &'static str {
        match self {
            Self::Standard => " ",
            Self::Uri => "-",
            Self::Minimal => "",
        }
    }

    fn words(self) -> &'static [&'static str; 256] {
        match self {
            Self::Standard | Self::Uri => &WORDS,
            Self::Minimal => &MINIMALS,
        }
    }

    fn indexes(self) -> &'static phf::Map<&'static str, u8> {
        match self {
            Self::Standard | Self::Uri => &WORD_IDXS,
            Self::Minimal => &MINIMAL_IDXS,
        }
    }

    fn word_len(self) -> usize {
        match self {
            Self::Standard | Self::Uri => 4,
            Self::Minimal => 2,
        }
    }
}

/// Errors raised while decoding bytewords.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A word isn't in the alphabet, which often means the wrong [`Style`].
    #[error("invalid word")]
    InvalidWord,
    /// The trailing CRC32 doesn't match the payload.
    #[error("invalid checksum")]
    InvalidChecksum,
    /// A minimal encoding with an odd number of letters.
    #[error("invalid length")]
    InvalidLength,
    #[error("bytewords string contains non-ASCII characters")]
    NonAscii,
}

impl Error {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidChecksum => ErrorKind::Checksum,
            Self::InvalidWord | Self::InvalidLength | Self::NonAscii => ErrorKind::Protocol,
        }
    }
}

/// Encodes `data` followed by its checksum.
#[must_use]
pub fn encode(data: &[u8], style: Style) -> String {
    let checksum = crate::crc32().checksum(data).to_be_bytes();
    let words = style.words();
    let separator = style.separator();
    let count = data.len() + CHECKSUM_LEN;
    let mut encoded = String::with_capacity(count * (style.word_len() + separator.len()));
    for (i, &byte) in data.iter().chain(&checksum).enumerate() {
        if i > 0 {
            encoded.push_str(separator);
        }
        encoded.push_str(words[usize::from(byte)]);
    }
    encoded
}

/// Decodes a checksummed encoding back into its payload. Letter case is ignored.
///
/// # Errors
///
/// Fails for words outside the alphabet, odd-length minimal input, non-ASCII
/// input and checksum mismatches.
pub fn decode(encoded: &str, style: Style) -> Result<Vec<u8>, Error> {
    if !encoded.is_ascii() {
        return Err(Error::NonAscii);
    }
    let indexes = style.indexes();
    let mut bytes = match style {
        Style::Minimal => {
            if encoded.len() % 2 != 0 {
                return Err(Error::InvalidLength);
            }
            encoded
                .as_bytes()
                .chunks_exact(2)
                .map(|word| lookup(word, indexes))
                .collect::<Result<Vec<_>, _>>()?
        }
        Style::Standard | Style::Uri => encoded
            .split(style.separator())
            .map(|word| lookup(word.as_bytes(), indexes))
            .collect::<Result<Vec<_>, _>>()?,
    };
    strip_checksum(&mut bytes)?;
    Ok(bytes)
}

fn lookup(word: &[u8], indexes: &phf::Map<&'static str, u8>) -> Result<u8, Error> {
    let mut buf = [0_u8; 4];
    let lowered = buf.get_mut(..word.len()).ok_or(Error::InvalidWord)?;
    lowered.copy_from_slice(word);
    lowered.make_ascii_lowercase();
    let lowered = std::str::from_utf8(lowered).map_err(|_| Error::NonAscii)?;
    indexes.get(lowered).copied().ok_or(Error::InvalidWord)
}

fn strip_checksum(bytes: &mut Vec<u8>) -> Result<(), Error> {
    let split = bytes
        .len()
        .checked_sub(CHECKSUM_LEN)
        .ok_or(Error::InvalidChecksum)?;
    let (payload, checksum) = bytes.split_at(split);
    if crate::crc32().checksum(payload).to_be_bytes() != checksum {
        return Err(Error::InvalidChecksum);
    }
    bytes.truncate(split);
    Ok(())
}
