//! Low-level CBOR helpers shared by the registry objects.

use minicbor::data::{Tag, Type};
use minicbor::encode::Write;
use minicbor::{Decoder, Encoder};

use super::Error;

/// Writes a tag head; the tagged item follows.
pub(crate) fn tag<W: Write>(
    e: &mut Encoder<W>,
    tag: u64,
) -> Result<(), minicbor::encode::Error<W::Error>> {
    e.tag(Tag::Unassigned(tag))?;
    Ok(())
}

/// The number of a registry tag. minicbor names only tags below 37, none of
/// which identify a registry item.
fn registry_tag(tag: Tag) -> Option<u64> {
    match tag {
        Tag::Unassigned(n) => Some(n),
        _ => None,
    }
}

/// Returns the registry tag at the current position without consuming it.
pub(crate) fn peek_tag(d: &mut Decoder<'_>) -> Result<Option<u64>, Error> {
    if d.datatype()? != Type::Tag {
        return Ok(None);
    }
    Ok(registry_tag(d.probe().tag()?))
}

/// Consumes a tag head, failing unless it carries `expected`.
pub(crate) fn expect_tag(d: &mut Decoder<'_>, expected: u64) -> Result<(), Error> {
    match peek_tag(d)? {
        Some(found) if found == expected => {
            d.tag()?;
            Ok(())
        }
        found => Err(Error::UnexpectedTag { expected, found }),
    }
}

pub(crate) fn array_len(d: &mut Decoder<'_>) -> Result<u64, Error> {
    d.array()?.ok_or(Error::IndefiniteLength)
}

/// Walks a definite-length map, handing every unsigned integer key to `field`.
///
/// Entries with any other key type are skipped. `field` must consume the value
/// of every key it is given, skipping the ones it doesn't know.
pub(crate) fn decode_map<'b, F>(d: &mut Decoder<'b>, mut field: F) -> Result<(), Error>
where
    F: FnMut(u64, &mut Decoder<'b>) -> Result<(), Error>,
{
    let len = d.map()?.ok_or(Error::IndefiniteLength)?;
    for _ in 0..len {
        match d.datatype()? {
            Type::U8 | Type::U16 | Type::U32 | Type::U64 => {
                let key = d.u64()?;
                field(key, d)?;
            }
            _ => {
                d.skip()?;
                d.skip()?;
            }
        }
    }
    Ok(())
}

/// Fails if the decoder hasn't consumed its whole input.
pub(crate) fn finish(d: &Decoder<'_>) -> Result<(), Error> {
    match d.input().len() - d.position() {
        0 => Ok(()),
        rest => Err(Error::TrailingBytes(rest)),
    }
}

pub(crate) fn required<T>(
    value: Option<T>,
    ur_type: &'static str,
    field: &'static str,
) -> Result<T, Error> {
    value.ok_or(Error::MissingField { ur_type, field })
}

pub(crate) fn invalid(
    ur_type: &'static str,
    field: &'static str,
    reason: impl Into<String>,
) -> Error {
    Error::InvalidField {
        ur_type,
        field,
        reason: reason.into(),
    }
}

/// Reads a `uuid`-tagged 16-byte request id.
pub(crate) fn request_id(d: &mut Decoder<'_>, ur_type: &'static str) -> Result<[u8; 16], Error> {
    expect_tag(d, super::UUID.tag())?;
    d.bytes()?
        .try_into()
        .map_err(|_| invalid(ur_type, "request_id", "expected 16 bytes"))
}

pub(crate) fn write_request_id<W: Write>(
    e: &mut Encoder<W>,
    id: &[u8; 16],
) -> Result<(), minicbor::encode::Error<W::Error>> {
    tag(e, super::UUID.tag())?;
    e.bytes(id)?;
    Ok(())
}

/// Validates a caller-supplied request id.
pub(crate) fn check_request_id(id: &[u8]) -> Result<[u8; 16], Error> {
    id.try_into().map_err(|_| {
        Error::InvalidArgument(format!("request id must be 16 bytes, received {}", id.len()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_heads() {
        for (value, expected) in [
            (37_u64, "d825"),
            (303, "d9012f"),
            (1103, "d9044f"),
            (0x1_0000, "da00010000"),
            (0x1_0000_0000, "db0000000100000000"),
        ] {
            let mut e = Encoder::new(Vec::new());
            tag(&mut e, value).unwrap();
            let bytes = e.into_writer();
            assert_eq!(hex::encode(&bytes), expected);
            let mut d = Decoder::new(&bytes);
            assert_eq!(peek_tag(&mut d).unwrap(), Some(value));
            assert_eq!(d.position(), 0);
            expect_tag(&mut d, value).unwrap();
            assert_eq!(d.position(), bytes.len());
        }

        // tag 1 (epoch timestamp) is never a registry tag
        let mut d = Decoder::new(&[0xc1, 0x00]);
        assert_eq!(peek_tag(&mut d).unwrap(), None);
        assert_eq!(
            expect_tag(&mut d, 303).unwrap_err(),
            Error::UnexpectedTag {
                expected: 303,
                found: None
            }
        );
    }

    #[test]
    fn test_expect_tag() {
        let bytes = hex::decode("d9013001").unwrap();
        let mut d = Decoder::new(&bytes);
        assert_eq!(peek_tag(&mut d).unwrap(), Some(304));
        assert_eq!(
            expect_tag(&mut d, 303).unwrap_err(),
            Error::UnexpectedTag {
                expected: 303,
                found: Some(304)
            }
        );
        let mut d = Decoder::new(&[0x01]);
        assert_eq!(peek_tag(&mut d).unwrap(), None);
        assert_eq!(
            expect_tag(&mut d, 303).unwrap_err(),
            Error::UnexpectedTag {
                expected: 303,
                found: None
            }
        );
    }

    #[test]
    fn test_decode_map_skips_foreign_keys() {
        // {1: 2, "a": 3, -1: 4, 9: [5]}
        let bytes = hex::decode("a401026161032004098105").unwrap();
        let mut d = Decoder::new(&bytes);
        let mut seen = Vec::new();
        decode_map(&mut d, |key, d| {
            seen.push(key);
            d.skip()?;
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, vec![1, 9]);
        finish(&d).unwrap();
    }

    #[test]
    fn test_indefinite_map_rejected() {
        let bytes = hex::decode("bf0102ff").unwrap();
        let mut d = Decoder::new(&bytes);
        assert_eq!(
            decode_map(&mut d, |_, d| Ok(d.skip()?)).unwrap_err(),
            Error::IndefiniteLength
        );
    }

    #[test]
    fn test_trailing_bytes() {
        let bytes = [0x01, 0x02, 0x03];
        let mut d = Decoder::new(&bytes);
        d.u8().unwrap();
        assert_eq!(finish(&d).unwrap_err(), Error::TrailingBytes(2));
    }
}
