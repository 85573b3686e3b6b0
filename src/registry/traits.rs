use minicbor::encode::Write;
use minicbor::{Decoder, Encoder};

use super::{cbor, Error, RegistryType};
use crate::config::Config;

/// A typed object with a UR type, a CBOR tag and a canonical CBOR form.
pub trait RegistryItem: Sized {
    fn registry_type() -> RegistryType;

    /// Writes the untagged CBOR form.
    ///
    /// # Errors
    ///
    /// Fails only if the writer fails.
    fn encode_cbor<W: Write>(
        &self,
        e: &mut Encoder<W>,
    ) -> Result<(), minicbor::encode::Error<W::Error>>;

    /// Reads the untagged CBOR form.
    ///
    /// # Errors
    ///
    /// Fails if the item is malformed, misses required fields or violates a
    /// value constraint.
    fn decode_cbor(d: &mut Decoder<'_>) -> Result<Self, Error>;

    /// Writes the object preceded by its tag, as it appears nested in other objects.
    ///
    /// # Errors
    ///
    /// Fails only if the writer fails.
    fn encode_tagged<W: Write>(
        &self,
        e: &mut Encoder<W>,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        cbor::tag(e, Self::registry_type().tag())?;
        self.encode_cbor(e)
    }

    /// Reads an object preceded by its tag.
    ///
    /// # Errors
    ///
    /// Fails if the tag is absent or different, or the object is malformed.
    fn decode_tagged(d: &mut Decoder<'_>) -> Result<Self, Error> {
        cbor::expect_tag(d, Self::registry_type().tag())?;
        Self::decode_cbor(d)
    }

    /// The canonical untagged CBOR bytes carried in a UR of this type.
    ///
    /// # Errors
    ///
    /// Never fails in practice; the in-memory writer is infallible.
    fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut e = Encoder::new(Vec::new());
        self.encode_cbor(&mut e)
            .map_err(|err| Error::Cbor(err.to_string()))?;
        Ok(e.into_writer())
    }

    /// Decodes an object from exactly `bytes`.
    ///
    /// # Errors
    ///
    /// Fails for malformed input and for input with trailing bytes.
    fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let mut d = Decoder::new(bytes);
        let item = Self::decode_cbor(&mut d)?;
        cbor::finish(&d)?;
        Ok(item)
    }

    /// Creates a UR encoder streaming this object.
    ///
    /// # Errors
    ///
    /// Fails for a zero `max_fragment_length`.
    fn to_ur_encoder(
        &self,
        max_fragment_length: usize,
    ) -> Result<crate::ur::Encoder, crate::error::Error> {
        Ok(crate::ur::Encoder::new(
            &self.to_bytes()?,
            max_fragment_length,
            Self::registry_type().ur_type(),
        )?)
    }

    /// Creates a UR encoder streaming this object with the given settings.
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid.
    fn to_ur_encoder_with(
        &self,
        config: &Config,
    ) -> Result<crate::ur::Encoder, crate::error::Error> {
        config.validate()?;
        let encoder = self.to_ur_encoder(config.max_fragment_length)?;
        match config.max_degree {
            Some(max_degree) => Ok(encoder.with_max_degree(max_degree)?),
            None => Ok(encoder),
        }
    }
}
