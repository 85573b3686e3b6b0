use minicbor::encode::Write;
use minicbor::{Decoder, Encoder};

use super::{cbor, CryptoOutput, Error, RegistryItem, RegistryType, CRYPTO_ACCOUNT};

const MASTER_FINGERPRINT: u64 = 1;
const OUTPUT_DESCRIPTORS: u64 = 2;

/// The output descriptors a wallet exports for one master key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CryptoAccount {
    master_fingerprint: u32,
    output_descriptors: Vec<CryptoOutput>,
}

impl CryptoAccount {
    /// # Errors
    ///
    /// Fails if `output_descriptors` is empty.
    pub fn new(
        master_fingerprint: u32,
        output_descriptors: Vec<CryptoOutput>,
    ) -> Result<Self, Error> {
        if output_descriptors.is_empty() {
            return Err(Error::InvalidArgument(
                "an account needs at least one output descriptor".into(),
            ));
        }
        Ok(Self {
            master_fingerprint,
            output_descriptors,
        })
    }

    #[must_use]
    pub fn master_fingerprint(&self) -> u32 {
        self.master_fingerprint
    }

    #[must_use]
    pub fn output_descriptors(&self) -> &[CryptoOutput] {
        &self.output_descriptors
    }
}

impl RegistryItem for CryptoAccount {
    fn registry_type() -> RegistryType {
        CRYPTO_ACCOUNT
    }

    fn encode_cbor<W: Write>(
        &self,
        e: &mut Encoder<W>,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.map(2)?;
        e.u64(MASTER_FINGERPRINT)?.u32(self.master_fingerprint)?;
        e.u64(OUTPUT_DESCRIPTORS)?
            .array(self.output_descriptors.len() as u64)?;
        for output in &self.output_descriptors {
            output.encode_cbor(e)?;
        }
        Ok(())
    }

    fn decode_cbor(d: &mut Decoder<'_>) -> Result<Self, Error> {
        let ur_type = CRYPTO_ACCOUNT.ur_type();
        let (mut master_fingerprint, mut output_descriptors) = (None, None);
        cbor::decode_map(d, |key, d| {
            match key {
                MASTER_FINGERPRINT => master_fingerprint = Some(d.u32()?),
                OUTPUT_DESCRIPTORS => {
                    let len = cbor::array_len(d)?;
                    let outputs = (0..len)
                        .map(|_| CryptoOutput::decode_cbor(d))
                        .collect::<Result<Vec<_>, _>>()?;
                    output_descriptors = Some(outputs);
                }
                _ => d.skip()?,
            }
            Ok(())
        })?;
        let master_fingerprint = cbor::required(master_fingerprint, ur_type, "master_fingerprint")?;
        let output_descriptors = cbor::required(output_descriptors, ur_type, "output_descriptors")?;
        Self::new(master_fingerprint, output_descriptors)
            .map_err(|_| cbor::invalid(ur_type, "output_descriptors", "must not be empty"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{CryptoHDKey, CryptoKeyPath, ScriptExpression};

    fn account() -> CryptoAccount {
        let key = CryptoHDKey::new_extended_key(
            hex::decode("03eb3e2863911826374de86c231a4b76f0b89dfa174afb78d7f478199884d9dd32")
                .unwrap(),
        )
        .unwrap()
        .with_origin(CryptoKeyPath::from_path("m/84'/0'/0'", Some(0x3781_9f25)).unwrap());
        CryptoAccount::new(
            0x3781_9f25,
            vec![CryptoOutput::new(
                vec![ScriptExpression::WitnessPublicKeyHash],
                key,
            )],
        )
        .unwrap()
    }

    #[test]
    fn test_round_trip() {
        let account = account();
        let bytes = account.to_bytes().unwrap();
        assert_eq!(hex::encode(&bytes[..9]), "a2011a37819f250281");
        // outputs sit in the array without the crypto-output tag
        assert_eq!(hex::encode(&bytes[9..15]), "d90194d9012f");
        let decoded = CryptoAccount::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, account);
        assert_eq!(decoded.master_fingerprint(), 0x3781_9f25);
        let output = &decoded.output_descriptors()[0];
        assert_eq!(
            output.hd_key().unwrap().origin().unwrap().path().unwrap(),
            "84'/0'/0'"
        );
    }

    #[test]
    fn test_requires_outputs() {
        assert!(matches!(
            CryptoAccount::new(1, Vec::new()),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            CryptoAccount::from_bytes(&hex::decode("a201010280").unwrap()),
            Err(Error::InvalidField {
                field: "output_descriptors",
                ..
            })
        ));
        assert_eq!(
            CryptoAccount::from_bytes(&hex::decode("a10101").unwrap()).unwrap_err(),
            Error::MissingField {
                ur_type: "crypto-account",
                field: "output_descriptors"
            }
        );
    }
}
