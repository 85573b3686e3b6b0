use minicbor::encode::Write;
use minicbor::{Decoder, Encoder};

use super::{cbor, Error, RegistryItem, RegistryType, CRYPTO_COIN_INFO};

const COIN_TYPE: u64 = 1;
const NETWORK: u64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Network {
    #[default]
    MainNet = 0,
    TestNet = 1,
}

/// The coin (SLIP-44 type) and network a key is meant for.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CryptoCoinInfo {
    coin_type: Option<u32>,
    network: Option<Network>,
}

impl CryptoCoinInfo {
    #[must_use]
    pub fn new(coin_type: Option<u32>, network: Option<Network>) -> Self {
        Self { coin_type, network }
    }

    /// SLIP-44 coin type, Bitcoin (`0`) when unset.
    #[must_use]
    pub fn coin_type(&self) -> u32 {
        self.coin_type.unwrap_or(0)
    }

    #[must_use]
    pub fn network(&self) -> Network {
        self.network.unwrap_or_default()
    }
}

impl RegistryItem for CryptoCoinInfo {
    fn registry_type() -> RegistryType {
        CRYPTO_COIN_INFO
    }

    fn encode_cbor<W: Write>(
        &self,
        e: &mut Encoder<W>,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        let len = u64::from(self.coin_type.is_some()) + u64::from(self.network.is_some());
        e.map(len)?;
        if let Some(coin_type) = self.coin_type {
            e.u64(COIN_TYPE)?.u32(coin_type)?;
        }
        if let Some(network) = self.network {
            e.u64(NETWORK)?.u8(network as u8)?;
        }
        Ok(())
    }

    fn decode_cbor(d: &mut Decoder<'_>) -> Result<Self, Error> {
        let ur_type = CRYPTO_COIN_INFO.ur_type();
        let mut info = Self::default();
        cbor::decode_map(d, |key, d| {
            match key {
                COIN_TYPE => info.coin_type = Some(d.u32()?),
                NETWORK => {
                    info.network = Some(match d.u64()? {
                        0 => Network::MainNet,
                        1 => Network::TestNet,
                        other => {
                            return Err(cbor::invalid(
                                ur_type,
                                "network",
                                format!("expected 0 or 1, received {other}"),
                            ))
                        }
                    });
                }
                _ => d.skip()?,
            }
            Ok(())
        })?;
        Ok(info)
    }
}
