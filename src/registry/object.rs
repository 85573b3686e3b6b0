use super::ethereum::{EthSignRequest, EthSignature};
use super::solana::{SolSignRequest, SolSignature};
use super::{
    CryptoAccount, CryptoCoinInfo, CryptoECKey, CryptoHDKey, CryptoKeyPath, CryptoMultiAccounts,
    CryptoOutput, CryptoPSBT, Error, RegistryItem, RegistryType,
};

/// Any object the registry knows how to decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryObject {
    HDKey(CryptoHDKey),
    KeyPath(CryptoKeyPath),
    CoinInfo(CryptoCoinInfo),
    ECKey(CryptoECKey),
    Output(CryptoOutput),
    Account(CryptoAccount),
    Psbt(CryptoPSBT),
    EthSignRequest(EthSignRequest),
    EthSignature(EthSignature),
    SolSignRequest(SolSignRequest),
    SolSignature(SolSignature),
    MultiAccounts(CryptoMultiAccounts),
}

/// Borrows the concrete object out of a [`RegistryObject`].
pub(crate) trait Variant: RegistryItem {
    fn from_object(object: &RegistryObject) -> Option<&Self>;
}

macro_rules! impl_registry_object {
    ($($variant:ident($item:ty)),+ $(,)?) => {
        $(
            impl From<$item> for RegistryObject {
                fn from(item: $item) -> Self {
                    Self::$variant(item)
                }
            }

            impl Variant for $item {
                fn from_object(object: &RegistryObject) -> Option<&Self> {
                    match object {
                        RegistryObject::$variant(item) => Some(item),
                        _ => None,
                    }
                }
            }

            impl TryFrom<RegistryObject> for $item {
                type Error = RegistryObject;

                fn try_from(object: RegistryObject) -> Result<Self, Self::Error> {
                    match object {
                        RegistryObject::$variant(item) => Ok(item),
                        other => Err(other),
                    }
                }
            }
        )+

        impl RegistryObject {
            /// The UR type and tag of the wrapped object.
            #[must_use]
            pub fn registry_type(&self) -> RegistryType {
                match self {
                    $(Self::$variant(_) => <$item>::registry_type(),)+
                }
            }

            /// The canonical CBOR bytes of the wrapped object.
            ///
            /// # Errors
            ///
            /// Never fails in practice; the in-memory writer is infallible.
            pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
                match self {
                    $(Self::$variant(item) => item.to_bytes(),)+
                }
            }

            /// Creates a UR encoder streaming the wrapped object.
            ///
            /// # Errors
            ///
            /// Fails if the configuration is invalid.
            pub fn to_ur_encoder_with(
                &self,
                config: &crate::config::Config,
            ) -> Result<crate::ur::Encoder, crate::error::Error> {
                match self {
                    $(Self::$variant(item) => item.to_ur_encoder_with(config),)+
                }
            }
        }
    };
}

impl_registry_object! {
    HDKey(CryptoHDKey),
    KeyPath(CryptoKeyPath),
    CoinInfo(CryptoCoinInfo),
    ECKey(CryptoECKey),
    Output(CryptoOutput),
    Account(CryptoAccount),
    Psbt(CryptoPSBT),
    EthSignRequest(EthSignRequest),
    EthSignature(EthSignature),
    SolSignRequest(SolSignRequest),
    SolSignature(SolSignature),
    MultiAccounts(CryptoMultiAccounts),
}

impl RegistryObject {
    #[must_use]
    pub fn ur_type(&self) -> &'static str {
        self.registry_type().ur_type()
    }
}
