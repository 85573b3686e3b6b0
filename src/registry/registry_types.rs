/// A UR type name paired with the CBOR tag identifying it inside other objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegistryType {
    ur_type: &'static str,
    tag: u64,
}

impl RegistryType {
    #[must_use]
    pub const fn new(ur_type: &'static str, tag: u64) -> Self {
        Self { ur_type, tag }
    }

    #[must_use]
    pub const fn ur_type(&self) -> &'static str {
        self.ur_type
    }

    #[must_use]
    pub const fn tag(&self) -> u64 {
        self.tag
    }
}

pub const UUID: RegistryType = RegistryType::new("uuid", 37);
pub const CRYPTO_HDKEY: RegistryType = RegistryType::new("crypto-hdkey", 303);
pub const CRYPTO_KEYPATH: RegistryType = RegistryType::new("crypto-keypath", 304);
pub const CRYPTO_COIN_INFO: RegistryType = RegistryType::new("crypto-coin-info", 305);
pub const CRYPTO_ECKEY: RegistryType = RegistryType::new("crypto-eckey", 306);
pub const CRYPTO_OUTPUT: RegistryType = RegistryType::new("crypto-output", 308);
pub const CRYPTO_PSBT: RegistryType = RegistryType::new("crypto-psbt", 310);
pub const CRYPTO_ACCOUNT: RegistryType = RegistryType::new("crypto-account", 311);

// vendor extensions
pub const ETH_SIGN_REQUEST: RegistryType = RegistryType::new("eth-sign-request", 401);
pub const ETH_SIGNATURE: RegistryType = RegistryType::new("eth-signature", 402);
pub const SOL_SIGN_REQUEST: RegistryType = RegistryType::new("sol-sign-request", 1101);
pub const SOL_SIGNATURE: RegistryType = RegistryType::new("sol-signature", 1102);
pub const CRYPTO_MULTI_ACCOUNTS: RegistryType =
    RegistryType::new("crypto-multi-accounts", 1103);
