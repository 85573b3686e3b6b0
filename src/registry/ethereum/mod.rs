//! Ethereum signing requests and their signatures.

mod sign_request;
mod signature;

pub use sign_request::{DataType, EthSignRequest};
pub use signature::EthSignature;
