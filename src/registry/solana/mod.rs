//! Solana signing requests and their signatures.

mod sign_request;
mod signature;

pub use sign_request::{SignType, SolSignRequest};
pub use signature::SolSignature;
