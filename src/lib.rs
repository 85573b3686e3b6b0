//! `ur_registry` moves typed wallet objects between devices that only share a
//! camera and a screen.
//!
//! Objects such as HD keys, PSBTs and sign requests are encoded as canonical
//! CBOR, wrapped in "Uniform Resource" strings and, when too large for one QR
//! code, split into an endless stream of fountain-coded parts. The receiver can
//! start scanning at any time, miss arbitrary parts, and still restores the
//! payload.
//!
//! # Encode binary data
//! ```
//! use ur_registry::bytewords::{encode, Style};
//! let encoded = encode("Some binary data".as_bytes(), Style::Minimal);
//! assert_eq!(encoded, "gujljnihcxidinjthsjpkkcxiehsjyhsnsgdmkht");
//! ```
//!
//! # Stream a registry object
//! ```
//! use ur_registry::registry::{CryptoPSBT, RegistryItem, RegistryObject, TagRegistry};
//! use ur_registry::{Decoder, Encoder};
//!
//! let psbt = CryptoPSBT::new(b"psbt".repeat(100)).unwrap();
//! let mut encoder: Encoder = psbt.to_ur_encoder(50).unwrap();
//! let mut decoder = Decoder::default();
//! while !decoder.complete() {
//!     let part = encoder.next_part().unwrap();
//!     // Simulate some communication loss
//!     if encoder.current_index() % 3 > 0 {
//!         decoder.receive(&part).unwrap();
//!     }
//! }
//! let object = decoder.resolve(&TagRegistry::default()).unwrap();
//! assert_eq!(object, RegistryObject::Psbt(psbt));
//! ```
//!
//! Callers outside Rust go through [`boundary::Boundary`], which hands out
//! opaque handles instead of references.

pub mod boundary;
pub mod bytewords;
pub mod config;
pub mod constants;
pub mod error;
pub mod fountain;
pub mod handle;
pub mod registry;
pub mod sampler;
pub mod ur;
pub mod xoshiro;

pub use self::config::Config;
pub use self::error::{Error, ErrorKind};
pub use self::ur::Decoder;
pub use self::ur::Encoder;

#[must_use]
pub fn crc32() -> crc::Crc<u32> {
    crc::Crc::<u32>::new(&crc::CRC_32_ISO_HDLC)
}
