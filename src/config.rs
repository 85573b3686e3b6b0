//! Encoding parameters shared by the registry helpers and the boundary.

use crate::error::Error;

/// Encoder configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Upper bound on the fragment size of multipart URs.
    ///
    /// Default: 400
    pub max_fragment_length: usize,

    /// Upper bound on the number of fragments mixed into one part.
    ///
    /// Default: unlimited
    pub max_degree: Option<usize>,

    /// Emit upper-case URs, which fit the QR alphanumeric mode.
    ///
    /// Default: false
    pub uppercase: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_fragment_length: 400,
            max_degree: None,
            uppercase: false,
        }
    }
}

impl Config {
    /// Checks that the values describe a usable encoder.
    ///
    /// # Errors
    ///
    /// Fails for a zero fragment length or a zero degree limit.
    pub fn validate(&self) -> Result<(), Error> {
        if self.max_fragment_length == 0 {
            return Err(Error::Config("max_fragment_length must be positive"));
        }
        if self.max_degree == Some(0) {
            return Err(Error::Config("max_degree must be positive"));
        }
        Ok(())
    }

    /// Applies the configured letter case to an encoded UR.
    #[must_use]
    pub fn render(&self, ur: String) -> String {
        if self.uppercase {
            ur.to_uppercase()
        } else {
            ur
        }
    }
}
