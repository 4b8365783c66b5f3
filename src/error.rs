//! The crate-wide error type.
//!
//! This follows the same hand-rolled enum-plus-manual-`From`-impls
//! convention the command-line front ends in this project's lineage use,
//! rather than pulling in an error-handling crate for a handful of
//! variants.

use std::fmt;
use std::result;

pub type Result<T> = result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// A render configuration value was out of range (zero/negative width,
    /// aspect ratio, sample count, or max depth).
    InvalidConfig(String),
    Io(std::io::Error),
    Image(image::ImageError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidConfig(msg) => write!(f, "invalid render configuration: {}", msg),
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Image(e) => write!(f, "image encoding error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidConfig(_) => None,
            Error::Io(e) => Some(e),
            Error::Image(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::Io(error)
    }
}

impl From<image::ImageError> for Error {
    fn from(error: image::ImageError) -> Self {
        Error::Image(error)
    }
}
