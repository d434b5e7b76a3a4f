//! Base64 encoding and decoding utilities.
//!
//! Ion renders blobs in text form as `{{ base64 }}`; this crate provides the
//! standard-alphabet encoder and decoder used for that rendering.
//!
//! # Example
//!
//! ```
//! use ion_base64::{to_base64, from_base64};
//!
//! let data = b"hello world";
//! let encoded = to_base64(data);
//! let decoded = from_base64(&encoded).unwrap();
//! assert_eq!(decoded.as_slice(), data);
//! ```

mod constants;
mod from_base64;
mod to_base64;

pub use constants::{ALPHABET, ALPHABET_BYTES, PAD};
pub use from_base64::from_base64;
pub use to_base64::to_base64;

/// Error type for base64 operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Base64Error {
    /// The input string contains invalid base64 characters.
    InvalidBase64String,
    /// The base64 string length must be a multiple of 4.
    InvalidLength,
}

impl std::fmt::Display for Base64Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Base64Error::InvalidBase64String => write!(f, "INVALID_BASE64_STRING"),
            Base64Error::InvalidLength => write!(f, "Base64 string length must be a multiple of 4"),
        }
    }
}

impl std::error::Error for Base64Error {}
