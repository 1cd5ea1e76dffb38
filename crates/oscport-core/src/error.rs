//! Error types for oscport

use thiserror::Error;

/// Result type alias for oscport core operations
pub type Result<T> = std::result::Result<T, Error>;

/// oscport core error types
#[derive(Error, Debug)]
pub enum Error {
    /// JSON encoding error
    #[error("encode error: {0}")]
    EncodeError(String),

    /// JSON decoding error
    #[error("decode error: {0}")]
    DecodeError(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        if e.is_data() || e.is_syntax() || e.is_eof() {
            Error::DecodeError(e.to_string())
        } else {
            Error::EncodeError(e.to_string())
        }
    }
}
