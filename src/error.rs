//! Library error type.
//!
//! Resolution, validation, merging and description never fail; errors only
//! come from decoding metadata documents.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A document failed to deserialize; `path` is the JSON path of the failure.
    #[error("at JSON path {path} → {message}")]
    Decode { path: String, message: String },

    #[error("invalid param `{name}`: {reason}")]
    InvalidParam { name: String, reason: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
