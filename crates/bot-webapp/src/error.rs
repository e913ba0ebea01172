//! Error types for init data verification

use thiserror::Error;

/// Why a signed init data blob was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// No `hash` field, or an empty one
    #[error("Missing hash")]
    MissingHash,

    /// The `hash` field is not 64 hex characters
    #[error("Malformed hash: {0}")]
    MalformedHash(String),

    /// The computed signature differs from the provided one
    #[error("Hash mismatch")]
    Mismatch,

    /// The HMAC key could not be constructed
    #[error("Invalid key: {0}")]
    InvalidKey(String),
}
