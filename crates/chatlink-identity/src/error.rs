//! Error types for identity operations.

use thiserror::Error;

/// Errors that can occur during identity operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// Cryptographic operation failed.
    #[error("Crypto error: {0}")]
    Crypto(#[from] chatlink_crypto::CryptoError),

    /// The authority signature over the key data does not validate.
    #[error("Invalid profile key signature")]
    InvalidKeySignature,

    /// The profile key has expired.
    #[error("Profile key has expired")]
    ExpiredKey,
}

/// Result type for identity operations.
pub type Result<T> = std::result::Result<T, IdentityError>;
