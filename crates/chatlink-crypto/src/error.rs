//! Error types for signature operations.

use thiserror::Error;

/// Errors that can occur during signature operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Signature tag has the wrong length.
    #[error("Invalid signature length: expected {expected}, got {actual}")]
    InvalidSignatureLength {
        /// Expected signature length.
        expected: usize,
        /// Actual signature length.
        actual: usize,
    },

    /// Invalid key length.
    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected key length.
        expected: usize,
        /// Actual key length.
        actual: usize,
    },

    /// Public key bytes do not decode to a valid key.
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),
}

/// Result type for signature operations.
pub type Result<T> = std::result::Result<T, CryptoError>;
