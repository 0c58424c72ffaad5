//! Error types for chat chain operations.
//!
//! Decode failures are chain-fatal: once a decoder reports one, the
//! sender's chain is broken and every later message is rejected. Cache and
//! window errors are protocol violations the caller handles by dropping the
//! connection.

use thiserror::Error;

use chatlink_crypto::CryptoError;
use chatlink_identity::IdentityError;

use crate::config::ConfigError;

/// Errors that can occur during chat chain operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    /// Cryptographic operation failed.
    #[error("Crypto error: {0}")]
    Crypto(CryptoError),

    /// Identity error.
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    /// A signature tag had the wrong length.
    #[error("Invalid signature length: expected {expected}, got {actual}")]
    InvalidSignatureLength {
        /// Expected length in bytes.
        expected: usize,
        /// Actual length in bytes.
        actual: usize,
    },

    /// A signed message was expected but the sender has no usable key.
    #[error("Missing profile key")]
    MissingKey,

    /// The sender's profile key has expired.
    #[error("Profile key has expired")]
    ExpiredKey,

    /// The sender's chain is broken; no further messages are accepted.
    #[error("Chat chain is broken")]
    ChainBroken,

    /// A message timestamp went backwards.
    #[error("Out-of-order timestamp: {got} is before {last}")]
    OutOfOrderTimestamp {
        /// Timestamp of the last accepted message (Unix millis).
        last: u64,
        /// Timestamp of the rejected message (Unix millis).
        got: u64,
    },

    /// Signature verification failed.
    #[error("Invalid signature")]
    InvalidSignature,

    /// A packed signature referenced a cache slot the receiver does not hold.
    #[error("Signature cache desync: unknown id {id}")]
    CacheDesync {
        /// The unresolved cache id.
        id: u32,
    },

    /// A last-seen offset was outside the tracked history.
    #[error("Last-seen offset {offset} out of range (max {max})")]
    WindowOffsetOutOfRange {
        /// The requested offset.
        offset: u32,
        /// Largest offset that would have been accepted.
        max: usize,
    },

    /// A last-seen acknowledgment contradicts the tracked history.
    #[error("Inconsistent acknowledgment: {0}")]
    AcknowledgmentInconsistent(AckViolation),

    /// The peer left too many sent messages unacknowledged.
    #[error("Too many unacknowledged messages: max {max}")]
    TooManyPendingMessages {
        /// Maximum tracked messages.
        max: usize,
    },

    /// Too many last-seen signatures.
    #[error("Too many last-seen signatures: max {max}, got {actual}")]
    LastSeenCapacityExceeded {
        /// Maximum allowed entries.
        max: usize,
        /// Actual entry count.
        actual: usize,
    },

    /// Message content is too long.
    #[error("Message content too long: max {max} characters, got {actual}")]
    ContentTooLong {
        /// Maximum allowed characters.
        max: usize,
        /// Actual character count.
        actual: usize,
    },

    /// Malformed wire data.
    #[error("Wire format error: {0}")]
    Wire(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Ways a last-seen update can contradict the tracked history.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckViolation {
    /// The bitset's highest set bit lies outside the window.
    #[error("acknowledged bit {highest} is outside a window of {window}")]
    OutsideWindow {
        /// Index of the highest set bit.
        highest: usize,
        /// Window size.
        window: usize,
    },

    /// A set bit refers to a slot with no tracked message.
    #[error("acknowledged unknown or previously ignored message at index {index}")]
    UnknownEntry {
        /// Window slot.
        index: usize,
    },

    /// A clear bit skipped a message that is still awaiting acknowledgment.
    #[error("dropped pending message at index {index}")]
    DroppedPending {
        /// Window slot.
        index: usize,
    },
}

impl ChatError {
    /// Check whether the caller should disconnect the offending peer.
    ///
    /// `MissingKey` and `ExpiredKey` only mute the message; everything the
    /// peer could have caused on purpose drops the connection.
    pub fn should_disconnect(&self) -> bool {
        !matches!(
            self,
            ChatError::MissingKey | ChatError::ExpiredKey | ChatError::Config(_)
        )
    }

    /// Check whether this error leaves the sender's chain broken.
    pub fn breaks_chain(&self) -> bool {
        matches!(
            self,
            ChatError::ChainBroken
                | ChatError::OutOfOrderTimestamp { .. }
                | ChatError::InvalidSignature
        )
    }

    /// User-facing moderation text for this error.
    pub fn disabled_reason(&self) -> String {
        let reason = match self {
            ChatError::MissingKey => "missing profile key".to_string(),
            ChatError::ExpiredKey => "profile key has expired".to_string(),
            ChatError::ChainBroken => "chat chain broken".to_string(),
            ChatError::OutOfOrderTimestamp { .. } => "out-of-order chat".to_string(),
            ChatError::InvalidSignature => "invalid signature".to_string(),
            other => other.to_string(),
        };
        format!("chat disabled: {reason}")
    }
}

impl From<CryptoError> for ChatError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::InvalidSignatureLength { expected, actual } => {
                ChatError::InvalidSignatureLength { expected, actual }
            }
            other => ChatError::Crypto(other),
        }
    }
}

/// Result type for chat chain operations.
pub type Result<T> = std::result::Result<T, ChatError>;
