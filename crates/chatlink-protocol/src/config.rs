//! Configuration for chat chain participants.
//!
//! One `ChatConfig` sizes every piece of per-connection state: the last-seen
//! window, the signature cache, and the expiry windows applied to accepted
//! messages.
//!
//! # Example
//!
//! ```
//! use chatlink_protocol::config::ChatConfigBuilder;
//! use std::time::Duration;
//!
//! let config = ChatConfigBuilder::new()
//!     .with_last_seen_count(10)
//!     .with_message_expiry_server(Duration::from_secs(120))
//!     .with_message_expiry_client(Duration::from_secs(180))
//!     .build_validated()
//!     .unwrap();
//!
//! let cache = config.new_cache();
//! assert_eq!(cache.capacity(), 128);
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use chatlink_identity::KEY_REFRESH_GRACE;

use crate::cache::SignatureCache;
use crate::chain::{MessageDecoder, UnsignedDecoder};
use crate::last_seen::{LastSeenTracker, LastSeenValidator};
use crate::limits::{
    LAST_SEEN_COUNT, MESSAGE_EXPIRY_CLIENT, MESSAGE_EXPIRY_SERVER, SIGNATURE_CACHE_CAPACITY,
};
use crate::session::RemoteChatSession;

/// Chat chain configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Size of the last-seen acknowledgment window.
    ///
    /// Also the most signatures a body may carry, so it can never exceed
    /// `LAST_SEEN_COUNT`.
    pub last_seen_count: usize,

    /// Number of slots in each signature cache.
    ///
    /// Must hold a full last-seen list plus the message's own signature.
    pub signature_cache_capacity: usize,

    /// Reject messages from senders without a chat session.
    pub enforce_secure_chat: bool,

    /// Age after which a server flags an accepted message as expired.
    #[serde(with = "duration_serde")]
    pub message_expiry_server: Duration,

    /// Age after which a client flags an accepted message as expired.
    ///
    /// Longer than the server window to absorb delivery latency.
    #[serde(with = "duration_serde")]
    pub message_expiry_client: Duration,

    /// How long an expired profile key stays usable.
    #[serde(with = "duration_serde")]
    pub key_refresh_grace: Duration,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            last_seen_count: LAST_SEEN_COUNT,
            signature_cache_capacity: SIGNATURE_CACHE_CAPACITY,
            enforce_secure_chat: true,
            message_expiry_server: MESSAGE_EXPIRY_SERVER,
            message_expiry_client: MESSAGE_EXPIRY_CLIENT,
            key_refresh_grace: KEY_REFRESH_GRACE,
        }
    }
}

impl ChatConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration builder.
    pub fn builder() -> ChatConfigBuilder {
        ChatConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.last_seen_count == 0 || self.last_seen_count > LAST_SEEN_COUNT {
            return Err(ConfigError::InvalidValue {
                field: "last_seen_count".into(),
                reason: format!("must be between 1 and {LAST_SEEN_COUNT}"),
            });
        }

        if self.signature_cache_capacity <= self.last_seen_count {
            return Err(ConfigError::InvalidValue {
                field: "signature_cache_capacity".into(),
                reason: "must exceed last_seen_count".into(),
            });
        }

        if self.message_expiry_server.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "message_expiry_server".into(),
                reason: "expiry window must be greater than zero".into(),
            });
        }

        if self.message_expiry_client < self.message_expiry_server {
            return Err(ConfigError::InvalidValue {
                field: "message_expiry_client".into(),
                reason: "client expiry cannot be shorter than server expiry".into(),
            });
        }

        Ok(())
    }

    /// Create an empty signature cache of the configured capacity.
    pub fn new_cache(&self) -> SignatureCache {
        SignatureCache::new(self.signature_cache_capacity)
    }

    /// Create a last-seen validator for the sending side of a connection.
    pub fn new_validator(&self) -> LastSeenValidator {
        LastSeenValidator::new(self.last_seen_count)
    }

    /// Create a last-seen tracker for the receiving side of a connection.
    pub fn new_tracker(&self) -> LastSeenTracker {
        LastSeenTracker::new(self.last_seen_count)
    }

    /// Create a decoder for a sender that announced no chat session.
    pub fn new_unsigned_decoder(&self, sender: Uuid) -> UnsignedDecoder {
        UnsignedDecoder::new(sender, self.enforce_secure_chat)
    }

    /// Create the decoder for `sender`: a chain decoder when the sender has
    /// a session, otherwise an unsigned one.
    pub fn new_decoder(
        &self,
        sender: Uuid,
        session: Option<&RemoteChatSession>,
    ) -> Box<dyn MessageDecoder + Send> {
        match session {
            Some(session) => Box::new(session.create_decoder_with(sender, self)),
            None => Box::new(self.new_unsigned_decoder(sender)),
        }
    }
}

/// Builder for constructing `ChatConfig` with custom values.
#[derive(Clone, Debug, Default)]
pub struct ChatConfigBuilder {
    config: ChatConfig,
}

impl ChatConfigBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: ChatConfig::default(),
        }
    }

    /// Build the final configuration.
    pub fn build(self) -> ChatConfig {
        self.config
    }

    /// Build and validate the configuration.
    pub fn build_validated(self) -> Result<ChatConfig, ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }

    /// Set the last-seen window size.
    pub fn with_last_seen_count(mut self, count: usize) -> Self {
        self.config.last_seen_count = count;
        self
    }

    /// Set the signature cache capacity.
    pub fn with_signature_cache_capacity(mut self, capacity: usize) -> Self {
        self.config.signature_cache_capacity = capacity;
        self
    }

    /// Require a chat session from every sender (default).
    pub fn enforce_secure_chat(mut self) -> Self {
        self.config.enforce_secure_chat = true;
        self
    }

    /// Accept unsigned messages from senders without a session.
    pub fn allow_insecure_chat(mut self) -> Self {
        self.config.enforce_secure_chat = false;
        self
    }

    /// Set the server expiry window.
    pub fn with_message_expiry_server(mut self, window: Duration) -> Self {
        self.config.message_expiry_server = window;
        self
    }

    /// Set the client expiry window.
    pub fn with_message_expiry_client(mut self, window: Duration) -> Self {
        self.config.message_expiry_client = window;
        self
    }

    /// Set the profile key grace period.
    pub fn with_key_refresh_grace(mut self, grace: Duration) -> Self {
        self.config.key_refresh_grace = grace;
        self
    }
}

/// Configuration error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A configuration value is invalid.
    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue {
        /// The field that has an invalid value.
        field: String,
        /// The reason the value is invalid.
        reason: String,
    },
}

/// Serde support for Duration serialization.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    #[derive(Serialize, Deserialize)]
    struct DurationRepr {
        secs: u64,
        nanos: u32,
    }

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        DurationRepr {
            secs: duration.as_secs(),
            nanos: duration.subsec_nanos(),
        }
        .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let repr = DurationRepr::deserialize(deserializer)?;
        Ok(Duration::new(repr.secs, repr.nanos))
    }
}
