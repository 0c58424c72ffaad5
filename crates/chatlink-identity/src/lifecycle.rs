//! Key lifecycle constants and states.
//!
//! A profile key is issued with an absolute expiry instant. Clients refresh
//! their key ahead of that instant, and a key that is within the refresh
//! grace period is still accepted by peers that allow it.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default validity of an issued profile key (48 hours).
pub const KEY_VALIDITY: Duration = Duration::from_secs(48 * 60 * 60);

/// How long before expiry a local key pair asks to be refreshed (8 hours).
pub const KEY_REFRESH_LEAD: Duration = Duration::from_secs(8 * 60 * 60);

/// Grace period past expiry during which a key may still be tolerated (8 hours).
pub const KEY_REFRESH_GRACE: Duration = Duration::from_secs(8 * 60 * 60);

/// State of a profile key at a given instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyState {
    /// Key is valid.
    Active,
    /// Key has passed its expiry but is within the grace period.
    Grace,
    /// Key has expired and is past any grace period.
    Expired,
}

impl KeyState {
    /// Check if the key can be used to verify new messages.
    pub fn is_usable(&self) -> bool {
        matches!(self, KeyState::Active)
    }

    /// Get a string representation for error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyState::Active => "Active",
            KeyState::Grace => "Grace",
            KeyState::Expired => "Expired",
        }
    }
}

impl std::fmt::Display for KeyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
