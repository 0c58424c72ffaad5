//! Local profile key pairs.

use std::time::Duration;

use uuid::Uuid;

use chatlink_crypto::{Ed25519KeyPair, MessageSignature, MessageSigner};

use crate::lifecycle::{KEY_REFRESH_LEAD, KEY_VALIDITY};
use crate::profile_key::{ProfileKeyData, ProfilePublicKey};
use crate::time::{duration_millis, now_millis};

/// The local half of a profile key, with its authority-issued public data.
#[derive(Debug)]
pub struct ProfileKeyPair {
    private: Ed25519KeyPair,
    public: ProfilePublicKey,
    refreshed_after_millis: u64,
}

impl ProfileKeyPair {
    /// Assemble a key pair from parts already obtained from an authority.
    pub fn new(private: Ed25519KeyPair, public: ProfilePublicKey, refreshed_after_millis: u64) -> Self {
        Self {
            private,
            public,
            refreshed_after_millis,
        }
    }

    /// Generate a fresh key and have `authority` issue it for `profile_id`.
    ///
    /// The key expires `KEY_VALIDITY` from now and asks to be refreshed
    /// `KEY_REFRESH_LEAD` before that.
    pub fn issue<S>(authority: &S, profile_id: Uuid) -> Self
    where
        S: MessageSigner + ?Sized,
    {
        Self::issue_at(authority, profile_id, now_millis(), KEY_VALIDITY)
    }

    /// Like [`issue`](Self::issue), with an explicit issue instant and validity.
    pub fn issue_at<S>(authority: &S, profile_id: Uuid, now_millis: u64, validity: Duration) -> Self
    where
        S: MessageSigner + ?Sized,
    {
        let private = Ed25519KeyPair::generate();
        let expires_at = now_millis.saturating_add(duration_millis(validity));
        let data = ProfileKeyData::issue(authority, profile_id, expires_at, private.public_key());
        let refreshed_after = expires_at.saturating_sub(duration_millis(KEY_REFRESH_LEAD));
        Self::new(private, ProfilePublicKey::trusted(data), refreshed_after)
    }

    /// Get the public half.
    pub fn public_key(&self) -> &ProfilePublicKey {
        &self.public
    }

    /// Check whether the key should be replaced now.
    pub fn due_refresh(&self) -> bool {
        self.due_refresh_at(now_millis())
    }

    /// Check whether the key should be replaced at `now_millis`.
    pub fn due_refresh_at(&self, now_millis: u64) -> bool {
        now_millis >= self.refreshed_after_millis
    }
}

impl MessageSigner for ProfileKeyPair {
    fn sign(&self, data: &[u8]) -> MessageSignature {
        self.private.sign(data)
    }
}
