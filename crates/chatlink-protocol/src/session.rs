//! Chat sessions.
//!
//! A session ties a chain to one profile key. The local side owns the key
//! pair and hands out encoders; the remote side learns the public key data
//! over the wire, validates it against the key authority, and builds one
//! decoder per sender.

use std::sync::Arc;
use std::time::Duration;

use bytes::{Buf, BufMut};
use uuid::Uuid;

use chatlink_crypto::{Ed25519PublicKey, MessageSignature, SignatureValidator, SIGNATURE_BYTES};
use chatlink_identity::{ProfileKeyData, ProfileKeyPair, ProfilePublicKey};

use crate::chain::{ChainDecoder, ChainEncoder};
use crate::config::ChatConfig;
use crate::error::Result;
use crate::limits::MAX_PUBLIC_KEY_WIRE_BYTES;
use crate::link::MessageLink;
use crate::wire;

/// A peer's chat session, with a validated profile key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteChatSession {
    session_id: Uuid,
    profile_key: ProfilePublicKey,
}

impl RemoteChatSession {
    /// Create a session from an already validated key.
    pub fn new(session_id: Uuid, profile_key: ProfilePublicKey) -> Self {
        Self {
            session_id,
            profile_key,
        }
    }

    /// Session identifier.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// The sender's profile key.
    pub fn profile_key(&self) -> &ProfilePublicKey {
        &self.profile_key
    }

    /// A decoder for `sender`, expecting the root link of this session.
    pub fn create_decoder(&self, sender: Uuid) -> ChainDecoder {
        ChainDecoder::new(
            MessageLink::root(sender, self.session_id),
            self.profile_key.clone(),
        )
    }

    /// A decoder using the key grace and expiry window from `config`.
    pub fn create_decoder_with(&self, sender: Uuid, config: &ChatConfig) -> ChainDecoder {
        self.create_decoder(sender)
            .with_key_grace(config.key_refresh_grace)
            .with_expiry_window(config.message_expiry_server)
    }

    /// Check whether the profile key has expired.
    pub fn has_expired(&self) -> bool {
        self.profile_key.data().has_expired()
    }

    /// Check whether the profile key expired more than `grace` ago.
    pub fn has_expired_with(&self, grace: Duration) -> bool {
        self.profile_key.data().has_expired_with_grace(grace)
    }

    /// The wire form of this session.
    pub fn to_data(&self) -> RemoteChatSessionData {
        RemoteChatSessionData {
            session_id: self.session_id,
            profile_key: self.profile_key.data().clone(),
        }
    }
}

/// A session as announced on the wire, before validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteChatSessionData {
    /// Session identifier.
    pub session_id: Uuid,
    /// Unvalidated profile key data.
    pub profile_key: ProfileKeyData,
}

impl RemoteChatSessionData {
    /// Check the key authority's signature over the key data for
    /// `profile_id`.
    ///
    /// # Errors
    ///
    /// Returns `ChatError::Identity` if the authority signature is invalid.
    pub fn validate<V>(&self, profile_id: Uuid, authority: &V) -> Result<RemoteChatSession>
    where
        V: SignatureValidator + ?Sized,
    {
        let profile_key =
            ProfilePublicKey::create_validated(authority, profile_id, self.profile_key.clone())?;
        Ok(RemoteChatSession::new(self.session_id, profile_key))
    }

    /// Write the wire form: session id, expiry millis, length-prefixed key,
    /// length-prefixed key signature.
    pub fn encode(&self, buf: &mut impl BufMut) {
        wire::put_uuid(buf, &self.session_id);
        buf.put_u64(self.profile_key.expires_at_millis);
        wire::put_byte_array(buf, &self.profile_key.key.to_bytes());
        wire::put_byte_array(buf, self.profile_key.key_signature.as_bytes());
    }

    /// Read the wire form.
    pub fn decode(buf: &mut impl Buf) -> Result<Self> {
        let session_id = wire::get_uuid(buf)?;
        let expires_at_millis = wire::get_u64(buf)?;
        let key = Ed25519PublicKey::from_bytes(&wire::get_byte_array(
            buf,
            MAX_PUBLIC_KEY_WIRE_BYTES,
        )?)?;
        let key_signature =
            MessageSignature::from_bytes(&wire::get_byte_array(buf, SIGNATURE_BYTES)?)?;
        Ok(Self {
            session_id,
            profile_key: ProfileKeyData {
                expires_at_millis,
                key,
                key_signature,
            },
        })
    }

    /// Encode into a fresh buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode(&mut out);
        out
    }

    /// Decode a complete buffer, rejecting trailing bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        wire::decode_exact(bytes, |buf| Self::decode(buf))
    }
}

/// Our own chat session.
#[derive(Clone, Debug)]
pub struct LocalChatSession {
    session_id: Uuid,
    key_pair: Arc<ProfileKeyPair>,
}

impl LocalChatSession {
    /// Start a session with a random identifier.
    pub fn create(key_pair: Arc<ProfileKeyPair>) -> Self {
        Self::new(Uuid::new_v4(), key_pair)
    }

    /// Resume a session with a known identifier.
    pub fn new(session_id: Uuid, key_pair: Arc<ProfileKeyPair>) -> Self {
        Self {
            session_id,
            key_pair,
        }
    }

    /// Session identifier.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// The signing key pair.
    pub fn key_pair(&self) -> &Arc<ProfileKeyPair> {
        &self.key_pair
    }

    /// An encoder for `sender`, starting at the root link of this session.
    pub fn create_encoder(&self, sender: Uuid) -> ChainEncoder<Arc<ProfileKeyPair>> {
        ChainEncoder::new(
            Arc::clone(&self.key_pair),
            MessageLink::root(sender, self.session_id),
        )
    }

    /// How peers see this session.
    pub fn as_remote(&self) -> RemoteChatSession {
        RemoteChatSession::new(self.session_id, self.key_pair.public_key().clone())
    }
}
