use std::time::Duration;

use tracing::{debug, warn};
use uuid::Uuid;

use chatlink_crypto::MessageSignature;
use chatlink_identity::time::now_millis;
use chatlink_identity::ProfilePublicKey;

use crate::body::MessageBody;
use crate::error::{ChatError, Result};
use crate::limits::MESSAGE_EXPIRY_SERVER;
use crate::link::MessageLink;
use crate::message::ChatMessage;

/// Turns incoming `(signature, body)` pairs from one sender into messages.
pub trait MessageDecoder {
    /// Decode and, where a key is known, verify the next message.
    fn decode(&mut self, signature: Option<MessageSignature>, body: MessageBody)
        -> Result<ChatMessage>;

    /// Permanently reject further messages.
    fn set_chain_broken(&mut self) {}

    /// Check whether further messages are rejected.
    fn is_broken(&self) -> bool {
        false
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum DecoderState {
    Active {
        expected: MessageLink,
        last_timestamp_millis: u64,
    },
    Broken,
}

/// Verifies one sender's signed chain.
///
/// The decoder expects every message at exactly the next link, with a
/// timestamp no earlier than the last accepted one. The first failure
/// that implicates the chain moves it to a terminal broken state; key
/// problems are reported without touching the state.
#[derive(Clone, Debug)]
pub struct ChainDecoder {
    state: DecoderState,
    profile_key: ProfilePublicKey,
    key_grace: Duration,
    expiry_window: Duration,
}

impl ChainDecoder {
    /// Create a decoder expecting `root` as its first link.
    pub fn new(root: MessageLink, profile_key: ProfilePublicKey) -> Self {
        Self {
            state: DecoderState::Active {
                expected: root,
                last_timestamp_millis: 0,
            },
            profile_key,
            key_grace: Duration::ZERO,
            expiry_window: MESSAGE_EXPIRY_SERVER,
        }
    }

    /// Accept a key for `grace` after it expires.
    pub fn with_key_grace(mut self, grace: Duration) -> Self {
        self.key_grace = grace;
        self
    }

    /// Warn about accepted messages older than `window`.
    pub fn with_expiry_window(mut self, window: Duration) -> Self {
        self.expiry_window = window;
        self
    }

    /// The link the next message must carry, or `None` once broken.
    pub fn expected_link(&self) -> Option<&MessageLink> {
        match &self.state {
            DecoderState::Active { expected, .. } => Some(expected),
            DecoderState::Broken => None,
        }
    }

    /// The key messages are verified against.
    pub fn profile_key(&self) -> &ProfilePublicKey {
        &self.profile_key
    }

    /// Decode at an explicit wall-clock time.
    ///
    /// # Errors
    ///
    /// - `ChainBroken` once the chain has been broken.
    /// - `MissingKey` for an unsigned message; the chain stays intact.
    /// - `ExpiredKey` if the sender's key has expired; the chain stays intact.
    /// - `OutOfOrderTimestamp` if the timestamp regressed; breaks the chain.
    /// - `InvalidSignature` if verification fails; breaks the chain.
    pub fn decode_at(
        &mut self,
        signature: Option<MessageSignature>,
        body: MessageBody,
        now_millis: u64,
    ) -> Result<ChatMessage> {
        let DecoderState::Active {
            expected,
            last_timestamp_millis,
        } = self.state
        else {
            return Err(ChatError::ChainBroken);
        };

        let Some(signature) = signature else {
            return Err(ChatError::MissingKey);
        };

        if self
            .profile_key
            .data()
            .has_expired_with_grace_at(self.key_grace, now_millis)
        {
            return Err(ChatError::ExpiredKey);
        }

        let timestamp = body.timestamp_millis();
        if timestamp < last_timestamp_millis {
            return Err(self.break_chain(ChatError::OutOfOrderTimestamp {
                last: last_timestamp_millis,
                got: timestamp,
            }));
        }

        let message = ChatMessage::new(expected, Some(signature), body);
        if !message.verify(self.profile_key.signature_validator()) {
            return Err(self.break_chain(ChatError::InvalidSignature));
        }

        if message.has_expired_at(self.expiry_window, now_millis) {
            warn!(
                sender = %expected.sender(),
                timestamp,
                "Received expired chat; is the system clock unsynchronized?"
            );
        }

        self.state = match expected.advance() {
            Some(next) => DecoderState::Active {
                expected: next,
                last_timestamp_millis: timestamp,
            },
            None => {
                debug!(sender = %expected.sender(), "Chat chain exhausted");
                DecoderState::Broken
            }
        };
        Ok(message)
    }

    fn break_chain(&mut self, reason: ChatError) -> ChatError {
        if let Some(expected) = self.expected_link() {
            debug!(sender = %expected.sender(), index = expected.index(), %reason, "Chat chain broken");
        }
        self.state = DecoderState::Broken;
        reason
    }
}

impl MessageDecoder for ChainDecoder {
    fn decode(
        &mut self,
        signature: Option<MessageSignature>,
        body: MessageBody,
    ) -> Result<ChatMessage> {
        self.decode_at(signature, body, now_millis())
    }

    fn set_chain_broken(&mut self) {
        self.break_chain(ChatError::ChainBroken);
    }

    fn is_broken(&self) -> bool {
        self.state == DecoderState::Broken
    }
}

/// Decoder for a sender without a chat session.
///
/// Every message comes out unsigned, or is refused outright when secure
/// chat is enforced.
#[derive(Clone, Debug)]
pub struct UnsignedDecoder {
    sender: Uuid,
    enforce_secure_chat: bool,
}

impl UnsignedDecoder {
    /// Create a decoder for `sender`.
    pub fn new(sender: Uuid, enforce_secure_chat: bool) -> Self {
        Self {
            sender,
            enforce_secure_chat,
        }
    }
}

impl MessageDecoder for UnsignedDecoder {
    fn decode(
        &mut self,
        _signature: Option<MessageSignature>,
        body: MessageBody,
    ) -> Result<ChatMessage> {
        if self.enforce_secure_chat {
            return Err(ChatError::MissingKey);
        }
        Ok(ChatMessage::unsigned(self.sender, body.content()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ChainEncoder;
    use crate::last_seen::LastSeenMessages;
    use chatlink_crypto::Ed25519KeyPair;
    use chatlink_identity::ProfileKeyPair;

    const NOW: u64 = 1_700_000_000_000;
    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    struct Fixture {
        encoder: ChainEncoder<ProfileKeyPair>,
        decoder: ChainDecoder,
    }

    fn fixture() -> Fixture {
        let authority = Ed25519KeyPair::generate();
        let sender = Uuid::from_u128(1);
        let key = ProfileKeyPair::issue_at(&authority, sender, NOW, DAY);
        let root = MessageLink::root(sender, Uuid::from_u128(2));
        let decoder = ChainDecoder::new(root, key.public_key().clone());
        Fixture {
            encoder: ChainEncoder::new(key, root),
            decoder,
        }
    }

    fn body(content: &str, timestamp: u64) -> MessageBody {
        MessageBody::new(content, timestamp, 3, LastSeenMessages::empty()).unwrap()
    }

    fn sign(fx: &mut Fixture, content: &str, timestamp: u64) -> (MessageSignature, MessageBody) {
        let body = body(content, timestamp);
        let signature = fx.encoder.encode(&body).unwrap();
        (signature, body)
    }

    #[test]
    fn test_accepts_in_order() {
        let mut fx = fixture();
        for i in 0..3 {
            let (signature, body) = sign(&mut fx, "hi", NOW + i);
            let message = fx.decoder.decode_at(Some(signature), body, NOW).unwrap();
            assert_eq!(message.link().index(), i as u32);
        }
        assert!(!fx.decoder.is_broken());
        assert_eq!(fx.decoder.expected_link().map(MessageLink::index), Some(3));
    }

    #[test]
    fn test_timestamp_ties_pass() {
        let mut fx = fixture();
        for _ in 0..2 {
            let (signature, body) = sign(&mut fx, "same", NOW);
            assert!(fx.decoder.decode_at(Some(signature), body, NOW).is_ok());
        }
    }

    #[test]
    fn test_missing_signature_keeps_chain() {
        let mut fx = fixture();
        let result = fx.decoder.decode_at(None, body("x", NOW), NOW);
        assert_eq!(result, Err(ChatError::MissingKey));
        assert!(!fx.decoder.is_broken());

        let (signature, body) = sign(&mut fx, "x", NOW);
        assert!(fx.decoder.decode_at(Some(signature), body, NOW).is_ok());
    }

    #[test]
    fn test_expired_key_keeps_chain() {
        let mut fx = fixture();
        let (signature, body) = sign(&mut fx, "late", NOW);
        let later = NOW + 2 * DAY.as_millis() as u64;

        let result = fx.decoder.decode_at(Some(signature.clone()), body.clone(), later);
        assert_eq!(result, Err(ChatError::ExpiredKey));
        assert!(!fx.decoder.is_broken());

        let mut graced = fx.decoder.clone().with_key_grace(2 * DAY);
        assert!(graced.decode_at(Some(signature), body, later).is_ok());
    }

    #[test]
    fn test_timestamp_regression_breaks() {
        let mut fx = fixture();
        let (signature, body) = sign(&mut fx, "first", NOW + 10);
        fx.decoder.decode_at(Some(signature), body, NOW).unwrap();

        let (signature, body) = sign(&mut fx, "second", NOW);
        let result = fx.decoder.decode_at(Some(signature), body, NOW);
        assert_eq!(
            result,
            Err(ChatError::OutOfOrderTimestamp {
                last: NOW + 10,
                got: NOW
            })
        );
        assert!(fx.decoder.is_broken());

        let (signature, body) = sign(&mut fx, "third", NOW + 20);
        assert_eq!(
            fx.decoder.decode_at(Some(signature), body, NOW),
            Err(ChatError::ChainBroken)
        );
    }

    #[test]
    fn test_skipped_link_breaks() {
        let mut fx = fixture();
        let _skipped = sign(&mut fx, "zero", NOW);
        let (signature, body) = sign(&mut fx, "one", NOW);

        assert_eq!(
            fx.decoder.decode_at(Some(signature), body, NOW),
            Err(ChatError::InvalidSignature)
        );
        assert!(fx.decoder.is_broken());
        assert!(fx.decoder.expected_link().is_none());
    }

    #[test]
    fn test_tampered_body_breaks() {
        let mut fx = fixture();
        let (signature, _) = sign(&mut fx, "original", NOW);
        let result = fx.decoder.decode_at(Some(signature), body("forged", NOW), NOW);
        assert_eq!(result, Err(ChatError::InvalidSignature));
    }

    #[test]
    fn test_set_chain_broken() {
        let mut fx = fixture();
        fx.decoder.set_chain_broken();
        assert!(fx.decoder.is_broken());

        let (signature, body) = sign(&mut fx, "x", NOW);
        assert_eq!(
            fx.decoder.decode_at(Some(signature), body, NOW),
            Err(ChatError::ChainBroken)
        );
    }

    #[test]
    fn test_exhausted_chain_breaks_after_last_message() {
        let authority = Ed25519KeyPair::generate();
        let sender = Uuid::from_u128(1);
        let key = ProfileKeyPair::issue_at(&authority, sender, NOW, DAY);
        let last = MessageLink::new(u32::MAX, sender, Uuid::from_u128(2));
        let mut decoder = ChainDecoder::new(last, key.public_key().clone());
        let mut encoder = ChainEncoder::new(key, last);

        let body = body("final", NOW);
        let signature = encoder.encode(&body).unwrap();
        assert!(decoder.decode_at(Some(signature), body, NOW).is_ok());
        assert!(decoder.is_broken());
    }

    #[test]
    fn test_unsigned_decoder() {
        let sender = Uuid::from_u128(5);

        let mut strict = UnsignedDecoder::new(sender, true);
        assert_eq!(
            strict.decode(None, MessageBody::unsigned("hi")),
            Err(ChatError::MissingKey)
        );

        let mut lenient = UnsignedDecoder::new(sender, false);
        let message = lenient.decode(None, MessageBody::unsigned("hi")).unwrap();
        assert!(!message.has_signature());
        assert_eq!(message.sender(), sender);
        assert_eq!(message.signed_content(), "hi");
        assert!(!lenient.is_broken());
    }
}
