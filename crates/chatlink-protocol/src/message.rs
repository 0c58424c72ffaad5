//! Chat messages.

use std::time::Duration;

use uuid::Uuid;

use chatlink_crypto::{MessageSignature, SignatureValidator};
use chatlink_identity::time::duration_millis;

use crate::body::MessageBody;
use crate::config::ChatConfig;
use crate::filter_mask::FilterMask;
use crate::limits::{MESSAGE_EXPIRY_CLIENT, MESSAGE_EXPIRY_SERVER};
use crate::link::MessageLink;

/// A chat message with its chain position and optional signature.
///
/// Messages are immutable values. Filtering or replacing the displayed
/// content produces a new message; the signed body is never touched, so a
/// filtered message still verifies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    link: MessageLink,
    signature: Option<MessageSignature>,
    body: MessageBody,
    unsigned_content: Option<String>,
    filter_mask: FilterMask,
}

impl ChatMessage {
    /// Create a message.
    pub fn new(link: MessageLink, signature: Option<MessageSignature>, body: MessageBody) -> Self {
        Self {
            link,
            signature,
            body,
            unsigned_content: None,
            filter_mask: FilterMask::PassThrough,
        }
    }

    /// An unsigned message from `sender`.
    pub fn unsigned(sender: Uuid, content: impl Into<String>) -> Self {
        Self::new(MessageLink::unsigned(sender), None, MessageBody::unsigned(content))
    }

    /// An unsigned message from nobody, shown as a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::unsigned(Uuid::nil(), content)
    }

    /// Replace the displayed content without touching the signed body.
    pub fn with_unsigned_content(self, content: impl Into<String>) -> Self {
        Self {
            unsigned_content: Some(content.into()),
            ..self
        }
    }

    /// Display the signed content again.
    pub fn remove_unsigned_content(self) -> Self {
        Self {
            unsigned_content: None,
            ..self
        }
    }

    /// Attach a filter mask.
    pub fn filter(self, mask: FilterMask) -> Self {
        Self {
            filter_mask: mask,
            ..self
        }
    }

    /// Keep the filter mask only if filtering is enabled.
    pub fn filter_enabled(self, enabled: bool) -> Self {
        if enabled {
            self
        } else {
            self.filter(FilterMask::PassThrough)
        }
    }

    /// Drop the signature, turning this into an unsigned message from the
    /// same sender.
    pub fn remove_signature(self) -> Self {
        Self {
            link: MessageLink::unsigned(self.link.sender()),
            signature: None,
            ..self
        }
    }

    /// Check the signature against `validator`.
    ///
    /// Unsigned messages never verify.
    pub fn verify<V>(&self, validator: &V) -> bool
    where
        V: SignatureValidator + ?Sized,
    {
        self.signature
            .as_ref()
            .is_some_and(|signature| signature.verify(&self.signable_bytes(), validator))
    }

    /// The byte stream the signature covers.
    pub fn signable_bytes(&self) -> Vec<u8> {
        self.body.signable_bytes(&self.link)
    }

    /// Chain position.
    pub fn link(&self) -> &MessageLink {
        &self.link
    }

    /// Sending profile.
    pub fn sender(&self) -> Uuid {
        self.link.sender()
    }

    /// The signature, if any.
    pub fn signature(&self) -> Option<&MessageSignature> {
        self.signature.as_ref()
    }

    /// The signed body.
    pub fn body(&self) -> &MessageBody {
        &self.body
    }

    /// Replacement display content, if any.
    pub fn unsigned_content(&self) -> Option<&str> {
        self.unsigned_content.as_deref()
    }

    /// The attached filter mask.
    pub fn filter_mask(&self) -> &FilterMask {
        &self.filter_mask
    }

    /// Content as signed.
    pub fn signed_content(&self) -> &str {
        self.body.content()
    }

    /// Content as displayed: the replacement if present, otherwise the
    /// signed content.
    pub fn decorated_content(&self) -> &str {
        self.unsigned_content
            .as_deref()
            .unwrap_or_else(|| self.body.content())
    }

    /// Signed content with the filter mask applied, or `None` when fully
    /// filtered.
    pub fn filtered_content(&self) -> Option<String> {
        self.filter_mask.apply(self.signed_content())
    }

    /// Send time in Unix milliseconds.
    pub fn timestamp_millis(&self) -> u64 {
        self.body.timestamp_millis()
    }

    /// Random salt.
    pub fn salt(&self) -> i64 {
        self.body.salt()
    }

    /// Check whether the message is older than `window` at `now_millis`.
    pub fn has_expired_at(&self, window: Duration, now_millis: u64) -> bool {
        self.timestamp_millis()
            .saturating_add(duration_millis(window))
            < now_millis
    }

    /// Check against the server expiry window.
    pub fn has_expired_server(&self, now_millis: u64) -> bool {
        self.has_expired_at(MESSAGE_EXPIRY_SERVER, now_millis)
    }

    /// Check against the longer client expiry window.
    pub fn has_expired_client(&self, now_millis: u64) -> bool {
        self.has_expired_at(MESSAGE_EXPIRY_CLIENT, now_millis)
    }

    /// Check against the server expiry window configured for a connection.
    pub fn has_expired_server_with(&self, config: &ChatConfig, now_millis: u64) -> bool {
        self.has_expired_at(config.message_expiry_server, now_millis)
    }

    /// Check against the client expiry window configured for a connection.
    pub fn has_expired_client_with(&self, config: &ChatConfig, now_millis: u64) -> bool {
        self.has_expired_at(config.message_expiry_client, now_millis)
    }

    /// Check whether the message comes from nobody.
    pub fn is_system(&self) -> bool {
        self.sender().is_nil()
    }

    /// Check whether the message is signed.
    pub fn has_signature(&self) -> bool {
        self.signature.is_some()
    }

    /// Check whether the message is signed by `sender`.
    pub fn has_signature_from(&self, sender: Uuid) -> bool {
        self.has_signature() && self.sender() == sender
    }

    /// Check whether the filter hides the whole message.
    pub fn is_fully_filtered(&self) -> bool {
        self.filter_mask.is_fully_filtered()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::last_seen::LastSeenMessages;
    use chatlink_crypto::{AcceptAll, Ed25519KeyPair, MessageSigner, RejectAll};

    const NOW: u64 = 1_700_000_000_000;

    fn signed(key: &Ed25519KeyPair, content: &str) -> ChatMessage {
        let link = MessageLink::root(Uuid::from_u128(1), Uuid::from_u128(2));
        let body = MessageBody::new(content, NOW, 7, LastSeenMessages::empty()).unwrap();
        let signature = key.sign(&body.signable_bytes(&link));
        ChatMessage::new(link, Some(signature), body)
    }

    #[test]
    fn test_verify() {
        let key = Ed25519KeyPair::generate();
        let message = signed(&key, "hello");
        assert!(message.verify(&key.public_key()));
        assert!(!message.verify(&Ed25519KeyPair::generate().public_key()));
        assert!(!message.verify(&RejectAll));
    }

    #[test]
    fn test_unsigned_never_verifies() {
        let message = ChatMessage::unsigned(Uuid::from_u128(1), "hi");
        assert!(!message.has_signature());
        assert!(!message.verify(&AcceptAll));
        assert!(!message.is_system());
    }

    #[test]
    fn test_system_message() {
        let message = ChatMessage::system("Server restarting");
        assert!(message.is_system());
        assert!(!message.has_signature_from(Uuid::nil()));
    }

    #[test]
    fn test_filter_keeps_signed_content() {
        let key = Ed25519KeyPair::generate();
        let mask = FilterMask::partial([0, 1, 2].into_iter().collect());
        let message = signed(&key, "hello world").filter(mask);

        assert_eq!(message.filtered_content().as_deref(), Some("###lo world"));
        assert_eq!(message.signed_content(), "hello world");
        assert!(message.verify(&key.public_key()));

        let message = message.filter_enabled(false);
        assert_eq!(message.filtered_content().as_deref(), Some("hello world"));
    }

    #[test]
    fn test_fully_filtered() {
        let message = ChatMessage::system("x").filter(FilterMask::FullyFiltered);
        assert!(message.is_fully_filtered());
        assert_eq!(message.filtered_content(), None);
    }

    #[test]
    fn test_unsigned_content_overrides_display() {
        let key = Ed25519KeyPair::generate();
        let message = signed(&key, "hello").with_unsigned_content("<alice> hello");
        assert_eq!(message.decorated_content(), "<alice> hello");
        assert_eq!(message.signed_content(), "hello");
        assert!(message.verify(&key.public_key()));

        let message = message.remove_unsigned_content();
        assert_eq!(message.decorated_content(), "hello");
    }

    #[test]
    fn test_remove_signature() {
        let key = Ed25519KeyPair::generate();
        let message = signed(&key, "hello");
        let sender = message.sender();
        assert!(message.has_signature_from(sender));

        let message = message.remove_signature();
        assert!(!message.has_signature());
        assert_eq!(message.sender(), sender);
        assert!(message.link().session_id().is_nil());
    }

    #[test]
    fn test_expiry_windows() {
        let message = ChatMessage::system("x");
        let sent = message.timestamp_millis();

        let six_minutes = sent + 6 * 60 * 1000;
        assert!(message.has_expired_server(six_minutes));
        assert!(!message.has_expired_client(six_minutes));

        let eight_minutes = sent + 8 * 60 * 1000;
        assert!(message.has_expired_client(eight_minutes));
        assert!(!message.has_expired_server(sent));
    }

    #[test]
    fn test_configured_expiry_windows() {
        let config = ChatConfig::builder()
            .with_message_expiry_server(Duration::from_secs(60))
            .with_message_expiry_client(Duration::from_secs(90))
            .build_validated()
            .unwrap();
        let message = ChatMessage::system("x");
        let sent = message.timestamp_millis();

        let seventy_seconds = sent + 70 * 1000;
        assert!(message.has_expired_server_with(&config, seventy_seconds));
        assert!(!message.has_expired_client_with(&config, seventy_seconds));
        assert!(!message.has_expired_server(seventy_seconds));

        let two_minutes = sent + 120 * 1000;
        assert!(message.has_expired_client_with(&config, two_minutes));
        assert!(!message.has_expired_client(two_minutes));
    }
}
