use tracing::debug;

use chatlink_crypto::{MessageSignature, MessageSigner};

use crate::body::MessageBody;
use crate::link::MessageLink;
use crate::message::ChatMessage;

/// Signs outgoing bodies along one chain.
#[derive(Debug)]
pub struct ChainEncoder<S> {
    signer: S,
    next_link: Option<MessageLink>,
}

impl<S: MessageSigner> ChainEncoder<S> {
    /// Create an encoder whose first message uses `root`.
    pub fn new(signer: S, root: MessageLink) -> Self {
        Self {
            signer,
            next_link: Some(root),
        }
    }

    /// The link the next message will use, or `None` once exhausted.
    pub fn next_link(&self) -> Option<&MessageLink> {
        self.next_link.as_ref()
    }

    /// Check whether the chain has run out of indices.
    pub fn is_exhausted(&self) -> bool {
        self.next_link.is_none()
    }

    /// Sign `body` at the next link and advance.
    ///
    /// Returns `None` once the chain is exhausted; the caller must start a
    /// new session.
    pub fn encode(&mut self, body: &MessageBody) -> Option<MessageSignature> {
        self.encode_message(body.clone())
            .and_then(|message| message.signature().cloned())
    }

    /// Sign `body` at the next link and return the full message.
    pub fn encode_message(&mut self, body: MessageBody) -> Option<ChatMessage> {
        let Some(link) = self.next_link else {
            debug!("Chat chain exhausted; a new session is required");
            return None;
        };
        let signature = self.signer.sign(&body.signable_bytes(&link));
        self.next_link = link.advance();
        Some(ChatMessage::new(link, Some(signature), body))
    }
}
