//! Positions in a sender's signing chain.

use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::limits::MAX_LINK_INDEX;
use crate::wire;

/// One position in a sender's signing chain.
///
/// The index only ever grows for a given `(sender, session_id)` pair. Each
/// signed message is bound to exactly one link, so a replayed or reordered
/// message fails verification against the link the receiver expects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageLink {
    index: u32,
    sender: Uuid,
    session_id: Uuid,
}

impl MessageLink {
    /// Create a link at an arbitrary index.
    pub fn new(index: u32, sender: Uuid, session_id: Uuid) -> Self {
        Self {
            index,
            sender,
            session_id,
        }
    }

    /// The first link of a session.
    pub fn root(sender: Uuid, session_id: Uuid) -> Self {
        Self::new(0, sender, session_id)
    }

    /// The link carried by messages from a sender without a session.
    pub fn unsigned(sender: Uuid) -> Self {
        Self::root(sender, Uuid::nil())
    }

    /// The next link, or `None` when the index space is exhausted.
    ///
    /// An exhausted chain can only continue in a new session.
    pub fn advance(&self) -> Option<Self> {
        if self.index >= MAX_LINK_INDEX {
            return None;
        }
        Some(Self {
            index: self.index + 1,
            ..*self
        })
    }

    /// Check whether `self` comes strictly after `other` in the same chain.
    pub fn is_descendant_of(&self, other: &MessageLink) -> bool {
        self.sender == other.sender
            && self.session_id == other.session_id
            && self.index > other.index
    }

    /// Position in the chain.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// The signing profile.
    pub fn sender(&self) -> Uuid {
        self.sender
    }

    /// The chat session this chain belongs to.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Append this link's contribution to a signable byte stream.
    ///
    /// Layout: sender (16), session (16), index (4, big-endian).
    pub fn write_signable(&self, out: &mut impl BufMut) {
        wire::put_uuid(out, &self.sender);
        wire::put_uuid(out, &self.session_id);
        out.put_u32(self.index);
    }

    /// Write the wire form: varint index, sender, session.
    pub fn encode(&self, buf: &mut impl BufMut) {
        wire::put_var_int(buf, self.index);
        wire::put_uuid(buf, &self.sender);
        wire::put_uuid(buf, &self.session_id);
    }

    /// Read the wire form.
    pub fn decode(buf: &mut impl Buf) -> Result<Self> {
        let index = wire::get_var_int(buf)?;
        let sender = wire::get_uuid(buf)?;
        let session_id = wire::get_uuid(buf)?;
        Ok(Self::new(index, sender, session_id))
    }

    /// Encode into a fresh buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(wire::MAX_VAR_INT_BYTES + 32);
        self.encode(&mut out);
        out
    }

    /// Decode a complete buffer, rejecting trailing bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        wire::decode_exact(bytes, |buf| Self::decode(buf))
    }
}
