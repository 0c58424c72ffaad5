//! Signature compression cache.
//!
//! Both ends of a connection direction keep one cache and push the same
//! signatures in the same order, so a signature can travel as the index of
//! the slot that holds it. The most recently pushed signature sits in slot
//! zero.

use std::collections::{HashSet, VecDeque};

use bytes::{Buf, BufMut};

use chatlink_crypto::MessageSignature;

use crate::error::Result;
use crate::last_seen::LastSeenMessages;
use crate::wire;

/// Fixed-capacity dictionary of recently seen signatures.
#[derive(Clone, Debug)]
pub struct SignatureCache {
    entries: Vec<Option<MessageSignature>>,
}

impl SignatureCache {
    /// Create an empty cache with `capacity` slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: vec![None; capacity],
        }
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    /// Check whether no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(Option::is_none)
    }

    /// Slot index of `signature`, if cached.
    pub fn pack(&self, signature: &MessageSignature) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.as_ref() == Some(signature))
    }

    /// Signature held in slot `id`.
    pub fn unpack(&self, id: usize) -> Option<&MessageSignature> {
        self.entries.get(id)?.as_ref()
    }

    /// Compress a signature into a cache reference when possible.
    pub fn pack_signature(&self, signature: &MessageSignature) -> PackedSignature {
        match self.pack(signature).and_then(|id| u32::try_from(id).ok()) {
            Some(id) => PackedSignature::Cached(id),
            None => PackedSignature::Full(Box::new(signature.clone())),
        }
    }

    /// Resolve a packed signature, or `None` if it refers to an empty slot.
    pub fn unpack_signature(&self, packed: &PackedSignature) -> Option<MessageSignature> {
        match packed {
            PackedSignature::Cached(id) => self.unpack(*id as usize).cloned(),
            PackedSignature::Full(signature) => Some((**signature).clone()),
        }
    }

    /// Record the signatures carried by an outgoing or accepted message.
    ///
    /// The message's own signature lands in slot zero and its last-seen
    /// list fills the following slots in reverse order. Displaced entries
    /// shift toward the back; an entry that is also being pushed is simply
    /// overwritten, so no signature is ever held twice. Whatever falls off
    /// the end is forgotten.
    pub fn push(&mut self, last_seen: &LastSeenMessages, signature: Option<&MessageSignature>) {
        let mut queue: VecDeque<MessageSignature> = last_seen.entries().iter().cloned().collect();
        if let Some(signature) = signature {
            queue.push_back(signature.clone());
        }
        let incoming: HashSet<MessageSignature> = queue.iter().cloned().collect();

        for slot in self.entries.iter_mut() {
            let Some(next) = queue.pop_back() else {
                break;
            };
            if let Some(displaced) = slot.replace(next) {
                if !incoming.contains(&displaced) {
                    queue.push_front(displaced);
                }
            }
        }
    }
}

impl Default for SignatureCache {
    fn default() -> Self {
        Self::new(crate::limits::SIGNATURE_CACHE_CAPACITY)
    }
}

/// A signature as it travels on the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PackedSignature {
    /// Index of a cache slot on the receiving side.
    Cached(u32),
    /// The full signature, for one the receiver has not cached.
    Full(Box<MessageSignature>),
}

impl PackedSignature {
    /// Write the wire form: varint `id + 1`, or zero followed by the full
    /// signature.
    pub fn encode(&self, buf: &mut impl BufMut) {
        match self {
            PackedSignature::Cached(id) => wire::put_var_int(buf, id.saturating_add(1)),
            PackedSignature::Full(signature) => {
                wire::put_var_int(buf, 0);
                wire::put_signature(buf, signature);
            }
        }
    }

    /// Read the wire form.
    pub fn decode(buf: &mut impl Buf) -> Result<Self> {
        match wire::get_var_int(buf)? {
            0 => Ok(PackedSignature::Full(Box::new(wire::get_signature(buf)?))),
            id => Ok(PackedSignature::Cached(id - 1)),
        }
    }
}
