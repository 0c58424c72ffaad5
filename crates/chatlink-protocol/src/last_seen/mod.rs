//! Last-seen acknowledgment.
//!
//! Every signed body names the most recent messages its sender had seen,
//! which lets a receiver check that the sender saw the same conversation.
//! Sending the full list each time would cost up to twenty signatures per
//! message, so the receiving side of a chat stream reports what it saw as an
//! offset plus a small bitset, and the broadcasting side reconstructs the
//! list from its own record of what it sent.
//!
//! - [`LastSeenTracker`] runs where messages arrive and produces updates.
//! - [`LastSeenValidator`] runs where messages were sent and checks updates.

mod tracker;
mod validator;

pub use tracker::LastSeenTracker;
pub use validator::LastSeenValidator;

use bytes::{Buf, BufMut};

use chatlink_crypto::MessageSignature;

use crate::bitset::BitSet;
use crate::cache::{PackedSignature, SignatureCache};
use crate::error::{ChatError, Result};
use crate::limits::LAST_SEEN_COUNT;
use crate::wire;

/// The ordered list of signatures a body acknowledges, oldest first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LastSeenMessages {
    entries: Vec<MessageSignature>,
}

impl LastSeenMessages {
    /// Create a list of at most `LAST_SEEN_COUNT` signatures.
    ///
    /// # Errors
    ///
    /// Returns `ChatError::LastSeenCapacityExceeded` for a longer list.
    pub fn new(entries: Vec<MessageSignature>) -> Result<Self> {
        Self::with_capacity(entries, LAST_SEEN_COUNT)
    }

    /// Create a list for a connection whose window holds `max` signatures.
    ///
    /// `max` is clamped to `LAST_SEEN_COUNT`.
    ///
    /// # Errors
    ///
    /// Returns `ChatError::LastSeenCapacityExceeded` for a longer list.
    pub fn with_capacity(entries: Vec<MessageSignature>, max: usize) -> Result<Self> {
        let max = max.min(LAST_SEEN_COUNT);
        if entries.len() > max {
            return Err(ChatError::LastSeenCapacityExceeded {
                max,
                actual: entries.len(),
            });
        }
        Ok(Self { entries })
    }

    /// An empty list.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The acknowledged signatures.
    pub fn entries(&self) -> &[MessageSignature] {
        &self.entries
    }

    /// Number of signatures.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append this list's contribution to a signable byte stream: a 4-byte
    /// big-endian count, then each signature in order.
    pub fn write_signable(&self, out: &mut impl BufMut) {
        out.put_i32(self.entries.len() as i32);
        for signature in &self.entries {
            wire::put_signature(out, signature);
        }
    }

    /// Replace each signature with a cache reference where possible.
    pub fn pack(&self, cache: &SignatureCache) -> PackedLastSeen {
        PackedLastSeen {
            entries: self
                .entries
                .iter()
                .map(|signature| cache.pack_signature(signature))
                .collect(),
        }
    }
}

/// A last-seen list as it travels on the wire.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PackedLastSeen {
    entries: Vec<PackedSignature>,
}

impl PackedLastSeen {
    /// Create a packed list of at most `LAST_SEEN_COUNT` entries.
    pub fn new(entries: Vec<PackedSignature>) -> Result<Self> {
        if entries.len() > LAST_SEEN_COUNT {
            return Err(ChatError::LastSeenCapacityExceeded {
                max: LAST_SEEN_COUNT,
                actual: entries.len(),
            });
        }
        Ok(Self { entries })
    }

    /// The packed entries.
    pub fn entries(&self) -> &[PackedSignature] {
        &self.entries
    }

    /// Resolve every entry against the receiver's cache, for a connection
    /// whose window holds `max` signatures.
    ///
    /// # Errors
    ///
    /// Returns `ChatError::LastSeenCapacityExceeded` for more than `max`
    /// entries, or `ChatError::CacheDesync` for the first reference to an
    /// empty slot.
    pub fn unpack(&self, cache: &SignatureCache, max: usize) -> Result<LastSeenMessages> {
        let max = max.min(LAST_SEEN_COUNT);
        if self.entries.len() > max {
            return Err(ChatError::LastSeenCapacityExceeded {
                max,
                actual: self.entries.len(),
            });
        }
        let entries = self
            .entries
            .iter()
            .map(|packed| match packed {
                PackedSignature::Cached(id) => cache
                    .unpack(*id as usize)
                    .cloned()
                    .ok_or(ChatError::CacheDesync { id: *id }),
                PackedSignature::Full(signature) => Ok((**signature).clone()),
            })
            .collect::<Result<Vec<_>>>()?;
        LastSeenMessages::with_capacity(entries, max)
    }

    /// Write the wire form: varint count, then each packed signature.
    pub fn encode(&self, buf: &mut impl BufMut) {
        wire::put_len(buf, self.entries.len());
        for entry in &self.entries {
            entry.encode(buf);
        }
    }

    /// Read the wire form.
    pub fn decode(buf: &mut impl Buf) -> Result<Self> {
        let count = wire::get_len(buf, LAST_SEEN_COUNT, "last-seen list")?;
        let entries = (0..count)
            .map(|_| PackedSignature::decode(buf))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { entries })
    }
}

/// An acknowledgment of the messages a receiver has seen.
///
/// `offset` counts messages that slid out of the receiver's window since the
/// previous update. Bit `i` of `acknowledged` covers slot `i` of the window
/// after that shift, oldest first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LastSeenUpdate {
    /// Messages dropped from the front of the window.
    pub offset: u32,
    /// Acknowledged window slots.
    pub acknowledged: BitSet,
}

impl LastSeenUpdate {
    /// Create an update.
    pub fn new(offset: u32, acknowledged: BitSet) -> Self {
        Self {
            offset,
            acknowledged,
        }
    }

    /// Write the wire form: varint offset, then a fixed bitset of
    /// `LAST_SEEN_COUNT` bits.
    pub fn encode(&self, buf: &mut impl BufMut) -> Result<()> {
        wire::put_var_int(buf, self.offset);
        wire::put_fixed_bitset(buf, &self.acknowledged, LAST_SEEN_COUNT)
    }

    /// Read the wire form.
    ///
    /// Padding bits are kept, so an update acknowledging beyond the window
    /// decodes and is rejected by the validator.
    pub fn decode(buf: &mut impl Buf) -> Result<Self> {
        let offset = wire::get_var_int(buf)?;
        let acknowledged = wire::get_fixed_bitset(buf, LAST_SEEN_COUNT)?;
        Ok(Self::new(offset, acknowledged))
    }

    /// Encode into a fresh buffer.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.encode(&mut out)?;
        Ok(out)
    }

    /// Decode a complete buffer, rejecting trailing bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        wire::decode_exact(bytes, |buf| Self::decode(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatlink_crypto::SIGNATURE_BYTES;

    fn sig(tag: u8) -> MessageSignature {
        MessageSignature::from_array([tag; SIGNATURE_BYTES])
    }

    #[test]
    fn test_capacity_enforced() {
        let full: Vec<_> = (0..LAST_SEEN_COUNT as u8).map(sig).collect();
        assert!(LastSeenMessages::new(full).is_ok());

        let over: Vec<_> = (0..=LAST_SEEN_COUNT as u8).map(sig).collect();
        assert_eq!(
            LastSeenMessages::new(over),
            Err(ChatError::LastSeenCapacityExceeded {
                max: LAST_SEEN_COUNT,
                actual: LAST_SEEN_COUNT + 1
            })
        );
    }

    #[test]
    fn test_configured_capacity() {
        let five: Vec<_> = (0..5).map(sig).collect();
        assert!(LastSeenMessages::with_capacity(five.clone(), 5).is_ok());
        assert_eq!(
            LastSeenMessages::with_capacity(five, 3),
            Err(ChatError::LastSeenCapacityExceeded { max: 3, actual: 5 })
        );

        let over: Vec<_> = (0..=LAST_SEEN_COUNT as u8).map(sig).collect();
        assert!(LastSeenMessages::with_capacity(over, 64).is_err());
    }

    #[test]
    fn test_unpack_enforces_receiver_window() {
        let seen = LastSeenMessages::new((0..15).map(sig).collect()).unwrap();
        let packed = seen.pack(&SignatureCache::new(8));

        let cache = SignatureCache::new(8);
        assert_eq!(
            packed.unpack(&cache, 3),
            Err(ChatError::LastSeenCapacityExceeded { max: 3, actual: 15 })
        );
        assert_eq!(packed.unpack(&cache, 15).unwrap(), seen);
    }

    #[test]
    fn test_signable_layout() {
        let seen = LastSeenMessages::new(vec![sig(1), sig(2)]).unwrap();
        let mut out = Vec::new();
        seen.write_signable(&mut out);

        assert_eq!(out.len(), 4 + 2 * SIGNATURE_BYTES);
        assert_eq!(&out[..4], &[0, 0, 0, 2]);
        assert_eq!(out[4], 1);
        assert_eq!(out[4 + SIGNATURE_BYTES], 2);
    }

    #[test]
    fn test_pack_unpack_through_cache() {
        let mut cache = SignatureCache::new(8);
        cache.push(&LastSeenMessages::new(vec![sig(1)]).unwrap(), None);

        let seen = LastSeenMessages::new(vec![sig(1), sig(2)]).unwrap();
        let packed = seen.pack(&cache);
        assert_eq!(packed.entries()[0], PackedSignature::Cached(0));
        assert!(matches!(packed.entries()[1], PackedSignature::Full(_)));
        assert_eq!(packed.unpack(&cache, LAST_SEEN_COUNT).unwrap(), seen);
    }

    #[test]
    fn test_unpack_desync() {
        let cache = SignatureCache::new(8);
        let packed = PackedLastSeen::new(vec![PackedSignature::Cached(5)]).unwrap();
        assert_eq!(
            packed.unpack(&cache, LAST_SEEN_COUNT),
            Err(ChatError::CacheDesync { id: 5 })
        );
    }

    #[test]
    fn test_packed_decode_rejects_long_list() {
        let mut buf: &[u8] = &[LAST_SEEN_COUNT as u8 + 1];
        assert!(PackedLastSeen::decode(&mut buf).is_err());
    }

    #[test]
    fn test_update_wire() {
        let update = LastSeenUpdate::new(2, [0, 1, 19].into_iter().collect());
        let bytes = update.to_bytes().unwrap();
        assert_eq!(bytes, vec![2, 0b0000_0011, 0, 0b0000_1000]);
        assert_eq!(LastSeenUpdate::from_bytes(&bytes).unwrap(), update);
    }

    #[test]
    fn test_update_keeps_padding_bits() {
        let update = LastSeenUpdate::from_bytes(&[0, 0, 0, 0b1000_0000]).unwrap();
        assert_eq!(update.acknowledged.len(), 24);
    }
}
