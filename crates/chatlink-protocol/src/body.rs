//! Signed message payloads.

use bytes::{Buf, BufMut};
use rand::Rng;

use chatlink_identity::time::now_millis;

use crate::cache::SignatureCache;
use crate::error::{ChatError, Result};
use crate::last_seen::{LastSeenMessages, PackedLastSeen};
use crate::limits::{MAX_CONTENT_CHARS, SIGNABLE_VERSION};
use crate::link::MessageLink;
use crate::wire;

/// Generate a random message salt.
pub fn random_salt() -> i64 {
    rand::thread_rng().gen()
}

/// The part of a chat message covered by its signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageBody {
    content: String,
    timestamp_millis: u64,
    salt: i64,
    last_seen: LastSeenMessages,
}

impl MessageBody {
    /// Create a body.
    ///
    /// # Errors
    ///
    /// Returns `ChatError::ContentTooLong` if `content` has more than
    /// `MAX_CONTENT_CHARS` characters.
    pub fn new(
        content: impl Into<String>,
        timestamp_millis: u64,
        salt: i64,
        last_seen: LastSeenMessages,
    ) -> Result<Self> {
        let content = content.into();
        let chars = content.chars().count();
        if chars > MAX_CONTENT_CHARS {
            return Err(ChatError::ContentTooLong {
                max: MAX_CONTENT_CHARS,
                actual: chars,
            });
        }
        Ok(Self {
            content,
            timestamp_millis,
            salt,
            last_seen,
        })
    }

    /// A body for a message that is never signed: stamped now, zero salt,
    /// nothing acknowledged.
    pub fn unsigned(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            timestamp_millis: now_millis(),
            salt: 0,
            last_seen: LastSeenMessages::empty(),
        }
    }

    /// The plain text content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Send time in Unix milliseconds.
    pub fn timestamp_millis(&self) -> u64 {
        self.timestamp_millis
    }

    /// Send time in whole Unix seconds, as signed.
    pub fn timestamp_secs(&self) -> i64 {
        (self.timestamp_millis / 1000) as i64
    }

    /// Random salt.
    pub fn salt(&self) -> i64 {
        self.salt
    }

    /// The acknowledged signatures.
    pub fn last_seen(&self) -> &LastSeenMessages {
        &self.last_seen
    }

    /// The canonical byte stream a signature over `(link, self)` covers.
    ///
    /// All integers are big-endian:
    ///
    /// ```text
    /// version     i32
    /// sender      16 bytes
    /// session     16 bytes
    /// index       u32
    /// salt        i64
    /// timestamp   i64 (seconds)
    /// content     i32 length, UTF-8 bytes
    /// last_seen   i32 count, 256 bytes each
    /// ```
    pub fn signable_bytes(&self, link: &MessageLink) -> Vec<u8> {
        let mut out = Vec::with_capacity(
            4 + 36 + 16 + 4 + self.content.len() + 4 + self.last_seen.len() * 256,
        );
        out.put_i32(SIGNABLE_VERSION);
        link.write_signable(&mut out);
        out.put_i64(self.salt);
        out.put_i64(self.timestamp_secs());
        out.put_i32(self.content.len() as i32);
        out.put_slice(self.content.as_bytes());
        self.last_seen.write_signable(&mut out);
        out
    }

    /// Compress the last-seen list against the sender's cache.
    pub fn pack(&self, cache: &SignatureCache) -> PackedBody {
        PackedBody {
            content: self.content.clone(),
            timestamp_millis: self.timestamp_millis,
            salt: self.salt,
            last_seen: self.last_seen.pack(cache),
        }
    }
}

/// A body as it travels on the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackedBody {
    content: String,
    timestamp_millis: u64,
    salt: i64,
    last_seen: PackedLastSeen,
}

impl PackedBody {
    /// Create a packed body.
    pub fn new(
        content: impl Into<String>,
        timestamp_millis: u64,
        salt: i64,
        last_seen: PackedLastSeen,
    ) -> Self {
        Self {
            content: content.into(),
            timestamp_millis,
            salt,
            last_seen,
        }
    }

    /// The plain text content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// The packed last-seen list.
    pub fn last_seen(&self) -> &PackedLastSeen {
        &self.last_seen
    }

    /// Resolve the last-seen list against the receiver's cache, allowing
    /// at most `last_seen_count` entries.
    ///
    /// # Errors
    ///
    /// Returns `ChatError::CacheDesync` if a reference names an empty slot,
    /// `ChatError::LastSeenCapacityExceeded` for a list longer than the
    /// window, or `ChatError::ContentTooLong` for oversized content.
    pub fn unpack(&self, cache: &SignatureCache, last_seen_count: usize) -> Result<MessageBody> {
        let last_seen = self.last_seen.unpack(cache, last_seen_count)?;
        MessageBody::new(
            self.content.clone(),
            self.timestamp_millis,
            self.salt,
            last_seen,
        )
    }

    /// Write the wire form: content, timestamp millis, salt, last-seen list.
    pub fn encode(&self, buf: &mut impl BufMut) -> Result<()> {
        wire::put_string(buf, &self.content, MAX_CONTENT_CHARS)?;
        buf.put_u64(self.timestamp_millis);
        buf.put_i64(self.salt);
        self.last_seen.encode(buf);
        Ok(())
    }

    /// Read the wire form.
    pub fn decode(buf: &mut impl Buf) -> Result<Self> {
        let content = wire::get_string(buf, MAX_CONTENT_CHARS)?;
        let timestamp_millis = wire::get_u64(buf)?;
        let salt = wire::get_i64(buf)?;
        let last_seen = PackedLastSeen::decode(buf)?;
        Ok(Self::new(content, timestamp_millis, salt, last_seen))
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
