//! Display redaction for verified content.
//!
//! A mask only changes what is shown. The signed content a message was
//! verified against is never altered.

use bytes::{Buf, BufMut};

use crate::bitset::BitSet;
use crate::error::{ChatError, Result};
use crate::limits::MAX_FILTER_MASK_WORDS;
use crate::wire;

/// Character shown in place of a masked character.
pub const FILTER_CHAR: char = '#';

const KIND_PASS_THROUGH: u32 = 0;
const KIND_FULLY_FILTERED: u32 = 1;
const KIND_PARTIALLY_FILTERED: u32 = 2;

/// Which characters of a message to hide.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FilterMask {
    /// Show everything.
    #[default]
    PassThrough,
    /// Hide the whole message.
    FullyFiltered,
    /// Hide the characters whose indices are set.
    PartiallyFiltered(BitSet),
}

impl FilterMask {
    /// Build a partial mask; an empty set means nothing is hidden.
    pub fn partial(mask: BitSet) -> Self {
        if mask.is_empty() {
            FilterMask::PassThrough
        } else {
            FilterMask::PartiallyFiltered(mask)
        }
    }

    /// Apply the mask to `text`.
    ///
    /// Returns `None` when the whole message is hidden.
    pub fn apply(&self, text: &str) -> Option<String> {
        match self {
            FilterMask::PassThrough => Some(text.to_string()),
            FilterMask::FullyFiltered => None,
            FilterMask::PartiallyFiltered(mask) => Some(
                text.chars()
                    .enumerate()
                    .map(|(i, c)| if mask.get(i) { FILTER_CHAR } else { c })
                    .collect(),
            ),
        }
    }

    /// Check whether nothing is hidden.
    pub fn is_empty(&self) -> bool {
        *self == FilterMask::PassThrough
    }

    /// Check whether everything is hidden.
    pub fn is_fully_filtered(&self) -> bool {
        *self == FilterMask::FullyFiltered
    }

    /// Write the wire form: varint kind, then for a partial mask a
    /// varint word count and each word big-endian.
    pub fn encode(&self, buf: &mut impl BufMut) -> Result<()> {
        match self {
            FilterMask::PassThrough => wire::put_var_int(buf, KIND_PASS_THROUGH),
            FilterMask::FullyFiltered => wire::put_var_int(buf, KIND_FULLY_FILTERED),
            FilterMask::PartiallyFiltered(mask) => {
                let words = mask.words();
                if words.len() > MAX_FILTER_MASK_WORDS {
                    return Err(ChatError::Wire(format!(
                        "filter mask of {} words exceeds {MAX_FILTER_MASK_WORDS}",
                        words.len()
                    )));
                }
                wire::put_var_int(buf, KIND_PARTIALLY_FILTERED);
                wire::put_len(buf, words.len());
                for &word in words {
                    buf.put_u64(word);
                }
            }
        }
        Ok(())
    }

    /// Read the wire form.
    pub fn decode(buf: &mut impl Buf) -> Result<Self> {
        match wire::get_var_int(buf)? {
            KIND_PASS_THROUGH => Ok(FilterMask::PassThrough),
            KIND_FULLY_FILTERED => Ok(FilterMask::FullyFiltered),
            KIND_PARTIALLY_FILTERED => {
                let count = wire::get_len(buf, MAX_FILTER_MASK_WORDS, "filter mask")?;
                let words = (0..count)
                    .map(|_| wire::get_u64(buf))
                    .collect::<Result<Vec<_>>>()?;
                Ok(FilterMask::partial(BitSet::from_words(words)))
            }
            kind => Err(ChatError::Wire(format!("unknown filter mask kind {kind}"))),
        }
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
