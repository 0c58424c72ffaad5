//! A growable bitset.
//!
//! Used for last-seen acknowledgment windows and partial filter masks.
//! Trailing zero words are never stored, so equal sets compare equal
//! regardless of how they were built.

/// A growable set of bit indices.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct BitSet {
    words: Vec<u64>,
}

impl BitSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set from 64-bit words, lowest bits first.
    pub fn from_words(words: Vec<u64>) -> Self {
        let mut set = Self { words };
        set.trim();
        set
    }

    /// Create a set from little-endian bytes (bit 0 is the low bit of byte 0).
    pub fn from_le_bytes(bytes: &[u8]) -> Self {
        let words = bytes
            .chunks(8)
            .map(|chunk| {
                let mut word = [0u8; 8];
                word[..chunk.len()].copy_from_slice(chunk);
                u64::from_le_bytes(word)
            })
            .collect();
        Self::from_words(words)
    }

    /// Encode into exactly `len` little-endian bytes, dropping higher bits.
    pub fn to_le_bytes(&self, len: usize) -> Vec<u8> {
        let mut out: Vec<u8> = self.words.iter().flat_map(|w| w.to_le_bytes()).collect();
        out.resize(len, 0);
        out
    }

    /// Get the backing words, lowest bits first.
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Set bit `index`.
    pub fn set(&mut self, index: usize) {
        let word = index / 64;
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1u64 << (index % 64);
    }

    /// Clear bit `index`.
    pub fn clear(&mut self, index: usize) {
        if let Some(word) = self.words.get_mut(index / 64) {
            *word &= !(1u64 << (index % 64));
        }
        self.trim();
    }

    /// Get bit `index`.
    pub fn get(&self, index: usize) -> bool {
        self.words
            .get(index / 64)
            .is_some_and(|word| word & (1u64 << (index % 64)) != 0)
    }

    /// Index of the highest set bit plus one, or zero when empty.
    pub fn len(&self) -> usize {
        match self.words.last() {
            Some(&last) => (self.words.len() - 1) * 64 + (64 - last.leading_zeros() as usize),
            None => 0,
        }
    }

    /// Check if no bit is set.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Iterate over set bit indices in ascending order.
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len()).filter(move |&i| self.get(i))
    }

    fn trim(&mut self) {
        while self.words.last() == Some(&0) {
            self.words.pop();
        }
    }
}

impl FromIterator<usize> for BitSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut set = BitSet::new();
        for index in iter {
            set.set(index);
        }
        set
    }
}
