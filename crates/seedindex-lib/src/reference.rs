//! Reference sequence set
//!
//! All reference sequences are stored in one owned letter buffer, each
//! sequence followed by a [`DELIMITER_LETTER`]. Seed positions are offsets into
//! this buffer; [`ReferenceSet::locate`] maps them back to a sequence.

use crate::encoding::{encode_sequence, DELIMITER_LETTER};

/// The concatenated reference sequences
#[derive(Clone, Debug, Default)]
pub struct ReferenceSet {
    /// Letter codes, sequences separated by delimiters
    letters: Vec<u8>,
    /// Start offset of each sequence in `letters`
    starts: Vec<u64>,
    /// Sequence names (FASTA ids)
    names: Vec<String>,
}

impl ReferenceSet {
    /// Create an empty reference set
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a reference set from raw nucleotide sequences
    ///
    /// Sequences are named by their index.
    pub fn from_sequences<I, S>(sequences: I, soft_mask: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let mut set = Self::new();
        for (i, seq) in sequences.into_iter().enumerate() {
            set.push(&i.to_string(), seq.as_ref(), soft_mask);
        }
        set
    }

    /// Append a sequence
    pub fn push(&mut self, name: &str, sequence: &[u8], soft_mask: bool) {
        self.starts.push(self.letters.len() as u64);
        self.names.push(name.to_string());
        self.letters.extend(encode_sequence(sequence, soft_mask));
        self.letters.push(DELIMITER_LETTER);
    }

    /// Number of sequences
    #[inline]
    pub fn num_sequences(&self) -> usize {
        self.starts.len()
    }

    /// Whether the set has no sequences
    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    /// Total letters over all sequences (delimiters excluded)
    pub fn total_letters(&self) -> u64 {
        (self.letters.len() - self.starts.len()) as u64
    }

    /// The whole letter buffer including delimiters
    pub fn letters(&self) -> &[u8] {
        &self.letters
    }

    /// Start offset of a sequence in the buffer
    #[inline]
    pub fn start(&self, id: usize) -> u64 {
        self.starts[id]
    }

    /// Length of a sequence
    #[inline]
    pub fn sequence_len(&self, id: usize) -> usize {
        let end = self
            .starts
            .get(id + 1)
            .map_or(self.letters.len() as u64, |&next| next);
        (end - self.starts[id]) as usize - 1
    }

    /// Letters of a sequence (without the delimiter)
    pub fn sequence(&self, id: usize) -> &[u8] {
        let start = self.starts[id] as usize;
        &self.letters[start..start + self.sequence_len(id)]
    }

    /// Name of a sequence
    pub fn name(&self, id: usize) -> &str {
        &self.names[id]
    }

    /// Map a buffer position to `(sequence id, offset within the sequence)`
    ///
    /// Returns `None` for positions past the buffer or on a delimiter.
    pub fn locate(&self, pos: u64) -> Option<(usize, u64)> {
        if pos >= self.letters.len() as u64 {
            return None;
        }
        let id = self.starts.partition_point(|&s| s <= pos).checked_sub(1)?;
        let offset = pos - self.starts[id];
        if offset as usize >= self.sequence_len(id) {
            return None;
        }
        Some((id, offset))
    }

    /// Bytes held by the letter buffer
    pub fn num_bytes(&self) -> usize {
        self.letters.len() + self.starts.len() * std::mem::size_of::<u64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let set = ReferenceSet::from_sequences(["ACGT", "GG", "TTTAA"], false);
        assert_eq!(set.num_sequences(), 3);
        assert_eq!(set.total_letters(), 11);
        assert_eq!(set.letters().len(), 14);
        assert_eq!(set.start(0), 0);
        assert_eq!(set.start(1), 5);
        assert_eq!(set.start(2), 8);
        assert_eq!(set.sequence_len(2), 5);
        assert_eq!(set.sequence(1), &[2, 2]);
        assert_eq!(set.name(2), "2");
    }

    #[test]
    fn test_locate() {
        let set = ReferenceSet::from_sequences(["ACGT", "GG", "TTTAA"], false);
        assert_eq!(set.locate(0), Some((0, 0)));
        assert_eq!(set.locate(3), Some((0, 3)));
        assert_eq!(set.locate(4), None); // delimiter
        assert_eq!(set.locate(6), Some((1, 1)));
        assert_eq!(set.locate(12), Some((2, 4)));
        assert_eq!(set.locate(13), None);
        assert_eq!(set.locate(100), None);
    }

    #[test]
    fn test_empty_sequence() {
        let set = ReferenceSet::from_sequences(["", "AC"], false);
        assert_eq!(set.sequence_len(0), 0);
        assert_eq!(set.sequence(0), &[] as &[u8]);
        assert_eq!(set.locate(1), Some((1, 0)));
    }
}
