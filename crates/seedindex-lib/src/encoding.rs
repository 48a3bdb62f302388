//! DNA nucleotide encoding
//!
//! Reference and query sequences are stored one letter per byte:
//! - A (65/97)  -> 0
//! - C (67/99)  -> 1
//! - G (71/103) -> 2
//! - T (84/116) -> 3
//!
//! Every other byte (N, IUPAC ambiguity codes) becomes [`MASK_LETTER`], and
//! sequences in a reference buffer are separated by [`DELIMITER_LETTER`].
//! Seeds never cover a letter >= [`NUM_LETTERS`].

use thiserror::Error;

/// Number of unambiguous nucleotide letters
pub const NUM_LETTERS: u8 = 4;

/// Letter code for masked or ambiguous positions
pub const MASK_LETTER: u8 = 4;

/// Letter code separating sequences in the reference buffer
pub const DELIMITER_LETTER: u8 = 5;

/// Error type for encoding operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    /// The input byte is not a valid DNA base (A/C/G/T)
    #[error("Invalid DNA base: {0:?}")]
    InvalidBase(u8),
    /// The shape string is not a valid seed shape
    #[error("Invalid seed shape {shape:?}: {reason}")]
    InvalidShape {
        /// Shape as given
        shape: String,
        /// Why it was rejected
        reason: String,
    },
}

/// Encode a single DNA nucleotide, rejecting anything but A/C/G/T
#[inline]
pub const fn encode_base(base: u8) -> Result<u8, EncodingError> {
    match base {
        b'A' | b'a' => Ok(0),
        b'C' | b'c' => Ok(1),
        b'G' | b'g' => Ok(2),
        b'T' | b't' | b'U' | b'u' => Ok(3),
        _ => Err(EncodingError::InvalidBase(base)),
    }
}

/// Encode a nucleotide, mapping anything unknown to [`MASK_LETTER`]
///
/// With `soft_mask` set, lowercase bases are masked as well.
#[inline]
pub const fn encode_base_masked(base: u8, soft_mask: bool) -> u8 {
    if soft_mask && base.is_ascii_lowercase() {
        return MASK_LETTER;
    }
    match base {
        b'A' | b'a' => 0,
        b'C' | b'c' => 1,
        b'G' | b'g' => 2,
        b'T' | b't' | b'U' | b'u' => 3,
        _ => MASK_LETTER,
    }
}

/// Decode a letter code to an uppercase nucleotide
#[inline]
pub const fn decode_letter(letter: u8) -> u8 {
    match letter {
        0 => b'A',
        1 => b'C',
        2 => b'G',
        3 => b'T',
        DELIMITER_LETTER => b'|',
        _ => b'N',
    }
}

/// Encode a DNA sequence into letter codes
pub fn encode_sequence(sequence: &[u8], soft_mask: bool) -> Vec<u8> {
    sequence
        .iter()
        .map(|&base| encode_base_masked(base, soft_mask))
        .collect()
}

/// Decode letter codes back to a DNA string
pub fn decode_sequence(letters: &[u8]) -> String {
    letters.iter().map(|&l| decode_letter(l) as char).collect()
}
