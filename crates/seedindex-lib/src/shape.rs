//! Seed shapes
//!
//! A shape is a binary mask over a window of the sequence, for example
//! `111010010100110111`. Positions marked `1` contribute two bits each to the
//! packed seed; positions marked `0` are "don't care" (spaced seeds). The
//! leftmost weighted position ends up in the most significant bits.

use std::fmt;
use std::str::FromStr;

use crate::constants::{MAX_SHAPE_LENGTH, MAX_SHAPE_WEIGHT};
use crate::encoding::{EncodingError, NUM_LETTERS};

/// A packed seed key (2 bits per weighted shape position)
pub type PackedSeed = u64;

/// A spaced seed shape
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shape {
    positions: Vec<usize>,
    length: usize,
}

impl Shape {
    /// Parse a shape from a string of `1` and `0`
    ///
    /// # Errors
    /// The shape must start and end with `1`, contain only `0`/`1`, and
    /// respect the length and weight limits.
    pub fn parse(code: &str) -> Result<Self, EncodingError> {
        let invalid = |reason: &str| EncodingError::InvalidShape {
            shape: code.to_string(),
            reason: reason.to_string(),
        };

        if code.is_empty() {
            return Err(invalid("shape is empty"));
        }
        if code.len() > MAX_SHAPE_LENGTH {
            return Err(invalid(&format!("length exceeds {}", MAX_SHAPE_LENGTH)));
        }

        let mut positions = Vec::new();
        for (i, c) in code.bytes().enumerate() {
            match c {
                b'1' => positions.push(i),
                b'0' => {}
                _ => return Err(invalid("only '0' and '1' are allowed")),
            }
        }

        if !code.starts_with('1') || !code.ends_with('1') {
            return Err(invalid("shape must start and end with '1'"));
        }
        if positions.len() > MAX_SHAPE_WEIGHT {
            return Err(invalid(&format!("weight exceeds {}", MAX_SHAPE_WEIGHT)));
        }

        Ok(Self {
            positions,
            length: code.len(),
        })
    }

    /// Contiguous shape of length `k` (a plain k-mer)
    pub fn contiguous(k: usize) -> Result<Self, EncodingError> {
        Self::parse(&"1".repeat(k))
    }

    /// Window span of the shape
    #[inline]
    pub fn length(&self) -> usize {
        self.length
    }

    /// Number of weighted positions
    #[inline]
    pub fn weight(&self) -> usize {
        self.positions.len()
    }

    /// Offsets of the weighted positions within the window
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    /// Number of bits in a packed seed of this shape
    #[inline]
    pub fn key_bits(&self) -> u32 {
        2 * self.weight() as u32
    }

    /// Pack the seed of the window starting at `window[0]`.
    ///
    /// Returns `None` if the window is shorter than the shape or any weighted
    /// position holds a masked or delimiter letter.
    #[inline]
    pub fn pack(&self, window: &[u8]) -> Option<PackedSeed> {
        if window.len() < self.length {
            return None;
        }
        let mut seed: PackedSeed = 0;
        for &p in &self.positions {
            let letter = window[p];
            if letter >= NUM_LETTERS {
                return None;
            }
            seed = (seed << 2) | letter as u64;
        }
        Some(seed)
    }

    /// Letter composition of the weighted positions of a valid window
    pub fn letter_counts(&self, window: &[u8]) -> [u32; NUM_LETTERS as usize] {
        let mut counts = [0u32; NUM_LETTERS as usize];
        for &p in &self.positions {
            if let Some(c) = counts.get_mut(window[p] as usize) {
                *c += 1;
            }
        }
        counts
    }
}

impl FromStr for Shape {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut code = vec![b'0'; self.length];
        for &p in &self.positions {
            code[p] = b'1';
        }
        f.write_str(&String::from_utf8_lossy(&code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::{encode_sequence, MASK_LETTER};

    #[test]
    fn test_parse_shape() {
        let shape = Shape::parse("1101").unwrap();
        assert_eq!(shape.length(), 4);
        assert_eq!(shape.weight(), 3);
        assert_eq!(shape.positions(), &[0, 1, 3]);
        assert_eq!(shape.key_bits(), 6);
        assert_eq!(shape.to_string(), "1101");
    }

    #[test]
    fn test_invalid_shapes() {
        assert!(Shape::parse("").is_err());
        assert!(Shape::parse("0110").is_err());
        assert!(Shape::parse("1102").is_err());
        assert!(Shape::parse(&"1".repeat(33)).is_err());
        assert!(Shape::parse(&format!("1{}1", "0".repeat(63))).is_err());
    }

    #[test]
    fn test_pack_contiguous() {
        let shape = Shape::contiguous(4).unwrap();
        let letters = encode_sequence(b"ACGT", false);
        // A=0 C=1 G=2 T=3 -> 00 01 10 11
        assert_eq!(shape.pack(&letters), Some(0b00_01_10_11));
    }

    #[test]
    fn test_pack_spaced_skips_dont_care() {
        let shape = Shape::parse("101").unwrap();
        let a = encode_sequence(b"TAG", false);
        let b = encode_sequence(b"TCG", false);
        assert_eq!(shape.pack(&a), shape.pack(&b));
        assert_eq!(shape.pack(&a), Some(0b11_10));
    }

    #[test]
    fn test_pack_masked_window() {
        let shape = Shape::parse("101").unwrap();
        let masked_weighted = encode_sequence(b"NAG", false);
        assert_eq!(masked_weighted[0], MASK_LETTER);
        assert_eq!(shape.pack(&masked_weighted), None);

        // a mask under a don't-care position is fine
        let masked_gap = encode_sequence(b"ANG", false);
        assert_eq!(shape.pack(&masked_gap), Some(0b00_10));

        assert_eq!(shape.pack(&masked_gap[..2]), None);
    }

    #[test]
    fn test_letter_counts() {
        let shape = Shape::contiguous(5).unwrap();
        let letters = encode_sequence(b"AACGA", false);
        assert_eq!(shape.letter_counts(&letters), [3, 1, 1, 0]);
    }
}
