//! Seed enumeration
//!
//! Walks a sequence window by window, packs each window with the shape, drops
//! windows that cover masked letters or fall below the complexity cut, and
//! (with a minimizer window > 1) keeps only the selected minimizers. The same
//! encoder is used for the histogram pass, the seed array pass and for query
//! sequences, so all three see exactly the same seeds.

use crate::builder::config::EnumConfig;
use crate::constants::MAX_SHAPE_WEIGHT;
use crate::minimizer::MinimizerWindow;
use crate::shape::PackedSeed;

/// Counters collected while enumerating seeds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedStats {
    /// Windows whose weighted positions are all unmasked
    pub good_seed_positions: u64,
    /// Good windows rejected by the complexity cut
    pub low_complexity_seeds: u64,
    /// Seeds handed to the callback
    pub emitted_seeds: u64,
}

impl SeedStats {
    /// Accumulate another set of counters
    pub fn merge(&mut self, other: &SeedStats) {
        self.good_seed_positions += other.good_seed_positions;
        self.low_complexity_seeds += other.low_complexity_seeds;
        self.emitted_seeds += other.emitted_seeds;
    }
}

/// Enumerates the seeds of letter sequences under an [`EnumConfig`]
pub struct SeedEncoder<'a> {
    cfg: &'a EnumConfig,
    /// ln(i!) for i in 0..=MAX_SHAPE_WEIGHT
    ln_factorial: [f64; MAX_SHAPE_WEIGHT + 1],
}

impl<'a> SeedEncoder<'a> {
    /// Create an encoder for the given configuration
    pub fn new(cfg: &'a EnumConfig) -> Self {
        let mut ln_factorial = [0.0f64; MAX_SHAPE_WEIGHT + 1];
        for i in 1..=MAX_SHAPE_WEIGHT {
            ln_factorial[i] = ln_factorial[i - 1] + (i as f64).ln();
        }
        Self { cfg, ln_factorial }
    }

    /// The configuration in use
    pub fn config(&self) -> &EnumConfig {
        self.cfg
    }

    /// Multinomial entropy of the window's weighted letters:
    /// `ln(weight!) - sum(ln(count!))`
    pub fn complexity(&self, window: &[u8]) -> f64 {
        let shape = &self.cfg.shape;
        let counts = shape.letter_counts(window);
        let mut entropy = self.ln_factorial[shape.weight()];
        for c in counts {
            entropy -= self.ln_factorial[c as usize];
        }
        entropy
    }

    /// Whether a valid window passes the complexity cut
    #[inline]
    pub fn is_complex(&self, window: &[u8]) -> bool {
        self.cfg.complexity_cut <= 0.0 || self.complexity(window) >= self.cfg.complexity_cut
    }

    /// Seed of the window starting at `window[0]`, if it passes all filters
    #[inline]
    fn window_seed(&self, window: &[u8], stats: &mut SeedStats) -> Option<PackedSeed> {
        let seed = self.cfg.shape.pack(window)?;
        stats.good_seed_positions += 1;
        if !self.is_complex(window) {
            stats.low_complexity_seeds += 1;
            return None;
        }
        Some(seed)
    }

    /// Enumerate the seeds of one sequence
    ///
    /// # Arguments
    /// * `letters` - Letter codes of the sequence
    /// * `base_pos` - Buffer offset of `letters[0]`; emitted positions are absolute
    /// * `stats` - Counters to update
    /// * `emit` - Called with `(seed, position)` for every selected seed
    pub fn enumerate<F>(&self, letters: &[u8], base_pos: u64, stats: &mut SeedStats, mut emit: F)
    where
        F: FnMut(PackedSeed, u64),
    {
        let length = self.cfg.shape.length();
        if letters.len() < length {
            return;
        }
        let num_windows = letters.len() - length + 1;

        if self.cfg.minimizer_window <= 1 {
            for i in 0..num_windows {
                if let Some(seed) = self.window_seed(&letters[i..], stats) {
                    stats.emitted_seeds += 1;
                    emit(seed, base_pos + i as u64);
                }
            }
            return;
        }

        let mut selector = MinimizerWindow::with_seed(self.cfg.minimizer_window, self.cfg.hash_seed);
        for i in 0..num_windows {
            let seed = self.window_seed(&letters[i..], stats);
            if let Some(mini) = selector.next(seed, base_pos + i as u64) {
                stats.emitted_seeds += 1;
                emit(mini.seed, mini.position);
            }
        }
        if let Some(mini) = selector.finish() {
            stats.emitted_seeds += 1;
            emit(mini.seed, mini.position);
        }
    }

    /// Collect the seeds of one sequence
    pub fn seeds(&self, letters: &[u8], base_pos: u64) -> Vec<(PackedSeed, u64)> {
        let mut stats = SeedStats::default();
        let mut out = Vec::new();
        self.enumerate(letters, base_pos, &mut stats, |seed, pos| out.push((seed, pos)));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::config::MaskingAlgo;
    use crate::encoding::encode_sequence;
    use crate::shape::Shape;

    fn config(shape: &str) -> EnumConfig {
        EnumConfig::new(Shape::parse(shape).unwrap())
    }

    #[test]
    fn test_enumerate_contiguous() {
        let cfg = config("111");
        let encoder = SeedEncoder::new(&cfg);
        let letters = encode_sequence(b"ACGTA", false);
        let seeds = encoder.seeds(&letters, 10);
        // ACG, CGT, GTA
        assert_eq!(
            seeds,
            vec![(0b00_01_10, 10), (0b01_10_11, 11), (0b10_11_00, 12)]
        );
    }

    #[test]
    fn test_enumerate_skips_masked_windows() {
        let cfg = config("11");
        let encoder = SeedEncoder::new(&cfg);
        let letters = encode_sequence(b"ACNGT", false);
        let positions: Vec<u64> = encoder.seeds(&letters, 0).into_iter().map(|(_, p)| p).collect();
        assert_eq!(positions, vec![0, 3]);
    }

    #[test]
    fn test_soft_masked_letters_are_skipped() {
        let cfg = EnumConfig {
            masking: MaskingAlgo::SoftMask,
            ..config("11")
        };
        let encoder = SeedEncoder::new(&cfg);
        let letters = encode_sequence(b"ACgtAC", cfg.masking.soft_mask());
        let positions: Vec<u64> = encoder.seeds(&letters, 0).into_iter().map(|(_, p)| p).collect();
        assert_eq!(positions, vec![0, 4]);
    }

    #[test]
    fn test_sequence_shorter_than_shape() {
        let cfg = config("11111");
        let encoder = SeedEncoder::new(&cfg);
        assert!(encoder.seeds(&encode_sequence(b"ACGT", false), 0).is_empty());
    }

    #[test]
    fn test_complexity() {
        let cfg = config("1111");
        let encoder = SeedEncoder::new(&cfg);
        let homopolymer = encode_sequence(b"AAAA", false);
        let mixed = encode_sequence(b"ACGT", false);
        assert!(encoder.complexity(&homopolymer).abs() < 1e-12);
        // ln(4!) = ln 24
        assert!((encoder.complexity(&mixed) - 24f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_complexity_cut_filters_low_complexity() {
        let cfg = EnumConfig {
            complexity_cut: 1.0,
            ..config("1111")
        };
        let encoder = SeedEncoder::new(&cfg);
        let letters = encode_sequence(b"AAAACGTA", false);
        let mut stats = SeedStats::default();
        let mut positions = Vec::new();
        encoder.enumerate(&letters, 0, &mut stats, |_, p| positions.push(p));

        // AAAA (0.0) and AAAC (ln 4) vs cut 1.0: only the first is rejected
        assert_eq!(positions, vec![1, 2, 3, 4]);
        assert_eq!(stats.good_seed_positions, 5);
        assert_eq!(stats.low_complexity_seeds, 1);
        assert_eq!(stats.emitted_seeds, 4);
    }

    #[test]
    fn test_minimizer_window_reduces_seeds() {
        let cfg = EnumConfig {
            minimizer_window: 8,
            ..config("11111")
        };
        let encoder = SeedEncoder::new(&cfg);
        let letters = encode_sequence(b"ACGTTGCAAGGCTTACGATCGATCGGATCCATGCA", false);
        let all = SeedEncoder::new(&config("11111")).seeds(&letters, 0);
        let selected = encoder.seeds(&letters, 0);

        assert!(!selected.is_empty());
        assert!(selected.len() < all.len());
        // every minimizer is one of the plain seeds
        for s in &selected {
            assert!(all.contains(s));
        }
        // positions strictly increase
        assert!(selected.windows(2).all(|w| w[0].1 < w[1].1));
    }

    #[test]
    fn test_stats_merge() {
        let mut a = SeedStats { good_seed_positions: 1, low_complexity_seeds: 2, emitted_seeds: 3 };
        a.merge(&SeedStats { good_seed_positions: 10, low_complexity_seeds: 20, emitted_seeds: 30 });
        assert_eq!(a, SeedStats { good_seed_positions: 11, low_complexity_seeds: 22, emitted_seeds: 33 });
    }
}
