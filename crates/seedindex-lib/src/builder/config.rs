//! Build configuration for seed index construction
//!
//! [`EnumConfig`] bundles the seed encoding parameters that are passed through
//! unchanged to the seed encoder (shape, minimizer window, complexity cut,
//! masking). [`IndexConfig`] adds the partitioning, hash table and threading
//! parameters. Both are plain values scoped to one build.

use std::fmt;
use std::str::FromStr;

use crate::constants::{
    DEFAULT_COMPLEXITY_CUT, DEFAULT_LOAD_FACTOR, DEFAULT_MINIMIZER_WINDOW,
    DEFAULT_REPETITIVE_CUTOFF, DEFAULT_SEED, DEFAULT_SEEDP_BITS, DEFAULT_SHAPE, MAX_SEEDP_BITS,
    SEED_OFFSET_BITS,
};
use crate::error::{IndexError, Result};
use crate::seed::SeedPartitioning;
use crate::shape::Shape;

/// How soft-masked (lowercase) reference letters are treated
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MaskingAlgo {
    /// Lowercase letters are ordinary bases
    #[default]
    None,
    /// Lowercase letters are masked and never covered by a seed
    SoftMask,
}

impl MaskingAlgo {
    /// Whether lowercase letters are masked
    pub fn soft_mask(&self) -> bool {
        matches!(self, MaskingAlgo::SoftMask)
    }
}

impl FromStr for MaskingAlgo {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "0" => Ok(MaskingAlgo::None),
            "soft" | "softmask" | "soft-mask" | "1" => Ok(MaskingAlgo::SoftMask),
            other => Err(IndexError::config(format!("unknown masking algorithm '{}'", other))),
        }
    }
}

impl fmt::Display for MaskingAlgo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaskingAlgo::None => f.write_str("none"),
            MaskingAlgo::SoftMask => f.write_str("soft-mask"),
        }
    }
}

/// Seed encoding parameters
#[derive(Debug, Clone)]
pub struct EnumConfig {
    /// Seed shape
    pub shape: Shape,

    /// Minimizer window over consecutive seed positions (<= 1 disables)
    pub minimizer_window: usize,

    /// Minimum seed complexity (0 disables the filter)
    pub complexity_cut: f64,

    /// Treatment of soft-masked letters
    pub masking: MaskingAlgo,

    /// Seed for the minimizer hash function
    pub hash_seed: u64,
}

impl Default for EnumConfig {
    fn default() -> Self {
        Self {
            shape: Shape::parse(DEFAULT_SHAPE).expect("default shape is valid"),
            minimizer_window: DEFAULT_MINIMIZER_WINDOW,
            complexity_cut: DEFAULT_COMPLEXITY_CUT,
            masking: MaskingAlgo::None,
            hash_seed: DEFAULT_SEED,
        }
    }
}

impl EnumConfig {
    /// Encoding configuration for the given shape, other parameters default
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            ..Self::default()
        }
    }

    /// Validate the encoding parameters
    pub fn validate(&self) -> Result<()> {
        if !self.complexity_cut.is_finite() || self.complexity_cut < 0.0 {
            return Err(IndexError::config(format!(
                "seed complexity cut must be a non-negative number, got {}",
                self.complexity_cut
            )));
        }
        Ok(())
    }
}

/// Configuration parameters for building a seed index
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Number of partition bits (2^bits partitions)
    pub seedp_bits: u32,

    /// Number of worker threads (0 = all available cores)
    pub num_threads: usize,

    /// Hash table slots per distinct seed key (must be > 1)
    pub load_factor: f64,

    /// Fraction of distinct seeds whose largest groups are dropped as repetitive (0 disables)
    pub repetitive_cutoff: f64,

    /// Seed encoding parameters
    pub seed_encoding: EnumConfig,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            seedp_bits: DEFAULT_SEEDP_BITS,
            num_threads: 0,
            load_factor: DEFAULT_LOAD_FACTOR,
            repetitive_cutoff: DEFAULT_REPETITIVE_CUTOFF,
            seed_encoding: EnumConfig::default(),
        }
    }
}

impl IndexConfig {
    /// Create a configuration for the given shape string
    pub fn new(shape: &str) -> Result<Self> {
        let config = Self {
            seed_encoding: EnumConfig::new(Shape::parse(shape)?),
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Seed partitioning derived from `seedp_bits`
    pub fn partitioning(&self) -> SeedPartitioning {
        SeedPartitioning::new(self.seedp_bits)
    }

    /// Number of worker threads to start for `num_partitions` work items
    pub fn worker_count(&self, num_partitions: usize) -> usize {
        let threads = if self.num_threads == 0 {
            rayon::current_num_threads()
        } else {
            self.num_threads
        };
        threads.clamp(1, num_partitions.max(1))
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.seedp_bits > MAX_SEEDP_BITS {
            return Err(IndexError::config(format!(
                "seedp_bits must be in range [0, {}], got {}",
                MAX_SEEDP_BITS, self.seedp_bits
            )));
        }

        let key_bits = self.seed_encoding.shape.key_bits();
        if self.seedp_bits > key_bits {
            return Err(IndexError::config(format!(
                "seedp_bits={} exceeds the {} bits of a seed of shape {}",
                self.seedp_bits, key_bits, self.seed_encoding.shape
            )));
        }
        if key_bits - self.seedp_bits > SEED_OFFSET_BITS {
            return Err(IndexError::config(format!(
                "shape {} (weight {}) needs more than {} bits per partition-local key with seedp_bits={}",
                self.seed_encoding.shape,
                self.seed_encoding.shape.weight(),
                SEED_OFFSET_BITS,
                self.seedp_bits
            )));
        }

        if !self.load_factor.is_finite() || self.load_factor <= 1.0 {
            return Err(IndexError::config(format!(
                "load_factor must be greater than 1.0, got {}",
                self.load_factor
            )));
        }

        if !(0.0..1.0).contains(&self.repetitive_cutoff) {
            return Err(IndexError::config(format!(
                "repetitive_cutoff must be in range [0, 1), got {}",
                self.repetitive_cutoff
            )));
        }

        self.seed_encoding.validate()
    }

    /// Log configuration parameters via tracing
    pub fn print(&self) {
        tracing::info!("Index Configuration:");
        tracing::info!("  shape = {} (weight {})", self.seed_encoding.shape, self.seed_encoding.shape.weight());
        tracing::info!("  partitions = {} (seedp_bits = {})", self.partitioning().count(), self.seedp_bits);
        if self.num_threads == 0 {
            tracing::info!("  num_threads = all available cores");
        } else {
            tracing::info!("  num_threads = {}", self.num_threads);
        }
        tracing::info!("  minimizer_window = {}", self.seed_encoding.minimizer_window);
        tracing::debug!("  complexity_cut = {}", self.seed_encoding.complexity_cut);
        tracing::debug!("  masking = {}", self.seed_encoding.masking);
        tracing::debug!("  load_factor = {}", self.load_factor);
        tracing::debug!("  repetitive_cutoff = {}", self.repetitive_cutoff);
        tracing::debug!("  hash_seed = {}", self.seed_encoding.hash_seed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = IndexConfig::default();
        assert_eq!(config.seedp_bits, DEFAULT_SEEDP_BITS);
        assert_eq!(config.seed_encoding.shape.to_string(), DEFAULT_SHAPE);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_new_config() {
        let config = IndexConfig::new("11011").unwrap();
        assert_eq!(config.seed_encoding.shape.weight(), 4);
        assert!(IndexConfig::new("0110").is_err());
    }

    #[test]
    fn test_validate_key_width() {
        // weight 20 -> 40 bits, 8 partition bits -> 32-bit local key
        let config = IndexConfig {
            seed_encoding: EnumConfig::new(Shape::contiguous(20).unwrap()),
            ..IndexConfig::default()
        };
        assert!(config.validate().is_ok());

        let config = IndexConfig {
            seedp_bits: 6,
            ..config
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_partition_bits() {
        let config = IndexConfig { seedp_bits: 17, ..IndexConfig::default() };
        assert!(config.validate().is_err());

        // "11" packs into 4 bits, fewer than the default 8 partition bits
        assert!(IndexConfig::new("11").is_err());

        let mut config = IndexConfig {
            seed_encoding: EnumConfig::new(Shape::parse("11").unwrap()),
            ..IndexConfig::default()
        };
        config.seedp_bits = 5;
        assert!(config.validate().is_err());
        config.seedp_bits = 4;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_load_factor_and_cutoff() {
        assert!(IndexConfig { load_factor: 1.0, ..IndexConfig::default() }.validate().is_err());
        assert!(IndexConfig { load_factor: f64::NAN, ..IndexConfig::default() }.validate().is_err());
        assert!(IndexConfig { repetitive_cutoff: 1.0, ..IndexConfig::default() }.validate().is_err());
        assert!(IndexConfig { repetitive_cutoff: -0.1, ..IndexConfig::default() }.validate().is_err());
        assert!(IndexConfig { repetitive_cutoff: 0.001, ..IndexConfig::default() }.validate().is_ok());
    }

    #[test]
    fn test_worker_count() {
        let config = IndexConfig { num_threads: 8, ..IndexConfig::default() };
        assert_eq!(config.worker_count(4), 4);
        assert_eq!(config.worker_count(256), 8);
        assert_eq!(config.worker_count(0), 1);
    }

    #[test]
    fn test_masking_from_str() {
        assert_eq!("none".parse::<MaskingAlgo>().unwrap(), MaskingAlgo::None);
        assert_eq!("soft-mask".parse::<MaskingAlgo>().unwrap(), MaskingAlgo::SoftMask);
        assert!("tantan".parse::<MaskingAlgo>().is_err());
        assert!(MaskingAlgo::SoftMask.soft_mask());
    }
}
