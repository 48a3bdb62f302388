//! Constants and configuration defaults for the seed index
//!
//! This module defines the compile-time defaults used by the build
//! configuration, the letter alphabet limits and the partitioning bounds.

/// Default seed for the minimizer hash function
pub const DEFAULT_SEED: u64 = 1;

/// Default number of partition bits (2^8 = 256 partitions)
pub const DEFAULT_SEEDP_BITS: u32 = 8;

/// Largest supported number of partition bits
pub const MAX_SEEDP_BITS: u32 = 16;

/// Default spaced seed shape (weight 11, length 18)
pub const DEFAULT_SHAPE: &str = "111010010100110111";

/// Maximum shape weight; a packed seed uses 2 bits per weighted position
pub const MAX_SHAPE_WEIGHT: usize = 32;

/// Maximum shape length (span of the seed window)
pub const MAX_SHAPE_LENGTH: usize = 64;

/// Bits available for a partition-local seed key
pub const SEED_OFFSET_BITS: u32 = 32;

/// Hash table slots per distinct key
pub const DEFAULT_LOAD_FACTOR: f64 = 1.2;

/// Minimizer window; values <= 1 index every valid seed position
pub const DEFAULT_MINIMIZER_WINDOW: usize = 1;

/// Seed complexity cut (natural-log multinomial entropy); 0 disables the filter
pub const DEFAULT_COMPLEXITY_CUT: f64 = 0.0;

/// Fraction of distinct seeds treated as repetitive; 0 disables the filter
pub const DEFAULT_REPETITIVE_CUTOFF: f64 = 0.0;

/// Sequence chunks per worker thread used for histogram and seed array population
pub const CHUNKS_PER_THREAD: usize = 4;

/// Version number
pub const VERSION: (u8, u8, u8) = (0, 1, 0);

/// Number of distinct seed partitions for the given number of partition bits
#[inline]
pub const fn num_partitions(seedp_bits: u32) -> usize {
    1usize << seedp_bits
}
