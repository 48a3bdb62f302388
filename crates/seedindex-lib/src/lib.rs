// seedindex: partitioned seed index for DNA similarity search
//
// Builds a hash index over spaced seeds of a set of reference sequences and
// answers seed lookups with the contiguous group of matching positions.

#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod builder;
pub mod constants;
pub mod encoding;
pub mod error;
pub mod hash_table;
pub mod hasher;
pub mod index;
pub mod minimizer;
pub mod reference;
pub mod seed;
pub mod shape;

// Re-export common types at crate root
pub use builder::{EnumConfig, IndexBuilder, IndexConfig, MaskingAlgo, SeedStats};
pub use error::{IndexError, Result};
pub use hash_table::HashTable;
pub use index::{Index, IndexStats, SeedMatch};
pub use minimizer::{MinimizerInfo, MinimizerWindow};
pub use reference::ReferenceSet;
pub use seed::{PackedSeed, SeedEntry, SeedPartitioning};
pub use shape::Shape;

/// Version information
pub fn version() -> (u8, u8, u8) {
    constants::VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        let (major, minor, patch) = version();
        assert_eq!(major, 0);
        assert_eq!(minor, 1);
        assert_eq!(patch, 0);
    }
}
