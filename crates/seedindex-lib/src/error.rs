//! Error types for index construction
//!
//! Every failure during a build is fatal for that build: the builder returns
//! the first error it sees and no partially built index escapes.

use thiserror::Error;

use crate::encoding::EncodingError;

/// Errors raised while configuring or building a seed index
#[derive(Error, Debug)]
pub enum IndexError {
    /// A configuration parameter is out of range
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// What was wrong
        message: String,
    },

    /// Linear probing wrapped around the whole table without a free slot
    #[error("Hash table overflow in partition {partition} (capacity {capacity})")]
    HashTableOverflow {
        /// Partition whose table overflowed
        partition: usize,
        /// Number of slots in the table
        capacity: usize,
    },

    /// The seed encoder produced a different seed count than the histogram predicted
    #[error("Seed histogram mismatch in partition {partition}: expected {expected} seeds, enumerated {actual}")]
    HistogramMismatch {
        /// Partition with the wrong count
        partition: usize,
        /// Count predicted by the histogram
        expected: usize,
        /// Count produced while populating the seed array
        actual: usize,
    },

    /// A partition holds too many entries for 32-bit group offsets
    #[error("Partition {partition} holds {size} seed entries, more than a hash table offset can address")]
    PartitionTooLarge {
        /// Partition index
        partition: usize,
        /// Number of entries in the partition
        size: usize,
    },

    /// A packed seed has bits set above the configured shape's key width
    #[error("Seed {seed:#x} does not fit in the {key_bits} key bits of the configured shape")]
    SeedOutOfRange {
        /// The offending seed
        seed: u64,
        /// Key bits of the configured shape
        key_bits: u32,
    },

    /// A partition was not produced by any worker
    #[error("Partition {partition} was not built during the {phase} pass")]
    PartitionNotBuilt {
        /// Partition index
        partition: usize,
        /// Build pass name
        phase: &'static str,
    },

    /// The rayon thread pool could not be created
    #[error("Failed to create thread pool: {message}")]
    ThreadPool {
        /// Underlying error message
        message: String,
    },

    /// A worker thread panicked
    #[error("Worker thread panicked during the {phase} pass")]
    WorkerPanicked {
        /// Build pass name
        phase: &'static str,
    },

    /// Invalid seed shape or nucleotide input
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

/// Result alias for index operations
pub type Result<T> = std::result::Result<T, IndexError>;

impl IndexError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_partition() {
        let err = IndexError::HashTableOverflow { partition: 17, capacity: 4 };
        assert_eq!(err.to_string(), "Hash table overflow in partition 17 (capacity 4)");

        let err = IndexError::HistogramMismatch { partition: 3, expected: 10, actual: 11 };
        assert!(err.to_string().contains("partition 3"));

        let err = IndexError::SeedOutOfRange { seed: 0x100, key_bits: 6 };
        assert_eq!(err.to_string(), "Seed 0x100 does not fit in the 6 key bits of the configured shape");
    }

    #[test]
    fn test_encoding_error_is_transparent() {
        let err: IndexError = EncodingError::InvalidBase(b'!').into();
        assert_eq!(err.to_string(), EncodingError::InvalidBase(b'!').to_string());
    }
}
