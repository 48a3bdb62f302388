//! Seed entries and seed-space partitioning
//!
//! The seed space is split into `2^seedp_bits` partitions by the low bits of
//! the packed seed. The remaining high bits form the partition-local key that
//! is stored in the seed array and in the partition's hash table. The same
//! [`SeedPartitioning`] must be used to populate the seed array and to answer
//! lookups.

use std::ops::Range;

use crate::constants::num_partitions;
pub use crate::shape::PackedSeed;

/// Partition-local seed key
pub type SeedOffset = u32;

/// One seed occurrence: partition-local key and reference position
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SeedEntry {
    /// Partition-local key
    pub key: SeedOffset,
    /// Offset of the seed window in the reference buffer
    pub pos: u64,
}

impl SeedEntry {
    /// Create a new entry
    #[inline]
    pub fn new(key: SeedOffset, pos: u64) -> Self {
        Self { key, pos }
    }
}

/// Maps packed seeds to (partition, partition-local key)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeedPartitioning {
    bits: u32,
}

impl SeedPartitioning {
    /// Partitioning with `2^bits` partitions
    pub const fn new(bits: u32) -> Self {
        Self { bits }
    }

    /// Number of partition bits
    #[inline]
    pub const fn bits(&self) -> u32 {
        self.bits
    }

    /// Number of partitions
    #[inline]
    pub const fn count(&self) -> usize {
        num_partitions(self.bits)
    }

    /// Partition of a seed
    #[inline]
    pub const fn partition(&self, seed: PackedSeed) -> usize {
        (seed & (self.count() as u64 - 1)) as usize
    }

    /// Partition-local key of a seed
    ///
    /// Bits above the local key width are discarded, so out-of-domain seeds
    /// route to some partition instead of panicking.
    #[inline]
    pub const fn offset(&self, seed: PackedSeed) -> SeedOffset {
        (seed >> self.bits) as SeedOffset
    }

    /// Inverse of (`partition`, `offset`)
    #[inline]
    pub const fn compose(&self, partition: usize, offset: SeedOffset) -> PackedSeed {
        ((offset as u64) << self.bits) | partition as u64
    }

    /// Range covering every partition
    pub fn full_range(&self) -> SeedPartitionRange {
        SeedPartitionRange::new(0, self.count())
    }
}

/// A contiguous range of partitions `[begin, end)`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeedPartitionRange {
    begin: usize,
    end: usize,
}

impl SeedPartitionRange {
    /// Create a new range
    pub fn new(begin: usize, end: usize) -> Self {
        debug_assert!(begin <= end);
        Self { begin, end }
    }

    /// First partition in the range
    pub fn begin(&self) -> usize {
        self.begin
    }

    /// One past the last partition
    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of partitions in the range
    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    /// Whether the range is empty
    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    /// Whether a partition lies in the range
    #[inline]
    pub fn contains(&self, partition: usize) -> bool {
        partition >= self.begin && partition < self.end
    }

    /// Iterate partitions in the range
    pub fn iter(&self) -> Range<usize> {
        self.begin..self.end
    }
}
