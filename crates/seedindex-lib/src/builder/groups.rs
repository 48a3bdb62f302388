//! Partition sort, key grouping and group statistics
//!
//! After [`sort_partition`] a partition's entries are ordered by key, and
//! [`KeyGroups`] walks the maximal runs of equal keys in ascending key order.

use crate::seed::{SeedEntry, SeedOffset};
use tracing::info;

/// A maximal run of entries sharing one key
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Group {
    /// The shared partition-local key
    pub key: SeedOffset,
    /// Offset of the first entry within the partition
    pub begin: usize,
    /// Number of entries
    pub len: usize,
}

impl Group {
    /// One past the last entry
    #[inline]
    pub fn end(&self) -> usize {
        self.begin + self.len
    }
}

/// Iterator over the key groups of a sorted partition
pub struct KeyGroups<'a> {
    entries: &'a [SeedEntry],
    pos: usize,
}

impl<'a> KeyGroups<'a> {
    /// Walk the groups of `entries`, which must be sorted by key
    pub fn new(entries: &'a [SeedEntry]) -> Self {
        debug_assert!(entries.windows(2).all(|w| w[0].key <= w[1].key));
        Self { entries, pos: 0 }
    }
}

impl Iterator for KeyGroups<'_> {
    type Item = Group;

    fn next(&mut self) -> Option<Group> {
        let first = self.entries.get(self.pos)?;
        let begin = self.pos;
        let len = group_len(&self.entries[begin..], first.key);
        self.pos += len;
        Some(Group { key: first.key, begin, len })
    }
}

/// Groups of a sorted partition
pub fn merge_keys(entries: &[SeedEntry]) -> KeyGroups<'_> {
    KeyGroups::new(entries)
}

/// Length of the run of `key` at the start of `entries`
#[inline]
pub fn group_len(entries: &[SeedEntry], key: SeedOffset) -> usize {
    entries.iter().take_while(|e| e.key == key).count()
}

/// Sort a partition's entries by key
///
/// Equal-key order is unspecified.
pub fn sort_partition(entries: &mut [SeedEntry]) {
    entries.sort_unstable_by_key(|e| e.key);
}

/// Number of distinct keys in a sorted partition
pub fn count_distinct(entries: &[SeedEntry]) -> usize {
    if entries.is_empty() {
        return 0;
    }
    1 + entries.windows(2).filter(|w| w[0].key != w[1].key).count()
}

/// Statistics about group sizes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupStatistics {
    /// Number of groups (distinct keys)
    pub num_groups: u64,
    /// Entries over all groups
    pub num_entries: u64,
    /// Groups with a single entry
    pub num_singleton_groups: u64,
    /// Largest group
    pub max_group_size: usize,
    /// Groups left out of the hash index as repetitive
    pub num_repetitive_groups: u64,
    /// Entries in repetitive groups
    pub num_repetitive_entries: u64,
}

impl GroupStatistics {
    /// Create an empty statistics tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one group
    pub fn add_group(&mut self, group: &Group, repetitive: bool) {
        self.num_groups += 1;
        self.num_entries += group.len as u64;
        if group.len == 1 {
            self.num_singleton_groups += 1;
        }
        self.max_group_size = self.max_group_size.max(group.len);
        if repetitive {
            self.num_repetitive_groups += 1;
            self.num_repetitive_entries += group.len as u64;
        }
    }

    /// Accumulate statistics collected by another worker
    pub fn merge(&mut self, other: &GroupStatistics) {
        self.num_groups += other.num_groups;
        self.num_entries += other.num_entries;
        self.num_singleton_groups += other.num_singleton_groups;
        self.max_group_size = self.max_group_size.max(other.max_group_size);
        self.num_repetitive_groups += other.num_repetitive_groups;
        self.num_repetitive_entries += other.num_repetitive_entries;
    }

    /// Mean entries per group
    pub fn mean_group_size(&self) -> f64 {
        if self.num_groups == 0 {
            0.0
        } else {
            self.num_entries as f64 / self.num_groups as f64
        }
    }

    /// Log statistics summary via tracing
    pub fn print_summary(&self) {
        let pct = |n: u64, d: u64| if d == 0 { 0.0 } else { n as f64 * 100.0 / d as f64 };
        info!("Group Statistics:");
        info!("  Distinct seeds: {}", self.num_groups);
        info!("  Seed entries: {}", self.num_entries);
        info!(
            "  Singleton groups: {} ({:.2}%)",
            self.num_singleton_groups,
            pct(self.num_singleton_groups, self.num_groups)
        );
        info!("  Mean group size: {:.2}", self.mean_group_size());
        info!("  Max group size: {}", self.max_group_size);
        if self.num_repetitive_groups > 0 {
            info!(
                "  Repetitive groups: {} covering {} entries ({:.2}%)",
                self.num_repetitive_groups,
                self.num_repetitive_entries,
                pct(self.num_repetitive_entries, self.num_entries)
            );
        }
    }
}
