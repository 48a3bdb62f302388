//! Seed index - the queryable result of a build
//!
//! Holds the reference sequences, the sorted seed array and one hash table
//! per partition. Everything is immutable after the build, so an [`Index`]
//! can be shared between threads and queried through `&self`.

use tracing::info;

use crate::builder::config::{EnumConfig, IndexConfig};
use crate::builder::enumerate::{SeedEncoder, SeedStats};
use crate::builder::groups::{group_len, GroupStatistics};
use crate::builder::index_builder::IndexBuilder;
use crate::builder::seed_array::SeedArray;
use crate::encoding::encode_sequence;
use crate::error::Result;
use crate::hash_table::HashTable;
use crate::reference::ReferenceSet;
use crate::seed::{PackedSeed, SeedEntry, SeedPartitioning};

/// Build statistics
#[derive(Debug, Clone, Default)]
pub struct IndexStats {
    /// Reference sequences
    pub num_sequences: usize,
    /// Reference letters (delimiters excluded)
    pub total_letters: u64,
    /// Seed encoder counters
    pub seeds: SeedStats,
    /// Group size statistics
    pub groups: GroupStatistics,
    /// Group size from which seeds were left out of the hash tables
    pub repetitive_cutoff: Option<usize>,
    /// Number of partitions
    pub num_partitions: usize,
    /// Hash table slots over all partitions
    pub table_slots: usize,
}

/// A seed hit of a query against the reference
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct SeedMatch {
    /// Position of the seed window in the query
    pub query_pos: u64,
    /// Position of the seed window in the reference buffer
    pub target_pos: u64,
}

/// Partitioned seed index
pub struct Index {
    reference: ReferenceSet,
    seed_array: SeedArray,
    tables: Vec<HashTable>,
    partitioning: SeedPartitioning,
    enum_cfg: EnumConfig,
    stats: IndexStats,
}

impl Index {
    /// Assemble an index from built components
    pub fn new(
        reference: ReferenceSet,
        seed_array: SeedArray,
        tables: Vec<HashTable>,
        partitioning: SeedPartitioning,
        enum_cfg: EnumConfig,
        stats: IndexStats,
    ) -> Self {
        debug_assert_eq!(tables.len(), partitioning.count());
        debug_assert_eq!(seed_array.num_partitions(), partitioning.count());
        Self {
            reference,
            seed_array,
            tables,
            partitioning,
            enum_cfg,
            stats,
        }
    }

    /// Index pre-partitioned entries without reference sequences
    ///
    /// `partitions[p]` holds the (partition-local key, position) entries of
    /// partition `p` under `config`'s partitioning.
    pub fn from_partitions(partitions: Vec<Vec<SeedEntry>>, config: IndexConfig) -> Result<Self> {
        IndexBuilder::new(config)?.build_from_partitions(partitions)
    }

    /// Index packed seeds and their positions without reference sequences
    pub fn from_entries<I>(seeds: I, config: IndexConfig) -> Result<Self>
    where
        I: IntoIterator<Item = (PackedSeed, u64)>,
    {
        IndexBuilder::new(config)?.build_from_seeds(seeds)
    }

    /// All entries sharing `seed`, or `None` if the seed is not indexed
    ///
    /// The returned entries are contiguous in the partition and form the
    /// complete group of the seed.
    #[inline]
    pub fn contains(&self, seed: PackedSeed) -> Option<&[SeedEntry]> {
        let partition = self.partitioning.partition(seed);
        let entries = self.seed_array.begin(partition);
        if entries.is_empty() {
            return None;
        }
        let key = self.partitioning.offset(seed);
        let first = self.tables[partition].find(key)? as usize;
        let group = &entries[first..];
        Some(&group[..group_len(group, key)])
    }

    /// Reference positions of `seed`
    pub fn positions(&self, seed: PackedSeed) -> impl Iterator<Item = u64> + '_ {
        self.contains(seed)
            .unwrap_or_default()
            .iter()
            .map(|e| e.pos)
    }

    /// Map a reference position to `(sequence id, offset in sequence)`
    pub fn locate(&self, pos: u64) -> Option<(usize, u64)> {
        self.reference.locate(pos)
    }

    /// Seed hits of a nucleotide query
    ///
    /// The query is encoded with the index's masking and shape; every valid
    /// query seed is looked up (no minimizer selection on the query side).
    /// Hits are ordered by query position.
    pub fn seed_matches(&self, query: &[u8]) -> Vec<SeedMatch> {
        let letters = encode_sequence(query, self.enum_cfg.masking.soft_mask());
        let query_cfg = EnumConfig {
            minimizer_window: 1,
            ..self.enum_cfg.clone()
        };
        let encoder = SeedEncoder::new(&query_cfg);
        let mut stats = SeedStats::default();
        let mut matches = Vec::new();
        encoder.enumerate(&letters, 0, &mut stats, |seed, query_pos| {
            if let Some(entries) = self.contains(seed) {
                matches.extend(entries.iter().map(|e| SeedMatch { query_pos, target_pos: e.pos }));
            }
        });
        matches
    }

    /// The reference sequences
    pub fn reference(&self) -> &ReferenceSet {
        &self.reference
    }

    /// The seed array
    pub fn seed_array(&self) -> &SeedArray {
        &self.seed_array
    }

    /// Hash table of a partition
    pub fn table(&self, partition: usize) -> &HashTable {
        &self.tables[partition]
    }

    /// The seed partitioning used by the build
    pub fn partitioning(&self) -> SeedPartitioning {
        self.partitioning
    }

    /// Seed encoding parameters used by the build
    pub fn seed_encoding(&self) -> &EnumConfig {
        &self.enum_cfg
    }

    /// Number of seed entries
    pub fn num_entries(&self) -> usize {
        self.seed_array.len()
    }

    /// Build statistics
    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }

    /// Bytes held by the index
    pub fn num_bytes(&self) -> usize {
        self.reference.num_bytes()
            + self.seed_array.num_bytes()
            + self.tables.iter().map(HashTable::num_bytes).sum::<usize>()
    }

    /// Log a summary of the index via tracing
    pub fn print_summary(&self) {
        info!("Seed Index:");
        info!("  Sequences: {}", self.stats.num_sequences);
        info!("  Letters: {}", self.stats.total_letters);
        info!("  Shape: {}", self.enum_cfg.shape);
        info!("  Partitions: {}", self.stats.num_partitions);
        info!("  Seed entries: {}", self.num_entries());
        info!("  Distinct seeds: {}", self.stats.groups.num_groups);
        info!("  Hash table slots: {}", self.stats.table_slots);
        if let Some(c) = self.stats.repetitive_cutoff {
            info!("  Repetitive cutoff: {}", c);
        }
        info!("  Memory: {:.2} MB", self.num_bytes() as f64 / (1024.0 * 1024.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Shape;

    fn config(shape: &str, seedp_bits: u32) -> IndexConfig {
        IndexConfig {
            seedp_bits,
            num_threads: 2,
            seed_encoding: EnumConfig::new(Shape::parse(shape).unwrap()),
            ..IndexConfig::default()
        }
    }

    #[test]
    fn test_contains_returns_whole_group() {
        let p = SeedPartitioning::new(1);
        let seeds = [(p.compose(0, 4), 10), (p.compose(1, 4), 11), (p.compose(0, 4), 12), (p.compose(0, 0), 13)];
        let index = Index::from_entries(seeds, config("1111", 1)).unwrap();

        let mut hits: Vec<u64> = index.positions(p.compose(0, 4)).collect();
        hits.sort_unstable();
        assert_eq!(hits, vec![10, 12]);
        assert_eq!(index.positions(p.compose(1, 4)).collect::<Vec<_>>(), vec![11]);
        // group at offset 0 of partition 0
        assert_eq!(index.positions(p.compose(0, 0)).collect::<Vec<_>>(), vec![13]);
        assert!(index.contains(p.compose(1, 0)).is_none());
    }

    #[test]
    fn test_empty_partition_lookup() {
        let index = Index::from_partitions(vec![vec![SeedEntry::new(3, 0)], vec![]], config("1111", 1)).unwrap();
        for key in 0..16u32 {
            assert!(index.contains(SeedPartitioning::new(1).compose(1, key)).is_none());
        }
        assert_eq!(index.positions(SeedPartitioning::new(1).compose(1, 3)).count(), 0);
    }

    #[test]
    fn test_seed_matches() {
        let builder = IndexBuilder::new(config("1111", 2)).unwrap();
        let index = builder.build_from_sequences(["TTTTACGTTTTT", "GGGGACGT"]).unwrap();

        let matches = index.seed_matches(b"ACGT");
        assert_eq!(matches.len(), 2);
        let mut located: Vec<(usize, u64)> = matches
            .iter()
            .map(|m| index.locate(m.target_pos).unwrap())
            .collect();
        located.sort_unstable();
        assert_eq!(located, vec![(0, 4), (1, 4)]);
        assert!(matches.iter().all(|m| m.query_pos == 0));

        assert!(index.seed_matches(b"CCCC").is_empty());
        assert!(index.seed_matches(b"ACG").is_empty());
    }

    #[test]
    fn test_index_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Index>();
    }
}
