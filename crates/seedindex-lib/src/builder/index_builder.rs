//! Seed index builder orchestration
//!
//! Coordinates the build pipeline:
//! 1. Count seeds per sequence chunk and partition (histogram)
//! 2. Populate the seed array
//! 3. Sort each partition and count its distinct keys
//! 4. Optionally derive the repetitive seed cutoff
//! 5. Build each partition's hash table
//!
//! Steps 1 and 2 run on a rayon pool. Steps 3 to 5 hand whole partitions to
//! worker threads through an atomic work counter; a worker only ever touches
//! the partition it claimed.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;

use anyhow::Context;
use tracing::{debug, info};

use crate::builder::config::IndexConfig;
use crate::builder::groups::{count_distinct, merge_keys, sort_partition, GroupStatistics};
use crate::builder::histogram::SeedHistogram;
use crate::builder::parse::read_reference;
use crate::builder::seed_array::SeedArray;
use crate::builder::work_queue::{run_partitioned, run_workers};
use crate::constants::CHUNKS_PER_THREAD;
use crate::error::{IndexError, Result};
use crate::hash_table::HashTable;
use crate::index::{Index, IndexStats};
use crate::reference::ReferenceSet;
use crate::seed::{PackedSeed, SeedEntry, SeedPartitionRange};

/// Builder for constructing seed indexes
pub struct IndexBuilder {
    config: IndexConfig,
}

impl IndexBuilder {
    /// Create a new index builder with the given configuration
    pub fn new(config: IndexConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The build configuration
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Build an index over a reference set
    ///
    /// # Parallelism
    /// The number of threads is controlled by `config.num_threads`:
    /// - `0` - use all available CPU cores
    /// - `N` - use exactly N threads (at most one per partition in the
    ///   partition passes)
    pub fn build(&self, reference: ReferenceSet) -> Result<Index> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.num_threads)
            .build()
            .map_err(|e| IndexError::ThreadPool { message: e.to_string() })?;

        pool.install(|| self.build_inner(reference))
    }

    /// Build an index from in-memory nucleotide sequences
    pub fn build_from_sequences<I, S>(&self, sequences: I) -> Result<Index>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let soft_mask = self.config.seed_encoding.masking.soft_mask();
        self.build(ReferenceSet::from_sequences(sequences, soft_mask))
    }

    /// Build an index from a FASTA/FASTQ file (optionally gzipped)
    pub fn build_from_fasta<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<Index> {
        let path = path.as_ref();
        info!("Reading reference sequences from {}", path.display());
        let reference = read_reference(path, self.config.seed_encoding.masking)?;
        self.build(reference)
            .with_context(|| format!("Failed to build seed index for {}", path.display()))
    }

    /// Build an index from entries already split by partition
    ///
    /// `partitions[p]` holds the (partition-local key, position) entries of
    /// partition `p`; there must be one vector per partition of the
    /// configured partitioning. No reference sequences are attached.
    pub fn build_from_partitions(&self, partitions: Vec<Vec<SeedEntry>>) -> Result<Index> {
        let expected = self.config.partitioning().count();
        if partitions.len() != expected {
            return Err(IndexError::config(format!(
                "expected {} partitions for seedp_bits={}, got {}",
                expected,
                self.config.seedp_bits,
                partitions.len()
            )));
        }
        let seed_array = SeedArray::from_partitions(partitions);
        self.index_seed_array(ReferenceSet::new(), seed_array)
    }

    /// Build an index from packed seeds and their positions
    ///
    /// # Errors
    /// Fails with [`IndexError::SeedOutOfRange`] on a seed wider than the
    /// configured shape's key.
    pub fn build_from_seeds<I>(&self, seeds: I) -> Result<Index>
    where
        I: IntoIterator<Item = (PackedSeed, u64)>,
    {
        let partitioning = self.config.partitioning();
        let key_bits = self.config.seed_encoding.shape.key_bits();
        let mut partitions: Vec<Vec<SeedEntry>> = vec![Vec::new(); partitioning.count()];
        for (seed, pos) in seeds {
            if seed.checked_shr(key_bits).unwrap_or(0) != 0 {
                return Err(IndexError::SeedOutOfRange { seed, key_bits });
            }
            partitions[partitioning.partition(seed)].push(SeedEntry::new(partitioning.offset(seed), pos));
        }
        self.build_from_partitions(partitions)
    }

    /// Inner build logic, runs inside the rayon thread pool
    fn build_inner(&self, reference: ReferenceSet) -> Result<Index> {
        self.config.print();
        info!("Building seed index");
        info!("  {} sequences, {} letters", reference.num_sequences(), reference.total_letters());

        let partitioning = self.config.partitioning();
        let enum_cfg = &self.config.seed_encoding;

        info!("Step 1: Counting seeds...");
        let start = Instant::now();
        let num_chunks = rayon::current_num_threads() * CHUNKS_PER_THREAD;
        let histogram = SeedHistogram::build(&reference, enum_cfg, partitioning, num_chunks);
        info!(
            "  {} seeds in {} chunks ({:.2?})",
            histogram.total(),
            histogram.num_chunks(),
            start.elapsed()
        );
        debug!(
            "  {} good seed positions, {} rejected for low complexity",
            histogram.stats().good_seed_positions,
            histogram.stats().low_complexity_seeds
        );

        info!("Step 2: Populating seed array...");
        let start = Instant::now();
        let seed_array = SeedArray::build(
            &reference,
            &histogram,
            partitioning.full_range(),
            partitioning,
            enum_cfg,
        )?;
        let seed_stats = seed_array.stats();
        info!("  {} seed entries ({:.2?})", seed_array.len(), start.elapsed());
        info!("  Good seed positions: {}", seed_stats.good_seed_positions);
        info!("  Low complexity seeds: {}", seed_stats.low_complexity_seeds);

        self.index_seed_array(reference, seed_array)
    }

    /// Sort, group and hash every partition of a populated seed array
    fn index_seed_array(&self, reference: ReferenceSet, mut seed_array: SeedArray) -> Result<Index> {
        let partitioning = self.config.partitioning();
        let num_partitions = partitioning.count();
        let range = seed_array.range();
        let num_workers = self.config.worker_count(range.len());
        debug!("Partition passes: {} partitions, {} workers", range.len(), num_workers);

        info!("Step 3: Sorting partitions...");
        let start = Instant::now();
        let distinct = sort_and_count(&mut seed_array, range, num_workers)?;
        let total_distinct: usize = distinct.iter().sum();
        info!("  {} distinct seeds ({:.2?})", total_distinct, start.elapsed());

        let cutoff = if self.config.repetitive_cutoff > 0.0 {
            info!("Step 4: Computing repetitive seed cutoff...");
            let start = Instant::now();
            let cutoff = repetitive_cutoff(
                &seed_array,
                range,
                num_workers,
                total_distinct,
                self.config.repetitive_cutoff,
            )?;
            match cutoff {
                Some(c) => info!("  Seeds occurring {} times or more are left out ({:.2?})", c, start.elapsed()),
                None => info!("  No seed is frequent enough to be left out"),
            }
            cutoff
        } else {
            None
        };

        info!("Step 5: Building hash tables...");
        let start = Instant::now();
        let load_factor = self.config.load_factor;
        let built = run_partitioned(num_workers, num_partitions, range, "index", |p| {
            build_table(&seed_array, p, distinct[p], load_factor, cutoff)
        })?;

        let mut tables = Vec::with_capacity(num_partitions);
        let mut group_stats = GroupStatistics::new();
        for slot in built {
            match slot {
                Some((table, stats)) => {
                    group_stats.merge(&stats);
                    tables.push(table);
                }
                None => tables.push(HashTable::with_capacity(0)),
            }
        }
        let table_slots: usize = tables.iter().map(HashTable::capacity).sum();
        info!("  {} hash table slots ({:.2?})", table_slots, start.elapsed());
        group_stats.print_summary();

        let stats = IndexStats {
            num_sequences: reference.num_sequences(),
            total_letters: reference.total_letters(),
            seeds: *seed_array.stats(),
            groups: group_stats,
            repetitive_cutoff: cutoff,
            num_partitions,
            table_slots,
        };

        info!("Seed Index Build Complete");
        Ok(Index::new(
            reference,
            seed_array,
            tables,
            partitioning,
            self.config.seed_encoding.clone(),
            stats,
        ))
    }
}

/// Count pass: sort every partition in place and count its distinct keys
fn sort_and_count(
    seed_array: &mut SeedArray,
    range: SeedPartitionRange,
    num_workers: usize,
) -> Result<Vec<usize>> {
    let num_partitions = seed_array.num_partitions();
    // Each slot is locked exactly once, by the worker that claimed `p` from
    // the work counter, so the mutexes are never contended.
    let slots: Vec<Mutex<Option<&mut [SeedEntry]>>> = seed_array
        .partitions_mut()
        .into_iter()
        .map(|part| Mutex::new(Some(part)))
        .collect();

    let counted = run_partitioned(num_workers, num_partitions, range, "count", |p| {
        let part = slots[p]
            .lock()
            .map_err(|_| IndexError::WorkerPanicked { phase: "count" })?
            .take()
            .ok_or(IndexError::PartitionNotBuilt { partition: p, phase: "count" })?;
        if part.len() > u32::MAX as usize {
            return Err(IndexError::PartitionTooLarge { partition: p, size: part.len() });
        }
        sort_partition(part);
        Ok(count_distinct(part))
    })?;

    Ok(counted.into_iter().map(Option::unwrap_or_default).collect())
}

/// Repetitive cutoff pass
///
/// With `n = floor(total_distinct * fraction)`, returns the smallest of the
/// `n` largest group sizes, or `None` when `n` is zero.
fn repetitive_cutoff(
    seed_array: &SeedArray,
    range: SeedPartitionRange,
    num_workers: usize,
    total_distinct: usize,
    fraction: f64,
) -> Result<Option<usize>> {
    let n = (total_distinct as f64 * fraction) as usize;
    if n == 0 {
        return Ok(None);
    }

    let per_partition = run_workers(num_workers, range, "repetitive", |p| {
        Ok(top_group_sizes(seed_array.begin(p), n))
    })?;

    let mut heap: BinaryHeap<Reverse<usize>> = BinaryHeap::with_capacity(n + 1);
    for (_, sizes) in per_partition {
        for size in sizes {
            push_bounded(&mut heap, size, n);
        }
    }
    Ok(heap.peek().map(|Reverse(c)| *c))
}

/// The `n` largest group sizes of a sorted partition, in no particular order
fn top_group_sizes(entries: &[SeedEntry], n: usize) -> Vec<usize> {
    let mut heap: BinaryHeap<Reverse<usize>> = BinaryHeap::with_capacity(n.min(entries.len()) + 1);
    for group in merge_keys(entries) {
        push_bounded(&mut heap, group.len, n);
    }
    heap.into_iter().map(|Reverse(c)| c).collect()
}

/// Keep the `n` largest values in a min-heap
#[inline]
fn push_bounded(heap: &mut BinaryHeap<Reverse<usize>>, value: usize, n: usize) {
    if heap.len() < n {
        heap.push(Reverse(value));
    } else if heap.peek().is_some_and(|Reverse(min)| value > *min) {
        heap.pop();
        heap.push(Reverse(value));
    }
}

/// Index pass for one partition
fn build_table(
    seed_array: &SeedArray,
    partition: usize,
    distinct: usize,
    load_factor: f64,
    cutoff: Option<usize>,
) -> Result<(HashTable, GroupStatistics)> {
    let entries = seed_array.begin(partition);
    let mut table = HashTable::for_keys(distinct, load_factor);
    let mut stats = GroupStatistics::new();

    for group in merge_keys(entries) {
        let repetitive = cutoff.is_some_and(|c| group.len >= c);
        stats.add_group(&group, repetitive);
        if repetitive {
            continue;
        }
        table
            .insert(group.key, group.begin as u32)
            .map_err(|overflow| IndexError::HashTableOverflow {
                partition,
                capacity: overflow.capacity,
            })?;
    }
    Ok((table, stats))
}
