//! Seed array
//!
//! One contiguous buffer of [`SeedEntry`] values, partition after partition.
//! The buffer is allocated once from the [`SeedHistogram`]; every chunk of
//! sequences then writes into its own region of every partition, so the
//! parallel population needs no locking.

use rayon::prelude::*;
use tracing::debug;

use crate::builder::config::EnumConfig;
use crate::builder::enumerate::{SeedEncoder, SeedStats};
use crate::builder::histogram::SeedHistogram;
use crate::error::{IndexError, Result};
use crate::reference::ReferenceSet;
use crate::seed::{SeedEntry, SeedPartitionRange, SeedPartitioning};

/// Seed entries grouped by partition
#[derive(Clone, Debug, Default)]
pub struct SeedArray {
    data: Vec<SeedEntry>,
    /// `offsets[p]..offsets[p + 1]` is partition `p`
    offsets: Vec<usize>,
    range: Option<SeedPartitionRange>,
    stats: SeedStats,
}

impl SeedArray {
    /// Enumerate the seeds of `reference` in the partitions of `range`
    ///
    /// Runs on the current rayon pool, one task per histogram chunk. Fails if
    /// a chunk emits a different number of seeds into a partition than the
    /// histogram recorded.
    pub fn build(
        reference: &ReferenceSet,
        histogram: &SeedHistogram,
        range: SeedPartitionRange,
        partitioning: SeedPartitioning,
        enum_cfg: &EnumConfig,
    ) -> Result<Self> {
        let num_partitions = partitioning.count();
        let num_chunks = histogram.num_chunks();

        let mut offsets = Vec::with_capacity(num_partitions + 1);
        offsets.push(0);
        for p in 0..num_partitions {
            let size = if range.contains(p) { histogram.partition_size(p) } else { 0 };
            offsets.push(offsets[p] + size);
        }
        let total = offsets[num_partitions];
        debug!("Seed array: {} entries ({} MB)", total, total * std::mem::size_of::<SeedEntry>() / (1 << 20));

        let mut data = vec![SeedEntry::default(); total];

        // regions[chunk][partition]
        let mut regions: Vec<Vec<&mut [SeedEntry]>> = (0..num_chunks)
            .map(|_| Vec::with_capacity(num_partitions))
            .collect();
        let mut rest: &mut [SeedEntry] = &mut data;
        for p in 0..num_partitions {
            for (c, chunk_regions) in regions.iter_mut().enumerate() {
                let n = if range.contains(p) { histogram.chunk_counts(c)[p] } else { 0 };
                let (head, tail) = std::mem::take(&mut rest).split_at_mut(n);
                chunk_regions.push(head);
                rest = tail;
            }
        }

        let encoder = SeedEncoder::new(enum_cfg);
        let chunk_stats: Vec<SeedStats> = regions
            .into_par_iter()
            .zip(histogram.chunks().par_iter())
            .map(|(mut parts, seqs)| {
                let mut cursors = vec![0usize; num_partitions];
                let mut stats = SeedStats::default();
                for id in seqs.clone() {
                    encoder.enumerate(reference.sequence(id), reference.start(id), &mut stats, |seed, pos| {
                        let p = partitioning.partition(seed);
                        if !range.contains(p) {
                            return;
                        }
                        if let Some(slot) = parts[p].get_mut(cursors[p]) {
                            *slot = SeedEntry::new(partitioning.offset(seed), pos);
                        }
                        cursors[p] += 1;
                    });
                }
                for p in range.iter() {
                    if cursors[p] != parts[p].len() {
                        return Err(IndexError::HistogramMismatch {
                            partition: p,
                            expected: parts[p].len(),
                            actual: cursors[p],
                        });
                    }
                }
                Ok(stats)
            })
            .collect::<Result<Vec<_>>>()?;

        let mut stats = SeedStats::default();
        for s in &chunk_stats {
            stats.merge(s);
        }

        Ok(Self {
            data,
            offsets,
            range: Some(range),
            stats,
        })
    }

    /// Seed array from entries already split by partition
    pub fn from_partitions(partitions: Vec<Vec<SeedEntry>>) -> Self {
        let mut offsets = Vec::with_capacity(partitions.len() + 1);
        offsets.push(0);
        let mut data = Vec::with_capacity(partitions.iter().map(Vec::len).sum());
        for part in partitions {
            data.extend(part);
            offsets.push(data.len());
        }
        let range = SeedPartitionRange::new(0, offsets.len() - 1);
        Self {
            data,
            offsets,
            range: Some(range),
            stats: SeedStats::default(),
        }
    }

    /// Entries of a partition, starting at its first entry
    #[inline]
    pub fn begin(&self, partition: usize) -> &[SeedEntry] {
        &self.data[self.offsets[partition]..self.offsets[partition + 1]]
    }

    /// Number of entries in a partition
    #[inline]
    pub fn size(&self, partition: usize) -> usize {
        self.offsets[partition + 1] - self.offsets[partition]
    }

    /// Number of partitions
    pub fn num_partitions(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    /// Total entries
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the array holds no entries
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Partitions that were populated
    pub fn range(&self) -> SeedPartitionRange {
        self.range.unwrap_or_else(|| SeedPartitionRange::new(0, 0))
    }

    /// Encoder counters collected while populating
    pub fn stats(&self) -> &SeedStats {
        &self.stats
    }

    /// Disjoint mutable slices, one per partition
    pub fn partitions_mut(&mut self) -> Vec<&mut [SeedEntry]> {
        let mut out = Vec::with_capacity(self.num_partitions());
        let mut rest: &mut [SeedEntry] = &mut self.data;
        for w in self.offsets.windows(2) {
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(w[1] - w[0]);
            out.push(head);
            rest = tail;
        }
        out
    }

    /// Bytes held by the entry buffer
    pub fn num_bytes(&self) -> usize {
        self.data.len() * std::mem::size_of::<SeedEntry>()
            + self.offsets.len() * std::mem::size_of::<usize>()
    }
}
