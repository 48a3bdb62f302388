//! Seed histogram
//!
//! The reference sequences are split into chunks of roughly equal letter
//! count. For every chunk and partition the histogram holds the number of
//! seeds the encoder emits, which lets the seed array be allocated once and
//! filled by all chunks in parallel, each into its own pre-sized region.

use std::ops::Range;

use rayon::prelude::*;

use crate::builder::config::EnumConfig;
use crate::builder::enumerate::{SeedEncoder, SeedStats};
use crate::reference::ReferenceSet;
use crate::seed::SeedPartitioning;

/// Per chunk, per partition seed counts
#[derive(Clone, Debug)]
pub struct SeedHistogram {
    /// Sequence id range of each chunk
    chunks: Vec<Range<usize>>,
    /// `counts[chunk][partition]`
    counts: Vec<Vec<usize>>,
    /// Encoder counters over all chunks
    stats: SeedStats,
}

impl SeedHistogram {
    /// Count the seeds of `reference` per chunk and partition
    ///
    /// Runs on the current rayon pool.
    pub fn build(
        reference: &ReferenceSet,
        enum_cfg: &EnumConfig,
        partitioning: SeedPartitioning,
        num_chunks: usize,
    ) -> Self {
        let chunks = split_sequences(reference, num_chunks);
        let encoder = SeedEncoder::new(enum_cfg);
        let num_partitions = partitioning.count();

        let per_chunk: Vec<(Vec<usize>, SeedStats)> = chunks
            .par_iter()
            .map(|range| {
                let mut counts = vec![0usize; num_partitions];
                let mut stats = SeedStats::default();
                for id in range.clone() {
                    encoder.enumerate(reference.sequence(id), reference.start(id), &mut stats, |seed, _| {
                        counts[partitioning.partition(seed)] += 1;
                    });
                }
                (counts, stats)
            })
            .collect();

        let mut stats = SeedStats::default();
        let mut counts = Vec::with_capacity(per_chunk.len());
        for (c, s) in per_chunk {
            stats.merge(&s);
            counts.push(c);
        }
        Self { chunks, counts, stats }
    }

    /// Histogram from explicit counts, one chunk per entry of `counts`
    pub fn from_counts(chunks: Vec<Range<usize>>, counts: Vec<Vec<usize>>) -> Self {
        debug_assert_eq!(chunks.len(), counts.len());
        Self {
            chunks,
            counts,
            stats: SeedStats::default(),
        }
    }

    /// Sequence id ranges of the chunks
    pub fn chunks(&self) -> &[Range<usize>] {
        &self.chunks
    }

    /// Number of chunks
    pub fn num_chunks(&self) -> usize {
        self.chunks.len()
    }

    /// Counts of one chunk, per partition
    pub fn chunk_counts(&self, chunk: usize) -> &[usize] {
        &self.counts[chunk]
    }

    /// Seeds in a partition over all chunks
    pub fn partition_size(&self, partition: usize) -> usize {
        self.counts.iter().map(|c| c[partition]).sum()
    }

    /// Seeds over all chunks and partitions
    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// Encoder counters collected while counting
    pub fn stats(&self) -> &SeedStats {
        &self.stats
    }
}

/// Split the sequences into at most `num_chunks` contiguous id ranges of
/// similar letter count
pub fn split_sequences(reference: &ReferenceSet, num_chunks: usize) -> Vec<Range<usize>> {
    let n = reference.num_sequences();
    if n == 0 {
        return Vec::new();
    }
    let num_chunks = num_chunks.clamp(1, n);
    let target = (reference.total_letters() as usize).div_ceil(num_chunks).max(1);

    let mut chunks = Vec::with_capacity(num_chunks);
    let mut begin = 0;
    let mut letters = 0;
    for id in 0..n {
        letters += reference.sequence_len(id);
        if letters >= target && chunks.len() + 1 < num_chunks {
            chunks.push(begin..id + 1);
            begin = id + 1;
            letters = 0;
        }
    }
    if begin < n {
        chunks.push(begin..n);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Shape;

    #[test]
    fn test_split_covers_all_sequences() {
        let reference = ReferenceSet::from_sequences(["ACGTACGT", "AC", "ACGTA", "G", "ACGTACGTACGT"], false);
        for k in 1..8 {
            let chunks = split_sequences(&reference, k);
            assert!(!chunks.is_empty() && chunks.len() <= k);
            assert_eq!(chunks[0].start, 0);
            assert_eq!(chunks.last().unwrap().end, 5);
            assert!(chunks.windows(2).all(|w| w[0].end == w[1].start));
            assert!(chunks.iter().all(|c| !c.is_empty()));
        }
        assert!(split_sequences(&ReferenceSet::new(), 4).is_empty());
    }

    #[test]
    fn test_histogram_counts() {
        let reference = ReferenceSet::from_sequences(["ACGTAC", "GGGG", "TTAC"], false);
        let cfg = EnumConfig::new(Shape::parse("11").unwrap());
        let partitioning = SeedPartitioning::new(1);
        let hist = SeedHistogram::build(&reference, &cfg, partitioning, 2);

        // 5 + 3 + 3 two-mers
        assert_eq!(hist.total(), 11);
        assert_eq!(hist.partition_size(0) + hist.partition_size(1), 11);
        assert_eq!(hist.stats().emitted_seeds, 11);

        // partition = low bit of the second letter: A/G -> 0, C/T -> 1
        // AC CG GT TA AC | GG GG GG | TT TA AC
        assert_eq!(hist.partition_size(1), 5);
        assert_eq!(hist.partition_size(0), 6);

        let per_chunk: usize = (0..hist.num_chunks()).map(|c| hist.chunk_counts(c).iter().sum::<usize>()).sum();
        assert_eq!(per_chunk, 11);
    }
}
