//! Partition work distribution
//!
//! Workers claim partitions one at a time from a shared atomic counter until
//! the range is exhausted. The counter is the only state the workers share.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{IndexError, Result};
use crate::seed::SeedPartitionRange;

/// Hands out each partition of a range exactly once
#[derive(Debug)]
pub struct WorkQueue {
    next: AtomicUsize,
    end: usize,
}

impl WorkQueue {
    /// Queue over `range`
    pub fn new(range: SeedPartitionRange) -> Self {
        Self {
            next: AtomicUsize::new(range.begin()),
            end: range.end(),
        }
    }

    /// Claim the next partition, `None` once all are taken
    #[inline]
    pub fn claim(&self) -> Option<usize> {
        let p = self.next.fetch_add(1, Ordering::Relaxed);
        (p < self.end).then_some(p)
    }
}

/// Run `num_workers` scoped threads, each calling `work(partition)` for every
/// partition it claims from `range`
///
/// Blocks until all workers have finished. Returns the `(partition, result)`
/// pairs of all workers in unspecified order, or the first error. A panicking
/// worker fails the pass.
pub fn run_workers<T, F>(
    num_workers: usize,
    range: SeedPartitionRange,
    phase: &'static str,
    work: F,
) -> Result<Vec<(usize, T)>>
where
    T: Send,
    F: Fn(usize) -> Result<T> + Sync,
{
    let queue = WorkQueue::new(range);
    let num_workers = num_workers.clamp(1, range.len().max(1));

    std::thread::scope(|scope| {
        let mut handles = Vec::with_capacity(num_workers);
        for _ in 0..num_workers {
            let queue = &queue;
            let work = &work;
            handles.push(scope.spawn(move || -> Result<Vec<(usize, T)>> {
                let mut done = Vec::new();
                while let Some(p) = queue.claim() {
                    done.push((p, work(p)?));
                }
                Ok(done)
            }));
        }

        let mut results = Vec::with_capacity(range.len());
        let mut first_error = None;
        for handle in handles {
            match handle.join() {
                Ok(Ok(done)) => results.extend(done),
                Ok(Err(e)) => {
                    first_error.get_or_insert(e);
                }
                Err(_) => {
                    first_error.get_or_insert(IndexError::WorkerPanicked { phase });
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(results),
        }
    })
}

/// Like [`run_workers`], but returns results indexed by partition
///
/// Every partition in `range` must have been produced; partitions outside it
/// are `None`.
pub fn run_partitioned<T, F>(
    num_workers: usize,
    num_partitions: usize,
    range: SeedPartitionRange,
    phase: &'static str,
    work: F,
) -> Result<Vec<Option<T>>>
where
    T: Send,
    F: Fn(usize) -> Result<T> + Sync,
{
    let mut out: Vec<Option<T>> = (0..num_partitions).map(|_| None).collect();
    for (p, value) in run_workers(num_workers, range, phase, work)? {
        out[p] = Some(value);
    }
    if let Some(p) = range.iter().find(|&p| out[p].is_none()) {
        return Err(IndexError::PartitionNotBuilt { partition: p, phase });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_claim_each_once() {
        let queue = WorkQueue::new(SeedPartitionRange::new(3, 6));
        assert_eq!(queue.claim(), Some(3));
        assert_eq!(queue.claim(), Some(4));
        assert_eq!(queue.claim(), Some(5));
        assert_eq!(queue.claim(), None);
        assert_eq!(queue.claim(), None);
    }

    #[test]
    fn test_every_partition_processed_once() {
        for workers in [1, 2, 8, 64] {
            let seen = Mutex::new(Vec::new());
            let results = run_workers(workers, SeedPartitionRange::new(0, 32), "test", |p| {
                seen.lock().unwrap().push(p);
                Ok(p * 10)
            })
            .unwrap();

            let mut seen = seen.into_inner().unwrap();
            seen.sort_unstable();
            assert_eq!(seen, (0..32).collect::<Vec<_>>());

            let mut results = results;
            results.sort_unstable();
            assert!(results.iter().all(|&(p, v)| v == p * 10));
            assert_eq!(results.len(), 32);
        }
    }

    #[test]
    fn test_error_fails_the_pass() {
        let result = run_workers(4, SeedPartitionRange::new(0, 16), "test", |p| {
            if p == 7 {
                Err(IndexError::HashTableOverflow { partition: p, capacity: 0 })
            } else {
                Ok(())
            }
        });
        assert!(matches!(
            result,
            Err(IndexError::HashTableOverflow { partition: 7, .. })
        ));
    }

    #[test]
    fn test_panic_fails_the_pass() {
        let result = run_workers(2, SeedPartitionRange::new(0, 4), "count", |p| {
            if p == 2 {
                panic!("worker failure");
            }
            Ok(())
        });
        assert!(matches!(result, Err(IndexError::WorkerPanicked { phase: "count" })));
    }

    #[test]
    fn test_run_partitioned() {
        let out = run_partitioned(3, 8, SeedPartitionRange::new(2, 5), "test", |p| Ok(p + 1)).unwrap();
        assert_eq!(out, vec![None, None, Some(3), Some(4), Some(5), None, None, None]);
    }
}
