//! Minimizer selection over consecutive seed positions
//!
//! With a minimizer window of `w`, only seeds that are the minimum (by hash)
//! of some window of `w` consecutive seed positions are indexed. Ties go to
//! the leftmost position. Positions without a valid seed (masked letters,
//! low complexity) take part in the windowing but can never be selected.
//!
//! The selector keeps a monotone queue of candidates, so each position is
//! pushed and popped at most once.

use std::collections::VecDeque;

use crate::hasher::{DeterministicHasher, HashFunction};
use crate::shape::PackedSeed;

/// A selected minimizer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MinimizerInfo {
    /// The packed seed
    pub seed: PackedSeed,
    /// Position of the seed window in the sequence buffer
    pub position: u64,
}

impl MinimizerInfo {
    /// Create a new minimizer info
    pub fn new(seed: PackedSeed, position: u64) -> Self {
        Self { seed, position }
    }
}

#[derive(Clone, Copy, Debug)]
struct Candidate {
    index: usize,
    hash: u64,
    info: MinimizerInfo,
}

/// Sliding-window minimizer selector
///
/// # Example
/// ```
/// use seedindex_lib::hasher::IdentityHash;
/// use seedindex_lib::minimizer::MinimizerWindow;
///
/// let mut window = MinimizerWindow::with_hasher(2, IdentityHash);
/// let mut selected = Vec::new();
/// for (i, seed) in [5u64, 3, 4, 9].into_iter().enumerate() {
///     selected.extend(window.next(Some(seed), i as u64));
/// }
/// selected.extend(window.finish());
/// let seeds: Vec<u64> = selected.iter().map(|m| m.seed).collect();
/// assert_eq!(seeds, vec![3, 4]);
/// ```
pub struct MinimizerWindow<H: HashFunction = DeterministicHasher> {
    window: usize,
    hasher: H,
    queue: VecDeque<Candidate>,
    index: usize,
    last_selected: Option<usize>,
}

impl MinimizerWindow<DeterministicHasher> {
    /// Create a selector hashing seeds with a seeded AHasher
    pub fn with_seed(window: usize, seed: u64) -> Self {
        Self::with_hasher(window, DeterministicHasher::new(seed))
    }
}

impl<H: HashFunction> MinimizerWindow<H> {
    /// Create a selector with an explicit hash function
    pub fn with_hasher(window: usize, hasher: H) -> Self {
        Self {
            window: window.max(1),
            hasher,
            queue: VecDeque::with_capacity(window.max(1)),
            index: 0,
            last_selected: None,
        }
    }

    /// Start a new sequence
    pub fn reset(&mut self) {
        self.queue.clear();
        self.index = 0;
        self.last_selected = None;
    }

    /// Feed the next seed position (`None` if it has no valid seed)
    ///
    /// Returns the minimizer of the window ending at this position, if that
    /// window is complete and its minimizer has not been returned before.
    pub fn next(&mut self, seed: Option<PackedSeed>, position: u64) -> Option<MinimizerInfo> {
        let index = self.index;
        self.index += 1;

        if let Some(seed) = seed {
            let hash = self.hasher.hash(seed);
            while self.queue.back().is_some_and(|c| c.hash > hash) {
                self.queue.pop_back();
            }
            self.queue.push_back(Candidate {
                index,
                hash,
                info: MinimizerInfo::new(seed, position),
            });
        }

        while self.queue.front().is_some_and(|c| c.index + self.window <= index) {
            self.queue.pop_front();
        }

        if index + 1 < self.window {
            return None;
        }
        self.select_front()
    }

    /// Finish the current sequence
    ///
    /// A sequence shorter than one full window still yields its minimum.
    pub fn finish(&mut self) -> Option<MinimizerInfo> {
        let selected = if self.index < self.window {
            self.select_front()
        } else {
            None
        };
        self.reset();
        selected
    }

    fn select_front(&mut self) -> Option<MinimizerInfo> {
        let front = *self.queue.front()?;
        if self.last_selected == Some(front.index) {
            return None;
        }
        self.last_selected = Some(front.index);
        Some(front.info)
    }
}
