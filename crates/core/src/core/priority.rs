//! Priority queue for BPE merge candidates.
//!
//! Counts change every training iteration, so instead of decreasing keys in
//! place the queue pushes a fresh entry and remembers the current count per
//! pair. Entries whose count no longer matches are stale and skipped on pop.

use crate::core::merges::Pair;
use ahash::AHashMap;
use dary_heap::OctonaryHeap;

/// A merge candidate during BPE training.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeCandidate {
    /// The pair of token IDs to merge
    pub pair: Pair,
    /// The aggregate frequency of this pair
    pub count: u64,
}

impl MergeCandidate {
    /// Create a new merge candidate.
    pub fn new(pair: Pair, count: u64) -> Self {
        Self { pair, count }
    }
}

// Higher count = higher priority. The pair only makes the order total;
// ties on count are resolved by the trainer.
impl Ord for MergeCandidate {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.count
            .cmp(&other.count)
            .then_with(|| self.pair.cmp(&other.pair))
    }
}

impl PartialOrd for MergeCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Priority queue for BPE merge operations.
///
/// Uses an 8-ary heap for better cache locality than a binary heap.
pub struct PairPriorityQueue {
    /// The heap storing merge candidates
    heap: OctonaryHeap<MergeCandidate>,
    /// Track current counts to detect stale entries
    current_counts: AHashMap<Pair, u64>,
}

impl PairPriorityQueue {
    /// Create a new priority queue with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: OctonaryHeap::with_capacity(capacity),
            current_counts: AHashMap::with_capacity(capacity),
        }
    }

    /// Create a new empty priority queue.
    pub fn new() -> Self {
        Self {
            heap: OctonaryHeap::new(),
            current_counts: AHashMap::new(),
        }
    }

    /// Push a merge candidate, superseding any earlier entry for its pair.
    pub fn push(&mut self, candidate: MergeCandidate) {
        self.current_counts.insert(candidate.pair, candidate.count);
        self.heap.push(candidate);
    }

    /// Drop a pair from the queue. Its heap entries become stale.
    pub fn remove(&mut self, pair: Pair) {
        self.current_counts.remove(&pair);
    }

    #[inline]
    fn is_current(&self, candidate: &MergeCandidate) -> bool {
        self.current_counts.get(&candidate.pair) == Some(&candidate.count)
    }

    /// Pop the highest priority merge candidate.
    ///
    /// Returns None if the queue is empty or only contains stale entries.
    pub fn pop(&mut self) -> Option<MergeCandidate> {
        while let Some(candidate) = self.heap.pop() {
            if self.is_current(&candidate) {
                self.current_counts.remove(&candidate.pair);
                return Some(candidate);
            }
        }
        None
    }

    /// Pop every live candidate sharing the highest count.
    ///
    /// The result is empty only when the queue holds no live entries.
    /// Candidates that are not used must be pushed back by the caller.
    pub fn pop_ties(&mut self) -> Vec<MergeCandidate> {
        let Some(best) = self.pop() else {
            return Vec::new();
        };

        let mut ties = vec![best];
        while self.heap.peek().is_some_and(|top| top.count == best.count) {
            let Some(candidate) = self.heap.pop() else {
                break;
            };
            if self.is_current(&candidate) {
                self.current_counts.remove(&candidate.pair);
                ties.push(candidate);
            }
        }

        ties
    }

    /// Get the number of (potentially stale) entries in the queue.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Check if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Get the current count for a pair.
    pub fn get_count(&self, pair: Pair) -> Option<u64> {
        self.current_counts.get(&pair).copied()
    }
}

impl Default for PairPriorityQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop() {
        let mut queue = PairPriorityQueue::new();

        queue.push(MergeCandidate::new((0, 1), 10));
        queue.push(MergeCandidate::new((1, 2), 20));
        queue.push(MergeCandidate::new((2, 3), 15));

        let first = queue.pop().unwrap();
        assert_eq!(first.pair, (1, 2));
        assert_eq!(first.count, 20);

        let second = queue.pop().unwrap();
        assert_eq!(second.pair, (2, 3));

        let third = queue.pop().unwrap();
        assert_eq!(third.pair, (0, 1));
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_stale_entry_detection() {
        let mut queue = PairPriorityQueue::new();

        queue.push(MergeCandidate::new((0, 1), 10));
        queue.push(MergeCandidate::new((1, 2), 20));

        // Supersede (1, 2) with a lower count
        queue.push(MergeCandidate::new((1, 2), 5));

        let first = queue.pop().unwrap();
        assert_eq!(first, MergeCandidate::new((0, 1), 10));

        let second = queue.pop().unwrap();
        assert_eq!(second, MergeCandidate::new((1, 2), 5));

        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_remove() {
        let mut queue = PairPriorityQueue::new();

        queue.push(MergeCandidate::new((0, 1), 10));
        queue.push(MergeCandidate::new((1, 2), 3));
        queue.remove((0, 1));

        assert_eq!(queue.get_count((0, 1)), None);
        assert_eq!(queue.pop().unwrap().pair, (1, 2));
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_pop_ties() {
        let mut queue = PairPriorityQueue::new();

        queue.push(MergeCandidate::new((0, 1), 7));
        queue.push(MergeCandidate::new((4, 5), 7));
        queue.push(MergeCandidate::new((2, 3), 7));
        queue.push(MergeCandidate::new((6, 7), 2));
        // Stale entry with the tied count
        queue.push(MergeCandidate::new((8, 9), 7));
        queue.push(MergeCandidate::new((8, 9), 1));

        let mut ties: Vec<Pair> = queue.pop_ties().into_iter().map(|c| c.pair).collect();
        ties.sort();
        assert_eq!(ties, vec![(0, 1), (2, 3), (4, 5)]);

        assert_eq!(queue.pop().unwrap().pair, (6, 7));
        assert_eq!(queue.pop().unwrap().pair, (8, 9));
        assert!(queue.pop_ties().is_empty());
    }
}
