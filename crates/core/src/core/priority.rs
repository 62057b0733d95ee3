//! Priority queue for BPE merge candidates.
//!
//! Training must be bit-for-bit reproducible, so candidates are ordered by
//! frequency and then by the *strings* of the pair (smaller pair wins).
//! Symbol ids are assigned in discovery order and cannot be used for the
//! tie-break.

use crate::core::merges::Pair;
use ahash::AHashMap;
use compact_str::CompactString;
use dary_heap::OctonaryHeap;
use std::cmp::Ordering;

/// A merge candidate during BPE training.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeCandidate {
    /// The pair of symbol ids to merge
    pub pair: Pair,
    /// Weighted frequency of the pair across the corpus
    pub count: u64,
    /// The pair's symbol strings, used for tie-breaking
    pub symbols: (CompactString, CompactString),
}

impl MergeCandidate {
    pub fn new(pair: Pair, count: u64, symbols: (CompactString, CompactString)) -> Self {
        Self {
            pair,
            count,
            symbols,
        }
    }
}

// Max-heap order: higher count first, then lexicographically smaller pair.
impl Ord for MergeCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.count
            .cmp(&other.count)
            .then_with(|| other.symbols.cmp(&self.symbols))
            .then_with(|| other.pair.cmp(&self.pair))
    }
}

impl PartialOrd for MergeCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Priority queue for BPE merge operations.
///
/// Counts change constantly during training; instead of re-heapifying, a
/// fresh entry is pushed and older entries for the same pair go stale. Stale
/// entries are discarded lazily on `pop`.
pub struct PairPriorityQueue {
    /// 8-ary heap of candidates, possibly stale
    heap: OctonaryHeap<MergeCandidate>,
    /// Live count per pair
    current_counts: AHashMap<Pair, u64>,
}

impl PairPriorityQueue {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: OctonaryHeap::with_capacity(capacity),
            current_counts: AHashMap::with_capacity(capacity),
        }
    }

    pub fn new() -> Self {
        Self {
            heap: OctonaryHeap::new(),
            current_counts: AHashMap::new(),
        }
    }

    /// Push a candidate, superseding any earlier entry for its pair.
    pub fn push(&mut self, candidate: MergeCandidate) {
        self.current_counts.insert(candidate.pair, candidate.count);
        self.heap.push(candidate);
    }

    /// Pop the highest priority live candidate.
    pub fn pop(&mut self) -> Option<MergeCandidate> {
        while let Some(candidate) = self.heap.pop() {
            if self.current_counts.get(&candidate.pair) == Some(&candidate.count) {
                self.current_counts.remove(&candidate.pair);
                return Some(candidate);
            }
        }
        None
    }

    /// Drop a pair entirely; its heap entries become stale.
    pub fn remove(&mut self, pair: Pair) {
        self.current_counts.remove(&pair);
    }

    /// Number of heap entries, stale ones included.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.current_counts.clear();
    }

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

    fn candidate(pair: Pair, count: u64, left: &str, right: &str) -> MergeCandidate {
        MergeCandidate::new(pair, count, (left.into(), right.into()))
    }

    #[test]
    fn test_push_pop_by_count() {
        let mut queue = PairPriorityQueue::new();
        queue.push(candidate((0, 1), 10, "a", "b"));
        queue.push(candidate((1, 2), 20, "b", "c"));
        queue.push(candidate((2, 3), 15, "c", "d"));

        assert_eq!(queue.pop().unwrap().pair, (1, 2));
        assert_eq!(queue.pop().unwrap().pair, (2, 3));
        assert_eq!(queue.pop().unwrap().pair, (0, 1));
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_tie_breaks_on_smallest_strings() {
        let mut queue = PairPriorityQueue::new();
        // Ids deliberately disagree with string order.
        queue.push(candidate((0, 1), 5, "म", "ा"));
        queue.push(candidate((7, 8), 5, "क", "ि"));
        queue.push(candidate((3, 4), 5, "क", "a"));

        assert_eq!(queue.pop().unwrap().symbols, ("क".into(), "a".into()));
        assert_eq!(queue.pop().unwrap().symbols, ("क".into(), "ि".into()));
        assert_eq!(queue.pop().unwrap().symbols, ("म".into(), "ा".into()));
    }

    #[test]
    fn test_stale_entry_detection() {
        let mut queue = PairPriorityQueue::new();
        queue.push(candidate((0, 1), 10, "a", "b"));
        queue.push(candidate((1, 2), 20, "b", "c"));
        queue.push(candidate((0, 1), 25, "a", "b"));

        let first = queue.pop().unwrap();
        assert_eq!(first.pair, (0, 1));
        assert_eq!(first.count, 25);
        assert_eq!(queue.pop().unwrap().pair, (1, 2));
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_remove_makes_entries_stale() {
        let mut queue = PairPriorityQueue::new();
        queue.push(candidate((0, 1), 10, "a", "b"));
        queue.remove((0, 1));

        assert_eq!(queue.get_count((0, 1)), None);
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_clear() {
        let mut queue = PairPriorityQueue::new();
        queue.push(candidate((0, 1), 10, "a", "b"));
        assert_eq!(queue.len(), 1);

        queue.clear();
        assert!(queue.is_empty());
    }
}
