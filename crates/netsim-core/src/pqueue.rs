//! A priority queue of `(time, task)` pairs with FIFO tie-breaking.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::units::Seconds;

/// The error returned by `pop` when no live entry remains.
#[derive(Debug, Clone, Copy, thiserror::Error, PartialEq, Eq)]
#[error("priority queue is empty")]
pub struct Empty;

#[derive(Debug, Clone)]
struct HeapEntry<T> {
    priority: Seconds,
    seq: u64,
    task: T,
}

impl<T> PartialEq for HeapEntry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl<T> Eq for HeapEntry<T> {}

impl<T> PartialOrd for HeapEntry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for HeapEntry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority.cmp(&other.priority).then(self.seq.cmp(&other.seq))
    }
}

/// A min-heap of tasks ordered by `(priority, sequence)`, where `sequence` is a monotonic counter
/// assigned at insertion time. This is the fast path used by the event loop: events are never
/// rescheduled by re-adding them, so there is no dedup map to maintain.
#[derive(Debug)]
pub struct PriorityQueue<T> {
    heap: BinaryHeap<std::cmp::Reverse<HeapEntry<T>>>,
    next_seq: u64,
}

impl<T> Default for PriorityQueue<T> {
    fn default() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }
}

impl<T> PriorityQueue<T> {
    /// Creates an empty priority queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `task` with the given `priority`.
    pub fn add(&mut self, task: T, priority: Seconds) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(std::cmp::Reverse(HeapEntry { priority, seq, task }));
    }

    /// Removes and returns the minimum-priority task. Ties in priority are broken by insertion
    /// order (FIFO).
    pub fn pop(&mut self) -> Result<(Seconds, T), Empty> {
        self.heap
            .pop()
            .map(|std::cmp::Reverse(entry)| (entry.priority, entry.task))
            .ok_or(Empty)
    }

    /// The number of entries currently queued.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

/// A priority queue that supports reschedule-by-re-add, keyed by an explicit, caller-supplied
/// key distinct from the task payload. Re-adding a key tombstones its previous entry instead of
/// leaving two live copies around. Not used by the packet-level event loop (which never needs
/// to reschedule), but kept available for contention models that recompute a message's finish
/// time whenever the active set on one of its links changes (see [`crate::contention::fluid`]).
#[derive(Debug)]
pub struct DedupPriorityQueue<K, T> {
    heap: BinaryHeap<std::cmp::Reverse<HeapEntry<(K, T)>>>,
    latest: FxHashMap<K, u64>,
    next_seq: u64,
}

impl<K, T> Default for DedupPriorityQueue<K, T> {
    fn default() -> Self {
        Self {
            heap: BinaryHeap::new(),
            latest: FxHashMap::default(),
            next_seq: 0,
        }
    }
}

impl<K, T> DedupPriorityQueue<K, T>
where
    K: Clone + Eq + Hash,
{
    /// Creates an empty dedup priority queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `task` under `key` at `priority`. If `key` is already present, the previous entry
    /// is tombstoned.
    pub fn add(&mut self, key: K, task: T, priority: Seconds) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.latest.insert(key.clone(), seq);
        self.heap.push(std::cmp::Reverse(HeapEntry {
            priority,
            seq,
            task: (key, task),
        }));
    }

    /// Removes and returns the minimum-priority live `(key, task)`, skipping tombstoned entries.
    pub fn pop(&mut self) -> Result<(Seconds, K, T), Empty> {
        while let Some(std::cmp::Reverse(entry)) = self.heap.pop() {
            let (key, task) = entry.task;
            match self.latest.get(&key) {
                Some(&seq) if seq == entry.seq => {
                    self.latest.remove(&key);
                    return Ok((entry.priority, key, task));
                }
                _ => continue,
            }
        }
        Err(Empty)
    }

    /// The number of live entries (tombstones are not counted).
    pub fn len(&self) -> usize {
        self.latest.len()
    }

    /// Whether the queue has no live entries.
    pub fn is_empty(&self) -> bool {
        self.latest.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_priority_order() {
        let mut pq = PriorityQueue::new();
        pq.add("c", Seconds::new(3.0));
        pq.add("a", Seconds::new(1.0));
        pq.add("b", Seconds::new(2.0));
        assert_eq!(pq.pop().unwrap().1, "a");
        assert_eq!(pq.pop().unwrap().1, "b");
        assert_eq!(pq.pop().unwrap().1, "c");
        assert_eq!(pq.pop(), Err(Empty));
    }

    #[test]
    fn ties_are_fifo() {
        let mut pq = PriorityQueue::new();
        pq.add("first", Seconds::new(5.0));
        pq.add("second", Seconds::new(5.0));
        pq.add("third", Seconds::new(5.0));
        assert_eq!(pq.pop().unwrap().1, "first");
        assert_eq!(pq.pop().unwrap().1, "second");
        assert_eq!(pq.pop().unwrap().1, "third");
    }

    #[test]
    fn len_reflects_queued_entries() {
        let mut pq = PriorityQueue::new();
        pq.add(1, Seconds::new(1.0));
        pq.add(2, Seconds::new(2.0));
        assert_eq!(pq.len(), 2);
        pq.pop().unwrap();
        assert_eq!(pq.len(), 1);
    }

    #[test]
    fn dedup_readd_tombstones_previous_entry() {
        let mut pq = DedupPriorityQueue::new();
        pq.add("msg-1", "route-a", Seconds::new(10.0));
        assert_eq!(pq.len(), 1);
        pq.add("msg-1", "route-b", Seconds::new(1.0));
        assert_eq!(pq.len(), 1);
        assert_eq!(pq.pop().unwrap(), (Seconds::new(1.0), "msg-1", "route-b"));
        assert_eq!(pq.pop(), Err(Empty));
    }
}
