//! Ready-queue variants
//!
//! One [`ReadyQueue`] backs each CPU. FCFS and RR use insertion order; SJF
//! and EDF use a binary min-heap over an ordering key captured at enqueue
//! time. A ready process never executes, so its `remaining` (and therefore
//! any key derived from it) cannot change while queued; entries carry both
//! the key and the member's remaining so the queue can maintain its
//! `ready_work` total on every mutation.

use core_types::Pid;
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, VecDeque};

#[derive(Debug, Clone, Copy)]
struct FifoEntry {
    pid: Pid,
    remaining: u32,
}

#[derive(Debug, Clone, Copy)]
struct HeapEntry {
    key: u64,
    pid: Pid,
    remaining: u32,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.pid == other.pid
    }
}

impl Eq for HeapEntry {}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Smaller PID wins ties
        self.key.cmp(&other.key).then_with(|| self.pid.cmp(&other.pid))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone)]
enum Store {
    Fifo(VecDeque<FifoEntry>),
    Heap(BinaryHeap<Reverse<HeapEntry>>),
}

/// A CPU's ready store
#[derive(Debug, Clone)]
pub struct ReadyQueue {
    store: Store,
    ready_work: u64,
}

impl ReadyQueue {
    /// Creates an insertion-ordered queue (FCFS, RR)
    pub fn fifo() -> Self {
        Self {
            store: Store::Fifo(VecDeque::new()),
            ready_work: 0,
        }
    }

    /// Creates a min-heap queue (SJF, EDF)
    pub fn heap() -> Self {
        Self {
            store: Store::Heap(BinaryHeap::new()),
            ready_work: 0,
        }
    }

    /// Adds a member
    ///
    /// `key` is ignored by FIFO queues; heap queues order by `(key, pid)`
    /// ascending.
    pub fn push(&mut self, pid: Pid, key: u64, remaining: u32) {
        match &mut self.store {
            Store::Fifo(queue) => queue.push_back(FifoEntry { pid, remaining }),
            Store::Heap(heap) => heap.push(Reverse(HeapEntry {
                key,
                pid,
                remaining,
            })),
        }
        self.ready_work += u64::from(remaining);
    }

    /// Removes and returns the head
    pub fn pop(&mut self) -> Option<Pid> {
        let entry = match &mut self.store {
            Store::Fifo(queue) => queue.pop_front().map(|e| (e.pid, e.remaining)),
            Store::Heap(heap) => heap.pop().map(|Reverse(e)| (e.pid, e.remaining)),
        };
        entry.map(|(pid, remaining)| {
            self.ready_work -= u64::from(remaining);
            pid
        })
    }

    /// Returns the head without removing it
    pub fn peek(&self) -> Option<Pid> {
        match &self.store {
            Store::Fifo(queue) => queue.front().map(|e| e.pid),
            Store::Heap(heap) => heap.peek().map(|Reverse(e)| e.pid),
        }
    }

    /// Stable removal by PID; insertion order of the remainder is preserved
    ///
    /// Only meaningful for FIFO queues (SIGKILL targets live in FCFS
    /// context); heap queues report not-found.
    pub fn remove_by_pid(&mut self, pid: Pid) -> bool {
        match &mut self.store {
            Store::Fifo(queue) => {
                if let Some(pos) = queue.iter().position(|e| e.pid == pid) {
                    if let Some(entry) = queue.remove(pos) {
                        self.ready_work -= u64::from(entry.remaining);
                        return true;
                    }
                }
                false
            }
            Store::Heap(_) => false,
        }
    }

    pub fn len(&self) -> usize {
        match &self.store {
            Store::Fifo(queue) => queue.len(),
            Store::Heap(heap) => heap.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of `remaining` over all members
    pub fn ready_work(&self) -> u64 {
        self.ready_work
    }

    /// Member PIDs in display order
    ///
    /// FIFO queues list insertion order; heap queues list internal storage
    /// order (unsorted), which is enough for snapshots.
    pub fn pids(&self) -> Vec<Pid> {
        match &self.store {
            Store::Fifo(queue) => queue.iter().map(|e| e.pid).collect(),
            Store::Heap(heap) => heap.iter().map(|Reverse(e)| e.pid).collect(),
        }
    }
}
