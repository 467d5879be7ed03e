// Copyright (c) 2026 Amunchain
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Bounded, weight-ordered dispatch queue.
//!
//! Under load, heavier transactions (more proof of work) leave the queue first,
//! so they propagate faster. Two semaphores track free slots and ready items:
//! `push` waits for a slot, `pop` waits for an item, `close` fails both.

use parking_lot::Mutex;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use thiserror::Error;
use tokio::sync::Semaphore;

/// Queue errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum QueueError {
    /// The queue was closed; pending and future calls fail.
    #[error("queue closed")]
    Closed,
}

struct Entry<T> {
    weight: i64,
    seq: u64,
    value: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.weight == other.weight && self.seq == other.seq
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    // Max-heap on weight; earlier insertion wins ties.
    fn cmp(&self, other: &Self) -> Ordering {
        self.weight
            .cmp(&other.weight)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

struct Heap<T> {
    entries: BinaryHeap<Entry<T>>,
    next_seq: u64,
}

/// Bounded concurrent max-priority queue.
pub struct WeightQueue<T> {
    heap: Mutex<Heap<T>>,
    slots: Semaphore,
    items: Semaphore,
    capacity: usize,
}

impl<T> WeightQueue<T> {
    /// Create a queue holding at most `capacity` items (at least 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            heap: Mutex::new(Heap {
                entries: BinaryHeap::with_capacity(capacity),
                next_seq: 0,
            }),
            slots: Semaphore::new(capacity),
            items: Semaphore::new(0),
            capacity,
        }
    }

    /// Insert `value`, waiting while the queue is full.
    pub async fn push(&self, value: T, weight: i64) -> Result<(), QueueError> {
        let slot = self.slots.acquire().await.map_err(|_| QueueError::Closed)?;
        slot.forget();
        {
            let mut heap = self.heap.lock();
            let seq = heap.next_seq;
            heap.next_seq = heap.next_seq.wrapping_add(1);
            heap.entries.push(Entry { weight, seq, value });
        }
        self.items.add_permits(1);
        Ok(())
    }

    /// Remove the heaviest item, waiting while the queue is empty.
    pub async fn pop(&self) -> Result<T, QueueError> {
        self.pop_weighted().await.map(|(value, _)| value)
    }

    /// Like [`WeightQueue::pop`], also returning the item's weight.
    pub async fn pop_weighted(&self) -> Result<(T, i64), QueueError> {
        let item = self.items.acquire().await.map_err(|_| QueueError::Closed)?;
        item.forget();
        let entry = self.heap.lock().entries.pop();
        self.slots.add_permits(1);
        entry
            .map(|e| (e.value, e.weight))
            .ok_or(QueueError::Closed)
    }

    /// Fail all waiting and future pushes/pops and drop queued items.
    pub fn close(&self) {
        self.slots.close();
        self.items.close();
        self.heap.lock().entries.clear();
    }

    /// True once [`WeightQueue::close`] was called.
    pub fn is_closed(&self) -> bool {
        self.items.is_closed()
    }

    /// Items currently queued.
    pub fn len(&self) -> usize {
        self.heap.lock().entries.len()
    }

    /// True if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
