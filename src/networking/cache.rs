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

//! Fixed-capacity recency cache. When full, the oldest insertion is evicted
//! regardless of how recently it was read.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

/// Bounded map with insertion-order eviction.
pub struct RecentCache<K, V> {
    capacity: usize,
    map: HashMap<K, V>,
    order: VecDeque<K>,
}

impl<K: Hash + Eq + Clone, V> RecentCache<K, V> {
    /// Cache holding at most `capacity` entries (at least 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            map: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
        }
    }

    /// Value for `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.map.get(key)
    }

    /// True if `key` is cached.
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Insert unless present. Returns false (and keeps the old value) if present.
    pub fn insert_if_absent(&mut self, key: K, value: V) -> bool {
        if self.map.contains_key(&key) {
            return false;
        }
        if self.order.len() == self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.map.remove(&oldest);
            }
        }
        self.order.push_back(key.clone());
        self.map.insert(key, value);
        true
    }

    /// Entries cached.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True if empty.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_oldest_insertion() {
        let mut c = RecentCache::new(2);
        assert!(c.insert_if_absent(1, "a"));
        assert!(c.insert_if_absent(2, "b"));
        assert_eq!(c.get(&1), Some(&"a"));
        assert!(c.insert_if_absent(3, "c"));
        assert!(!c.contains(&1));
        assert!(c.contains(&2));
        assert!(c.contains(&3));
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn keeps_first_value_on_reinsert() {
        let mut c = RecentCache::new(4);
        assert!(c.insert_if_absent("k", 1));
        assert!(!c.insert_if_absent("k", 2));
        assert_eq!(c.get(&"k"), Some(&1));
        assert_eq!(c.len(), 1);
    }
}
