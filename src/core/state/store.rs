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

//! Bucketed key-value store capability, with a sled backend and a no-op backend.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Store errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("db open")]
    Open,
    #[error("db io")]
    Io,
    #[error("store closed")]
    Closed,
}

/// Named partition of the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Bucket {
    /// Raw transaction bytes keyed by 49-byte transaction hash.
    Transaction = 1,
}

impl Bucket {
    /// Every bucket the node uses.
    pub const ALL: [Bucket; 1] = [Bucket::Transaction];

    /// Tree name on disk.
    pub fn key(self) -> [u8; 1] {
        [self as u8]
    }
}

/// Minimal bucketed get/put contract the node core depends on.
pub trait Store: Send + Sync {
    /// Put `value` under `key`, overwriting.
    fn write(&self, bucket: Bucket, key: &[u8], value: &[u8]) -> Result<(), StoreError>;

    /// Get the value under `key`.
    fn read(&self, bucket: Bucket, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    /// True if `key` is present.
    fn exists(&self, bucket: Bucket, key: &[u8]) -> Result<bool, StoreError> {
        Ok(self.read(bucket, key)?.is_some())
    }

    /// Atomically put `value` unless `key` is present. Returns true if inserted.
    fn insert_if_absent(&self, bucket: Bucket, key: &[u8], value: &[u8]) -> Result<bool, StoreError>;

    /// Flush and release. Later calls fail with `StoreError::Closed`.
    fn close(&self) -> Result<(), StoreError>;
}

/// Store that keeps nothing. Every insert succeeds and nothing is ever found.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullStore;

impl Store for NullStore {
    fn write(&self, _bucket: Bucket, _key: &[u8], _value: &[u8]) -> Result<(), StoreError> {
        Ok(())
    }

    fn read(&self, _bucket: Bucket, _key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(None)
    }

    fn insert_if_absent(&self, _bucket: Bucket, _key: &[u8], _value: &[u8]) -> Result<bool, StoreError> {
        Ok(true)
    }

    fn close(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Persistent store using sled, one tree per bucket.
pub struct SledStore {
    db: sled::Db,
    trees: BTreeMap<Bucket, sled::Tree>,
    closed: AtomicBool,
}

impl SledStore {
    /// Open sled DB at path (directory).
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let db = sled::open(path).map_err(|_| StoreError::Open)?;
        let mut trees = BTreeMap::new();
        for bucket in Bucket::ALL {
            let tree = db.open_tree(bucket.key()).map_err(|_| StoreError::Open)?;
            trees.insert(bucket, tree);
        }
        Ok(Self {
            db,
            trees,
            closed: AtomicBool::new(false),
        })
    }

    fn tree(&self, bucket: Bucket) -> Result<&sled::Tree, StoreError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Closed);
        }
        self.trees.get(&bucket).ok_or(StoreError::Io)
    }
}

impl Store for SledStore {
    fn write(&self, bucket: Bucket, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.tree(bucket)?
            .insert(key, value)
            .map_err(|_| StoreError::Io)?;
        Ok(())
    }

    fn read(&self, bucket: Bucket, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        let v = self.tree(bucket)?.get(key).map_err(|_| StoreError::Io)?;
        Ok(v.map(|iv| iv.to_vec()))
    }

    fn exists(&self, bucket: Bucket, key: &[u8]) -> Result<bool, StoreError> {
        self.tree(bucket)?
            .contains_key(key)
            .map_err(|_| StoreError::Io)
    }

    fn insert_if_absent(&self, bucket: Bucket, key: &[u8], value: &[u8]) -> Result<bool, StoreError> {
        let res = self
            .tree(bucket)?
            .compare_and_swap(key, None::<&[u8]>, Some(value))
            .map_err(|_| StoreError::Io)?;
        Ok(res.is_ok())
    }

    fn close(&self) -> Result<(), StoreError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.db.flush().map_err(|_| StoreError::Io)?;
        Ok(())
    }
}
