//! A volatile, in-memory implementation of [`KVStore`]. This is what the factory mounts when
//! configured without a tree path, and what the test suite runs against.
//!
//! The batch is an ordered log of operations, replayed against the map under a single lock
//! acquisition. Replay order makes a later `set` win over an earlier `delete` of the same key
//! (and vice versa) without any bookkeeping in the batch itself, which is exactly how the
//! RocksDB batch behaves.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use super::pluggables::{KVGet, KVStore, StoreError, WriteBatch};

#[derive(Clone, Default)]
pub struct MemKVStore {
    entries: Arc<Mutex<HashMap<Vec<u8>, Vec<u8>>>>,
}

impl MemKVStore {
    pub fn new() -> MemKVStore {
        MemKVStore::default()
    }
}

impl KVGet for MemKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        let entries = self.entries.lock().expect("mem store lock poisoned");
        Ok(entries.get(key).cloned())
    }
}

impl KVStore for MemKVStore {
    type WriteBatch = MemWriteBatch;

    fn write(&mut self, wb: Self::WriteBatch) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().expect("mem store lock poisoned");
        for op in wb.ops {
            match op {
                BatchOp::Set(key, value) => {
                    entries.insert(key, value);
                }
                BatchOp::Delete(key) => {
                    entries.remove(&key);
                }
            }
        }
        Ok(())
    }
}

enum BatchOp {
    Set(Vec<u8>, Vec<u8>),
    Delete(Vec<u8>),
}

pub struct MemWriteBatch {
    ops: Vec<BatchOp>,
}

impl WriteBatch for MemWriteBatch {
    fn new() -> Self {
        MemWriteBatch { ops: Vec::new() }
    }

    fn set(&mut self, key: &[u8], value: &[u8]) {
        self.ops.push(BatchOp::Set(key.to_vec(), value.to_vec()));
    }

    fn delete(&mut self, key: &[u8]) {
        self.ops.push(BatchOp::Delete(key.to_vec()));
    }
}
