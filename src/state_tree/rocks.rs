//! A persistent implementation of [`KVStore`] backed by RocksDB. This is what the factory
//! mounts when configured with a tree path.

use std::sync::Arc;

use super::pluggables::{KVGet, KVStore, StoreError, WriteBatch};

#[derive(Clone)]
pub struct RocksKVStore(Arc<rocksdb::DB>);

impl RocksKVStore {
    pub fn open(path: &str) -> Result<RocksKVStore, StoreError> {
        if path.is_empty() {
            return Err(StoreError::new("empty tree db path"));
        }
        let db = rocksdb::DB::open_default(path).map_err(|err| StoreError::new(err.to_string()))?;
        Ok(RocksKVStore(Arc::new(db)))
    }
}

impl KVGet for RocksKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        self.0
            .get(key)
            .map_err(|err| StoreError::new(err.to_string()))
    }
}

impl KVStore for RocksKVStore {
    type WriteBatch = RocksWriteBatch;

    fn write(&mut self, wb: Self::WriteBatch) -> Result<(), StoreError> {
        self.0
            .write(wb.0)
            .map_err(|err| StoreError::new(err.to_string()))
    }
}

pub struct RocksWriteBatch(rocksdb::WriteBatch);

impl WriteBatch for RocksWriteBatch {
    fn new() -> Self {
        RocksWriteBatch(rocksdb::WriteBatch::default())
    }

    fn set(&mut self, key: &[u8], value: &[u8]) {
        self.0.put(key, value)
    }

    fn delete(&mut self, key: &[u8]) {
        self.0.delete(key)
    }
}
