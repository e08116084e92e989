//! Traits that define the abstract functionality the state tree requires of its backing
//! key-value store: point reads, and atomic batched writes. Implement these for whatever
//! persistence mechanism you want and mount it through the factory's constructors.

use std::fmt::{self, Display, Formatter};

pub trait KVGet {
    /// Get the value stored under `key`, `None` if there is no entry, or an error if the
    /// backing store failed to answer.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;
}

/// A set of writes that a [`KVStore`] applies atomically: either every write in the batch
/// lands, or none do.
pub trait WriteBatch {
    fn new() -> Self;
    fn set(&mut self, key: &[u8], value: &[u8]);
    fn delete(&mut self, key: &[u8]);
}

pub trait KVStore: KVGet + Clone + Send + 'static {
    type WriteBatch: WriteBatch;

    fn write(&mut self, wb: Self::WriteBatch) -> Result<(), StoreError>;
}

/// Error from the backing store, carrying the backend's own description.
#[derive(Debug)]
pub struct StoreError(String);

impl StoreError {
    pub fn new(description: impl Into<String>) -> StoreError {
        StoreError(description.into())
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "key-value store error: {}", self.0)
    }
}
