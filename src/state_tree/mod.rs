//! The authenticated key-value tree that persists committed account state, and the pluggable
//! store traits it is built over.
//!
//! Persistence is pluggable: the [`tree::StateTree`] requires only the abstract functionality
//! of a key-value store with atomic batched writes ([`pluggables`]), and ships with two
//! implementations, a volatile in-memory store ([`mem`]) and a RocksDB-backed store
//! ([`rocks`]). Which one is mounted is decided by the factory constructor the caller picks.

pub mod pluggables;

pub mod mem;

pub mod rocks;

pub mod tree;

pub use mem::MemKVStore;
pub use pluggables::{KVGet, KVStore, StoreError, WriteBatch};
pub use rocks::RocksKVStore;
pub use tree::{StateTree, TreeError};
