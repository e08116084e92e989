//! The authenticated account map: 20-byte address hashes to account-record bytes, with a root
//! hash that commits to every stored pair.
//!
//! Authentication is a flat accumulator: the root is the SHA-256 digest of the sorted sequence
//! of `(key, SHA-256(value))` pairs. The set of keys is persisted alongside the pairs, in the
//! same atomic batch, so a tree reopened over the same store recomputes the same root. Callers
//! only ever depend on the [`StateTree`] interface, so a richer structure (e.g. a Merkle
//! Patricia trie) can replace the accumulator without touching the factory.

use borsh::{BorshDeserialize, BorshSerialize};
use sha2::{Digest, Sha256};
use std::{
    collections::BTreeMap,
    fmt::{self, Display, Formatter},
};

use crate::types::{AddressHash, StateRoot};

use super::pluggables::{KVStore, StoreError, WriteBatch};

pub struct StateTree<K: KVStore> {
    store: K,
    // Hash of the stored value under each key. Mirrors the persisted key index; rebuilt from
    // the store on open.
    leaves: BTreeMap<AddressHash, [u8; 32]>,
    root: StateRoot,
}

impl<K: KVStore> StateTree<K> {
    /// Open a tree over `store`, rebuilding the leaf index (and hence the root) from whatever
    /// was last committed.
    pub fn new(store: K) -> Result<StateTree<K>, TreeError> {
        let mut leaves = BTreeMap::new();
        if let Some(bytes) = store.get(&keyspaces::LEAF_INDEX)? {
            let keys = <Vec<AddressHash>>::deserialize(&mut bytes.as_slice())
                .map_err(|err| StoreError::new(format!("corrupt leaf index: {}", err)))?;
            for key in keys {
                let value = store
                    .get(&keyspaces::account(&key))?
                    .ok_or_else(|| StoreError::new("leaf index references a missing entry"))?;
                leaves.insert(key, Sha256::digest(&value).into());
            }
        }
        let mut tree = StateTree {
            store,
            leaves,
            root: StateRoot::zero(),
        };
        tree.root = tree.compute_root();
        Ok(tree)
    }

    /// Get the bytes stored under `key`.
    pub fn get(&self, key: &AddressHash) -> Result<Vec<u8>, TreeError> {
        self.store
            .get(&keyspaces::account(key))?
            .ok_or(TreeError::NotExist)
    }

    /// Write a single pair immediately.
    pub fn upsert(&mut self, key: AddressHash, value: Vec<u8>) -> Result<(), TreeError> {
        self.commit(vec![key], vec![value])
    }

    /// Atomically commit a batch of pairs: either every pair (and the updated key index) lands
    /// in the store, or none do. The root hash reflects the batch once this returns `Ok`.
    pub fn commit(&mut self, keys: Vec<AddressHash>, values: Vec<Vec<u8>>) -> Result<(), TreeError> {
        let mut wb = K::WriteBatch::new();
        for (key, value) in keys.iter().zip(values.iter()) {
            self.leaves.insert(*key, Sha256::digest(value).into());
            wb.set(&keyspaces::account(key), value);
        }
        let index: Vec<AddressHash> = self.leaves.keys().copied().collect();
        let index_bytes = index
            .try_to_vec()
            .map_err(|err| StoreError::new(format!("leaf index serialization: {}", err)))?;
        wb.set(&keyspaces::LEAF_INDEX, &index_bytes);
        self.store.write(wb)?;
        self.root = self.compute_root();
        Ok(())
    }

    /// The root hash as of the last committed batch. The empty tree's root is all-zero.
    pub fn root_hash(&self) -> StateRoot {
        self.root
    }

    fn compute_root(&self) -> StateRoot {
        if self.leaves.is_empty() {
            return StateRoot::zero();
        }
        let mut hasher = Sha256::new();
        for (key, value_hash) in &self.leaves {
            hasher.update(key.bytes());
            hasher.update(value_hash);
        }
        StateRoot::new(hasher.finalize().into())
    }
}

/// Error when reading from or committing to the state tree.
#[derive(Debug)]
pub enum TreeError {
    /// The tree holds no entry under the requested key.
    NotExist,

    /// The backing store failed.
    Store(StoreError),
}

impl From<StoreError> for TreeError {
    fn from(value: StoreError) -> Self {
        TreeError::Store(value)
    }
}

impl Display for TreeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::NotExist => write!(f, "no entry under the requested key"),
            TreeError::Store(err) => Display::fmt(err, f),
        }
    }
}

mod keyspaces {
    use crate::types::AddressHash;

    type Prefix = [u8; 1];

    const ACCOUNTS: Prefix = [0];
    pub(super) const LEAF_INDEX: Prefix = [1];

    pub(super) fn account(key: &AddressHash) -> Vec<u8> {
        let bytes = key.bytes();
        let mut prefixed = Vec::with_capacity(1 + bytes.len());
        prefixed.extend_from_slice(&ACCOUNTS);
        prefixed.extend_from_slice(&bytes);
        prefixed
    }
}
