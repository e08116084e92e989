//! The state factory: the single entry point through which a block's actions become committed
//! account state and an updated delegate ranking.
//!
//! # Commit protocol
//!
//! [`StateFactory::commit_state_changes`] runs one block through seven steps: reset the
//! per-commit scratch, apply every transfer in block order, apply every vote in block order,
//! reconcile each touched account into the ranking while staging its serialized record,
//! advance the current height, snapshot the sorted active pool under that height, and commit
//! the staged batch to the tree in one atomic write. The first error aborts the block; nothing
//! partial is observable through the tree after the batch step.
//!
//! # Concurrency
//!
//! The factory is single-writer, many-reader: `commit_state_changes` (and `create_state`)
//! take the write half of an [`RwLock`], every query takes the read half. Commits are invoked
//! serially by the block-commit pipeline and are not cancellable; a caller that sees a commit
//! error treats the factory as poisoned and recreates it.

use std::fmt::{self, Display, Formatter};
use std::io;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::address;
use crate::config::Configuration;
use crate::interpreters::{apply_transfer, apply_vote, Scratch};
use crate::logging;
use crate::ranking::DelegateRanking;
use crate::snapshots::SnapshotCache;
use crate::state_tree::{KVStore, MemKVStore, RocksKVStore, StateTree, StoreError, TreeError};
use crate::types::{Account, Address, Candidate, Height, Nonce, StateRoot, Tokens, Transfer, Vote};

pub struct StateFactory<K: KVStore> {
    inner: RwLock<Inner<K>>,
}

struct Inner<K: KVStore> {
    current_height: Height,
    tree: StateTree<K>,
    ranking: DelegateRanking,
    snapshots: SnapshotCache,
}

impl<K: KVStore> StateFactory<K> {
    /// Create a factory over a pre-created store.
    pub fn with_store(config: &Configuration, store: K) -> Result<StateFactory<K>, StateError> {
        let tree = StateTree::new(store)?;
        Ok(StateFactory {
            inner: RwLock::new(Inner {
                current_height: Height::new(0),
                tree,
                ranking: DelegateRanking::new(config.ranking.num_active_candidates),
                snapshots: SnapshotCache::new(config.snapshots.cache_capacity),
            }),
        })
    }

    /// Write a fresh record with `initial_balance` directly into the tree and return it.
    pub fn create_state(
        &self,
        address: &Address,
        initial_balance: u64,
    ) -> Result<Account, StateError> {
        let key = address::hash_of(address).ok_or(StateError::InvalidAddress)?;
        let account = Account::new(Tokens::new(initial_balance));
        let value = account
            .to_bytes()
            .map_err(StateError::FailedToMarshalState)?;
        let mut inner = self.write();
        inner.tree.upsert(key, value)?;
        logging::log_create_state(address);
        Ok(account)
    }

    /// The balance currently committed for `address`.
    pub fn balance(&self, address: &Address) -> Result<Tokens, StateError> {
        Ok(self.state(address)?.balance)
    }

    /// The nonce currently committed for `address`. Note that nonces start with 1; a stored 0
    /// means the account has never acted.
    pub fn nonce(&self, address: &Address) -> Result<Nonce, StateError> {
        Ok(self.state(address)?.nonce)
    }

    /// The full account record currently committed for `address`.
    pub fn state(&self, address: &Address) -> Result<Account, StateError> {
        let inner = self.read();
        load_account(&inner.tree, address)
    }

    /// The authenticated root hash of the tree as of the last commit.
    pub fn root_hash(&self) -> StateRoot {
        self.read().tree.root_hash()
    }

    /// Apply one block's transfers and votes at `height`.
    ///
    /// Either every effect lands (account records in the tree, ranking updated, snapshot
    /// recorded), or the first error is returned and the caller must treat the factory as
    /// poisoned.
    pub fn commit_state_changes(
        &self,
        height: Height,
        transfers: &[Transfer],
        votes: &[Vote],
    ) -> Result<(), StateError> {
        let mut guard = self.write();
        let inner = &mut *guard;

        let mut scratch = Scratch::new();
        for transfer in transfers {
            apply_transfer(&mut scratch, &inner.tree, transfer)?;
        }
        for vote in votes {
            apply_vote(&mut scratch, &inner.tree, height, vote)?;
        }

        // Reconcile every touched account into the ranking and stage its record. Iteration
        // order over the scratch is immaterial: the snapshot below is sorted, and ranking
        // membership after all updates does not depend on the order they were applied in.
        let Scratch {
            accounts,
            mut candidates,
        } = scratch;
        let mut keys = Vec::with_capacity(accounts.len());
        let mut values = Vec::with_capacity(accounts.len());
        for (account_address, account) in &accounts {
            let key = address::hash_of(account_address).ok_or(StateError::InvalidAddress)?;
            let value = account
                .to_bytes()
                .map_err(StateError::FailedToMarshalState)?;
            keys.push(key);
            values.push(value);

            if !account.is_candidate {
                candidates.remove(account_address);
                inner.ranking.remove_candidate(account_address);
            } else {
                let total_votes = account.total_votes(account_address);
                let template = candidates.remove(account_address);
                inner
                    .ranking
                    .update_candidate(account_address, total_votes, height, template);
            }
        }

        inner.current_height = height;
        let snapshot = inner.ranking.active_sorted();
        logging::log_snapshot(height, snapshot.len());
        inner.snapshots.put(height, snapshot);

        let staged = keys.len();
        inner.tree.commit(keys, values)?;
        logging::log_commit(height, staged, &inner.tree.root_hash());
        Ok(())
    }

    /// The current height and the active candidate pool, sorted ascending by (votes, address).
    pub fn candidates(&self) -> (Height, Vec<Candidate>) {
        let inner = self.read();
        (inner.current_height, inner.ranking.active_sorted())
    }

    /// The current height and the buffer pool, sorted ascending by (votes, address).
    pub fn candidates_buffer(&self) -> (Height, Vec<Candidate>) {
        let inner = self.read();
        (inner.current_height, inner.ranking.buffer_sorted())
    }

    /// The active candidate pool as it was immediately after the commit at `height`, and
    /// whether that height is still cached. A miss returns an empty list and `false`.
    pub fn candidates_by_height(&self, height: Height) -> (Vec<Candidate>, bool) {
        let inner = self.read();
        match inner.snapshots.get(height) {
            Some(candidates) => (candidates, true),
            None => (Vec::new(), false),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner<K>> {
        self.inner.read().expect("state factory lock poisoned")
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner<K>> {
        self.inner.write().expect("state factory lock poisoned")
    }
}

impl StateFactory<MemKVStore> {
    /// Create a factory over a fresh in-memory tree.
    pub fn in_memory(config: &Configuration) -> Result<StateFactory<MemKVStore>, StateError> {
        StateFactory::with_store(config, MemKVStore::new())
    }
}

impl StateFactory<RocksKVStore> {
    /// Create a factory over a persistent tree at `config.tree.db_path`.
    pub fn open(config: &Configuration) -> Result<StateFactory<RocksKVStore>, StateError> {
        let store = RocksKVStore::open(&config.tree.db_path)?;
        StateFactory::with_store(config, store)
    }
}

/// Read an account record out of the tree.
pub(crate) fn load_account<K: KVStore>(
    tree: &StateTree<K>,
    address: &Address,
) -> Result<Account, StateError> {
    let key = address::hash_of(address).ok_or(StateError::InvalidAddress)?;
    let bytes = match tree.get(&key) {
        Ok(bytes) => bytes,
        Err(TreeError::NotExist) => return Err(StateError::AccountNotExist),
        Err(err) => return Err(err.into()),
    };
    Account::from_bytes(&bytes).map_err(|_| StateError::FailedToUnmarshalState)
}

/// Error returned by the factory's operations.
#[derive(Debug)]
pub enum StateError {
    /// The address format is invalid, cannot be decoded to an account hash.
    InvalidAddress,

    /// The account does not exist.
    AccountNotExist,

    /// A transfer's amount exceeds the sender's balance.
    NotEnoughBalance,

    /// An account record refused to serialize.
    FailedToMarshalState(io::Error),

    /// Bytes in the tree do not decode to an account record. A corrupt-tree signal, distinct
    /// from [`StateError::AccountNotExist`].
    FailedToUnmarshalState,

    /// Surfaced from the tree collaborator.
    Tree(TreeError),
}

impl Display for StateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            StateError::InvalidAddress => write!(f, "address format is invalid"),
            StateError::AccountNotExist => write!(f, "the account does not exist"),
            StateError::NotEnoughBalance => write!(f, "not enough balance"),
            StateError::FailedToMarshalState(err) => {
                write!(f, "failed to marshal state: {}", err)
            }
            StateError::FailedToUnmarshalState => write!(f, "failed to unmarshal state"),
            StateError::Tree(err) => Display::fmt(err, f),
        }
    }
}

impl From<TreeError> for StateError {
    fn from(value: TreeError) -> Self {
        StateError::Tree(value)
    }
}

impl From<StoreError> for StateError {
    fn from(value: StoreError) -> Self {
        StateError::Tree(TreeError::Store(value))
    }
}
