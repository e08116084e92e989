//! Per-account state transitions and a bounded delegate candidate ranking for a blockchain
//! node, persisted to an authenticated key-value tree.
//!
//! The [factory](factory::StateFactory) is the entry point: feed it a block's ordered
//! transfers and votes and it atomically mutates balances, nonces, voting weights, and
//! candidacies, maintains the top-N active candidates plus a buffer of near misses, commits
//! the touched records to the tree in one batch, and snapshots the ranking under the block
//! height for historical queries.

pub mod address;

pub mod config;

pub mod factory;

pub mod state_tree;

pub mod types;

pub(crate) mod interpreters;

pub(crate) mod logging;

pub(crate) mod ranking;

pub(crate) mod snapshots;

// Re-exports
pub use config::Configuration;
pub use factory::{StateError, StateFactory};
pub use ranking::CANDIDATE_BUFFER_CAPACITY;
