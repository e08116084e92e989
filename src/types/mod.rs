//! Types shared across the crate: inert newtypes, the account and candidate records, and the
//! action kinds consumed by a commit.

pub mod basic;

pub mod account;

pub mod actions;

pub mod candidate;

pub use account::Account;
pub use actions::{Transfer, Vote};
pub use basic::{Address, AddressHash, Height, Nonce, StateRoot, Tokens};
pub use candidate::Candidate;
