//! The delegate-candidate record held by the ranking pools and returned by snapshot queries.

use std::fmt::{self, Debug, Formatter};

use super::basic::{Address, Height, Tokens};

/// A candidate in the delegate ranking. Born on self-nomination, mutated whenever an action
/// changes its vote total, removed when the account unvotes.
#[derive(Clone, PartialEq, Eq)]
pub struct Candidate {
    pub address: Address,
    /// Public key bytes copied from the self-nomination vote. Empty when the record was
    /// synthesized for a historical candidate (see the ranking module).
    pub pubkey: Vec<u8>,
    pub creation_height: Height,
    pub last_update_height: Height,
    /// Total candidate votes: the candidate account's voting weight plus its own balance while
    /// self-voting.
    pub votes: Tokens,
    // Positions in whichever heaps currently hold this candidate. Every heap operation that
    // reshuffles elements rewrites these, which is what makes O(log n) removal of arbitrary
    // elements possible.
    pub(crate) min_index: usize,
    pub(crate) max_index: usize,
}

impl Candidate {
    /// A record born from a self-nomination vote.
    pub(crate) fn new(address: Address, pubkey: Vec<u8>, height: Height) -> Candidate {
        Candidate {
            address,
            pubkey,
            creation_height: height,
            last_update_height: height,
            votes: Tokens::zero(),
            min_index: 0,
            max_index: 0,
        }
    }

    /// A record synthesized for a candidate the ranking no longer holds, e.g. one evicted from
    /// the buffer pool and later touched again by a transfer. Carries no pubkey.
    pub(crate) fn synthesized(address: Address, height: Height) -> Candidate {
        Candidate::new(address, Vec::new(), height)
    }
}

impl Debug for Candidate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.votes)
    }
}
