//! The two action kinds a block feeds into the factory.
//!
//! These carry only the fields the state transition reads. Wire encoding, signatures, and
//! admission checks all happen upstream: by the time an action reaches the factory its form
//! and signature have already been verified.

use super::basic::{Address, Nonce, Tokens};

/// A value transfer from `sender` to `recipient`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transfer {
    pub sender: Address,
    pub recipient: Address,
    pub amount: Tokens,
    pub nonce: Nonce,
    /// Coinbase transfers mint to the recipient; the sender side is skipped entirely.
    pub is_coinbase: bool,
}

impl Transfer {
    pub fn new(nonce: u64, amount: Tokens, sender: Address, recipient: Address) -> Transfer {
        Transfer {
            sender,
            recipient,
            amount,
            nonce: Nonce::new(nonce),
            is_coinbase: false,
        }
    }

    pub fn coinbase(amount: Tokens, recipient: Address) -> Transfer {
        Transfer {
            sender: Address::default(),
            recipient,
            amount,
            nonce: Nonce::new(0),
            is_coinbase: true,
        }
    }
}

/// A delegation of `voter`'s balance-weighted vote to `votee`.
///
/// Three shapes matter to the state transition: `voter == votee` is a self-nomination (the
/// voter becomes a candidate), an empty `votee` is an unvote (the voter stops being a
/// candidate), and anything else points the voter's weight at another account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vote {
    pub voter: Address,
    pub votee: Address,
    pub nonce: Nonce,
    /// The voter's public key, recorded on the candidate record at self-nomination.
    pub self_pubkey: Vec<u8>,
}

impl Vote {
    pub fn new(nonce: u64, voter: Address, votee: Address, self_pubkey: Vec<u8>) -> Vote {
        Vote {
            voter,
            votee,
            nonce: Nonce::new(nonce),
            self_pubkey,
        }
    }
}
