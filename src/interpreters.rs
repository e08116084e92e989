//! The per-commit scratch state and the two action interpreters that mutate it.
//!
//! A transfer moves balance, and balance is the weight each voter contributes to its votee, so
//! both interpreters keep the votee weights in sync as balances move, without ever traversing
//! the candidate set: each weight adjustment touches exactly the accounts named by the action
//! and their current votees.

use std::collections::HashMap;

use crate::factory::{load_account, StateError};
use crate::state_tree::{KVStore, StateTree};
use crate::types::{Account, Address, Candidate, Height, Tokens, Transfer, Vote};

/// The scratch state of one commit: every account and candidate record modified so far.
///
/// `accounts` doubles as a write buffer and a memoized read: the first reference to an address
/// loads it from the tree, and an address the tree has never seen gets a zero-balance record.
/// This is the only place where a read auto-creates. The scratch never outlives its commit.
pub(crate) struct Scratch {
    pub(crate) accounts: HashMap<Address, Account>,
    pub(crate) candidates: HashMap<Address, Candidate>,
}

impl Scratch {
    pub(crate) fn new() -> Scratch {
        Scratch {
            accounts: HashMap::new(),
            candidates: HashMap::new(),
        }
    }

    /// The mutable record for `address`, read through from `tree` on first reference.
    pub(crate) fn load<'s, K: KVStore>(
        &'s mut self,
        tree: &StateTree<K>,
        address: &Address,
    ) -> Result<&'s mut Account, StateError> {
        if !self.accounts.contains_key(address) {
            let account = match load_account(tree, address) {
                Ok(account) => account,
                Err(StateError::AccountNotExist) => Account::new(Tokens::zero()),
                Err(err) => return Err(err),
            };
            self.accounts.insert(address.clone(), account);
        }
        Ok(self
            .accounts
            .get_mut(address)
            .expect("record was just ensured"))
    }
}

/// Apply one transfer to the scratch state.
///
/// Non-coinbase transfers debit the sender (failing the block if the balance does not cover
/// the amount), raise its nonce to the transfer's if higher, and move the amount out of the
/// sender's votee's weight. Every transfer credits the recipient and moves the amount into the
/// recipient's votee's weight. Self-directed votees are skipped on both sides: a self-voter's
/// own balance is counted at ranking time, not stored in its weight.
pub(crate) fn apply_transfer<K: KVStore>(
    scratch: &mut Scratch,
    tree: &StateTree<K>,
    transfer: &Transfer,
) -> Result<(), StateError> {
    if !transfer.is_coinbase {
        let sender = scratch.load(tree, &transfer.sender)?;
        if transfer.amount > sender.balance {
            return Err(StateError::NotEnoughBalance);
        }
        sender.balance -= &transfer.amount;
        if transfer.nonce > sender.nonce {
            sender.nonce = transfer.nonce;
        }
        let sender_votee = sender.votee.clone();
        if !sender_votee.is_empty() && sender_votee != transfer.sender {
            let votee = scratch.load(tree, &sender_votee)?;
            votee.voting_weight -= &transfer.amount;
        }
    }

    let recipient = scratch.load(tree, &transfer.recipient)?;
    recipient.balance += &transfer.amount;
    let recipient_votee = recipient.votee.clone();
    if !recipient_votee.is_empty() && recipient_votee != transfer.recipient {
        let votee = scratch.load(tree, &recipient_votee)?;
        votee.voting_weight += &transfer.amount;
    }

    Ok(())
}

/// Apply one vote to the scratch state.
///
/// The voter's weight is first detached from its old votee (if any, and not itself). An empty
/// votee is an unvote: candidacy is cleared and nothing is attached. A vote for another
/// account attaches the voter's balance to that account's weight without affecting the
/// voter's candidacy. A self-vote marks the voter a candidate and records the candidate
/// record for this commit, if one was not already recorded.
pub(crate) fn apply_vote<K: KVStore>(
    scratch: &mut Scratch,
    tree: &StateTree<K>,
    height: Height,
    vote: &Vote,
) -> Result<(), StateError> {
    let voter = scratch.load(tree, &vote.voter)?;
    if vote.nonce > voter.nonce {
        voter.nonce = vote.nonce;
    }
    let voter_balance = voter.balance.clone();

    let old_votee = voter.votee.clone();
    if !old_votee.is_empty() && old_votee != vote.voter {
        let detached = scratch.load(tree, &old_votee)?;
        detached.voting_weight -= &voter_balance;
        let voter = scratch.load(tree, &vote.voter)?;
        voter.votee = Address::default();
    }

    if vote.votee.is_empty() {
        let voter = scratch.load(tree, &vote.voter)?;
        voter.is_candidate = false;
        return Ok(());
    }

    if vote.voter != vote.votee {
        let votee = scratch.load(tree, &vote.votee)?;
        votee.voting_weight += &voter_balance;
        let voter = scratch.load(tree, &vote.voter)?;
        voter.votee = vote.votee.clone();
    } else {
        let voter = scratch.load(tree, &vote.voter)?;
        voter.votee = vote.voter.clone();
        voter.is_candidate = true;
        if !scratch.candidates.contains_key(&vote.voter) {
            scratch.candidates.insert(
                vote.voter.clone(),
                Candidate::new(vote.voter.clone(), vote.self_pubkey.clone(), height),
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address;
    use crate::state_tree::MemKVStore;

    fn tree() -> StateTree<MemKVStore> {
        StateTree::new(MemKVStore::new()).expect("fresh in-memory tree")
    }

    fn funded(scratch: &mut Scratch, tree: &StateTree<MemKVStore>, addr: &[u8], balance: u64) -> Address {
        let address = address::from_pubkey_bytes(addr);
        scratch
            .load(tree, &address)
            .expect("auto-created record")
            .balance = Tokens::new(balance);
        address
    }

    #[test]
    fn transfer_moves_balance_and_votee_weight() {
        let tree = tree();
        let mut scratch = Scratch::new();
        let a = funded(&mut scratch, &tree, b"a", 100);
        let b = funded(&mut scratch, &tree, b"b", 50);
        let c = funded(&mut scratch, &tree, b"c", 10);

        // a votes for c; moving 40 a->b must shift 40 of c's weight away from a and none
        // toward b's (absent) votee.
        apply_vote(&mut scratch, &tree, Height::new(0), &Vote::new(1, a.clone(), c.clone(), vec![]))
            .unwrap();
        assert_eq!(Tokens::new(100), scratch.accounts[&c].voting_weight);

        apply_transfer(
            &mut scratch,
            &tree,
            &Transfer::new(2, Tokens::new(40), a.clone(), b.clone()),
        )
        .unwrap();
        assert_eq!(Tokens::new(60), scratch.accounts[&a].balance);
        assert_eq!(Tokens::new(90), scratch.accounts[&b].balance);
        assert_eq!(Tokens::new(60), scratch.accounts[&c].voting_weight);
    }

    #[test]
    fn insufficient_balance_fails_fast() {
        let tree = tree();
        let mut scratch = Scratch::new();
        let a = funded(&mut scratch, &tree, b"a", 10);
        let b = funded(&mut scratch, &tree, b"b", 0);

        let result = apply_transfer(
            &mut scratch,
            &tree,
            &Transfer::new(1, Tokens::new(11), a.clone(), b.clone()),
        );
        assert!(matches!(result, Err(StateError::NotEnoughBalance)));
        assert_eq!(Tokens::new(10), scratch.accounts[&a].balance);
        assert_eq!(Tokens::new(0), scratch.accounts[&b].balance);
    }

    #[test]
    fn coinbase_mints_without_a_sender() {
        let tree = tree();
        let mut scratch = Scratch::new();
        let b = funded(&mut scratch, &tree, b"b", 5);

        apply_transfer(&mut scratch, &tree, &Transfer::coinbase(Tokens::new(100), b.clone()))
            .unwrap();
        assert_eq!(Tokens::new(105), scratch.accounts[&b].balance);
        assert_eq!(1, scratch.accounts.len());
    }

    #[test]
    fn revote_detaches_before_attaching() {
        let tree = tree();
        let mut scratch = Scratch::new();
        let a = funded(&mut scratch, &tree, b"a", 100);
        let b = funded(&mut scratch, &tree, b"b", 0);
        let c = funded(&mut scratch, &tree, b"c", 0);

        apply_vote(&mut scratch, &tree, Height::new(0), &Vote::new(1, a.clone(), b.clone(), vec![]))
            .unwrap();
        apply_vote(&mut scratch, &tree, Height::new(0), &Vote::new(2, a.clone(), c.clone(), vec![]))
            .unwrap();

        assert_eq!(Tokens::zero(), scratch.accounts[&b].voting_weight);
        assert_eq!(Tokens::new(100), scratch.accounts[&c].voting_weight);
        assert_eq!(c, scratch.accounts[&a].votee);
    }

    #[test]
    fn stale_nonce_still_moves_weight() {
        let tree = tree();
        let mut scratch = Scratch::new();
        let a = funded(&mut scratch, &tree, b"a", 100);
        let b = funded(&mut scratch, &tree, b"b", 0);
        scratch.load(&tree, &a).unwrap().nonce = crate::types::Nonce::new(9);

        apply_vote(&mut scratch, &tree, Height::new(0), &Vote::new(3, a.clone(), b.clone(), vec![]))
            .unwrap();
        assert_eq!(crate::types::Nonce::new(9), scratch.accounts[&a].nonce);
        assert_eq!(Tokens::new(100), scratch.accounts[&b].voting_weight);
    }

    #[test]
    fn self_vote_records_a_candidate_once() {
        let tree = tree();
        let mut scratch = Scratch::new();
        let a = funded(&mut scratch, &tree, b"a", 100);

        let vote = Vote::new(1, a.clone(), a.clone(), b"pk".to_vec());
        apply_vote(&mut scratch, &tree, Height::new(3), &vote).unwrap();
        apply_vote(&mut scratch, &tree, Height::new(3), &vote).unwrap();

        assert!(scratch.accounts[&a].is_candidate);
        assert_eq!(a, scratch.accounts[&a].votee);
        assert_eq!(1, scratch.candidates.len());
        assert_eq!(b"pk".to_vec(), scratch.candidates[&a].pubkey);
        assert_eq!(Height::new(3), scratch.candidates[&a].creation_height);
    }
}
