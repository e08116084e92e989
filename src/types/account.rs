//! The per-address state record and its deterministic byte encoding.
//!
//! The encoded bytes are what the state tree stores as values and what the tree's
//! authentication hashes over, so the encoding must be total and deterministic: two records
//! with identical field values always produce identical bytes. Borsh gives us that.

use borsh::{BorshDeserialize, BorshSerialize};
use std::io;

use super::basic::{Address, Nonce, StateRoot, Tokens};

/// State of a single account.
#[derive(Clone, Debug, PartialEq, Eq, BorshDeserialize, BorshSerialize)]
pub struct Account {
    /// Monotonically non-decreasing action counter. 0 means the account has never acted.
    pub nonce: Nonce,
    pub balance: Tokens,
    /// Reserved for contract storage. Always zero for plain accounts.
    pub storage_root: StateRoot,
    /// None for plain accounts.
    pub code_hash: Option<Vec<u8>>,
    /// True from the account's self-nomination until it unvotes.
    pub is_candidate: bool,
    /// Sum of the balances of *other* accounts whose votee is this account. The account's own
    /// balance is never included here.
    pub voting_weight: Tokens,
    /// The address this account delegates its balance-weighted vote to. Empty when not voting.
    pub votee: Address,
}

impl Account {
    /// A fresh record holding `balance` and nothing else.
    pub fn new(balance: Tokens) -> Account {
        Account {
            nonce: Nonce::new(0),
            balance,
            storage_root: StateRoot::zero(),
            code_hash: None,
            is_candidate: false,
            voting_weight: Tokens::zero(),
            votee: Address::default(),
        }
    }

    /// Total candidate votes: voting weight, plus the account's own balance if it votes for
    /// itself. This is the key used in every ranking comparison.
    pub fn total_votes(&self, address: &Address) -> Tokens {
        let mut total = self.voting_weight.clone();
        if &self.votee == address {
            total += &self.balance;
        }
        total
    }

    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        self.try_to_vec()
    }

    /// Inverse of [`Account::to_bytes`] on its range. The empty byte string is rejected so
    /// that "tree had no entry" and "entry exists but corrupt" stay distinguishable, as are
    /// trailing bytes.
    pub fn from_bytes(bytes: &[u8]) -> io::Result<Account> {
        if bytes.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "empty account record",
            ));
        }
        let mut rest = bytes;
        let account = Account::deserialize(&mut rest)?;
        if !rest.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "trailing bytes after account record",
            ));
        }
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_roundtrip() {
        let mut account = Account::new(Tokens::new(0));
        account.nonce = Nonce::new(0x10);
        let bytes = account.to_bytes().unwrap();
        assert!(!bytes.is_empty());

        let decoded = Account::from_bytes(&bytes).unwrap();
        assert!(decoded.balance.is_zero());
        assert_eq!(Nonce::new(0x10), decoded.nonce);
        assert_eq!(StateRoot::zero(), decoded.storage_root);
        assert_eq!(None, decoded.code_hash);
        assert_eq!(account, decoded);
    }

    #[test]
    fn zero_balance_encodes_like_fresh_record() {
        let fresh = Account::new(Tokens::zero());
        let mut drained = Account::new(Tokens::new(42));
        drained.balance = Tokens::zero();
        assert_eq!(fresh.to_bytes().unwrap(), drained.to_bytes().unwrap());
    }

    #[test]
    fn decode_rejects_empty_and_garbage() {
        assert!(Account::from_bytes(&[]).is_err());
        assert!(Account::from_bytes(&[0xff]).is_err());

        let mut bytes = Account::new(Tokens::new(7)).to_bytes().unwrap();
        bytes.push(0);
        assert!(Account::from_bytes(&bytes).is_err());
    }

    #[test]
    fn total_votes_counts_own_balance_only_when_self_voting() {
        let address = Address::from("sf00");
        let mut account = Account::new(Tokens::new(70));
        account.voting_weight = Tokens::new(5);

        assert_eq!(Tokens::new(5), account.total_votes(&address));

        account.votee = address.clone();
        assert_eq!(Tokens::new(75), account.total_votes(&address));

        account.votee = Address::from("sf01");
        assert_eq!(Tokens::new(5), account.total_votes(&address));
    }
}
