//! "Inert" types shared across the crate: these are passed around and inspected, but have no
//! active behavior. They follow the newtype pattern, and the API for using them is defined in
//! this module.

use borsh::{BorshDeserialize, BorshSerialize};
use num_bigint::BigUint;
use std::{
    cmp::Ordering,
    fmt::{self, Debug, Display, Formatter},
    io,
    ops::{Add, AddAssign, SubAssign},
};

/// Height of a committed block. Heights supplied to the factory are monotonically increasing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default, BorshDeserialize, BorshSerialize)]
pub struct Height(u64);

impl Height {
    pub const fn new(int: u64) -> Self {
        Self(int)
    }

    pub const fn int(&self) -> u64 {
        self.0
    }
}

impl Display for Height {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl Add<u64> for Height {
    type Output = Height;
    fn add(self, rhs: u64) -> Self::Output {
        Height::new(self.0.add(rhs))
    }
}

/// Per-account action counter. A stored `0` means the account has never acted; the first action
/// an account takes carries nonce 1. Nonces are monotone but the factory does not require them
/// to increment by exactly 1 (ordering is checked upstream, at admission).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default, BorshDeserialize, BorshSerialize)]
pub struct Nonce(u64);

impl Nonce {
    pub const fn new(int: u64) -> Self {
        Self(int)
    }

    pub const fn int(&self) -> u64 {
        self.0
    }
}

impl Display for Nonce {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// A non-negative, arbitrary-precision token amount. Used for balances, voting weights, and
/// candidate vote totals.
///
/// Serialized form is the canonical big-endian magnitude with no leading zero bytes; zero
/// serializes as the empty byte string, so a zero balance and a freshly created account's
/// balance produce identical bytes.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Tokens(BigUint);

impl Tokens {
    pub fn new(int: u64) -> Self {
        Self(BigUint::from(int))
    }

    pub fn zero() -> Self {
        Self(BigUint::default())
    }

    pub fn is_zero(&self) -> bool {
        self.0 == BigUint::default()
    }

    pub fn big(&self) -> &BigUint {
        &self.0
    }

    /// Canonical big-endian bytes. Empty for zero.
    pub fn to_be_bytes(&self) -> Vec<u8> {
        if self.is_zero() {
            Vec::new()
        } else {
            self.0.to_bytes_be()
        }
    }

    pub fn from_be_bytes(bytes: &[u8]) -> Self {
        Self(BigUint::from_bytes_be(bytes))
    }
}

impl Display for Tokens {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl AddAssign<&Tokens> for Tokens {
    fn add_assign(&mut self, rhs: &Tokens) {
        self.0 += &rhs.0;
    }
}

impl SubAssign<&Tokens> for Tokens {
    // Clamps at zero. Voting-weight detachments never exceed the attached amount in a
    // consistent state, so the clamp is unobservable there.
    fn sub_assign(&mut self, rhs: &Tokens) {
        if self.0 >= rhs.0 {
            self.0 -= &rhs.0;
        } else {
            self.0 = BigUint::default();
        }
    }
}

impl BorshSerialize for Tokens {
    fn serialize<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        self.to_be_bytes().serialize(writer)
    }
}

impl BorshDeserialize for Tokens {
    fn deserialize_reader<R: io::Read>(reader: &mut R) -> io::Result<Self> {
        let bytes = <Vec<u8>>::deserialize_reader(reader)?;
        Ok(Tokens::from_be_bytes(&bytes))
    }
}

/// The canonical string form of an account address. The empty string is a valid value meaning
/// "no address" (e.g., an account that is not voting, or an unvote action's votee).
///
/// Addresses order lexicographically; this ordering is the tie-breaker that makes every ranking
/// comparison total.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, BorshDeserialize, BorshSerialize)]
pub struct Address(String);

impl Address {
    pub fn new(string: String) -> Self {
        Self(string)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl Debug for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl From<&str> for Address {
    fn from(string: &str) -> Self {
        Self(string.to_string())
    }
}

/// The 20-byte hash of an account address, used as the account's key in the state tree.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, BorshDeserialize, BorshSerialize)]
pub struct AddressHash([u8; 20]);

impl AddressHash {
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub const fn bytes(&self) -> [u8; 20] {
        self.0
    }
}

impl Debug for AddressHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A 32-byte hash authenticating the contents of the state tree, or reserved space for a
/// future per-account storage root.
#[derive(Clone, Copy, PartialEq, Eq, Hash, BorshDeserialize, BorshSerialize)]
pub struct StateRoot([u8; 32]);

impl StateRoot {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn zero() -> Self {
        Self([0u8; 32])
    }

    pub const fn bytes(&self) -> [u8; 32] {
        self.0
    }
}

impl Debug for StateRoot {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Compare two token amounts and break ties by address, ascending on both. This is the total
/// order used everywhere candidates are ranked or listed.
pub(crate) fn cmp_votes(
    votes_a: &Tokens,
    addr_a: &Address,
    votes_b: &Tokens,
    addr_b: &Address,
) -> Ordering {
    votes_a.cmp(votes_b).then_with(|| addr_a.cmp(addr_b))
}
