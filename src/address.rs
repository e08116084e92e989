//! Canonical address strings and their 20-byte account hashes.
//!
//! An address string is the prefix `"sf"` followed by the lowercase hex encoding of the
//! account hash, which is the first 20 bytes of the SHA-256 digest of the account's public
//! key. The factory only ever needs the reverse direction: [`hash_of`] recovers the account
//! hash from the string, and a `None` result is what callers surface as an invalid-address
//! error.

use ed25519_dalek::VerifyingKey;
use sha2::{Digest, Sha256};

use crate::types::{Address, AddressHash};

/// Prefix of every canonical address string.
pub const ADDRESS_PREFIX: &str = "sf";

const HASH_LEN: usize = 20;

/// Recover the 20-byte account hash from a canonical address string. Returns `None` if the
/// string is malformed.
pub fn hash_of(address: &Address) -> Option<AddressHash> {
    let hex_part = address.as_str().strip_prefix(ADDRESS_PREFIX)?;
    let decoded = hex::decode(hex_part).ok()?;
    if decoded.len() != HASH_LEN {
        return None;
    }
    let mut bytes = [0u8; HASH_LEN];
    bytes.copy_from_slice(&decoded);
    Some(AddressHash::new(bytes))
}

/// Derive the canonical address of an Ed25519 public key.
pub fn from_verifying_key(key: &VerifyingKey) -> Address {
    from_pubkey_bytes(key.as_bytes())
}

/// Derive the canonical address of arbitrary public key bytes.
pub fn from_pubkey_bytes(pubkey: &[u8]) -> Address {
    let digest = Sha256::digest(pubkey);
    let mut bytes = [0u8; HASH_LEN];
    bytes.copy_from_slice(&digest[..HASH_LEN]);
    Address::new(format!("{}{}", ADDRESS_PREFIX, hex::encode(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_addresses_roundtrip() {
        let address = from_pubkey_bytes(b"some public key");
        let hash = hash_of(&address).unwrap();
        assert_eq!(
            address.as_str(),
            format!("{}{}", ADDRESS_PREFIX, hex::encode(hash.bytes()))
        );
    }

    #[test]
    fn malformed_addresses_are_rejected() {
        assert!(hash_of(&Address::from("")).is_none());
        assert!(hash_of(&Address::from("bogus")).is_none());
        assert!(hash_of(&Address::from("sf1234")).is_none());
        assert!(hash_of(&Address::from("sfzz11223344556677889900112233445566778899")).is_none());
    }
}
