//! Helpers shared by the integration tests: fresh account identities, a logger, and the
//! "address:votes" set form that pool assertions compare with.

use std::collections::HashSet;
use std::{io, sync::Once, thread};

use ed25519_dalek::SigningKey;
use log::LevelFilter;
use rand_core::OsRng;

use state_factory_rs::address;
use state_factory_rs::types::{Address, Candidate};

/// A freshly minted identity: a canonical address and the public key it was derived from.
pub struct TestAccount {
    pub address: Address,
    pub pubkey: Vec<u8>,
}

pub fn fresh_account() -> TestAccount {
    let keypair = SigningKey::generate(&mut OsRng);
    let verifying_key = keypair.verifying_key();
    TestAccount {
        address: address::from_verifying_key(&verifying_key),
        pubkey: verifying_key.as_bytes().to_vec(),
    }
}

static LOGGER_INIT: Once = Once::new();

// Set up a logger that logs all log messages with level `level` and above.
pub fn setup_logger(level: LevelFilter) {
    LOGGER_INIT.call_once(|| {
        fern::Dispatch::new()
            .format(|out, message, record| {
                out.finish(format_args!(
                    "[{:?}][{}] {}",
                    thread::current().id(),
                    record.level(),
                    message
                ))
            })
            .level(level)
            .chain(io::stdout())
            .apply()
            .unwrap();
    })
}

/// Render a candidate list as a set of "address:votes" strings. Pool contents are compared as
/// sets: which addresses are in which pool with which totals, not their heap layout.
pub fn vote_form(candidates: &[Candidate]) -> HashSet<String> {
    candidates
        .iter()
        .map(|candidate| format!("{}:{}", candidate.address, candidate.votes))
        .collect()
}
