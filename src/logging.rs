//! Functions that log out state factory events.
//!
//! The factory logs using the [log](https://docs.rs/log/latest/log/) crate. To get these
//! messages printed onto a terminal or to a file, set up a
//! [logging implementation](https://docs.rs/log/latest/log/#available-logging-implementations).
//!
//! Log messages are CSVs (Comma Separated Values) with at least two values. The first two
//! values are always:
//! 1. The name of the event in PascalCase (defined in this module as constants).
//! 2. The time the event was emitted (as number of seconds since the Unix Epoch).

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use std::time::SystemTime;

use crate::types::{Address, Height, StateRoot};

// Names of each event in PascalCase for printing:
pub const CREATE_STATE: &str = "CreateState";
pub const COMMIT_STATE: &str = "CommitState";
pub const SNAPSHOT_RANKING: &str = "SnapshotRanking";
pub const BUFFER_DESYNC: &str = "BufferDesync";

pub(crate) fn log_create_state(address: &Address) {
    log::info!(
        "{}, {}, {}",
        CREATE_STATE,
        secs_since_unix_epoch(),
        address
    )
}

pub(crate) fn log_commit(height: Height, staged_accounts: usize, root: &StateRoot) {
    log::info!(
        "{}, {}, {}, {}, {}",
        COMMIT_STATE,
        secs_since_unix_epoch(),
        height,
        staged_accounts,
        short_base64(&root.bytes())
    )
}

pub(crate) fn log_snapshot(height: Height, active_len: usize) {
    log::info!(
        "{}, {}, {}, {}",
        SNAPSHOT_RANKING,
        secs_since_unix_epoch(),
        height,
        active_len
    )
}

// The paired buffer heaps disagreeing in size is a bug, not a failure; it is logged and the
// current call proceeds.
pub(crate) fn log_buffer_desync(min_len: usize, max_len: usize) {
    log::warn!(
        "{}, {}, {}, {}",
        BUFFER_DESYNC,
        secs_since_unix_epoch(),
        min_len,
        max_len
    )
}

// Hashes are too long to log whole; seven base64 characters are enough to eyeball.
fn short_base64(bytes: &[u8]) -> String {
    let mut encoded = STANDARD_NO_PAD.encode(bytes);
    encoded.truncate(7);
    encoded
}

// A clock set before the Unix epoch logs as 0 rather than tearing down the commit path.
fn secs_since_unix_epoch() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
}
