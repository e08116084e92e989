/// Configuration as specified by the operator. This is split up into smaller, subsystem
/// specific config structs before being passed to components.
///
/// The buffer pool's capacity is not configurable; it is the compile-time constant
/// [`crate::CANDIDATE_BUFFER_CAPACITY`].
#[derive(Clone, Debug)]
pub struct Configuration {
    pub ranking: RankingConfig,
    pub snapshots: SnapshotConfig,
    pub tree: TreeConfig,
}

#[derive(Clone, Debug)]
pub struct RankingConfig {
    /// Capacity of the active candidate pool (the number of delegates that can be elected).
    pub num_active_candidates: usize,
}

#[derive(Clone, Debug)]
pub struct SnapshotConfig {
    /// How many historical heights the ranking snapshot cache retains.
    pub cache_capacity: usize,
}

#[derive(Clone, Debug)]
pub struct TreeConfig {
    /// Filesystem path of the persistent state tree. Ignored by the in-memory constructors.
    pub db_path: String,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            ranking: RankingConfig {
                num_active_candidates: 101,
            },
            snapshots: SnapshotConfig { cache_capacity: 10 },
            tree: TreeConfig {
                db_path: String::new(),
            },
        }
    }
}
