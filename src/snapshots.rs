//! A bounded cache of historical rankings: block height to the active candidate list that was
//! current immediately after the commit at that height.

use lru::LruCache;
use std::num::NonZeroUsize;

use crate::types::{Candidate, Height};

pub(crate) struct SnapshotCache {
    cache: LruCache<u64, Vec<Candidate>>,
}

impl SnapshotCache {
    pub(crate) fn new(capacity: usize) -> SnapshotCache {
        let capacity = NonZeroUsize::new(capacity.max(1)).expect("capacity is at least 1");
        SnapshotCache {
            cache: LruCache::new(capacity),
        }
    }

    /// Record the ranking at `height`. Written once per successful commit.
    pub(crate) fn put(&mut self, height: Height, candidates: Vec<Candidate>) {
        self.cache.put(height.int(), candidates);
    }

    /// The ranking at `height`, if it is still cached. Reads do not refresh recency, so
    /// eviction follows insertion order; heights only ever grow, which makes the two
    /// disciplines equivalent here, and this one keeps lookups shareable across readers.
    pub(crate) fn get(&self, height: Height) -> Option<Vec<Candidate>> {
        self.cache.peek(&height.int()).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Address;

    fn snapshot(addr: &str) -> Vec<Candidate> {
        vec![Candidate::new(Address::from(addr), Vec::new(), Height::new(0))]
    }

    #[test]
    fn oldest_height_is_evicted_at_capacity() {
        let mut cache = SnapshotCache::new(2);
        cache.put(Height::new(1), snapshot("a"));
        cache.put(Height::new(2), snapshot("b"));
        cache.put(Height::new(3), snapshot("c"));

        assert!(cache.get(Height::new(1)).is_none());
        assert!(cache.get(Height::new(2)).is_some());
        assert!(cache.get(Height::new(3)).is_some());
    }
}
