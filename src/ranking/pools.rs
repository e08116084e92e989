//! The two-tier delegate candidate ranking: an active pool holding the top-N candidates and a
//! buffer pool holding the next-best B, kept consistent under arbitrary updates and removals.
//!
//! The active pool is a min-heap (its top is the weakest active candidate, the one a stronger
//! entrant displaces). The buffer pool is a pair of heaps over the same candidates: a min-heap
//! to find the weakest buffered candidate for eviction, and a max-heap to find the strongest
//! for promotion when an active slot opens. After every mutation the [`balance`] loop restores
//! the global invariant: every active candidate has votes >= every buffered candidate, with
//! ties keeping the current holder.

use std::collections::HashMap;

use crate::logging;
use crate::types::basic::cmp_votes;
use crate::types::{Address, Candidate, Height, Tokens};

use super::heap::{CandidateHeap, HeapOrd};

/// Capacity of the buffer pool.
pub const CANDIDATE_BUFFER_CAPACITY: usize = 100;

enum Pool {
    Active(usize),
    Buffer(usize),
    Neither,
}

pub(crate) struct DelegateRanking {
    candidates: HashMap<Address, Candidate>,
    active: CandidateHeap,
    buffer_min: CandidateHeap,
    buffer_max: CandidateHeap,
}

impl DelegateRanking {
    pub(crate) fn new(active_capacity: usize) -> DelegateRanking {
        DelegateRanking::with_capacities(active_capacity, CANDIDATE_BUFFER_CAPACITY)
    }

    pub(crate) fn with_capacities(active_capacity: usize, buffer_capacity: usize) -> DelegateRanking {
        DelegateRanking {
            candidates: HashMap::new(),
            active: CandidateHeap::new(HeapOrd::Min, active_capacity),
            buffer_min: CandidateHeap::new(HeapOrd::Min, buffer_capacity),
            buffer_max: CandidateHeap::new(HeapOrd::Max, buffer_capacity),
        }
    }

    /// Set a candidate's vote total and re-place it in the pools. `template` is the record
    /// created by this commit's self-nomination, if any; it is used only when the ranking does
    /// not already hold a record for `address`. A candidate the ranking has never seen (or has
    /// evicted) and for which no template exists gets a synthesized record carrying no pubkey.
    pub(crate) fn update_candidate(
        &mut self,
        address: &Address,
        votes: Tokens,
        height: Height,
        template: Option<Candidate>,
    ) {
        if !self.candidates.contains_key(address) {
            let record =
                template.unwrap_or_else(|| Candidate::synthesized(address.clone(), height));
            self.candidates.insert(address.clone(), record);
        }
        let candidate = self
            .candidates
            .get_mut(address)
            .expect("candidate record was just ensured");
        candidate.votes = votes.clone();
        candidate.last_update_height = height;

        match self.pool_of(address) {
            Pool::Active(index) => {
                self.active.sift(index, &mut self.candidates);
            }
            Pool::Buffer(index) => {
                self.buffer_min.sift(index, &mut self.candidates);
                let max_index = self.candidates[address].max_index;
                self.buffer_max.sift(max_index, &mut self.candidates);
            }
            Pool::Neither => self.place_entrant(address.clone(), &votes),
        }

        self.balance();
        self.check_buffer_sync();
    }

    /// Remove a candidate from whichever pool holds it, promoting the strongest buffered
    /// candidate if an active slot opened. Removing an unknown address is a no-op.
    pub(crate) fn remove_candidate(&mut self, address: &Address) {
        match self.pool_of(address) {
            Pool::Active(index) => {
                self.active.remove_at(index, &mut self.candidates);
                self.candidates.remove(address);
                if let Some(promoted) = self.buffer_max.pop(&mut self.candidates) {
                    let min_index = self.candidates[&promoted].min_index;
                    self.buffer_min.remove_at(min_index, &mut self.candidates);
                    self.active.push(promoted, &mut self.candidates);
                }
            }
            Pool::Buffer(index) => {
                let max_index = self.candidates[address].max_index;
                self.buffer_min.remove_at(index, &mut self.candidates);
                self.buffer_max.remove_at(max_index, &mut self.candidates);
                self.candidates.remove(address);
            }
            Pool::Neither => {}
        }

        self.balance();
        self.check_buffer_sync();
    }

    /// The active pool, sorted ascending by (votes, address).
    pub(crate) fn active_sorted(&self) -> Vec<Candidate> {
        self.sorted(self.active.addresses())
    }

    /// The buffer pool, sorted ascending by (votes, address).
    pub(crate) fn buffer_sorted(&self) -> Vec<Candidate> {
        self.sorted(self.buffer_min.addresses())
    }

    // A candidate in neither pool: try the active pool first, then push whatever fell out
    // (the entrant itself, or the displaced active minimum) into the buffer, evicting the
    // buffer minimum on overflow. A candidate that fits nowhere is forgotten entirely.
    fn place_entrant(&mut self, address: Address, votes: &Tokens) {
        let mut transit = Some(address);
        if self.active.should_take(votes, &self.candidates) {
            let entrant = transit.take().expect("entrant present on first placement");
            self.active.push(entrant, &mut self.candidates);
            if self.active.len() > self.active.capacity() {
                transit = self.active.pop(&mut self.candidates);
            }
        }
        if let Some(buffered) = transit {
            let buffered_votes = self.candidates[&buffered].votes.clone();
            if self.buffer_min.should_take(&buffered_votes, &self.candidates) {
                self.buffer_min.push(buffered.clone(), &mut self.candidates);
                self.buffer_max.push(buffered, &mut self.candidates);
                if self.buffer_min.len() > self.buffer_min.capacity() {
                    if let Some(evicted) = self.buffer_min.pop(&mut self.candidates) {
                        let max_index = self.candidates[&evicted].max_index;
                        self.buffer_max.remove_at(max_index, &mut self.candidates);
                        self.candidates.remove(&evicted);
                    }
                }
            } else {
                self.candidates.remove(&buffered);
            }
        }
    }

    // Swap the weakest active candidate with the strongest buffered candidate for as long as
    // the latter strictly beats the former on votes. One iteration suffices after a single
    // update or removal, but the loop runs to fixpoint regardless.
    fn balance(&mut self) {
        loop {
            let inverted = match (self.active.top(), self.buffer_max.top()) {
                (Some(weakest_active), Some(strongest_buffered)) => {
                    self.candidates[weakest_active].votes
                        < self.candidates[strongest_buffered].votes
                }
                _ => false,
            };
            if !inverted {
                return;
            }

            let demoted = self
                .active
                .pop(&mut self.candidates)
                .expect("active pool is non-empty");
            let promoted = self
                .buffer_max
                .pop(&mut self.candidates)
                .expect("buffer pool is non-empty");
            let min_index = self.candidates[&promoted].min_index;
            self.buffer_min.remove_at(min_index, &mut self.candidates);
            self.active.push(promoted, &mut self.candidates);
            self.buffer_min.push(demoted.clone(), &mut self.candidates);
            self.buffer_max.push(demoted, &mut self.candidates);
        }
    }

    fn pool_of(&self, address: &Address) -> Pool {
        if let Some(index) = self.active.position(address) {
            return Pool::Active(index);
        }
        if let Some(index) = self.buffer_min.position(address) {
            return Pool::Buffer(index);
        }
        Pool::Neither
    }

    fn sorted(&self, addresses: &[Address]) -> Vec<Candidate> {
        let mut list: Vec<Candidate> = addresses
            .iter()
            .map(|address| self.candidates[address].clone())
            .collect();
        list.sort_by(|a, b| cmp_votes(&a.votes, &a.address, &b.votes, &b.address));
        list
    }

    fn check_buffer_sync(&self) {
        if self.buffer_min.len() != self.buffer_max.len() {
            logging::log_buffer_desync(self.buffer_min.len(), self.buffer_max.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn update(ranking: &mut DelegateRanking, addr: &str, votes: u64) {
        let address = Address::from(addr);
        let template = Candidate::new(address.clone(), Vec::new(), Height::new(0));
        ranking.update_candidate(&address, Tokens::new(votes), Height::new(0), Some(template));
    }

    fn vote_form(list: Vec<Candidate>) -> HashSet<String> {
        list.iter()
            .map(|c| format!("{}:{}", c.address, c.votes))
            .collect()
    }

    fn assert_pools(ranking: &DelegateRanking, active: &[&str], buffer: &[&str]) {
        let expected_active: HashSet<String> = active.iter().map(|s| s.to_string()).collect();
        let expected_buffer: HashSet<String> = buffer.iter().map(|s| s.to_string()).collect();
        assert_eq!(expected_active, vote_form(ranking.active_sorted()));
        assert_eq!(expected_buffer, vote_form(ranking.buffer_sorted()));
    }

    // Updates over two active slots and three buffer slots, driving every placement path:
    // in-place re-sort, entry with displacement, buffer eviction, and active/buffer swaps.
    #[test]
    fn update_sequence_with_promotion_and_eviction() {
        let mut ranking = DelegateRanking::with_capacities(2, 3);

        update(&mut ranking, "a1", 1);
        assert_pools(&ranking, &["a1:1"], &[]);

        update(&mut ranking, "a1", 2);
        assert_pools(&ranking, &["a1:2"], &[]);

        update(&mut ranking, "a2", 2);
        assert_pools(&ranking, &["a1:2", "a2:2"], &[]);

        update(&mut ranking, "a3", 3);
        assert_pools(&ranking, &["a2:2", "a3:3"], &["a1:2"]);

        update(&mut ranking, "a4", 4);
        assert_pools(&ranking, &["a3:3", "a4:4"], &["a1:2", "a2:2"]);

        update(&mut ranking, "a2", 1);
        assert_pools(&ranking, &["a3:3", "a4:4"], &["a1:2", "a2:1"]);

        update(&mut ranking, "a5", 5);
        assert_pools(&ranking, &["a4:4", "a5:5"], &["a1:2", "a2:1", "a3:3"]);

        update(&mut ranking, "a2", 9);
        assert_pools(&ranking, &["a2:9", "a5:5"], &["a1:2", "a3:3", "a4:4"]);

        update(&mut ranking, "a6", 6);
        assert_pools(&ranking, &["a2:9", "a6:6"], &["a3:3", "a4:4", "a5:5"]);

        update(&mut ranking, "a1", 10);
        assert_pools(&ranking, &["a1:10", "a2:9"], &["a4:4", "a5:5", "a6:6"]);

        update(&mut ranking, "a7", 7);
        assert_pools(&ranking, &["a1:10", "a2:9"], &["a5:5", "a6:6", "a7:7"]);

        update(&mut ranking, "a3", 8);
        assert_pools(&ranking, &["a1:10", "a2:9"], &["a3:8", "a6:6", "a7:7"]);

        update(&mut ranking, "a8", 12);
        assert_pools(&ranking, &["a1:10", "a8:12"], &["a2:9", "a3:8", "a7:7"]);

        update(&mut ranking, "a4", 8);
        assert_pools(&ranking, &["a1:10", "a8:12"], &["a2:9", "a3:8", "a4:8"]);

        update(&mut ranking, "a6", 7);
        assert_pools(&ranking, &["a1:10", "a8:12"], &["a2:9", "a3:8", "a4:8"]);

        update(&mut ranking, "a1", 1);
        assert_pools(&ranking, &["a2:9", "a8:12"], &["a3:8", "a4:8", "a1:1"]);

        update(&mut ranking, "a9", 2);
        assert_pools(&ranking, &["a2:9", "a8:12"], &["a3:8", "a4:8", "a9:2"]);

        update(&mut ranking, "a10", 8);
        assert_pools(&ranking, &["a2:9", "a8:12"], &["a10:8", "a3:8", "a4:8"]);

        update(&mut ranking, "a11", 3);
        assert_pools(&ranking, &["a2:9", "a8:12"], &["a10:8", "a3:8", "a4:8"]);

        update(&mut ranking, "a12", 1);
        assert_pools(&ranking, &["a2:9", "a8:12"], &["a10:8", "a3:8", "a4:8"]);
    }

    #[test]
    fn removing_an_active_candidate_promotes_the_buffer_maximum() {
        let mut ranking = DelegateRanking::with_capacities(2, 3);
        for (addr, votes) in [("a1", 10), ("a2", 20), ("a3", 5), ("a4", 8)] {
            update(&mut ranking, addr, votes);
        }
        assert_pools(&ranking, &["a1:10", "a2:20"], &["a3:5", "a4:8"]);

        ranking.remove_candidate(&Address::from("a2"));
        assert_pools(&ranking, &["a1:10", "a4:8"], &["a3:5"]);
    }

    #[test]
    fn removing_a_buffered_candidate_leaves_the_active_pool_alone() {
        let mut ranking = DelegateRanking::with_capacities(2, 3);
        for (addr, votes) in [("a1", 10), ("a2", 20), ("a3", 5), ("a4", 8)] {
            update(&mut ranking, addr, votes);
        }

        ranking.remove_candidate(&Address::from("a4"));
        assert_pools(&ranking, &["a1:10", "a2:20"], &["a3:5"]);

        ranking.remove_candidate(&Address::from("nobody"));
        assert_pools(&ranking, &["a1:10", "a2:20"], &["a3:5"]);
    }

    #[test]
    fn equal_votes_do_not_displace_the_current_holder() {
        let mut ranking = DelegateRanking::with_capacities(1, 1);
        update(&mut ranking, "a1", 5);
        update(&mut ranking, "a2", 5);
        assert_pools(&ranking, &["a1:5"], &["a2:5"]);

        // A tie against the buffered candidate keeps the newcomer out entirely.
        update(&mut ranking, "a3", 5);
        assert_pools(&ranking, &["a1:5"], &["a2:5"]);
    }

    #[test]
    fn synthesized_update_for_an_unknown_candidate_enters_the_pools() {
        let mut ranking = DelegateRanking::with_capacities(2, 3);
        ranking.update_candidate(&Address::from("a1"), Tokens::new(4), Height::new(9), None);

        let active = ranking.active_sorted();
        assert_eq!(1, active.len());
        assert!(active[0].pubkey.is_empty());
        assert_eq!(Height::new(9), active[0].creation_height);
    }
}
