//! An indexed binary heap over candidate addresses.
//!
//! The ranking needs to remove and re-order arbitrary elements, not just the top, so every
//! candidate stores its position in each heap that holds it and every operation that moves an
//! element writes the new position back into the candidate record. One abstraction serves all
//! three heaps: the active pool's min-heap and the buffer pool's min-heap maintain
//! `min_index`, the buffer pool's max-heap maintains `max_index`.
//!
//! Heaps store addresses; the candidate records themselves live in a map owned by the ranking
//! and are passed into each operation. Ordering is total: by votes, then by address ascending,
//! so two heaps over the same set always agree on layout decisions.

use std::collections::HashMap;

use crate::types::basic::cmp_votes;
use crate::types::{Address, Candidate, Tokens};

const MISSING_RECORD: &str = "no candidate record for a ranked address";

#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum HeapOrd {
    /// The weakest candidate at the top. Maintains `min_index`.
    Min,
    /// The strongest candidate at the top. Maintains `max_index`.
    Max,
}

pub(crate) struct CandidateHeap {
    ord: HeapOrd,
    capacity: usize,
    slots: Vec<Address>,
}

impl CandidateHeap {
    pub(crate) fn new(ord: HeapOrd, capacity: usize) -> CandidateHeap {
        CandidateHeap {
            ord,
            capacity,
            slots: Vec::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn addresses(&self) -> &[Address] {
        &self.slots
    }

    pub(crate) fn top(&self) -> Option<&Address> {
        self.slots.first()
    }

    /// Position of `address` in this heap, scanning the slots. Pool sizes are small (at most
    /// the buffer capacity), so a scan is cheap; removal afterwards goes through the stored
    /// indices and stays logarithmic.
    pub(crate) fn position(&self, address: &Address) -> Option<usize> {
        self.slots.iter().position(|slot| slot == address)
    }

    /// Whether a candidate with `votes` belongs in this heap: there is a free slot, or the
    /// votes strictly beat the top. Ties do not displace the current holder.
    pub(crate) fn should_take(&self, votes: &Tokens, cands: &HashMap<Address, Candidate>) -> bool {
        if self.slots.len() < self.capacity {
            return true;
        }
        match self.top() {
            None => true,
            Some(top) => {
                let top_votes = &cands.get(top).expect(MISSING_RECORD).votes;
                match self.ord {
                    HeapOrd::Min => votes > top_votes,
                    HeapOrd::Max => votes < top_votes,
                }
            }
        }
    }

    /// Push `address`, which may grow the heap one past its capacity; the caller pops the top
    /// right after when it wants the capacity enforced.
    pub(crate) fn push(&mut self, address: Address, cands: &mut HashMap<Address, Candidate>) {
        self.slots.push(address);
        self.sift_up(self.slots.len() - 1, cands);
    }

    pub(crate) fn pop(&mut self, cands: &mut HashMap<Address, Candidate>) -> Option<Address> {
        if self.slots.is_empty() {
            return None;
        }
        let last = self.slots.len() - 1;
        self.slots.swap(0, last);
        let removed = self.slots.pop();
        if !self.slots.is_empty() {
            self.sift_down(0, cands);
        }
        removed
    }

    /// Remove the element at `index` (as recorded in the candidate's stored index).
    pub(crate) fn remove_at(
        &mut self,
        index: usize,
        cands: &mut HashMap<Address, Candidate>,
    ) -> Address {
        let last = self.slots.len() - 1;
        self.slots.swap(index, last);
        let removed = self.slots.pop().expect("remove_at on an empty heap");
        if index < self.slots.len() {
            self.sift(index, cands);
        }
        removed
    }

    /// Restore heap order around `index` after the element's votes changed.
    pub(crate) fn sift(&mut self, index: usize, cands: &mut HashMap<Address, Candidate>) {
        if index > 0 && self.before(index, (index - 1) / 2, cands) {
            self.sift_up(index, cands);
        } else {
            self.sift_down(index, cands);
        }
    }

    fn sift_up(&mut self, mut index: usize, cands: &mut HashMap<Address, Candidate>) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if !self.before(index, parent, cands) {
                break;
            }
            self.slots.swap(index, parent);
            self.write_index(index, cands);
            index = parent;
        }
        self.write_index(index, cands);
    }

    fn sift_down(&mut self, mut index: usize, cands: &mut HashMap<Address, Candidate>) {
        loop {
            let left = 2 * index + 1;
            let right = left + 1;
            let mut first = index;
            if left < self.slots.len() && self.before(left, first, cands) {
                first = left;
            }
            if right < self.slots.len() && self.before(right, first, cands) {
                first = right;
            }
            if first == index {
                break;
            }
            self.slots.swap(index, first);
            self.write_index(index, cands);
            index = first;
        }
        self.write_index(index, cands);
    }

    // Whether the element in slot `i` must sit above the element in slot `j`.
    fn before(&self, i: usize, j: usize, cands: &HashMap<Address, Candidate>) -> bool {
        let a = cands.get(&self.slots[i]).expect(MISSING_RECORD);
        let b = cands.get(&self.slots[j]).expect(MISSING_RECORD);
        let ordering = cmp_votes(&a.votes, &a.address, &b.votes, &b.address);
        match self.ord {
            HeapOrd::Min => ordering.is_lt(),
            HeapOrd::Max => {
                // Votes descending, address ascending.
                match a.votes.cmp(&b.votes) {
                    std::cmp::Ordering::Greater => true,
                    std::cmp::Ordering::Less => false,
                    std::cmp::Ordering::Equal => a.address < b.address,
                }
            }
        }
    }

    fn write_index(&self, position: usize, cands: &mut HashMap<Address, Candidate>) {
        let candidate = cands.get_mut(&self.slots[position]).expect(MISSING_RECORD);
        match self.ord {
            HeapOrd::Min => candidate.min_index = position,
            HeapOrd::Max => candidate.max_index = position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Height;

    fn insert(cands: &mut HashMap<Address, Candidate>, addr: &str, votes: u64) -> Address {
        let address = Address::from(addr);
        let mut candidate =
            Candidate::new(address.clone(), Vec::new(), Height::new(0));
        candidate.votes = Tokens::new(votes);
        cands.insert(address.clone(), candidate);
        address
    }

    #[test]
    fn min_heap_pops_weakest_first_with_address_tiebreak() {
        let mut cands = HashMap::new();
        let mut heap = CandidateHeap::new(HeapOrd::Min, 10);
        for (addr, votes) in [("c", 5), ("a", 3), ("b", 3), ("d", 1)] {
            let address = insert(&mut cands, addr, votes);
            heap.push(address, &mut cands);
        }

        let order: Vec<String> = std::iter::from_fn(|| heap.pop(&mut cands))
            .map(|a| a.as_str().to_string())
            .collect();
        assert_eq!(vec!["d", "a", "b", "c"], order);
    }

    #[test]
    fn max_heap_pops_strongest_first_with_address_tiebreak() {
        let mut cands = HashMap::new();
        let mut heap = CandidateHeap::new(HeapOrd::Max, 10);
        for (addr, votes) in [("c", 5), ("a", 3), ("b", 3), ("d", 7)] {
            let address = insert(&mut cands, addr, votes);
            heap.push(address, &mut cands);
        }

        let order: Vec<String> = std::iter::from_fn(|| heap.pop(&mut cands))
            .map(|a| a.as_str().to_string())
            .collect();
        assert_eq!(vec!["d", "c", "a", "b"], order);
    }

    #[test]
    fn stored_indices_track_positions_through_removal() {
        let mut cands = HashMap::new();
        let mut heap = CandidateHeap::new(HeapOrd::Min, 10);
        for (addr, votes) in [("a", 1), ("b", 2), ("c", 3), ("d", 4), ("e", 5)] {
            let address = insert(&mut cands, addr, votes);
            heap.push(address, &mut cands);
        }

        for addr in ["c", "a", "e"] {
            let address = Address::from(addr);
            let index = cands[&address].min_index;
            assert_eq!(Some(index), heap.position(&address));
            let removed = heap.remove_at(index, &mut cands);
            assert_eq!(address, removed);
            cands.remove(&address);
        }

        // Survivors still agree with their stored indices and pop in order.
        for address in heap.addresses() {
            assert_eq!(heap.position(address), Some(cands[address].min_index));
        }
        let order: Vec<String> = std::iter::from_fn(|| heap.pop(&mut cands))
            .map(|a| a.as_str().to_string())
            .collect();
        assert_eq!(vec!["b", "d"], order);
    }

    #[test]
    fn should_take_requires_strict_improvement_when_full() {
        let mut cands = HashMap::new();
        let mut heap = CandidateHeap::new(HeapOrd::Min, 2);
        for (addr, votes) in [("a", 3), ("b", 5)] {
            let address = insert(&mut cands, addr, votes);
            heap.push(address, &mut cands);
        }

        assert!(!heap.should_take(&Tokens::new(2), &cands));
        assert!(!heap.should_take(&Tokens::new(3), &cands));
        assert!(heap.should_take(&Tokens::new(4), &cands));
    }
}
