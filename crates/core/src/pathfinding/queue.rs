//! Binary min-heap over flattened node indices with in-place decrease-key.

use std::cmp::Ordering;
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug)]
struct Entry {
    node: usize,
    priority: f64,
    tie_break: f64,
}

impl Entry {
    fn precedes(&self, other: &Entry) -> bool {
        let ordering = self
            .priority
            .total_cmp(&other.priority)
            .then(self.tie_break.total_cmp(&other.tie_break))
            .then(self.node.cmp(&other.node));
        ordering == Ordering::Less
    }
}

/// Open set for A*: lowest priority first, ties by `tie_break` then node index.
#[derive(Debug, Default)]
pub struct IndexedHeap {
    entries: Vec<Entry>,
    slots: BTreeMap<usize, usize>,
}

impl IndexedHeap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts `node`, or lowers its priority if already queued.
    /// Returns false when the node was queued with an equal or better priority.
    pub fn push_or_decrease(&mut self, node: usize, priority: f64, tie_break: f64) -> bool {
        let entry = Entry { node, priority, tie_break };
        match self.slots.get(&node) {
            Some(&slot) => {
                if !entry.precedes(&self.entries[slot]) {
                    return false;
                }
                self.entries[slot] = entry;
                self.sift_up(slot);
            }
            None => {
                self.entries.push(entry);
                let slot = self.entries.len() - 1;
                self.slots.insert(node, slot);
                self.sift_up(slot);
            }
        }
        true
    }

    /// Removes and returns the lowest-priority node with its priority.
    pub fn pop(&mut self) -> Option<(usize, f64)> {
        if self.entries.is_empty() {
            return None;
        }
        let last = self.entries.len() - 1;
        self.swap(0, last);
        let top = self.entries.pop()?;
        self.slots.remove(&top.node);
        if !self.entries.is_empty() {
            self.sift_down(0);
        }
        Some((top.node, top.priority))
    }

    fn sift_up(&mut self, mut slot: usize) {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if !self.entries[slot].precedes(&self.entries[parent]) {
                break;
            }
            self.swap(slot, parent);
            slot = parent;
        }
    }

    fn sift_down(&mut self, mut slot: usize) {
        loop {
            let left = 2 * slot + 1;
            let right = left + 1;
            let mut smallest = slot;
            if left < self.entries.len() && self.entries[left].precedes(&self.entries[smallest]) {
                smallest = left;
            }
            if right < self.entries.len() && self.entries[right].precedes(&self.entries[smallest]) {
                smallest = right;
            }
            if smallest == slot {
                break;
            }
            self.swap(slot, smallest);
            slot = smallest;
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.entries.swap(a, b);
        self.slots.insert(self.entries[a].node, a);
        self.slots.insert(self.entries[b].node, b);
    }
}

#[cfg(test)]
mod tests {
    use std::iter;

    use proptest::prelude::*;

    use super::*;

    #[test]
    fn pops_in_priority_order() {
        let mut heap = IndexedHeap::new();
        for (node, priority) in [(4, 3.0), (1, 1.5), (9, 7.25), (2, 0.5)] {
            heap.push_or_decrease(node, priority, 0.0);
        }
        let order: Vec<usize> = iter::from_fn(|| heap.pop().map(|(node, _)| node)).collect();
        assert_eq!(order, vec![2, 1, 4, 9]);
        assert!(heap.is_empty());
    }

    #[test]
    fn decrease_key_moves_node_forward_and_ignores_increases() {
        let mut heap = IndexedHeap::new();
        heap.push_or_decrease(10, 5.0, 0.0);
        heap.push_or_decrease(11, 4.0, 0.0);
        assert!(heap.push_or_decrease(10, 1.0, 0.0));
        assert!(!heap.push_or_decrease(11, 9.0, 0.0), "raising a priority is refused");
        assert_eq!(heap.len(), 2);
        assert_eq!(heap.pop(), Some((10, 1.0)));
        assert_eq!(heap.pop(), Some((11, 4.0)));
        assert!(heap.is_empty());
    }

    #[test]
    fn ties_prefer_lower_tie_break_then_lower_node() {
        let mut heap = IndexedHeap::new();
        heap.push_or_decrease(7, 2.0, 1.0);
        heap.push_or_decrease(3, 2.0, 1.0);
        heap.push_or_decrease(8, 2.0, 0.5);
        assert_eq!(heap.pop().map(|(node, _)| node), Some(8));
        assert_eq!(heap.pop().map(|(node, _)| node), Some(3));
        assert_eq!(heap.pop().map(|(node, _)| node), Some(7));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]
        #[test]
        fn pop_sequence_is_sorted(
            updates in prop::collection::vec((0_usize..40, 0_u32..1_000), 1..120)
        ) {
            let mut heap = IndexedHeap::new();
            let mut best: BTreeMap<usize, f64> = BTreeMap::new();
            for (node, raw) in updates {
                let priority = f64::from(raw);
                heap.push_or_decrease(node, priority, 0.0);
                let current = best.entry(node).or_insert(priority);
                if priority < *current {
                    *current = priority;
                }
            }

            let mut previous = f64::NEG_INFINITY;
            let mut popped = 0;
            while let Some((node, priority)) = heap.pop() {
                prop_assert!(priority >= previous);
                prop_assert_eq!(Some(&priority), best.get(&node));
                previous = priority;
                popped += 1;
            }
            prop_assert_eq!(popped, best.len());
        }
    }
}
