//! Bounded de-duplication of broadcast groups.

use meetup_groups::GroupRecord;
use std::collections::{HashSet, VecDeque};

/// Remembered ids before the oldest are forgotten.
pub const DEFAULT_GUARD_CAPACITY: usize = 1024;

/// Remembers the most recent group ids and drops re-deliveries.
///
/// Eviction is FIFO, so an id seen long ago may be delivered again once
/// `capacity` newer ids have passed.
#[derive(Debug, Clone)]
pub struct DeliveryGuard {
    capacity: usize,
    order: VecDeque<u64>,
    seen: HashSet<u64>,
}

impl Default for DeliveryGuard {
    fn default() -> Self {
        Self::new(DEFAULT_GUARD_CAPACITY)
    }
}

impl DeliveryGuard {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            seen: HashSet::with_capacity(capacity),
        }
    }

    /// `true` the first time `id` is seen within the window.
    pub fn first_delivery(&mut self, id: u64) -> bool {
        if !self.seen.insert(id) {
            return false;
        }
        self.order.push_back(id);
        if self.order.len() > self.capacity {
            if let Some(old) = self.order.pop_front() {
                self.seen.remove(&old);
            }
        }
        true
    }

    /// Keep only groups not delivered before, preserving order.
    pub fn filter_new(&mut self, groups: Vec<GroupRecord>) -> Vec<GroupRecord> {
        groups
            .into_iter()
            .filter(|g| self.first_delivery(g.group_id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
