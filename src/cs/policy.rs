use std::collections::VecDeque;

use crate::name::Name;

/// Eviction policy contract.
///
/// The policy decides which entries to keep under its capacity limit but
/// never touches the index itself: whenever a decision point returns victim
/// names, the content store performs the removal. This keeps the index under
/// single ownership.
pub trait Policy {
    /// Updates the capacity limit, returning the names to evict to get back
    /// under it.
    fn set_limit(&mut self, limit: usize) -> Vec<Name>;

    fn get_limit(&self) -> usize;

    /// Called after a new entry is admitted; returns the names to evict.
    fn after_insert(&mut self, name: &Name) -> Vec<Name>;

    /// Called when an existing entry is refreshed in place.
    fn after_refresh(&mut self, name: &Name);

    /// Called when a lookup is about to be answered from this entry, letting
    /// recency-based policies observe access order.
    fn before_use(&mut self, name: &Name);
}

/// Plain insertion-order FIFO eviction, the default policy.
pub struct FifoPolicy {
    queue: VecDeque<Name>,
    limit: usize,
}

impl FifoPolicy {
    pub fn new(limit: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            limit,
        }
    }

    fn evict_over_limit(&mut self) -> Vec<Name> {
        let mut victims = Vec::new();
        while self.queue.len() > self.limit {
            match self.queue.pop_front() {
                Some(name) => victims.push(name),
                None => break,
            }
        }
        victims
    }
}

impl Policy for FifoPolicy {
    fn set_limit(&mut self, limit: usize) -> Vec<Name> {
        self.limit = limit;
        self.evict_over_limit()
    }

    fn get_limit(&self) -> usize {
        self.limit
    }

    fn after_insert(&mut self, name: &Name) -> Vec<Name> {
        self.queue.push_back(name.clone());
        self.evict_over_limit()
    }

    fn after_refresh(&mut self, _name: &Name) {}

    fn before_use(&mut self, _name: &Name) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(uri: &str) -> Name {
        Name::from_uri(uri).unwrap()
    }

    #[test]
    fn test_fifo_evicts_oldest_first() {
        let mut policy = FifoPolicy::new(2);
        assert!(policy.after_insert(&name("/1")).is_empty());
        assert!(policy.after_insert(&name("/2")).is_empty());
        assert_eq!(policy.after_insert(&name("/3")), vec![name("/1")]);
        assert_eq!(policy.after_insert(&name("/4")), vec![name("/2")]);
    }

    #[test]
    fn test_shrinking_limit_returns_victims() {
        let mut policy = FifoPolicy::new(3);
        policy.after_insert(&name("/1"));
        policy.after_insert(&name("/2"));
        policy.after_insert(&name("/3"));
        assert_eq!(policy.set_limit(1), vec![name("/1"), name("/2")]);
        assert_eq!(policy.get_limit(), 1);
    }
}
