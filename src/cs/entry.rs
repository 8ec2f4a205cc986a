use std::sync::Arc;

use crate::clock::Timestamp;
use crate::name::Name;
use crate::packet::{Data, Interest};

/// One cached data object, indexed by its full name.
#[derive(Clone)]
pub struct CsEntry {
    data: Arc<Data>,
    full_name: Name,
    unsolicited: bool,
    stale_at: Timestamp,
}

impl CsEntry {
    pub fn new(data: Arc<Data>, full_name: Name, unsolicited: bool, now: Timestamp) -> Self {
        let stale_at = now.adding(data.freshness_period_ms());
        Self {
            data,
            full_name,
            unsolicited,
            stale_at,
        }
    }

    pub fn data(&self) -> &Arc<Data> {
        &self.data
    }

    pub fn full_name(&self) -> &Name {
        &self.full_name
    }

    /// Whether the entry was inserted without a matching pending request.
    pub fn is_unsolicited(&self) -> bool {
        self.unsolicited
    }

    pub fn clear_unsolicited(&mut self) {
        self.unsolicited = false;
    }

    /// Recomputes the staleness deadline from the data's freshness period.
    pub fn refresh(&mut self, now: Timestamp) {
        self.stale_at = now.adding(self.data.freshness_period_ms());
    }

    pub fn is_stale(&self, now: Timestamp) -> bool {
        now > self.stale_at
    }

    /// Whether this entry can answer the interest: the interest name must be
    /// a prefix of (or equal to) the full name, and a freshness requirement
    /// must not have lapsed.
    pub fn can_satisfy(&self, interest: &Interest, now: Timestamp) -> bool {
        if !interest.name().is_prefix_of(&self.full_name) {
            return false;
        }
        if interest.must_be_fresh() && self.is_stale(now) {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ms: u64) -> Timestamp {
        Timestamp { ms_since_1970: ms }
    }

    fn entry(uri: &str, freshness_ms: u64, now: Timestamp) -> CsEntry {
        let data = Data::new(Name::from_uri(uri).unwrap(), b"x", freshness_ms).shared();
        let full_name = data.full_name();
        CsEntry::new(data, full_name, false, now)
    }

    #[test]
    fn test_staleness_is_a_passive_deadline() {
        let entry = entry("/a", 100, at(1000));
        assert!(!entry.is_stale(at(1100)));
        assert!(entry.is_stale(at(1101)));
    }

    #[test]
    fn test_refresh_recomputes_deadline() {
        let mut entry = entry("/a", 100, at(1000));
        entry.refresh(at(2000));
        assert!(!entry.is_stale(at(2100)));
    }

    #[test]
    fn test_can_satisfy_checks_prefix_and_freshness() {
        let entry = entry("/a/b", 100, at(1000));
        let exact = Interest::new(Name::from_uri("/a/b").unwrap());
        let prefix = Interest::new(Name::from_uri("/a").unwrap());
        let other = Interest::new(Name::from_uri("/c").unwrap());
        assert!(entry.can_satisfy(&exact, at(1000)));
        assert!(entry.can_satisfy(&prefix, at(1000)));
        assert!(!entry.can_satisfy(&other, at(1000)));

        let fresh = Interest::new(Name::from_uri("/a/b").unwrap()).fresh();
        assert!(entry.can_satisfy(&fresh, at(1050)));
        assert!(!entry.can_satisfy(&fresh, at(2000)));
    }
}
