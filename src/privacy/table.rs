use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

use crate::error::PrivacyError;
use crate::name::Name;
use crate::privacy::{Nonce, PrivacyEntry, DEFAULT_PRIVACY_COUNT};

pub const DEFAULT_TABLE_CAPACITY: usize = 5;

/// Bounded collection of private-request records, at most one per
/// (name, nonce) pair.
///
/// The table deliberately does not grow. When it is full and a new pair
/// arrives, one uniformly random resident record is overwritten: privacy
/// delay is a best-effort heuristic, and losing a record under load only
/// costs precision, never correctness. Invalidation removes records eagerly.
pub struct PrivacyTable {
    entries: BTreeMap<(Name, Nonce), PrivacyEntry>,
    capacity: usize,
    rng: StdRng,
}

impl PrivacyTable {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_TABLE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            capacity,
            rng: StdRng::from_entropy(),
        }
    }

    /// A table whose overflow eviction is reproducible. Intended for tests.
    pub fn seeded(capacity: usize, seed: u64) -> Self {
        Self {
            entries: BTreeMap::new(),
            capacity,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records a private request. An existing record for the same pair keeps
    /// its delay flag and only has its remaining count refreshed, so a
    /// requester re-expressing an interest cannot reset its own delay debt.
    pub fn insert(&mut self, name: Name, nonce: Nonce, privacy_count: u32) {
        if let Some(entry) = self.entry_mut(&name, nonce) {
            entry.set_privacy_count(privacy_count);
            return;
        }
        if self.capacity == 0 {
            // A table that can hold nothing drops every record; losing a
            // record costs precision, never correctness.
            trace!(name = %name, nonce = %nonce, "ptable disabled, dropping record");
            return;
        }
        if self.entries.len() >= self.capacity {
            self.evict_random();
        }
        self.entries
            .insert((name, nonce), PrivacyEntry::new(privacy_count));
    }

    pub fn insert_default(&mut self, name: Name, nonce: Nonce) {
        self.insert(name, nonce, DEFAULT_PRIVACY_COUNT);
    }

    fn evict_random(&mut self) {
        let index = self.rng.gen_range(0..self.entries.len());
        let key = self.entries.keys().nth(index).cloned();
        if let Some(key) = key {
            trace!(name = %key.0, nonce = %key.1, "ptable overflow, evicting");
            self.entries.remove(&key);
        }
    }

    /// First record with this name, regardless of nonce.
    pub fn find(&self, name: &Name) -> Option<&PrivacyEntry> {
        self.entries
            .iter()
            .find(|((n, _), _)| n == name)
            .map(|(_, entry)| entry)
    }

    /// Record for this exact (name, nonce) pair.
    pub fn find_pair(&self, name: &Name, nonce: Nonce) -> Option<&PrivacyEntry> {
        self.entries
            .iter()
            .find(|((n, nn), _)| n == name && *nn == nonce)
            .map(|(_, entry)| entry)
    }

    fn entry_mut(&mut self, name: &Name, nonce: Nonce) -> Option<&mut PrivacyEntry> {
        self.entries
            .iter_mut()
            .find(|((n, nn), _)| n == name && *nn == nonce)
            .map(|(_, entry)| entry)
    }

    /// True iff some record shares this name under a different nonce, i.e. a
    /// peer rather than this requester has a pending private interest in it.
    pub fn find_name_with_diff_nonce(&self, name: &Name, nonce: Nonce) -> bool {
        self.entries
            .keys()
            .any(|(n, nn)| n == name && *nn != nonce)
    }

    /// Whether a record for this name still owes protection.
    pub fn is_private(&self, name: &Name) -> bool {
        self.find(name).is_some_and(|entry| entry.is_private())
    }

    /// As [`is_private`](Self::is_private), but for the exact pair.
    pub fn is_private_for(&self, name: &Name, nonce: Nonce) -> bool {
        self.find_pair(name, nonce)
            .is_some_and(|entry| entry.is_private())
    }

    pub fn set_delayed(
        &mut self,
        name: &Name,
        nonce: Nonce,
        delayed: bool,
    ) -> Result<(), PrivacyError> {
        match self.entry_mut(name, nonce) {
            Some(entry) => {
                entry.set_delayed(delayed);
                Ok(())
            }
            None => Err(PrivacyError::NoSuchEntry {
                name: name.clone(),
                nonce,
            }),
        }
    }

    pub fn has_delayed(&self, name: &Name, nonce: Nonce) -> Result<bool, PrivacyError> {
        match self.find_pair(name, nonce) {
            Some(entry) => Ok(entry.is_delayed()),
            None => Err(PrivacyError::NoSuchEntry {
                name: name.clone(),
                nonce,
            }),
        }
    }

    /// Removes the record for this exact pair, if any.
    pub fn invalidate(&mut self, name: &Name, nonce: Nonce) {
        self.entries
            .retain(|(n, nn), _| !(n == name && *nn == nonce));
    }

    /// Removes every record carrying this name.
    pub fn invalidate_all(&mut self, name: &Name) {
        self.entries.retain(|(n, _), _| n != name);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Name, Nonce, &PrivacyEntry)> {
        self.entries
            .iter()
            .map(|((name, nonce), entry)| (name, *nonce, entry))
    }
}

impl Default for PrivacyTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(uri: &str) -> Name {
        Name::from_uri(uri).unwrap()
    }

    fn nonce(b: u8) -> Nonce {
        Nonce([b, 0, 0, 0])
    }

    #[test]
    fn test_insert_is_unique_per_pair() {
        let mut table = PrivacyTable::seeded(5, 1);
        table.insert_default(name("/a"), nonce(1));
        table.insert_default(name("/a"), nonce(1));
        assert_eq!(table.len(), 1);
        table.insert_default(name("/a"), nonce(2));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_reinsert_preserves_delay_flag() {
        let mut table = PrivacyTable::seeded(5, 1);
        table.insert_default(name("/a"), nonce(1));
        table.set_delayed(&name("/a"), nonce(1), true).unwrap();
        table.insert(name("/a"), nonce(1), 3);
        assert!(table.has_delayed(&name("/a"), nonce(1)).unwrap());
        assert_eq!(table.find_pair(&name("/a"), nonce(1)).unwrap().privacy_count(), 3);
    }

    #[test]
    fn test_delay_flag_requires_existing_entry() {
        let mut table = PrivacyTable::seeded(5, 1);
        let missing = PrivacyError::NoSuchEntry {
            name: name("/a"),
            nonce: nonce(1),
        };
        assert_eq!(table.has_delayed(&name("/a"), nonce(1)), Err(missing.clone()));
        assert_eq!(table.set_delayed(&name("/a"), nonce(1), true), Err(missing));
    }

    #[test]
    fn test_overflow_evicts_one_random_resident() {
        let mut table = PrivacyTable::seeded(3, 42);
        for i in 0..10u8 {
            table.insert_default(name(&format!("/n/{}", i)), nonce(i));
            assert!(table.len() <= 3);
        }
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_capacity_zero_drops_every_record() {
        let mut table = PrivacyTable::with_capacity(0);
        table.insert_default(name("/a"), nonce(1));
        table.insert(name("/b"), nonce(2), 3);
        assert!(table.is_empty());
        assert!(!table.is_private(&name("/a")));
    }

    #[test]
    fn test_peer_detection() {
        let mut table = PrivacyTable::seeded(5, 1);
        table.insert_default(name("/a"), nonce(1));
        assert!(!table.find_name_with_diff_nonce(&name("/a"), nonce(1)));
        assert!(table.find_name_with_diff_nonce(&name("/a"), nonce(2)));
        assert!(!table.find_name_with_diff_nonce(&name("/b"), nonce(2)));
    }

    #[test]
    fn test_invalidate_all_removes_every_nonce() {
        let mut table = PrivacyTable::seeded(5, 1);
        table.insert_default(name("/a"), nonce(1));
        table.insert_default(name("/a"), nonce(2));
        table.insert_default(name("/b"), nonce(3));
        table.invalidate_all(&name("/a"));
        assert_eq!(table.len(), 1);
        assert!(table.find(&name("/a")).is_none());
        assert!(table.is_private(&name("/b")));
    }
}
