use std::collections::BTreeSet;

use tracing::{debug, trace};

use crate::error::PrivacyError;
use crate::name::Name;
use crate::privacy::{Nonce, PrivacyEntry, PrivacyTable};

/// Composes the privacy table with the set of publicly-known names and
/// exposes the decisions the gate needs.
///
/// Not a process-wide singleton: one instance is constructed by the caller
/// and handed to the content store, so each store (and each test) gets
/// isolated privacy state.
pub struct PrivacyManager {
    table: PrivacyTable,
    public_names: BTreeSet<String>,
}

impl PrivacyManager {
    pub fn new() -> Self {
        Self::with_table(PrivacyTable::new())
    }

    pub fn with_table(table: PrivacyTable) -> Self {
        Self {
            table,
            public_names: BTreeSet::new(),
        }
    }

    pub fn insert_pentry(&mut self, name: Name, nonce: Nonce) {
        self.table.insert_default(name, nonce);
    }

    pub fn insert_pentry_with_count(&mut self, name: Name, nonce: Nonce, privacy_count: u32) {
        self.table.insert(name, nonce, privacy_count);
    }

    pub fn find_pentry(&self, name: &Name, nonce: Nonce) -> Option<&PrivacyEntry> {
        self.table.find_pair(name, nonce)
    }

    /// Whether any record for this name still owes protection.
    pub fn is_name_private(&self, name: &Name) -> bool {
        self.table.is_private(name)
    }

    pub fn is_name_private_for(&self, name: &Name, nonce: Nonce) -> bool {
        self.table.is_private_for(name, nonce)
    }

    /// True if another requester has an outstanding private interest in the
    /// name.
    pub fn peer_check(&self, name: &Name, nonce: Nonce) -> bool {
        self.table.find_name_with_diff_nonce(name, nonce)
    }

    pub fn set_delayed(
        &mut self,
        name: &Name,
        nonce: Nonce,
        delayed: bool,
    ) -> Result<(), PrivacyError> {
        self.table.set_delayed(name, nonce, delayed)
    }

    pub fn has_delayed(&self, name: &Name, nonce: Nonce) -> Result<bool, PrivacyError> {
        self.table.has_delayed(name, nonce)
    }

    /// Marks the name as observably public: every private record for it is
    /// dropped, so no further delay is owed on its behalf.
    pub fn invalidate_all(&mut self, name: &Name) {
        debug!(name = %name, "invalidating private records");
        self.table.invalidate_all(name);
    }

    pub fn publist_insert(&mut self, name: &Name) {
        self.public_names.insert(name.to_uri());
    }

    pub fn is_public(&self, name: &Name) -> bool {
        self.public_names.contains(&name.to_uri())
    }

    pub fn table(&self) -> &PrivacyTable {
        &self.table
    }

    /// Debug enumeration of the table and the public-name set.
    pub fn dump(&self) {
        debug!("dump privacy table");
        for (name, nonce, entry) in self.table.iter() {
            trace!(
                name = %name,
                nonce = %nonce,
                privacy_count = entry.privacy_count(),
                delayed = entry.is_delayed(),
                "pentry"
            );
        }
        debug!("dump public names");
        for name in &self.public_names {
            trace!(name = %name, "public");
        }
    }
}

impl Default for PrivacyManager {
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
    fn test_public_name_set_membership() {
        let mut manager = PrivacyManager::new();
        assert!(!manager.is_public(&name("/a")));
        manager.publist_insert(&name("/a"));
        assert!(manager.is_public(&name("/a")));
        assert!(!manager.is_public(&name("/a/b")));
    }

    #[test]
    fn test_peer_check_distinguishes_nonces() {
        let mut manager = PrivacyManager::new();
        manager.insert_pentry(name("/a"), nonce(1));
        assert!(!manager.peer_check(&name("/a"), nonce(1)));
        assert!(manager.peer_check(&name("/a"), nonce(2)));
    }

    #[test]
    fn test_invalidate_all_clears_privacy() {
        let mut manager = PrivacyManager::new();
        manager.insert_pentry(name("/a"), nonce(1));
        manager.insert_pentry(name("/a"), nonce(2));
        assert!(manager.is_name_private(&name("/a")));
        manager.invalidate_all(&name("/a"));
        assert!(!manager.is_name_private(&name("/a")));
        assert!(!manager.peer_check(&name("/a"), nonce(3)));
    }

    #[test]
    fn test_zero_count_record_is_not_private() {
        let mut manager = PrivacyManager::new();
        manager.insert_pentry_with_count(name("/a"), nonce(1), 0);
        assert!(!manager.is_name_private(&name("/a")));
        assert!(!manager.is_name_private_for(&name("/a"), nonce(1)));
        // The record still exists, so the delay flag remains addressable.
        assert_eq!(manager.has_delayed(&name("/a"), nonce(1)), Ok(false));
    }
}
