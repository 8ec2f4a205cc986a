use std::sync::Arc;

use crate::hash::{Hasher, Sha256Digest, Sha256Hasher};
use crate::name::{Name, NameComponent, NameComponentType};

/// Disambiguation rule for choosing among multiple names matching a prefix.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum ChildSelector {
    #[default]
    Leftmost,
    Rightmost,
}

/// Caching directive attached to a data object by its producer.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum CachePolicyTag {
    NoCache,
}

/// A named, cacheable content object.
#[derive(Clone, Debug)]
pub struct Data {
    name: Name,
    payload: Box<[u8]>,
    freshness_period_ms: u64,
    cache_policy: Option<CachePolicyTag>,
}

impl Data {
    pub fn new(name: Name, payload: &[u8], freshness_period_ms: u64) -> Self {
        Self {
            name,
            payload: Box::from(payload),
            freshness_period_ms,
            cache_policy: None,
        }
    }

    pub fn with_cache_policy(mut self, tag: CachePolicyTag) -> Self {
        self.cache_policy = Some(tag);
        self
    }

    pub fn shared(self) -> Arc<Data> {
        Arc::new(self)
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn freshness_period_ms(&self) -> u64 {
        self.freshness_period_ms
    }

    pub fn cache_policy(&self) -> Option<CachePolicyTag> {
        self.cache_policy
    }

    /// The name extended with the implicit SHA-256 digest component, which is
    /// what the content store indexes entries by. Two data objects with the
    /// same name but different content get distinct full names.
    pub fn full_name(&self) -> Name {
        let mut hasher = Sha256Hasher::new();
        for component in self.name.components() {
            hasher.update(&component.typ().get().to_be_bytes());
            hasher.update(&(component.bytes().len() as u64).to_be_bytes());
            hasher.update(component.bytes());
        }
        hasher.update(&self.freshness_period_ms.to_be_bytes());
        hasher.update(&self.payload);
        let Sha256Digest(digest) = hasher.finalize_reset();

        let mut full = self.name.clone();
        full.push(NameComponent::new(
            NameComponentType::ImplicitSha256Digest,
            &digest,
        ));
        full
    }
}

/// A request for named content.
#[derive(Clone, Debug)]
pub struct Interest {
    name: Name,
    child_selector: ChildSelector,
    must_be_fresh: bool,
}

impl Interest {
    pub fn new(name: Name) -> Self {
        Self {
            name,
            child_selector: ChildSelector::Leftmost,
            must_be_fresh: false,
        }
    }

    pub fn rightmost(mut self) -> Self {
        self.child_selector = ChildSelector::Rightmost;
        self
    }

    pub fn fresh(mut self) -> Self {
        self.must_be_fresh = true;
        self
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn child_selector(&self) -> ChildSelector {
        self.child_selector
    }

    pub fn must_be_fresh(&self) -> bool {
        self.must_be_fresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name_extends_data_name() {
        let name = Name::from_uri("/a/b").unwrap();
        let data = Data::new(name.clone(), b"payload", 1000);
        let full = data.full_name();
        assert_eq!(full.component_count(), 3);
        assert!(name.is_prefix_of(&full));
        // Deterministic per content.
        assert_eq!(full, data.full_name());
    }

    #[test]
    fn test_full_name_distinguishes_content() {
        let name = Name::from_uri("/a").unwrap();
        let one = Data::new(name.clone(), b"one", 1000);
        let two = Data::new(name, b"two", 1000);
        assert_ne!(one.full_name(), two.full_name());
    }
}
