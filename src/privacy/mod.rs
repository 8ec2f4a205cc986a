//! Timing side-channel countermeasure for the content store.
//!
//! A naive cache leaks information: whether a lookup hits depends on what
//! other parties have requested before, so an observer timing its own
//! requests can infer a peer's interest in a name. The privacy layer tracks
//! in-flight private requests in a small bounded table and forces the first
//! contended private lookup per (name, nonce) pair to report a miss exactly
//! once, making it indistinguishable from a genuine cache miss.

mod entry;
mod manager;
mod table;

pub use entry::{PrivacyEntry, DEFAULT_PRIVACY_COUNT};
pub use manager::PrivacyManager;
pub use table::{PrivacyTable, DEFAULT_TABLE_CAPACITY};

use core::fmt;

/// Opaque per-request identifier distinguishing otherwise-identical requests
/// from different requesters.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Nonce(pub [u8; 4]);

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

/// Describes the lookup currently in flight. Produced by the caller's
/// pending-interest handling and consumed exactly once per lookup by the
/// privacy gate.
#[derive(Copy, Clone, Debug)]
pub struct RequestContext {
    pub is_private: bool,
    pub nonce: Nonce,
}

impl RequestContext {
    pub fn private(nonce: Nonce) -> Self {
        Self {
            is_private: true,
            nonce,
        }
    }

    pub fn public(nonce: Nonce) -> Self {
        Self {
            is_private: false,
            nonce,
        }
    }
}
