//! The content store: a sorted full-name index with leftmost/rightmost
//! prefix matching, fronted by the privacy gate.

mod entry;
mod policy;

pub use entry::CsEntry;
pub use policy::{FifoPolicy, Policy};

use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Included, Unbounded};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::clock::Timestamp;
use crate::error::PrivacyError;
use crate::name::{Name, NameComponentType};
use crate::packet::{CachePolicyTag, ChildSelector, Data, Interest};
use crate::privacy::{PrivacyManager, RequestContext};

/// Requests under this reserved local-control namespace bypass the privacy
/// gate entirely.
const LOCAL_CONTROL_COMPONENT: &[u8] = b"localhost";

fn is_local_control(name: &Name) -> bool {
    name.get(0).is_some_and(|c| {
        matches!(c.component_type(), NameComponentType::Generic)
            && c.bytes() == LOCAL_CONTROL_COMPONENT
    })
}

enum GateDecision {
    Proceed,
    ForcedMiss,
}

pub struct Cs {
    index: BTreeMap<Name, CsEntry>,
    policy: Box<dyn Policy>,
    privacy: PrivacyManager,
}

impl Cs {
    /// A store with the default FIFO policy capped at `limit` entries.
    pub fn new(limit: usize, privacy: PrivacyManager) -> Self {
        Self::with_policy(Box::new(FifoPolicy::new(limit)), privacy)
    }

    pub fn with_policy(policy: Box<dyn Policy>, privacy: PrivacyManager) -> Self {
        Self {
            index: BTreeMap::new(),
            policy,
            privacy,
        }
    }

    pub fn set_limit(&mut self, limit: usize) {
        let victims = self.policy.set_limit(limit);
        self.evict(victims);
    }

    pub fn get_limit(&self) -> usize {
        self.policy.get_limit()
    }

    /// Swaps the eviction policy, preserving the current limit. Resident
    /// entries are replayed into the new policy in index order, so everything
    /// already cached stays subject to eviction.
    pub fn set_policy(&mut self, policy: Box<dyn Policy>) {
        let limit = self.policy.get_limit();
        self.policy = policy;
        let mut victims = self.policy.set_limit(limit);
        let resident: Vec<Name> = self.index.keys().cloned().collect();
        for name in resident {
            victims.extend(self.policy.after_insert(&name));
        }
        self.evict(victims);
    }

    pub fn privacy(&self) -> &PrivacyManager {
        &self.privacy
    }

    pub fn privacy_mut(&mut self) -> &mut PrivacyManager {
        &mut self.privacy
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Admits a data object, refreshing in place when its full name is
    /// already present.
    pub fn insert(&mut self, data: Arc<Data>, is_unsolicited: bool, now: Timestamp) {
        debug!(name = %data.name(), unsolicited = is_unsolicited, "insert");

        // A zero limit means the store is disabled.
        if self.policy.get_limit() == 0 {
            return;
        }

        if let Some(CachePolicyTag::NoCache) = data.cache_policy() {
            return;
        }

        let full_name = data.full_name();
        match self.index.get_mut(&full_name) {
            Some(entry) => {
                entry.refresh(now);
                if entry.is_unsolicited() && !is_unsolicited {
                    entry.clear_unsolicited();
                }
                self.policy.after_refresh(&full_name);
            }
            None => {
                let entry = CsEntry::new(data, full_name.clone(), is_unsolicited, now);
                self.index.insert(full_name.clone(), entry);
                let victims = self.policy.after_insert(&full_name);
                self.evict(victims);
            }
        }
    }

    /// Looks up the interest, consulting the privacy gate first. Exactly one
    /// request context accompanies each gated lookup. On a hit the policy is
    /// notified and `hit` receives the data; `miss` is invoked both for
    /// genuine misses and for misses the gate forces.
    pub fn find<H, M>(
        &mut self,
        interest: &Interest,
        ctx: RequestContext,
        now: Timestamp,
        hit: H,
        miss: M,
    ) -> Result<(), PrivacyError>
    where
        H: FnOnce(&Interest, Arc<Data>),
        M: FnOnce(&Interest),
    {
        let prefix = interest.name();
        let rightmost = interest.child_selector() == ChildSelector::Rightmost;
        debug!(name = %prefix, rightmost, "find");

        if !is_local_control(prefix) {
            if let GateDecision::ForcedMiss = self.gate(prefix, ctx)? {
                miss(interest);
                return Ok(());
            }
        }

        let upper = prefix.successor();
        let matched = match interest.child_selector() {
            ChildSelector::Leftmost => self.find_leftmost(interest, now, prefix, upper.as_ref()),
            ChildSelector::Rightmost => self.find_rightmost(interest, now),
        }
        .map(|(name, entry)| (name.clone(), entry.data().clone()));

        match matched {
            None => {
                debug!("no-match");
                miss(interest);
            }
            Some((name, data)) => {
                debug!(name = %name, "matching");
                self.policy.before_use(&name);
                hit(interest, data);
            }
        }
        Ok(())
    }

    /// Debug enumeration of the cached entries by full name.
    pub fn dump(&self) -> impl Iterator<Item = &Name> {
        debug!("dump table");
        for name in self.index.keys() {
            trace!(name = %name, "entry");
        }
        self.index.keys()
    }

    /// The privacy decision taken before any matching happens. Equalizes the
    /// observable timing of private lookups: the first contended private
    /// lookup per (name, nonce) pair is reported as a miss exactly once, and
    /// a public request for a privately-tracked name clears that tracking
    /// behind one forced miss.
    fn gate(&mut self, name: &Name, ctx: RequestContext) -> Result<GateDecision, PrivacyError> {
        if ctx.is_private {
            if self.privacy.is_public(name) {
                // Already observably public, nothing to protect.
                return Ok(GateDecision::Proceed);
            }
            if self.privacy.peer_check(name, ctx.nonce) {
                if self.privacy.has_delayed(name, ctx.nonce)? {
                    debug!(name = %name, nonce = %ctx.nonce, "already delayed, proceeding");
                } else {
                    debug!(name = %name, nonce = %ctx.nonce, "peer contention, delaying once");
                    self.privacy.set_delayed(name, ctx.nonce, true)?;
                    return Ok(GateDecision::ForcedMiss);
                }
            } else {
                // No contention. The delay flag is still set so this pair
                // never pays later: "never delayed" and "delayed once" must
                // stay observably identical.
                self.privacy.set_delayed(name, ctx.nonce, true)?;
            }
        } else {
            if self.privacy.is_name_private(name) {
                debug!(name = %name, "public request for privately tracked name");
                self.privacy.invalidate_all(name);
                return Ok(GateDecision::ForcedMiss);
            }
            if !self.privacy.is_public(name) {
                self.privacy.publist_insert(name);
            }
        }
        Ok(GateDecision::Proceed)
    }

    fn range(
        &self,
        lower: &Name,
        upper: Option<&Name>,
    ) -> std::collections::btree_map::Range<'_, Name, CsEntry> {
        match upper {
            Some(upper) => self.index.range((Included(lower), Excluded(upper))),
            None => self.index.range((Included(lower), Unbounded)),
        }
    }

    fn find_leftmost(
        &self,
        interest: &Interest,
        now: Timestamp,
        lower: &Name,
        upper: Option<&Name>,
    ) -> Option<(&Name, &CsEntry)> {
        self.range(lower, upper)
            .find(|(_, entry)| entry.can_satisfy(interest, now))
    }

    /// Rightmost-child selection: prefer the lexicographically last immediate
    /// child subtree under the interest name, but within that subtree return
    /// the leftmost match. Each iteration inspects the last entry of the
    /// current window; either the window has collapsed to exact-name entries
    /// (resolved right-to-left, no fall-through), or the window's tail is one
    /// child subtree, which is searched leftmost-first and cut off on a miss.
    fn find_rightmost(&self, interest: &Interest, now: Timestamp) -> Option<(&Name, &CsEntry)> {
        let prefix = interest.name();
        let prefix_len = prefix.component_count();
        let mut upper = prefix.successor();

        loop {
            let (prev_name, prev_entry) = self.range(prefix, upper.as_ref()).next_back()?;

            if prev_entry.data().name().component_count() == prefix_len {
                // Exact data names sort before any descendant, so the whole
                // remaining window is exact. Resolve among it right-to-left.
                trace!(name = %prev_name, "find-among-exact");
                return self
                    .range(prefix, upper.as_ref())
                    .rev()
                    .find(|(_, entry)| entry.can_satisfy(interest, now));
            }

            let sub_prefix = prev_name.prefix(prefix_len + 1);
            trace!(name = %sub_prefix, "find-under-prefix");
            if self
                .range(&sub_prefix, upper.as_ref())
                .any(|(_, entry)| entry.can_satisfy(interest, now))
            {
                return self
                    .range(&sub_prefix, upper.as_ref())
                    .find(|(_, entry)| entry.can_satisfy(interest, now));
            }
            upper = Some(sub_prefix);
        }
    }

    fn evict(&mut self, victims: Vec<Name>) {
        for name in victims {
            trace!(name = %name, "evict");
            self.index.remove(&name);
        }
    }
}
