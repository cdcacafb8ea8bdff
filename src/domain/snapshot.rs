//! Change tracking: enabled flags captured before a cascade.

use std::collections::HashMap;

use generational_arena::Index;

use crate::domain::store::NodeStore;

/// Enabled flag of every registered node at one point in time.
///
/// A cascade visits nodes whose value may not actually change (an ancestor
/// that was already on, say). Comparing against a snapshot separates the real
/// transitions from those visits.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    states: HashMap<Index, bool>,
}

impl Snapshot {
    pub fn capture(store: &NodeStore) -> Self {
        let states = store
            .handles()
            .filter_map(|idx| store.get(idx).map(|node| (idx, node.enabled)))
            .collect();
        Self { states }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub(crate) fn was_enabled(&self, idx: Index) -> Option<bool> {
        self.states.get(&idx).copied()
    }

    /// The node's new value if it differs from the captured one.
    ///
    /// A node unknown to the snapshot counts as previously disabled.
    pub(crate) fn transition(&self, store: &NodeStore, idx: Index) -> Option<bool> {
        let now = store.get(idx)?.enabled;
        let before = self.was_enabled(idx).unwrap_or(false);
        (now != before).then_some(now)
    }
}
