//! The toggle engine: cascade, change detection and listener dispatch.

use std::collections::{BTreeMap, HashSet};

use generational_arena::Index;
use tracing::{debug, instrument, warn};

use crate::application::definitions::TreeDefinition;
use crate::application::observers::{ListenerResult, Notification, ToggleObservers};
use crate::application::ApplicationResult;
use crate::domain::{DomainResult, DumpStyle, Node, NodeDef, NodeStore, Snapshot};

/// A node a `set_enabled` call may have touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Affected {
    pub id: String,
    /// Value after the call
    pub enabled: bool,
    /// Whether the value differs from before the call
    pub changed: bool,
}

/// Handle to one configuration tree and the listeners watching it.
///
/// Single-threaded: listeners run synchronously inside `set_enabled`, and
/// callers sharing a tree across threads must serialize access themselves.
#[derive(Debug, Default)]
pub struct ConfigTree {
    store: NodeStore,
    observers: ToggleObservers,
}

impl ConfigTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_definition(definition: &TreeDefinition) -> ApplicationResult<Self> {
        let mut tree = Self::new();
        tree.rebuild(definition)?;
        Ok(tree)
    }

    /// Replaces the whole tree with `definition`.
    ///
    /// Nodes are registered in order into a fresh store; only when every node
    /// is accepted does it replace the current one, so a failed rebuild leaves
    /// the tree untouched. Initial states are then applied with `set_enabled`,
    /// which keeps the result coherent and notifies existing listeners.
    #[instrument(level = "debug", skip_all, fields(nodes = definition.nodes.len()))]
    pub fn rebuild(&mut self, definition: &TreeDefinition) -> ApplicationResult<()> {
        let mut store = NodeStore::new();
        for def in definition.node_defs() {
            store.add_node(def)?;
        }
        self.store = store;

        for id in definition.initially_enabled() {
            self.set_enabled(id, true);
        }
        debug!(orphans = self.store.orphans().len(), "tree rebuilt");
        Ok(())
    }

    pub fn add_node(&mut self, def: NodeDef) -> DomainResult<()> {
        self.store.add_node(def)
    }

    /// Drops every node. Listeners stay registered and no listener is called.
    pub fn clear(&mut self) {
        self.store.clear();
    }

    /// Requests `id` to be enabled or disabled and restores coherence.
    ///
    /// Returns every node the cascade could have touched, changed or not, in
    /// affected order: the node itself, its ancestors, then its descendants.
    /// Listeners fire once for each node whose value actually changed. An
    /// unknown id is logged and yields an empty list.
    #[instrument(level = "debug", skip(self))]
    pub fn set_enabled(&mut self, id: &str, desired: bool) -> Vec<Affected> {
        let snapshot = Snapshot::capture(&self.store);

        let Some(start) = self.store.handle(id) else {
            warn!(%id, "set_enabled on unknown node");
            return Vec::new();
        };

        let flipped = self.cascade(start, desired);
        let affected = self.dispatch(&snapshot, self.store.affected(start));
        debug!(flipped, affected = affected.len(), "cascade applied");
        affected
    }

    /// Applies a flat id → state map, e.g. one saved earlier from
    /// [`enabled_states`](Self::enabled_states).
    ///
    /// Enables go first, then disables: a disable only reaches nodes that are
    /// off in a coherent map, so a coherent map is reproduced exactly. The whole
    /// batch is compared against one snapshot, so a node switched on by an
    /// enable and off again by a later disable notifies nobody. Returns the ids
    /// of every affected node, each once. Unknown ids are logged and skipped.
    #[instrument(level = "debug", skip_all, fields(entries = states.len()))]
    pub fn apply_states(&mut self, states: &BTreeMap<String, bool>) -> Vec<String> {
        let snapshot = Snapshot::capture(&self.store);

        let mut seen = HashSet::new();
        let mut handles = Vec::new();
        let mut flipped = 0usize;
        for desired in [true, false] {
            for (id, _) in states.iter().filter(|(_, on)| **on == desired) {
                let Some(start) = self.store.handle(id) else {
                    warn!(%id, "apply_states on unknown node");
                    continue;
                };
                flipped += self.cascade(start, desired);
                handles.extend(
                    self.store
                        .affected(start)
                        .into_iter()
                        .filter(|idx| seen.insert(*idx)),
                );
            }
        }

        let affected = self.dispatch(&snapshot, handles);
        debug!(flipped, affected = affected.len(), "states applied");
        affected.into_iter().map(|a| a.id).collect()
    }

    fn cascade(&mut self, start: Index, desired: bool) -> usize {
        if desired {
            self.store.enable_subtree(start)
        } else {
            self.store.disable_subtree(start)
        }
    }

    /// Notifies listeners of every node in `handles` whose value differs from
    /// `snapshot`, in order, and reports all of them.
    fn dispatch(&mut self, snapshot: &Snapshot, handles: Vec<Index>) -> Vec<Affected> {
        let mut affected = Vec::with_capacity(handles.len());
        let mut notified = 0usize;
        for idx in handles {
            let Some(node) = self.store.get(idx) else {
                continue;
            };
            let transition = snapshot.transition(&self.store, idx);
            if let Some(value) = transition {
                if self.observers.notify(&node.id, value) == Notification::Delivered {
                    notified += 1;
                }
            }
            affected.push(Affected {
                id: node.id.clone(),
                enabled: node.is_enabled(),
                changed: transition.is_some(),
            });
        }
        debug!(notified, "listeners notified");
        affected
    }

    /// Registers the listener for `id`, replacing any previous one.
    pub fn on_toggle<F>(&mut self, id: impl Into<String>, listener: F) -> bool
    where
        F: FnMut(bool) -> ListenerResult + 'static,
    {
        self.observers.register(id, listener)
    }

    pub fn remove_listener(&mut self, id: &str) -> bool {
        self.observers.remove(id)
    }

    pub fn observers(&self) -> &ToggleObservers {
        &self.observers
    }

    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    /// Looks up `id`; an unknown id is logged and yields `None`.
    pub fn node(&self, id: &str) -> Option<&Node> {
        let node = self.store.node(id);
        if node.is_none() {
            warn!(%id, "unknown node");
        }
        node
    }

    pub fn is_enabled(&self, id: &str) -> Option<bool> {
        self.store.node(id).map(Node::is_enabled)
    }

    pub fn root_nodes(&self) -> Vec<&Node> {
        self.store.root_nodes()
    }

    /// Children of `id`; an unknown id is logged and yields no children.
    pub fn children(&self, id: &str) -> Vec<&Node> {
        if !self.store.contains(id) {
            warn!(%id, "unknown node");
        }
        self.store.children(id)
    }

    pub fn nodes_by_level(&self, level: u8) -> Vec<&Node> {
        self.store.nodes_by_level(level)
    }

    pub fn all_nodes(&self) -> Vec<&Node> {
        self.store.all_nodes()
    }

    pub fn orphans(&self) -> Vec<&Node> {
        self.store.orphans()
    }

    pub fn dump(&self) -> String {
        self.store.dump()
    }

    pub fn dump_with(&self, style: &DumpStyle) -> String {
        self.store.dump_with(style)
    }

    /// Every node's enabled flag, keyed by id.
    pub fn enabled_states(&self) -> BTreeMap<String, bool> {
        self.store
            .all_nodes()
            .into_iter()
            .map(|node| (node.id.clone(), node.is_enabled()))
            .collect()
    }
}
