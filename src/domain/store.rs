//! Arena-backed node store: registration, lookup and read-only navigation.

use std::collections::HashMap;

use generational_arena::{Arena, Index};
use tracing::{debug, instrument, warn};

use crate::domain::entities::{Node, NodeDef, MAX_LEVEL};
use crate::domain::error::{DomainError, DomainResult};

/// Owner of every node in one configuration tree.
///
/// Uses a generational arena for memory-safe node handles and an id index for
/// O(1) lookups. Roots and registration order are kept separately so that
/// queries are deterministic.
#[derive(Debug, Default)]
pub struct NodeStore {
    /// Arena storage for all nodes
    arena: Arena<Node>,
    /// Node id to arena handle
    index: HashMap<String, Index>,
    /// Level 1 nodes in registration order
    roots: Vec<Index>,
    /// Every node in registration order
    order: Vec<Index>,
}

impl NodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a node under its id.
    ///
    /// A resolvable parent gets the node appended to its children. A parent id
    /// that does not resolve leaves the node registered but unreachable from
    /// the roots (an orphan). Duplicate ids and level violations are rejected
    /// without touching the store.
    #[instrument(level = "debug", skip(self, def), fields(id = %def.id))]
    pub fn add_node(&mut self, mut def: NodeDef) -> DomainResult<()> {
        if def.parent_id.as_deref().is_some_and(str::is_empty) {
            def.parent_id = None;
        }
        if def.id.is_empty() {
            return Err(DomainError::EmptyId);
        }
        if self.index.contains_key(&def.id) {
            warn!(id = %def.id, "rejecting duplicate node id");
            return Err(DomainError::DuplicateId(def.id));
        }
        if def.level == 0 || def.level > MAX_LEVEL {
            return Err(DomainError::InvalidLevel {
                id: def.id,
                level: def.level,
            });
        }

        let parent = match def.parent_id.as_deref() {
            None if def.level != 1 => {
                return Err(DomainError::LevelMismatch {
                    id: def.id,
                    level: def.level,
                    expected: 1,
                });
            }
            None => None,
            Some(parent_id) if def.level == 1 => {
                return Err(DomainError::RootWithParent {
                    id: def.id.clone(),
                    parent: parent_id.to_string(),
                });
            }
            Some(parent_id) => match self.handle(parent_id) {
                Some(parent_idx) => {
                    let expected = self.arena[parent_idx].level + 1;
                    if def.level != expected {
                        return Err(DomainError::LevelMismatch {
                            id: def.id,
                            level: def.level,
                            expected,
                        });
                    }
                    Some(parent_idx)
                }
                None => {
                    warn!(id = %def.id, parent = parent_id, "parent not registered, node is orphaned");
                    None
                }
            },
        };

        let is_root = def.parent_id.is_none();
        let id = def.id.clone();
        let node_idx = self.arena.insert(Node::from_def(def, parent));
        self.index.insert(id, node_idx);
        self.order.push(node_idx);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            }
        } else if is_root {
            self.roots.push(node_idx);
        }
        debug!("registered");
        Ok(())
    }

    /// Drops every node and root. Nothing else happens.
    #[instrument(level = "debug", skip(self))]
    pub fn clear(&mut self) {
        self.arena.clear();
        self.index.clear();
        self.roots.clear();
        self.order.clear();
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.handle(id).and_then(|idx| self.arena.get(idx))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn root_nodes(&self) -> Vec<&Node> {
        self.resolve(&self.roots)
    }

    /// Children of `id` in insertion order; empty for unknown ids.
    pub fn children(&self, id: &str) -> Vec<&Node> {
        match self.node(id) {
            Some(node) => self.resolve(&node.children),
            None => Vec::new(),
        }
    }

    /// Parent of `id`, if it has a resolved one.
    pub fn parent(&self, id: &str) -> Option<&Node> {
        self.node(id)
            .and_then(|node| node.parent)
            .and_then(|idx| self.arena.get(idx))
    }

    /// All nodes in registration order, orphans included.
    pub fn all_nodes(&self) -> Vec<&Node> {
        self.resolve(&self.order)
    }

    pub fn nodes_by_level(&self, level: u8) -> Vec<&Node> {
        self.all_nodes()
            .into_iter()
            .filter(|node| node.level == level)
            .collect()
    }

    pub fn orphans(&self) -> Vec<&Node> {
        self.all_nodes()
            .into_iter()
            .filter(|node| node.is_orphan())
            .collect()
    }

    /// Depth-first pre-order walk over the reachable tree, roots in order.
    pub fn iter(&self) -> PreOrderIter<'_> {
        PreOrderIter::new(self, &self.roots)
    }

    /// Number of levels actually used by reachable nodes.
    pub fn depth(&self) -> usize {
        self.iter().map(|(depth, _)| depth + 1).max().unwrap_or(0)
    }

    pub(crate) fn handle(&self, id: &str) -> Option<Index> {
        self.index.get(id).copied()
    }

    pub(crate) fn get(&self, idx: Index) -> Option<&Node> {
        self.arena.get(idx)
    }

    pub(in crate::domain) fn get_mut(&mut self, idx: Index) -> Option<&mut Node> {
        self.arena.get_mut(idx)
    }

    pub(crate) fn root_handles(&self) -> &[Index] {
        &self.roots
    }

    pub(crate) fn handles(&self) -> impl Iterator<Item = Index> + '_ {
        self.order.iter().copied()
    }

    fn resolve(&self, handles: &[Index]) -> Vec<&Node> {
        handles.iter().filter_map(|&idx| self.arena.get(idx)).collect()
    }
}

/// Pre-order iterator yielding `(depth, node)`, depth 0 for roots.
pub struct PreOrderIter<'a> {
    store: &'a NodeStore,
    stack: Vec<(Index, usize)>,
}

impl<'a> PreOrderIter<'a> {
    fn new(store: &'a NodeStore, starts: &[Index]) -> Self {
        // Reverse so the first root comes out first
        let stack = starts.iter().rev().map(|&idx| (idx, 0)).collect();
        Self { store, stack }
    }
}

impl<'a> Iterator for PreOrderIter<'a> {
    type Item = (usize, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, depth)) = self.stack.pop() {
            if let Some(node) = self.store.get(current_idx) {
                for &child in node.children.iter().rev() {
                    self.stack.push((child, depth + 1));
                }
                return Some((depth, node));
            }
        }
        None
    }
}
