//! Enable/disable propagation over the node store.
//!
//! These are the only functions that write a node's enabled flag. Both walk
//! the tree with an explicit worklist and stop at nodes already in the
//! requested state, which keeps them idempotent and terminating even on a
//! malformed graph.

use std::collections::HashSet;

use generational_arena::Index;
use tracing::{instrument, trace};

use crate::domain::store::NodeStore;

impl NodeStore {
    /// Enables `start`, its ancestor chain and its whole subtree.
    ///
    /// Other branches under the enabled ancestors keep their state: enabling
    /// `c` under a disabled `b` switches `b` on but leaves `c`'s siblings off.
    /// Returns the number of nodes that were switched on.
    #[instrument(level = "trace", skip(self))]
    pub(crate) fn enable_subtree(&mut self, start: Index) -> usize {
        let first_parent = match self.get_mut(start) {
            Some(node) if !node.enabled => {
                node.enabled = true;
                node.parent
            }
            _ => return 0,
        };
        let mut flipped = 1;

        let mut up = first_parent;
        while let Some(idx) = up {
            match self.get_mut(idx) {
                Some(node) if !node.enabled => {
                    node.enabled = true;
                    flipped += 1;
                    up = node.parent;
                }
                // An enabled ancestor already has an enabled chain above it
                _ => break,
            }
        }

        let mut stack = self.child_handles(start);
        while let Some(idx) = stack.pop() {
            if let Some(node) = self.get_mut(idx) {
                if node.enabled {
                    continue;
                }
                node.enabled = true;
                flipped += 1;
                stack.extend(node.children.iter().rev().copied());
            }
        }

        trace!(flipped, "enabled");
        flipped
    }

    /// Disables `start` and its whole subtree. Ancestors are never touched, so
    /// sibling branches under a shared parent stay as they are.
    #[instrument(level = "trace", skip(self))]
    pub(crate) fn disable_subtree(&mut self, start: Index) -> usize {
        let mut flipped = 0;
        let mut stack = vec![start];
        while let Some(idx) = stack.pop() {
            if let Some(node) = self.get_mut(idx) {
                if !node.enabled {
                    continue;
                }
                node.enabled = false;
                flipped += 1;
                stack.extend(node.children.iter().rev().copied());
            }
        }

        trace!(flipped, "disabled");
        flipped
    }

    /// Nodes whose state a cascade from `start` can have changed.
    ///
    /// Order: `start`, its ancestors nearest first, then its descendants in
    /// depth-first pre-order. Every node appears once.
    pub(crate) fn affected(&self, start: Index) -> Vec<Index> {
        let mut seen = HashSet::new();
        let mut affected = Vec::new();
        if self.get(start).is_none() {
            return affected;
        }
        seen.insert(start);
        affected.push(start);

        let mut up = self.get(start).and_then(|node| node.parent);
        while let Some(idx) = up {
            if !seen.insert(idx) {
                break;
            }
            affected.push(idx);
            up = self.get(idx).and_then(|node| node.parent);
        }

        let mut stack = self.child_handles(start);
        while let Some(idx) = stack.pop() {
            if !seen.insert(idx) {
                continue;
            }
            if let Some(node) = self.get(idx) {
                affected.push(idx);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        affected
    }

    /// Children of `idx` reversed, ready to be used as a worklist.
    fn child_handles(&self, idx: Index) -> Vec<Index> {
        self.get(idx)
            .map(|node| node.children.iter().rev().copied().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NodeDef;
    use rstest::{fixture, rstest};

    // a
    // ├── b
    // │   ├── c
    // │   └── e
    // └── d
    #[fixture]
    fn store() -> NodeStore {
        let mut store = NodeStore::new();
        store.add_node(NodeDef::root("a", "A")).unwrap();
        store.add_node(NodeDef::child("b", "B", 2, "a")).unwrap();
        store.add_node(NodeDef::child("c", "C", 3, "b")).unwrap();
        store.add_node(NodeDef::child("e", "E", 3, "b")).unwrap();
        store.add_node(NodeDef::child("d", "D", 2, "a")).unwrap();
        store
    }

    fn h(store: &NodeStore, id: &str) -> Index {
        store.handle(id).unwrap()
    }

    fn enabled(store: &NodeStore) -> Vec<&str> {
        store
            .all_nodes()
            .into_iter()
            .filter(|n| n.is_enabled())
            .map(|n| n.id.as_str())
            .collect()
    }

    fn ids<'a>(store: &'a NodeStore, handles: &[Index]) -> Vec<&'a str> {
        handles
            .iter()
            .map(|&idx| store.get(idx).unwrap().id.as_str())
            .collect()
    }

    #[rstest]
    fn given_disabled_tree_when_enabling_leaf_then_enables_chain_only(mut store: NodeStore) {
        let c = h(&store, "c");
        assert_eq!(store.enable_subtree(c), 3);
        assert_eq!(enabled(&store), vec!["a", "b", "c"]);
    }

    #[rstest]
    fn given_disabled_tree_when_enabling_middle_then_enables_subtree_and_ancestors(
        mut store: NodeStore,
    ) {
        let b = h(&store, "b");
        assert_eq!(store.enable_subtree(b), 4);
        assert_eq!(enabled(&store), vec!["a", "b", "c", "e"]);
    }

    #[rstest]
    fn given_enabled_node_when_enabling_again_then_nothing_flips(mut store: NodeStore) {
        let a = h(&store, "a");
        store.enable_subtree(a);
        assert_eq!(store.enable_subtree(a), 0);
        assert_eq!(enabled(&store).len(), 5);
    }

    #[rstest]
    fn given_enabled_tree_when_disabling_middle_then_leaves_ancestors_and_siblings(
        mut store: NodeStore,
    ) {
        let a = h(&store, "a");
        let b = h(&store, "b");
        store.enable_subtree(a);

        assert_eq!(store.disable_subtree(b), 3);
        assert_eq!(enabled(&store), vec!["a", "d"]);
        assert_eq!(store.disable_subtree(b), 0);
    }

    #[rstest]
    fn given_node_when_collecting_affected_then_orders_self_ancestors_descendants(
        store: NodeStore,
    ) {
        let b = h(&store, "b");
        let c = h(&store, "c");
        let a = h(&store, "a");

        assert_eq!(ids(&store, &store.affected(b)), vec!["b", "a", "c", "e"]);
        assert_eq!(ids(&store, &store.affected(c)), vec!["c", "b", "a"]);
        assert_eq!(
            ids(&store, &store.affected(a)),
            vec!["a", "b", "c", "e", "d"]
        );
    }

    #[rstest]
    fn given_orphan_when_collecting_affected_then_stops_at_unresolved_parent(
        mut store: NodeStore,
    ) {
        store.add_node(NodeDef::child("x", "X", 2, "missing")).unwrap();
        store.add_node(NodeDef::child("y", "Y", 3, "x")).unwrap();
        let x = h(&store, "x");

        assert_eq!(ids(&store, &store.affected(x)), vec!["x", "y"]);
        assert_eq!(store.enable_subtree(x), 2);
        assert_eq!(enabled(&store), vec!["x", "y"]);
    }
}
