//! Diagnostics: indented text dump and termtree rendering of the store.

use generational_arena::Index;
use itertools::Itertools;
use termtree::Tree;

use crate::domain::entities::Node;
use crate::domain::store::NodeStore;

/// How nodes are rendered in dumps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpStyle {
    pub enabled_glyph: String,
    pub disabled_glyph: String,
    /// Spaces per depth step
    pub indent: usize,
}

impl Default for DumpStyle {
    fn default() -> Self {
        Self {
            enabled_glyph: "✓".into(),
            disabled_glyph: "✗".into(),
            indent: 2,
        }
    }
}

impl DumpStyle {
    pub fn glyph(&self, node: &Node) -> &str {
        if node.is_enabled() {
            &self.enabled_glyph
        } else {
            &self.disabled_glyph
        }
    }

    /// `<glyph> [L<level>] <name>`
    pub fn label(&self, node: &Node) -> String {
        format!("{} [L{}] {}", self.glyph(node), node.level, node.name)
    }
}

impl NodeStore {
    /// Depth-first dump with the default style.
    pub fn dump(&self) -> String {
        self.dump_with(&DumpStyle::default())
    }

    /// One line per reachable node, indented by depth, followed by an
    /// `orphans:` section when any node failed to link to its parent.
    pub fn dump_with(&self, style: &DumpStyle) -> String {
        if self.is_empty() {
            return "(empty)".to_string();
        }
        let mut lines: Vec<String> = self
            .iter()
            .map(|(depth, node)| {
                format!("{}{}", " ".repeat(depth * style.indent), style.label(node))
            })
            .collect();

        let orphans = self.orphans();
        if !orphans.is_empty() {
            lines.push("orphans:".to_string());
            lines.extend(orphans.into_iter().map(|node| {
                format!(
                    "{}{} (parent {} not found)",
                    " ".repeat(style.indent),
                    style.label(node),
                    node.parent_id.as_deref().unwrap_or_default()
                )
            }));
        }
        lines.into_iter().join("\n")
    }

    /// One termtree per root, each node labelled by `label`.
    pub fn to_tree_strings<F>(&self, label: F) -> Vec<Tree<String>>
    where
        F: Fn(&Node) -> String,
    {
        fn build_tree<F: Fn(&Node) -> String>(
            store: &NodeStore,
            node_idx: Index,
            label: &F,
        ) -> Option<Tree<String>> {
            let node = store.get(node_idx)?;
            let leaves = node
                .children
                .iter()
                .filter_map(|&child_idx| build_tree(store, child_idx, label));
            Some(Tree::new(label(node)).with_leaves(leaves))
        }

        self.root_handles()
            .iter()
            .filter_map(|&root_idx| build_tree(self, root_idx, &label))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NodeDef;

    fn store() -> NodeStore {
        let mut store = NodeStore::new();
        store.add_node(NodeDef::root("a", "Alpha")).unwrap();
        store.add_node(NodeDef::child("b", "Beta", 2, "a")).unwrap();
        store.add_node(NodeDef::child("c", "Gamma", 3, "b")).unwrap();
        let b = store.handle("b").unwrap();
        store.enable_subtree(b);
        store
    }

    #[test]
    fn given_tree_when_dumping_then_indents_by_depth() {
        let dump = store().dump();
        assert_eq!(dump, "✓ [L1] Alpha\n  ✓ [L2] Beta\n    ✓ [L3] Gamma");
    }

    #[test]
    fn given_custom_style_and_orphan_when_dumping_then_lists_orphans_last() {
        let mut store = store();
        store.add_node(NodeDef::child("x", "Lost", 2, "gone")).unwrap();
        let style = DumpStyle {
            enabled_glyph: "+".into(),
            disabled_glyph: "-".into(),
            indent: 4,
        };

        let dump = store.dump_with(&style);

        assert_eq!(
            dump,
            "+ [L1] Alpha\n    + [L2] Beta\n        + [L3] Gamma\norphans:\n    - [L2] Lost (parent gone not found)"
        );
    }

    #[test]
    fn given_empty_store_when_dumping_then_says_so() {
        assert_eq!(NodeStore::new().dump(), "(empty)");
    }

    #[test]
    fn given_tree_when_rendering_termtree_then_nests_children() {
        let store = store();
        let trees = store.to_tree_strings(|node| node.id.clone());

        assert_eq!(trees.len(), 1);
        assert_eq!(trees[0].root, "a");
        assert_eq!(trees[0].leaves.len(), 1);
        assert_eq!(trees[0].leaves[0].leaves[0].root, "c");
    }
}
