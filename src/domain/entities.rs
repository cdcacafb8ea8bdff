//! Domain entities: node definitions and stored node records

use std::fmt;

use generational_arena::Index;

/// Deepest level a node may sit at. Level 1 nodes are roots.
pub const MAX_LEVEL: u8 = 3;

/// Input for registering a node.
///
/// Produced by whatever builds the tree (a definitions file, a test, a UI layer)
/// and consumed by [`NodeStore::add_node`](crate::domain::NodeStore::add_node).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDef {
    pub id: String,
    pub name: String,
    pub description: String,
    pub level: u8,
    /// Declared parent id. `None` (or an empty string) makes the node a root.
    pub parent_id: Option<String>,
}

impl NodeDef {
    /// A level 1 node without a parent.
    pub fn root(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            level: 1,
            parent_id: None,
        }
    }

    /// A node declared under `parent_id`.
    pub fn child(
        id: impl Into<String>,
        name: impl Into<String>,
        level: u8,
        parent_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            level,
            parent_id: Some(parent_id.into()),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Tree node stored in the arena.
///
/// Parent and children are arena handles, never owning pointers: the arena in
/// [`NodeStore`](crate::domain::NodeStore) is the single owner of every node.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    pub name: String,
    pub description: String,
    pub level: u8,
    /// Parent id as declared at registration, resolved or not
    pub parent_id: Option<String>,
    pub(in crate::domain) parent: Option<Index>,
    pub(in crate::domain) children: Vec<Index>,
    pub(in crate::domain) enabled: bool,
}

impl Node {
    pub(in crate::domain) fn from_def(def: NodeDef, parent: Option<Index>) -> Self {
        Self {
            id: def.id,
            name: def.name,
            description: def.description,
            level: def.level,
            parent_id: def.parent_id,
            parent,
            children: Vec::new(),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Declared a parent that did not resolve when the node was added.
    pub fn is_orphan(&self) -> bool {
        self.parent_id.is_some() && self.parent.is_none()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}
