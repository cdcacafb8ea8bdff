//! Tree definitions: the ordered node list a tree is built from.
//!
//! File format (TOML), parents listed before their children:
//!
//! ```toml
//! [[node]]
//! id = "combat"
//! name = "Combat"
//! level = 1
//! enabled = true
//!
//! [[node]]
//! id = "combat.melee"
//! name = "Melee"
//! level = 2
//! parent = "combat"
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::NodeDef;

/// One `[[node]]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeEntry {
    pub id: String,
    /// Display name, defaults to the id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub level: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Initial state, applied through the cascade after the tree is built
    #[serde(default)]
    pub enabled: bool,
}

impl From<&NodeEntry> for NodeDef {
    fn from(entry: &NodeEntry) -> Self {
        NodeDef {
            id: entry.id.clone(),
            name: entry.name.clone().unwrap_or_else(|| entry.id.clone()),
            description: entry.description.clone(),
            level: entry.level,
            parent_id: entry.parent.clone(),
        }
    }
}

/// Ordered node definitions for one tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeDefinition {
    #[serde(default, rename = "node")]
    pub nodes: Vec<NodeEntry>,
}

impl TreeDefinition {
    #[instrument(level = "debug")]
    pub fn load(path: &Path) -> ApplicationResult<Self> {
        let content = fs::read_to_string(path).with_path_context("read definitions", path)?;
        let definition = Self::parse(&content, &path.display().to_string())?;
        debug!(nodes = definition.nodes.len(), "definitions loaded");
        Ok(definition)
    }

    pub fn from_toml_str(content: &str) -> ApplicationResult<Self> {
        Self::parse(content, "<string>")
    }

    fn parse(content: &str, origin: &str) -> ApplicationResult<Self> {
        toml::from_str(content).map_err(|e| ApplicationError::InvalidDefinitions {
            origin: origin.to_string(),
            message: e.to_string(),
        })
    }

    pub fn to_toml(&self) -> ApplicationResult<String> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::InvalidDefinitions {
            origin: "<serialize>".to_string(),
            message: e.to_string(),
        })
    }

    pub fn node_defs(&self) -> impl Iterator<Item = NodeDef> + '_ {
        self.nodes.iter().map(NodeDef::from)
    }

    /// Ids marked `enabled`, in definition order.
    pub fn initially_enabled(&self) -> impl Iterator<Item = &str> + '_ {
        self.nodes
            .iter()
            .filter(|entry| entry.enabled)
            .map(|entry| entry.id.as_str())
    }
}
