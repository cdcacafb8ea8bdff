//! Hierarchical configuration toggles.
//!
//! Nodes form a forest of at most three levels. Enabling a node pulls its
//! ancestors and descendants on, disabling it switches its descendants off,
//! and listeners registered per node id hear about every actual change.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod util;

pub use application::{Affected, ConfigTree, NodeEntry, TreeDefinition};
pub use domain::{DomainError, Node, NodeDef, MAX_LEVEL};
