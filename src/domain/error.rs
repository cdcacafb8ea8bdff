//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::MAX_LEVEL;

/// Domain errors represent violations of the tree's structural invariants.
/// A rejected operation leaves the tree exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("duplicate node id: {0}")]
    DuplicateId(String),

    #[error("node {id}: level {level} outside 1..={max}", max = MAX_LEVEL)]
    InvalidLevel { id: String, level: u8 },

    #[error("node {id}: level {level}, expected {expected}")]
    LevelMismatch { id: String, level: u8, expected: u8 },

    #[error("node {id}: level 1 node cannot declare parent {parent}")]
    RootWithParent { id: String, parent: String },

    #[error("node id must not be empty")]
    EmptyId,
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
