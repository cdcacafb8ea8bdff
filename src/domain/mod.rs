//! Domain layer: the node store, cascade rules and change tracking
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod cascade;
pub mod dump;
pub mod entities;
pub mod error;
pub mod snapshot;
pub mod store;

pub use dump::DumpStyle;
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use snapshot::Snapshot;
pub use store::{NodeStore, PreOrderIter};
