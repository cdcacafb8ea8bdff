//! Application layer: the toggle engine, listener dispatch and tree definitions
//!
//! This layer drives the domain cascade and owns everything with side effects.

pub mod definitions;
pub mod engine;
pub mod error;
pub mod error_ext;
pub mod observers;

pub use definitions::{NodeEntry, TreeDefinition};
pub use engine::{Affected, ConfigTree};
pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use observers::{ListenerError, ListenerResult, Notification, ToggleObservers};
