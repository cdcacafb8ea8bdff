//! Toggle listeners keyed by node id.
//!
//! Listeners live here rather than on the nodes, so the domain cascade stays
//! free of side effects and can be exercised without any consumer attached.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, warn};

/// Error a listener may report back to the dispatcher.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;
pub type ListenerResult = Result<(), ListenerError>;

type Listener = Box<dyn FnMut(bool) -> ListenerResult>;

/// Outcome of delivering one transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    Delivered,
    /// Nobody registered for the node
    NoListener,
    /// The listener returned an error or panicked; already logged
    Failed,
}

/// One listener per node id, registered before or after the node exists.
#[derive(Default)]
pub struct ToggleObservers {
    listeners: HashMap<String, Listener>,
}

impl fmt::Debug for ToggleObservers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<&String> = self.listeners.keys().collect();
        ids.sort();
        f.debug_struct("ToggleObservers")
            .field("listeners", &ids)
            .finish()
    }
}

impl ToggleObservers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` for `id`, replacing any previous one.
    /// Returns `true` if a listener was replaced.
    pub fn register<F>(&mut self, id: impl Into<String>, listener: F) -> bool
    where
        F: FnMut(bool) -> ListenerResult + 'static,
    {
        let id = id.into();
        let replaced = self.listeners.insert(id.clone(), Box::new(listener)).is_some();
        debug!(%id, replaced, "listener registered");
        replaced
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.listeners.remove(id).is_some()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.listeners.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    /// Calls the listener for `id` with the node's new value.
    ///
    /// Errors and panics are contained here so one failing listener cannot cut
    /// a dispatch pass short.
    pub fn notify(&mut self, id: &str, enabled: bool) -> Notification {
        let Some(listener) = self.listeners.get_mut(id) else {
            return Notification::NoListener;
        };
        match panic::catch_unwind(AssertUnwindSafe(|| listener(enabled))) {
            Ok(Ok(())) => Notification::Delivered,
            Ok(Err(e)) => {
                warn!(%id, enabled, error = %e, "toggle listener failed");
                Notification::Failed
            }
            Err(payload) => {
                warn!(%id, enabled, panic = panic_message(payload.as_ref()), "toggle listener panicked");
                Notification::Failed
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn given_listener_when_notifying_then_receives_value() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut observers = ToggleObservers::new();
        let sink = Rc::clone(&seen);
        observers.register("a", move |on| {
            sink.borrow_mut().push(on);
            Ok(())
        });

        assert_eq!(observers.notify("a", true), Notification::Delivered);
        assert_eq!(observers.notify("a", false), Notification::Delivered);
        assert_eq!(*seen.borrow(), vec![true, false]);
    }

    #[test]
    fn given_no_listener_when_notifying_then_skips() {
        let mut observers = ToggleObservers::new();
        assert_eq!(observers.notify("a", true), Notification::NoListener);
    }

    #[test]
    fn given_failing_listeners_when_notifying_then_contains_failure() {
        let mut observers = ToggleObservers::new();
        observers.register("err", |_| Err("boom".into()));
        observers.register("panic", |_| panic!("listener blew up"));

        assert_eq!(observers.notify("err", true), Notification::Failed);
        assert_eq!(observers.notify("panic", true), Notification::Failed);
        // Still usable afterwards
        assert_eq!(observers.notify("panic", false), Notification::Failed);
    }

    #[test]
    fn given_existing_listener_when_registering_again_then_replaces() {
        let mut observers = ToggleObservers::new();
        assert!(!observers.register("a", |_| Ok(())));
        assert!(observers.register("a", |_| Err("second".into())));

        assert_eq!(observers.len(), 1);
        assert_eq!(observers.notify("a", true), Notification::Failed);
        assert!(observers.remove("a"));
        assert!(!observers.contains("a"));
        assert!(observers.is_empty());
    }
}
