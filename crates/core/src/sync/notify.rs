//! Snapshot fan-out to subscribers.
//!
//! Subscribers run synchronously, in subscription order, on the thread that
//! recorded the change. One failing subscriber (an `Err` or a panic) is
//! logged and skipped; the rest still run.

use std::cell::RefCell;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::{Rc, Weak};

use thiserror::Error;
use tracing::error;

use super::snapshot::ConsolidatedSpreadsheet;

/// A subscriber's own failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct SubscriberError(pub String);

impl SubscriberError {
    /// Creates a subscriber error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Receives every new snapshot.
pub trait Subscriber {
    /// Called once per recorded change with the full snapshot.
    ///
    /// # Errors
    ///
    /// A returned error is logged; it does not affect other subscribers.
    fn on_snapshot(&self, snapshot: &ConsolidatedSpreadsheet) -> Result<(), SubscriberError>;
}

impl<F> Subscriber for F
where
    F: Fn(&ConsolidatedSpreadsheet),
{
    fn on_snapshot(&self, snapshot: &ConsolidatedSpreadsheet) -> Result<(), SubscriberError> {
        self(snapshot);
        Ok(())
    }
}

struct Registration {
    id: u64,
    subscriber: Rc<dyn Subscriber>,
}

type Registry = RefCell<Vec<Registration>>;

/// Outcome of one notification pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotifyReport {
    /// Subscribers that returned `Ok`.
    pub delivered: usize,
    /// Subscribers that returned `Err` or panicked.
    pub failed: usize,
}

/// Ordered subscriber registry.
pub struct Subscribers {
    registry: Rc<Registry>,
    next_id: u64,
}

impl Subscribers {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Vec::new())),
            next_id: 1,
        }
    }

    /// Registers `subscriber` after every existing one.
    pub fn subscribe(&mut self, subscriber: impl Subscriber + 'static) -> Subscription {
        let id = self.next_id;
        self.next_id += 1;
        self.registry.borrow_mut().push(Registration {
            id,
            subscriber: Rc::new(subscriber),
        });

        Subscription {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Number of registered subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.borrow().len()
    }

    /// Returns true if nobody is subscribed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registry.borrow().is_empty()
    }

    /// Drops every registration.
    pub fn clear(&self) {
        self.registry.borrow_mut().clear();
    }

    /// Pushes `snapshot` to every subscriber registered when the pass starts.
    pub fn notify(&self, snapshot: &ConsolidatedSpreadsheet) -> NotifyReport {
        let current: Vec<(u64, Rc<dyn Subscriber>)> = self
            .registry
            .borrow()
            .iter()
            .map(|r| (r.id, Rc::clone(&r.subscriber)))
            .collect();

        let mut report = NotifyReport::default();
        for (id, subscriber) in current {
            match catch_unwind(AssertUnwindSafe(|| subscriber.on_snapshot(snapshot))) {
                Ok(Ok(())) => report.delivered += 1,
                Ok(Err(err)) => {
                    report.failed += 1;
                    error!(subscription_id = id, error = %err, "Subscriber failed");
                }
                Err(payload) => {
                    report.failed += 1;
                    error!(
                        subscription_id = id,
                        panic = panic_message(payload.as_ref()),
                        "Subscriber panicked"
                    );
                }
            }
        }
        report
    }
}

impl Default for Subscribers {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscribers")
            .field("len", &self.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

/// Handle returned by `subscribe`.
///
/// Dropping the handle does not unsubscribe.
#[derive(Debug, Clone)]
pub struct Subscription {
    id: u64,
    registry: Weak<Registry>,
}

impl Subscription {
    /// Registration ID, unique within its registry.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Removes this registration.
    ///
    /// Returns `false` if it was already removed or the registry is gone.
    pub fn unsubscribe(&self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let mut registrations = registry.borrow_mut();
        let before = registrations.len();
        registrations.retain(|r| r.id != self.id);
        registrations.len() != before
    }
}
