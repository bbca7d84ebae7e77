//! Change subscriptions for record stores
//!
//! Listeners receive the full snapshot after every acknowledged write and
//! once immediately on subscribing. Dropping the returned [`Subscription`]
//! unsubscribes.

use std::sync::{Arc, Mutex, Weak};

use crate::error::SpendlogError;
use crate::models::ExpenseRecord;

/// Called with the full record set after each change
pub type ChangeListener = Box<dyn Fn(&[ExpenseRecord]) + Send + Sync>;

/// Called when the store fails to apply a write
pub type ErrorListener = Box<dyn Fn(&SpendlogError) + Send + Sync>;

type SharedChange = Arc<dyn Fn(&[ExpenseRecord]) + Send + Sync>;
type SharedError = Arc<dyn Fn(&SpendlogError) + Send + Sync>;

#[derive(Default)]
struct ListenerTable {
    next_id: u64,
    entries: Vec<(u64, SharedChange, SharedError)>,
}

/// Registry of snapshot listeners
#[derive(Default, Clone)]
pub struct Listeners {
    table: Arc<Mutex<ListenerTable>>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener pair and return its handle
    pub fn add(&self, on_change: ChangeListener, on_error: ErrorListener) -> Subscription {
        let id = match self.table.lock() {
            Ok(mut table) => {
                let id = table.next_id;
                table.next_id += 1;
                table.entries.push((id, Arc::from(on_change), Arc::from(on_error)));
                id
            }
            Err(e) => {
                tracing::warn!("listener table poisoned, subscription ignored: {}", e);
                return Subscription::detached();
            }
        };

        let weak: Weak<Mutex<ListenerTable>> = Arc::downgrade(&self.table);
        Subscription::new(move || {
            if let Some(table) = weak.upgrade() {
                if let Ok(mut table) = table.lock() {
                    table.entries.retain(|(entry_id, _, _)| *entry_id != id);
                }
            }
        })
    }

    /// Number of active subscriptions
    pub fn len(&self) -> usize {
        self.table.lock().map(|t| t.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver a snapshot to every listener
    ///
    /// Listeners run outside the table lock, so they may unsubscribe.
    pub fn notify(&self, snapshot: &[ExpenseRecord]) {
        for listener in self.change_listeners() {
            listener(snapshot);
        }
    }

    /// Deliver a write failure to every listener
    pub fn notify_error(&self, err: &SpendlogError) {
        let listeners: Vec<SharedError> = match self.table.lock() {
            Ok(table) => table.entries.iter().map(|(_, _, e)| Arc::clone(e)).collect(),
            Err(_) => return,
        };
        for listener in listeners {
            listener(err);
        }
    }

    fn change_listeners(&self) -> Vec<SharedChange> {
        match self.table.lock() {
            Ok(table) => table.entries.iter().map(|(_, c, _)| Arc::clone(c)).collect(),
            Err(e) => {
                tracing::warn!("listener table poisoned, notification skipped: {}", e);
                Vec::new()
            }
        }
    }
}

/// Handle returned by `subscribe`; unsubscribes when dropped
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Wrap an arbitrary cancel action
    pub fn new(cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A handle with nothing to cancel
    pub fn detached() -> Self {
        Self { cancel: None }
    }

    /// Stop receiving notifications
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_notify_and_unsubscribe() {
        let listeners = Listeners::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        let sub = listeners.add(
            Box::new(move |_: &[ExpenseRecord]| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
            Box::new(|_: &SpendlogError| {}),
        );

        listeners.notify(&[]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(listeners.len(), 1);

        sub.unsubscribe();
        listeners.notify(&[]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(listeners.is_empty());
    }

    #[test]
    fn test_drop_unsubscribes() {
        let listeners = Listeners::new();
        {
            let _sub = listeners.add(
                Box::new(|_: &[ExpenseRecord]| {}),
                Box::new(|_: &SpendlogError| {}),
            );
            assert_eq!(listeners.len(), 1);
        }
        assert!(listeners.is_empty());
    }

    #[test]
    fn test_error_listeners() {
        let listeners = Listeners::new();
        let errors = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&errors);
        let _sub = listeners.add(
            Box::new(|_: &[ExpenseRecord]| {}),
            Box::new(move |_: &SpendlogError| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        listeners.notify_error(&SpendlogError::Storage("disk full".into()));
        assert_eq!(errors.load(Ordering::SeqCst), 1);
    }
}
