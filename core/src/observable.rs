//! Observable state store.
//!
//! [`ObservableStore`] holds a single value plus an ordered set of listeners.
//! Updates are partial ([`Merge::Patch`]) and are fanned out synchronously:
//! when no other pass is running, by the time [`ObservableStore::next`]
//! returns every listener has observed the new value exactly once.
//!
//! # Notification passes
//!
//! Each merged value gets one notification pass over a snapshot of the
//! listener set taken when the pass starts:
//!
//! - Listeners registered during the pass are first invoked on the next pass.
//! - A listener unsubscribed during the pass (by itself or by an earlier
//!   listener) is skipped for the remainder of the pass and never invoked again.
//!
//! Passes never overlap. A `next` issued while a pass is running, either
//! re-entrantly from a listener or from another thread, merges immediately
//! and queues its value; the caller already delivering runs the queued
//! passes in merge order before returning. Every listener therefore sees
//! values in the order they were merged, and its last observed value is
//! the store's current value.
//!
//! The store lock is never held while a listener runs, so listeners may
//! subscribe, unsubscribe, call `next` or dispose the store re-entrantly.
//!
//! # Example
//!
//! ```
//! use mutation_state_core::observable::ObservableStore;
//! use mutation_state_core::snapshot::{LifecycleSnapshot, SnapshotPatch};
//! use std::sync::{Arc, Mutex};
//!
//! let store = ObservableStore::new(LifecycleSnapshot::<String>::idle());
//! let seen = Arc::new(Mutex::new(Vec::new()));
//!
//! let sink = Arc::clone(&seen);
//! let subscription = store.subscribe(move |snapshot: &LifecycleSnapshot<String>| {
//!     sink.lock().unwrap().push(snapshot.loading);
//! });
//!
//! store.next(SnapshotPatch::loading());
//! subscription.unsubscribe();
//! store.next(SnapshotPatch::succeeded());
//!
//! assert_eq!(*seen.lock().unwrap(), vec![true]);
//! ```

use crate::merge::Merge;
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// A shared listener callback.
///
/// Subscribing the same `Listener` twice creates two independent
/// registrations.
pub type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Registration<T> {
    id: u64,
    active: Arc<AtomicBool>,
    listener: Listener<T>,
}

impl<T> Clone for Registration<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            active: Arc::clone(&self.active),
            listener: Arc::clone(&self.listener),
        }
    }
}

struct Inner<T> {
    /// `None` once the store has been disposed.
    value: Option<T>,
    listeners: Vec<Registration<T>>,
    next_id: u64,
    /// Merged values waiting for their notification pass.
    undelivered: VecDeque<T>,
    /// True while some caller is running notification passes.
    delivering: bool,
}

/// A value plus an ordered set of change listeners.
///
/// Cloning the store yields another handle to the same value and listener set.
pub struct ObservableStore<T> {
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T> ObservableStore<T> {
    /// Create a store seeded with `initial`.
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                value: Some(initial),
                listeners: Vec::new(),
                next_id: 0,
                undelivered: VecDeque::new(),
                delivering: false,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `listener` for every subsequent update.
    ///
    /// The listener is not invoked with the current value. Returns a
    /// [`Subscription`] that removes exactly this registration.
    ///
    /// After [`dispose`](Self::dispose) nothing is registered and the
    /// returned subscription is already inactive.
    pub fn subscribe<F>(&self, listener: F) -> Subscription<T>
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.subscribe_shared(Arc::new(listener))
    }

    /// Register an already shared listener.
    ///
    /// No deduplication is performed: each call creates its own registration
    /// with its own [`Subscription`].
    pub fn subscribe_shared(&self, listener: Listener<T>) -> Subscription<T> {
        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id += 1;

        if inner.value.is_none() {
            tracing::debug!(subscription = id, "Ignoring subscribe on disposed store");
            return Subscription {
                id,
                active: Arc::new(AtomicBool::new(false)),
                store: Weak::new(),
            };
        }

        let active = Arc::new(AtomicBool::new(true));
        inner.listeners.push(Registration {
            id,
            active: Arc::clone(&active),
            listener,
        });
        tracing::debug!(
            subscription = id,
            listeners = inner.listeners.len(),
            "Listener subscribed"
        );

        Subscription {
            id,
            active,
            store: Arc::downgrade(&self.inner),
        }
    }

    /// Number of currently registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    /// Whether [`dispose`](Self::dispose) has been called.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.lock().value.is_none()
    }

    /// Release the value and every listener.
    ///
    /// Afterwards `next` is inert and `current_value` returns `None`.
    /// Listeners still pending in an in-progress notification pass are
    /// skipped.
    pub fn dispose(&self) {
        let released = {
            let mut inner = self.lock();
            inner.value = None;
            inner.undelivered.clear();
            std::mem::take(&mut inner.listeners)
        };

        for registration in &released {
            registration.active.store(false, Ordering::Release);
        }
        tracing::debug!(listeners = released.len(), "Store disposed");
        // `released` (and the closures it owns) drop here, outside the lock.
    }
}

impl<T: Clone> ObservableStore<T> {
    /// The latest value, or `None` after disposal.
    #[must_use]
    pub fn current_value(&self) -> Option<T> {
        self.lock().value.clone()
    }
}

impl<T: Merge + Clone> ObservableStore<T> {
    /// Merge `patch` into the current value and notify every listener.
    ///
    /// Listeners run synchronously, in subscription order, with the merged
    /// value. If another pass is already running the value is queued and
    /// delivered by that pass's caller. Does nothing after disposal.
    pub fn next(&self, patch: T::Patch) {
        {
            let mut inner = self.lock();
            let Some(current) = inner.value.as_ref() else {
                tracing::debug!("Ignoring update on disposed store");
                return;
            };
            let merged = current.merge(patch);
            inner.value = Some(merged.clone());
            inner.undelivered.push_back(merged);
            if inner.delivering {
                tracing::trace!(
                    queued = inner.undelivered.len(),
                    "Pass in progress, queueing update"
                );
                return;
            }
            inner.delivering = true;
        }

        let _reset = DeliveryReset { inner: &self.inner };
        loop {
            let (value, registrations) = {
                let mut inner = self.lock();
                let Some(value) = inner.undelivered.pop_front() else {
                    inner.delivering = false;
                    return;
                };
                (value, inner.listeners.clone())
            };

            tracing::trace!(listeners = registrations.len(), "Notifying listeners");
            for registration in &registrations {
                if registration.active.load(Ordering::Acquire) {
                    (registration.listener)(&value);
                }
            }
        }
    }
}

/// Releases delivery if a listener panics mid-pass.
struct DeliveryReset<'a, T> {
    inner: &'a Mutex<Inner<T>>,
}

impl<T> Drop for DeliveryReset<'_, T> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            inner.delivering = false;
            inner.undelivered.clear();
        }
    }
}

impl<T> Clone for ObservableStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for ObservableStore<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("ObservableStore")
            .field("value", &inner.value)
            .field("listeners", &inner.listeners.len())
            .finish()
    }
}

/// Capability to remove one listener registration.
///
/// Dropping a `Subscription` without calling [`unsubscribe`](Self::unsubscribe)
/// leaves the listener registered. The handle does not keep the store alive.
#[must_use = "dropping a Subscription keeps the listener registered; call unsubscribe() to remove it"]
pub struct Subscription<T> {
    id: u64,
    active: Arc<AtomicBool>,
    store: Weak<Mutex<Inner<T>>>,
}

impl<T> Subscription<T> {
    /// Remove this registration from future notifications.
    ///
    /// Takes effect immediately, including for the rest of a notification
    /// pass that is currently running.
    pub fn unsubscribe(self) {
        self.active.store(false, Ordering::Release);

        let Some(inner) = self.store.upgrade() else {
            return;
        };
        let removed = {
            let mut inner = inner.lock().unwrap_or_else(PoisonError::into_inner);
            inner
                .listeners
                .iter()
                .position(|registration| registration.id == self.id)
                .map(|index| inner.listeners.remove(index))
        };
        if removed.is_some() {
            tracing::debug!(subscription = self.id, "Listener unsubscribed");
        }
    }

    /// Whether this registration will still receive notifications.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::snapshot::{LifecyclePhase, LifecycleSnapshot, SnapshotPatch};

    type Snapshot = LifecycleSnapshot<String>;

    fn recorder() -> (Arc<Mutex<Vec<Snapshot>>>, impl Fn(&Snapshot) + Send + Sync + 'static) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);
        (calls, move |snapshot: &Snapshot| {
            sink.lock().unwrap().push(snapshot.clone());
        })
    }

    #[test]
    fn test_subscribe_does_not_invoke_listener() {
        let store = ObservableStore::new(Snapshot::idle());
        let (calls, listener) = recorder();

        let _subscription = store.subscribe(listener);

        assert!(calls.lock().unwrap().is_empty());
        assert_eq!(store.listener_count(), 1);
    }

    #[test]
    fn test_next_merges_and_notifies() {
        let store = ObservableStore::new(Snapshot::idle());
        let (calls, listener) = recorder();
        let _subscription = store.subscribe(listener);

        store.next(SnapshotPatch::failed("boom".to_string()));
        store.next(SnapshotPatch::new().with_success(true));

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].error.as_deref(), Some("boom"));
        assert!(!calls[0].success);
        // Absent fields are retained across updates.
        assert_eq!(calls[1].error.as_deref(), Some("boom"));
        assert!(calls[1].success);
        assert_eq!(store.current_value().unwrap(), calls[1]);
    }

    #[test]
    fn test_listeners_notified_in_subscription_order() {
        let store = ObservableStore::new(Snapshot::idle());
        let order = Arc::new(Mutex::new(Vec::new()));

        let mut subscriptions = Vec::new();
        for index in 0..3 {
            let order = Arc::clone(&order);
            subscriptions.push(store.subscribe(move |_: &Snapshot| {
                order.lock().unwrap().push(index);
            }));
        }

        store.next(SnapshotPatch::loading());

        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_duplicate_subscriptions_are_independent() {
        let store = ObservableStore::new(Snapshot::idle());
        let count = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&count);
        let listener: Listener<Snapshot> = Arc::new(move |_: &Snapshot| {
            *counter.lock().unwrap() += 1;
        });

        let first = store.subscribe_shared(Arc::clone(&listener));
        let _second = store.subscribe_shared(listener);

        store.next(SnapshotPatch::loading());
        assert_eq!(*count.lock().unwrap(), 2);

        first.unsubscribe();
        store.next(SnapshotPatch::succeeded());
        assert_eq!(*count.lock().unwrap(), 3);
    }

    #[test]
    fn test_unsubscribe_during_pass_skips_listener() {
        let store = ObservableStore::new(Snapshot::idle());
        let (calls, listener) = recorder();
        let victim = Arc::new(Mutex::new(None::<Subscription<Snapshot>>));

        let slot = Arc::clone(&victim);
        let _remover = store.subscribe(move |_: &Snapshot| {
            if let Some(subscription) = slot.lock().unwrap().take() {
                subscription.unsubscribe();
            }
        });
        *victim.lock().unwrap() = Some(store.subscribe(listener));

        store.next(SnapshotPatch::loading());
        store.next(SnapshotPatch::succeeded());

        assert!(calls.lock().unwrap().is_empty());
        assert_eq!(store.listener_count(), 1);
    }

    #[test]
    fn test_listener_can_unsubscribe_itself() {
        let store = ObservableStore::new(Snapshot::idle());
        let count = Arc::new(Mutex::new(0));
        let own = Arc::new(Mutex::new(None::<Subscription<Snapshot>>));

        let counter = Arc::clone(&count);
        let slot = Arc::clone(&own);
        let subscription = store.subscribe(move |_: &Snapshot| {
            *counter.lock().unwrap() += 1;
            if let Some(subscription) = slot.lock().unwrap().take() {
                subscription.unsubscribe();
            }
        });
        *own.lock().unwrap() = Some(subscription);

        store.next(SnapshotPatch::loading());
        store.next(SnapshotPatch::succeeded());

        assert_eq!(*count.lock().unwrap(), 1);
        assert_eq!(store.listener_count(), 0);
    }

    #[test]
    fn test_subscribe_during_pass_waits_for_next_pass() {
        let store = ObservableStore::new(Snapshot::idle());
        let (calls, listener) = recorder();
        let pending = Arc::new(Mutex::new(Some(listener)));
        let late = Arc::new(Mutex::new(Vec::new()));

        let handle = store.clone();
        let registered = Arc::clone(&late);
        let _registrar = store.subscribe(move |_: &Snapshot| {
            if let Some(listener) = pending.lock().unwrap().take() {
                registered.lock().unwrap().push(handle.subscribe(listener));
            }
        });

        store.next(SnapshotPatch::loading());
        assert!(calls.lock().unwrap().is_empty());

        store.next(SnapshotPatch::succeeded());
        assert_eq!(calls.lock().unwrap().len(), 1);
        assert!(calls.lock().unwrap()[0].success);
    }

    #[test]
    fn test_reentrant_next_is_delivered_after_current_pass() {
        let store = ObservableStore::new(Snapshot::idle());
        let handle = store.clone();
        let fired = Arc::new(AtomicBool::new(false));
        let _settler = store.subscribe(move |snapshot: &Snapshot| {
            if snapshot.loading && !fired.swap(true, Ordering::SeqCst) {
                handle.next(SnapshotPatch::succeeded());
            }
        });
        let (calls, listener) = recorder();
        let _watcher = store.subscribe(listener);

        store.next(SnapshotPatch::loading());

        let phases: Vec<_> = calls.lock().unwrap().iter().map(Snapshot::phase).collect();
        assert_eq!(phases, vec![LifecyclePhase::Loading, LifecyclePhase::Succeeded]);
        assert_eq!(
            store.current_value().as_ref(),
            calls.lock().unwrap().last()
        );
    }

    #[test]
    fn test_concurrent_updates_delivered_in_merge_order() {
        let store = ObservableStore::new(LifecycleSnapshot::<usize>::idle());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _subscription = store.subscribe(move |snapshot: &LifecycleSnapshot<usize>| {
            sink.lock().unwrap().push(snapshot.error);
        });

        let writers: Vec<_> = (0..4)
            .map(|writer| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for step in 0..100 {
                        store.next(SnapshotPatch::failed(writer * 100 + step));
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 400);
        assert_eq!(seen.last().copied().flatten(), store.current_value().unwrap().error);
        // Each writer's own updates arrive in the order it issued them.
        for writer in 0..4 {
            let own: Vec<_> = seen
                .iter()
                .flatten()
                .filter(|value| **value / 100 == writer)
                .copied()
                .collect();
            assert!(own.windows(2).all(|pair| pair[0] < pair[1]));
            assert_eq!(own.len(), 100);
        }
    }

    #[test]
    fn test_panicking_listener_does_not_wedge_store() {
        let store = ObservableStore::new(Snapshot::idle());
        let armed = Arc::new(AtomicBool::new(true));
        let trigger = Arc::clone(&armed);
        let _faulty = store.subscribe(move |_: &Snapshot| {
            assert!(!trigger.swap(false, Ordering::SeqCst), "listener failure");
        });
        let (calls, listener) = recorder();
        let _watcher = store.subscribe(listener);

        let panicking = store.clone();
        let outcome = std::thread::spawn(move || panicking.next(SnapshotPatch::loading())).join();
        assert!(outcome.is_err());

        store.next(SnapshotPatch::succeeded());

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].success);
    }

    #[test]
    fn test_dispose_silences_store() {
        let store = ObservableStore::new(Snapshot::idle());
        let (calls, listener) = recorder();
        let subscription = store.subscribe(listener);

        store.dispose();
        store.next(SnapshotPatch::loading());

        assert!(calls.lock().unwrap().is_empty());
        assert!(store.is_disposed());
        assert!(store.current_value().is_none());
        assert!(!subscription.is_active());
        assert_eq!(store.listener_count(), 0);

        // Unsubscribing after disposal is harmless.
        subscription.unsubscribe();
    }

    #[test]
    fn test_subscribe_after_dispose_registers_nothing() {
        let store = ObservableStore::new(Snapshot::idle());
        store.dispose();

        let (calls, listener) = recorder();
        let subscription = store.subscribe(listener);
        store.next(SnapshotPatch::loading());

        assert!(!subscription.is_active());
        assert_eq!(store.listener_count(), 0);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_dispose_during_pass_skips_remaining_listeners() {
        let store = ObservableStore::new(Snapshot::idle());
        let handle = store.clone();
        let _disposer = store.subscribe(move |_: &Snapshot| handle.dispose());
        let (calls, listener) = recorder();
        let _late = store.subscribe(listener);

        store.next(SnapshotPatch::loading());

        assert!(calls.lock().unwrap().is_empty());
        assert!(store.is_disposed());
    }

    #[test]
    fn test_subscription_does_not_keep_store_alive() {
        let store = ObservableStore::new(Snapshot::idle());
        let subscription = store.subscribe(|_: &Snapshot| {});
        drop(store);

        assert!(subscription.is_active());
        subscription.unsubscribe();
    }
}
