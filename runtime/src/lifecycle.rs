//! The mutation lifecycle controller.
//!
//! [`MutationLifecycle`] owns one [`ObservableStore`] of [`LifecycleSnapshot`]
//! for its whole lifetime and drives it through
//! `idle → loading → (success | error)` around a caller-supplied
//! asynchronous operation.
//!
//! # Ordering
//!
//! [`MutationLifecycle::wrap`] records `loading` and hands the operation to
//! the Tokio runtime before it returns, so observers see the new attempt
//! before the caller first polls the returned future. The settle transition
//! is recorded before that future completes: awaiting `wrap(..)` and then
//! reading the snapshot always observes the post-transition value.
//!
//! Attempts are never cancelled. Dropping the future returned by `wrap`
//! detaches the caller; the attempt still settles and records its outcome.
//!
//! Overlapping attempts are not queued. Each one overwrites the snapshot
//! when it settles, so the last attempt to settle wins.

use crate::binding::{LifecycleView, MutateBinding, MutationBinding, WrapBinding};
use crate::config::MutationStateConfig;
use crate::error::MutationError;
use crate::metrics;
use crate::source::{MutationFn, MutationSource};
use mutation_state_core::{LifecycleSnapshot, ObservableStore, SnapshotPatch, Subscription};
use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

/// Lifecycle tracker for one mutation.
///
/// Cloning yields another handle to the same snapshot; bindings and in-flight
/// attempts hold such clones. To track two independent mutations, create two
/// controllers.
///
/// # Type Parameters
///
/// - `E`: The error type of the tracked operation, recorded in the snapshot
///
/// # Example
///
/// ```
/// use mutation_state_runtime::{MutationLifecycle, MutationStateConfig};
///
/// # tokio_test::block_on(async {
/// let lifecycle = MutationLifecycle::<String>::new(MutationStateConfig::default());
///
/// let value = lifecycle.wrap(|| async { Ok::<_, String>(42) }).await;
///
/// assert_eq!(value, Ok(Some(42)));
/// assert!(lifecycle.snapshot().success);
/// # });
/// ```
pub struct MutationLifecycle<E> {
    store: ObservableStore<LifecycleSnapshot<E>>,
    config: Arc<MutationStateConfig>,
}

impl<E> MutationLifecycle<E> {
    /// The configuration this controller was created with
    #[must_use]
    pub fn config(&self) -> &MutationStateConfig {
        &self.config
    }

    /// Check if [`dispose`](Self::dispose) has been called
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.store.is_disposed()
    }
}

impl<E> MutationLifecycle<E>
where
    E: Clone + Debug + Send + Sync + 'static,
{
    /// Create a controller whose snapshot starts idle
    #[must_use]
    pub fn new(config: MutationStateConfig) -> Self {
        tracing::debug!(
            mutation = config.effective_mutation_name(),
            "Attaching mutation lifecycle"
        );
        Self {
            store: ObservableStore::new(LifecycleSnapshot::idle()),
            config: Arc::new(config),
        }
    }

    /// The current snapshot.
    ///
    /// Returns the idle snapshot once the controller has been disposed.
    #[must_use]
    pub fn snapshot(&self) -> LifecycleSnapshot<E> {
        self.store.current_value().unwrap_or_default()
    }

    /// Register a listener for every subsequent snapshot
    pub fn subscribe<F>(&self, listener: F) -> Subscription<LifecycleSnapshot<E>>
    where
        F: Fn(&LifecycleSnapshot<E>) + Send + Sync + 'static,
    {
        self.store.subscribe(listener)
    }

    /// Set the snapshot to `{loading: false, error: None, success: false}`
    pub fn initialize(&self) {
        self.set_lifecycle_state(SnapshotPatch::idle());
    }

    pub(crate) fn set_lifecycle_state(&self, patch: SnapshotPatch<E>) {
        self.store.next(patch);
    }

    /// Run `operation` as a tracked attempt.
    ///
    /// Before returning, records `{loading: true, error: None, success: false}`,
    /// invokes `operation` and spawns the resulting future on the Tokio
    /// runtime together with its settle step. The attempt therefore runs to
    /// completion and records its outcome whether or not the returned future
    /// is awaited or dropped.
    ///
    /// The returned future resolves as follows:
    ///
    /// - Operation succeeds with `v`: records `{loading: false, success: true}`
    ///   (unless `set_state_after_success` is disabled) and yields `Ok(Some(v))`.
    /// - Operation fails with `e`: records `{loading: false, error: e}`, then
    ///   yields `Err(MutationError::Operation(e))` if `propagate_error` is
    ///   enabled, or `Ok(None)` if the failure is absorbed.
    ///
    /// If the controller is disposed while the attempt is pending, the settle
    /// transition is inert.
    ///
    /// # Errors
    ///
    /// Returns [`MutationError::Operation`] when the operation fails and
    /// `propagate_error` is enabled, and [`MutationError::Interrupted`] when
    /// the spawned attempt ends without settling.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn wrap<F, Fut, R>(
        &self,
        operation: F,
    ) -> impl Future<Output = Result<Option<R>, MutationError<E>>> + Send + 'static + use<E, F, Fut, R>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
        R: Send + 'static,
    {
        let attempt = self.clone();
        let span = tracing::debug_span!(
            "mutation_attempt",
            mutation = self.config.effective_mutation_name()
        );

        span.in_scope(|| tracing::debug!("Starting mutation attempt"));
        metrics::record_attempt(self.config.effective_mutation_name());
        self.set_lifecycle_state(SnapshotPatch::loading());

        let pending = operation();
        let started = Instant::now();

        let handle = tokio::spawn(
            async move {
                let outcome = pending.await;
                attempt.settle(outcome, started)
            }
            .instrument(span),
        );

        async move {
            match handle.await {
                Ok(result) => result,
                Err(join_error) => {
                    tracing::error!(error = %join_error, "Mutation attempt did not settle");
                    Err(MutationError::Interrupted(join_error.to_string()))
                },
            }
        }
    }

    fn settle<R>(
        &self,
        outcome: Result<R, E>,
        started: Instant,
    ) -> Result<Option<R>, MutationError<E>> {
        let name = self.config.effective_mutation_name();
        metrics::record_settled(name, outcome.is_ok(), started.elapsed());

        match outcome {
            Ok(value) => {
                tracing::debug!("Mutation attempt succeeded");
                if self.config.set_state_after_success {
                    self.set_lifecycle_state(SnapshotPatch::succeeded());
                }
                Ok(Some(value))
            },
            Err(error) => {
                tracing::warn!(
                    error = ?error,
                    propagate = self.config.propagate_error,
                    "Mutation attempt failed"
                );
                self.set_lifecycle_state(SnapshotPatch::failed(error.clone()));
                if self.config.propagate_error {
                    Err(MutationError::Operation(error))
                } else {
                    Ok(None)
                }
            },
        }
    }

    /// Wrap a call to `mutate_fn(args)`.
    ///
    /// Fails immediately, before any lifecycle state changes, when
    /// `mutate_fn` is `None`. Otherwise behaves as [`wrap`](Self::wrap).
    ///
    /// # Errors
    ///
    /// Returns [`MutationError::MissingMutationFunction`] when no function is
    /// supplied. The returned future fails as [`wrap`](Self::wrap) does.
    ///
    /// # Panics
    ///
    /// Panics if a function is supplied and this is called outside a Tokio
    /// runtime.
    pub fn invoke_named_mutation<A, R>(
        &self,
        mutate_fn: Option<&MutationFn<A, R, E>>,
        args: A,
    ) -> Result<
        impl Future<Output = Result<Option<R>, MutationError<E>>> + Send + 'static + use<E, A, R>,
        MutationError<E>,
    >
    where
        R: Send + 'static,
    {
        let Some(mutate_fn) = mutate_fn else {
            let name = self.config.effective_mutation_name().to_string();
            tracing::error!(mutation = %name, "No mutation function supplied");
            return Err(MutationError::MissingMutationFunction { name });
        };

        let mutate_fn = Arc::clone(mutate_fn);
        Ok(self.wrap(move || mutate_fn(args)))
    }

    /// Reset the snapshot to idle.
    ///
    /// Attempts already in flight are not cancelled and still record their
    /// outcome when they settle.
    pub fn clear(&self) {
        tracing::debug!(
            mutation = self.config.effective_mutation_name(),
            "Clearing mutation state"
        );
        metrics::record_cleared(self.config.effective_mutation_name());
        self.set_lifecycle_state(SnapshotPatch::idle());
    }

    /// The snapshot plus a `clear_state` capability, exposed under `prop_name`
    #[must_use]
    pub fn view(&self) -> LifecycleView<E> {
        LifecycleView::new(self.clone())
    }

    /// Adapter exposing [`wrap`](Self::wrap) under `wrap_name`
    #[must_use]
    pub fn wrapper(&self) -> WrapBinding<E> {
        WrapBinding::new(self.clone())
    }

    /// Adapter that looks up and wraps the mutate function from `source`
    #[must_use]
    pub fn mutator<A, R, S>(&self, source: S) -> MutateBinding<A, R, E>
    where
        R: Send + 'static,
        S: MutationSource<A, R, E> + 'static,
    {
        MutateBinding::new(self.clone(), Arc::new(source))
    }

    /// The adapter selected by the `wrapper` option
    #[must_use]
    pub fn bind<A, R, S>(&self, source: S) -> MutationBinding<A, R, E>
    where
        R: Send + 'static,
        S: MutationSource<A, R, E> + 'static,
    {
        if self.config.wrapper {
            MutationBinding::Wrap(self.wrapper())
        } else {
            MutationBinding::Mutate(self.mutator(source))
        }
    }

    /// Detach: release the snapshot and every listener.
    ///
    /// Attempts still in flight keep running; their settle transition no
    /// longer reaches anyone.
    pub fn dispose(&self) {
        tracing::debug!(
            mutation = self.config.effective_mutation_name(),
            "Detaching mutation lifecycle"
        );
        self.store.dispose();
    }
}

impl<E> Default for MutationLifecycle<E>
where
    E: Clone + Debug + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(MutationStateConfig::default())
    }
}

impl<E> Clone for MutationLifecycle<E> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<E: Debug> Debug for MutationLifecycle<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutationLifecycle")
            .field("mutation", &self.config.effective_mutation_name())
            .field("store", &self.store)
            .finish()
    }
}
