//! Adapters exposing a controller to its host.
//!
//! A host receives two things from a [`MutationLifecycle`]:
//!
//! - A [`LifecycleView`]: the snapshot plus a `clear_state` capability,
//!   exposed under `prop_name`.
//! - A [`MutationBinding`]: either the raw wrap capability
//!   ([`WrapBinding`], under `wrap_name`) or an auto-invoking mutate
//!   capability ([`MutateBinding`], under `mutation_name`), chosen by the
//!   `wrapper` option.
//!
//! Both bindings are thin: all lifecycle logic lives in the controller.

use crate::error::MutationError;
use crate::lifecycle::MutationLifecycle;
use crate::source::MutationSource;
use mutation_state_core::{LifecyclePhase, LifecycleSnapshot};
use std::fmt::{self, Debug};
use std::future::Future;
use std::sync::Arc;

/// The lifecycle snapshot as handed to the host, with `clear_state` attached
#[derive(Clone)]
pub struct LifecycleView<E> {
    snapshot: LifecycleSnapshot<E>,
    lifecycle: MutationLifecycle<E>,
}

impl<E> LifecycleView<E>
where
    E: Clone + Debug + Send + Sync + 'static,
{
    pub(crate) fn new(lifecycle: MutationLifecycle<E>) -> Self {
        Self {
            snapshot: lifecycle.snapshot(),
            lifecycle,
        }
    }

    /// Name the view is exposed under
    #[must_use]
    pub fn name(&self) -> &str {
        &self.lifecycle.config().prop_name
    }

    /// The snapshot captured when the view was taken
    #[must_use]
    pub const fn snapshot(&self) -> &LifecycleSnapshot<E> {
        &self.snapshot
    }

    /// Whether the attempt was outstanding when the view was taken
    #[must_use]
    pub const fn loading(&self) -> bool {
        self.snapshot.loading
    }

    /// Failure recorded when the view was taken
    #[must_use]
    pub const fn error(&self) -> Option<&E> {
        self.snapshot.error.as_ref()
    }

    /// Whether the attempt had succeeded when the view was taken
    #[must_use]
    pub const fn success(&self) -> bool {
        self.snapshot.success
    }

    /// Phase of the captured snapshot
    #[must_use]
    pub const fn phase(&self) -> LifecyclePhase {
        self.snapshot.phase()
    }

    /// Reset the controller's snapshot to idle.
    ///
    /// The view itself is a capture and keeps its values; take a new
    /// [`view`](MutationLifecycle::view) to observe the reset.
    pub fn clear_state(&self) {
        self.lifecycle.clear();
    }
}

impl<E: Debug> Debug for LifecycleView<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleView")
            .field("loading", &self.snapshot.loading)
            .field("error", &self.snapshot.error)
            .field("success", &self.snapshot.success)
            .finish_non_exhaustive()
    }
}

/// Raw wrap capability, exposed under `wrap_name`
#[derive(Debug, Clone)]
pub struct WrapBinding<E> {
    lifecycle: MutationLifecycle<E>,
}

impl<E> WrapBinding<E>
where
    E: Clone + Debug + Send + Sync + 'static,
{
    pub(crate) const fn new(lifecycle: MutationLifecycle<E>) -> Self {
        Self { lifecycle }
    }

    /// Name the capability is exposed under
    #[must_use]
    pub fn name(&self) -> &str {
        &self.lifecycle.config().wrap_name
    }

    /// Track `operation` as described by [`MutationLifecycle::wrap`]
    ///
    /// # Errors
    ///
    /// Fails with [`MutationError::Operation`] when the operation fails and
    /// `propagate_error` is enabled.
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
        self.lifecycle.wrap(operation)
    }
}

/// Auto-invoking mutate capability, exposed under `mutation_name`
///
/// Each call looks the mutate function up in its source, so a host can
/// supply the function after the binding is created.
pub struct MutateBinding<A, R, E> {
    lifecycle: MutationLifecycle<E>,
    source: Arc<dyn MutationSource<A, R, E>>,
}

impl<A, R, E> MutateBinding<A, R, E>
where
    E: Clone + Debug + Send + Sync + 'static,
    R: Send + 'static,
{
    pub(crate) fn new(
        lifecycle: MutationLifecycle<E>,
        source: Arc<dyn MutationSource<A, R, E>>,
    ) -> Self {
        Self { lifecycle, source }
    }

    /// Name the capability is exposed under
    #[must_use]
    pub fn name(&self) -> &str {
        self.lifecycle.config().effective_mutation_name()
    }

    /// Look up the mutate function and run it with `args` as a tracked attempt
    ///
    /// # Errors
    ///
    /// Returns [`MutationError::MissingMutationFunction`] immediately when the
    /// source has no function under the mutation name. The returned future
    /// fails with [`MutationError::Operation`] when the operation fails and
    /// `propagate_error` is enabled.
    ///
    /// # Panics
    ///
    /// Panics if the function is found and this is called outside a Tokio
    /// runtime.
    pub fn mutate(
        &self,
        args: A,
    ) -> Result<
        impl Future<Output = Result<Option<R>, MutationError<E>>> + Send + 'static + use<A, R, E>,
        MutationError<E>,
    > {
        let mutate_fn = self.source.mutation(self.name());
        self.lifecycle.invoke_named_mutation(mutate_fn.as_ref(), args)
    }
}

impl<A, R, E> Clone for MutateBinding<A, R, E> {
    fn clone(&self) -> Self {
        Self {
            lifecycle: self.lifecycle.clone(),
            source: Arc::clone(&self.source),
        }
    }
}

impl<A, R, E> Debug for MutateBinding<A, R, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutateBinding")
            .field("mutation", &self.lifecycle.config().effective_mutation_name())
            .finish_non_exhaustive()
    }
}

/// The capability selected by the `wrapper` option
#[derive(Debug, Clone)]
pub enum MutationBinding<A, R, E> {
    /// Raw wrap capability (`wrapper = true`)
    Wrap(WrapBinding<E>),

    /// Auto-invoking mutate capability (`wrapper = false`)
    Mutate(MutateBinding<A, R, E>),
}

impl<A, R, E> MutationBinding<A, R, E>
where
    E: Clone + Debug + Send + Sync + 'static,
    R: Send + 'static,
{
    /// Name the selected capability is exposed under
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Wrap(binding) => binding.name(),
            Self::Mutate(binding) => binding.name(),
        }
    }

    /// The wrap capability, if selected
    #[must_use]
    pub const fn as_wrap(&self) -> Option<&WrapBinding<E>> {
        match self {
            Self::Wrap(binding) => Some(binding),
            Self::Mutate(_) => None,
        }
    }

    /// The mutate capability, if selected
    #[must_use]
    pub const fn as_mutate(&self) -> Option<&MutateBinding<A, R, E>> {
        match self {
            Self::Mutate(binding) => Some(binding),
            Self::Wrap(_) => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::MutationStateConfig;
    use crate::source::{mutation_fn, MutationFn};
    use std::collections::HashMap;

    type Save = MutationFn<String, usize, String>;

    fn save_fn() -> Save {
        mutation_fn(|body: String| async move { Ok(body.len()) })
    }

    #[tokio::test]
    async fn test_bind_selects_mutate_by_default() {
        let lifecycle = MutationLifecycle::<String>::default();

        let binding = lifecycle.bind(Some(save_fn()));

        assert_eq!(binding.name(), "mutate");
        assert!(binding.as_wrap().is_none());
        let mutate = binding.as_mutate().expect("mutate binding");
        let length = mutate.mutate("hello".to_string()).unwrap().await;
        assert_eq!(length, Ok(Some(5)));
        assert!(lifecycle.snapshot().success);
    }

    #[tokio::test]
    async fn test_bind_selects_wrap_when_configured() {
        let lifecycle = MutationLifecycle::<String>::new(
            MutationStateConfig::default()
                .with_wrapper(true)
                .with_wrap_name("track"),
        );

        let binding: MutationBinding<String, usize, String> = lifecycle.bind(None::<Save>);

        assert_eq!(binding.name(), "track");
        let wrap = binding.as_wrap().expect("wrap binding");
        let result = wrap
            .wrap(|| async { Err::<usize, _>("offline".to_string()) })
            .await;
        assert_eq!(result, Ok(None));
        assert_eq!(lifecycle.snapshot().error.as_deref(), Some("offline"));
    }

    #[tokio::test]
    async fn test_mutate_looks_up_configured_name() {
        let lifecycle = MutationLifecycle::<String>::new(
            MutationStateConfig::default().with_mutation_name("saveDraft"),
        );
        let mut source: HashMap<String, Save> = HashMap::new();
        source.insert("saveDraft".to_string(), save_fn());

        let binding = lifecycle.mutator(source);

        assert_eq!(binding.name(), "saveDraft");
        assert!(format!("{binding:?}").contains("saveDraft"));
        assert_eq!(binding.mutate("abc".to_string()).unwrap().await, Ok(Some(3)));
    }

    #[test]
    fn test_mutate_without_function_is_configuration_error() {
        let lifecycle = MutationLifecycle::<String>::default();
        let binding = lifecycle.mutator(HashMap::<String, Save>::new());

        let error = binding.mutate("body".to_string()).err().expect("should fail");

        assert!(error.is_missing_mutation_function());
        assert_eq!(lifecycle.snapshot(), LifecycleSnapshot::idle());
    }

    #[tokio::test]
    async fn test_view_exposes_snapshot_and_clear_state() {
        let lifecycle = MutationLifecycle::<String>::new(
            MutationStateConfig::default().with_prop_name("saveState"),
        );
        let _ = lifecycle
            .wrap(|| async { Err::<(), _>("conflict".to_string()) })
            .await;

        let view = lifecycle.view();
        assert_eq!(view.name(), "saveState");
        assert!(!view.loading());
        assert!(!view.success());
        assert_eq!(view.error().map(String::as_str), Some("conflict"));
        assert_eq!(view.phase(), LifecyclePhase::Failed);

        view.clear_state();

        assert_eq!(lifecycle.view().phase(), LifecyclePhase::Idle);
        // The earlier view is a capture.
        assert_eq!(view.phase(), LifecyclePhase::Failed);
    }
}
