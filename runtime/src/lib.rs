//! # Mutation State Runtime
//!
//! Lifecycle tracking for a single asynchronous mutation.
//!
//! This crate provides the [`MutationLifecycle`] controller that wraps an
//! arbitrary async operation and drives an observable
//! [`LifecycleSnapshot`](mutation_state_core::LifecycleSnapshot) through
//! `idle → loading → (success | error)`.
//!
//! Attempts run on the Tokio runtime: `wrap` and the bindings must be called
//! from within one.
//!
//! ## Core Components
//!
//! - **Controller**: [`MutationLifecycle`], owner of one observable snapshot
//! - **Bindings**: [`WrapBinding`] and [`MutateBinding`], thin adapters the host
//!   exposes, selected by [`MutationStateConfig::wrapper`]
//! - **View**: [`LifecycleView`], the snapshot plus a `clear_state` capability
//! - **Sources**: [`MutationSource`], named lookup of mutate functions
//!
//! ## Example
//!
//! ```
//! use mutation_state_runtime::{mutation_fn, MutationFn, MutationLifecycle, MutationStateConfig};
//!
//! # tokio_test::block_on(async {
//! let lifecycle = MutationLifecycle::<String>::new(MutationStateConfig::default());
//! let subscription = lifecycle.subscribe(|snapshot| {
//!     println!("loading={} success={}", snapshot.loading, snapshot.success);
//! });
//!
//! let save: MutationFn<String, u64, String> = mutation_fn(|_body: String| async { Ok(7) });
//! let mutator = lifecycle.mutator(Some(save));
//!
//! let id = mutator.mutate("profile".to_string())?.await?;
//! assert_eq!(id, Some(7));
//!
//! subscription.unsubscribe();
//! lifecycle.dispose();
//! # Ok::<(), mutation_state_runtime::MutationError<String>>(())
//! # });
//! ```

/// Host-facing adapters over a controller
pub mod binding;

/// Controller configuration
pub mod config;

/// Error types for the controller
pub mod error;

/// The mutation lifecycle controller
pub mod lifecycle;

/// Lifecycle metrics
pub mod metrics;

/// Named mutation functions
pub mod source;

pub use binding::{LifecycleView, MutateBinding, MutationBinding, WrapBinding};
pub use config::MutationStateConfig;
pub use error::MutationError;
pub use lifecycle::MutationLifecycle;
pub use source::{mutation_fn, MutationFn, MutationSource};

pub use mutation_state_core::{
    LifecyclePhase, LifecycleSnapshot, ObservableStore, SnapshotPatch, Subscription,
};
