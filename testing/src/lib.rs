//! # Mutation State Testing
//!
//! Testing utilities and helpers for mutation lifecycle tracking.
//!
//! This crate provides:
//! - [`RecordingListener`]: captures every snapshot a store fans out
//! - [`ControlledOperation`]: an async operation settled by the test
//! - [`LifecycleTest`]: Given-When-Then assertions over one tracked attempt
//!
//! ## Example
//!
//! ```
//! use mutation_state_runtime::{LifecyclePhase, MutationLifecycle};
//! use mutation_state_testing::{ControlledOperation, RecordingListener};
//!
//! # tokio_test::block_on(async {
//! let lifecycle = MutationLifecycle::<String>::default();
//! let recorder = RecordingListener::new();
//! let _subscription = lifecycle.subscribe(recorder.listener());
//!
//! let (operation, settle) = ControlledOperation::<u32, String>::new();
//! let pending = lifecycle.wrap(|| operation);
//! assert_eq!(lifecycle.snapshot().phase(), LifecyclePhase::Loading);
//!
//! settle.resolve(42);
//! assert_eq!(pending.await, Ok(Some(42)));
//! assert_eq!(recorder.len(), 2);
//! # });
//! ```

/// Operations settled explicitly by the test
pub mod operation;

/// Listener that records every notification
pub mod recorder;


pub use lifecycle_test::{LifecycleTest, Settlement};
pub use operation::{ControlledOperation, Settle};
pub use recorder::RecordingListener;

/// Install a test-friendly `tracing` subscriber.
///
/// Honors `RUST_LOG`; safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}
