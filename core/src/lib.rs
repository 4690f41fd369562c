//! # Mutation State Core
//!
//! Core types for tracking the lifecycle of an asynchronous mutation.
//!
//! This crate provides the leaf primitive the rest of the workspace builds on:
//! a generic observable value with merge-on-update semantics, plus the
//! lifecycle snapshot it usually holds.
//!
//! ## Core Concepts
//!
//! - **Observable store**: A value plus an ordered set of listeners
//! - **Patch**: A partial update, merged field by field into the current value
//! - **Lifecycle snapshot**: The `{loading, error, success}` triple of a mutation
//! - **Phase**: The `Idle | Loading | Succeeded | Failed` view of a snapshot
//!
//! ## Example
//!
//! ```
//! use mutation_state_core::{LifecyclePhase, LifecycleSnapshot, ObservableStore, SnapshotPatch};
//!
//! let store = ObservableStore::new(LifecycleSnapshot::<String>::idle());
//! let subscription = store.subscribe(|snapshot: &LifecycleSnapshot<String>| {
//!     println!("phase: {}", snapshot.phase());
//! });
//!
//! store.next(SnapshotPatch::loading());
//! store.next(SnapshotPatch::failed("rejected".to_string()));
//!
//! let snapshot = store.current_value().unwrap_or_default();
//! assert_eq!(snapshot.phase(), LifecyclePhase::Failed);
//!
//! subscription.unsubscribe();
//! store.dispose();
//! ```

/// Shallow field-wise merge of partial updates
pub mod merge;

/// Observable value with synchronous listener fan-out
pub mod observable;

/// Lifecycle snapshot, its patch type and phases
pub mod snapshot;

pub use merge::Merge;
pub use observable::{Listener, ObservableStore, Subscription};
pub use snapshot::{LifecyclePhase, LifecycleSnapshot, SnapshotPatch};
