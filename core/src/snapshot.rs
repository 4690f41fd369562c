//! Lifecycle snapshot of a tracked mutation.
//!
//! A [`LifecycleSnapshot`] is the `{loading, error, success}` triple
//! describing the most recent attempt of an asynchronous operation.
//! [`SnapshotPatch`] is its partial update, merged field by field.

use crate::merge::Merge;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Current status of a tracked mutation.
///
/// # Type Parameters
///
/// - `E`: The failure payload recorded when an attempt fails
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleSnapshot<E> {
    /// True while the wrapped operation is outstanding
    pub loading: bool,

    /// Failure payload of the most recent attempt
    pub error: Option<E>,

    /// True once the most recent attempt completed without failure
    pub success: bool,
}

impl<E> LifecycleSnapshot<E> {
    /// The snapshot before any attempt: `{loading: false, error: None, success: false}`
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            loading: false,
            error: None,
            success: false,
        }
    }

    /// Check if an attempt is outstanding
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Check if the most recent attempt succeeded
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.success
    }

    /// Failure payload of the most recent attempt, if any
    #[must_use]
    pub const fn error(&self) -> Option<&E> {
        self.error.as_ref()
    }

    /// State-machine view of this snapshot.
    ///
    /// `loading` takes precedence, then `error`, then `success`.
    #[must_use]
    pub const fn phase(&self) -> LifecyclePhase {
        if self.loading {
            LifecyclePhase::Loading
        } else if self.error.is_some() {
            LifecyclePhase::Failed
        } else if self.success {
            LifecyclePhase::Succeeded
        } else {
            LifecyclePhase::Idle
        }
    }
}

impl<E> Default for LifecycleSnapshot<E> {
    fn default() -> Self {
        Self::idle()
    }
}

impl<E: Clone> Merge for LifecycleSnapshot<E> {
    type Patch = SnapshotPatch<E>;

    fn merge(&self, patch: SnapshotPatch<E>) -> Self {
        Self {
            loading: patch.loading.unwrap_or(self.loading),
            error: match patch.error {
                Some(error) => error,
                None => self.error.clone(),
            },
            success: patch.success.unwrap_or(self.success),
        }
    }
}

/// Partial update of a [`LifecycleSnapshot`].
///
/// `None` means "keep the current value". For `error`, `Some(None)` clears
/// the recorded failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotPatch<E> {
    /// Replacement for `loading`
    pub loading: Option<bool>,

    /// Replacement for `error`
    pub error: Option<Option<E>>,

    /// Replacement for `success`
    pub success: Option<bool>,
}

impl<E> SnapshotPatch<E> {
    /// A patch that changes nothing
    #[must_use]
    pub const fn new() -> Self {
        Self {
            loading: None,
            error: None,
            success: None,
        }
    }

    /// Reset every field to the idle values
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            loading: Some(false),
            error: Some(None),
            success: Some(false),
        }
    }

    /// Start a fresh attempt, clearing the previous outcome
    #[must_use]
    pub const fn loading() -> Self {
        Self {
            loading: Some(true),
            error: Some(None),
            success: Some(false),
        }
    }

    /// Record a completed attempt, replacing any earlier outcome
    #[must_use]
    pub const fn succeeded() -> Self {
        Self {
            loading: Some(false),
            error: Some(None),
            success: Some(true),
        }
    }

    /// Record a failed attempt, replacing any earlier outcome
    #[must_use]
    pub const fn failed(error: E) -> Self {
        Self {
            loading: Some(false),
            error: Some(Some(error)),
            success: Some(false),
        }
    }

    /// Set `loading`
    #[must_use]
    pub const fn with_loading(mut self, loading: bool) -> Self {
        self.loading = Some(loading);
        self
    }

    /// Set or clear `error`
    #[must_use]
    pub fn with_error(mut self, error: Option<E>) -> Self {
        self.error = Some(error);
        self
    }

    /// Set `success`
    #[must_use]
    pub const fn with_success(mut self, success: bool) -> Self {
        self.success = Some(success);
        self
    }

    /// Check if the patch changes nothing
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.loading.is_none() && self.error.is_none() && self.success.is_none()
    }
}

impl<E> Default for SnapshotPatch<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// The four states of a tracked mutation.
///
/// ```text
/// Idle | Succeeded | Failed --wrap--> Loading
/// Loading --resolve--> Succeeded
/// Loading --reject---> Failed
/// Succeeded | Failed --clear--> Idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecyclePhase {
    /// No attempt yet, or cleared
    Idle,
    /// An attempt is outstanding
    Loading,
    /// The most recent attempt completed
    Succeeded,
    /// The most recent attempt failed
    Failed,
}

impl LifecyclePhase {
    /// Check if the phase records an outcome
    #[must_use]
    pub const fn is_settled(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Loading => write!(f, "loading"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_snapshot() {
        let snapshot = LifecycleSnapshot::<String>::idle();
        assert!(!snapshot.loading);
        assert!(snapshot.error.is_none());
        assert!(!snapshot.success);
        assert_eq!(snapshot.phase(), LifecyclePhase::Idle);
        assert_eq!(snapshot, LifecycleSnapshot::default());
    }

    #[test]
    fn test_loading_patch_clears_previous_outcome() {
        let failed = LifecycleSnapshot {
            loading: false,
            error: Some("timeout".to_string()),
            success: false,
        };

        let next = failed.merge(SnapshotPatch::loading());

        assert_eq!(
            next,
            LifecycleSnapshot {
                loading: true,
                error: None,
                success: false,
            }
        );
        assert_eq!(next.phase(), LifecyclePhase::Loading);
    }

    #[test]
    fn test_succeeded_patch_clears_earlier_failure() {
        let failed = LifecycleSnapshot {
            loading: false,
            error: Some("timeout".to_string()),
            success: false,
        };

        let done = failed.merge(SnapshotPatch::succeeded());

        assert_eq!(
            done,
            LifecycleSnapshot {
                loading: false,
                error: None,
                success: true,
            }
        );
        assert_eq!(done.phase(), LifecyclePhase::Succeeded);
    }

    #[test]
    fn test_failed_patch_clears_earlier_success() {
        let succeeded = LifecycleSnapshot::<&str>::idle().merge(SnapshotPatch::succeeded());

        let failed = succeeded.merge(SnapshotPatch::failed("denied"));

        assert_eq!(failed.error(), Some(&"denied"));
        assert!(!failed.success);
        assert_eq!(failed.phase(), LifecyclePhase::Failed);
    }

    #[test]
    fn test_empty_patch_is_identity() {
        let snapshot = LifecycleSnapshot {
            loading: true,
            error: Some(7),
            success: true,
        };
        let patch = SnapshotPatch::new();
        assert!(patch.is_empty());

        assert_eq!(snapshot.merge(patch), snapshot);
    }

    #[test]
    fn test_with_error_none_clears_error() {
        let snapshot = LifecycleSnapshot {
            loading: false,
            error: Some(1),
            success: false,
        };

        let cleared = snapshot.merge(SnapshotPatch::new().with_error(None));

        assert!(cleared.error.is_none());
    }

    #[test]
    fn test_snapshot_serializes_flat() {
        let snapshot = LifecycleSnapshot {
            loading: false,
            error: Some("bad input".to_string()),
            success: false,
        };

        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "loading": false, "error": "bad input", "success": false })
        );
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(LifecyclePhase::Succeeded.to_string(), "succeeded");
        assert!(LifecyclePhase::Failed.is_settled());
        assert!(!LifecyclePhase::Loading.is_settled());
    }
}
