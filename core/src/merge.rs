//! Shallow field-wise merge of partial updates.
//!
//! An [`ObservableStore`](crate::observable::ObservableStore) never replaces its
//! value wholesale. Every update is a *patch*: a value describing some subset
//! of fields. Fields present in the patch replace the corresponding field of
//! the current value; absent fields are retained.

/// A value that can absorb a partial update of itself.
///
/// # Example
///
/// ```
/// use mutation_state_core::merge::Merge;
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Progress {
///     done: u32,
///     total: u32,
/// }
///
/// #[derive(Default)]
/// struct ProgressPatch {
///     done: Option<u32>,
///     total: Option<u32>,
/// }
///
/// impl Merge for Progress {
///     type Patch = ProgressPatch;
///
///     fn merge(&self, patch: ProgressPatch) -> Self {
///         Self {
///             done: patch.done.unwrap_or(self.done),
///             total: patch.total.unwrap_or(self.total),
///         }
///     }
/// }
///
/// let progress = Progress { done: 1, total: 4 };
/// let next = progress.merge(ProgressPatch { done: Some(2), ..Default::default() });
/// assert_eq!(next, Progress { done: 2, total: 4 });
/// ```
pub trait Merge: Sized {
    /// The partial update type. Each field is optional.
    type Patch;

    /// Produce a new value with the fields present in `patch` replaced.
    ///
    /// Must not nest the patch inside the result: the merged value has
    /// exactly the shape of `Self`.
    #[must_use]
    fn merge(&self, patch: Self::Patch) -> Self;
}
