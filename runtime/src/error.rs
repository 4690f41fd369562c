//! Error types for the mutation lifecycle controller.

use thiserror::Error;

/// Errors surfaced to callers of the controller and its bindings
///
/// # Type Parameters
///
/// - `E`: The error type of the wrapped operation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MutationError<E> {
    /// No mutate function was found under the configured name.
    ///
    /// A configuration error: raised before any lifecycle state changes
    /// and never absorbed.
    #[error("No mutation function available under '{name}'")]
    MissingMutationFunction {
        /// The name that was looked up
        name: String,
    },

    /// The wrapped operation failed and `propagate_error` is enabled.
    ///
    /// The failure has already been recorded in the lifecycle snapshot.
    #[error("Mutation failed: {0:?}")]
    Operation(E),

    /// The task driving the attempt ended before the attempt settled.
    ///
    /// This typically means the operation panicked or the runtime shut
    /// down. The snapshot keeps whatever the attempt last recorded.
    #[error("Mutation attempt interrupted: {0}")]
    Interrupted(String),
}

impl<E> MutationError<E> {
    /// Check if this is a missing mutation function error
    #[must_use]
    pub const fn is_missing_mutation_function(&self) -> bool {
        matches!(self, Self::MissingMutationFunction { .. })
    }

    /// Check if this is a propagated operation failure
    #[must_use]
    pub const fn is_operation(&self) -> bool {
        matches!(self, Self::Operation(_))
    }

    /// Check if the attempt was interrupted before it settled
    #[must_use]
    pub const fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted(_))
    }

    /// The operation failure, if this is one
    #[must_use]
    pub fn into_operation(self) -> Option<E> {
        match self {
            Self::Operation(error) => Some(error),
            Self::MissingMutationFunction { .. } | Self::Interrupted(_) => None,
        }
    }
}
