//! Configuration for a [`MutationLifecycle`](crate::MutationLifecycle).

use serde::{Deserialize, Serialize};

/// Name the mutate function is looked up under when none is configured.
pub const DEFAULT_MUTATION_NAME: &str = "mutate";

/// Default name the lifecycle view is exposed under.
pub const DEFAULT_PROP_NAME: &str = "mutation";

/// Default name the wrap capability is exposed under.
pub const DEFAULT_WRAP_NAME: &str = "wrapMutate";

/// Options recognized by the mutation lifecycle controller.
///
/// Every field has a default, so a host can embed this in its own
/// configuration file and only spell out what it changes.
///
/// # Example
///
/// ```
/// use mutation_state_runtime::MutationStateConfig;
///
/// let config = MutationStateConfig::default()
///     .with_mutation_name("saveProfile")
///     .with_propagate_error(true);
///
/// assert_eq!(config.effective_mutation_name(), "saveProfile");
/// assert!(!config.wrapper);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationStateConfig {
    /// Name the mutate function is found under, and the name the
    /// auto-invoking binding is exposed under
    pub mutation_name: String,

    /// Name the lifecycle view is exposed under
    pub prop_name: String,

    /// Record `{loading: false, success: true}` when an attempt completes.
    ///
    /// Disable for hosts that are torn down as soon as the mutation
    /// completes; the snapshot is then left as the attempt started it.
    pub set_state_after_success: bool,

    /// Re-raise operation failures from `wrap` after recording them
    pub propagate_error: bool,

    /// Expose the raw wrap capability instead of the auto-invoking mutate one
    pub wrapper: bool,

    /// Name the wrap capability is exposed under
    pub wrap_name: String,
}

impl MutationStateConfig {
    /// Set the mutation name
    #[must_use]
    pub fn with_mutation_name(mut self, name: impl Into<String>) -> Self {
        self.mutation_name = name.into();
        self
    }

    /// Set the name the lifecycle view is exposed under
    #[must_use]
    pub fn with_prop_name(mut self, name: impl Into<String>) -> Self {
        self.prop_name = name.into();
        self
    }

    /// Set whether completed attempts are recorded as successful
    #[must_use]
    pub const fn with_set_state_after_success(mut self, enabled: bool) -> Self {
        self.set_state_after_success = enabled;
        self
    }

    /// Set whether failures are re-raised from `wrap`
    #[must_use]
    pub const fn with_propagate_error(mut self, enabled: bool) -> Self {
        self.propagate_error = enabled;
        self
    }

    /// Set whether the wrap capability is exposed instead of mutate
    #[must_use]
    pub const fn with_wrapper(mut self, enabled: bool) -> Self {
        self.wrapper = enabled;
        self
    }

    /// Set the name the wrap capability is exposed under
    #[must_use]
    pub fn with_wrap_name(mut self, name: impl Into<String>) -> Self {
        self.wrap_name = name.into();
        self
    }

    /// The mutation name, falling back to [`DEFAULT_MUTATION_NAME`] when blank
    #[must_use]
    pub fn effective_mutation_name(&self) -> &str {
        if self.mutation_name.trim().is_empty() {
            DEFAULT_MUTATION_NAME
        } else {
            &self.mutation_name
        }
    }
}

impl Default for MutationStateConfig {
    fn default() -> Self {
        Self {
            mutation_name: DEFAULT_MUTATION_NAME.to_string(),
            prop_name: DEFAULT_PROP_NAME.to_string(),
            set_state_after_success: true,
            propagate_error: false,
            wrapper: false,
            wrap_name: DEFAULT_WRAP_NAME.to_string(),
        }
    }
}
