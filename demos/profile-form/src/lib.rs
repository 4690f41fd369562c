//! # Profile Form Example
//!
//! A profile form that tracks its "save" mutation.
//!
//! This example showcases:
//! - A host attaching a lifecycle controller and subscribing once
//! - Re-rendering inside the listener on every snapshot
//! - The auto-invoking mutate binding backed by a named function
//! - Absorbed failures surfacing only through the snapshot
//! - Detaching: unsubscribe, then dispose
//!
//! ## Example
//!
//! ```no_run
//! use profile_form::{ProfileForm, ProfileUpdate};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let form = ProfileForm::attach();
//! form.save(ProfileUpdate::new("ada", "ada@example.com"))?.await?;
//! println!("{}", form.status_line());
//! form.detach();
//! # Ok(())
//! # }
//! ```

use mutation_state_core::{LifecyclePhase, LifecycleSnapshot, Subscription};
use mutation_state_runtime::{
    mutation_fn, MutateBinding, MutationError, MutationFn, MutationLifecycle, MutationStateConfig,
};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;

/// Name the save function is registered under
pub const SAVE_MUTATION: &str = "saveProfile";

/// Why saving a profile failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SaveError {
    /// The username is empty
    #[error("username must not be empty")]
    EmptyUsername,

    /// The email address has no `@`
    #[error("'{0}' is not an email address")]
    InvalidEmail(String),
}

/// Fields submitted by the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// Display name
    pub username: String,
    /// Contact address
    pub email: String,
}

impl ProfileUpdate {
    /// Create an update
    #[must_use]
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
        }
    }
}

/// Stored profile version returned by a successful save
pub type ProfileVersion = u64;

/// A simulated profile API call
///
/// # Errors
///
/// Fails validation the way a remote API would.
pub async fn save_profile(update: ProfileUpdate) -> Result<ProfileVersion, SaveError> {
    tokio::time::sleep(Duration::from_millis(20)).await;

    if update.username.trim().is_empty() {
        return Err(SaveError::EmptyUsername);
    }
    if !update.email.contains('@') {
        return Err(SaveError::InvalidEmail(update.email));
    }
    Ok(1)
}

/// Render one snapshot as the form's status line
#[must_use]
pub fn render(snapshot: &LifecycleSnapshot<SaveError>) -> String {
    match snapshot.phase() {
        LifecyclePhase::Idle => "Ready".to_string(),
        LifecyclePhase::Loading => "Saving…".to_string(),
        LifecyclePhase::Succeeded => "Saved".to_string(),
        LifecyclePhase::Failed => match snapshot.error() {
            Some(error) => format!("Could not save: {error}"),
            None => "Could not save".to_string(),
        },
    }
}

/// The form host
///
/// Subscribes once when attached and re-renders inside its listener.
pub struct ProfileForm {
    lifecycle: MutationLifecycle<SaveError>,
    save: MutateBinding<ProfileUpdate, ProfileVersion, SaveError>,
    subscription: Subscription<LifecycleSnapshot<SaveError>>,
    rendered: Arc<Mutex<Vec<String>>>,
}

impl ProfileForm {
    /// Attach a form backed by [`save_profile`]
    #[must_use]
    pub fn attach() -> Self {
        let save: MutationFn<ProfileUpdate, ProfileVersion, SaveError> = mutation_fn(save_profile);
        let mut functions = HashMap::new();
        functions.insert(SAVE_MUTATION.to_string(), save);
        Self::attach_with(functions)
    }

    /// Attach a form whose save function is looked up in `functions`
    #[must_use]
    pub fn attach_with(
        functions: HashMap<String, MutationFn<ProfileUpdate, ProfileVersion, SaveError>>,
    ) -> Self {
        let config = MutationStateConfig::default()
            .with_mutation_name(SAVE_MUTATION)
            .with_prop_name("saveState");
        let lifecycle = MutationLifecycle::new(config);

        let rendered = Arc::new(Mutex::new(vec![render(&lifecycle.snapshot())]));
        let frames = Arc::clone(&rendered);
        let subscription = lifecycle.subscribe(move |snapshot| {
            let frame = render(snapshot);
            tracing::info!(status = %frame, "Rendering profile form");
            frames
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(frame);
        });

        let save = lifecycle.mutator(functions);
        Self {
            lifecycle,
            save,
            subscription,
            rendered,
        }
    }

    /// Submit the form
    ///
    /// # Errors
    ///
    /// Returns [`MutationError::MissingMutationFunction`] if no save
    /// function is registered. Save failures are absorbed into the status.
    pub fn save(
        &self,
        update: ProfileUpdate,
    ) -> Result<
        impl Future<Output = Result<Option<ProfileVersion>, MutationError<SaveError>>> + Send + use<>,
        MutationError<SaveError>,
    > {
        self.save.mutate(update)
    }

    /// Dismiss the last outcome
    pub fn dismiss(&self) {
        self.lifecycle.view().clear_state();
    }

    /// The status line for the current snapshot
    #[must_use]
    pub fn status_line(&self) -> String {
        render(&self.lifecycle.snapshot())
    }

    /// Every status line rendered so far, oldest first
    #[must_use]
    pub fn frames(&self) -> Vec<String> {
        self.rendered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Detach the form: unsubscribe, then dispose the controller
    pub fn detach(self) {
        self.subscription.unsubscribe();
        self.lifecycle.dispose();
    }
}
