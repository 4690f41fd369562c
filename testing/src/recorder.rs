//! Listener that records every notification it receives.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Captures every value a store fans out to it
///
/// Cloning shares the recording.
#[derive(Debug)]
pub struct RecordingListener<T> {
    calls: Arc<Mutex<Vec<T>>>,
}

impl<T> RecordingListener<T>
where
    T: Clone + Send + 'static,
{
    /// Create an empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<T>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A listener closure appending to this recording
    pub fn listener(&self) -> impl Fn(&T) + Send + Sync + 'static + use<T> {
        let calls = Arc::clone(&self.calls);
        move |value: &T| {
            calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(value.clone());
        }
    }

    /// Every recorded value, oldest first
    #[must_use]
    pub fn calls(&self) -> Vec<T> {
        self.lock().clone()
    }

    /// Number of recorded values
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if nothing was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// The most recent value
    #[must_use]
    pub fn last(&self) -> Option<T> {
        self.lock().last().cloned()
    }

    /// Forget every recorded value
    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl<T> Clone for RecordingListener<T> {
    fn clone(&self) -> Self {
        Self {
            calls: Arc::clone(&self.calls),
        }
    }
}

impl<T> Default for RecordingListener<T>
where
    T: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
