//! Named mutation functions.
//!
//! The auto-invoking binding does not own the mutation it tracks. It looks
//! the function up by name in a [`MutationSource`] every time it is called,
//! so the host can supply (or withdraw) the function after the controller
//! has been created.

use futures::future::{BoxFuture, FutureExt};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

/// A type-erased asynchronous mutation taking `A` and producing `R` or `E`.
pub type MutationFn<A, R, E> = Arc<dyn Fn(A) -> BoxFuture<'static, Result<R, E>> + Send + Sync>;

/// Erase an async closure into a [`MutationFn`].
///
/// # Example
///
/// ```
/// use mutation_state_runtime::source::{mutation_fn, MutationFn};
///
/// let double: MutationFn<u32, u32, String> = mutation_fn(|n: u32| async move { Ok(n * 2) });
/// ```
pub fn mutation_fn<A, R, E, F, Fut>(f: F) -> MutationFn<A, R, E>
where
    A: 'static,
    R: 'static,
    E: 'static,
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
{
    Arc::new(move |args: A| f(args).boxed())
}

/// Lookup of mutate functions by name
pub trait MutationSource<A, R, E>: Send + Sync {
    /// The function registered under `name`, if any
    fn mutation(&self, name: &str) -> Option<MutationFn<A, R, E>>;
}

impl<A, R, E> MutationSource<A, R, E> for HashMap<String, MutationFn<A, R, E>> {
    fn mutation(&self, name: &str) -> Option<MutationFn<A, R, E>> {
        self.get(name).cloned()
    }
}

/// A single optional function, returned whatever name is asked for.
impl<A, R, E> MutationSource<A, R, E> for Option<MutationFn<A, R, E>> {
    fn mutation(&self, _name: &str) -> Option<MutationFn<A, R, E>> {
        self.clone()
    }
}
