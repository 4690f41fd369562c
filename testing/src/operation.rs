//! Operations settled explicitly by the test.
//!
//! A [`ControlledOperation`] stays pending until its [`Settle`] handle
//! resolves or rejects it, which lets a test hold several attempts in flight
//! and choose the order they settle in.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

/// A future completing with whatever its [`Settle`] handle sends.
///
/// If the handle is dropped without settling, the future never completes.
#[derive(Debug)]
pub struct ControlledOperation<R, E> {
    receiver: oneshot::Receiver<Result<R, E>>,
}

impl<R, E> ControlledOperation<R, E> {
    /// Create a pending operation and the handle that settles it
    #[must_use]
    pub fn new() -> (Self, Settle<R, E>) {
        let (sender, receiver) = oneshot::channel();
        (Self { receiver }, Settle { sender })
    }
}

impl<R, E> Future for ControlledOperation<R, E> {
    type Output = Result<R, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            // Settle handle dropped: stay pending forever.
            Poll::Ready(Err(_)) | Poll::Pending => Poll::Pending,
        }
    }
}

/// Settles one [`ControlledOperation`]
#[derive(Debug)]
pub struct Settle<R, E> {
    sender: oneshot::Sender<Result<R, E>>,
}

impl<R, E> Settle<R, E> {
    /// Complete the operation with `value`.
    ///
    /// Returns false if the operation was already dropped.
    #[allow(clippy::must_use_candidate)]
    pub fn resolve(self, value: R) -> bool {
        self.sender.send(Ok(value)).is_ok()
    }

    /// Fail the operation with `error`.
    ///
    /// Returns false if the operation was already dropped.
    #[allow(clippy::must_use_candidate)]
    pub fn reject(self, error: E) -> bool {
        self.sender.send(Err(error)).is_ok()
    }
}
