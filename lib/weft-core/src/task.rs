//! In-flight calls.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::FutureExt as _;
use futures_util::future::BoxFuture;

use crate::Result;

/// An in-flight asynchronous call yielding `Result<T>`.
///
/// Woven methods return either a `Task` or, for `async fn` contracts, await
/// one. A continuation registered with [`continue_with`](Self::continue_with)
/// runs when the task completes, on whatever executor polls it.
///
/// # Example
///
/// ```
/// use weft_core::Task;
///
/// # futures_util::FutureExt::now_or_never(async {
/// let task = Task::ready(Ok(String::from("42")))
///     .continue_with(|content| Ok(content?.len()));
/// assert_eq!(task.await.expect("length"), 2);
/// # });
/// ```
#[must_use = "tasks do nothing unless awaited"]
pub struct Task<'a, T = ()> {
    inner: BoxFuture<'a, Result<T>>,
}

impl<'a, T> Task<'a, T>
where
    T: 'a,
{
    /// Wrap a future.
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = Result<T>> + Send + 'a,
    {
        Self {
            inner: future.boxed(),
        }
    }

    /// A task that is already complete.
    pub fn ready(result: Result<T>) -> Self
    where
        T: Send,
    {
        Self::new(futures_util::future::ready(result))
    }

    /// Register a continuation that receives the completed result.
    pub fn continue_with<U, F>(self, continuation: F) -> Task<'a, U>
    where
        F: FnOnce(Result<T>) -> Result<U> + Send + 'a,
        U: 'a,
    {
        Task {
            inner: self.inner.map(continuation).boxed(),
        }
    }
}

impl<T> Future for Task<'_, T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.poll_unpin(cx)
    }
}

impl<T> fmt::Debug for Task<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").finish_non_exhaustive()
    }
}
