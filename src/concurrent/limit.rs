//! Concurrency-capped wrapping of an async callback.
//!
//! [`limit_async`] pairs a callback with its own [`Semaphore`]: every
//! invocation acquires a permit before the callback runs and releases it
//! when the call finishes, successfully or not. In-flight invocations
//! across all callers (and clones of the wrapper) therefore never exceed
//! the cap.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use super::semaphore::Semaphore;

/// Wraps `callback` so at most `concurrency` invocations run at once.
///
/// # Panics
///
/// Panics if `concurrency` is 0.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use lazyflow::concurrent::limit_async;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let fetch = Arc::new(limit_async(|id: u32| async move { id * 2 }, 2));
///
///     let mut handles = Vec::new();
///     for id in 0..5 {
///         let fetch = Arc::clone(&fetch);
///         handles.push(tokio::spawn(async move { fetch.call(id).await }));
///     }
///     for (id, handle) in handles.into_iter().enumerate() {
///         assert_eq!(handle.await.unwrap(), id as u32 * 2);
///     }
/// }
/// ```
pub fn limit_async<F>(callback: F, concurrency: usize) -> Limited<F> {
    Limited {
        semaphore: Arc::new(Semaphore::new(concurrency)),
        callback,
    }
}

/// An async callback bounded by a shared permit pool.
///
/// Created by [`limit_async`]. Clones share the same pool, so the cap
/// holds across every handle.
pub struct Limited<F> {
    semaphore: Arc<Semaphore>,
    callback: F,
}

impl<F> Limited<F> {
    /// Invokes the wrapped callback once a permit is available.
    ///
    /// The permit is held for the whole invocation and released when the
    /// call completes, whatever its outcome; callers queue FIFO behind
    /// earlier invocations when the pool is exhausted.
    pub async fn call<A, Fut>(&self, argument: A) -> Fut::Output
    where
        F: Fn(A) -> Fut,
        Fut: Future,
    {
        let _permit = self.semaphore.acquire().await;
        (self.callback)(argument).await
    }

    /// Returns the maximum number of concurrent invocations.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.semaphore.capacity()
    }

    /// Returns how many invocations could start right now without
    /// queueing.
    #[must_use]
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}

impl<F: Clone> Clone for Limited<F> {
    fn clone(&self) -> Self {
        Self {
            semaphore: Arc::clone(&self.semaphore),
            callback: self.callback.clone(),
        }
    }
}

impl<F> fmt::Debug for Limited<F> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Limited")
            .field("concurrency", &self.semaphore.capacity())
            .field("available", &self.semaphore.available_permits())
            .finish_non_exhaustive()
    }
}
