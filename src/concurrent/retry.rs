//! Fixed-delay retry of a failing asynchronous operation.

use std::future::Future;
use std::time::Duration;

/// Attempt budget and pacing for [`retry`].
///
/// The defaults allow 3 attempts with no delay between them.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use lazyflow::concurrent::RetryOptions;
///
/// let defaults = RetryOptions::default();
/// assert_eq!(defaults.limit, 3);
/// assert_eq!(defaults.delay, Duration::ZERO);
///
/// let patient = RetryOptions { limit: 5, delay: Duration::from_millis(200) };
/// assert_eq!(patient.limit, 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryOptions {
    /// Total number of invocations allowed, including the first.
    pub limit: usize,
    /// Fixed pause between consecutive attempts.
    pub delay: Duration,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            limit: 3,
            delay: Duration::ZERO,
        }
    }
}

/// Invokes `operation` until it succeeds or the attempt budget is spent.
///
/// The first success resolves immediately with its value; each failure
/// before the last waits `options.delay` and tries again. Once `limit`
/// invocations have failed, the final failure's error is returned. A zero
/// limit still runs the operation once.
///
/// # Errors
///
/// Returns the last attempt's error after the budget is exhausted.
///
/// # Examples
///
/// ```rust
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use lazyflow::concurrent::{RetryOptions, retry};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let attempts = AtomicUsize::new(0);
///     let result = retry(
///         || {
///             let attempt = attempts.fetch_add(1, Ordering::SeqCst);
///             async move {
///                 if attempt < 2 {
///                     Err("not yet")
///                 } else {
///                     Ok("done")
///                 }
///             }
///         },
///         RetryOptions::default(),
///     )
///     .await;
///
///     assert_eq!(result, Ok("done"));
///     assert_eq!(attempts.load(Ordering::SeqCst), 3);
/// }
/// ```
#[allow(clippy::missing_panics_doc)]
pub async fn retry<T, E, F, Fut>(mut operation: F, options: RetryOptions) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let attempts = options.limit.max(1);
    let mut last_error: Option<E> = None;

    for attempt in 0..attempts {
        if attempt > 0 && !options.delay.is_zero() {
            tokio::time::sleep(options.delay).await;
        }

        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                last_error = Some(error);
            }
        }
    }

    Err(last_error.expect("at least one attempt ran"))
}
