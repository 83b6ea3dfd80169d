//! Single-flight memoization of an asynchronous operation.
//!
//! [`SingleFlight`] wraps a factory of asynchronous work so that callers
//! arriving while an execution is outstanding (or already settled) all
//! share the same underlying future. The factory runs at most once until
//! [`reset`](SingleFlight::reset) clears the slot.
//!
//! The memoized slot is mutated only at synchronous points (inserting at
//! call time, clearing at reset time), never while a lock is held across
//! an `.await`.

use std::fmt;
use std::future::Future;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use parking_lot::Mutex;

/// Memoizes an in-flight asynchronous operation.
///
/// The produced value is cloned out to every caller, so `T: Clone`. An
/// operation that fails is memoized like any other outcome (use
/// `T = Result<_, _>`); it stays the memoized value until `reset`.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use lazyflow::concurrent::SingleFlight;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let runs = Arc::new(AtomicUsize::new(0));
///     let counter = Arc::clone(&runs);
///
///     let connection = SingleFlight::new(move || {
///         let counter = Arc::clone(&counter);
///         async move {
///             counter.fetch_add(1, Ordering::SeqCst);
///             String::from("connected")
///         }
///     });
///
///     assert_eq!(connection.get().await, "connected");
///     assert_eq!(connection.get().await, "connected");
///     assert_eq!(runs.load(Ordering::SeqCst), 1);
///
///     connection.reset().await;
///     assert_eq!(connection.get().await, "connected");
///     assert_eq!(runs.load(Ordering::SeqCst), 2);
/// }
/// ```
pub struct SingleFlight<T, F> {
    factory: F,
    current: Mutex<Option<Shared<BoxFuture<'static, T>>>>,
}

impl<T: Clone, F> SingleFlight<T, F> {
    /// Creates a wrapper around `factory`.
    ///
    /// The factory is not invoked here; the first
    /// [`get`](SingleFlight::get) does that.
    pub const fn new(factory: F) -> Self {
        Self {
            factory,
            current: Mutex::new(None),
        }
    }

    /// Returns the memoized operation's value, starting it if necessary.
    ///
    /// Callers arriving while the operation is outstanding await the same
    /// execution; callers arriving after it settled receive the settled
    /// value without re-running the factory.
    pub async fn get<Fut>(&self) -> T
    where
        F: Fn() -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        let shared = {
            let mut current = self.current.lock();
            current
                .get_or_insert_with(|| (self.factory)().boxed().shared())
                .clone()
        };
        shared.await
    }

    /// Clears the memoized operation, first letting it settle.
    ///
    /// An outstanding execution is awaited before the slot is cleared, so
    /// a caller of `reset` never races in-flight work; afterwards the next
    /// [`get`](SingleFlight::get) invokes the factory again.
    pub async fn reset(&self) {
        let outstanding = self.current.lock().clone();
        if let Some(operation) = outstanding {
            let _ = operation.await;
        }
        *self.current.lock() = None;
    }

    /// Returns `true` while a memoized operation (settled or not) is held.
    #[must_use]
    pub fn is_primed(&self) -> bool {
        self.current.lock().is_some()
    }
}

impl<T, F> fmt::Debug for SingleFlight<T, F> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("SingleFlight")
            .field("primed", &self.current.lock().is_some())
            .finish_non_exhaustive()
    }
}
