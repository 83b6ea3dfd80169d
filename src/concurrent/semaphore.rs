//! Counting semaphore with strict FIFO waiter wakeup.
//!
//! The semaphore hands out up to `capacity` permits. When none is free,
//! `acquire` suspends the caller on a FIFO queue; a released permit is
//! transferred directly to the oldest live waiter rather than returned to
//! the pool, so waiters can never be overtaken by later arrivals.
//!
//! All counter and queue mutation happens inside a short synchronous
//! critical section with no `.await` inside it; suspension happens only on
//! the waiter's own wakeup channel.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use lazyflow::concurrent::Semaphore;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let semaphore = Arc::new(Semaphore::new(2));
//!
//!     let first = semaphore.acquire().await;
//!     let second = semaphore.acquire().await;
//!     assert_eq!(semaphore.available_permits(), 0);
//!
//!     drop(first); // releasing frees a permit (or wakes the oldest waiter)
//!     assert_eq!(semaphore.available_permits(), 1);
//!     drop(second);
//! }
//! ```

use std::collections::VecDeque;
use std::fmt;

use parking_lot::Mutex;
use tokio::sync::oneshot;

/// A counting semaphore with a fixed capacity and FIFO fairness.
///
/// At most `capacity` permits are outstanding at any moment: the number of
/// free permits plus the number held by acquirers never exceeds it.
/// `acquire` never fails and never times out; it resolves immediately when
/// a permit is free and otherwise suspends until one is transferred to it,
/// strictly in arrival order.
pub struct Semaphore {
    state: Mutex<State>,
    capacity: usize,
}

struct State {
    /// Permits currently free.
    available: usize,
    /// Oldest-first queue of suspended acquirers.
    waiters: VecDeque<oneshot::Sender<()>>,
}

impl Semaphore {
    /// Creates a semaphore with the given number of permits.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0; a semaphore must be able to admit at
    /// least one holder.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "semaphore capacity must be greater than 0");
        Self {
            state: Mutex::new(State {
                available: capacity,
                waiters: VecDeque::new(),
            }),
            capacity,
        }
    }

    /// Acquires a permit, suspending FIFO behind earlier waiters if none
    /// is free.
    ///
    /// The permit is released when the returned [`Permit`] is dropped,
    /// whatever the outcome of the work it guarded.
    ///
    /// # Cancellation
    ///
    /// Dropping the returned future while it is still queued forfeits its
    /// place in line; a wakeup that raced with the drop puts the
    /// transferred permit back into the pool.
    pub async fn acquire(&self) -> Permit<'_> {
        let waiting = {
            let mut state = self.state.lock();
            if state.available > 0 {
                state.available -= 1;
                None
            } else {
                let (sender, receiver) = oneshot::channel();
                state.waiters.push_back(sender);
                Some(receiver)
            }
        };

        if let Some(receiver) = waiting {
            let mut wakeup = Wakeup {
                semaphore: self,
                receiver,
                transferred: false,
            };
            (&mut wakeup.receiver)
                .await
                .expect("release keeps waiter senders alive until they send");
            wakeup.transferred = true;
        }

        Permit { semaphore: self }
    }

    /// Acquires a permit only if one is free right now.
    ///
    /// Returns `None` instead of suspending when the pool is exhausted.
    pub fn try_acquire(&self) -> Option<Permit<'_>> {
        let mut state = self.state.lock();
        if state.available > 0 {
            state.available -= 1;
            Some(Permit { semaphore: self })
        } else {
            None
        }
    }

    /// Returns the number of permits currently free.
    #[must_use]
    pub fn available_permits(&self) -> usize {
        self.state.lock().available
    }

    /// Returns the number of acquirers currently suspended.
    #[must_use]
    pub fn waiter_count(&self) -> usize {
        self.state.lock().waiters.len()
    }

    /// Returns the fixed maximum number of permits.
    #[must_use]
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns a permit to the pool.
    ///
    /// If anyone is waiting, the permit transfers directly to the oldest
    /// live waiter without touching the free count; otherwise the free
    /// count grows, capped at `capacity`.
    fn release(&self) {
        let mut state = self.state.lock();
        while let Some(waiter) = state.waiters.pop_front() {
            if waiter.send(()).is_ok() {
                return;
            }
            // That acquirer was cancelled while queued; wake the next one.
        }
        state.available = (state.available + 1).min(self.capacity);
    }
}

impl fmt::Debug for Semaphore {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        formatter
            .debug_struct("Semaphore")
            .field("capacity", &self.capacity)
            .field("available", &state.available)
            .field("waiters", &state.waiters.len())
            .finish()
    }
}

/// A held permit; releasing happens on drop.
///
/// Returned by [`Semaphore::acquire`] and [`Semaphore::try_acquire`].
pub struct Permit<'a> {
    semaphore: &'a Semaphore,
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.semaphore.release();
    }
}

impl fmt::Debug for Permit<'_> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_struct("Permit").finish_non_exhaustive()
    }
}

/// Tracks a queued acquirer between enqueue and wakeup.
///
/// If the acquire future is dropped first, the queue slot is dead: the
/// channel closes, and `release` skips it. If the wakeup message was
/// already sent when the drop happens, the permit it carried goes back to
/// the pool here.
struct Wakeup<'a> {
    semaphore: &'a Semaphore,
    receiver: oneshot::Receiver<()>,
    transferred: bool,
}

impl Drop for Wakeup<'_> {
    fn drop(&mut self) {
        if self.transferred {
            return;
        }
        self.receiver.close();
        if self.receiver.try_recv().is_ok() {
            self.semaphore.release();
        }
    }
}
