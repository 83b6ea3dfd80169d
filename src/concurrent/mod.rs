//! Bounded-concurrency asynchronous primitives.
//!
//! Everything here assumes a cooperative, event-loop style of concurrency:
//! "parallelism" means interleaved asynchronous operations on an async
//! runtime, and every suspension point is an explicit `.await` (acquiring a
//! permit, awaiting a wrapped callback, awaiting a delay).
//!
//! - [`Semaphore`]: a counting permit pool with strict FIFO waiter wakeup.
//! - [`parallel()`] / [`parallel_settled()`] (and their `_limit`
//!   variants): run many tasks with a concurrency cap, preserving input
//!   order in the results regardless of completion order.
//! - [`map_async()`] / [`filter_async()`]: per-element async transform
//!   and predicate built on the parallel runner.
//! - [`limit_async()`]: wrap an async callback so that in-flight
//!   invocations across all callers never exceed a cap.
//! - [`retry()`]: re-invoke a failing operation with a fixed delay
//!   between attempts.
//! - [`SingleFlight`]: memoize an in-flight asynchronous operation so
//!   concurrent callers share one execution.

mod limit;
mod parallel;
mod retry;
mod semaphore;
mod single_flight;

pub use limit::{Limited, limit_async};
pub use parallel::{
    filter_async, filter_async_limit, map_async, map_async_limit, parallel, parallel_limit,
    parallel_settled, parallel_settled_limit,
};
pub use retry::{RetryOptions, retry};
pub use semaphore::{Permit, Semaphore};
pub use single_flight::SingleFlight;
