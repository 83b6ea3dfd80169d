//! # lazyflow
//!
//! Lazy chainable iterator pipelines and bounded-concurrency async
//! primitives for Rust.
//!
//! ## Overview
//!
//! This library provides two small, independent subsystems:
//!
//! - **Pipelines**: lazy, chainable pipelines over sequences
//!   ([`SequencePipeline`](iter::SequencePipeline)) and key/value entries
//!   ([`EntryPipeline`](iter::EntryPipeline)). Chained `filter`/`map`/
//!   `take`/`skip` steps are recorded, not executed; a terminal consumer
//!   fuses the whole chain into a single pass over the source.
//! - **Concurrency**: bounded-parallel execution with stable result order
//!   ([`parallel()`](concurrent::parallel())), a FIFO counting semaphore
//!   ([`Semaphore`](concurrent::Semaphore)), concurrency-capped callback
//!   wrapping ([`limit_async()`](concurrent::limit_async())), fixed-delay
//!   retry ([`retry()`](concurrent::retry())), and a single-flight async
//!   memoizer ([`SingleFlight`](concurrent::SingleFlight)).
//!
//! ## Feature Flags
//!
//! - `iter`: lazy pipelines over sequences and entries
//! - `concurrent`: bounded-concurrency async primitives
//! - `full`: enable all features
//!
//! ## Example
//!
//! ```rust
//! use lazyflow::iter::SequencePipeline;
//!
//! let pipeline = SequencePipeline::new(vec![1, 2, 3, 4, 5]);
//! let result = pipeline
//!     .filter(|value, _| *value > 2)
//!     .map(|value, _| value * 2)
//!     .take(3)
//!     .to_vec();
//! assert_eq!(result, vec![6, 8, 10]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
// Note: Disabling redundant_closure_for_method_calls due to clippy 0.1.92 panic bug
#![allow(clippy::redundant_closure_for_method_calls)]

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types and functions.
///
/// # Usage
///
/// ```rust
/// use lazyflow::prelude::*;
/// ```
pub mod prelude {

    #[cfg(feature = "iter")]
    pub use crate::iter::{EntryPipeline, SequencePipeline};

    #[cfg(feature = "concurrent")]
    pub use crate::concurrent::{
        Limited, RetryOptions, Semaphore, SingleFlight, filter_async, filter_async_limit,
        limit_async, map_async, map_async_limit, parallel, parallel_limit, parallel_settled,
        parallel_settled_limit, retry,
    };
}

#[cfg(feature = "iter")]
pub mod iter;

#[cfg(feature = "concurrent")]
pub mod concurrent;
