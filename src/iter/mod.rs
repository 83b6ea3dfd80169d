//! Lazy, chainable pipelines over sequences and key/value entries.
//!
//! This module provides two pipeline types sharing one design: each
//! chaining call records an [`operation`](self) instead of executing it,
//! and a terminal consumer later applies the whole recorded chain to each
//! source element during a single traversal.
//!
//! - [`SequencePipeline`]: `filter`/`map`/`take`/`skip` over an ordered
//!   sequence, with early termination when a `take` bound is reached.
//! - [`EntryPipeline`]: `filter`/`map` over a snapshot of key/value
//!   entries.
//!
//! # Laziness
//!
//! No closure passed to a chaining method runs before a terminal consumer
//! (`to_vec`, `for_each`, `all`, `any`, `find`, or external iteration) is
//! invoked:
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use lazyflow::iter::SequencePipeline;
//!
//! let calls = Rc::new(Cell::new(0));
//! let observer = Rc::clone(&calls);
//!
//! let pipeline = SequencePipeline::new(vec![1, 2, 3]).map(move |value, _| {
//!     observer.set(observer.get() + 1);
//!     value * 10
//! });
//! assert_eq!(calls.get(), 0); // nothing ran yet
//!
//! let doubled = pipeline.to_vec();
//! assert_eq!(doubled, vec![10, 20, 30]);
//! assert_eq!(calls.get(), 3);
//! ```
//!
//! # Structural Sharing
//!
//! Chaining methods take `&self` and return a new pipeline holding the
//! parent's operation list plus one step. The parent stays usable and two
//! chains built from it are fully independent:
//!
//! ```rust
//! use lazyflow::iter::SequencePipeline;
//!
//! let base = SequencePipeline::new(vec![1, 2, 3, 4]);
//! let evens = base.filter(|value, _| value % 2 == 0);
//! let odds = base.filter(|value, _| value % 2 == 1);
//! assert_eq!(evens.to_vec(), vec![2, 4]);
//! assert_eq!(odds.to_vec(), vec![1, 3]);
//! ```

mod mapping;
mod operation;
mod sequence;

pub use mapping::EntryPipeline;
pub use sequence::SequencePipeline;

pub mod pipelines {
    //! Borrowed fused-iteration types returned by `iter()`.

    pub use super::mapping::Iter as EntryIter;
    pub use super::sequence::Iter as SequenceIter;
}
