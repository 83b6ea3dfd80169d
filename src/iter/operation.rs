//! Recorded pipeline steps.
//!
//! A pipeline never executes a chaining call directly; it appends one of
//! these variants to its operation list. Closure payloads sit behind `Rc`
//! so that appending clones the parent's list by bumping reference counts,
//! leaving the parent pipeline untouched and reusable.

use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;

/// A single recorded step of a [`SequencePipeline`](super::SequencePipeline).
pub(crate) enum Operation<T> {
    /// Keep only elements for which the predicate returns `true`.
    Filter(Rc<dyn Fn(&T, usize) -> bool>),
    /// Replace the element with the transform's result.
    Map(Rc<dyn Fn(T, usize) -> T>),
    /// Bound the number of elements the pipeline produces.
    Take(usize),
    /// Suppress elements until the skip budget is spent.
    Skip(usize),
}

impl<T> Operation<T> {
    pub(crate) const fn is_filter(&self) -> bool {
        matches!(self, Self::Filter(_))
    }

    pub(crate) const fn is_take(&self) -> bool {
        matches!(self, Self::Take(_))
    }

    pub(crate) const fn is_skip(&self) -> bool {
        matches!(self, Self::Skip(_))
    }
}

impl<T> Clone for Operation<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Filter(predicate) => Self::Filter(Rc::clone(predicate)),
            Self::Map(transform) => Self::Map(Rc::clone(transform)),
            Self::Take(limit) => Self::Take(*limit),
            Self::Skip(count) => Self::Skip(*count),
        }
    }
}

impl<T> fmt::Debug for Operation<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filter(_) => formatter.write_str("Filter"),
            Self::Map(_) => formatter.write_str("Map"),
            Self::Take(limit) => formatter.debug_tuple("Take").field(limit).finish(),
            Self::Skip(count) => formatter.debug_tuple("Skip").field(count).finish(),
        }
    }
}

/// A single recorded step of an [`EntryPipeline`](super::EntryPipeline).
///
/// Entries carry no positional operations; only filtering and rewriting.
pub(crate) enum EntryOperation<K, V> {
    /// Keep only entries for which the predicate returns `true`.
    Filter(Rc<dyn Fn(&K, &V) -> bool>),
    /// Replace the entry with the transform's result.
    Map(Rc<dyn Fn(K, V) -> (K, V)>),
}

impl<K, V> Clone for EntryOperation<K, V> {
    fn clone(&self) -> Self {
        match self {
            Self::Filter(predicate) => Self::Filter(Rc::clone(predicate)),
            Self::Map(transform) => Self::Map(Rc::clone(transform)),
        }
    }
}

impl<K, V> fmt::Debug for EntryOperation<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filter(_) => formatter.write_str("Filter"),
            Self::Map(_) => formatter.write_str("Map"),
        }
    }
}

/// Operation lists are short in practice; keep small chains inline.
pub(crate) type OperationList<T> = SmallVec<[Operation<T>; 4]>;

/// Entry operation lists, same sizing rationale as [`OperationList`].
pub(crate) type EntryOperationList<K, V> = SmallVec<[EntryOperation<K, V>; 4]>;

/// Position of the first operation in `operations` matched by `matcher`.
///
/// Traversal planning uses this to locate the earliest `take`, `skip` or
/// `filter` step in a chain.
pub(crate) fn first_position<Op>(
    operations: &[Op],
    matcher: impl Fn(&Op) -> bool,
) -> Option<usize> {
    operations.iter().position(matcher)
}
