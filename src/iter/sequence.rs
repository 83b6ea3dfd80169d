//! Lazy chainable pipeline over an ordered sequence.
//!
//! `SequencePipeline<T>` records `filter`/`map`/`take`/`skip` steps without
//! running them. A terminal consumer (`to_vec`, `for_each`, `all`, `any`,
//! `find`, or plain iteration) then applies the entire recorded chain to
//! each source element during one traversal, never materializing an
//! intermediate collection per step.
//!
//! # Single-Pass Fusion
//!
//! However many steps are chained, each source element is visited at most
//! once. The whole operation list runs against that element before the
//! traversal moves on, and a failing filter (or an unspent skip budget)
//! short-circuits the rest of the list for that element.
//!
//! # Early Termination
//!
//! A `take` bound stops the traversal as soon as it is satisfied. When no
//! filter precedes the earliest `take`/`skip` step, the bound counts raw
//! elements read, so source elements past the bound are never visited at
//! all; when a filter does precede it, the bound counts produced elements
//! instead, because filtering may discard arbitrarily many raw elements.
//!
//! # Examples
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

use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;

use super::operation::{Operation, OperationList, first_position};

/// A lazy, chainable pipeline over an ordered sequence.
///
/// The pipeline owns a shared, immutable snapshot of its source and an
/// ordered list of recorded operations. Chaining methods take `&self` and
/// return a **new** pipeline whose list is the parent's plus one step; the
/// parent is never mutated and remains fully usable.
///
/// Source elements are cloned as they enter a traversal, so `T: Clone` is
/// required by the consumers. Primitives, `Rc`-wrapped values, `Option`s,
/// strings: anything cloneable flows through unchanged.
///
/// # Examples
///
/// ## Independent chains from one parent
///
/// ```rust
/// use lazyflow::iter::SequencePipeline;
///
/// let base = SequencePipeline::new(vec![1, 2, 3, 4, 5, 6]);
/// let evens = base.filter(|value, _| value % 2 == 0);
/// let first_two_evens = evens.take(2);
///
/// assert_eq!(evens.to_vec(), vec![2, 4, 6]);
/// assert_eq!(first_two_evens.to_vec(), vec![2, 4]);
/// ```
///
/// ## External iteration
///
/// ```rust
/// use lazyflow::iter::SequencePipeline;
///
/// let pipeline = SequencePipeline::new(vec![10, 20, 30]).map(|value, _| value + 1);
/// let collected: Vec<i32> = (&pipeline).into_iter().collect();
/// assert_eq!(collected, vec![11, 21, 31]);
/// ```
pub struct SequencePipeline<T> {
    /// Shared snapshot of the source sequence; never mutated.
    source: Rc<[T]>,
    /// Recorded steps, in declaration order.
    operations: OperationList<T>,
}

impl<T> SequencePipeline<T> {
    /// Creates a pipeline over the given sequence.
    ///
    /// Accepts anything convertible into a shared slice: a `Vec<T>`, a
    /// boxed slice, an existing `Rc<[T]>`, or (for `T: Clone`) a `&[T]`.
    /// The source is captured once and never mutated by any operation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyflow::iter::SequencePipeline;
    ///
    /// let from_vec = SequencePipeline::new(vec![1, 2, 3]);
    /// let from_slice = SequencePipeline::new(&[1, 2, 3][..]);
    /// assert_eq!(from_vec.to_vec(), from_slice.to_vec());
    /// ```
    pub fn new(source: impl Into<Rc<[T]>>) -> Self {
        Self {
            source: source.into(),
            operations: SmallVec::new(),
        }
    }

    /// Appends a filter step.
    ///
    /// The predicate receives each element (as produced by the preceding
    /// steps) together with its raw source index, and elements for which it
    /// returns `false` are suppressed. The predicate does not run until a
    /// terminal consumer is invoked.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyflow::iter::SequencePipeline;
    ///
    /// let odds = SequencePipeline::new(vec![1, 2, 3, 4])
    ///     .filter(|value, _| value % 2 == 1)
    ///     .to_vec();
    /// assert_eq!(odds, vec![1, 3]);
    /// ```
    #[must_use]
    pub fn filter<P>(&self, predicate: P) -> Self
    where
        P: Fn(&T, usize) -> bool + 'static,
    {
        self.with_operation(Operation::Filter(Rc::new(predicate)))
    }

    /// Appends a map step.
    ///
    /// The transform receives each element and its raw source index, and
    /// its result is what every subsequent step sees. It does not run until
    /// a terminal consumer is invoked.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyflow::iter::SequencePipeline;
    ///
    /// let doubled = SequencePipeline::new(vec![1, 2, 3])
    ///     .map(|value, _| value * 2)
    ///     .to_vec();
    /// assert_eq!(doubled, vec![2, 4, 6]);
    /// ```
    #[must_use]
    pub fn map<M>(&self, transform: M) -> Self
    where
        M: Fn(T, usize) -> T + 'static,
    {
        self.with_operation(Operation::Map(Rc::new(transform)))
    }

    /// Bounds the number of elements the pipeline produces.
    ///
    /// `take(0)` produces nothing; a limit larger than the source produces
    /// everything. When several `take` steps are chained, the tightest
    /// limit bounds the output. Traversal stops as soon as the bound is
    /// satisfied, so later source elements are never visited.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyflow::iter::SequencePipeline;
    ///
    /// let head = SequencePipeline::new(vec![1, 2, 3, 4, 5]).take(2).to_vec();
    /// assert_eq!(head, vec![1, 2]);
    /// ```
    #[must_use]
    pub fn take(&self, limit: usize) -> Self {
        self.with_operation(Operation::Take(limit))
    }

    /// Suppresses elements until the skip budget is spent.
    ///
    /// Chained `skip` steps compose additively. A skip placed before any
    /// filter spends its budget on raw source elements; placed after a
    /// filter, it only spends budget on elements that passed that filter,
    /// because a failing filter short-circuits the rest of the chain for
    /// that element.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyflow::iter::SequencePipeline;
    ///
    /// let tail = SequencePipeline::new(vec![1, 2, 3, 4]).skip(2).to_vec();
    /// assert_eq!(tail, vec![3, 4]);
    /// ```
    #[must_use]
    pub fn skip(&self, count: usize) -> Self {
        self.with_operation(Operation::Skip(count))
    }

    /// Number of recorded steps in this chain.
    #[must_use]
    #[inline]
    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }

    fn with_operation(&self, operation: Operation<T>) -> Self {
        let mut operations = self.operations.clone();
        operations.push(operation);
        Self {
            source: Rc::clone(&self.source),
            operations,
        }
    }
}

impl<T: Clone> SequencePipeline<T> {
    /// Runs the pipeline and collects every produced element, in order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyflow::iter::SequencePipeline;
    ///
    /// let squares = SequencePipeline::new(vec![1, 2, 3])
    ///     .map(|value, _| value * value)
    ///     .to_vec();
    /// assert_eq!(squares, vec![1, 4, 9]);
    /// ```
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }

    /// Runs the pipeline, invoking `action` for each produced element.
    ///
    /// The second argument is the element's position among *produced*
    /// elements (0-based), independent of its raw source index.
    pub fn for_each<F>(&self, mut action: F)
    where
        F: FnMut(T, usize),
    {
        for (position, value) in self.iter().enumerate() {
            action(value, position);
        }
    }

    /// Returns `true` iff every produced element satisfies `predicate`.
    ///
    /// Traversal stops at the first failing element.
    pub fn all<P>(&self, predicate: P) -> bool
    where
        P: FnMut(&T) -> bool,
    {
        let mut predicate = predicate;
        self.iter().all(|value| predicate(&value))
    }

    /// Returns `true` if any produced element satisfies `predicate`.
    ///
    /// Traversal stops at the first satisfying element.
    pub fn any<P>(&self, predicate: P) -> bool
    where
        P: FnMut(&T) -> bool,
    {
        let mut predicate = predicate;
        self.iter().any(|value| predicate(&value))
    }

    /// Returns the first produced element satisfying `predicate`, if any.
    ///
    /// Traversal stops as soon as a match is produced.
    pub fn find<P>(&self, predicate: P) -> Option<T>
    where
        P: FnMut(&T) -> bool,
    {
        let mut predicate = predicate;
        self.iter().find(|value| predicate(value))
    }

    /// Returns the fused single-pass iterator over this pipeline.
    ///
    /// The iterator borrows the pipeline; the pipeline itself stays
    /// reusable and can be consumed again later.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(&self.source, &self.operations)
    }
}

impl<T> Clone for SequencePipeline<T> {
    fn clone(&self) -> Self {
        Self {
            source: Rc::clone(&self.source),
            operations: self.operations.clone(),
        }
    }
}

impl<T> fmt::Debug for SequencePipeline<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("SequencePipeline")
            .field("source_len", &self.source.len())
            .field("operations", &self.operations)
            .finish()
    }
}

impl<T> From<Vec<T>> for SequencePipeline<T> {
    fn from(source: Vec<T>) -> Self {
        Self::new(source)
    }
}

impl<'a, T: Clone> IntoIterator for &'a SequencePipeline<T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Fused single-pass iterator over a [`SequencePipeline`].
///
/// Produced by [`SequencePipeline::iter`]. Applies the recorded operation
/// list to each source element in order, yielding the survivors.
pub struct Iter<'a, T> {
    source: &'a [T],
    operations: &'a [Operation<T>],
    /// Next raw element to read; doubles as the count of elements read.
    raw_index: usize,
    /// Elements produced so far.
    produced: usize,
    /// Skip budget spent so far.
    skipped: usize,
    /// Sum of all skip counts in the chain.
    skip_budget: usize,
    /// Tightest `take` limit in the chain, if any.
    take_limit: Option<usize>,
    /// Whether a filter precedes the earliest `take`/`skip` step. When it
    /// does, the take limit must count produced elements, not raw reads.
    filter_guards_limit: bool,
    exhausted: bool,
}

impl<'a, T> Iter<'a, T> {
    fn new(source: &'a [T], operations: &'a [Operation<T>]) -> Self {
        let take_limit = operations
            .iter()
            .filter_map(|operation| match operation {
                Operation::Take(limit) => Some(*limit),
                _ => None,
            })
            .min();
        let skip_budget = operations
            .iter()
            .map(|operation| match operation {
                Operation::Skip(count) => *count,
                _ => 0,
            })
            .sum();

        let first_take = first_position(operations, Operation::is_take);
        let first_skip = first_position(operations, Operation::is_skip);
        let boundary = match (first_take, first_skip) {
            (Some(take), Some(skip)) => take.min(skip),
            (Some(position), None) | (None, Some(position)) => position,
            (None, None) => 0,
        };
        let filter_guards_limit =
            first_position(&operations[..boundary], Operation::is_filter).is_some();

        Self {
            source,
            operations,
            raw_index: 0,
            produced: 0,
            skipped: 0,
            skip_budget,
            take_limit,
            filter_guards_limit,
            exhausted: false,
        }
    }
}

impl<T: Clone> Iterator for Iter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.exhausted {
            return None;
        }

        while self.raw_index < self.source.len() {
            if let Some(limit) = self.take_limit {
                let reached = if self.filter_guards_limit {
                    self.produced >= limit
                } else {
                    self.raw_index >= limit
                };
                if reached {
                    self.exhausted = true;
                    return None;
                }
            }

            let index = self.raw_index;
            self.raw_index += 1;
            let mut value = self.source[index].clone();
            let mut suppressed = false;

            for operation in self.operations {
                match operation {
                    Operation::Filter(predicate) => {
                        if !predicate(&value, index) {
                            suppressed = true;
                            break;
                        }
                    }
                    Operation::Map(transform) => {
                        value = transform(value, index);
                    }
                    Operation::Skip(_) => {
                        if self.skipped < self.skip_budget {
                            self.skipped += 1;
                            suppressed = true;
                            break;
                        }
                    }
                    Operation::Take(_) => {}
                }
            }

            if suppressed {
                continue;
            }

            self.produced += 1;
            if self
                .take_limit
                .is_some_and(|limit| self.produced >= limit)
            {
                // The bound is satisfied; later raw elements are never read.
                self.exhausted = true;
            }
            return Some(value);
        }

        self.exhausted = true;
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.exhausted {
            return (0, Some(0));
        }
        let remaining_raw = self.source.len() - self.raw_index;
        let upper = self.take_limit.map_or(remaining_raw, |limit| {
            remaining_raw.min(limit.saturating_sub(self.produced))
        });
        (0, Some(upper))
    }
}
