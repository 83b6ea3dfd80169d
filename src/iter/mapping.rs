//! Lazy chainable pipeline over key/value entries.
//!
//! `EntryPipeline<K, V>` applies the same recorded-operation design as
//! [`SequencePipeline`](super::SequencePipeline) to the entries of an
//! associative structure, restricted to `filter` and `map` (entries carry
//! no positional `take`/`skip` steps).
//!
//! The source entries are snapshotted once at construction, in the
//! structure's own enumeration order at that moment; mutating the original
//! structure afterwards cannot affect the pipeline.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use smallvec::SmallVec;

use super::operation::{EntryOperation, EntryOperationList};

/// A lazy, chainable pipeline over key/value entries.
///
/// Chaining methods take `&self` and return a new pipeline sharing the
/// snapshot; the parent stays usable. `map` rewrites whole entries, and a
/// `filter` inspects the entry as produced by every preceding `map`.
///
/// # Examples
///
/// ```rust
/// use std::collections::HashMap;
/// use lazyflow::iter::EntryPipeline;
///
/// let mut scores = HashMap::new();
/// scores.insert(String::from("ada"), 3);
/// scores.insert(String::from("grace"), 7);
///
/// let promoted: HashMap<String, i32> = EntryPipeline::from(&scores)
///     .map(|name, score| (name.to_uppercase(), score + 1))
///     .filter(|_, score| *score > 4)
///     .to_map();
///
/// assert_eq!(promoted.get("GRACE"), Some(&8));
/// assert!(!promoted.contains_key("ADA"));
/// ```
pub struct EntryPipeline<K, V> {
    /// Snapshot of the source entries; never mutated.
    entries: Rc<[(K, V)]>,
    /// Recorded steps, in declaration order.
    operations: EntryOperationList<K, V>,
}

impl<K, V> EntryPipeline<K, V> {
    /// Creates a pipeline over a snapshot of the given entries.
    ///
    /// The entries are captured immediately, in the order the iterator
    /// produces them. Later changes to the structure they came from are
    /// invisible to the pipeline.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lazyflow::iter::EntryPipeline;
    ///
    /// let pipeline = EntryPipeline::new(vec![("a", 1), ("b", 2)]);
    /// assert_eq!(pipeline.to_vec(), vec![("a", 1), ("b", 2)]);
    /// ```
    pub fn new(entries: impl IntoIterator<Item = (K, V)>) -> Self {
        Self {
            entries: entries.into_iter().collect::<Vec<_>>().into(),
            operations: SmallVec::new(),
        }
    }

    /// Appends a filter step over `(key, value)` pairs.
    ///
    /// The predicate sees each entry as produced by the preceding `map`
    /// steps; entries for which it returns `false` are suppressed. Nothing
    /// runs until a terminal consumer is invoked.
    #[must_use]
    pub fn filter<P>(&self, predicate: P) -> Self
    where
        P: Fn(&K, &V) -> bool + 'static,
    {
        self.with_operation(EntryOperation::Filter(Rc::new(predicate)))
    }

    /// Appends a map step rewriting whole `(key, value)` entries.
    ///
    /// Both the key and the value may be replaced; every subsequent step
    /// sees the rewritten entry. Nothing runs until a terminal consumer is
    /// invoked.
    #[must_use]
    pub fn map<M>(&self, transform: M) -> Self
    where
        M: Fn(K, V) -> (K, V) + 'static,
    {
        self.with_operation(EntryOperation::Map(Rc::new(transform)))
    }

    /// Number of recorded steps in this chain.
    #[must_use]
    #[inline]
    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }

    fn with_operation(&self, operation: EntryOperation<K, V>) -> Self {
        let mut operations = self.operations.clone();
        operations.push(operation);
        Self {
            entries: Rc::clone(&self.entries),
            operations,
        }
    }
}

impl<K: Clone, V: Clone> EntryPipeline<K, V> {
    /// Runs the pipeline and collects the produced entries, in order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<(K, V)> {
        self.iter().collect()
    }

    /// Runs the pipeline and collects the produced entries into a map.
    ///
    /// Entries mapping to the same key collapse; the later one wins, as
    /// with any `HashMap` collection.
    #[must_use]
    pub fn to_map(&self) -> HashMap<K, V>
    where
        K: Eq + Hash,
    {
        self.iter().collect()
    }

    /// Returns the fused single-pass iterator over this pipeline.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            entries: &self.entries,
            operations: &self.operations,
            position: 0,
        }
    }
}

impl<K, V> Clone for EntryPipeline<K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: Rc::clone(&self.entries),
            operations: self.operations.clone(),
        }
    }
}

impl<K, V> fmt::Debug for EntryPipeline<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("EntryPipeline")
            .field("entries", &self.entries.len())
            .field("operations", &self.operations)
            .finish()
    }
}

impl<K: Clone + Eq + Hash, V: Clone> From<&HashMap<K, V>> for EntryPipeline<K, V> {
    fn from(mapping: &HashMap<K, V>) -> Self {
        Self::new(mapping.iter().map(|(key, value)| (key.clone(), value.clone())))
    }
}

impl<K: Clone + Ord, V: Clone> From<&BTreeMap<K, V>> for EntryPipeline<K, V> {
    fn from(mapping: &BTreeMap<K, V>) -> Self {
        Self::new(mapping.iter().map(|(key, value)| (key.clone(), value.clone())))
    }
}

impl<K, V> From<Vec<(K, V)>> for EntryPipeline<K, V> {
    fn from(entries: Vec<(K, V)>) -> Self {
        Self::new(entries)
    }
}

impl<'a, K: Clone, V: Clone> IntoIterator for &'a EntryPipeline<K, V> {
    type Item = (K, V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Fused single-pass iterator over an [`EntryPipeline`].
pub struct Iter<'a, K, V> {
    entries: &'a [(K, V)],
    operations: &'a [EntryOperation<K, V>],
    position: usize,
}

impl<K: Clone, V: Clone> Iterator for Iter<'_, K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        while self.position < self.entries.len() {
            let (mut key, mut value) = self.entries[self.position].clone();
            self.position += 1;

            let mut suppressed = false;
            for operation in self.operations {
                match operation {
                    EntryOperation::Filter(predicate) => {
                        if !predicate(&key, &value) {
                            suppressed = true;
                            break;
                        }
                    }
                    EntryOperation::Map(transform) => {
                        (key, value) = transform(key, value);
                    }
                }
            }

            if !suppressed {
                return Some((key, value));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.entries.len() - self.position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::cell::Cell;

    #[rstest]
    fn empty_entries_produce_nothing() {
        let pipeline = EntryPipeline::<&str, i32>::new(Vec::new());
        assert_eq!(pipeline.to_vec(), Vec::new());
    }

    #[rstest]
    fn construction_snapshots_entries() {
        let mut mapping = HashMap::new();
        mapping.insert("a", 1);

        let pipeline = EntryPipeline::from(&mapping);
        mapping.insert("b", 2);

        assert_eq!(pipeline.to_vec(), vec![("a", 1)]);
    }

    #[rstest]
    fn map_rewrites_keys_and_values() {
        let pipeline = EntryPipeline::new(vec![(String::from("a"), 1), (String::from("b"), 2)])
            .map(|key, value| (key.to_uppercase(), value * 10));
        assert_eq!(
            pipeline.to_vec(),
            vec![(String::from("A"), 10), (String::from("B"), 20)]
        );
    }

    #[rstest]
    fn filter_sees_entries_after_preceding_maps() {
        let pipeline = EntryPipeline::new(vec![("a", 1), ("b", 2)])
            .map(|key, value| (key, value * 10))
            .filter(|_, value| *value > 15);
        assert_eq!(pipeline.to_vec(), vec![("b", 20)]);
    }

    #[rstest]
    fn operations_apply_in_declaration_order() {
        let pipeline = EntryPipeline::new(vec![(1, 1), (2, 2), (3, 3)])
            .filter(|key, _| key % 2 == 1)
            .map(|key, value| (key, value + 100));
        assert_eq!(pipeline.to_vec(), vec![(1, 101), (3, 103)]);
    }

    #[rstest]
    fn chain_methods_do_not_mutate_parent() {
        let base = EntryPipeline::new(vec![("a", 1), ("b", 2)]);
        let filtered = base.filter(|_, value| *value > 1);

        assert_eq!(base.operation_count(), 0);
        assert_eq!(base.to_vec(), vec![("a", 1), ("b", 2)]);
        assert_eq!(filtered.to_vec(), vec![("b", 2)]);
    }

    #[rstest]
    fn laziness_no_callback_runs_before_consumption() {
        let calls = Rc::new(Cell::new(0));
        let observer = Rc::clone(&calls);

        let pipeline = EntryPipeline::new(vec![("a", 1)]).map(move |key, value| {
            observer.set(observer.get() + 1);
            (key, value)
        });
        assert_eq!(calls.get(), 0);

        let _ = pipeline.to_vec();
        assert_eq!(calls.get(), 1);
    }

    #[rstest]
    fn btreemap_snapshot_preserves_its_enumeration_order() {
        let mut mapping = BTreeMap::new();
        mapping.insert(3, "c");
        mapping.insert(1, "a");
        mapping.insert(2, "b");

        let pipeline = EntryPipeline::from(&mapping);
        assert_eq!(pipeline.to_vec(), vec![(1, "a"), (2, "b"), (3, "c")]);
    }

    #[rstest]
    fn to_map_collects_into_hashmap() {
        let collected = EntryPipeline::new(vec![("a", 1), ("b", 2)])
            .map(|key, value| (key, value * 2))
            .to_map();
        assert_eq!(collected.get("a"), Some(&2));
        assert_eq!(collected.get("b"), Some(&4));
    }

    #[rstest]
    fn into_iterator_composes_with_collect() {
        let pipeline = EntryPipeline::new(vec![(1, "one"), (2, "two")]);
        let collected: Vec<(i32, &str)> = (&pipeline).into_iter().collect();
        assert_eq!(collected, vec![(1, "one"), (2, "two")]);
    }

    #[rstest]
    fn pipeline_is_reusable_across_consumers() {
        let pipeline = EntryPipeline::new(vec![("a", 1)]).map(|key, value| (key, value + 1));
        assert_eq!(pipeline.to_vec(), vec![("a", 2)]);
        assert_eq!(pipeline.to_vec(), vec![("a", 2)]);
    }
}
