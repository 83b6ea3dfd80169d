#![cfg(feature = "iter")]
//! Integration tests for `EntryPipeline`.
//!
//! These cover the snapshot-at-construction contract, entry rewriting,
//! filter-after-map visibility, and conversion back into associative
//! containers.

use std::cell::Cell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use rstest::rstest;

use lazyflow::iter::EntryPipeline;

// =============================================================================
// Snapshot Semantics
// =============================================================================

#[rstest]
fn later_mutation_of_the_source_is_invisible() {
    let mut inventory = BTreeMap::new();
    inventory.insert("apples", 3);
    inventory.insert("pears", 5);

    let pipeline = EntryPipeline::from(&inventory);

    inventory.insert("plums", 7);
    inventory.remove("apples");

    assert_eq!(pipeline.to_vec(), vec![("apples", 3), ("pears", 5)]);
}

#[rstest]
fn snapshot_preserves_enumeration_order() {
    let mut ordered = BTreeMap::new();
    ordered.insert(2, "b");
    ordered.insert(1, "a");
    ordered.insert(3, "c");

    let pipeline = EntryPipeline::from(&ordered);
    assert_eq!(pipeline.to_vec(), vec![(1, "a"), (2, "b"), (3, "c")]);
}

// =============================================================================
// Entry Rewriting
// =============================================================================

#[rstest]
fn map_rewrites_whole_entries() {
    let pipeline = EntryPipeline::new(vec![(1, 10), (2, 20)]).map(|key, value| (key * 100, value + 1));
    assert_eq!(pipeline.to_vec(), vec![(100, 11), (200, 21)]);
}

#[rstest]
fn filter_inspects_the_entry_after_preceding_maps() {
    let observed = Rc::new(Cell::new(0));
    let observer = Rc::clone(&observed);

    let pipeline = EntryPipeline::new(vec![("a", 1), ("b", 2), ("c", 3)])
        .map(|key, value| (key, value * 10))
        .filter(move |_, value| {
            observer.set(observer.get() + *value);
            *value >= 20
        });

    assert_eq!(pipeline.to_vec(), vec![("b", 20), ("c", 30)]);
    // The filter saw the mapped values, not the originals.
    assert_eq!(observed.get(), 60);
}

#[rstest]
fn chains_from_one_parent_are_independent() {
    let base = EntryPipeline::new(vec![("a", 1), ("b", 2)]);
    let doubled = base.map(|key, value| (key, value * 2));
    let only_b = base.filter(|key, _| *key == "b");

    assert_eq!(doubled.to_vec(), vec![("a", 2), ("b", 4)]);
    assert_eq!(only_b.to_vec(), vec![("b", 2)]);
    assert_eq!(base.to_vec(), vec![("a", 1), ("b", 2)]);
}

// =============================================================================
// Laziness
// =============================================================================

#[rstest]
fn callbacks_wait_for_a_terminal_consumer() {
    let calls = Rc::new(Cell::new(0));
    let observer = Rc::clone(&calls);

    let pipeline = EntryPipeline::new(vec![("a", 1), ("b", 2)]).filter(move |_, _| {
        observer.set(observer.get() + 1);
        true
    });

    assert_eq!(calls.get(), 0);
    let _ = pipeline.to_vec();
    assert_eq!(calls.get(), 2);
}

// =============================================================================
// Conversion to Associative Containers
// =============================================================================

#[rstest]
fn to_map_round_trips_through_a_hashmap() {
    let mut source = HashMap::new();
    source.insert(String::from("one"), 1);
    source.insert(String::from("two"), 2);

    let rebuilt = EntryPipeline::from(&source)
        .map(|key, value| (key, value * 2))
        .to_map();

    assert_eq!(rebuilt.get("one"), Some(&2));
    assert_eq!(rebuilt.get("two"), Some(&4));
    assert_eq!(rebuilt.len(), 2);
}

#[rstest]
fn external_iteration_collects_into_a_btreemap() {
    let pipeline = EntryPipeline::new(vec![(3, "c"), (1, "a"), (2, "b")]);
    let sorted: BTreeMap<i32, &str> = (&pipeline).into_iter().collect();
    assert_eq!(
        sorted.into_iter().collect::<Vec<_>>(),
        vec![(1, "a"), (2, "b"), (3, "c")]
    );
}
