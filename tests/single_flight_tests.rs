#![cfg(feature = "concurrent")]
//! Integration tests for the single-flight async memoizer.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use rstest::rstest;

use lazyflow::concurrent::SingleFlight;

#[rstest]
#[tokio::test]
async fn two_calls_without_reset_invoke_the_factory_once() {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&runs);

    let flight = SingleFlight::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        futures::future::ready(String::from("value"))
    });

    assert_eq!(flight.get().await, "value");
    assert_eq!(flight.get().await, "value");
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[rstest]
#[tokio::test]
async fn reset_then_get_invokes_the_factory_again() {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&runs);

    let flight = SingleFlight::new(move || {
        let run = counter.fetch_add(1, Ordering::SeqCst);
        futures::future::ready(run)
    });

    assert_eq!(flight.get().await, 0);
    flight.reset().await;
    assert_eq!(flight.get().await, 1);
    assert_eq!(runs.load(Ordering::SeqCst), 2);
}

#[rstest]
#[tokio::test]
async fn many_concurrent_callers_share_one_execution() {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&runs);

    let flight = Arc::new(SingleFlight::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            7_u64
        }
    }));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let flight = Arc::clone(&flight);
        handles.push(tokio::spawn(async move { flight.get().await }));
    }
    for handle in handles {
        assert_eq!(handle.await.expect("caller completes"), 7);
    }

    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[rstest]
#[tokio::test]
async fn reset_settles_the_outstanding_run_before_clearing() {
    let settled = Arc::new(AtomicUsize::new(0));
    let marker = Arc::clone(&settled);

    let flight = Arc::new(SingleFlight::new(move || {
        let marker = Arc::clone(&marker);
        async move {
            tokio::time::sleep(Duration::from_millis(15)).await;
            marker.fetch_add(1, Ordering::SeqCst);
            "done"
        }
    }));

    let background = Arc::clone(&flight);
    let getter = tokio::spawn(async move { background.get().await });
    while !flight.is_primed() {
        tokio::task::yield_now().await;
    }

    flight.reset().await;
    // The stale run had settled by the time reset returned.
    assert_eq!(settled.load(Ordering::SeqCst), 1);
    assert!(!flight.is_primed());
    assert_eq!(getter.await.expect("background caller completes"), "done");
}

#[rstest]
#[tokio::test]
async fn memoized_failure_is_shared_until_reset() {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&runs);

    let flight = SingleFlight::new(move || {
        let run = counter.fetch_add(1, Ordering::SeqCst);
        futures::future::ready(if run == 0 {
            Err(String::from("cold start"))
        } else {
            Ok(run)
        })
    });

    assert_eq!(flight.get().await, Err(String::from("cold start")));
    assert_eq!(flight.get().await, Err(String::from("cold start")));
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    flight.reset().await;
    assert_eq!(flight.get().await, Ok(1));
}
