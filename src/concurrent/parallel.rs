//! Bounded parallel execution with input-order results.
//!
//! The runner keeps a cursor over the task list, starts up to the
//! concurrency cap immediately, and starts one more task each time one
//! settles: a greedy pipeline, never batched rounds. Each outcome is
//! recorded at the task's original index, so the result order matches the
//! input order regardless of completion order.
//!
//! Rust futures are lazy, so the task list doubles as the "zero-argument
//! task producers" of a callback-based design: nothing runs until the
//! runner polls it.
//!
//! # Failure Policy
//!
//! [`parallel`] is fail-fast: the first error settles the whole call, and
//! the still-running futures are dropped, which cancels them. Their side
//! effects up to that point have already happened; nothing keeps running
//! in the background. [`parallel_settled`] never fails and captures every
//! outcome per slot instead.

use std::future::Future;

use futures::stream::{FuturesUnordered, StreamExt};

/// Runs every task concurrently without a cap; results keep input order.
///
/// Resolves with every value once all tasks succeed, or with the first
/// error encountered. Empty input resolves immediately with an empty
/// vector without polling anything.
///
/// # Errors
///
/// Returns the first task error encountered, in completion order.
///
/// # Examples
///
/// ```rust
/// use lazyflow::concurrent::parallel;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let tasks = (1..=3).map(|n| async move { Ok::<_, String>(n * 10) });
///     let results = parallel(tasks).await.unwrap();
///     assert_eq!(results, vec![10, 20, 30]);
/// }
/// ```
pub async fn parallel<I, Fut, T, E>(tasks: I) -> Result<Vec<T>, E>
where
    I: IntoIterator<Item = Fut>,
    Fut: Future<Output = Result<T, E>>,
{
    parallel_limit(tasks, usize::MAX).await
}

/// Runs tasks with at most `concurrency` in flight; results keep input
/// order.
///
/// Scheduling is greedy: a replacement task starts the moment one
/// settles. Fail-fast like [`parallel`].
///
/// # Errors
///
/// Returns the first task error encountered, in completion order.
///
/// # Panics
///
/// Panics if `concurrency` is 0.
pub async fn parallel_limit<I, Fut, T, E>(tasks: I, concurrency: usize) -> Result<Vec<T>, E>
where
    I: IntoIterator<Item = Fut>,
    Fut: Future<Output = Result<T, E>>,
{
    assert!(concurrency > 0, "concurrency must be greater than 0");

    let mut pending = tasks.into_iter().enumerate();
    let indexed = |(index, task): (usize, Fut)| async move { (index, task.await) };

    let mut in_flight: FuturesUnordered<_> =
        pending.by_ref().take(concurrency).map(indexed).collect();
    let mut results: Vec<Option<T>> = Vec::new();

    while let Some((index, outcome)) = in_flight.next().await {
        match outcome {
            Ok(value) => {
                if results.len() <= index {
                    results.resize_with(index + 1, || None);
                }
                results[index] = Some(value);
            }
            // Dropping `in_flight` here cancels the remaining tasks.
            Err(error) => return Err(error),
        }
        if let Some(slot) = pending.next() {
            in_flight.push(indexed(slot));
        }
    }

    Ok(results
        .into_iter()
        .map(|slot| slot.expect("every completed task fills its result slot"))
        .collect())
}

/// Runs every task concurrently without a cap, capturing each outcome.
///
/// Never fails: every slot records the task's `Ok` or `Err`, and the call
/// resolves once all tasks have settled, preserving input order.
///
/// # Examples
///
/// ```rust
/// use lazyflow::concurrent::parallel_settled;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let tasks: Vec<std::pin::Pin<Box<dyn std::future::Future<Output = Result<i32, String>>>>> = vec![
///         Box::pin(async { Ok::<_, String>(1) }),
///         Box::pin(async { Err(String::from("boom")) }),
///     ];
///     let outcomes = parallel_settled(tasks).await;
///     assert_eq!(outcomes[0], Ok(1));
///     assert_eq!(outcomes[1], Err(String::from("boom")));
/// }
/// ```
pub async fn parallel_settled<I, Fut, T, E>(tasks: I) -> Vec<Result<T, E>>
where
    I: IntoIterator<Item = Fut>,
    Fut: Future<Output = Result<T, E>>,
{
    parallel_settled_limit(tasks, usize::MAX).await
}

/// Runs tasks with at most `concurrency` in flight, capturing each
/// outcome.
///
/// Same scheduling as [`parallel_limit`]; never fails.
///
/// # Panics
///
/// Panics if `concurrency` is 0.
pub async fn parallel_settled_limit<I, Fut, T, E>(
    tasks: I,
    concurrency: usize,
) -> Vec<Result<T, E>>
where
    I: IntoIterator<Item = Fut>,
    Fut: Future<Output = Result<T, E>>,
{
    assert!(concurrency > 0, "concurrency must be greater than 0");

    let mut pending = tasks.into_iter().enumerate();
    let indexed = |(index, task): (usize, Fut)| async move { (index, task.await) };

    let mut in_flight: FuturesUnordered<_> =
        pending.by_ref().take(concurrency).map(indexed).collect();
    let mut outcomes: Vec<Option<Result<T, E>>> = Vec::new();

    while let Some((index, outcome)) = in_flight.next().await {
        if outcomes.len() <= index {
            outcomes.resize_with(index + 1, || None);
        }
        outcomes[index] = Some(outcome);
        if let Some(slot) = pending.next() {
            in_flight.push(indexed(slot));
        }
    }

    outcomes
        .into_iter()
        .map(|slot| slot.expect("every settled task fills its outcome slot"))
        .collect()
}

/// Applies an async transform to every element without a concurrency cap.
///
/// The transform receives each element, its index, and the whole input
/// slice. Because the returned future cannot borrow those arguments, move
/// whatever the future needs into it (cloning where necessary).
///
/// # Errors
///
/// Fail-fast: the first transform error settles the whole call.
///
/// # Examples
///
/// ```rust
/// use lazyflow::concurrent::map_async;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let doubled = map_async(&[1, 2, 3], |item, _, _| {
///         let item = *item;
///         async move { Ok::<_, String>(item * 2) }
///     })
///     .await
///     .unwrap();
///     assert_eq!(doubled, vec![2, 4, 6]);
/// }
/// ```
pub async fn map_async<T, U, E, F, Fut>(items: &[T], transform: F) -> Result<Vec<U>, E>
where
    F: FnMut(&T, usize, &[T]) -> Fut,
    Fut: Future<Output = Result<U, E>>,
{
    map_async_limit(items, usize::MAX, transform).await
}

/// Applies an async transform to every element, at most `concurrency` in
/// flight.
///
/// # Errors
///
/// Fail-fast: the first transform error settles the whole call.
///
/// # Panics
///
/// Panics if `concurrency` is 0.
pub async fn map_async_limit<T, U, E, F, Fut>(
    items: &[T],
    concurrency: usize,
    mut transform: F,
) -> Result<Vec<U>, E>
where
    F: FnMut(&T, usize, &[T]) -> Fut,
    Fut: Future<Output = Result<U, E>>,
{
    let tasks: Vec<Fut> = items
        .iter()
        .enumerate()
        .map(|(index, item)| transform(item, index, items))
        .collect();
    parallel_limit(tasks, concurrency).await
}

/// Keeps the elements an async predicate accepts, without a concurrency
/// cap.
///
/// The predicate receives each element, its index, and the whole input
/// slice; accepted elements are cloned into the result in input order.
///
/// # Errors
///
/// Fail-fast: the first predicate error settles the whole call.
///
/// # Examples
///
/// ```rust
/// use lazyflow::concurrent::filter_async;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let evens = filter_async(&[1, 2, 3, 4], |item, _, _| {
///         let keep = item % 2 == 0;
///         async move { Ok::<_, String>(keep) }
///     })
///     .await
///     .unwrap();
///     assert_eq!(evens, vec![2, 4]);
/// }
/// ```
pub async fn filter_async<T, E, F, Fut>(items: &[T], predicate: F) -> Result<Vec<T>, E>
where
    T: Clone,
    F: FnMut(&T, usize, &[T]) -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    filter_async_limit(items, usize::MAX, predicate).await
}

/// Keeps the elements an async predicate accepts, at most `concurrency`
/// in flight.
///
/// # Errors
///
/// Fail-fast: the first predicate error settles the whole call.
///
/// # Panics
///
/// Panics if `concurrency` is 0.
pub async fn filter_async_limit<T, E, F, Fut>(
    items: &[T],
    concurrency: usize,
    mut predicate: F,
) -> Result<Vec<T>, E>
where
    T: Clone,
    F: FnMut(&T, usize, &[T]) -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    let tasks: Vec<Fut> = items
        .iter()
        .enumerate()
        .map(|(index, item)| predicate(item, index, items))
        .collect();
    let verdicts = parallel_limit(tasks, concurrency).await?;

    Ok(items
        .iter()
        .zip(verdicts)
        .filter_map(|(item, keep)| keep.then(|| item.clone()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[rstest]
    #[tokio::test]
    async fn parallel_empty_input_resolves_immediately() {
        let tasks: Vec<std::future::Ready<Result<i32, String>>> = Vec::new();
        let results = parallel(tasks).await.unwrap();
        assert_eq!(results, Vec::<i32>::new());
    }

    #[rstest]
    #[tokio::test]
    async fn parallel_preserves_input_order_despite_completion_order() {
        let tasks = (0..5_u64).map(|n| async move {
            // Later tasks finish first.
            tokio::time::sleep(Duration::from_millis(50 - n * 10)).await;
            Ok::<_, String>(n)
        });
        let results = parallel(tasks).await.unwrap();
        assert_eq!(results, vec![0, 1, 2, 3, 4]);
    }

    #[rstest]
    #[tokio::test]
    async fn parallel_limit_bounds_in_flight_tasks() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let high_water = Arc::new(AtomicUsize::new(0));

        let tasks = (0..8).map(|n| {
            let in_flight = Arc::clone(&in_flight);
            let high_water = Arc::clone(&high_water);
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                high_water.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok::<_, String>(n)
            }
        });

        let results = parallel_limit(tasks, 3).await.unwrap();
        assert_eq!(results.len(), 8);
        assert!(high_water.load(Ordering::SeqCst) <= 3);
    }

    #[rstest]
    #[tokio::test]
    async fn parallel_rejects_with_first_failure() {
        let started = Arc::new(AtomicUsize::new(0));
        let tasks = (0..4).map(|n| {
            let started = Arc::clone(&started);
            async move {
                started.fetch_add(1, Ordering::SeqCst);
                if n == 1 {
                    Err(format!("task {n} failed"))
                } else {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    Ok(n)
                }
            }
        });

        let error = parallel_limit(tasks, 2).await.unwrap_err();
        assert_eq!(error, "task 1 failed");
    }

    #[rstest]
    #[tokio::test]
    async fn parallel_settled_captures_every_outcome_in_order() {
        let tasks = (0..4).map(|n| async move {
            if n % 2 == 0 {
                Ok(n)
            } else {
                Err(format!("odd {n}"))
            }
        });

        let outcomes = parallel_settled(tasks).await;
        assert_eq!(outcomes.len(), 4);
        assert_eq!(outcomes[0], Ok(0));
        assert_eq!(outcomes[1], Err(String::from("odd 1")));
        assert_eq!(outcomes[2], Ok(2));
        assert_eq!(outcomes[3], Err(String::from("odd 3")));
    }

    #[rstest]
    #[tokio::test]
    async fn map_async_passes_index_and_source() {
        let items = [10, 20, 30];
        let results = map_async(&items, |item, index, all| {
            let item = *item;
            let len = all.len();
            async move { Ok::<_, String>(item + index + len) }
        })
        .await
        .unwrap();
        assert_eq!(results, vec![13, 24, 35]);
    }

    #[rstest]
    #[tokio::test]
    async fn filter_async_keeps_accepted_elements_in_order() {
        let items = [1, 2, 3, 4, 5];
        let results = filter_async_limit(&items, 2, |item, _, _| {
            let keep = item % 2 == 1;
            async move { Ok::<_, String>(keep) }
        })
        .await
        .unwrap();
        assert_eq!(results, vec![1, 3, 5]);
    }

    #[rstest]
    #[tokio::test]
    async fn filter_async_propagates_predicate_errors() {
        let items = [1, 2, 3];
        let error = filter_async(&items, |item, _, _| {
            let item = *item;
            async move {
                if item == 2 {
                    Err(String::from("cannot judge 2"))
                } else {
                    Ok(true)
                }
            }
        })
        .await
        .unwrap_err();
        assert_eq!(error, "cannot judge 2");
    }

    #[rstest]
    #[should_panic(expected = "concurrency must be greater than 0")]
    #[tokio::test]
    async fn parallel_limit_panics_on_zero_concurrency() {
        let tasks = vec![async { Ok::<_, String>(1) }];
        let _ = parallel_limit(tasks, 0).await;
    }
}
