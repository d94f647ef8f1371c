// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Composition operators.
//!
//! Every operator builds a new cold [`EventStream`]; nothing is subscribed
//! until the result is opened. Value order from a given source is preserved by
//! `map`, `filter`, `filter_map`, `inspect`, `take` and `delay`.

use futures::future::ready;
use futures::stream;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;

use super::combinators::{CombineLatest, Delay, SwitchMap, WithLatestFrom, Zip};
use super::{shared, EventStream, Item, Items, Payload};
use crate::errors::StreamError;

impl<T: Payload> EventStream<T> {
    pub fn map<U, F>(&self, f: F) -> EventStream<U>
    where
        U: Payload,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let upstream = self.clone();
        let f = Arc::new(f);
        EventStream::from_fn(move || {
            let f = Arc::clone(&f);
            upstream.open().map(move |item| item.map(|value| (*f)(value)))
        })
    }

    /// Map with a conversion that can fail; the first failure terminates the stream.
    pub fn try_map<U, F>(&self, f: F) -> EventStream<U>
    where
        U: Payload,
        F: Fn(T) -> Result<U, StreamError> + Send + Sync + 'static,
    {
        let upstream = self.clone();
        let f = Arc::new(f);
        EventStream::from_fn(move || {
            let f = Arc::clone(&f);
            until_error(upstream.open().map(move |item| item.and_then(|value| (*f)(value))))
        })
    }

    /// Replace every value with a clone of `value`.
    pub fn map_to<U: Payload>(&self, value: U) -> EventStream<U> {
        self.map(move |_| value.clone())
    }

    pub fn filter<P>(&self, predicate: P) -> EventStream<T>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let upstream = self.clone();
        let predicate = Arc::new(predicate);
        EventStream::from_fn(move || {
            let predicate = Arc::clone(&predicate);
            upstream.open().filter(move |item| {
                let keep = match item {
                    Ok(value) => (*predicate)(value),
                    Err(_) => true,
                };
                ready(keep)
            })
        })
    }

    pub fn filter_map<U, F>(&self, f: F) -> EventStream<U>
    where
        U: Payload,
        F: Fn(T) -> Option<U> + Send + Sync + 'static,
    {
        let upstream = self.clone();
        let f = Arc::new(f);
        EventStream::from_fn(move || {
            let f = Arc::clone(&f);
            upstream.open().filter_map(move |item| {
                ready(match item {
                    Ok(value) => (*f)(value).map(Ok),
                    Err(error) => Some(Err(error)),
                })
            })
        })
    }

    /// Run a side effect for every value without changing it.
    pub fn inspect<F>(&self, f: F) -> EventStream<T>
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let upstream = self.clone();
        let f = Arc::new(f);
        EventStream::from_fn(move || {
            let f = Arc::clone(&f);
            upstream.open().inspect(move |item| {
                if let Ok(value) = item {
                    (*f)(value)
                }
            })
        })
    }

    /// Emit the first `count` notifications, then complete.
    pub fn take(&self, count: usize) -> EventStream<T> {
        let upstream = self.clone();
        EventStream::from_fn(move || upstream.open().take(count))
    }

    /// Emit `value` before anything the upstream emits.
    pub fn start_with(&self, value: T) -> EventStream<T> {
        let upstream = self.clone();
        EventStream::from_fn(move || stream::once(ready(Ok(value.clone()))).chain(upstream.open()))
    }

    /// Interleave both streams in arrival order.
    ///
    /// Completes when both complete; the first error of either side
    /// terminates the merged stream.
    pub fn merge(&self, other: &EventStream<T>) -> EventStream<T> {
        Self::merge_all(vec![self.clone(), other.clone()])
    }

    pub fn merge_all(streams: Vec<EventStream<T>>) -> EventStream<T> {
        EventStream::from_fn(move || {
            let opened: Vec<Items<T>> = streams.iter().map(EventStream::open).collect();
            until_error(stream::select_all(opened))
        })
    }

    /// Pair values strictly in arrival order per side.
    ///
    /// The n-th value of `self` is paired with the n-th value of `other`;
    /// nothing is emitted until both sides have an unconsumed value.
    pub fn zip<U: Payload>(&self, other: &EventStream<U>) -> EventStream<(T, U)> {
        let left = self.clone();
        let right = other.clone();
        EventStream::from_fn(move || Zip::new(left.open(), right.open()))
    }

    /// Emit the latest pair whenever either side emits, once both have emitted.
    pub fn combine_latest<U: Payload>(&self, other: &EventStream<U>) -> EventStream<(T, U)> {
        let left = self.clone();
        let right = other.clone();
        EventStream::from_fn(move || CombineLatest::new(left.open(), right.open()))
    }

    /// Pair every value of `self` with the latest value of `other`.
    ///
    /// Values of `self` that arrive before `other` has emitted are dropped.
    pub fn with_latest_from<U: Payload>(&self, other: &EventStream<U>) -> EventStream<(T, U)> {
        let primary = self.clone();
        let latest = other.clone();
        EventStream::from_fn(move || WithLatestFrom::new(primary.open(), latest.open()))
    }

    /// Map every value to an inner stream and follow only the most recent one.
    ///
    /// A new outer value drops the previous inner stream, cancelling whatever
    /// it had in flight.
    pub fn switch_map<U, F>(&self, f: F) -> EventStream<U>
    where
        U: Payload,
        F: Fn(T) -> EventStream<U> + Send + Sync + 'static,
    {
        let upstream = self.clone();
        let f: Arc<dyn Fn(T) -> EventStream<U> + Send + Sync> = Arc::new(f);
        EventStream::from_fn(move || SwitchMap::new(upstream.open(), Arc::clone(&f)))
    }

    /// Shift every value by `duration`, keeping relative timing.
    ///
    /// Errors are delivered immediately and discard values still waiting.
    pub fn delay(&self, duration: Duration) -> EventStream<T> {
        let upstream = self.clone();
        EventStream::from_fn(move || Delay::new(upstream.open(), duration))
    }

    /// Multicast with reference counting.
    ///
    /// The first subscriber connects the upstream once; later subscribers
    /// share that connection. When the last subscriber leaves, the upstream is
    /// cancelled and the next subscriber reconnects.
    pub fn share(&self) -> EventStream<T> {
        shared::share(self.clone())
    }
}

/// End the stream right after its first error notification.
///
/// The upstream is dropped together with the error, so pending sources are
/// released instead of being polled again.
pub(crate) fn until_error<T, S>(items: S) -> Items<T>
where
    T: Payload,
    S: futures::Stream<Item = Item<T>> + Send + 'static,
{
    stream::unfold(Some(items.boxed()), |upstream| async move {
        match upstream {
            None => None,
            Some(mut upstream) => {
                let item = upstream.next().await;
                item.map(|item| {
                    let next = if item.is_err() { None } else { Some(upstream) };
                    (item, next)
                })
            }
        }
    })
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::Instant;

    async fn values<T: Payload + std::fmt::Debug>(stream: &EventStream<T>) -> Vec<T> {
        stream
            .open()
            .map(|item| item.expect("unexpected stream error"))
            .collect()
            .await
    }

    #[tokio::test]
    async fn test_map_filter_preserve_order() {
        let stream = EventStream::from_iter(1..=6).filter(|v| v % 2 == 0).map(|v| v * 10);
        assert_eq!(values(&stream).await, vec![20, 40, 60]);
    }

    #[tokio::test]
    async fn test_filter_map_and_start_with() {
        let stream = EventStream::from_iter(vec!["1", "x", "3"])
            .filter_map(|s| s.parse::<i32>().ok())
            .start_with(0);
        assert_eq!(values(&stream).await, vec![0, 1, 3]);
    }

    #[tokio::test]
    async fn test_merge_completes_after_both_sides() {
        let merged = EventStream::from_iter(vec![1, 2]).merge(&EventStream::from_iter(vec![3]));
        let mut seen = values(&merged).await;
        seen.sort();
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_merge_terminates_on_first_error() {
        let merged = EventStream::never().merge(&EventStream::<i32>::fail(StreamError::source("a", "down")));
        let items: Vec<_> = merged.open().collect().await;
        assert_eq!(items, vec![Err(StreamError::source("a", "down"))]);
    }

    #[tokio::test]
    async fn test_error_releases_pending_upstream() {
        let releases = Arc::new(AtomicUsize::new(0));

        struct Release(Arc<AtomicUsize>);

        impl Drop for Release {
            fn drop(&mut self) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let counter = releases.clone();
        let pending = EventStream::<i32>::from_fn(move || {
            stream::unfold(Release(counter.clone()), |guard| async move {
                futures::future::pending::<()>().await;
                Some((Ok(0), guard))
            })
        });
        let merged = pending.merge(&EventStream::fail(StreamError::source("a", "down")));

        let mut items = merged.open();
        assert_eq!(items.next().await, Some(Err(StreamError::source("a", "down"))));
        assert_eq!(releases.load(Ordering::SeqCst), 1);
        assert_eq!(items.next().await, None);
    }

    #[tokio::test]
    async fn test_try_map_failure_releases_upstream() {
        let parsed = EventStream::of("x")
            .merge(&EventStream::never())
            .try_map(|text| {
                text.parse::<u32>()
                    .map_err(|err| StreamError::source("parse", err.to_string()))
            });

        let items = tokio::time::timeout(Duration::from_secs(5), parsed.open().collect::<Vec<_>>())
            .await
            .expect("stream must end after its error");
        assert_eq!(items.len(), 1);
        assert!(items[0].is_err());
    }

    #[tokio::test]
    async fn test_zip_pairs_in_arrival_order() {
        let zipped = EventStream::from_iter(vec![1, 2, 3]).zip(&EventStream::from_iter(vec!["a", "b"]));
        assert_eq!(values(&zipped).await, vec![(1, "a"), (2, "b")]);
    }

    #[tokio::test]
    async fn test_zip_error_is_not_held_back() {
        let zipped = EventStream::<i32>::never().zip(&EventStream::<i32>::fail(StreamError::source("b", "gone")));
        let items: Vec<_> = zipped.open().collect().await;
        assert_eq!(items, vec![Err(StreamError::source("b", "gone"))]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zip_waits_for_slower_source() {
        let fast = EventStream::of("host").delay(Duration::from_millis(50));
        let slow = EventStream::of("create").delay(Duration::from_millis(100));
        let start = Instant::now();

        let pairs = values(&slow.zip(&fast)).await;

        assert_eq!(pairs, vec![("create", "host")]);
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_keeps_relative_timing() {
        let start = Instant::now();
        let ticks = EventStream::interval(Duration::from_millis(10))
            .take(3)
            .delay(Duration::from_millis(100))
            .map(move |tick| (tick, start.elapsed().as_millis()));

        assert_eq!(values(&ticks).await, vec![(0, 110), (1, 120), (2, 130)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_switch_map_cancels_previous_inner() {
        let outer = EventStream::interval(Duration::from_millis(10)).take(3);
        let switched = outer.switch_map(|tick| EventStream::of(tick).delay(Duration::from_millis(25)));

        assert_eq!(values(&switched).await, vec![2]);
    }

    #[tokio::test]
    async fn test_combine_latest_emits_on_either_side() {
        let combined = EventStream::of("x").combine_latest(&EventStream::from_iter(vec![1, 2]));
        assert_eq!(values(&combined).await, vec![("x", 1), ("x", 2)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_latest_from_pairs_each_primary_value() {
        let primary = EventStream::from_iter(vec![1, 2]).delay(Duration::from_millis(10));
        let sampled = primary.with_latest_from(&EventStream::of("ready"));
        assert_eq!(values(&sampled).await, vec![(1, "ready"), (2, "ready")]);
    }

    #[tokio::test]
    async fn test_share_subscribes_upstream_once() {
        let connections = Arc::new(AtomicUsize::new(0));
        let counter = connections.clone();
        let source = EventStream::from_fn(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            stream::iter(vec![Ok(1), Ok(2)])
        });

        let shared = source.share();
        let first = shared.open();
        let second = shared.open();

        let (a, b): (Vec<_>, Vec<_>) = futures::join!(first.collect(), second.collect());

        assert_eq!(a, vec![Ok(1), Ok(2)]);
        assert_eq!(a, b);
        assert_eq!(connections.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_try_map_stops_at_first_failure() {
        let parsed = EventStream::from_iter(vec!["1", "x", "3"]).try_map(|text| {
            text.parse::<u32>()
                .map_err(|err| StreamError::source("parse", err.to_string()))
        });

        let items: Vec<Item<u32>> = parsed.open().collect().await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], Ok(1));
        assert!(items[1].is_err());
    }
}
