// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Push-based, lazily subscribed streams.
//!
//! An [`EventStream`] is a *description* of a stream: cloning it is cheap and
//! every [`open`](EventStream::open) or [`subscribe`](EventStream::subscribe)
//! creates a fresh subscription of the whole upstream chain. Hot, multicast
//! behaviour is opt-in through [`share`](EventStream::share) and through the
//! trigger registry.
//!
//! # Notifications
//!
//! Items are `Result<T, StreamError>`:
//! * `Ok(value)` - a value notification
//! * `Err(error)` - the error notification, always the last item
//! * end of the underlying `futures::Stream` - the completion notification
//!
//! # Cancellation
//!
//! Dropping an opened stream releases the whole chain, timers included.
//! [`Subscription::unsubscribe`] does the same for a spawned subscriber. On
//! a multi-threaded runtime a value already being handed to the handler when
//! `unsubscribe` runs may still be delivered; nothing after it is.
//!
//! ```rust
//! use the_flowline::stream::EventStream;
//! use futures::StreamExt;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let doubled = EventStream::from_iter(vec![1, 2, 3]).map(|v| v * 2);
//! let values: Vec<_> = doubled.open().collect().await;
//! assert_eq!(values, vec![Ok(2), Ok(4), Ok(6)]);
//! # }
//! ```

mod combinators;
mod operators;
mod shared;

use futures::stream::{self, BoxStream};
use futures::StreamExt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::errors::StreamError;

pub(crate) use shared::Hub;

/// A single notification.
pub type Item<T> = Result<T, StreamError>;

/// An opened, type-erased stream of notifications.
pub type Items<T> = BoxStream<'static, Item<T>>;

/// Bound shared by every payload that can travel through the engine.
///
/// Multicast hands every subscriber its own copy, hence `Clone`.
pub trait Payload: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> Payload for T {}

/// A cold, cloneable stream description.
pub struct EventStream<T> {
    factory: Arc<dyn Fn() -> Items<T> + Send + Sync>,
}

impl<T> Clone for EventStream<T> {
    fn clone(&self) -> Self {
        Self {
            factory: Arc::clone(&self.factory),
        }
    }
}

impl<T> std::fmt::Debug for EventStream<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStream")
            .field("payload", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T: Payload> EventStream<T> {
    /// Build a stream from a factory that is invoked once per subscription.
    pub fn from_fn<F, S>(factory: F) -> Self
    where
        F: Fn() -> S + Send + Sync + 'static,
        S: futures::Stream<Item = Item<T>> + Send + 'static,
    {
        Self {
            factory: Arc::new(move || factory().boxed()),
        }
    }

    /// Emit a single value, then complete.
    pub fn of(value: T) -> Self {
        Self::from_iter(std::iter::once(value))
    }

    /// Emit every value of the collection in order, then complete.
    pub fn from_iter<I>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let values: Vec<T> = values.into_iter().collect();
        Self::from_fn(move || stream::iter(values.clone().into_iter().map(Ok)))
    }

    /// Run a future per subscription and emit its output.
    pub fn from_future<F, Fut>(factory: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        Self::from_fn(move || stream::once(factory()).map(Ok))
    }

    /// Like [`from_future`](Self::from_future) for futures that can fail.
    pub fn try_from_future<F, Fut>(factory: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, StreamError>> + Send + 'static,
    {
        Self::from_fn(move || stream::once(factory()))
    }

    /// Complete immediately without emitting.
    pub fn empty() -> Self {
        Self::from_fn(stream::empty::<Item<T>>)
    }

    /// Never emit and never complete.
    pub fn never() -> Self {
        Self::from_fn(stream::pending::<Item<T>>)
    }

    /// Emit `error` immediately.
    pub fn fail(error: StreamError) -> Self {
        Self::from_fn(move || stream::once(futures::future::ready(Err(error.clone()))))
    }

    /// Subscribe to the upstream chain and hand back the raw notifications.
    ///
    /// The upstream is attached synchronously: a hot source observed through
    /// this call delivers every value published after `open` returns.
    pub fn open(&self) -> Items<T> {
        (self.factory)()
    }

    /// Spawn a subscriber that calls `handler` for every value.
    ///
    /// Must be called from within a tokio runtime.
    pub fn subscribe<H>(&self, handler: H) -> Subscription
    where
        H: FnMut(T) + Send + 'static,
    {
        self.subscribe_observer(FnObserver(handler))
    }

    /// Spawn a subscriber that receives value, error and completion notifications.
    pub fn subscribe_observer<O>(&self, observer: O) -> Subscription
    where
        O: Observer<T>,
    {
        let mut items = self.open();
        let token = CancellationToken::new();
        let guard = token.clone();

        let task = tokio::spawn(async move {
            let mut observer = observer;
            loop {
                tokio::select! {
                    biased;
                    _ = guard.cancelled() => return,
                    item = items.next() => {
                        if guard.is_cancelled() {
                            return;
                        }
                        match item {
                            Some(Ok(value)) => observer.next(value),
                            Some(Err(error)) => {
                                observer.error(error);
                                return;
                            }
                            None => {
                                observer.complete();
                                return;
                            }
                        }
                    }
                }
            }
        });

        Subscription { token, task }
    }
}

impl EventStream<u64> {
    /// Emit an increasing counter every `period`, starting after the first period.
    pub fn interval(period: Duration) -> Self {
        Self::from_fn(move || {
            stream::unfold(0u64, move |tick| async move {
                tokio::time::sleep(period).await;
                Some((Ok(tick), tick + 1))
            })
        })
    }
}

/// Receiver of stream notifications.
pub trait Observer<T>: Send + 'static {
    fn next(&mut self, value: T);

    fn error(&mut self, error: StreamError) {
        tracing::warn!(error = %error, "Unhandled stream error");
    }

    fn complete(&mut self) {}
}

struct FnObserver<H>(H);

impl<T, H> Observer<T> for FnObserver<H>
where
    H: FnMut(T) + Send + 'static,
{
    fn next(&mut self, value: T) {
        (self.0)(value)
    }
}

/// Handle to a spawned subscriber.
///
/// Dropping the handle leaves the subscriber running; flows keep their
/// subscriptions for the process lifetime.
pub struct Subscription {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl Subscription {
    /// Release the subscription.
    ///
    /// No value the subscriber receives after this returns reaches the
    /// handler. A delivery already in progress on another worker thread may
    /// still complete. The upstream chain is dropped the next time the
    /// subscriber task is scheduled.
    pub fn unsubscribe(&self) {
        self.token.cancel();
    }

    pub fn is_unsubscribed(&self) -> bool {
        self.token.is_cancelled()
    }

    /// True once the subscriber saw completion, an error, or was released.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the subscriber task to end.
    pub async fn closed(self) {
        let _ = self.task.await;
    }
}
