// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Hand-written `futures::Stream` implementations behind the multi-source operators.
//!
//! Each combinator polls every live side at most once per loop iteration and
//! only returns `Poll::Pending` when no side made progress, so every live side
//! has registered a waker.

use futures::{Stream, StreamExt};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::time::{Instant, Sleep};

use super::{EventStream, Item, Items, Payload};

enum Step<T> {
    Value(T),
    Ended,
    Idle,
}

/// Poll an optional side once, turning its error notification into an early return.
fn poll_side<T>(side: &mut Option<Items<T>>, cx: &mut Context<'_>) -> Result<Step<T>, crate::errors::StreamError> {
    let Some(items) = side.as_mut() else {
        return Ok(Step::Idle);
    };
    match items.poll_next_unpin(cx) {
        Poll::Ready(Some(Ok(value))) => Ok(Step::Value(value)),
        Poll::Ready(Some(Err(error))) => Err(error),
        Poll::Ready(None) => {
            *side = None;
            Ok(Step::Ended)
        }
        Poll::Pending => Ok(Step::Idle),
    }
}

pub(crate) struct Zip<A, B> {
    left: Option<Items<A>>,
    right: Option<Items<B>>,
    left_buffer: VecDeque<A>,
    right_buffer: VecDeque<B>,
    done: bool,
}

// Buffered values are never pinned.
impl<A, B> Unpin for Zip<A, B> {}

impl<A, B> Zip<A, B> {
    pub(crate) fn new(left: Items<A>, right: Items<B>) -> Self {
        Self {
            left: Some(left),
            right: Some(right),
            left_buffer: VecDeque::new(),
            right_buffer: VecDeque::new(),
            done: false,
        }
    }

    fn exhausted(&self) -> bool {
        (self.left.is_none() && self.left_buffer.is_empty())
            || (self.right.is_none() && self.right_buffer.is_empty())
    }
}

impl<A, B> Stream for Zip<A, B> {
    type Item = Item<(A, B)>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }

        loop {
            let mut progressed = false;

            match poll_side(&mut this.left, cx) {
                Ok(Step::Value(value)) => {
                    this.left_buffer.push_back(value);
                    progressed = true;
                }
                Ok(Step::Ended) => progressed = true,
                Ok(Step::Idle) => {}
                Err(error) => {
                    this.done = true;
                    return Poll::Ready(Some(Err(error)));
                }
            }

            match poll_side(&mut this.right, cx) {
                Ok(Step::Value(value)) => {
                    this.right_buffer.push_back(value);
                    progressed = true;
                }
                Ok(Step::Ended) => progressed = true,
                Ok(Step::Idle) => {}
                Err(error) => {
                    this.done = true;
                    return Poll::Ready(Some(Err(error)));
                }
            }

            if !this.left_buffer.is_empty() && !this.right_buffer.is_empty() {
                if let (Some(a), Some(b)) = (this.left_buffer.pop_front(), this.right_buffer.pop_front()) {
                    return Poll::Ready(Some(Ok((a, b))));
                }
            }

            if this.exhausted() {
                this.done = true;
                return Poll::Ready(None);
            }

            if !progressed {
                return Poll::Pending;
            }
        }
    }
}

pub(crate) struct CombineLatest<A, B> {
    left: Option<Items<A>>,
    right: Option<Items<B>>,
    latest_left: Option<A>,
    latest_right: Option<B>,
    done: bool,
}

impl<A, B> Unpin for CombineLatest<A, B> {}

impl<A, B> CombineLatest<A, B> {
    pub(crate) fn new(left: Items<A>, right: Items<B>) -> Self {
        Self {
            left: Some(left),
            right: Some(right),
            latest_left: None,
            latest_right: None,
            done: false,
        }
    }

    fn exhausted(&self) -> bool {
        (self.left.is_none() && self.right.is_none())
            || (self.left.is_none() && self.latest_left.is_none())
            || (self.right.is_none() && self.latest_right.is_none())
    }
}

impl<A: Clone, B: Clone> CombineLatest<A, B> {
    fn pair(&self) -> Option<(A, B)> {
        match (&self.latest_left, &self.latest_right) {
            (Some(a), Some(b)) => Some((a.clone(), b.clone())),
            _ => None,
        }
    }
}

impl<A: Clone, B: Clone> Stream for CombineLatest<A, B> {
    type Item = Item<(A, B)>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }

        loop {
            let mut progressed = false;

            match poll_side(&mut this.left, cx) {
                Ok(Step::Value(value)) => {
                    this.latest_left = Some(value);
                    if let Some(pair) = this.pair() {
                        return Poll::Ready(Some(Ok(pair)));
                    }
                    progressed = true;
                }
                Ok(Step::Ended) => progressed = true,
                Ok(Step::Idle) => {}
                Err(error) => {
                    this.done = true;
                    return Poll::Ready(Some(Err(error)));
                }
            }

            match poll_side(&mut this.right, cx) {
                Ok(Step::Value(value)) => {
                    this.latest_right = Some(value);
                    if let Some(pair) = this.pair() {
                        return Poll::Ready(Some(Ok(pair)));
                    }
                    progressed = true;
                }
                Ok(Step::Ended) => progressed = true,
                Ok(Step::Idle) => {}
                Err(error) => {
                    this.done = true;
                    return Poll::Ready(Some(Err(error)));
                }
            }

            if this.exhausted() {
                this.done = true;
                return Poll::Ready(None);
            }

            if !progressed {
                return Poll::Pending;
            }
        }
    }
}

pub(crate) struct WithLatestFrom<A, B> {
    primary: Option<Items<A>>,
    other: Option<Items<B>>,
    latest: Option<B>,
    done: bool,
}

impl<A, B> Unpin for WithLatestFrom<A, B> {}

impl<A, B> WithLatestFrom<A, B> {
    pub(crate) fn new(primary: Items<A>, other: Items<B>) -> Self {
        Self {
            primary: Some(primary),
            other: Some(other),
            latest: None,
            done: false,
        }
    }
}

impl<A, B: Clone> Stream for WithLatestFrom<A, B> {
    type Item = Item<(A, B)>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }

        loop {
            let mut progressed = false;

            // The other side first, so a value arriving together with a primary value counts.
            match poll_side(&mut this.other, cx) {
                Ok(Step::Value(value)) => {
                    this.latest = Some(value);
                    progressed = true;
                }
                Ok(Step::Ended) => progressed = true,
                Ok(Step::Idle) => {}
                Err(error) => {
                    this.done = true;
                    return Poll::Ready(Some(Err(error)));
                }
            }

            match poll_side(&mut this.primary, cx) {
                Ok(Step::Value(value)) => {
                    if let Some(latest) = &this.latest {
                        return Poll::Ready(Some(Ok((value, latest.clone()))));
                    }
                    progressed = true;
                }
                Ok(Step::Ended) => {
                    this.done = true;
                    return Poll::Ready(None);
                }
                Ok(Step::Idle) => {}
                Err(error) => {
                    this.done = true;
                    return Poll::Ready(Some(Err(error)));
                }
            }

            if !progressed {
                return Poll::Pending;
            }
        }
    }
}

pub(crate) struct SwitchMap<T, U> {
    outer: Option<Items<T>>,
    inner: Option<Items<U>>,
    project: Arc<dyn Fn(T) -> EventStream<U> + Send + Sync>,
    done: bool,
}

impl<T, U> Unpin for SwitchMap<T, U> {}

impl<T, U> SwitchMap<T, U> {
    pub(crate) fn new(outer: Items<T>, project: Arc<dyn Fn(T) -> EventStream<U> + Send + Sync>) -> Self {
        Self {
            outer: Some(outer),
            inner: None,
            project,
            done: false,
        }
    }
}

impl<T, U: Payload> Stream for SwitchMap<T, U> {
    type Item = Item<U>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }

        loop {
            let mut progressed = false;

            match poll_side(&mut this.outer, cx) {
                Ok(Step::Value(value)) => {
                    // Replacing the inner stream drops the previous one.
                    this.inner = Some((this.project.as_ref())(value).open());
                    progressed = true;
                }
                Ok(Step::Ended) => progressed = true,
                Ok(Step::Idle) => {}
                Err(error) => {
                    this.done = true;
                    return Poll::Ready(Some(Err(error)));
                }
            }

            match poll_side(&mut this.inner, cx) {
                Ok(Step::Value(value)) => return Poll::Ready(Some(Ok(value))),
                Ok(Step::Ended) => progressed = true,
                Ok(Step::Idle) => {}
                Err(error) => {
                    this.done = true;
                    return Poll::Ready(Some(Err(error)));
                }
            }

            if this.outer.is_none() && this.inner.is_none() {
                this.done = true;
                return Poll::Ready(None);
            }

            if !progressed {
                return Poll::Pending;
            }
        }
    }
}

pub(crate) struct Delay<T> {
    upstream: Option<Items<T>>,
    duration: Duration,
    queue: VecDeque<(Instant, T)>,
    timer: Option<Pin<Box<Sleep>>>,
    done: bool,
}

impl<T> Unpin for Delay<T> {}

impl<T> Delay<T> {
    pub(crate) fn new(upstream: Items<T>, duration: Duration) -> Self {
        Self {
            upstream: Some(upstream),
            duration,
            queue: VecDeque::new(),
            timer: None,
            done: false,
        }
    }
}

impl<T> Stream for Delay<T> {
    type Item = Item<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }

        loop {
            match poll_side(&mut this.upstream, cx) {
                Ok(Step::Value(value)) => {
                    this.queue.push_back((Instant::now() + this.duration, value));
                }
                Ok(Step::Ended) | Ok(Step::Idle) => break,
                Err(error) => {
                    this.done = true;
                    this.queue.clear();
                    this.timer = None;
                    return Poll::Ready(Some(Err(error)));
                }
            }
        }

        if let Some(deadline) = this.queue.front().map(|(deadline, _)| *deadline) {
            let timer = this
                .timer
                .get_or_insert_with(|| Box::pin(tokio::time::sleep_until(deadline)));
            timer.as_mut().reset(deadline);
            if timer.as_mut().poll(cx).is_ready() {
                if let Some((_, value)) = this.queue.pop_front() {
                    return Poll::Ready(Some(Ok(value)));
                }
            }
            return Poll::Pending;
        }

        if this.upstream.is_none() {
            this.done = true;
            return Poll::Ready(None);
        }

        Poll::Pending
    }
}
