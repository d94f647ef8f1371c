// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Helpers for wiring multi-stage flows.

use crate::stream::{EventStream, Payload};

/// Pair the n-th value of `a` with the n-th value of `b`.
///
/// A later stage uses this to wait for two independently timed stages.
pub fn zip2<A: Payload, B: Payload>(a: &EventStream<A>, b: &EventStream<B>) -> EventStream<(A, B)> {
    a.zip(b)
}

/// Surface every child failure as a failure of the parent.
///
/// The merged values keep no record of which child failed; tag them first
/// when the consumer needs to know.
pub fn merge_failures<F: Payload>(failures: Vec<EventStream<F>>) -> EventStream<F> {
    EventStream::merge_all(failures)
}

/// Hold `source` back until `signal` has fired once.
///
/// The latest `source` value seen before the signal is released when it
/// fires; later values pass straight through.
pub fn from_signal<T: Payload, U: Payload>(
    source: &EventStream<T>,
    signal: &EventStream<U>,
) -> EventStream<T> {
    source.combine_latest(&signal.take(1)).map(|(value, _)| value)
}

/// Emit the latest `source` value every time `signal` fires.
///
/// Signals that arrive before `source` has emitted are ignored.
pub fn on_signal<T: Payload, U: Payload>(
    source: &EventStream<T>,
    signal: &EventStream<U>,
) -> EventStream<T> {
    signal.with_latest_from(source).map(|(_, value)| value)
}

/// `true` while a request is in flight: on every `request`, `false` on every
/// `success` or `failure`.
pub fn loading_from<R: Payload, S: Payload, F: Payload>(
    request: &EventStream<R>,
    success: &EventStream<S>,
    failure: &EventStream<F>,
) -> EventStream<bool> {
    EventStream::merge_all(vec![
        request.map_to(true),
        success.map_to(false),
        failure.map_to(false),
    ])
}
