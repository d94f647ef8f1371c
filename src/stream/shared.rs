// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Fan-out hub shared by the `share` operator and the trigger registry.

use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::{EventStream, Item, Payload};
use crate::errors::StreamError;

/// Delivers every published notification to every attached receiver.
pub(crate) struct Hub<T> {
    state: Mutex<HubState<T>>,
}

struct HubState<T> {
    subscribers: Vec<(u64, mpsc::UnboundedSender<Item<T>>)>,
    next_id: u64,
    /// Upstream connection owned by `share`; cancelled when the last receiver leaves.
    connection: Option<CancellationToken>,
}

impl<T: Payload> Hub<T> {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(HubState {
                subscribers: Vec::new(),
                next_id: 0,
                connection: None,
            }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, HubState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn attach(self: &Arc<Self>) -> HubReceiver<T> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut state = self.lock();
        let id = state.next_id;
        state.next_id += 1;
        state.subscribers.push((id, sender));
        HubReceiver {
            receiver,
            id,
            hub: Arc::clone(self),
        }
    }

    /// Publish a value; returns how many receivers got it.
    pub(crate) fn publish(&self, value: T) -> usize {
        let mut state = self.lock();
        state
            .subscribers
            .retain(|(_, sender)| sender.send(Ok(value.clone())).is_ok());
        state.subscribers.len()
    }

    /// Deliver `error` to every receiver and end them.
    pub(crate) fn fail(&self, error: StreamError) {
        self.finish(Some(error));
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    /// End every receiver, optionally with an error, and forget the upstream connection.
    fn finish(&self, error: Option<StreamError>) {
        let mut state = self.lock();
        state.connection = None;
        for (_, sender) in state.subscribers.drain(..) {
            if let Some(error) = &error {
                let _ = sender.send(Err(error.clone()));
            }
        }
    }

    fn detach(&self, id: u64) {
        let mut state = self.lock();
        state.subscribers.retain(|(subscriber, _)| *subscriber != id);
        if state.subscribers.is_empty() {
            if let Some(connection) = state.connection.take() {
                connection.cancel();
            }
        }
    }

    /// Connect `source` unless a connection is already live.
    fn connect(self: &Arc<Self>, source: &EventStream<T>) {
        let token = {
            let mut state = self.lock();
            if state.connection.is_some() {
                return;
            }
            let token = CancellationToken::new();
            state.connection = Some(token.clone());
            token
        };

        let mut items = source.open();
        let hub = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => return,
                    item = items.next() => match item {
                        Some(Ok(value)) => {
                            hub.publish(value);
                        }
                        Some(Err(error)) => {
                            hub.finish(Some(error));
                            return;
                        }
                        None => {
                            hub.finish(None);
                            return;
                        }
                    }
                }
            }
        });
    }
}

/// One subscriber's view of a hub.
pub(crate) struct HubReceiver<T: Payload> {
    receiver: mpsc::UnboundedReceiver<Item<T>>,
    id: u64,
    hub: Arc<Hub<T>>,
}

impl<T: Payload> Unpin for HubReceiver<T> {}

impl<T: Payload> Stream for HubReceiver<T> {
    type Item = Item<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl<T: Payload> Drop for HubReceiver<T> {
    fn drop(&mut self) {
        self.hub.detach(self.id);
    }
}

pub(super) fn share<T: Payload>(source: EventStream<T>) -> EventStream<T> {
    let hub = Hub::new();
    EventStream::from_fn(move || {
        let receiver = hub.attach();
        hub.connect(&source);
        receiver
    })
}
