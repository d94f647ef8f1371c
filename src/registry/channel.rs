// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use futures::future::ready;
use futures::stream::{self, StreamExt};
use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::errors::StreamError;
use crate::observability::messages::registry::{TriggerFaulted, TriggerSourceCompleted};
use crate::observability::messages::StructuredLog;
use crate::stream::{EventStream, Hub, Items, Payload};

/// The multicast channel behind one trigger name.
pub(crate) struct TriggerChannel<T> {
    name: String,
    hub: Arc<Hub<T>>,
    fault: Mutex<Option<StreamError>>,
    emitted: AtomicU64,
}

impl<T: Payload> TriggerChannel<T> {
    pub(crate) fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            hub: Hub::new(),
            fault: Mutex::new(None),
            emitted: AtomicU64::new(0),
        })
    }

    fn current_fault(&self) -> Option<StreamError> {
        self.fault
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// A hot view: values are observed from the moment the view is opened.
    pub(crate) fn view(self: &Arc<Self>) -> EventStream<T> {
        let channel = Arc::clone(self);
        EventStream::from_fn(move || -> Items<T> {
            // Attaching under the fault lock means a concurrent fault either
            // is seen here or reaches the new receiver through the hub.
            let fault = channel.fault.lock().unwrap_or_else(PoisonError::into_inner);
            match fault.as_ref() {
                Some(error) => stream::once(ready(Err(error.clone()))).boxed(),
                None => channel.hub.attach().boxed(),
            }
        })
    }

    pub(crate) fn publish(&self, value: T) -> usize {
        if self.current_fault().is_some() {
            return 0;
        }
        self.emitted.fetch_add(1, Ordering::Relaxed);
        self.hub.publish(value)
    }

    pub(crate) fn fault(&self, error: StreamError) {
        TriggerFaulted {
            trigger: &self.name,
            error: &error,
        }
        .log();
        let mut fault = self.fault.lock().unwrap_or_else(PoisonError::into_inner);
        *fault = Some(error.clone());
        self.hub.fail(error);
    }

    /// Subscribe `source` once and forward everything it emits.
    ///
    /// Completion of the source leaves the trigger open.
    pub(crate) fn attach_source(self: &Arc<Self>, source: EventStream<T>) {
        let mut items = source.open();
        let channel = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(item) = items.next().await {
                match item {
                    Ok(value) => {
                        channel.publish(value);
                    }
                    Err(error) => {
                        channel.fault(error);
                        return;
                    }
                }
            }
            TriggerSourceCompleted {
                trigger: &channel.name,
                emitted: channel.emitted.load(Ordering::Relaxed),
            }
            .log();
        });
    }
}

/// Type-erased access to a channel for bookkeeping and introspection.
pub(crate) trait ErasedChannel: Send + Sync {
    fn payload_type(&self) -> &'static str;
    fn subscriber_count(&self) -> usize;
    fn emitted(&self) -> u64;
    fn is_faulted(&self) -> bool;
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Payload> ErasedChannel for TriggerChannel<T> {
    fn payload_type(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn subscriber_count(&self) -> usize {
        self.hub.subscriber_count()
    }

    fn emitted(&self) -> u64 {
        self.emitted.load(Ordering::Relaxed)
    }

    fn is_faulted(&self) -> bool {
        self.current_fault().is_some()
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
