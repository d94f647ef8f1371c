// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Trigger registry: named, multicast event sources shared between flows.
//!
//! The registry is an explicitly constructed handle. Every module that
//! creates or reads triggers receives a clone of it, so nothing depends on
//! load order through a hidden global.
//!
//! ## Deferred binding
//!
//! Each name moves through a small state machine:
//!
//! ```text
//!   (unknown) ──from_trigger / emit_trigger──▶ Pending
//!       │                                        │
//!       └──────create_trigger / create_emitter───┴──▶ Resolved
//! ```
//!
//! A subscriber that looks a name up while it is `Pending` is attached to the
//! same channel the source later feeds, so wiring files may run in any order.
//! A name that stays `Pending` simply never emits; [`TriggerRegistry::pending`]
//! and [`TriggerRegistry::report_unresolved`] make that diagnosable.
//!
//! ## Example
//!
//! ```rust,no_run
//! use the_flowline::registry::{TriggerKey, TriggerRegistry};
//! use the_flowline::stream::EventStream;
//!
//! const PING: TriggerKey<u32> = TriggerKey::new("ping");
//!
//! # async fn run() -> Result<(), the_flowline::errors::RegistryError> {
//! let registry = TriggerRegistry::new();
//! let view = registry.from_trigger(&PING)?;
//! let _subscription = view.subscribe(|value| println!("ping {}", value));
//! registry.create_trigger(&PING, EventStream::from_iter(vec![1, 2, 3]))?;
//! # Ok(())
//! # }
//! ```

mod channel;
mod key;

pub use key::TriggerKey;

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::errors::{RegistryError, StreamError};
use crate::observability::messages::registry::{
    TriggerAwaitingSource, TriggerRegistered, TriggerUnresolved,
};
use crate::observability::messages::StructuredLog;
use crate::stream::{EventStream, Payload};
use channel::{ErasedChannel, TriggerChannel};

/// Who feeds a resolved trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// A stream attached by [`TriggerRegistry::create_trigger`].
    Stream,
    /// An external collaborator holding a [`TriggerEmitter`].
    Emitter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerState {
    Pending,
    Resolved(SourceKind),
}

impl fmt::Display for TriggerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerState::Pending => write!(f, "pending"),
            TriggerState::Resolved(SourceKind::Stream) => write!(f, "resolved(stream)"),
            TriggerState::Resolved(SourceKind::Emitter) => write!(f, "resolved(emitter)"),
        }
    }
}

/// Snapshot of one registry entry, as returned by [`TriggerRegistry::describe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerInfo {
    pub name: String,
    pub payload_type: &'static str,
    pub state: TriggerState,
    pub subscribers: usize,
    pub emitted: u64,
    pub faulted: bool,
}

struct Slot {
    channel: Arc<dyn ErasedChannel>,
    state: TriggerState,
}

/// Handle to the shared trigger table. Clones refer to the same table.
#[derive(Clone, Default)]
pub struct TriggerRegistry {
    slots: Arc<Mutex<HashMap<String, Slot>>>,
}

impl fmt::Debug for TriggerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerRegistry")
            .field("triggers", &self.lock().len())
            .finish()
    }
}

impl TriggerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `key` as a multicast wrapper around `source`.
    ///
    /// `source` is subscribed once, immediately, and every value it emits is
    /// delivered to every subscriber attached at that moment. Its completion
    /// does not complete the trigger; an error faults the trigger for good.
    ///
    /// Returns a view of the trigger, identical to what
    /// [`from_trigger`](Self::from_trigger) would return.
    pub fn create_trigger<T: Payload>(
        &self,
        key: &TriggerKey<T>,
        source: EventStream<T>,
    ) -> Result<EventStream<T>, RegistryError> {
        let channel = self.claim(key, SourceKind::Stream)?;
        channel.attach_source(source);
        Ok(channel.view())
    }

    /// Claim `key` for an external collaborator that pushes values by hand.
    pub fn create_emitter<T: Payload>(
        &self,
        key: &TriggerKey<T>,
    ) -> Result<TriggerEmitter<T>, RegistryError> {
        let channel = self.claim(key, SourceKind::Emitter)?;
        Ok(TriggerEmitter {
            name: key.name().to_string(),
            channel,
        })
    }

    /// A hot view of the named trigger.
    ///
    /// Unknown names are not an error: the view is bound to the trigger as
    /// soon as somebody registers it.
    pub fn from_trigger<T: Payload>(
        &self,
        key: &TriggerKey<T>,
    ) -> Result<EventStream<T>, RegistryError> {
        Ok(self.channel(key)?.view())
    }

    /// Push `value` into the named trigger.
    ///
    /// Returns how many subscribers received it. Emitting into a name nobody
    /// registered yet still reaches whoever is already listening on it.
    pub fn emit_trigger<T: Payload>(
        &self,
        key: &TriggerKey<T>,
        value: T,
    ) -> Result<usize, RegistryError> {
        Ok(self.channel(key)?.publish(value))
    }

    /// Fail if `key` cannot be claimed: already resolved, or known under a
    /// different payload type.
    pub fn ensure_available<T: Payload>(&self, key: &TriggerKey<T>) -> Result<(), RegistryError> {
        let slots = self.lock();
        match slots.get(key.name()) {
            None => Ok(()),
            Some(slot) => {
                check_payload(key, slot)?;
                match slot.state {
                    TriggerState::Pending => Ok(()),
                    TriggerState::Resolved(_) => Err(RegistryError::DuplicateTrigger {
                        name: key.name().to_string(),
                    }),
                }
            }
        }
    }

    pub fn is_resolved(&self, name: &str) -> bool {
        matches!(
            self.lock().get(name).map(|slot| slot.state),
            Some(TriggerState::Resolved(_))
        )
    }

    /// Every known trigger, sorted by name.
    pub fn describe(&self) -> Vec<TriggerInfo> {
        let slots = self.lock();
        let mut infos: Vec<TriggerInfo> = slots
            .iter()
            .map(|(name, slot)| TriggerInfo {
                name: name.clone(),
                payload_type: slot.channel.payload_type(),
                state: slot.state,
                subscribers: slot.channel.subscriber_count(),
                emitted: slot.channel.emitted(),
                faulted: slot.channel.is_faulted(),
            })
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }

    /// Names that were looked up or emitted into but never registered.
    pub fn pending(&self) -> Vec<String> {
        self.describe()
            .into_iter()
            .filter(|info| info.state == TriggerState::Pending)
            .map(|info| info.name)
            .collect()
    }

    /// Log a warning for every pending name; returns how many there were.
    pub fn report_unresolved(&self) -> usize {
        let unresolved: Vec<TriggerInfo> = self
            .describe()
            .into_iter()
            .filter(|info| info.state == TriggerState::Pending)
            .collect();
        for info in &unresolved {
            TriggerUnresolved {
                trigger: &info.name,
                payload_type: info.payload_type,
                subscribers: info.subscribers,
            }
            .log();
        }
        unresolved.len()
    }

    /// Look up or create the channel for `key` without resolving it.
    fn channel<T: Payload>(
        &self,
        key: &TriggerKey<T>,
    ) -> Result<Arc<TriggerChannel<T>>, RegistryError> {
        let mut slots = self.lock();
        if let Some(slot) = slots.get(key.name()) {
            return downcast(key, slot);
        }

        TriggerAwaitingSource {
            trigger: key.name(),
            payload_type: key.payload_type(),
        }
        .log();
        let channel = TriggerChannel::<T>::new(key.name());
        slots.insert(
            key.name().to_string(),
            Slot {
                channel: channel.clone(),
                state: TriggerState::Pending,
            },
        );
        Ok(channel)
    }

    /// Resolve `key`, keeping any subscribers attached while it was pending.
    fn claim<T: Payload>(
        &self,
        key: &TriggerKey<T>,
        kind: SourceKind,
    ) -> Result<Arc<TriggerChannel<T>>, RegistryError> {
        let mut slots = self.lock();
        let (channel, was_pending) = match slots.get_mut(key.name()) {
            Some(slot) => {
                if let TriggerState::Resolved(_) = slot.state {
                    return Err(RegistryError::DuplicateTrigger {
                        name: key.name().to_string(),
                    });
                }
                let channel = downcast(key, slot)?;
                slot.state = TriggerState::Resolved(kind);
                (channel, true)
            }
            None => {
                let channel = TriggerChannel::<T>::new(key.name());
                slots.insert(
                    key.name().to_string(),
                    Slot {
                        channel: channel.clone(),
                        state: TriggerState::Resolved(kind),
                    },
                );
                (channel, false)
            }
        };
        drop(slots);

        TriggerRegistered {
            trigger: key.name(),
            payload_type: key.payload_type(),
            source: kind,
            was_pending,
        }
        .log();
        Ok(channel)
    }
}

fn check_payload<T>(key: &TriggerKey<T>, slot: &Slot) -> Result<(), RegistryError> {
    let registered = slot.channel.payload_type();
    if registered != key.payload_type() {
        return Err(RegistryError::PayloadMismatch {
            name: key.name().to_string(),
            registered,
            requested: key.payload_type(),
        });
    }
    Ok(())
}

fn downcast<T: Payload>(
    key: &TriggerKey<T>,
    slot: &Slot,
) -> Result<Arc<TriggerChannel<T>>, RegistryError> {
    check_payload(key, slot)?;
    Arc::clone(&slot.channel)
        .into_any()
        .downcast::<TriggerChannel<T>>()
        .map_err(|_| RegistryError::PayloadMismatch {
            name: key.name().to_string(),
            registered: slot.channel.payload_type(),
            requested: key.payload_type(),
        })
}

/// Push handle for a trigger owned by an external collaborator.
pub struct TriggerEmitter<T> {
    name: String,
    channel: Arc<TriggerChannel<T>>,
}

impl<T> Clone for TriggerEmitter<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            channel: Arc::clone(&self.channel),
        }
    }
}

impl<T> fmt::Debug for TriggerEmitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerEmitter")
            .field("name", &self.name)
            .finish()
    }
}

impl<T: Payload> TriggerEmitter<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns how many subscribers received `value`.
    pub fn emit(&self, value: T) -> usize {
        self.channel.publish(value)
    }

    /// Fault the trigger. Every current and future subscriber sees `error`.
    pub fn fail(&self, error: StreamError) {
        self.channel.fault(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    const PING: TriggerKey<u32> = TriggerKey::new("ping");

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_trigger_delivers_source_values_in_order() {
        let registry = TriggerRegistry::new();
        registry
            .create_trigger(&PING, EventStream::from_iter(vec![1, 2, 3]))
            .unwrap();
        let items = registry.from_trigger(&PING).unwrap().open();

        let values: Vec<u32> = items.take(3).map(|item| item.unwrap()).collect().await;
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_subscribers_share_one_source_subscription() {
        let registry = TriggerRegistry::new();
        let opened = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = Arc::clone(&opened);
        let source = EventStream::from_fn(move || {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            futures::stream::iter(vec![Ok(7u32)])
        });

        registry.create_trigger(&PING, source).unwrap();
        let first = registry.from_trigger(&PING).unwrap().open();
        let second = registry.from_trigger(&PING).unwrap().open();

        let a: Vec<u32> = first.take(1).map(|item| item.unwrap()).collect().await;
        let b: Vec<u32> = second.take(1).map(|item| item.unwrap()).collect().await;
        assert_eq!(a, vec![7]);
        assert_eq!(b, vec![7]);
        assert_eq!(opened.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_duplicate_registration_keeps_first_source() {
        let registry = TriggerRegistry::new();
        let emitter = registry.create_emitter(&PING).unwrap();

        let err = registry
            .create_trigger(&PING, EventStream::of(99))
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateTrigger {
                name: "ping".to_string()
            }
        );

        let mut items = registry.from_trigger(&PING).unwrap().open();
        settle().await;
        assert_eq!(emitter.emit(5), 1);
        assert_eq!(items.next().await, Some(Ok(5)));
        assert_eq!(
            registry.describe()[0].state,
            TriggerState::Resolved(SourceKind::Emitter)
        );
    }

    #[tokio::test]
    async fn test_lookup_before_registration_binds_later() {
        let registry = TriggerRegistry::new();
        let items = registry.from_trigger(&PING).unwrap().open();
        assert_eq!(registry.pending(), vec!["ping".to_string()]);

        registry
            .create_trigger(&PING, EventStream::from_iter(vec![4, 5]))
            .unwrap();
        assert!(registry.pending().is_empty());

        let values: Vec<u32> = items.take(2).map(|item| item.unwrap()).collect().await;
        assert_eq!(values, vec![4, 5]);
    }

    #[tokio::test]
    async fn test_payload_type_mismatch_is_rejected() {
        let registry = TriggerRegistry::new();
        registry.from_trigger(&PING).unwrap();

        let as_text: TriggerKey<String> = TriggerKey::new("ping");
        let err = registry.from_trigger(&as_text).unwrap_err();
        assert!(matches!(err, RegistryError::PayloadMismatch { .. }));
        assert!(registry.ensure_available(&as_text).is_err());
        assert!(registry.ensure_available(&PING).is_ok());
    }

    #[tokio::test]
    async fn test_source_completion_leaves_trigger_open() {
        let registry = TriggerRegistry::new();
        registry.create_trigger(&PING, EventStream::of(1)).unwrap();
        let mut items = registry.from_trigger(&PING).unwrap().open();

        assert_eq!(items.next().await, Some(Ok(1)));
        settle().await;
        assert_eq!(registry.emit_trigger(&PING, 2).unwrap(), 1);
        assert_eq!(items.next().await, Some(Ok(2)));
    }

    #[tokio::test]
    async fn test_source_error_faults_trigger_for_late_subscribers() {
        let registry = TriggerRegistry::new();
        let error = StreamError::source("ping", "socket closed");
        registry
            .create_trigger(&PING, EventStream::fail(error.clone()))
            .unwrap();
        settle().await;

        let late: Vec<_> = registry.from_trigger(&PING).unwrap().open().collect().await;
        assert_eq!(late, vec![Err(error)]);
        assert_eq!(registry.emit_trigger(&PING, 3).unwrap(), 0);
        assert!(registry.describe()[0].faulted);
    }

    #[tokio::test]
    async fn test_describe_reports_every_trigger() {
        struct TestCase {
            name: &'static str,
            state: TriggerState,
            subscribers: usize,
        }

        let registry = TriggerRegistry::new();
        let closed: TriggerKey<bool> = TriggerKey::new("protocolClosed");
        let resize: TriggerKey<(u32, u32)> = TriggerKey::new("windowResized");
        let _emitter = registry.create_emitter(&closed).unwrap();
        let _watching = registry.from_trigger(&resize).unwrap().open();

        let test_cases = vec![
            TestCase {
                name: "protocolClosed",
                state: TriggerState::Resolved(SourceKind::Emitter),
                subscribers: 0,
            },
            TestCase {
                name: "windowResized",
                state: TriggerState::Pending,
                subscribers: 1,
            },
        ];

        let infos = registry.describe();
        assert_eq!(infos.len(), test_cases.len());
        for (info, case) in infos.iter().zip(test_cases) {
            assert_eq!(info.name, case.name);
            assert_eq!(info.state, case.state, "state of {}", case.name);
            assert_eq!(info.subscribers, case.subscribers, "subscribers of {}", case.name);
        }
        assert_eq!(registry.report_unresolved(), 1);
    }
}
