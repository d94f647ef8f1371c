// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for trigger registry events.
//!
//! This module contains message types for logging events related to:
//! * Trigger registration and deferred binding
//! * Source completion and faults
//! * Names that were used but never registered

use crate::errors::StreamError;
use crate::observability::messages::StructuredLog;
use crate::registry::SourceKind;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A trigger name received its source.
///
/// # Log Level
/// `info!` - Wiring event, happens once per name
pub struct TriggerRegistered<'a> {
    pub trigger: &'a str,
    pub payload_type: &'a str,
    pub source: SourceKind,
    pub was_pending: bool,
}

impl Display for TriggerRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Registered trigger '{}' ({:?} source, payload {})",
            self.trigger, self.source, self.payload_type
        )?;
        if self.was_pending {
            write!(f, ", binding waiting subscribers")?;
        }
        Ok(())
    }
}

impl StructuredLog for TriggerRegistered<'_> {
    fn log(&self) {
        tracing::info!(
            trigger = self.trigger,
            payload_type = self.payload_type,
            source = ?self.source,
            was_pending = self.was_pending,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "trigger_registered",
            span_name = name,
            trigger = self.trigger,
            source = ?self.source,
        )
    }
}

/// A name was looked up or emitted into before anybody registered it.
///
/// # Log Level
/// `debug!` - Normal when wiring files load out of order
pub struct TriggerAwaitingSource<'a> {
    pub trigger: &'a str,
    pub payload_type: &'a str,
}

impl Display for TriggerAwaitingSource<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Trigger '{}' is not registered yet; subscribers will bind when it is",
            self.trigger
        )
    }
}

impl StructuredLog for TriggerAwaitingSource<'_> {
    fn log(&self) {
        tracing::debug!(
            trigger = self.trigger,
            payload_type = self.payload_type,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("trigger_pending", span_name = name, trigger = self.trigger)
    }
}

/// The source behind a trigger failed; the trigger is faulted for good.
///
/// # Log Level
/// `error!` - Every subscriber of the trigger is terminated
pub struct TriggerFaulted<'a> {
    pub trigger: &'a str,
    pub error: &'a StreamError,
}

impl Display for TriggerFaulted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Trigger '{}' faulted: {}", self.trigger, self.error)
    }
}

impl StructuredLog for TriggerFaulted<'_> {
    fn log(&self) {
        tracing::error!(
            trigger = self.trigger,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "trigger_faulted",
            span_name = name,
            trigger = self.trigger,
            error = %self.error,
        )
    }
}

/// The source behind a trigger completed. The trigger itself stays open.
///
/// # Log Level
/// `debug!` - Informational
pub struct TriggerSourceCompleted<'a> {
    pub trigger: &'a str,
    pub emitted: u64,
}

impl Display for TriggerSourceCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Source of trigger '{}' completed after {} values",
            self.trigger, self.emitted
        )
    }
}

impl StructuredLog for TriggerSourceCompleted<'_> {
    fn log(&self) {
        tracing::debug!(trigger = self.trigger, emitted = self.emitted, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "trigger_source_completed",
            span_name = name,
            trigger = self.trigger,
        )
    }
}

/// A trigger was used but nothing ever registered it.
///
/// # Log Level
/// `warn!` - Its subscribers will never see a value
///
/// # Example
/// ```
/// use the_flowline::observability::messages::registry::TriggerUnresolved;
///
/// let msg = TriggerUnresolved {
///     trigger: "powerResume",
///     payload_type: "()",
///     subscribers: 1,
/// };
///
/// assert!(msg.to_string().contains("powerResume"));
/// ```
pub struct TriggerUnresolved<'a> {
    pub trigger: &'a str,
    pub payload_type: &'a str,
    pub subscribers: usize,
}

impl Display for TriggerUnresolved<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Trigger '{}' was never registered; {} subscriber(s) will never receive a value",
            self.trigger, self.subscribers
        )
    }
}

impl StructuredLog for TriggerUnresolved<'_> {
    fn log(&self) {
        tracing::warn!(
            trigger = self.trigger,
            payload_type = self.payload_type,
            subscribers = self.subscribers,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "trigger_unresolved",
            span_name = name,
            trigger = self.trigger,
            subscribers = self.subscribers,
        )
    }
}
