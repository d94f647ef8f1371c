// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for flow wiring and output events.
//!
//! This module contains message types for logging events related to:
//! * Flow wiring (real or mocked builder)
//! * Emissions on a flow's success and failure outputs, with timing
//! * Outputs terminated by an error

use crate::errors::{FlowError, StreamError};
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// A flow was wired into the registry.
///
/// # Log Level
/// `info!` - Happens once per flow
///
/// # Example
/// ```
/// use the_flowline::observability::messages::flow::FlowWired;
///
/// let msg = FlowWired {
///     flow: "mandelboxCreateFlow",
///     mock_schema: Some("happy_path"),
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct FlowWired<'a> {
    pub flow: &'a str,
    pub mock_schema: Option<&'a str>,
}

impl Display for FlowWired<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.mock_schema {
            Some(schema) => write!(
                f,
                "Wired flow '{}' with mock from schema '{}'",
                self.flow, schema
            ),
            None => write!(f, "Wired flow '{}'", self.flow),
        }
    }
}

impl StructuredLog for FlowWired<'_> {
    fn log(&self) {
        tracing::info!(
            flow = self.flow,
            mocked = self.mock_schema.is_some(),
            mock_schema = self.mock_schema,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "flow",
            span_name = name,
            flow = self.flow,
            mocked = self.mock_schema.is_some(),
        )
    }
}

/// A flow output emitted a value.
///
/// # Log Level
/// `debug!` - Per emission
pub struct FlowEmitted<'a> {
    pub trigger: &'a str,
    pub elapsed: Duration,
}

impl Display for FlowEmitted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} emitted {}ms after the flow was started",
            self.trigger,
            self.elapsed.as_millis()
        )
    }
}

impl StructuredLog for FlowEmitted<'_> {
    fn log(&self) {
        tracing::debug!(
            trigger = self.trigger,
            elapsed_ms = self.elapsed.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("flow_emitted", span_name = name, trigger = self.trigger)
    }
}

/// A flow output terminated with an error.
///
/// # Log Level
/// `warn!` - The output will not emit again
pub struct FlowOutputFailed<'a> {
    pub trigger: &'a str,
    pub error: &'a StreamError,
}

impl Display for FlowOutputFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{} terminated: {}", self.trigger, self.error)
    }
}

impl StructuredLog for FlowOutputFailed<'_> {
    fn log(&self) {
        tracing::warn!(trigger = self.trigger, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("flow_output_failed", span_name = name, trigger = self.trigger)
    }
}

/// A flow could not be wired.
///
/// # Log Level
/// `error!` - Wiring fault
pub struct FlowWiringFailed<'a> {
    pub flow: &'a str,
    pub error: &'a FlowError,
}

impl Display for FlowWiringFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Failed to wire flow '{}': {}", self.flow, self.error)
    }
}

impl StructuredLog for FlowWiringFailed<'_> {
    fn log(&self) {
        tracing::error!(flow = self.flow, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("flow_wiring_failed", span_name = name, flow = self.flow)
    }
}
