// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the mock override layer.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// A mock schema was selected for this run.
///
/// # Log Level
/// `info!` - Once per run
pub struct MockSchemaSelected<'a> {
    pub schema: &'a str,
    pub entries: usize,
}

impl Display for MockSchemaSelected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Mock schema '{}' active: {} flow(s) replaced",
            self.schema, self.entries
        )
    }
}

impl StructuredLog for MockSchemaSelected<'_> {
    fn log(&self) {
        tracing::info!(schema = self.schema, entries = self.entries, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("mock_schema", span_name = name, schema = self.schema)
    }
}

/// A scripted mock answered one input value.
///
/// # Log Level
/// `debug!` - Per emission
pub struct ScriptedMockFired<'a> {
    pub flow: &'a str,
    pub branch: &'a str,
    pub delay: Duration,
}

impl Display for ScriptedMockFired<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Scripted mock for '{}' emitted on {} after {}ms",
            self.flow,
            self.branch,
            self.delay.as_millis()
        )
    }
}

impl StructuredLog for ScriptedMockFired<'_> {
    fn log(&self) {
        tracing::debug!(
            flow = self.flow,
            branch = self.branch,
            delay_ms = self.delay.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "scripted_mock",
            span_name = name,
            flow = self.flow,
            branch = self.branch,
        )
    }
}
