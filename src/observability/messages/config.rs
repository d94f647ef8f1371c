// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for configuration loading.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A configuration file was loaded and validated.
///
/// # Log Level
/// `info!` - Once per run
pub struct ConfigLoaded<'a> {
    pub path: &'a str,
    pub mock_schemas: usize,
    pub debug_rules: usize,
}

impl Display for ConfigLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loaded configuration from {}: {} mock schema(s), {} debug rule(s)",
            self.path, self.mock_schemas, self.debug_rules
        )
    }
}

impl StructuredLog for ConfigLoaded<'_> {
    fn log(&self) {
        tracing::info!(
            path = self.path,
            mock_schemas = self.mock_schemas,
            debug_rules = self.debug_rules,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("config", span_name = name, path = self.path)
    }
}

/// A configuration problem found during validation.
///
/// # Log Level
/// `warn!` - Logged for each problem before loading fails
pub struct ConfigProblem<'a> {
    pub path: &'a str,
    pub problem: &'a dyn Display,
}

impl Display for ConfigProblem<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Configuration problem in {}: {}", self.path, self.problem)
    }
}

impl StructuredLog for ConfigProblem<'_> {
    fn log(&self) {
        tracing::warn!(path = self.path, problem = %self.problem, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("config_problem", span_name = name, path = self.path)
    }
}
