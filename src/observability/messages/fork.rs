// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for fork classification events.

use crate::observability::messages::StructuredLog;
use std::fmt::{Debug, Display, Formatter};
use tracing::Span;

/// A value matched neither the success nor the failure predicate.
///
/// # Log Level
/// `debug!` - Expected for intermediate states
pub struct ForkUnmatched<'a> {
    pub fork: &'a str,
    pub value: &'a dyn Debug,
}

impl Display for ForkUnmatched<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Fork '{}' dropped a value matching neither branch: {:?}",
            self.fork, self.value
        )
    }
}

impl StructuredLog for ForkUnmatched<'_> {
    fn log(&self) {
        tracing::debug!(fork = self.fork, value = ?self.value, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("fork_unmatched", span_name = name, fork = self.fork)
    }
}

/// A predicate faulted; both branches terminate.
///
/// # Log Level
/// `error!` - Fatal to the fork
pub struct PredicateFaulted<'a> {
    pub fork: &'a str,
    pub message: &'a str,
}

impl Display for PredicateFaulted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Predicate of fork '{}' faulted, terminating both branches: {}",
            self.fork, self.message
        )
    }
}

impl StructuredLog for PredicateFaulted<'_> {
    fn log(&self) {
        tracing::error!(fork = self.fork, message = self.message, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("predicate_faulted", span_name = name, fork = self.fork)
    }
}
