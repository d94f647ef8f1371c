// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Every diagnostic the engine emits is a small struct with a `Display`
//! implementation for the human-readable line and a [`StructuredLog`]
//! implementation that attaches the same data as tracing fields at the
//! documented level.
//!
//! # Organization
//!
//! * `registry` - trigger registration, binding and faults
//! * `fork` - classification gaps and predicate faults
//! * `flow` - flow wiring and output emissions
//! * `mock` - mock schema selection and scripted emissions
//! * `debug` - debug schema listings of trigger payloads
//! * `config` - configuration loading
//!
//! # Usage Pattern
//!
//! ```rust
//! use the_flowline::observability::messages::StructuredLog;
//! use the_flowline::observability::messages::registry::TriggerUnresolved;
//!
//! let msg = TriggerUnresolved {
//!     trigger: "mandelboxFlowStart",
//!     payload_type: "MandelboxLaunch",
//!     subscribers: 2,
//! };
//!
//! msg.log();
//! tracing::warn!("{}", msg);
//! ```

use tracing::Span;

pub mod config;
pub mod debug;
pub mod flow;
pub mod fork;
pub mod mock;
pub mod registry;

/// A message that knows its own level and structured fields.
pub trait StructuredLog {
    /// Emit the message at its documented level.
    fn log(&self);

    /// Build a span carrying the message's fields.
    fn span(&self, name: &str) -> Span;
}
