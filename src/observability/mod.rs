// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability: structured logging and the debug schema.
//!
//! Log messages are centralized struct types with a `Display`
//! implementation, so call sites carry no magic strings and every event has
//! the same fields wherever it is logged.
//!
//! # Architecture
//!
//! * `messages` - one struct per loggable event, grouped by subsystem
//! * `logging` - installation of the `tracing` subscriber for the binary
//! * `debug` - per-trigger payload listings configured in the `debug`
//!   section of the configuration
//!
//! # Usage
//!
//! ```rust
//! use the_flowline::observability::messages::StructuredLog;
//! use the_flowline::observability::messages::fork::PredicateFaulted;
//!
//! PredicateFaulted {
//!     fork: "hostSpinUp",
//!     message: "response had no json body",
//! }
//! .log();
//! ```

pub mod debug;
pub mod logging;
pub mod messages;

pub use debug::DebugSchema;
pub use logging::init_tracing;
