// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Declarative reactive flows for a desktop streaming client.
//!
//! Flows are named transformations from one input stream to a success and a
//! failure output. Every output is published under a derived trigger name
//! (`<flow>Success` / `<flow>Failure`) in a [`TriggerRegistry`], so other
//! flows and UI code can subscribe by name before the producer exists.
//! Mock schemas swap real flows for scripted stand-ins without touching the
//! wiring code.

pub mod config;        // configuration loading + validation
pub mod engine;        // flows, fork, composition helpers
pub mod errors;        // error handling
pub mod flows;         // the client's launch and protocol flows
pub mod mocks;         // mock schemas and scripted stand-ins
pub mod observability;
pub mod registry;      // named triggers with deferred binding
pub mod stream;        // cold streams and operators
pub mod traits;        // external service seams

pub use engine::{FlowEngine, FlowName, FlowOutputs};
pub use registry::{TriggerKey, TriggerRegistry};
pub use stream::EventStream;
