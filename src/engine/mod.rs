// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod compose;
pub mod flow;
pub mod fork;
#[cfg(test)]
mod integration_tests;

pub use compose::{from_signal, loading_from, merge_failures, on_signal, zip2};
pub use flow::{Flow, FlowBuilder, FlowEngine, FlowName, FlowOutputs, FlowPayload};
pub use fork::{fork, Branch, Fork, ForkPredicates};
