// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Protocol close: classify how the streaming protocol process ended.

use serde::{Deserialize, Serialize};

use crate::engine::{fork, Flow, FlowEngine, FlowName, FlowOutputs, ForkPredicates};
use crate::stream::EventStream;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolExit {
    pub pid: u32,
    /// The process was killed by a signal rather than exiting on its own.
    pub killed: bool,
    pub exit_code: Option<i32>,
}

pub const PROTOCOL_CLOSE_FLOW: FlowName<ProtocolExit, ProtocolExit, ProtocolExit> =
    FlowName::new("protocolCloseFlow");

/// A clean exit is success; a killed process is failure.
pub fn protocol_close_flow(engine: &FlowEngine) -> Flow<ProtocolExit, ProtocolExit, ProtocolExit> {
    engine.flow(PROTOCOL_CLOSE_FLOW, |trigger: EventStream<ProtocolExit>| {
        let exit = fork(
            "protocolClose",
            &trigger,
            ForkPredicates::new(
                |exit: &ProtocolExit| !exit.killed,
                |exit: &ProtocolExit| exit.killed,
            ),
        );
        Ok(FlowOutputs::new(exit.success, exit.failure))
    })
}
