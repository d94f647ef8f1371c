// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The desktop client's flows.
//!
//! Collaborators push into [`MANDELBOX_FLOW_START`] and [`PROTOCOL_CLOSED`];
//! consumers subscribe to the derived output triggers, e.g.
//! `mandelboxFlowSuccess` or `protocolCloseFlowFailure`.

pub mod api;
pub mod host;
pub mod mandelbox;
pub mod protocol;
pub mod triggers;

use std::sync::Arc;

use crate::engine::{FlowEngine, FlowOutputs};
use crate::errors::{FlowError, RegistryError};
use crate::registry::{TriggerEmitter, TriggerRegistry};
use crate::traits::MandelboxApi;

pub use api::{ApiFailure, OfflineApi};
pub use host::{host_spin_up_flow, HostSession, HostSpinUpArgs, HOST_SPIN_UP_FLOW};
pub use mandelbox::{
    mandelbox_create_flow, mandelbox_flow, MandelboxCreateRequest, MandelboxFlowFailure,
    MandelboxInfo, MandelboxLaunch, MandelboxSession, MANDELBOX_CREATE_FLOW, MANDELBOX_FLOW,
};
pub use protocol::{protocol_close_flow, ProtocolExit, PROTOCOL_CLOSE_FLOW};
pub use triggers::{MANDELBOX_FLOW_START, PROTOCOL_CLOSED};

/// Outputs of every top-level client flow.
#[derive(Debug, Clone)]
pub struct ClientFlows {
    pub mandelbox: FlowOutputs<MandelboxSession, MandelboxFlowFailure>,
    pub protocol_close: FlowOutputs<ProtocolExit, ProtocolExit>,
}

/// Wire every client flow onto its collaborator trigger.
///
/// The input triggers may be registered before or after this call.
pub fn wire_client_flows(
    engine: &FlowEngine,
    api: Arc<dyn MandelboxApi>,
) -> Result<ClientFlows, FlowError> {
    let registry = engine.registry();
    let mandelbox = mandelbox_flow(engine, api).call(registry.from_trigger(&MANDELBOX_FLOW_START)?)?;
    let protocol_close = protocol_close_flow(engine).call(registry.from_trigger(&PROTOCOL_CLOSED)?)?;
    Ok(ClientFlows {
        mandelbox,
        protocol_close,
    })
}

/// Emitters for the collaborator-facing input triggers.
#[derive(Debug)]
pub struct ClientInputs {
    pub mandelbox_start: TriggerEmitter<MandelboxLaunch>,
    pub protocol_closed: TriggerEmitter<ProtocolExit>,
}

/// Register an emitter for every input trigger the client flows consume.
pub fn client_inputs(registry: &TriggerRegistry) -> Result<ClientInputs, RegistryError> {
    Ok(ClientInputs {
        mandelbox_start: registry.create_emitter(&MANDELBOX_FLOW_START)?,
        protocol_closed: registry.create_emitter(&PROTOCOL_CLOSED)?,
    })
}
