// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Triggers fed by collaborators outside the engine.

use crate::flows::mandelbox::MandelboxLaunch;
use crate::flows::protocol::ProtocolExit;
use crate::registry::TriggerKey;

/// Everything needed to launch: credentials, regions and browser data.
pub const MANDELBOX_FLOW_START: TriggerKey<MandelboxLaunch> =
    TriggerKey::new("mandelboxFlowStart");

/// The streaming protocol process exited.
pub const PROTOCOL_CLOSED: TriggerKey<ProtocolExit> = TriggerKey::new("protocolClosed");

