// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for debug schema listings.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A watched trigger emitted; `payload` is already shaped by its rule.
///
/// # Log Level
/// `info!` - Only emitted for triggers the debug schema names
pub struct DebugTriggerEmitted<'a> {
    pub trigger: &'a str,
    pub message: &'a str,
    pub payload: Option<&'a serde_json::Value>,
}

impl Display for DebugTriggerEmitted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.payload {
            Some(payload) => write!(f, "[{}] {} {}", self.trigger, self.message, payload),
            None => write!(f, "[{}] {}", self.trigger, self.message),
        }
    }
}

impl StructuredLog for DebugTriggerEmitted<'_> {
    fn log(&self) {
        match self.payload {
            Some(payload) => tracing::info!(
                trigger = self.trigger,
                payload = %payload,
                "{}", self
            ),
            None => tracing::info!(trigger = self.trigger, "{}", self),
        }
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("debug_trigger", span_name = name, trigger = self.trigger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_includes_payload_when_present() {
        let payload = json!({ "ip": "10.0.0.5" });
        let with = DebugTriggerEmitted {
            trigger: "mandelboxCreateFlowSuccess",
            message: "Mandelbox assigned",
            payload: Some(&payload),
        };
        let without = DebugTriggerEmitted {
            trigger: "protocolCloseFlowSuccess",
            message: "Protocol closed",
            payload: None,
        };

        assert_eq!(
            with.to_string(),
            "[mandelboxCreateFlowSuccess] Mandelbox assigned {\"ip\":\"10.0.0.5\"}"
        );
        assert_eq!(without.to_string(), "[protocolCloseFlowSuccess] Protocol closed");
    }
}
