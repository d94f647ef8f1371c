// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Scripted stand-ins: a delay and a canned payload.

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::config::consts::UUID_PLACEHOLDER;
use crate::config::ScriptedMockConfig;
use crate::engine::{FlowOutputs, FlowPayload};
use crate::errors::StreamError;
use crate::observability::messages::mock::ScriptedMockFired;
use crate::observability::messages::StructuredLog;
use crate::stream::{EventStream, Payload};

/// Which branch a scripted mock answers on, and with what.
#[derive(Debug, Clone, PartialEq)]
pub enum MockOutcome {
    Success(Value),
    Failure(Value),
}

impl MockOutcome {
    fn branch(&self) -> &'static str {
        match self {
            MockOutcome::Success(_) => "success",
            MockOutcome::Failure(_) => "failure",
        }
    }
}

/// For every input value: wait `delay`, then emit the canned payload on the
/// outcome's branch. The other branch never emits.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedMock {
    pub delay: Duration,
    pub outcome: MockOutcome,
}

impl ScriptedMock {
    pub fn success(delay: Duration, payload: Value) -> Self {
        Self {
            delay,
            outcome: MockOutcome::Success(payload),
        }
    }

    pub fn failure(delay: Duration, payload: Value) -> Self {
        Self {
            delay,
            outcome: MockOutcome::Failure(payload),
        }
    }

    /// `None` unless exactly one outcome is configured.
    pub fn from_config(cfg: &ScriptedMockConfig) -> Option<Self> {
        let delay = Duration::from_millis(cfg.delay_ms);
        match (&cfg.success, &cfg.failure) {
            (Some(payload), None) => Some(Self::success(delay, payload.clone())),
            (None, Some(payload)) => Some(Self::failure(delay, payload.clone())),
            _ => None,
        }
    }

    /// Build the outputs of flow `flow` on `input`.
    pub(crate) fn outputs<T, S, F>(&self, flow: &str, input: EventStream<T>) -> FlowOutputs<S, F>
    where
        T: Payload,
        S: FlowPayload,
        F: FlowPayload,
    {
        let flow: Arc<str> = Arc::from(flow);
        let branch = self.outcome.branch();
        let delay = self.delay;
        let fired = {
            let flow = Arc::clone(&flow);
            input
                .map_to(())
                .delay(delay)
                .inspect(move |_| {
                    ScriptedMockFired {
                        flow: &flow,
                        branch,
                        delay,
                    }
                    .log()
                })
                .share()
        };

        match &self.outcome {
            MockOutcome::Success(template) => FlowOutputs::new(
                answer(&fired, Arc::clone(&flow), template.clone()),
                silent(&fired),
            ),
            MockOutcome::Failure(template) => FlowOutputs::new(
                silent(&fired),
                answer(&fired, flow, template.clone()),
            ),
        }
    }
}

fn answer<V: FlowPayload>(fired: &EventStream<()>, flow: Arc<str>, template: Value) -> EventStream<V> {
    fired.try_map(move |_| {
        serde_json::from_value(render(&template)).map_err(|err| StreamError::Payload {
            origin: flow.to_string(),
            message: err.to_string(),
        })
    })
}

/// Completes with the input, never emits.
fn silent<V: Payload>(fired: &EventStream<()>) -> EventStream<V> {
    fired.filter_map(|_| None)
}

/// Copy `template`, replacing every `{{uuid}}` in its strings with a fresh v4 UUID.
pub fn render(template: &Value) -> Value {
    match template {
        Value::String(text) if text.contains(UUID_PLACEHOLDER) => {
            Value::String(text.replace(UUID_PLACEHOLDER, &uuid::Uuid::new_v4().to_string()))
        }
        Value::Array(items) => Value::Array(items.iter().map(render).collect()),
        Value::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(key, value)| (key.clone(), render(value)))
                .collect(),
        ),
        other => other.clone(),
    }
}
