// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Debug listings of trigger payloads.
//!
//! A [`DebugSchema`] holds one [`DebugRule`] per trigger name. Watching a
//! trigger logs every value it emits, shaped by the rule's mode:
//!
//! | mode     | logged payload                                   |
//! |----------|--------------------------------------------------|
//! | `value`  | the whole payload as JSON                        |
//! | `silent` | nothing, only the message                        |
//! | `pick`   | only the listed top-level fields                 |
//! | `redact` | the payload with the listed fields masked        |

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::consts::REDACTED;
use crate::config::{DebugConfig, DebugMode, DebugRule};
use crate::errors::RegistryError;
use crate::observability::messages::debug::DebugTriggerEmitted;
use crate::observability::messages::StructuredLog;
use crate::registry::{TriggerKey, TriggerRegistry};
use crate::stream::{Payload, Subscription};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DebugSchema {
    rules: BTreeMap<String, DebugRule>,
}

impl DebugSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(cfg: &DebugConfig) -> Self {
        Self {
            rules: cfg.triggers.clone(),
        }
    }

    pub fn with_rule(mut self, trigger: impl Into<String>, rule: DebugRule) -> Self {
        self.rules.insert(trigger.into(), rule);
        self
    }

    pub fn rule_for(&self, trigger: &str) -> Option<&DebugRule> {
        self.rules.get(trigger)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Log every value of `key` if this schema has a rule for it.
    ///
    /// The returned subscription keeps running when dropped.
    pub fn watch<V>(
        &self,
        registry: &TriggerRegistry,
        key: &TriggerKey<V>,
    ) -> Result<Option<Subscription>, RegistryError>
    where
        V: Payload + Serialize,
    {
        let Some(rule) = self.rule_for(key.name()) else {
            return Ok(None);
        };

        let rule = Arc::new(rule.clone());
        let trigger: Arc<str> = Arc::from(key.name());
        let view = registry.from_trigger(key)?;
        let subscription = view.subscribe(move |value| match serde_json::to_value(&value) {
            Ok(json) => {
                let payload = shape(&rule, &json);
                DebugTriggerEmitted {
                    trigger: &trigger,
                    message: &rule.message,
                    payload: payload.as_ref(),
                }
                .log();
            }
            Err(err) => {
                tracing::warn!(trigger = %trigger, error = %err, "Payload could not be listed");
            }
        });
        Ok(Some(subscription))
    }
}

/// Apply `rule` to a payload; `None` means log the message alone.
pub fn shape(rule: &DebugRule, payload: &Value) -> Option<Value> {
    match rule.mode {
        DebugMode::Value => Some(payload.clone()),
        DebugMode::Silent => None,
        DebugMode::Pick => match payload {
            Value::Object(fields) => {
                let picked: Map<String, Value> = rule
                    .fields
                    .iter()
                    .filter_map(|name| fields.get(name).map(|v| (name.clone(), v.clone())))
                    .collect();
                Some(Value::Object(picked))
            }
            _ => None,
        },
        DebugMode::Redact => match payload {
            Value::Object(fields) => {
                let mut masked = fields.clone();
                for name in &rule.fields {
                    if let Some(value) = masked.get_mut(name) {
                        *value = Value::String(REDACTED.to_string());
                    }
                }
                Some(Value::Object(masked))
            }
            other => Some(other.clone()),
        },
    }
}
