// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Configuration validation.
//!
//! Validation walks the whole configuration and collects every problem
//! instead of stopping at the first, so a broken file is fixed in one pass.
//!
//! # Checks
//!
//! 1. **Schema names**: a mock schema name must not be empty or blank.
//! 2. **Scripted outcomes**: each scripted mock sets exactly one of
//!    `success` and `failure`.
//! 3. **Delays**: a scripted delay may not exceed
//!    [`MAX_MOCK_DELAY_MS`](crate::config::consts::MAX_MOCK_DELAY_MS).
//! 4. **Debug rules**: `pick` and `redact` need at least one field.

use crate::config::consts::MAX_MOCK_DELAY_MS;
use crate::config::{DebugMode, EngineConfig};
use crate::errors::ValidationError;

/// Validate `cfg`, returning every problem found.
pub fn validate_config(cfg: &EngineConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (schema, flows) in &cfg.mocks.schemas {
        if schema.trim().is_empty() {
            errors.push(ValidationError::EmptySchemaName);
        }
        for (flow, mock) in flows {
            if mock.success.is_some() == mock.failure.is_some() {
                errors.push(ValidationError::AmbiguousMockOutcome {
                    schema: schema.clone(),
                    flow: flow.clone(),
                });
            }
            if mock.delay_ms > MAX_MOCK_DELAY_MS {
                errors.push(ValidationError::MockDelayTooLong {
                    schema: schema.clone(),
                    flow: flow.clone(),
                    delay_ms: mock.delay_ms,
                    max_ms: MAX_MOCK_DELAY_MS,
                });
            }
        }
    }

    for (trigger, rule) in &cfg.debug.triggers {
        let needs_fields = matches!(rule.mode, DebugMode::Pick | DebugMode::Redact);
        if needs_fields && rule.fields.is_empty() {
            errors.push(ValidationError::DebugRuleWithoutFields {
                trigger: trigger.clone(),
                mode: rule.mode.as_str(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
