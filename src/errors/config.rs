// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading the engine configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unsupported config format '{extension}' (expected yaml, yml or toml)")]
    UnsupportedFormat { extension: String },

    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    Invalid(Vec<ValidationError>),
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// A single problem found by config validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A scripted mock must choose exactly one branch.
    #[error("Mock '{schema}.{flow}' must set exactly one of 'success' or 'failure'")]
    AmbiguousMockOutcome { schema: String, flow: String },

    #[error("Mock '{schema}.{flow}' delay of {delay_ms}ms exceeds the limit of {max_ms}ms")]
    MockDelayTooLong {
        schema: String,
        flow: String,
        delay_ms: u64,
        max_ms: u64,
    },

    #[error("Mock schema names must not be empty")]
    EmptySchemaName,

    /// `pick` and `redact` rules are meaningless without fields.
    #[error("Debug rule for trigger '{trigger}' uses '{mode}' without any fields")]
    DebugRuleWithoutFields { trigger: String, mode: &'static str },
}
