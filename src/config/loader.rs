// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::DEFAULT_LOG_LEVEL;
use crate::errors::ConfigError;
use crate::observability::messages::config::{ConfigLoaded, ConfigProblem};
use crate::observability::messages::StructuredLog;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Complete configuration of a flowline run.
///
/// Every section is optional; an empty file is a valid configuration that
/// runs every flow with its real builder and logs at `info`.
///
/// # Fields
/// * `logging` - Log level and output format
/// * `mocks` - Named mock schemas, selectable per run
/// * `debug` - Per-trigger debug listing rules
///
/// # Example
/// ```yaml
/// logging:
///   level: debug
///   format: pretty
/// mocks:
///   schemas:
///     happy_path:
///       mandelboxCreateFlow:
///         delay_ms: 2000
///         success:
///           mandelboxID: "{{uuid}}"
///           ip: "10.0.0.5"
/// debug:
///   triggers:
///     mandelboxCreateFlowSuccess:
///       message: "Mandelbox assigned"
///       mode: value
/// ```
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub logging: LoggingConfig,
    pub mocks: MocksConfig,
    pub debug: DebugConfig,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// An `EnvFilter` directive; `RUST_LOG` takes precedence when set.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Pretty,
    #[default]
    Compact,
}

/// Mock schemas by name, each mapping flow names to scripted replacements.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct MocksConfig {
    pub schemas: BTreeMap<String, BTreeMap<String, ScriptedMockConfig>>,
}

/// One scripted replacement as written in the configuration file.
///
/// Exactly one of `success` and `failure` must be set; validation rejects
/// anything else.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScriptedMockConfig {
    pub delay_ms: u64,
    pub success: Option<serde_json::Value>,
    pub failure: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    pub triggers: BTreeMap<String, DebugRule>,
}

/// How a watched trigger's payloads are listed.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DebugRule {
    pub message: String,
    #[serde(default)]
    pub mode: DebugMode,
    /// Top-level fields used by `pick` and `redact`.
    #[serde(default)]
    pub fields: Vec<String>,
}

#[derive(Debug, Default, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DebugMode {
    /// Log the whole payload.
    #[default]
    Value,
    /// Log only the message.
    Silent,
    /// Log only the listed fields.
    Pick,
    /// Log the payload with the listed fields masked.
    Redact,
}

impl DebugMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DebugMode::Value => "value",
            DebugMode::Silent => "silent",
            DebugMode::Pick => "pick",
            DebugMode::Redact => "redact",
        }
    }
}

/// Serialization format of a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
}

impl ConfigFormat {
    /// Pick the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match extension.as_str() {
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            "toml" => Ok(ConfigFormat::Toml),
            _ => Err(ConfigError::UnsupportedFormat { extension }),
        }
    }
}

/// Parse configuration text in the given format.
pub fn parse_config(content: &str, format: ConfigFormat) -> Result<EngineConfig, ConfigError> {
    let cfg = match format {
        ConfigFormat::Yaml if content.trim().is_empty() => EngineConfig::default(),
        ConfigFormat::Yaml => serde_yaml::from_str(content)?,
        ConfigFormat::Toml => toml::from_str(content)?,
    };
    Ok(cfg)
}

/// Load a configuration file without validating it.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<EngineConfig, ConfigError> {
    let path = path.as_ref();
    let format = ConfigFormat::from_path(path)?;
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content, format)
}

/// Load a configuration file and reject it if validation finds any problem.
///
/// Every problem is logged before the combined error is returned.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<EngineConfig, ConfigError> {
    let path = path.as_ref();
    let cfg = load_config(path)?;
    let display_path = path.display().to_string();

    if let Err(problems) = crate::config::validate_config(&cfg) {
        for problem in &problems {
            ConfigProblem {
                path: &display_path,
                problem,
            }
            .log();
        }
        return Err(ConfigError::Invalid(problems));
    }

    ConfigLoaded {
        path: &display_path,
        mock_schemas: cfg.mocks.schemas.len(),
        debug_rules: cfg.debug.triggers.len(),
    }
    .log();
    Ok(cfg)
}
