// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Configuration file used when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "configs/flowline.yaml";
/// Environment variable selecting the active mock schema
pub const MOCK_SCHEMA_ENV: &str = "FLOWLINE_MOCK_SCHEMA";
/// Default tracing level when neither the config nor `RUST_LOG` sets one
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Longest delay a scripted mock may simulate (5 minutes)
pub const MAX_MOCK_DELAY_MS: u64 = 300_000;
/// String placeholder in scripted payloads replaced by a fresh v4 UUID
pub const UUID_PLACEHOLDER: &str = "{{uuid}}";

/// Suffix of the trigger carrying a flow's success output
pub const SUCCESS_SUFFIX: &str = "Success";
/// Suffix of the trigger carrying a flow's failure output
pub const FAILURE_SUFFIX: &str = "Failure";

/// Replacement text for redacted debug fields
pub const REDACTED: &str = "********";
