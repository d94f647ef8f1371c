// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Misuse of the trigger registry.
///
/// Both variants are wiring faults: they show up while flows are being
/// constructed, not while values are flowing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Two sources tried to own the same trigger name.
    #[error("Trigger '{name}' is already registered; a trigger name can only have one source")]
    DuplicateTrigger { name: String },

    /// A trigger name was used with two different payload types.
    #[error("Trigger '{name}' carries '{registered}' payloads but was used as '{requested}'")]
    PayloadMismatch {
        name: String,
        registered: &'static str,
        requested: &'static str,
    },
}
