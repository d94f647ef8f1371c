// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors from the mock override layer.
#[derive(Error, Debug)]
pub enum MockError {
    #[error("Unknown mock schema '{name}' (available: {})", available.join(", "))]
    UnknownSchema { name: String, available: Vec<String> },

    /// A replacement builder was registered for different payload types than the flow declares.
    #[error("Mock for flow '{flow}' has signature '{found}' but the flow expects '{expected}'")]
    SignatureMismatch {
        flow: String,
        expected: String,
        found: String,
    },
}
