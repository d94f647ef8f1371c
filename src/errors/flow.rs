// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

use super::{MockError, RegistryError};

/// Errors raised while wiring a flow.
#[derive(Error, Debug)]
pub enum FlowError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Mock(#[from] MockError),

    /// A builder refused to wire its outputs.
    #[error("Flow '{flow}' could not be built: {message}")]
    Builder { flow: String, message: String },
}
