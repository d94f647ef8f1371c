// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod flow;
mod mock;
mod registry;
mod stream;

pub use config::{ConfigError, ValidationError};
pub use flow::FlowError;
pub use mock::MockError;
pub use registry::RegistryError;
pub use stream::{PredicateFault, StreamError};
