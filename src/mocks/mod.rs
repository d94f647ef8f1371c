// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Mock override layer.
//!
//! A [`MockSchema`] maps flow names to replacement builders. Handing one to
//! [`FlowEngine::with_mocks`](crate::engine::FlowEngine::with_mocks) makes
//! every matching flow call the replacement instead of its real builder,
//! while keeping the flow's output trigger names unchanged.
//!
//! Schemas come from two places:
//!
//! * the `mocks.schemas` section of the configuration, as scripted
//!   delay-and-answer entries collected in a [`MockCatalog`],
//! * code, through [`MockSchema::with_builder`], for replacements that need
//!   real logic.

mod catalog;
mod schema;
mod scripted;

pub use catalog::MockCatalog;
pub use schema::MockSchema;
pub use scripted::{render, MockOutcome, ScriptedMock};
