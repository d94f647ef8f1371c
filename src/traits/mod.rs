// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod mandelbox_api;

pub use mandelbox_api::MandelboxApi;
