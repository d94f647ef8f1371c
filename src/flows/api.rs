// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Request and response shapes exchanged with the webserver and host service.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::traits::MandelboxApi;

/// HTTP status plus the decoded JSON body, if there was one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<B> {
    pub status: u16,
    pub json: Option<B>,
}

impl<B> ApiResponse<B> {
    pub fn with_body(status: u16, body: B) -> Self {
        Self {
            status,
            json: Some(body),
        }
    }

    pub fn status_only(status: u16) -> Self {
        Self { status, json: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignRequest {
    pub jwt_access_token: String,
    pub regions: Vec<String>,
    pub user_email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignBody {
    pub mandelbox_id: Option<String>,
    pub ip: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostSpinUpRequest {
    pub ip: String,
    pub mandelbox_id: String,
    pub jwt_access_token: String,
    pub config_encryption_token: String,
    pub is_new_config_encryption_token: bool,
    pub json_data: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostSpinUpBody {
    pub result: Option<HostSpinUpResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostSpinUpResult {
    pub aes_key: String,
    pub port_32262: u16,
    pub port_32263: u16,
    pub port_32273: u16,
}

/// Failure payload shared by the mandelbox flows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiFailure {
    /// `None` when no request was made.
    pub status: Option<u16>,
    pub reason: String,
}

impl ApiFailure {
    pub fn from_status<B>(call: &str, response: &ApiResponse<B>) -> Self {
        Self {
            status: Some(response.status),
            reason: format!("{} returned status {}", call, response.status),
        }
    }
}

/// An API that answers every call with `503 Service Unavailable`.
///
/// Lets the binary run the whole pipeline without a network; pair it with a
/// mock schema to see the success path.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineApi;

pub const OFFLINE_STATUS: u16 = 503;

#[async_trait]
impl MandelboxApi for OfflineApi {
    async fn assign(&self, _req: AssignRequest) -> ApiResponse<AssignBody> {
        ApiResponse::status_only(OFFLINE_STATUS)
    }

    async fn spin_up(&self, _req: HostSpinUpRequest) -> ApiResponse<HostSpinUpBody> {
        ApiResponse::status_only(OFFLINE_STATUS)
    }

    fn name(&self) -> &'static str {
        "offline"
    }
}
