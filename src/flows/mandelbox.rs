// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Mandelbox creation and the top-level launch flow.
//!
//! `mandelboxFlow` chains two child flows:
//!
//! ```text
//!   launch ──▶ mandelboxCreateFlow ──success──┐
//!     │                                       ├─with latest launch─▶ hostSpinUpFlow ──success──▶ success
//!     └───────────────────────────────────────┘
//!   create.failure ─┬─merge─▶ failure
//!   host.failure  ──┘
//! ```
//!
//! Each created mandelbox is paired with the most recent launch request, so
//! re-emitting a launch after a failure starts a clean attempt.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::engine::{fork, merge_failures, Flow, FlowEngine, FlowName, FlowOutputs, ForkPredicates};
use crate::flows::api::{ApiFailure, ApiResponse, AssignBody, AssignRequest};
use crate::flows::host::{host_spin_up_flow, HostPorts, HostSession, HostSpinUpArgs};
use crate::stream::EventStream;
use crate::traits::MandelboxApi;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MandelboxCreateRequest {
    pub access_token: String,
    pub user_email: String,
    pub regions: Vec<String>,
}

/// The assigned mandelbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MandelboxInfo {
    #[serde(rename = "mandelboxID")]
    pub mandelbox_id: String,
    pub ip: String,
}

pub const MANDELBOX_CREATE_FLOW: FlowName<MandelboxCreateRequest, MandelboxInfo, ApiFailure> =
    FlowName::new("mandelboxCreateFlow");

/// `None` when no request was made because there were no regions.
type AssignOutcome = Option<ApiResponse<AssignBody>>;

fn assigned(outcome: &AssignOutcome) -> bool {
    match outcome {
        Some(response) => {
            matches!(response.status, 200 | 202)
                && response
                    .json
                    .as_ref()
                    .map_or(false, |body| body.mandelbox_id.is_some())
        }
        None => false,
    }
}

/// Request a mandelbox in one of the caller's regions.
///
/// A newer request cancels one still in flight. An empty region list fails
/// without calling the API.
pub fn mandelbox_create_flow(
    engine: &FlowEngine,
    api: Arc<dyn MandelboxApi>,
) -> Flow<MandelboxCreateRequest, MandelboxInfo, ApiFailure> {
    engine.flow(
        MANDELBOX_CREATE_FLOW,
        move |trigger: EventStream<MandelboxCreateRequest>| {
            let api = Arc::clone(&api);
            let outcomes = trigger.switch_map(move |request: MandelboxCreateRequest| {
                if request.regions.is_empty() {
                    return EventStream::of(None);
                }
                let api = Arc::clone(&api);
                let assign = AssignRequest {
                    jwt_access_token: request.access_token,
                    regions: request.regions,
                    user_email: request.user_email,
                };
                EventStream::from_future(move || {
                    let api = Arc::clone(&api);
                    let assign = assign.clone();
                    async move { Some(api.assign(assign).await) }
                })
            });

            let create = fork(
                "mandelboxCreate",
                &outcomes,
                ForkPredicates::new(assigned, |outcome: &AssignOutcome| !assigned(outcome)),
            );

            let success = create.success.filter_map(|outcome: AssignOutcome| {
                let body = outcome?.json?;
                Some(MandelboxInfo {
                    mandelbox_id: body.mandelbox_id?,
                    ip: body.ip.unwrap_or_default(),
                })
            });
            let failure = create.failure.map(|outcome: AssignOutcome| match outcome {
                Some(response) => ApiFailure::from_status("mandelbox assignment", &response),
                None => ApiFailure {
                    status: None,
                    reason: "no regions available".to_string(),
                },
            });

            Ok(FlowOutputs::new(success, failure))
        },
    )
}

/// Input of the launch flow, assembled by the client once it is ready.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MandelboxLaunch {
    pub access_token: String,
    pub config_token: String,
    pub is_new_config_token: bool,
    pub user_email: String,
    pub regions: Vec<String>,
    pub json_data: String,
}

impl MandelboxLaunch {
    fn create_request(&self) -> MandelboxCreateRequest {
        MandelboxCreateRequest {
            access_token: self.access_token.clone(),
            user_email: self.user_email.clone(),
            regions: self.regions.clone(),
        }
    }

    fn host_args(&self, info: &MandelboxInfo) -> HostSpinUpArgs {
        HostSpinUpArgs {
            ip: info.ip.clone(),
            mandelbox_id: info.mandelbox_id.clone(),
            access_token: self.access_token.clone(),
            config_token: self.config_token.clone(),
            is_new_config_token: self.is_new_config_token,
            json_data: self.json_data.clone(),
        }
    }
}

/// A running mandelbox the protocol can connect to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MandelboxSession {
    #[serde(rename = "mandelboxID")]
    pub mandelbox_id: String,
    #[serde(rename = "mandelboxIP")]
    pub mandelbox_ip: String,
    #[serde(rename = "mandelboxSecret")]
    pub mandelbox_secret: String,
    #[serde(rename = "mandelboxPorts")]
    pub mandelbox_ports: HostPorts,
}

impl From<HostSession> for MandelboxSession {
    fn from(session: HostSession) -> Self {
        Self {
            mandelbox_id: session.mandelbox_id,
            mandelbox_ip: session.mandelbox_ip,
            mandelbox_secret: session.mandelbox_secret,
            mandelbox_ports: session.mandelbox_ports,
        }
    }
}

/// Which stage of the launch failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stage", content = "failure", rename_all = "camelCase")]
pub enum MandelboxFlowFailure {
    Create(ApiFailure),
    HostSpinUp(ApiFailure),
}

pub const MANDELBOX_FLOW: FlowName<MandelboxLaunch, MandelboxSession, MandelboxFlowFailure> =
    FlowName::new("mandelboxFlow");

/// Create a mandelbox, then spin up its host.
///
/// Wiring this flow also wires `mandelboxCreateFlow` and `hostSpinUpFlow`,
/// so their outputs are available as triggers of their own.
pub fn mandelbox_flow(
    engine: &FlowEngine,
    api: Arc<dyn MandelboxApi>,
) -> Flow<MandelboxLaunch, MandelboxSession, MandelboxFlowFailure> {
    let children = engine.clone();
    engine.flow(MANDELBOX_FLOW, move |trigger: EventStream<MandelboxLaunch>| {
        let create = mandelbox_create_flow(&children, Arc::clone(&api))
            .call(trigger.map(|launch| launch.create_request()))?;

        let host_input = create
            .success
            .with_latest_from(&trigger)
            .map(|(info, launch)| launch.host_args(&info));
        let host = host_spin_up_flow(&children, Arc::clone(&api)).call(host_input)?;

        let success = host.success.map(MandelboxSession::from);
        let failure = merge_failures(vec![
            create.failure.map(MandelboxFlowFailure::Create),
            host.failure.map(MandelboxFlowFailure::HostSpinUp),
        ]);

        Ok(FlowOutputs::new(success, failure))
    })
}
