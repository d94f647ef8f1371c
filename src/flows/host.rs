// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Host spin-up: ask the assigned instance to start the mandelbox.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::engine::{fork, Flow, FlowEngine, FlowName, FlowOutputs, ForkPredicates};
use crate::flows::api::{ApiFailure, ApiResponse, HostSpinUpBody, HostSpinUpRequest};
use crate::stream::EventStream;
use crate::traits::MandelboxApi;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostSpinUpArgs {
    pub ip: String,
    #[serde(rename = "mandelboxID")]
    pub mandelbox_id: String,
    pub access_token: String,
    pub config_token: String,
    pub is_new_config_token: bool,
    pub json_data: String,
}

impl From<&HostSpinUpArgs> for HostSpinUpRequest {
    fn from(args: &HostSpinUpArgs) -> Self {
        HostSpinUpRequest {
            ip: args.ip.clone(),
            mandelbox_id: args.mandelbox_id.clone(),
            jwt_access_token: args.access_token.clone(),
            config_encryption_token: args.config_token.clone(),
            is_new_config_encryption_token: args.is_new_config_token,
            json_data: args.json_data.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostPorts {
    pub port_32262: u16,
    pub port_32263: u16,
    pub port_32273: u16,
}

/// A started mandelbox, ready for the protocol to connect to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostSession {
    #[serde(rename = "mandelboxID")]
    pub mandelbox_id: String,
    #[serde(rename = "mandelboxIP")]
    pub mandelbox_ip: String,
    #[serde(rename = "mandelboxSecret")]
    pub mandelbox_secret: String,
    #[serde(rename = "mandelboxPorts")]
    pub mandelbox_ports: HostPorts,
}

pub const HOST_SPIN_UP_FLOW: FlowName<HostSpinUpArgs, HostSession, ApiFailure> =
    FlowName::new("hostSpinUpFlow");

type SpinUpResponse = ApiResponse<HostSpinUpBody>;

/// A response together with the request arguments that produced it.
type SpinUpReply = (HostSpinUpArgs, SpinUpResponse);

fn has_result(response: &SpinUpResponse) -> bool {
    response
        .json
        .as_ref()
        .map_or(false, |body| body.result.is_some())
}

/// Success on `200` with a result, failure on any other status.
///
/// A `200` without a result matches neither branch and is dropped. Every
/// session is built from the arguments of the request it answers, so a
/// retried launch never mixes with an earlier attempt.
pub fn host_spin_up_flow(
    engine: &FlowEngine,
    api: Arc<dyn MandelboxApi>,
) -> Flow<HostSpinUpArgs, HostSession, ApiFailure> {
    engine.flow(HOST_SPIN_UP_FLOW, move |trigger: EventStream<HostSpinUpArgs>| {
        let api = Arc::clone(&api);
        let replies = trigger.switch_map(move |args: HostSpinUpArgs| {
            let api = Arc::clone(&api);
            EventStream::from_future(move || {
                let api = Arc::clone(&api);
                let args = args.clone();
                async move {
                    let response = api.spin_up(HostSpinUpRequest::from(&args)).await;
                    (args, response)
                }
            })
        });

        let spin = fork(
            "hostSpinUp",
            &replies,
            ForkPredicates::new(
                |(_, response): &SpinUpReply| response.status == 200 && has_result(response),
                |(_, response): &SpinUpReply| response.status != 200,
            ),
        );

        let success = spin.success.filter_map(|(args, response)| {
            let result = response.json?.result?;
            Some(HostSession {
                mandelbox_id: args.mandelbox_id,
                mandelbox_ip: args.ip,
                mandelbox_secret: result.aes_key,
                mandelbox_ports: HostPorts {
                    port_32262: result.port_32262,
                    port_32263: result.port_32263,
                    port_32273: result.port_32273,
                },
            })
        });
        let failure = spin
            .failure
            .map(|(_, response)| ApiFailure::from_status("host spin-up", &response));

        Ok(FlowOutputs::new(success, failure))
    })
}
