// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::flows::api::{
    ApiResponse, AssignBody, AssignRequest, HostSpinUpBody, HostSpinUpRequest,
};

/// The webserver and host-service calls the mandelbox flows depend on.
///
/// Implementations never fail outright: transport problems are reported as
/// a response status so the flows can route them to their failure branch.
#[async_trait]
pub trait MandelboxApi: Send + Sync {
    /// Ask the webserver to assign a mandelbox in one of the regions.
    async fn assign(&self, req: AssignRequest) -> ApiResponse<AssignBody>;

    /// Ask the host service on the assigned instance to start the mandelbox.
    async fn spin_up(&self, req: HostSpinUpRequest) -> ApiResponse<HostSpinUpBody>;

    fn name(&self) -> &'static str;
}
