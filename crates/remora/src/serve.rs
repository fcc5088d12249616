// SPDX-FileCopyrightText: 2026 Remora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `remora serve` command implementation.

use std::sync::Arc;

use tracing::info;

use remora_agent::{Agent, ExtractiveProvider};
use remora_config::model::RemoraConfig;
use remora_core::traits::SystemClock;
use remora_core::RemoraError;

/// Run the HTTP gateway until the process is terminated.
pub async fn run_serve(config: RemoraConfig) -> Result<(), RemoraError> {
    let gateway_config = config.gateway.clone();
    let agent = Agent::new(
        config,
        Arc::new(ExtractiveProvider::new()),
        Arc::new(SystemClock),
    )
    .await?;
    let agent = Arc::new(agent);

    info!(
        bind = %gateway_config.bind_address,
        port = gateway_config.port,
        "starting gateway"
    );
    remora_gateway::start_server(&gateway_config, agent).await
}
