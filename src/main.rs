// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{bail, Context, Result};
use clap::Parser;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use the_flowline::config::consts::{DEFAULT_CONFIG_PATH, MOCK_SCHEMA_ENV};
use the_flowline::config::load_and_validate_config;
use the_flowline::engine::FlowEngine;
use the_flowline::flows::{
    client_inputs, wire_client_flows, MandelboxLaunch, OfflineApi, MANDELBOX_FLOW_START,
};
use the_flowline::mocks::MockCatalog;
use the_flowline::observability::{init_tracing, DebugSchema};
use the_flowline::registry::TriggerRegistry;

/// Run the mandelbox launch flow once and print its outcome
#[derive(Debug, Parser)]
#[command(name = "the-flowline", version)]
struct Args {
    /// Configuration file (YAML or TOML)
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Mock schema replacing real flows; unset runs against the offline API
    #[arg(long, env = MOCK_SCHEMA_ENV)]
    mock_schema: Option<String>,

    /// Give up when neither outcome arrives within this many seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Regions offered to the assignment call
    #[arg(long, default_value = "us-east-1")]
    region: Vec<String>,
}

#[derive(Debug, Clone)]
enum Outcome {
    Launched(String),
    Failed(String),
}

fn demo_launch(regions: Vec<String>) -> MandelboxLaunch {
    MandelboxLaunch {
        access_token: "demo-access-token".to_string(),
        config_token: "demo-config-token".to_string(),
        is_new_config_token: false,
        user_email: "demo@example.com".to_string(),
        regions,
        json_data: "{}".to_string(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_and_validate_config(&args.config)
        .with_context(|| format!("loading configuration from {}", args.config))?;
    init_tracing(&config.logging)
        .map_err(|e| anyhow::anyhow!("installing the tracing subscriber: {}", e))?;

    let registry = TriggerRegistry::new();
    let catalog = MockCatalog::from_config(&config.mocks)?;
    let debug = DebugSchema::from_config(&config.debug);
    debug.watch(&registry, &MANDELBOX_FLOW_START)?;

    let mut engine = FlowEngine::new(registry.clone()).with_debug(debug);
    if let Some(schema) = catalog.select(args.mock_schema.as_deref())? {
        engine = engine.with_mocks(schema);
    }

    let flows = wire_client_flows(&engine, Arc::new(OfflineApi))?;
    let inputs = client_inputs(&registry)?;

    let launched = flows
        .mandelbox
        .success
        .map(|session| Outcome::Launched(serde_json::to_string_pretty(&session).unwrap_or_default()));
    let failed = flows
        .mandelbox
        .failure
        .map(|failure| Outcome::Failed(serde_json::to_string_pretty(&failure).unwrap_or_default()));
    let mut outcomes = launched.merge(&failed).open();

    println!("🚀 Launching mandelbox in {:?}", args.region);
    inputs.mandelbox_start.emit(demo_launch(args.region.clone()));

    let first = tokio::time::timeout(Duration::from_secs(args.timeout_secs), outcomes.next()).await;
    registry.report_unresolved();

    match first {
        Ok(Some(Ok(Outcome::Launched(session)))) => {
            println!("✅ Mandelbox ready:\n{}", session);
            Ok(())
        }
        Ok(Some(Ok(Outcome::Failed(failure)))) => {
            println!("❌ Launch failed:\n{}", failure);
            bail!("mandelbox launch failed")
        }
        Ok(Some(Err(error))) => Err(error).context("launch flow faulted"),
        Ok(None) => bail!("launch flow completed without an outcome"),
        Err(_) => bail!("no launch outcome within {}s", args.timeout_secs),
    }
}
