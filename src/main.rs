// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::Parser;
use fabstir_ocr_node::{
    api::{start_server, AppState},
    cli::Cli,
    config::NodeConfig,
    version,
    vision::{InferenceEngine, VlmClient},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting {}", version::get_version_string());

    let config = Cli::parse().apply(NodeConfig::from_env());
    config
        .validate()
        .map_err(|e| anyhow!("Invalid configuration: {}", e))?;

    let client = VlmClient::new(
        &config.vlm_endpoint,
        &config.vlm_model_name,
        config.vlm_max_tokens,
        config.inference_timeout(),
    )?;

    if !client.health_check().await {
        warn!(
            "VLM sidecar at {} is not reachable yet; requests will fail until it is",
            client.endpoint()
        );
    }

    info!(
        "Using model {} via {}",
        client.model_name(),
        client.endpoint()
    );

    let engine: Arc<dyn InferenceEngine> = Arc::new(client);
    let state = AppState::new(config, Some(engine));

    start_server(state).await
}
