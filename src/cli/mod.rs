// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Command-line flags for the node binary
//!
//! Environment variables are read only by `NodeConfig::from_env`; flags
//! given here are layered on top of that.

use clap::Parser;

use crate::config::NodeConfig;

/// Fabstir OCR Node
#[derive(Parser, Debug, Default)]
#[command(name = "fabstir-ocr-node")]
#[command(version = crate::version::VERSION_NUMBER)]
#[command(about = "Grounding OCR API backed by a vision-language model", long_about = None)]
pub struct Cli {
    /// Interface to bind, overrides API_HOST
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind, overrides API_PORT
    #[arg(long)]
    pub port: Option<u16>,

    /// Base URL of the VLM sidecar, overrides VLM_ENDPOINT
    #[arg(long)]
    pub vlm_endpoint: Option<String>,

    /// Model name sent to the sidecar, overrides VLM_MODEL_NAME
    #[arg(long)]
    pub model: Option<String>,

    /// Generation limit per request, overrides VLM_MAX_TOKENS
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Inference timeout in seconds, overrides INFERENCE_TIMEOUT_SECS
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

impl Cli {
    /// Overlay the flags that were given onto `config`
    pub fn apply(self, mut config: NodeConfig) -> NodeConfig {
        if let Some(host) = self.host {
            config.api_host = host;
        }
        if let Some(port) = self.port {
            config.api_port = port;
        }
        if let Some(endpoint) = self.vlm_endpoint {
            config.vlm_endpoint = endpoint;
        }
        if let Some(model) = self.model {
            config.vlm_model_name = model;
        }
        if let Some(max_tokens) = self.max_tokens {
            config.vlm_max_tokens = max_tokens;
        }
        if let Some(timeout) = self.timeout_secs {
            config.inference_timeout_secs = timeout;
        }
        config
    }
}
