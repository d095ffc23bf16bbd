// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Node configuration loaded from environment variables

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

/// Configuration for the OCR node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConfig {
    /// Interface the HTTP API binds to
    pub api_host: String,
    /// Port the HTTP API binds to
    pub api_port: u16,
    /// Base URL of the OpenAI-compatible VLM sidecar
    pub vlm_endpoint: String,
    /// Model name sent to the sidecar and reported in responses
    pub vlm_model_name: String,
    /// Generation limit per OCR call
    pub vlm_max_tokens: u32,
    /// Upper bound on a single inference call in seconds
    pub inference_timeout_secs: u64,
}

impl NodeConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_host: env::var("API_HOST").unwrap_or(defaults.api_host),
            api_port: env::var("API_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.api_port),
            vlm_endpoint: env::var("VLM_ENDPOINT").unwrap_or(defaults.vlm_endpoint),
            vlm_model_name: env::var("VLM_MODEL_NAME").unwrap_or(defaults.vlm_model_name),
            vlm_max_tokens: env::var("VLM_MAX_TOKENS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.vlm_max_tokens),
            inference_timeout_secs: env::var("INFERENCE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.inference_timeout_secs),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.api_port == 0 {
            return Err("API port must be greater than 0".to_string());
        }
        if self.vlm_endpoint.trim().is_empty() {
            return Err("VLM endpoint must not be empty".to_string());
        }
        if self.vlm_max_tokens == 0 {
            return Err("VLM max tokens must be greater than 0".to_string());
        }
        if self.inference_timeout_secs == 0 {
            return Err("Inference timeout must be greater than 0".to_string());
        }
        self.listen_addr()
            .map(|_| ())
            .map_err(|e| format!("Invalid listen address: {}", e))
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.api_host, self.api_port).parse()
    }

    pub fn inference_timeout(&self) -> Duration {
        Duration::from_secs(self.inference_timeout_secs)
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            api_host: "0.0.0.0".to_string(),
            api_port: 8000,
            vlm_endpoint: "http://localhost:8081".to_string(),
            vlm_model_name: "deepseek-ai/DeepSeek-OCR".to_string(),
            vlm_max_tokens: 4096,
            inference_timeout_secs: 120,
        }
    }
}
