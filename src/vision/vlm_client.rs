// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! VLM sidecar client for grounding OCR via OpenAI-compatible API

use anyhow::{bail, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use super::engine::{ImagePayload, InferenceEngine, VisionOptions};

// --- OpenAI-compatible serde structs ---

#[derive(serde::Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    mm_processor_kwargs: Option<VisionOptions>,
}

#[derive(serde::Serialize)]
struct ChatMessage {
    role: String,
    content: serde_json::Value,
}

#[derive(serde::Deserialize)]
struct ChatUsage {
    total_tokens: u32,
}

#[derive(serde::Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(serde::Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(serde::Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for a grounding OCR model served behind an OpenAI-compatible API
pub struct VlmClient {
    client: Client,
    endpoint: String,
    model_name: String,
    max_tokens: u32,
}

impl VlmClient {
    /// Create a new VLM client
    pub fn new(endpoint: &str, model_name: &str, max_tokens: u32, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        let endpoint = endpoint.trim_end_matches('/').to_string();
        info!(
            "VLM client configured: endpoint={}, model={}, max_tokens={}",
            endpoint, model_name, max_tokens
        );

        Ok(Self {
            client,
            endpoint,
            model_name: model_name.to_string(),
            max_tokens,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn chat_request(&self, prompt: &str, image: &ImagePayload) -> ChatRequest {
        ChatRequest {
            model: self.model_name.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: serde_json::json!([
                    {"type": "image_url", "image_url": {"url": image.data_url()}},
                    {"type": "text", "text": prompt}
                ]),
            }],
            max_tokens: self.max_tokens,
            temperature: 0.0,
            mm_processor_kwargs: Some(image.options),
        }
    }
}

#[async_trait]
impl InferenceEngine for VlmClient {
    async fn infer(&self, prompt: &str, image: &ImagePayload) -> Result<String> {
        let request = self.chat_request(prompt, image);

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.endpoint))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("VLM returned {}: {}", status, body);
        }

        let chat_response: ChatResponse = response.json().await?;
        let text = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        if let Some(usage) = chat_response.usage {
            debug!("VLM OCR used {} tokens", usage.total_tokens);
        }

        Ok(text)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(format!("{}/health", self.endpoint))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                debug!("VLM health check failed: {}", e);
                false
            }
        }
    }
}
