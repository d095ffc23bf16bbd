// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Inference engine abstraction
//!
//! The OCR pipeline never talks to a model directly; it is handed an
//! `InferenceEngine` and only ever calls `infer`.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Model-side preprocessing knobs forwarded with each image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisionOptions {
    /// Global view resolution
    pub base_size: u32,
    /// Tile resolution when cropping
    pub image_size: u32,
    /// Split large pages into tiles
    pub crop_mode: bool,
    /// Report vision-token compression statistics
    pub test_compress: bool,
}

impl Default for VisionOptions {
    fn default() -> Self {
        Self {
            base_size: 1024,
            image_size: 640,
            crop_mode: true,
            test_compress: false,
        }
    }
}

/// Image handed to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    /// Base64 data without any `data:` prefix
    pub data: String,
    /// Format extension (png, jpg, ...)
    pub format: String,
    pub options: VisionOptions,
}

impl ImagePayload {
    pub fn new(data: impl Into<String>, format: impl Into<String>, options: VisionOptions) -> Self {
        Self {
            data: data.into(),
            format: format.into(),
            options,
        }
    }

    /// `data:image/<format>;base64,<data>` URL for OpenAI-style APIs
    pub fn data_url(&self) -> String {
        let mime = match self.format.as_str() {
            "jpg" => "jpeg",
            other => other,
        };
        format!("data:image/{};base64,{}", mime, self.data)
    }
}

/// A vision-language model that turns a prompt and an image into text
#[async_trait]
pub trait InferenceEngine: Send + Sync {
    /// Run the model once and return its raw text output
    async fn infer(&self, prompt: &str, image: &ImagePayload) -> Result<String>;

    /// Name reported in responses
    fn model_name(&self) -> &str;

    /// Whether the engine is reachable
    async fn health_check(&self) -> bool {
        true
    }
}
