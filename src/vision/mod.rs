// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision collaborators for the OCR pipeline
//!
//! This module provides:
//! - The `InferenceEngine` seam the OCR handlers call through
//! - An OpenAI-compatible VLM sidecar client implementing it
//! - Image decoding used to learn upload dimensions

pub mod engine;
pub mod image_utils;
pub mod vlm_client;

pub use engine::{ImagePayload, InferenceEngine, VisionOptions};
pub use image_utils::{
    decode_base64_bytes, decode_base64_image, decode_image_bytes, detect_format,
    format_to_extension, strip_data_url, ImageError, ImageInfo,
};
pub use vlm_client::VlmClient;
