// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR request types and validation

use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;
use crate::ocr::{OcrMode, PromptRequest};
use crate::vision::VisionOptions;

/// Supported image formats
pub const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif", "bmp", "tiff"];

/// Maximum image size (base64 encoded)
const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

/// Largest accepted base_size / image_size
const MAX_RESOLUTION: u32 = 4096;

fn default_format() -> String {
    "png".to_string()
}

fn default_mode() -> String {
    OcrMode::PlainOcr.as_str().to_string()
}

fn default_base_size() -> u32 {
    VisionOptions::default().base_size
}

fn default_image_size() -> u32 {
    VisionOptions::default().image_size
}

fn default_crop_mode() -> bool {
    VisionOptions::default().crop_mode
}

/// Request for grounding OCR
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrRequest {
    /// Base64-encoded image data, optionally as a data URL
    #[serde(default)]
    pub image: Option<String>,

    /// Image format hint
    #[serde(default = "default_format")]
    pub format: String,

    /// Capability mode name; unknown names use the default instruction
    #[serde(default = "default_mode")]
    pub mode: String,

    /// Instruction for `freeform` mode
    #[serde(default)]
    pub prompt: String,

    /// Ask for grounding boxes
    #[serde(default)]
    pub grounding: bool,

    /// Append an image description
    #[serde(default)]
    pub include_caption: bool,

    /// Term to locate in `find_ref` mode
    #[serde(default)]
    pub find_term: Option<String>,

    /// JSON schema for `kv_json` mode
    #[serde(default)]
    pub schema: Option<String>,

    #[serde(default = "default_base_size")]
    pub base_size: u32,

    #[serde(default = "default_image_size")]
    pub image_size: u32,

    #[serde(default = "default_crop_mode")]
    pub crop_mode: bool,

    #[serde(default)]
    pub test_compress: bool,
}

impl Default for OcrRequest {
    fn default() -> Self {
        Self {
            image: None,
            format: default_format(),
            mode: default_mode(),
            prompt: String::new(),
            grounding: false,
            include_caption: false,
            find_term: None,
            schema: None,
            base_size: default_base_size(),
            image_size: default_image_size(),
            crop_mode: default_crop_mode(),
            test_compress: false,
        }
    }
}

impl OcrRequest {
    /// Validate the OCR request
    pub fn validate(&self) -> Result<(), ApiError> {
        let image = match self.image.as_deref() {
            Some(image) if !image.trim().is_empty() => image,
            _ => return Err(ApiError::validation("image", "image is required")),
        };

        if image.len() > MAX_IMAGE_SIZE {
            return Err(ApiError::validation(
                "image",
                format!("image exceeds maximum size of {} bytes", MAX_IMAGE_SIZE),
            ));
        }

        if !SUPPORTED_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ApiError::validation(
                "format",
                format!(
                    "unsupported format '{}', supported: {:?}",
                    self.format, SUPPORTED_FORMATS
                ),
            ));
        }

        for (field, value) in [("base_size", self.base_size), ("image_size", self.image_size)] {
            if value == 0 || value > MAX_RESOLUTION {
                return Err(ApiError::validation(
                    field,
                    format!("{} must be between 1 and {}, got {}", field, MAX_RESOLUTION, value),
                ));
            }
        }

        Ok(())
    }

    pub fn ocr_mode(&self) -> OcrMode {
        OcrMode::parse(&self.mode)
    }

    /// Prompt parameters carried by this request
    pub fn prompt_request(&self) -> PromptRequest {
        PromptRequest {
            mode: self.ocr_mode(),
            prompt: self.prompt.clone(),
            grounding: self.grounding,
            find_term: self.find_term.clone(),
            schema: self.schema.clone(),
            include_caption: self.include_caption,
        }
    }

    pub fn vision_options(&self) -> VisionOptions {
        VisionOptions {
            base_size: self.base_size,
            image_size: self.image_size,
            crop_mode: self.crop_mode,
            test_compress: self.test_compress,
        }
    }
}
