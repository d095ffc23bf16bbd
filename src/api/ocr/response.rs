// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR response types

use serde::{Deserialize, Serialize};

use crate::ocr::{Detection, ImageDimensions, ParseResult};

/// Pixel dimensions of the submitted image, null when it could not be decoded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDims {
    pub w: Option<u32>,
    pub h: Option<u32>,
}

impl From<Option<ImageDimensions>> for ImageDims {
    fn from(dims: Option<ImageDimensions>) -> Self {
        match dims {
            Some(d) => Self {
                w: Some(d.width),
                h: Some(d.height),
            },
            None => Self::default(),
        }
    }
}

/// Request echo and timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrMetadata {
    pub mode: String,
    /// Grounding as actually sent to the model
    pub grounding: bool,
    pub base_size: u32,
    pub image_size: u32,
    pub crop_mode: bool,
    pub model: String,
    pub processing_time_ms: u64,
}

/// Response from grounding OCR
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrResponse {
    pub success: bool,
    /// Model output with grounding markup removed
    pub display_text: String,
    /// Model output as received
    pub raw_text: String,
    /// Labelled boxes in pixel coordinates
    pub detections: Vec<Detection>,
    pub image_dims: ImageDims,
    pub metadata: OcrMetadata,
    /// Non-fatal problems encountered while serving the request
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl OcrResponse {
    pub fn new(
        parsed: ParseResult,
        image_dims: ImageDims,
        metadata: OcrMetadata,
        warnings: Vec<String>,
    ) -> Self {
        Self {
            success: true,
            display_text: parsed.display_text,
            raw_text: parsed.raw_text,
            detections: parsed.detections,
            image_dims,
            metadata,
            warnings,
        }
    }
}
