// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Combine detections and cleaned text from one model response

use serde::{Deserialize, Serialize};

use super::clean::clean_grounding_text;
use super::detection::{parse_detections, Detection, ImageDimensions};

/// Substituted when the model returns nothing but whitespace
pub const EMPTY_OUTPUT_TEXT: &str = "No text returned by model.";

/// Parsed view of one raw model response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseResult {
    /// Text safe to show a user
    pub display_text: String,
    /// Model output as received (after normalization)
    pub raw_text: String,
    pub detections: Vec<Detection>,
}

/// Trim raw engine output, substituting a placeholder when it is empty
pub fn normalize_output(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        EMPTY_OUTPUT_TEXT.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Cleaned text, or the comma-joined labels when cleaning left nothing
/// but detections exist.
pub fn display_text_or_labels(cleaned: String, detections: &[Detection]) -> String {
    if !cleaned.is_empty() || detections.is_empty() {
        return cleaned;
    }
    detections
        .iter()
        .map(|d| d.label.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Run the detection parser and text cleaner over the same output
pub fn parse_engine_output(raw: &str, dims: ImageDimensions) -> ParseResult {
    let raw_text = normalize_output(raw);
    let detections = parse_detections(&raw_text, dims);
    let cleaned = clean_grounding_text(&raw_text);

    ParseResult {
        display_text: display_text_or_labels(cleaned, &detections),
        raw_text,
        detections,
    }
}
