// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Grounding OCR prompt building and output parsing
//!
//! This module provides:
//! - Prompt construction per capability mode
//! - Detection (label + box) parsing with pixel scaling
//! - Display text cleanup
//!
//! Everything here is pure and synchronous; the model call itself lives
//! behind [`crate::vision::InferenceEngine`].

pub mod clean;
pub mod coords;
pub mod detection;
pub mod mode;
pub mod prompt;
pub mod result;
pub mod tokens;

pub use clean::clean_grounding_text;
pub use coords::{parse_coord_literal, CoordParseError, CoordValue};
pub use detection::{find_detection_spans, parse_detections, Detection, ImageDimensions};
pub use mode::OcrMode;
pub use prompt::{build_prompt, instruction_for, PromptRequest};
pub use result::{display_text_or_labels, normalize_output, parse_engine_output, ParseResult};
