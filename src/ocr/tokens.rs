// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Structural tokens understood by the grounding-capable OCR model
//!
//! These are emitted verbatim into prompts and matched verbatim in model
//! output, so they must never be localised or reformatted.

/// Placeholder the model replaces with the encoded image
pub const IMAGE_TOKEN: &str = "<image>";

/// Switches the model into grounding mode (labels + boxes)
pub const GROUNDING_TOKEN: &str = "<|grounding|>";

/// Opens a label span
pub const REF_OPEN: &str = "<|ref|>";

/// Closes a label span
pub const REF_CLOSE: &str = "<|/ref|>";

/// Opens a coordinate span
pub const DET_OPEN: &str = "<|det|>";

/// Closes a coordinate span
pub const DET_CLOSE: &str = "<|/det|>";

/// Upper bound of the normalized coordinate space (inclusive)
pub const NORMALIZED_MAX: f64 = 999.0;

/// Wrap a term in label delimiters, e.g. `<|ref|>Total<|/ref|>`
pub fn ref_span(term: &str) -> String {
    format!("{}{}{}", REF_OPEN, term, REF_CLOSE)
}
