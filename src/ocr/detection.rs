// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Grounding detection parsing
//!
//! Model output interleaves plain text with detection blocks:
//!
//! ```text
//! <|ref|>Total<|/ref|><|det|>[[312, 339, 480, 681]]<|/det|>
//! <|ref|>Logo<|/ref|> <|det|>[[504, 700, 625, 910], [771, 570, 996, 996]]<|/det|>
//! ```
//!
//! Coordinates are normalized to 0..=999 and scaled here to image pixels.
//! A malformed block is dropped on its own; parsing never fails.

use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::{debug, warn};

use super::coords::{parse_coord_literal, CoordValue};
use super::tokens::{DET_CLOSE, DET_OPEN, NORMALIZED_MAX, REF_CLOSE, REF_OPEN};

/// Pixel size of the source image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Placeholder used when the real size is unknown.
    ///
    /// Boxes scaled against it collapse to (near) zero; callers should
    /// surface a warning whenever they fall back to it.
    pub fn unknown() -> Self {
        Self {
            width: 1,
            height: 1,
        }
    }

    /// Known dimensions, or `unknown()` with a logged warning
    pub fn or_unknown(width: Option<u32>, height: Option<u32>) -> Self {
        match (width, height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Self::new(w, h),
            _ => {
                warn!("Image dimensions unknown, scaling detections against 1x1");
                Self::unknown()
            }
        }
    }
}

/// One labeled box in pixel space, `[x1, y1, x2, y2]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    #[serde(rename = "box")]
    pub bbox: [i64; 4],
}

/// A structurally complete detection block located in the raw text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionSpan<'a> {
    /// Label text between the ref delimiters, untrimmed
    pub label: &'a str,
    /// Bracketed coordinate expression including the outer brackets
    pub coords: &'a str,
    /// Byte range of the whole block, ref-open through det-close
    pub range: Range<usize>,
}

fn skip_whitespace(text: &str, mut pos: usize) -> usize {
    while let Some(ch) = text[pos..].chars().next() {
        if !ch.is_whitespace() {
            break;
        }
        pos += ch.len_utf8();
    }
    pos
}

/// Where a bracket scan stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BracketScan {
    /// Balanced; end offset (exclusive) of the expression
    Closed(usize),
    /// Reached the closing detection token first
    HitDetClose,
    /// Ran off the end of the text
    EndOfInput,
}

/// Scan the bracket expression opening at `start`.
///
/// Tracks depth so nested box lists are captured whole.
fn matching_bracket_end(text: &str, start: usize) -> BracketScan {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut pos = start;

    while pos < bytes.len() {
        match bytes[pos] {
            b'[' => depth += 1,
            b']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return BracketScan::Closed(pos + 1);
                }
            }
            b'<' if text[pos..].starts_with(DET_CLOSE) => return BracketScan::HitDetClose,
            _ => {}
        }
        pos += 1;
    }
    BracketScan::EndOfInput
}

/// Outcome of matching a block at one ref-open token
#[derive(Debug)]
enum SpanMatch<'a> {
    Found(DetectionSpan<'a>),
    /// No block starts here; the next candidate is searched from this offset
    ResumeAt(usize),
    /// No block can start here or anywhere later
    Exhausted,
}

/// Try to match a full block whose ref-open token starts at `start`.
///
/// Every ref-open before the first ref-close shares that close and the
/// text after it, so a failure past the label skips all of them at once.
fn match_span_at(text: &str, start: usize) -> SpanMatch<'_> {
    let label_start = start + REF_OPEN.len();
    let Some(label_len) = text[label_start..].find(REF_CLOSE) else {
        return SpanMatch::Exhausted;
    };
    let label_end = label_start + label_len;
    let resume = SpanMatch::ResumeAt(label_end + REF_CLOSE.len());

    let mut pos = skip_whitespace(text, label_end + REF_CLOSE.len());
    if !text[pos..].starts_with(DET_OPEN) {
        return resume;
    }
    pos = skip_whitespace(text, pos + DET_OPEN.len());
    if !text[pos..].starts_with('[') {
        return resume;
    }

    let coords_start = pos;
    let coords_end = match matching_bracket_end(text, coords_start) {
        BracketScan::Closed(end) => end,
        BracketScan::HitDetClose => return resume,
        // No det-close remains, so no later block can complete either
        BracketScan::EndOfInput => return SpanMatch::Exhausted,
    };

    pos = skip_whitespace(text, coords_end);
    if !text[pos..].starts_with(DET_CLOSE) {
        return resume;
    }
    let end = pos + DET_CLOSE.len();

    SpanMatch::Found(DetectionSpan {
        label: &text[label_start..label_end],
        coords: &text[coords_start..coords_end],
        range: start..end,
    })
}

/// Locate every non-overlapping detection block, in order of appearance.
///
/// Runs in a single forward pass over the text; failed candidates never
/// cause the same region to be searched again for its ref-close.
pub fn find_detection_spans(text: &str) -> Vec<DetectionSpan<'_>> {
    let mut spans = Vec::new();
    let mut cursor = 0;

    while let Some(offset) = text[cursor..].find(REF_OPEN) {
        match match_span_at(text, cursor + offset) {
            SpanMatch::Found(span) => {
                cursor = span.range.end;
                spans.push(span);
            }
            SpanMatch::ResumeAt(next) => cursor = next,
            SpanMatch::Exhausted => break,
        }
    }

    spans
}

/// Scale one normalized coordinate into pixel space
pub fn scale_coordinate(raw: f64, dimension: u32) -> i64 {
    (raw / NORMALIZED_MAX * f64::from(dimension)).floor() as i64
}

/// Scale a normalized `[x1, y1, x2, y2]` box, preserving coordinate order
pub fn scale_box(raw: [f64; 4], dims: ImageDimensions) -> [i64; 4] {
    [
        scale_coordinate(raw[0], dims.width),
        scale_coordinate(raw[1], dims.height),
        scale_coordinate(raw[2], dims.width),
        scale_coordinate(raw[3], dims.height),
    ]
}

/// Normalize a parsed coordinate literal into box candidates.
///
/// A flat list of exactly four numbers is a single box; a list whose
/// elements are all lists is used as-is. Anything else is unsupported.
fn box_candidates(parsed: &CoordValue) -> Option<Vec<&CoordValue>> {
    let items = parsed.as_list()?;

    if items.len() == 4 && items.iter().all(|v| v.as_number().is_some()) {
        return Some(vec![parsed]);
    }
    if items.iter().all(|v| v.as_list().is_some()) {
        return Some(items.iter().collect());
    }
    None
}

/// Detections for one block; empty when the block is malformed
fn block_detections(span: &DetectionSpan<'_>, dims: ImageDimensions) -> Vec<Detection> {
    let label = span.label.trim();

    let parsed = match parse_coord_literal(span.coords) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Dropping detection block '{}': {}", label, e);
            return Vec::new();
        }
    };

    let Some(candidates) = box_candidates(&parsed) else {
        warn!(
            "Dropping detection block '{}': unsupported coordinate structure {}",
            label, span.coords
        );
        return Vec::new();
    };

    candidates
        .into_iter()
        .enumerate()
        .filter_map(|(idx, candidate)| match candidate.leading_quad() {
            Some(raw) => {
                let bbox = scale_box(raw, dims);
                debug!("'{}' box {}: {:?} -> {:?}", label, idx + 1, raw, bbox);
                Some(Detection {
                    label: label.to_string(),
                    bbox,
                })
            }
            None => {
                debug!("'{}' box {}: skipping invalid candidate", label, idx + 1);
                None
            }
        })
        .collect()
}

/// Parse every detection in `text`, scaled to `dims`.
///
/// Order follows the text, then the order of boxes within a block.
/// Labels are never deduplicated.
pub fn parse_detections(text: &str, dims: ImageDimensions) -> Vec<Detection> {
    let detections: Vec<Detection> = find_detection_spans(text)
        .iter()
        .flat_map(|span| block_detections(span, dims))
        .collect();

    debug!("Parsed {} detections", detections.len());
    detections
}
