// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Detection Parser tests
//!
//! These tests verify that parse_detections:
//! - Returns one detection per box, in source order
//! - Expands multi-box blocks under a shared label
//! - Scales 0..=999 coordinates with floor truncation
//! - Drops malformed blocks without affecting the rest

use fabstir_ocr_node::ocr::{parse_detections, parse_engine_output, Detection, ImageDimensions};

/// Helper: Build one well-formed single-box block
fn block(label: &str, coords: &str) -> String {
    format!("<|ref|>{}<|/ref|><|det|>{}<|/det|>", label, coords)
}

fn labels(detections: &[Detection]) -> Vec<&str> {
    detections.iter().map(|d| d.label.as_str()).collect()
}

#[test]
fn test_n_blocks_in_source_order() {
    let text = format!(
        "Header\n{}\nbody {} more\n{}\n",
        block("Invoice", "[[10, 20, 300, 60]]"),
        block("Date", "[[400,20,600,60]]"),
        block("Total", "[[10,900,200,950]]")
    );
    let detections = parse_detections(&text, ImageDimensions::new(999, 999));
    assert_eq!(labels(&detections), vec!["Invoice", "Date", "Total"]);
    assert_eq!(detections[0].bbox, [10, 20, 300, 60]);
    assert_eq!(detections[2].bbox, [10, 900, 200, 950]);
}

#[test]
fn test_three_boxes_under_one_label() {
    let text = block("row", "[[0,0,10,10], [20,20,30,30],\n [40,40,50,50]]");
    let detections = parse_detections(&text, ImageDimensions::new(999, 999));
    assert_eq!(detections.len(), 3);
    assert!(detections.iter().all(|d| d.label == "row"));
    assert_eq!(detections[0].bbox, [0, 0, 10, 10]);
    assert_eq!(detections[1].bbox, [20, 20, 30, 30]);
    assert_eq!(detections[2].bbox, [40, 40, 50, 50]);
}

#[test]
fn test_flat_box_is_single_detection() {
    let detections = parse_detections(
        &block("logo", "[100, 200, 300, 400]"),
        ImageDimensions::new(999, 999),
    );
    assert_eq!(detections.len(), 1);
    assert_eq!(detections[0].bbox, [100, 200, 300, 400]);
}

#[test]
fn test_scaling_full_range() {
    let detections = parse_detections(
        &block("page", "[[999,999,0,0]]"),
        ImageDimensions::new(500, 200),
    );
    assert_eq!(detections[0].bbox, [500, 200, 0, 0]);
}

#[test]
fn test_scaling_truncates() {
    let detections = parse_detections(
        &block("edge", "[[998,998,998,998]]"),
        ImageDimensions::new(999, 999),
    );
    assert_eq!(detections[0].bbox, [998, 998, 998, 998]);

    // 500 / 999 * 1000 = 500.5005..., floored
    let detections = parse_detections(
        &block("mid", "[[500,500,500,500]]"),
        ImageDimensions::new(1000, 1000),
    );
    assert_eq!(detections[0].bbox, [500, 500, 500, 500]);
}

#[test]
fn test_duplicate_labels_are_kept() {
    let text = format!("{}{}", block("x", "[[1,1,2,2]]"), block("x", "[[3,3,4,4]]"));
    let detections = parse_detections(&text, ImageDimensions::new(999, 999));
    assert_eq!(labels(&detections), vec!["x", "x"]);
}

#[test]
fn test_unbalanced_block_does_not_affect_others() {
    let text = format!(
        "{} and {}",
        block("broken", "[[1,2,3,4]"),
        block("good", "[[5,6,7,8]]")
    );
    let detections = parse_detections(&text, ImageDimensions::new(999, 999));
    assert_eq!(detections.len(), 1);
    assert_eq!(detections[0].label, "good");
}

#[test]
fn test_invalid_literal_block_is_skipped() {
    let text = format!(
        "{}{}{}",
        block("a", "[[1,2,3,4]]"),
        block("evil", "[[__import__('os'),2,3,4]]"),
        block("b", "[[5,6,7,8]]")
    );
    let detections = parse_detections(&text, ImageDimensions::new(999, 999));
    assert_eq!(labels(&detections), vec!["a", "b"]);
}

#[test]
fn test_unsupported_structures_are_skipped() {
    let text = format!(
        "{}{}{}",
        block("three", "[1,2,3]"),
        block("mixed", "[1,[2,3,4,5]]"),
        block("ok", "[[1,1,1,1]]")
    );
    let detections = parse_detections(&text, ImageDimensions::new(999, 999));
    assert_eq!(labels(&detections), vec!["ok"]);
}

#[test]
fn test_short_candidate_skipped_individually() {
    let detections = parse_detections(
        &block("cells", "[[1,2,3], [4,5,6,7]]"),
        ImageDimensions::new(999, 999),
    );
    assert_eq!(detections.len(), 1);
    assert_eq!(detections[0].bbox, [4, 5, 6, 7]);
}

#[test]
fn test_unknown_dimensions_collapse_boxes() {
    let dims = ImageDimensions::or_unknown(None, Some(480));
    assert_eq!(dims, ImageDimensions::unknown());
    let detections = parse_detections(&block("tiny", "[[500,500,999,999]]"), dims);
    assert_eq!(detections[0].bbox, [0, 0, 1, 1]);
}

#[test]
fn test_no_blocks_returns_empty() {
    assert!(parse_detections("", ImageDimensions::new(10, 10)).is_empty());
    assert!(parse_detections("plain text only", ImageDimensions::new(10, 10)).is_empty());
    assert!(parse_detections("<|ref|>dangling", ImageDimensions::new(10, 10)).is_empty());
}

#[test]
fn test_engine_output_envelope() {
    let raw = format!(
        "  <|grounding|>{} is 12.50\n",
        block("Total", "[[0,0,999,999]]")
    );
    let parsed = parse_engine_output(&raw, ImageDimensions::new(640, 480));
    assert_eq!(parsed.display_text, "Total is 12.50");
    assert_eq!(parsed.raw_text, raw.trim());
    assert_eq!(parsed.detections[0].bbox, [0, 0, 640, 480]);
}

#[test]
fn test_labels_fill_empty_display_text() {
    let raw = format!(
        "{}\n{}",
        block("Name", "[[1,1,2,2]]"),
        block("  ", "[[3,3,4,4]]")
    );
    let parsed = parse_engine_output(&raw, ImageDimensions::new(999, 999));
    assert_eq!(parsed.display_text, "Name");
    assert_eq!(parsed.detections.len(), 2);
}

#[test]
fn test_empty_engine_output() {
    let parsed = parse_engine_output(" \n ", ImageDimensions::new(999, 999));
    assert_eq!(parsed.raw_text, "No text returned by model.");
    assert_eq!(parsed.display_text, "No text returned by model.");
    assert!(parsed.detections.is_empty());
}
