// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR capability modes
//!
//! Each mode selects the instruction wording sent to the model. Parsing a
//! mode from a string is total: anything unrecognised becomes
//! [`OcrMode::Default`] rather than an error.

use serde::Serialize;
use std::fmt;

/// Closed set of OCR/extraction tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrMode {
    PlainOcr,
    Markdown,
    TablesCsv,
    TablesMd,
    KvJson,
    FigureChart,
    FindRef,
    LayoutMap,
    PiiRedact,
    Multilingual,
    Describe,
    Freeform,
    /// Fallback for unknown mode names
    Default,
}

impl OcrMode {
    /// All named modes, in the order they are advertised to clients
    pub const ALL: [OcrMode; 12] = [
        OcrMode::PlainOcr,
        OcrMode::Markdown,
        OcrMode::TablesCsv,
        OcrMode::TablesMd,
        OcrMode::KvJson,
        OcrMode::FigureChart,
        OcrMode::FindRef,
        OcrMode::LayoutMap,
        OcrMode::PiiRedact,
        OcrMode::Multilingual,
        OcrMode::Describe,
        OcrMode::Freeform,
    ];

    /// Parse a wire name. Unknown names map to `Default`.
    pub fn parse(name: &str) -> Self {
        match name.trim() {
            "plain_ocr" => OcrMode::PlainOcr,
            "markdown" => OcrMode::Markdown,
            "tables_csv" => OcrMode::TablesCsv,
            "tables_md" => OcrMode::TablesMd,
            "kv_json" => OcrMode::KvJson,
            "figure_chart" => OcrMode::FigureChart,
            "find_ref" => OcrMode::FindRef,
            "layout_map" => OcrMode::LayoutMap,
            "pii_redact" => OcrMode::PiiRedact,
            "multilingual" => OcrMode::Multilingual,
            "describe" => OcrMode::Describe,
            "freeform" => OcrMode::Freeform,
            _ => OcrMode::Default,
        }
    }

    /// Wire name of the mode
    pub fn as_str(&self) -> &'static str {
        match self {
            OcrMode::PlainOcr => "plain_ocr",
            OcrMode::Markdown => "markdown",
            OcrMode::TablesCsv => "tables_csv",
            OcrMode::TablesMd => "tables_md",
            OcrMode::KvJson => "kv_json",
            OcrMode::FigureChart => "figure_chart",
            OcrMode::FindRef => "find_ref",
            OcrMode::LayoutMap => "layout_map",
            OcrMode::PiiRedact => "pii_redact",
            OcrMode::Multilingual => "multilingual",
            OcrMode::Describe => "describe",
            OcrMode::Freeform => "freeform",
            OcrMode::Default => "default",
        }
    }

    /// Modes whose output is meaningless without boxes
    pub fn requires_grounding(&self) -> bool {
        matches!(
            self,
            OcrMode::FindRef | OcrMode::LayoutMap | OcrMode::PiiRedact
        )
    }

    /// Modes whose instruction already asks for a caption
    pub fn produces_caption(&self) -> bool {
        matches!(self, OcrMode::Describe)
    }
}

impl From<&str> for OcrMode {
    fn from(name: &str) -> Self {
        OcrMode::parse(name)
    }
}

impl fmt::Display for OcrMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
