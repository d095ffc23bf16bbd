// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Prompt construction for the grounding OCR model
//!
//! `build_prompt` is a total function: every combination of mode and
//! parameters yields a prompt, unknown modes included.

use super::mode::OcrMode;
use super::tokens::{ref_span, GROUNDING_TOKEN, IMAGE_TOKEN};

/// Instruction used by `freeform` with no prompt and by unknown modes
pub const DEFAULT_INSTRUCTION: &str = "OCR this image.";

/// Term located by `find_ref` when none is supplied
pub const DEFAULT_FIND_TERM: &str = "Total";

/// Schema placeholder used by `kv_json` when none is supplied
pub const DEFAULT_SCHEMA: &str = "{}";

/// Appended on its own line when a caption is requested
pub const CAPTION_SUFFIX: &str = "Then add a one-paragraph description of the image.";

const PLAIN_OCR: &str = "Free OCR.";
const MARKDOWN: &str = "Convert the document to markdown.";
const TABLES_CSV: &str = "Extract every table and output CSV only. \
    Use commas, minimal quoting. If multiple tables, separate with a line containing '---'.";
const TABLES_MD: &str =
    "Extract every table as GitHub-flavored Markdown tables. Output only the tables.";
const KV_JSON_PREFIX: &str =
    "Extract key fields and return strict JSON only. Use this schema (fill the values): ";
const FIGURE_CHART: &str = "Parse the figure. First extract any numeric series as a two-column table (x,y). \
    Then summarize the chart in 2 sentences. Output the table, then a line '---', then the summary.";
const LAYOUT_MAP: &str = "Return a JSON array of blocks with fields \
    {\"type\":[\"title\",\"paragraph\",\"table\",\"figure\"],\"box\":[x1,y1,x2,y2]}. \
    Do not include any text content.";
const PII_REDACT: &str = "Find all occurrences of emails, phone numbers, postal addresses, and IBANs. \
    Return a JSON array of objects {label, text, box:[x1,y1,x2,y2]}.";
const MULTILINGUAL: &str =
    "Free OCR. Detect the language automatically and output in the same script.";
const DESCRIBE: &str = "Describe this image. Focus on visible key elements.";

/// Everything needed to phrase one OCR request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    pub mode: OcrMode,
    /// Free text, only read by `freeform`
    pub prompt: String,
    /// Caller asked for boxes
    pub grounding: bool,
    /// Only read by `find_ref`
    pub find_term: Option<String>,
    /// Only read by `kv_json`
    pub schema: Option<String>,
    pub include_caption: bool,
}

impl PromptRequest {
    /// Request for `mode` with every parameter at its default
    pub fn new(mode: OcrMode) -> Self {
        Self {
            mode,
            prompt: String::new(),
            grounding: false,
            find_term: None,
            schema: None,
            include_caption: false,
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_grounding(mut self, grounding: bool) -> Self {
        self.grounding = grounding;
        self
    }

    pub fn with_find_term(mut self, term: impl Into<String>) -> Self {
        self.find_term = Some(term.into());
        self
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_caption(mut self, include_caption: bool) -> Self {
        self.include_caption = include_caption;
        self
    }

    /// Grounding actually sent to the model: the flag OR a grounding-dependent mode
    pub fn grounding_enabled(&self) -> bool {
        self.grounding || self.mode.requires_grounding()
    }
}

/// Trimmed value, or `fallback` when absent or blank
fn non_blank<'a>(value: Option<&'a str>, fallback: &'a str) -> &'a str {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => fallback,
    }
}

/// Core instruction for the request, without markers or caption suffix
pub fn instruction_for(request: &PromptRequest) -> String {
    match request.mode {
        OcrMode::PlainOcr => PLAIN_OCR.to_string(),
        OcrMode::Markdown => MARKDOWN.to_string(),
        OcrMode::TablesCsv => TABLES_CSV.to_string(),
        OcrMode::TablesMd => TABLES_MD.to_string(),
        OcrMode::KvJson => {
            let schema = non_blank(request.schema.as_deref(), DEFAULT_SCHEMA);
            format!("{}{}", KV_JSON_PREFIX, schema)
        }
        OcrMode::FigureChart => FIGURE_CHART.to_string(),
        OcrMode::FindRef => {
            let term = non_blank(request.find_term.as_deref(), DEFAULT_FIND_TERM);
            format!("Locate {} in the image.", ref_span(term))
        }
        OcrMode::LayoutMap => LAYOUT_MAP.to_string(),
        OcrMode::PiiRedact => PII_REDACT.to_string(),
        OcrMode::Multilingual => MULTILINGUAL.to_string(),
        OcrMode::Describe => DESCRIBE.to_string(),
        OcrMode::Freeform => {
            non_blank(Some(request.prompt.as_str()), DEFAULT_INSTRUCTION).to_string()
        }
        OcrMode::Default => DEFAULT_INSTRUCTION.to_string(),
    }
}

/// Build the full prompt: image marker, optional grounding marker, instruction
/// and optional caption suffix, one per line.
pub fn build_prompt(request: &PromptRequest) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(4);
    parts.push(IMAGE_TOKEN.to_string());

    if request.grounding_enabled() {
        parts.push(GROUNDING_TOKEN.to_string());
    }

    parts.push(instruction_for(request));

    if request.include_caption && !request.mode.produces_caption() {
        parts.push(CAPTION_SUFFIX.to_string());
    }

    parts.join("\n")
}
