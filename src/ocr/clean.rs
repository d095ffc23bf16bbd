// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Display text cleanup for grounded model output

use super::detection::find_detection_spans;
use super::tokens::GROUNDING_TOKEN;

/// Strip grounding markup from `text`, keeping each block's label.
///
/// Every complete `<|ref|>label<|/ref|><|det|>[..]<|/det|>` block becomes
/// the trimmed label, stray `<|grounding|>` markers are removed and the
/// result is trimmed. Blocks with unparsable coordinates are still
/// replaced, since they are structurally complete.
pub fn clean_grounding_text(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    let mut cursor = 0;

    for span in find_detection_spans(text) {
        cleaned.push_str(&text[cursor..span.range.start]);
        cleaned.push_str(span.label.trim());
        cursor = span.range.end;
    }
    cleaned.push_str(&text[cursor..]);

    cleaned.replace(GROUNDING_TOKEN, "").trim().to_string()
}
