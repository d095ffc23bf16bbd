// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the Fabstir OCR Node

/// Full version string with feature description
pub const VERSION: &str = "v1.0.0-grounding-ocr-2025-10-28";

/// Semantic version number
pub const VERSION_NUMBER: &str = "1.0.0";

/// Build date
pub const BUILD_DATE: &str = "2025-10-28";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "grounding-ocr",
    "capability-modes",
    "detection-boxes",
    "multipart-upload",
    "vlm-sidecar",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Fabstir OCR Node {} ({})", VERSION_NUMBER, BUILD_DATE)
}

/// Get full version info for API responses
pub fn get_version_info() -> serde_json::Value {
    serde_json::json!({
        "version": VERSION_NUMBER,
        "build": VERSION,
        "date": BUILD_DATE,
        "features": FEATURES,
    })
}
