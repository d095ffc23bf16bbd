// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod cli;
pub mod config;
pub mod ocr;
pub mod version;
pub mod vision;

// Re-export main types
pub use api::{create_router, AppState, OcrRequest, OcrResponse};
pub use config::NodeConfig;
pub use ocr::{
    build_prompt, clean_grounding_text, parse_detections, parse_engine_output, Detection,
    ImageDimensions, OcrMode, ParseResult, PromptRequest,
};
pub use vision::{ImagePayload, InferenceEngine, VisionOptions, VlmClient};
