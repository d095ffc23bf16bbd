// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR API endpoint module
//!
//! Provides POST /v1/ocr (JSON) and POST /api/ocr (multipart) for
//! grounding OCR over a single image.

pub mod handler;
pub mod multipart;
pub mod request;
pub mod response;

pub use handler::{ocr_handler, ocr_upload_handler, run_ocr};
pub use request::OcrRequest;
pub use response::{ImageDims, OcrMetadata, OcrResponse};
