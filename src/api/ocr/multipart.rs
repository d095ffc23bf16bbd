// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Multipart form decoding for `/api/ocr`
//!
//! Form fields carry the same names as the JSON body. The file part is
//! base64-encoded so both endpoints share one pipeline.

use axum_extra::extract::Multipart;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;

use super::request::OcrRequest;
use crate::api::errors::ApiError;
use crate::vision::{detect_format, format_to_extension};

/// Parse a form boolean (true/false, 1/0, yes/no, on/off)
pub fn parse_form_bool(field: &str, value: &str) -> Result<bool, ApiError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(ApiError::validation(
            field,
            format!("expected a boolean, got '{}'", other),
        )),
    }
}

fn parse_form_u32(field: &str, value: &str) -> Result<u32, ApiError> {
    value.trim().parse().map_err(|_| {
        ApiError::validation(field, format!("expected an integer, got '{}'", value.trim()))
    })
}

/// Apply one text form field to the request
pub fn apply_form_field(request: &mut OcrRequest, name: &str, value: String) -> Result<(), ApiError> {
    match name {
        "format" => request.format = value.trim().to_lowercase(),
        "mode" => request.mode = value,
        "prompt" => request.prompt = value,
        "grounding" => request.grounding = parse_form_bool(name, &value)?,
        "include_caption" => request.include_caption = parse_form_bool(name, &value)?,
        "find_term" => request.find_term = Some(value),
        "schema" => request.schema = Some(value),
        "base_size" => request.base_size = parse_form_u32(name, &value)?,
        "image_size" => request.image_size = parse_form_u32(name, &value)?,
        "crop_mode" => request.crop_mode = parse_form_bool(name, &value)?,
        "test_compress" => request.test_compress = parse_form_bool(name, &value)?,
        _ => debug!("Ignoring unknown form field: {}", name),
    }
    Ok(())
}

impl OcrRequest {
    /// Build a request from a multipart upload
    ///
    /// The `image` (or `file`) part is read as raw bytes. When no `format`
    /// field is given it is inferred from the file's magic bytes.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut request = OcrRequest::default();
        let mut format_given = false;
        let mut image_bytes: Option<Vec<u8>> = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::InvalidRequest(format!("Invalid multipart body: {}", e)))?
        {
            let name = field.name().unwrap_or_default().to_string();

            if name == "image" || name == "file" {
                let data = field.bytes().await.map_err(|e| {
                    ApiError::InvalidRequest(format!("Failed to read image upload: {}", e))
                })?;
                image_bytes = Some(data.to_vec());
                continue;
            }

            let value = field.text().await.map_err(|e| {
                ApiError::InvalidRequest(format!("Failed to read field '{}': {}", name, e))
            })?;
            format_given |= name == "format";
            apply_form_field(&mut request, &name, value)?;
        }

        let bytes = image_bytes.ok_or_else(|| ApiError::validation("image", "image is required"))?;
        if bytes.is_empty() {
            return Err(ApiError::validation("image", "image is empty"));
        }

        if !format_given {
            if let Ok(format) = detect_format(&bytes) {
                request.format = format_to_extension(format).to_string();
            }
        }

        request.image = Some(STANDARD.encode(&bytes));
        Ok(request)
    }
}
