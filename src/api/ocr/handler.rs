// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR endpoint handlers

use std::time::Instant;

use axum::{extract::State, Json};
use axum_extra::extract::Multipart;
use tracing::{debug, info, warn};

use super::request::OcrRequest;
use super::response::{ImageDims, OcrMetadata, OcrResponse};
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::ocr::{build_prompt, parse_engine_output, ImageDimensions};
use crate::vision::{decode_base64_image, strip_data_url, ImagePayload};

/// Warning attached when the upload could not be decoded locally
pub const UNKNOWN_DIMENSIONS_WARNING: &str =
    "Image dimensions unknown; detection boxes are scaled against 1x1";

/// POST /v1/ocr - Grounding OCR over a base64 image
///
/// # Request
/// - `image`: Base64-encoded image data, or a data URL (required)
/// - `mode`: Capability mode (plain_ocr, markdown, find_ref, ...) - defaults to "plain_ocr"
/// - `grounding`: Ask for boxes; forced on by find_ref, layout_map and pii_redact
/// - `include_caption`, `find_term`, `schema`, `prompt`: Prompt parameters
/// - `base_size`, `image_size`, `crop_mode`, `test_compress`: Model preprocessing
///
/// # Response
/// - `display_text`: Output with grounding markup removed
/// - `raw_text`: Output as returned by the model
/// - `detections`: `{label, box}` pairs in pixel coordinates
/// - `image_dims`, `metadata`, `warnings`
///
/// # Errors
/// - 400 Bad Request: Invalid request (missing image, invalid format, etc.)
/// - 503 Service Unavailable: No inference engine attached
/// - 500 Internal Server Error: Inference failed
/// - 504 Gateway Timeout: Inference exceeded the configured timeout
pub async fn ocr_handler(
    State(state): State<AppState>,
    Json(request): Json<OcrRequest>,
) -> Result<Json<OcrResponse>, ApiError> {
    debug!("OCR request received (mode: {})", request.mode);
    run_ocr(&state, request).await.map(Json)
}

/// POST /api/ocr - Grounding OCR over a multipart file upload
///
/// Accepts the same fields as `/v1/ocr` as form fields, with the image
/// sent as a file part named `image` (or `file`).
pub async fn ocr_upload_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<OcrResponse>, ApiError> {
    let request = OcrRequest::from_multipart(multipart).await.map_err(|e| {
        warn!("OCR upload rejected: {}", e);
        e
    })?;
    debug!("OCR upload received (mode: {})", request.mode);
    run_ocr(&state, request).await.map(Json)
}

/// Shared OCR pipeline: validate, prompt, infer, parse
pub async fn run_ocr(state: &AppState, request: OcrRequest) -> Result<OcrResponse, ApiError> {
    let start = Instant::now();

    // 1. Validate request
    if let Err(e) = request.validate() {
        warn!("OCR validation failed: {}", e);
        return Err(e);
    }

    // 2. Get inference engine from state
    let engine = state.engine().await.ok_or_else(|| {
        warn!("Inference engine not available");
        ApiError::ServiceUnavailable("Inference engine not available".to_string())
    })?;

    let image_data = request
        .image
        .as_deref()
        .ok_or_else(|| ApiError::validation("image", "image is required"))?;

    // 3. Learn image dimensions; an undecodable image is still sent to the model
    let mut warnings = Vec::new();
    let known_dims = match decode_base64_image(image_data) {
        Ok(info) => {
            debug!(
                "Decoded image: {}x{}, {} bytes",
                info.width, info.height, info.size_bytes
            );
            Some(info.dimensions())
        }
        Err(e) if e.is_invalid_upload() => {
            warn!("Rejecting image: {}", e);
            return Err(ApiError::validation("image", format!("Invalid image: {}", e)));
        }
        Err(e) => {
            warn!("Could not decode image locally: {}", e);
            warnings.push(UNKNOWN_DIMENSIONS_WARNING.to_string());
            None
        }
    };
    let dims = known_dims.unwrap_or_else(|| ImageDimensions::or_unknown(None, None));

    // 4. Build prompt
    let prompt_request = request.prompt_request();
    let prompt = build_prompt(&prompt_request);
    let payload = ImagePayload::new(
        strip_data_url(image_data),
        request.format.to_lowercase(),
        request.vision_options(),
    );

    // 5. Run inference under the configured deadline
    let raw = tokio::time::timeout(
        state.config.inference_timeout(),
        engine.infer(&prompt, &payload),
    )
    .await
    .map_err(|_| {
        warn!(
            "Inference timed out after {}s",
            state.config.inference_timeout_secs
        );
        ApiError::Timeout
    })?
    .map_err(|e| {
        warn!("Inference failed: {}", e);
        ApiError::InferenceFailed(e.to_string())
    })?;

    // 6. Parse detections and clean display text
    let parsed = parse_engine_output(&raw, dims);
    let processing_time_ms = start.elapsed().as_millis() as u64;

    info!(
        "OCR complete: mode={}, {} detections, {} chars, {}ms (model: {})",
        prompt_request.mode,
        parsed.detections.len(),
        parsed.display_text.len(),
        processing_time_ms,
        engine.model_name()
    );

    let metadata = OcrMetadata {
        mode: request.mode.clone(),
        grounding: prompt_request.grounding_enabled(),
        base_size: request.base_size,
        image_size: request.image_size,
        crop_mode: request.crop_mode,
        model: engine.model_name().to_string(),
        processing_time_ms,
    };

    Ok(OcrResponse::new(
        parsed,
        ImageDims::from(known_dims),
        metadata,
        warnings,
    ))
}
