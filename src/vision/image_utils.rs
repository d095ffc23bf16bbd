// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image decoding helpers for OCR requests
//!
//! The OCR model receives the original bytes; decoding here only serves
//! to validate the upload and learn its pixel dimensions for box scaling.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageFormat;
use thiserror::Error;

use crate::ocr::ImageDimensions;

/// Maximum decoded image size (10MB)
pub const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

/// Custom error types for image processing
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Image data is too large: {0} bytes (max: {1} bytes)")]
    TooLarge(usize, usize),

    #[error("Invalid base64 encoding: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Unsupported image format")]
    UnsupportedFormat,

    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),

    #[error("Image data is empty")]
    EmptyData,
}

impl ImageError {
    /// Errors that mean the upload itself is unusable, as opposed to an
    /// image this node merely cannot decode locally
    pub fn is_invalid_upload(&self) -> bool {
        matches!(
            self,
            ImageError::TooLarge(..) | ImageError::InvalidBase64(_) | ImageError::EmptyData
        )
    }
}

/// Image information extracted during loading
#[derive(Debug, Clone)]
pub struct ImageInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Detected format
    pub format: ImageFormat,
    /// Size in bytes
    pub size_bytes: usize,
}

impl ImageInfo {
    pub fn dimensions(&self) -> ImageDimensions {
        ImageDimensions::new(self.width, self.height)
    }
}

/// Remove a `data:<mime>;base64,` prefix if present
pub fn strip_data_url(input: &str) -> &str {
    let trimmed = input.trim();
    if trimmed.starts_with("data:") {
        if let Some((_, payload)) = trimmed.split_once(',') {
            return payload;
        }
    }
    trimmed
}

/// Decode base64 (optionally data-URL prefixed) into raw bytes
pub fn decode_base64_bytes(base64_str: &str) -> Result<Vec<u8>, ImageError> {
    let payload = strip_data_url(base64_str);
    if payload.is_empty() {
        return Err(ImageError::EmptyData);
    }

    let bytes = STANDARD.decode(payload)?;

    if bytes.len() > MAX_IMAGE_SIZE {
        return Err(ImageError::TooLarge(bytes.len(), MAX_IMAGE_SIZE));
    }
    if bytes.is_empty() {
        return Err(ImageError::EmptyData);
    }

    Ok(bytes)
}

/// Decode a base64-encoded image and report its metadata
///
/// # Example
/// ```ignore
/// let info = decode_base64_image("iVBORw0KGgo...")?;
/// println!("Image size: {}x{}", info.width, info.height);
/// ```
pub fn decode_base64_image(base64_str: &str) -> Result<ImageInfo, ImageError> {
    let bytes = decode_base64_bytes(base64_str)?;
    decode_image_bytes(&bytes)
}

/// Decode raw image bytes (multipart uploads) and report their metadata
pub fn decode_image_bytes(bytes: &[u8]) -> Result<ImageInfo, ImageError> {
    if bytes.len() > MAX_IMAGE_SIZE {
        return Err(ImageError::TooLarge(bytes.len(), MAX_IMAGE_SIZE));
    }
    if bytes.is_empty() {
        return Err(ImageError::EmptyData);
    }

    let format = detect_format(bytes)?;

    let img = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| ImageError::DecodeFailed(e.to_string()))?;

    Ok(ImageInfo {
        width: img.width(),
        height: img.height(),
        format,
        size_bytes: bytes.len(),
    })
}

/// Detect image format from magic bytes
pub fn detect_format(bytes: &[u8]) -> Result<ImageFormat, ImageError> {
    if bytes.len() < 4 {
        return Err(ImageError::UnsupportedFormat);
    }

    match bytes {
        // PNG: 89 50 4E 47 (0x89 P N G)
        [0x89, 0x50, 0x4E, 0x47, ..] => Ok(ImageFormat::Png),

        // JPEG: FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => Ok(ImageFormat::Jpeg),

        // WebP: RIFF .... WEBP
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Ok(ImageFormat::WebP),

        // GIF: GIF87a or GIF89a
        [0x47, 0x49, 0x46, 0x38, x, ..] if *x == 0x37 || *x == 0x39 => Ok(ImageFormat::Gif),

        // BMP: BM
        [0x42, 0x4D, ..] => Ok(ImageFormat::Bmp),

        // TIFF: II (little-endian) or MM (big-endian)
        [0x49, 0x49, 0x2A, 0x00, ..] | [0x4D, 0x4D, 0x00, 0x2A, ..] => Ok(ImageFormat::Tiff),

        _ => Err(ImageError::UnsupportedFormat),
    }
}

/// Get the format extension as a string
pub fn format_to_extension(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Png => "png",
        ImageFormat::Jpeg => "jpg",
        ImageFormat::WebP => "webp",
        ImageFormat::Gif => "gif",
        ImageFormat::Bmp => "bmp",
        ImageFormat::Tiff => "tiff",
        _ => "unknown",
    }
}
