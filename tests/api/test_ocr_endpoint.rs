// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! OCR Endpoint tests for POST /v1/ocr
//!
//! These tests verify that the ocr_handler correctly:
//! - Validates requests and returns appropriate errors
//! - Sends the built prompt and vision options to the engine
//! - Returns detections scaled to the decoded image size
//! - Maps engine failures and timeouts to 500 and 504

use async_trait::async_trait;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use fabstir_ocr_node::{
    api::{
        errors::ApiError,
        http_server::AppState,
        ocr::{handler::UNKNOWN_DIMENSIONS_WARNING, ocr_handler, OcrRequest},
    },
    config::NodeConfig,
    vision::{ImagePayload, InferenceEngine},
};
use mockall::{mock, predicate};
use std::sync::Arc;
use std::time::Duration;

// 1x1 red PNG - minimal valid image
const TINY_PNG_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8DwHwAFBQIAX8jx0gAAAABJRU5ErkJggg==";

// Valid base64 that is not a decodable image
const NOT_AN_IMAGE_BASE64: &str = "AAECAwQFBgc=";

mock! {
    pub Engine {}

    #[async_trait]
    impl InferenceEngine for Engine {
        async fn infer(&self, prompt: &str, image: &ImagePayload) -> anyhow::Result<String>;
        fn model_name(&self) -> &str;
        async fn health_check(&self) -> bool;
    }
}

/// Engine that never answers within the test timeout
struct StalledEngine;

#[async_trait]
impl InferenceEngine for StalledEngine {
    async fn infer(&self, _prompt: &str, _image: &ImagePayload) -> anyhow::Result<String> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(String::new())
    }

    fn model_name(&self) -> &str {
        "stalled"
    }
}

/// Helper: Mock engine returning `output` for any call
fn engine_returning(output: &'static str) -> MockEngine {
    let mut engine = MockEngine::new();
    engine
        .expect_infer()
        .returning(move |_, _| Ok(output.to_string()));
    engine.expect_model_name().return_const("mock-ocr".to_string());
    engine
}

/// Helper: State with the given engine attached
fn state_with(engine: impl InferenceEngine + 'static) -> AppState {
    AppState::new(NodeConfig::default(), Some(Arc::new(engine)))
}

fn request(image: &str) -> OcrRequest {
    OcrRequest {
        image: Some(image.to_string()),
        ..Default::default()
    }
}

#[cfg(test)]
mod ocr_handler_tests {
    use super::*;

    // =========================================================================
    // Request Validation Tests
    // =========================================================================

    #[tokio::test]
    async fn test_validation_error_missing_image() {
        let state = state_with(MockEngine::new());
        let result = ocr_handler(State(state), Json(OcrRequest::default())).await;

        let err = result.unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(err.to_string().contains("image"));
    }

    #[tokio::test]
    async fn test_validation_error_invalid_format() {
        let state = state_with(MockEngine::new());
        let request = OcrRequest {
            format: "pdf".to_string(),
            ..request(TINY_PNG_BASE64)
        };

        let err = ocr_handler(State(state), Json(request)).await.unwrap_err();
        assert!(matches!(err, ApiError::ValidationError { ref field, .. } if field == "format"));
    }

    #[tokio::test]
    async fn test_invalid_base64_rejected_before_inference() {
        // No expectations: any engine call fails the test
        let state = state_with(MockEngine::new());
        let err = ocr_handler(State(state), Json(request("not base64 !!")))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_no_engine_returns_503() {
        let state = AppState::new_for_test();
        let err = ocr_handler(State(state), Json(request(TINY_PNG_BASE64)))
            .await
            .unwrap_err();
        assert_eq!(
            err.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    // =========================================================================
    // Pipeline Tests
    // =========================================================================

    #[tokio::test]
    async fn test_find_ref_prompt_and_detection() {
        let mut engine = MockEngine::new();
        engine
            .expect_infer()
            .with(
                predicate::eq(
                    "<image>\n<|grounding|>\nLocate <|ref|>Revenue<|/ref|> in the image.",
                ),
                predicate::always(),
            )
            .times(1)
            .returning(|_, _| {
                Ok("<|ref|>Revenue<|/ref|><|det|>[[0, 0, 999, 999]]<|/det|>".to_string())
            });
        engine
            .expect_model_name()
            .return_const("mock-ocr".to_string());

        let request = OcrRequest {
            mode: "find_ref".to_string(),
            find_term: Some("Revenue".to_string()),
            ..request(TINY_PNG_BASE64)
        };

        let Json(response) = ocr_handler(State(state_with(engine)), Json(request))
            .await
            .unwrap();

        assert!(response.success);
        assert_eq!(response.display_text, "Revenue");
        assert_eq!(response.detections.len(), 1);
        assert_eq!(response.detections[0].label, "Revenue");
        assert_eq!(response.detections[0].bbox, [0, 0, 1, 1]);
        assert_eq!(response.image_dims.w, Some(1));
        assert_eq!(response.image_dims.h, Some(1));
        assert!(response.metadata.grounding);
        assert_eq!(response.metadata.mode, "find_ref");
        assert_eq!(response.metadata.model, "mock-ocr");
        assert!(response.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_vision_options_and_payload_forwarded() {
        let mut engine = MockEngine::new();
        engine
            .expect_infer()
            .withf(|_, image: &ImagePayload| {
                image.data == TINY_PNG_BASE64
                    && image.format == "png"
                    && image.options.base_size == 640
                    && !image.options.crop_mode
            })
            .times(1)
            .returning(|_, _| Ok("Hello".to_string()));
        engine
            .expect_model_name()
            .return_const("mock-ocr".to_string());

        let request = OcrRequest {
            image: Some(format!("data:image/png;base64,{}", TINY_PNG_BASE64)),
            base_size: 640,
            crop_mode: false,
            ..Default::default()
        };

        let Json(response) = ocr_handler(State(state_with(engine)), Json(request))
            .await
            .unwrap();
        assert_eq!(response.display_text, "Hello");
        assert_eq!(response.metadata.base_size, 640);
        assert!(!response.metadata.crop_mode);
        assert!(!response.metadata.grounding);
    }

    #[tokio::test]
    async fn test_undecodable_image_warns_and_uses_unit_dims() {
        let engine =
            engine_returning("<|ref|>Stamp<|/ref|><|det|>[[999, 999, 999, 999]]<|/det|>");
        let Json(response) = ocr_handler(
            State(state_with(engine)),
            Json(request(NOT_AN_IMAGE_BASE64)),
        )
        .await
        .unwrap();

        assert!(response.image_dims.w.is_none());
        assert!(response.image_dims.h.is_none());
        assert_eq!(response.detections[0].bbox, [1, 1, 1, 1]);
        assert_eq!(response.warnings, vec![UNKNOWN_DIMENSIONS_WARNING.to_string()]);
    }

    #[tokio::test]
    async fn test_empty_model_output() {
        let engine = engine_returning("   ");
        let Json(response) = ocr_handler(State(state_with(engine)), Json(request(TINY_PNG_BASE64)))
            .await
            .unwrap();
        assert_eq!(response.display_text, "No text returned by model.");
        assert_eq!(response.raw_text, "No text returned by model.");
    }

    // =========================================================================
    // Engine Failure Tests
    // =========================================================================

    #[tokio::test]
    async fn test_engine_error_returns_500() {
        let mut engine = MockEngine::new();
        engine
            .expect_infer()
            .returning(|_, _| Err(anyhow::anyhow!("sidecar returned 502")));
        engine
            .expect_model_name()
            .return_const("mock-ocr".to_string());

        let err = ocr_handler(State(state_with(engine)), Json(request(TINY_PNG_BASE64)))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InferenceFailed(ref msg) if msg.contains("502")));
        assert_eq!(err.status_code(), 500);
    }

    #[tokio::test]
    async fn test_engine_timeout_returns_504() {
        let config = NodeConfig {
            inference_timeout_secs: 1,
            ..Default::default()
        };
        let state = AppState::new(config, Some(Arc::new(StalledEngine)));

        let err = ocr_handler(State(state), Json(request(TINY_PNG_BASE64)))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Timeout));
        assert_eq!(
            err.into_response().status(),
            StatusCode::GATEWAY_TIMEOUT
        );
    }
}
