// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP server: shared state, router and service endpoints

use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use super::ocr::{ocr_handler, ocr_upload_handler};
use crate::config::NodeConfig;
use crate::ocr::{instruction_for, OcrMode, PromptRequest};
use crate::version;
use crate::vision::InferenceEngine;

/// Request bodies carry base64 images up to 10MB decoded
const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RwLock<Option<Arc<dyn InferenceEngine>>>>,
    pub config: Arc<NodeConfig>,
}

impl AppState {
    pub fn new(config: NodeConfig, engine: Option<Arc<dyn InferenceEngine>>) -> Self {
        Self {
            engine: Arc::new(RwLock::new(engine)),
            config: Arc::new(config),
        }
    }

    /// State with default config and no engine attached
    pub fn new_for_test() -> Self {
        Self::new(NodeConfig::default(), None)
    }

    pub async fn engine(&self) -> Option<Arc<dyn InferenceEngine>> {
        self.engine.read().await.clone()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
    pub version: String,
    pub build: String,
    pub docs: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
    pub model: Option<String>,
    /// Version, build, date and feature list
    pub version: serde_json::Value,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeInfo {
    pub name: String,
    pub requires_grounding: bool,
    /// Instruction sent with default parameters
    pub instruction: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModesResponse {
    pub modes: Vec<ModeInfo>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/v1/modes", get(modes_handler))
        .route("/v1/ocr", post(ocr_handler))
        .route("/api/ocr", post(ocr_upload_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the router until ctrl-c or SIGTERM
pub async fn start_server(state: AppState) -> Result<()> {
    let addr = state.config.listen_addr()?;
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("OCR API listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Resolves on ctrl-c or, on unix, SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}

async fn root_handler() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Fabstir OCR Node".to_string(),
        version: version::VERSION_NUMBER.to_string(),
        build: version::VERSION.to_string(),
        docs: "/v1/modes".to_string(),
    })
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let engine = state.engine().await;
    let healthy = match &engine {
        Some(engine) => engine.health_check().await,
        None => false,
    };

    Json(HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        model_loaded: engine.is_some(),
        model: engine.map(|e| e.model_name().to_string()),
        version: version::get_version_info(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

async fn modes_handler() -> Json<ModesResponse> {
    let modes = OcrMode::ALL
        .iter()
        .map(|&mode| ModeInfo {
            name: mode.as_str().to_string(),
            requires_grounding: mode.requires_grounding(),
            instruction: instruction_for(&PromptRequest::new(mode)),
        })
        .collect();
    Json(ModesResponse { modes })
}
