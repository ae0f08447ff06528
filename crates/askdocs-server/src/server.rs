use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use askdocs_core::RAGEngine;
use askdocs_pipeline::Pipeline;
use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::{
    ApiError,
    protocol::{ChatRequest, ChatResponse},
};

/// Shared, process-wide handles injected into every request
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub rag: Arc<dyn RAGEngine>,
}

impl AppState {
    pub fn new(pipeline: Arc<Pipeline>, rag: Arc<dyn RAGEngine>) -> Self {
        Self { pipeline, rag }
    }
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

pub fn app_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/chat", post(chat))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn run_server(config: ServerConfig, state: AppState) -> anyhow::Result<()> {
    let app = app_router(state);
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| "invalid host/port for askdocs server")?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("askdocs listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match state.rag.stats().await {
        Ok(stats) => Json(json!({"status": "ok", "service": "askdocs", "rag": stats})),
        Err(e) => {
            warn!(error = %e, "rag stats unavailable");
            Json(json!({"status": "degraded", "service": "askdocs", "rag": {"error": e.to_string()}}))
        }
    }
}

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let record = request.into_record()?;
    let history_len = record.messages.len().saturating_sub(1);
    info!(history = history_len, "chat request");

    let record = state.pipeline.invoke(record).await?;
    let response = record
        .answer()
        .map(str::to_string)
        .ok_or_else(|| askdocs_core::Error::InvalidState("no answer produced".to_string()))?;

    Ok(Json(ChatResponse { response }))
}
