// HTTP query service
// JSON endpoints over a shared, read-only AnswerService

pub mod errors;


pub use errors::ApiError;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::RagError;
use crate::database::CorpusSummary;
use crate::service::{Answer, AnswerService};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub question: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    pub chunks: usize,
    pub documents: usize,
}

#[inline]
pub fn router(service: Arc<AnswerService>) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/system-info", get(system_info))
        .route("/chat", post(chat))
        .with_state(service)
}

/// Serve until Ctrl+C
#[inline]
pub async fn serve(service: Arc<AnswerService>, address: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}

async fn health(State(service): State<Arc<AnswerService>>) -> Json<HealthResponse> {
    let summary = service.summary();
    Json(HealthResponse {
        status: "ok".to_string(),
        chunks: summary.total_chunks,
        documents: summary.total_documents,
    })
}

async fn system_info(State(service): State<Arc<AnswerService>>) -> Json<CorpusSummary> {
    Json(service.summary().clone())
}

async fn chat(
    State(service): State<Arc<AnswerService>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<Answer>, ApiError> {
    let Json(request) = payload?;
    if request.question.trim().is_empty() {
        return Err(RagError::EmptyQuestion.into());
    }

    info!("Question received ({} chars)", request.question.chars().count());
    let answer = tokio::task::spawn_blocking(move || service.ask(&request.question)).await??;
    info!(
        "Answered from {} chunks across {} sources",
        answer.debug.chunks_found,
        answer.sources.len()
    );

    Ok(Json(answer))
}
