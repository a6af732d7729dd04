//! Document HTTP handlers.
//!
//! Endpoints:
//! - POST /api/v1/documents/load   - Index the configured data dir or a directory inside it
//! - GET  /api/v1/documents/search - Top-k chunk texts for a query

use std::path::{Path, PathBuf};
use std::time::Instant;

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;
use uuid::Uuid;

use dobi_types::document::{LoadReport, RetrievalMode};
use dobi_types::error::DocumentError;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct LoadRequest {
    /// Relative paths are taken from the data dir. The result must stay
    /// inside it.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    #[serde(default)]
    pub k: Option<usize>,
    #[serde(default)]
    pub mode: Option<String>,
}

/// POST /api/v1/documents/load
pub async fn load_documents(
    State(state): State<AppState>,
    body: Option<Json<LoadRequest>>,
) -> Result<Json<ApiResponse<LoadReport>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let requested = body.and_then(|Json(req)| req.directory);
    let dir = resolve_load_dir(&state.config.documents.data_dir, requested.as_deref()).await?;

    let report = state.documents.load(&dir).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    tracing::info!(
        request_id = %request_id,
        dir = %dir.display(),
        loaded = report.loaded.len(),
        failed = report.failed.len(),
        chunks = report.total_chunks(),
        "documents loaded"
    );
    Ok(Json(ApiResponse::success(report, request_id, elapsed)))
}

async fn canonical(path: &Path) -> Result<PathBuf, AppError> {
    tokio::fs::canonicalize(path)
        .await
        .map_err(|e| DocumentError::Io(format!("{}: {e}", path.display())).into())
}

/// Resolve the directory to index, refusing anything outside `data_dir`.
async fn resolve_load_dir(
    data_dir: &Path,
    requested: Option<&Path>,
) -> Result<PathBuf, AppError> {
    let root = canonical(data_dir).await?;
    let Some(requested) = requested else {
        return Ok(root);
    };

    let dir = canonical(&root.join(requested)).await?;
    if !dir.starts_with(&root) {
        return Err(AppError::Validation(format!(
            "directory must be inside {}",
            data_dir.display()
        )));
    }
    Ok(dir)
}

/// GET /api/v1/documents/search?q=&k=&mode=
pub async fn search_documents(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<String>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    if query.q.trim().is_empty() {
        return Err(AppError::Validation("query 'q' must not be empty".to_string()));
    }
    let k = query.k.unwrap_or(state.config.documents.top_k);
    let mode = match query.mode.as_deref() {
        Some(raw) => raw.parse::<RetrievalMode>().map_err(AppError::Validation)?,
        None => state.config.documents.retrieval_mode,
    };

    let texts = state.documents.query_with_mode(&query.q, k, mode).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(texts, request_id, elapsed)))
}
