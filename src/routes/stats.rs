use axum::extract::{Path, State};
use axum::Json;
use serde_json::Value;

use crate::error::AppError;
use crate::models::stats::{RepoHistoryEntry, RepoStatSummary};
use crate::state::AppState;

pub async fn list_repo_stats(
    State(state): State<AppState>,
) -> Result<Json<Vec<RepoStatSummary>>, AppError> {
    let repos = state.metrics.list_per_repo_stats().await?;
    Ok(Json(repos))
}

pub async fn overview(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    Ok(Json(state.metrics.fetch_overview().await?))
}

pub async fn repo_history(
    State(state): State<AppState>,
    Path(repo_name): Path<String>,
) -> Result<Json<Vec<RepoHistoryEntry>>, AppError> {
    let entries = state.metrics.fetch_repo_history(&repo_name).await?;
    if entries.is_empty() {
        tracing::debug!(repo = %repo_name, "Repo absent from latest snapshot");
    }
    Ok(Json(entries))
}
