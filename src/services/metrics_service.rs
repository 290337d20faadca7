use serde_json::Value;

use crate::error::AppError;
use crate::index_client::IndexClient;
use crate::models::stats::{RepoHistoryEntry, RepoStatSummary, RepoStatsSnapshot};
use crate::state::Backends;

/// Resolves the newest stats snapshot from the index and reshapes it.
#[derive(Clone)]
pub struct MetricsAggregator {
    backends: Backends,
    index: IndexClient,
}

impl MetricsAggregator {
    pub fn new(backends: Backends, index: IndexClient) -> Self {
        Self { backends, index }
    }

    fn host(&self) -> Result<&str, AppError> {
        self.backends
            .index_host()
            .ok_or_else(|| AppError::IndexUnreachable("index host not resolved".into()))
    }

    /// The newest document exactly as stored.
    pub async fn fetch_latest_document(&self) -> Result<Value, AppError> {
        let host = self.host()?;
        self.index
            .search_latest(host, 1)
            .await?
            .into_iter()
            .next()
            .ok_or(AppError::NoSnapshotAvailable)
    }

    pub async fn fetch_latest_snapshot(&self) -> Result<RepoStatsSnapshot, AppError> {
        let doc = self.fetch_latest_document().await?;
        serde_json::from_value(doc)
            .map_err(|e| AppError::IndexQueryFailed(format!("malformed stats document: {}", e)))
    }

    pub async fn list_per_repo_stats(&self) -> Result<Vec<RepoStatSummary>, AppError> {
        let snapshot = self.fetch_latest_snapshot().await?;
        Ok(snapshot.repos.iter().map(RepoStatSummary::from).collect())
    }

    /// Averages and totals are computed at ingestion, so this is a passthrough.
    pub async fn fetch_overview(&self) -> Result<Value, AppError> {
        self.fetch_latest_document().await
    }

    /// Entries for `repo_name` in the latest snapshot, each tagged with its date.
    pub async fn fetch_repo_history(
        &self,
        repo_name: &str,
    ) -> Result<Vec<RepoHistoryEntry>, AppError> {
        let snapshot = self.fetch_latest_snapshot().await?;
        Ok(history_for(&snapshot, repo_name))
    }
}

fn history_for(snapshot: &RepoStatsSnapshot, repo_name: &str) -> Vec<RepoHistoryEntry> {
    snapshot
        .repos
        .iter()
        .filter(|r| r.name() == Some(repo_name))
        .map(|r| RepoHistoryEntry {
            date: snapshot.as_of_yyyymmdd.clone(),
            stats: RepoStatSummary::from(r),
        })
        .collect()
}
