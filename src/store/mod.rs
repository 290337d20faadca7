pub mod cql;
pub mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{AppConfig, StoreBackend, KEYSPACE};
use crate::error::AppError;
use crate::models::ownership::{Org, RepoOwnership};

pub use cql::CqlStore;
pub use sqlite::SqliteStore;

/// Tabular store holding ownership and organization records.
#[async_trait]
pub trait OwnershipStore: Send + Sync + 'static {
    async fn select_repos(&self) -> Result<Vec<RepoOwnership>, AppError>;

    async fn select_orgs(&self) -> Result<Vec<Org>, AppError>;

    /// Insert or overwrite the row keyed by `record.repo_name`.
    async fn upsert_repo(&self, record: RepoOwnership) -> Result<(), AppError>;
}

/// Human-readable location of the configured store, for logs.
pub fn describe(config: &AppConfig) -> String {
    match config.store_backend {
        StoreBackend::Cql => format!(
            "cql://{}/{}",
            config.store_contact_points().join(","),
            KEYSPACE
        ),
        StoreBackend::Sqlite => config.store_path().display().to_string(),
    }
}

/// Opens the backend selected by `config.store_backend`.
pub async fn connect(config: &AppConfig) -> anyhow::Result<Arc<dyn OwnershipStore>> {
    let store: Arc<dyn OwnershipStore> = match config.store_backend {
        StoreBackend::Cql => Arc::new(
            CqlStore::connect(
                &config.store_contact_points(),
                KEYSPACE,
                config.store_timeout(),
            )
            .await?,
        ),
        StoreBackend::Sqlite => {
            Arc::new(SqliteStore::open(&config.store_path(), config.store_timeout()).await?)
        }
    };
    Ok(store)
}
