use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::error::AppError;
use crate::models::ownership::{Org, RepoOwnership};
use crate::state::Backends;
use crate::store::OwnershipStore;

/// Reads and writes ownership records through the bootstrapped store.
#[derive(Clone)]
pub struct OwnershipRepository {
    backends: Backends,
    timeout: Duration,
}

impl OwnershipRepository {
    pub fn new(backends: Backends, timeout: Duration) -> Self {
        Self { backends, timeout }
    }

    fn store(&self) -> Result<Arc<dyn OwnershipStore>, AppError> {
        self.backends
            .store()
            .ok_or_else(|| AppError::StoreUnavailable("store connection not established".into()))
    }

    /// Deadline for reads. Writes are bounded inside the store so that a
    /// reported failure means the row was not written.
    async fn bounded<T>(
        &self,
        op: &str,
        fut: impl Future<Output = Result<T, AppError>>,
    ) -> Result<T, AppError> {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| {
                AppError::StoreUnavailable(format!("{} timed out after {:?}", op, self.timeout))
            })?
    }

    pub async fn list_repos(&self) -> Result<Vec<RepoOwnership>, AppError> {
        let store = self.store()?;
        self.bounded("select repo_info", store.select_repos()).await
    }

    pub async fn list_orgs(&self) -> Result<Vec<Org>, AppError> {
        let store = self.store()?;
        self.bounded("select repo_orgs", store.select_orgs()).await
    }

    /// Last write wins. Lead ids are expected to be validated by the caller.
    pub async fn upsert_ownership(&self, record: RepoOwnership) -> Result<(), AppError> {
        let store = self.store()?;
        store.upsert_repo(record).await
    }
}
