use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::{params, Connection};

use super::OwnershipStore;
use crate::error::AppError;
use crate::models::ownership::{Org, RepoOwnership};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS repo_info (
        gh_repo_name TEXT PRIMARY KEY,
        org_short TEXT NOT NULL,
        dev_lead_empid TEXT NOT NULL,
        mgr_lead_empid TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS repo_orgs (
        org_short TEXT PRIMARY KEY,
        org_description TEXT NOT NULL
    );
";

const SELECT_ALL_FROM_REPO_INFO: &str =
    "SELECT gh_repo_name, org_short, dev_lead_empid, mgr_lead_empid FROM repo_info";
const SELECT_ALL_FROM_REPO_ORGS: &str = "SELECT org_short, org_description FROM repo_orgs";
const UPSERT_REPO_INFO: &str = "
    INSERT INTO repo_info (gh_repo_name, org_short, dev_lead_empid, mgr_lead_empid)
    VALUES (?1, ?2, ?3, ?4)
    ON CONFLICT(gh_repo_name) DO UPDATE SET
        org_short = excluded.org_short,
        dev_lead_empid = excluded.dev_lead_empid,
        mgr_lead_empid = excluded.mgr_lead_empid";

pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// `busy_timeout` bounds how long a statement waits on another writer's
    /// lock before failing with `StoreUnavailable`.
    pub async fn open(path: &Path, busy_timeout: Duration) -> anyhow::Result<Self> {
        let open_path = path.to_path_buf();
        let conn = tokio::task::spawn_blocking(move || -> anyhow::Result<Connection> {
            if let Some(parent) = open_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let conn = Connection::open(&open_path)?;
            conn.busy_timeout(busy_timeout)?;
            conn.execute_batch("PRAGMA journal_mode = WAL;")?;
            conn.execute_batch(SCHEMA)?;
            Ok(conn)
        })
        .await??;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, AppError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, rusqlite::Error> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| AppError::Internal("store connection lock poisoned".into()))?;
            f(&guard).map_err(AppError::from)
        })
        .await?
    }
}

#[async_trait]
impl OwnershipStore for SqliteStore {
    async fn select_repos(&self) -> Result<Vec<RepoOwnership>, AppError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare_cached(SELECT_ALL_FROM_REPO_INFO)?;
            let rows = stmt.query_map([], |row| {
                Ok(RepoOwnership {
                    repo_name: row.get(0)?,
                    org_short: row.get(1)?,
                    dev_lead_id: row.get(2)?,
                    mgr_lead_id: row.get(3)?,
                })
            })?;
            rows.collect()
        })
        .await
    }

    async fn select_orgs(&self) -> Result<Vec<Org>, AppError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare_cached(SELECT_ALL_FROM_REPO_ORGS)?;
            let rows = stmt.query_map([], |row| {
                Ok(Org {
                    org_short: row.get(0)?,
                    org_description: row.get(1)?,
                })
            })?;
            rows.collect()
        })
        .await
    }

    async fn upsert_repo(&self, record: RepoOwnership) -> Result<(), AppError> {
        tracing::debug!(
            repo = %record.repo_name,
            org = %record.org_short,
            "Upserting repo_info row"
        );
        self.with_conn(move |conn| {
            conn.execute(
                UPSERT_REPO_INFO,
                params![
                    record.repo_name,
                    record.org_short,
                    record.dev_lead_id,
                    record.mgr_lead_id
                ],
            )
            .map(|_| ())
        })
        .await
    }
}
