use std::time::Duration;

use async_trait::async_trait;
use scylla::prepared_statement::PreparedStatement;
use scylla::transport::errors::QueryError;
use scylla::transport::execution_profile::ExecutionProfile;
use scylla::{Session, SessionBuilder};

use super::OwnershipStore;
use crate::error::AppError;
use crate::models::ownership::{Org, RepoOwnership};

const SELECT_ALL_FROM_REPO_INFO: &str =
    "SELECT gh_repo_name, org_short, dev_lead_empid, mgr_lead_empid FROM repo_info";
const SELECT_ALL_FROM_REPO_ORGS: &str = "SELECT org_short, org_description FROM repo_orgs";
// CQL INSERT overwrites an existing row with the same key.
const INSERT_INTO_REPO_INFO: &str = "INSERT INTO repo_info \
     (gh_repo_name, org_short, dev_lead_empid, mgr_lead_empid) VALUES (?, ?, ?, ?)";

type OptText = Option<String>;

/// Ownership tables in a CQL keyspace. Tables are provisioned out of band.
pub struct CqlStore {
    session: Session,
    select_repos: PreparedStatement,
    select_orgs: PreparedStatement,
    upsert: PreparedStatement,
}

impl CqlStore {
    pub async fn connect(
        contact_points: &[String],
        keyspace: &str,
        request_timeout: Duration,
    ) -> anyhow::Result<Self> {
        if contact_points.is_empty() {
            anyhow::bail!("no store host configured (CASS_HOST)");
        }

        let profile = ExecutionProfile::builder()
            .request_timeout(Some(request_timeout))
            .build();
        let session: Session = SessionBuilder::new()
            .known_nodes(contact_points)
            .connection_timeout(request_timeout)
            .use_keyspace(keyspace, false)
            .default_execution_profile_handle(profile.into_handle())
            .build()
            .await?;

        let select_repos = session.prepare(SELECT_ALL_FROM_REPO_INFO).await?;
        let select_orgs = session.prepare(SELECT_ALL_FROM_REPO_ORGS).await?;
        let upsert = session.prepare(INSERT_INTO_REPO_INFO).await?;

        Ok(Self {
            session,
            select_repos,
            select_orgs,
            upsert,
        })
    }
}

fn query_error(e: QueryError) -> AppError {
    match e {
        QueryError::RequestTimeout(msg) => {
            AppError::StoreUnavailable(format!("store request timed out: {}", msg))
        }
        other => AppError::Query(other.to_string()),
    }
}

#[async_trait]
impl OwnershipStore for CqlStore {
    async fn select_repos(&self) -> Result<Vec<RepoOwnership>, AppError> {
        let result = self
            .session
            .execute_unpaged(&self.select_repos, ())
            .await
            .map_err(query_error)?;
        let rows = result
            .rows_typed::<(OptText, OptText, OptText, OptText)>()
            .map_err(|e| AppError::Query(e.to_string()))?;

        rows.map(|row| {
            let (repo_name, org_short, dev_lead, mgr_lead) =
                row.map_err(|e| AppError::Query(e.to_string()))?;
            Ok(RepoOwnership {
                repo_name: repo_name.unwrap_or_default(),
                org_short: org_short.unwrap_or_default(),
                dev_lead_id: dev_lead.unwrap_or_default(),
                mgr_lead_id: mgr_lead.unwrap_or_default(),
            })
        })
        .collect()
    }

    async fn select_orgs(&self) -> Result<Vec<Org>, AppError> {
        let result = self
            .session
            .execute_unpaged(&self.select_orgs, ())
            .await
            .map_err(query_error)?;
        let rows = result
            .rows_typed::<(OptText, OptText)>()
            .map_err(|e| AppError::Query(e.to_string()))?;

        rows.map(|row| {
            let (org_short, org_description) = row.map_err(|e| AppError::Query(e.to_string()))?;
            Ok(Org {
                org_short: org_short.unwrap_or_default(),
                org_description: org_description.unwrap_or_default(),
            })
        })
        .collect()
    }

    async fn upsert_repo(&self, record: RepoOwnership) -> Result<(), AppError> {
        tracing::debug!(repo = %record.repo_name, "Upserting repo_info row");
        self.session
            .execute_unpaged(
                &self.upsert,
                (
                    record.repo_name,
                    record.org_short,
                    record.dev_lead_id,
                    record.mgr_lead_id,
                ),
            )
            .await
            .map_err(query_error)?;
        Ok(())
    }
}
