//! Identity lookup for lead name resolution and typeahead.
//!
//! The shipped deployment has no real employee directory, so the default
//! variant serves a fixed set of synthetic users. Setting `DIRECTORY_URL`
//! switches to an HTTP-backed directory.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::index_client::build_http_client;
use crate::models::identity::{DirectoryRecord, UserIdentity};

#[async_trait]
pub trait IdentityDirectory: Send + Sync + 'static {
    /// `DirectoryUnavailable` means the directory could not be asked; an
    /// empty list means it answered with nobody.
    async fn list_users(&self) -> Result<Vec<UserIdentity>, AppError>;
}

pub fn directory_from_config(config: &AppConfig) -> Arc<dyn IdentityDirectory> {
    match &config.directory_url {
        Some(url) => {
            tracing::info!(url = %url, "Using HTTP identity directory");
            Arc::new(HttpDirectory::new(url.clone(), config.index_timeout()))
        }
        None => {
            tracing::info!("Using static identity directory");
            Arc::new(StaticDirectory::default())
        }
    }
}

pub struct StaticDirectory {
    users: Vec<UserIdentity>,
}

impl StaticDirectory {
    pub fn new(users: Vec<UserIdentity>) -> Self {
        Self { users }
    }
}

impl Default for StaticDirectory {
    fn default() -> Self {
        let user = |id: &str, n: u8, name: &str| UserIdentity {
            employee_id: id.to_string(),
            github_id: format!("ghId{}", n),
            email: format!("user{}@netflix.com", n),
            name: name.to_string(),
        };
        Self::new(vec![
            user("111111", 1, "User One"),
            user("222222", 2, "User Two"),
            user("333333", 3, "User Three"),
        ])
    }
}

#[async_trait]
impl IdentityDirectory for StaticDirectory {
    async fn list_users(&self) -> Result<Vec<UserIdentity>, AppError> {
        Ok(self.users.clone())
    }
}

pub struct HttpDirectory {
    url: String,
    client: reqwest::Client,
}

impl HttpDirectory {
    pub fn new(url: String, timeout: std::time::Duration) -> Self {
        Self {
            url,
            client: build_http_client(timeout),
        }
    }
}

#[async_trait]
impl IdentityDirectory for HttpDirectory {
    async fn list_users(&self) -> Result<Vec<UserIdentity>, AppError> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| AppError::DirectoryUnavailable(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(AppError::DirectoryUnavailable(format!(
                "directory answered status {}",
                resp.status()
            )));
        }
        let records: Vec<DirectoryRecord> = resp
            .json()
            .await
            .map_err(|e| AppError::DirectoryUnavailable(format!("error parsing response: {}", e)))?;
        tracing::debug!(count = records.len(), "Fetched directory users");
        Ok(records.into_iter().map(UserIdentity::from).collect())
    }
}

pub fn find_by_employee_id<'a>(users: &'a [UserIdentity], id: &str) -> Option<&'a UserIdentity> {
    users.iter().find(|u| u.employee_id == id)
}

/// Display name for an employee id, or the id itself when nobody matches.
pub fn display_name(users: &[UserIdentity], id: &str) -> String {
    find_by_employee_id(users, id)
        .map(|u| u.name.clone())
        .unwrap_or_else(|| id.to_string())
}

pub fn employee_id_for_name<'a>(users: &'a [UserIdentity], name: &str) -> Option<&'a str> {
    users
        .iter()
        .find(|u| u.name == name)
        .map(|u| u.employee_id.as_str())
}

/// Rejects a write whose dev or manager lead is not a known employee id.
pub async fn validate_leads(
    directory: &dyn IdentityDirectory,
    dev_lead: &str,
    mgr_lead: &str,
) -> Result<(), AppError> {
    let users = directory.list_users().await?;
    let unknown: Vec<String> = [("devLead", dev_lead), ("mgrLead", mgr_lead)]
        .iter()
        .filter(|(_, id)| find_by_employee_id(&users, id).is_none())
        .map(|(field, id)| format!("{} '{}' is not a known employee", field, id))
        .collect();

    if unknown.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(unknown.join("; ")))
    }
}
