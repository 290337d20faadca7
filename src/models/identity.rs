use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    pub employee_id: String,
    pub github_id: String,
    pub email: String,
    pub name: String,
}

/// Record shape served by the external employee directory.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryRecord {
    pub emp_id: String,
    pub emp_gh_id: String,
    pub emp_email: String,
    pub emp_first_name: String,
    pub emp_last_name: String,
}

impl From<DirectoryRecord> for UserIdentity {
    fn from(r: DirectoryRecord) -> Self {
        Self {
            employee_id: r.emp_id,
            github_id: r.emp_gh_id,
            email: r.emp_email,
            name: format!("{} {}", r.emp_first_name, r.emp_last_name),
        }
    }
}
