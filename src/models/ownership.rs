use serde::{Deserialize, Serialize};

/// One row of `repo_info`, serialized in the shape the dashboard reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoOwnership {
    #[serde(rename = "name")]
    pub repo_name: String,
    #[serde(rename = "orgName")]
    pub org_short: String,
    #[serde(rename = "mgrLead")]
    pub mgr_lead_id: String,
    #[serde(rename = "devLead")]
    pub dev_lead_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Org {
    #[serde(rename = "orgName")]
    pub org_short: String,
    #[serde(rename = "orgDesc")]
    pub org_description: String,
}

/// Body of `POST /repos/{repoName}`, either JSON or form-encoded.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOwnershipRequest {
    pub repo_org: String,
    pub mgr_lead: String,
    pub dev_lead: String,
}

impl UpdateOwnershipRequest {
    pub fn into_record(self, repo_name: String) -> RepoOwnership {
        RepoOwnership {
            repo_name,
            org_short: self.repo_org,
            mgr_lead_id: self.mgr_lead,
            dev_lead_id: self.dev_lead,
        }
    }
}
