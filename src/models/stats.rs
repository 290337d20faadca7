use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Typed view of an `allrepos_stats` document. Only the fields this service
/// reads are modelled; the overview endpoint serves the raw document.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoStatsSnapshot {
    #[serde(rename = "asOfYYYYMMDD")]
    pub as_of_yyyymmdd: String,
    #[serde(default)]
    pub repos: Vec<RepoStats>,
}

/// Per-repo entry. Leaf values are copied through as stored: a field that is
/// present (even `null`) is `Some`, a missing field is `None`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RepoStats {
    #[serde(rename = "repo_name", deserialize_with = "present")]
    pub repo_name: Option<Value>,
    #[serde(deserialize_with = "present")]
    pub forks: Option<Value>,
    #[serde(deserialize_with = "present")]
    pub stars: Option<Value>,
    #[serde(deserialize_with = "present")]
    pub num_contributors: Option<Value>,
    pub issues: Option<ActivityStats>,
    pub pull_requests: Option<ActivityStats>,
    pub commits: Option<CommitStats>,
    #[serde(deserialize_with = "present")]
    pub public: Option<Value>,
    #[serde(deserialize_with = "present")]
    pub osslifecycle: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActivityStats {
    #[serde(deserialize_with = "present")]
    pub open_count: Option<Value>,
    #[serde(deserialize_with = "present")]
    pub closed_count: Option<Value>,
    #[serde(deserialize_with = "present")]
    pub avg_time_to_close_in_days: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommitStats {
    #[serde(deserialize_with = "present")]
    pub days_since_last_commit: Option<Value>,
}

/// Keeps an explicit `null` as `Some(Value::Null)`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl RepoStats {
    pub fn name(&self) -> Option<&str> {
        self.repo_name.as_ref().and_then(Value::as_str)
    }
}

/// Flattened per-repo record. Fields absent from the snapshot are omitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoStatSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forks: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stars: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_contributors: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_open_count: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_closed_count: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_avg_close: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pr_open_count: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pr_closed_count: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pr_avg_close: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_since_last_commit: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub osslifecycle: Option<Value>,
}

impl From<&RepoStats> for RepoStatSummary {
    fn from(r: &RepoStats) -> Self {
        let issues = r.issues.as_ref();
        let prs = r.pull_requests.as_ref();
        Self {
            name: r.repo_name.clone(),
            forks: r.forks.clone(),
            stars: r.stars.clone(),
            num_contributors: r.num_contributors.clone(),
            issue_open_count: issues.and_then(|i| i.open_count.clone()),
            issue_closed_count: issues.and_then(|i| i.closed_count.clone()),
            issue_avg_close: issues.and_then(|i| i.avg_time_to_close_in_days.clone()),
            pr_open_count: prs.and_then(|p| p.open_count.clone()),
            pr_closed_count: prs.and_then(|p| p.closed_count.clone()),
            pr_avg_close: prs.and_then(|p| p.avg_time_to_close_in_days.clone()),
            days_since_last_commit: r
                .commits
                .as_ref()
                .and_then(|c| c.days_since_last_commit.clone()),
            public: r.public.clone(),
            osslifecycle: r.osslifecycle.clone(),
        }
    }
}

/// A per-repo record tagged with the snapshot date it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepoHistoryEntry {
    pub date: String,
    #[serde(flatten)]
    pub stats: RepoStatSummary,
}
