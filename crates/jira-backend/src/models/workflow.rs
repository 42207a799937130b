use serde::{Deserialize, Serialize};

/// Issue status
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraStatus {
    pub id: String,
    pub name: String,
    pub status_category: Option<JiraStatusCategory>,
}

/// Status category ("new", "indeterminate", "done")
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JiraStatusCategory {
    pub key: String,
    pub name: Option<String>,
}

/// Workflow transition available from the current status
#[derive(Debug, Clone, Deserialize)]
pub struct JiraTransition {
    pub id: String,
    pub name: String,
    pub to: JiraStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JiraTransitionsResponse {
    #[serde(default)]
    pub transitions: Vec<JiraTransition>,
}

/// Request body for `POST /issue/{key}/transitions`
#[derive(Debug, Clone, Serialize)]
pub struct DoJiraTransition {
    pub transition: super::IdRef,
}

/// One entry of `GET /project/{key}/statuses`: the statuses used by an issue type
#[derive(Debug, Clone, Deserialize)]
pub struct JiraIssueTypeStatuses {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub statuses: Vec<JiraStatus>,
}
