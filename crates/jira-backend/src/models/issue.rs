use serde::{Deserialize, Serialize};

use super::user::JiraUser;
use super::workflow::JiraStatus;

/// Jira issue
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraIssue {
    /// Internal numeric ID
    pub id: String,
    /// Issue key (e.g., "PROJ-123")
    pub key: String,
    /// Self URL
    #[serde(rename = "self")]
    pub self_url: Option<String>,
    /// Issue fields (limited to the requested projection)
    pub fields: JiraIssueFields,
}

/// Issue fields container
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraIssueFields {
    /// Issue summary/title
    #[serde(default)]
    pub summary: String,
    /// Issue description in ADF format
    pub description: Option<serde_json::Value>,
    /// Issue status
    pub status: JiraStatus,
    /// Issue type
    pub issuetype: JiraIssueType,
    /// Assignee
    pub assignee: Option<JiraUser>,
    /// Subtasks
    #[serde(default)]
    pub subtasks: Vec<JiraIssueRef>,
    /// Parent issue (if this is a subtask)
    pub parent: Option<JiraIssueRef>,
}

/// Issue reference (used in subtasks and parent)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraIssueRef {
    /// Internal ID
    pub id: Option<String>,
    /// Issue key
    pub key: String,
    /// Self URL
    #[serde(rename = "self")]
    pub self_url: Option<String>,
}

/// Issue type
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraIssueType {
    /// Type ID
    pub id: Option<String>,
    /// Type name
    pub name: String,
    /// Icon shown next to the type
    pub icon_url: Option<String>,
    /// Whether this is a subtask type
    #[serde(default)]
    pub subtask: bool,
}

/// Cursor-paginated search response from `/search/jql`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraSearchResult {
    /// Issues in this page
    #[serde(default)]
    pub issues: Vec<JiraIssue>,
    /// Token for the next page, absent on the last page
    pub next_page_token: Option<String>,
    /// Whether this is the last page
    pub is_last: Option<bool>,
}

/// Issue types creatable in a project (`/issue/createmeta/{project}/issuetypes`)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraIssueTypesPage {
    #[serde(default, alias = "values")]
    pub issue_types: Vec<JiraIssueType>,
}

/// Request to create an issue
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJiraIssue {
    pub fields: CreateJiraIssueFields,
}

/// Fields for issue creation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJiraIssueFields {
    /// Project (by key)
    pub project: KeyRef,
    /// Summary
    pub summary: String,
    /// Description in ADF format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<serde_json::Value>,
    /// Issue type
    pub issuetype: IdRef,
}

/// Response to issue creation
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedJiraIssue {
    pub id: String,
    pub key: String,
}

/// Request to update an issue
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJiraIssue {
    pub fields: UpdateJiraIssueFields,
}

/// Fields for issue update
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJiraIssueFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuetype: Option<IdRef>,
    /// `Some(None)` serializes as `null`, which unassigns
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<Option<AccountRef>>,
}

/// Reference by id in requests
#[derive(Debug, Clone, Serialize)]
pub struct IdRef {
    pub id: String,
}

/// Reference by key in requests
#[derive(Debug, Clone, Serialize)]
pub struct KeyRef {
    pub key: String,
}

/// Reference to a user account in requests
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRef {
    pub account_id: String,
}

/// Helper to create text description in ADF format
pub fn text_to_adf(text: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "doc",
        "version": 1,
        "content": [
            {
                "type": "paragraph",
                "content": [
                    {
                        "type": "text",
                        "text": text
                    }
                ]
            }
        ]
    })
}

/// Extract plain text from ADF document
pub fn adf_to_text(adf: &serde_json::Value) -> String {
    fn extract_text(value: &serde_json::Value) -> String {
        match value {
            serde_json::Value::Object(obj) => {
                if let Some(text) = obj.get("text").and_then(|t| t.as_str()) {
                    return text.to_string();
                }
                if let Some(content) = obj.get("content") {
                    return extract_text(content);
                }
                String::new()
            }
            serde_json::Value::Array(arr) => {
                arr.iter().map(extract_text).collect::<Vec<_>>().join("")
            }
            serde_json::Value::String(s) => s.clone(),
            _ => String::new(),
        }
    }
    extract_text(adf)
}
