use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Page size used by the issue panel when nothing else is configured
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Largest page the search endpoint is asked for
pub const MAX_PAGE_SIZE: usize = 100;

/// Issue as shown in the panel (the fixed list projection)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// Internal numeric ID
    pub id: String,
    /// Issue key (e.g., "PROJ-123")
    pub key: String,
    pub issue_type: IssueType,
    pub summary: String,
    /// Plain-text description, only present when the tracker returned one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: Status,
    #[serde(default)]
    pub assignee: Option<User>,
    /// Keys of the direct subtasks, in tracker order
    #[serde(default)]
    pub subtasks: Vec<String>,
    /// Key of the parent issue, if this issue is a subtask
    #[serde(default)]
    pub parent: Option<String>,
}

impl Issue {
    pub fn has_subtasks(&self) -> bool {
        !self.subtasks.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueType {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub id: String,
    pub name: String,
    /// Status category key ("new", "indeterminate", "done")
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub account_id: String,
    pub display_name: String,
    /// Avatar URLs keyed by size ("16x16", "48x48", ...)
    #[serde(default)]
    pub avatar_urls: BTreeMap<String, String>,
}

/// A root issue annotated with its fetched subtasks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueNode {
    #[serde(flatten)]
    pub issue: Issue,
    #[serde(default)]
    pub children: Vec<Issue>,
}

impl IssueNode {
    pub fn leaf(issue: Issue) -> Self {
        Self {
            issue,
            children: Vec::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.issue.key
    }
}

/// One page of root issues as returned by the listing call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuePage {
    pub issues: Vec<Issue>,
    /// Cursor for the following page, empty when there is none
    pub next_page_cursor: String,
    pub is_last: bool,
}

/// One page of root issues with their children attached
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreePage {
    pub issues: Vec<IssueNode>,
    pub next_page_cursor: String,
    pub is_last: bool,
}

/// Workflow transition available on an issue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    pub id: String,
    pub name: String,
    /// Status the issue ends up in after the transition
    pub to: Status,
}

/// Issue type that can be created in a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueTypeInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub subtask: bool,
}

/// Minimal handle returned after creating an issue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedIssue {
    pub id: String,
    pub key: String,
}

/// Fields for a new issue
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewIssue {
    pub summary: String,
    pub description: Option<String>,
    pub issue_type_id: String,
}

/// Field changes sent to the tracker in a single update call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldUpdate {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub issue_type_id: Option<String>,
    /// `Some(None)` clears the assignee
    pub assignee: Option<Option<String>>,
}

impl FieldUpdate {
    pub fn is_empty(&self) -> bool {
        self.summary.is_none()
            && self.description.is_none()
            && self.issue_type_id.is_none()
            && self.assignee.is_none()
    }
}

/// Value stored under a project property key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectProperty {
    pub key: String,
    pub value: serde_json::Value,
}

/// Completion of a mutation: success flag, human message and the issue it concerned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationOutcome {
    pub success: bool,
    pub message: String,
    pub issue_key: Option<String>,
    /// Set when the tracker was modified, which a failed multi-step edit
    /// can still have done
    #[serde(skip)]
    pub wrote: bool,
}

impl MutationOutcome {
    pub fn succeeded(message: impl Into<String>, issue_key: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            issue_key: Some(issue_key.into()),
            wrote: true,
        }
    }

    pub fn failed(message: impl Into<String>, issue_key: Option<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            issue_key,
            wrote: false,
        }
    }

    /// Mark a failure that happened after an earlier step was persisted
    pub fn after_partial_write(mut self) -> Self {
        self.wrote = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagKind {
    Success,
    Error,
}

/// User-visible notification raised by a mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flag {
    pub id: u64,
    pub kind: FlagKind,
    pub title: String,
    pub description: String,
    pub created: DateTime<Utc>,
}
