//! Named JSON operations over an [`IssueGateway`].
//!
//! Each operation takes a small JSON payload and answers with JSON. Errors
//! never escape: mutations answer `{"success": false, "error": ...}` and
//! reads answer an empty collection (or `null` for single lookups).

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::edit::validate_new_issue;
use crate::error::PanelError;
use crate::models::{FieldUpdate, NewIssue, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::settings::hidden_marker;
use crate::traits::IssueGateway;

/// Every operation name the resolver answers to
pub const OPERATIONS: &[&str] = &[
    "getListIssues",
    "getIssuesByKeys",
    "getIssue",
    "createIssue",
    "updateIssue",
    "deleteIssue",
    "transitionIssue",
    "getTransitions",
    "getIssueTypes",
    "getStatuses",
    "getAssignableUsers",
    "getProperty",
    "saveProperty",
    "deleteProperty",
];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListIssuesParams {
    #[serde(alias = "project")]
    project_key: String,
    #[serde(default, alias = "nextPageToken")]
    cursor: Option<String>,
    #[serde(default, alias = "maxResults")]
    page_size: Option<usize>,
}

/// Keys given either as an array or as one comma-separated string
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum KeyList {
    List(Vec<String>),
    Joined(String),
}

impl KeyList {
    fn into_keys(self) -> Vec<String> {
        let keys = match self {
            KeyList::List(keys) => keys,
            KeyList::Joined(joined) => joined.split(',').map(String::from).collect(),
        };
        keys.into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeysParams {
    #[serde(default)]
    issue_keys: Option<KeyList>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueKeyParams {
    issue_key: String,
}

#[derive(Debug, Deserialize)]
struct IdRef {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountRef {
    account_id: String,
}

#[derive(Debug, Default, Deserialize)]
struct CreateFields {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    issuetype: Option<IdRef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateIssueParams {
    #[serde(alias = "project")]
    project_key: String,
    #[serde(default)]
    fields: CreateFields,
}

#[derive(Debug, Default, Deserialize)]
struct UpdateFields {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    issuetype: Option<IdRef>,
    #[serde(default, deserialize_with = "present")]
    assignee: Option<Option<AccountRef>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateIssueParams {
    issue_key: String,
    #[serde(default)]
    fields: UpdateFields,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransitionParams {
    issue_key: String,
    transition_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectParams {
    #[serde(alias = "projectId", alias = "project")]
    project_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusesParams {
    #[serde(alias = "project")]
    project_key: String,
    #[serde(default)]
    issue_type_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssignableUsersParams {
    #[serde(alias = "project")]
    project_key: String,
    #[serde(default)]
    issue_key: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PropertyParams {
    #[serde(alias = "project")]
    project_key: String,
    property: String,
}

/// Distinguishes an explicit `null` from an absent field
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn parse<T: DeserializeOwned>(payload: Value) -> Result<T, String> {
    let payload = if payload.is_null() { json!({}) } else { payload };
    serde_json::from_value(payload).map_err(|e| format!("Invalid payload: {}", e))
}

fn success() -> Value {
    json!({ "success": true })
}

fn failure(message: impl Into<String>) -> Value {
    json!({ "success": false, "error": message.into() })
}

fn mutation(operation: &str, result: Result<(), PanelError>) -> Value {
    match result {
        Ok(()) => success(),
        Err(e) => {
            warn!(operation, error = %e, "operation failed");
            failure(e.to_string())
        }
    }
}

fn read<T>(
    operation: &str,
    result: Result<T, PanelError>,
    render: impl FnOnce(T) -> Value,
    empty: Value,
) -> Value {
    match result {
        Ok(value) => render(value),
        Err(e) => {
            warn!(operation, error = %e, "operation failed");
            empty
        }
    }
}

/// Parse an operation's payload or return early. Mutations answer a failure
/// envelope; reads pass the empty answer they would give on a tracker error.
macro_rules! params {
    ($payload:expr) => {
        match parse($payload) {
            Ok(params) => params,
            Err(message) => return failure(message),
        }
    };
    ($payload:expr, $empty:expr) => {
        match parse($payload) {
            Ok(params) => params,
            Err(message) => {
                warn!(error = %message, "rejected payload");
                return $empty;
            }
        }
    };
}

pub struct Resolver<'a> {
    gateway: &'a dyn IssueGateway,
}

impl<'a> Resolver<'a> {
    pub fn new(gateway: &'a dyn IssueGateway) -> Self {
        Self { gateway }
    }

    /// Run the operation `name` with `payload`
    pub fn invoke(&self, name: &str, payload: Value) -> Value {
        debug!(operation = name, "invoking operation");
        match name {
            "getListIssues" => self.get_list_issues(payload),
            "getIssuesByKeys" => self.get_issues_by_keys(payload),
            "getIssue" => self.get_issue(payload),
            "createIssue" => self.create_issue(payload),
            "updateIssue" => self.update_issue(payload),
            "deleteIssue" => self.delete_issue(payload),
            "transitionIssue" => self.transition_issue(payload),
            "getTransitions" => self.get_transitions(payload),
            "getIssueTypes" => self.get_issue_types(payload),
            "getStatuses" => self.get_statuses(payload),
            "getAssignableUsers" => self.get_assignable_users(payload),
            "getProperty" => self.get_property(payload),
            "saveProperty" => self.save_property(payload),
            "deleteProperty" => self.delete_property(payload),
            _ => failure(format!("Unknown operation: {}", name)),
        }
    }

    fn get_list_issues(&self, payload: Value) -> Value {
        let empty = json!({ "issues": [], "nextPageCursor": "", "isLast": true });
        let params: ListIssuesParams = params!(payload, empty);
        let cursor = params.cursor.unwrap_or_default();
        let page_size = params
            .page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        read(
            "getListIssues",
            self.gateway
                .list_root_issues(&params.project_key, &cursor, page_size),
            |page| json!(page),
            empty,
        )
    }

    fn get_issues_by_keys(&self, payload: Value) -> Value {
        let params: KeysParams = params!(payload, json!({ "issues": [] }));
        let keys = params
            .issue_keys
            .map(KeyList::into_keys)
            .unwrap_or_default();
        if keys.is_empty() {
            return json!({ "issues": [] });
        }
        read(
            "getIssuesByKeys",
            self.gateway.issues_by_keys(&keys),
            |issues| json!({ "issues": issues }),
            json!({ "issues": [] }),
        )
    }

    fn get_issue(&self, payload: Value) -> Value {
        let params: IssueKeyParams = params!(payload, Value::Null);
        read(
            "getIssue",
            self.gateway.get_issue(&params.issue_key),
            |issue| json!(issue),
            Value::Null,
        )
    }

    fn create_issue(&self, payload: Value) -> Value {
        let params: CreateIssueParams = params!(payload);
        let new = NewIssue {
            summary: params.fields.summary,
            description: params.fields.description,
            issue_type_id: params.fields.issuetype.map(|t| t.id).unwrap_or_default(),
        };
        let result = validate_new_issue(&new)
            .and_then(|valid| self.gateway.create_issue(&params.project_key, &valid));
        match result {
            Ok(created) => json!({ "success": true, "issue": created }),
            Err(e) => {
                warn!(operation = "createIssue", error = %e, "operation failed");
                failure(e.to_string())
            }
        }
    }

    fn update_issue(&self, payload: Value) -> Value {
        let params: UpdateIssueParams = params!(payload);
        let fields = params.fields;
        let update = FieldUpdate {
            summary: fields.summary,
            description: fields.description,
            issue_type_id: fields.issuetype.map(|t| t.id),
            assignee: fields
                .assignee
                .map(|assignee| assignee.map(|a| a.account_id)),
        };
        if update.is_empty() {
            return failure("No fields to update");
        }
        mutation(
            "updateIssue",
            self.gateway.update_issue(&params.issue_key, &update),
        )
    }

    fn delete_issue(&self, payload: Value) -> Value {
        let params: IssueKeyParams = params!(payload);
        mutation("deleteIssue", self.gateway.delete_issue(&params.issue_key))
    }

    fn transition_issue(&self, payload: Value) -> Value {
        let params: TransitionParams = params!(payload);
        mutation(
            "transitionIssue",
            self.gateway
                .transition_issue(&params.issue_key, &params.transition_id),
        )
    }

    fn get_transitions(&self, payload: Value) -> Value {
        let params: IssueKeyParams = params!(payload, json!({ "transitions": [] }));
        read(
            "getTransitions",
            self.gateway.get_transitions(&params.issue_key),
            |transitions| json!({ "transitions": transitions }),
            json!({ "transitions": [] }),
        )
    }

    fn get_issue_types(&self, payload: Value) -> Value {
        let params: ProjectParams = params!(payload, json!({ "issueTypes": [] }));
        read(
            "getIssueTypes",
            self.gateway.get_issue_types(&params.project_key),
            |types| json!({ "issueTypes": types }),
            json!({ "issueTypes": [] }),
        )
    }

    fn get_statuses(&self, payload: Value) -> Value {
        let params: StatusesParams = params!(payload, json!([]));
        read(
            "getStatuses",
            self.gateway
                .get_statuses(&params.project_key, params.issue_type_id.as_deref()),
            |statuses| json!(statuses),
            json!([]),
        )
    }

    fn get_assignable_users(&self, payload: Value) -> Value {
        let params: AssignableUsersParams = params!(payload, json!({ "users": [] }));
        read(
            "getAssignableUsers",
            self.gateway
                .get_assignable_users(&params.project_key, params.issue_key.as_deref()),
            |users| json!({ "users": users }),
            json!({ "users": [] }),
        )
    }

    fn get_property(&self, payload: Value) -> Value {
        let params: PropertyParams = params!(payload, Value::Null);
        read(
            "getProperty",
            self.gateway
                .get_property(&params.project_key, &params.property),
            |property| json!(property),
            Value::Null,
        )
    }

    fn save_property(&self, payload: Value) -> Value {
        let params: PropertyParams = params!(payload);
        mutation(
            "saveProperty",
            self.gateway
                .save_property(&params.project_key, &params.property, &hidden_marker()),
        )
    }

    fn delete_property(&self, payload: Value) -> Value {
        let params: PropertyParams = params!(payload);
        mutation(
            "deleteProperty",
            self.gateway
                .delete_property(&params.project_key, &params.property),
        )
    }
}
