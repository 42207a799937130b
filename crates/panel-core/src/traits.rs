use crate::error::Result;
use crate::models::*;

/// Operations the issue panel needs from an issue tracker
///
/// Every method is one request/response exchange (occasionally two) with the
/// tracker. Implementations are shared across the threads that fetch subtasks,
/// hence the `Send + Sync` bound.
pub trait IssueGateway: Send + Sync {
    // ========== Listing ==========

    /// Fetch one page of root issues (issues without a parent) in a project.
    /// An empty `cursor` requests the first page.
    fn list_root_issues(&self, project: &str, cursor: &str, page_size: usize)
        -> Result<IssuePage>;

    /// Fetch issues by exact key membership. Callers may pass an empty slice,
    /// implementations must then return an empty list without a request.
    fn issues_by_keys(&self, keys: &[String]) -> Result<Vec<Issue>>;

    /// Fetch a single issue
    fn get_issue(&self, key: &str) -> Result<Issue>;

    // ========== Mutations ==========

    fn create_issue(&self, project: &str, issue: &NewIssue) -> Result<CreatedIssue>;

    fn update_issue(&self, key: &str, update: &FieldUpdate) -> Result<()>;

    fn delete_issue(&self, key: &str) -> Result<()>;

    // ========== Workflow ==========

    fn get_transitions(&self, key: &str) -> Result<Vec<Transition>>;

    fn transition_issue(&self, key: &str, transition_id: &str) -> Result<()>;

    // ========== Project metadata ==========

    fn get_issue_types(&self, project: &str) -> Result<Vec<IssueTypeInfo>>;

    /// Statuses used in a project, optionally restricted to one issue type.
    /// Each status appears once.
    fn get_statuses(&self, project: &str, issue_type_id: Option<&str>) -> Result<Vec<Status>>;

    /// Users that can be assigned, optionally scoped to an existing issue
    fn get_assignable_users(&self, project: &str, issue_key: Option<&str>) -> Result<Vec<User>>;

    // ========== Project properties ==========

    /// Read a project property, `Ok(None)` when it does not exist
    fn get_property(&self, project: &str, property: &str) -> Result<Option<ProjectProperty>>;

    fn save_property(&self, project: &str, property: &str, value: &serde_json::Value)
        -> Result<()>;

    fn delete_property(&self, project: &str, property: &str) -> Result<()>;
}
