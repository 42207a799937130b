//! `IssueGateway` implementation for `JiraClient`

use panel_core::{
    CreatedIssue, FieldUpdate, Issue, IssueGateway, IssuePage, IssueTypeInfo, NewIssue,
    PanelError, ProjectProperty, Result, Status, Transition, User,
};

use crate::client::JiraClient;
use crate::convert::{collect_statuses, field_update_to_jira, new_issue_to_jira, user_from_jira};

impl IssueGateway for JiraClient {
    fn list_root_issues(&self, project: &str, cursor: &str, page_size: usize) -> Result<IssuePage> {
        self.search_root_issues(project, cursor, page_size)
            .map(Into::into)
            .map_err(PanelError::from)
    }

    fn issues_by_keys(&self, keys: &[String]) -> Result<Vec<Issue>> {
        self.search_by_keys(keys)
            .map(|issues| issues.into_iter().map(Into::into).collect())
            .map_err(PanelError::from)
    }

    fn get_issue(&self, key: &str) -> Result<Issue> {
        self.get_issue(key)
            .map(Into::into)
            .map_err(PanelError::from)
    }

    fn create_issue(&self, project: &str, issue: &NewIssue) -> Result<CreatedIssue> {
        self.create_issue(&new_issue_to_jira(project, issue))
            .map(Into::into)
            .map_err(PanelError::from)
    }

    fn update_issue(&self, key: &str, update: &FieldUpdate) -> Result<()> {
        self.update_issue(key, &field_update_to_jira(update))
            .map_err(PanelError::from)
    }

    fn delete_issue(&self, key: &str) -> Result<()> {
        self.delete_issue(key).map_err(PanelError::from)
    }

    fn get_transitions(&self, key: &str) -> Result<Vec<Transition>> {
        self.get_transitions(key)
            .map(|ts| ts.into_iter().map(Into::into).collect())
            .map_err(PanelError::from)
    }

    fn transition_issue(&self, key: &str, transition_id: &str) -> Result<()> {
        self.transition_issue(key, transition_id)
            .map_err(PanelError::from)
    }

    fn get_issue_types(&self, project: &str) -> Result<Vec<IssueTypeInfo>> {
        self.get_issue_types(project)
            .map(|types| types.into_iter().map(Into::into).collect())
            .map_err(PanelError::from)
    }

    fn get_statuses(&self, project: &str, issue_type_id: Option<&str>) -> Result<Vec<Status>> {
        self.get_project_statuses(project)
            .map(|groups| collect_statuses(groups, issue_type_id))
            .map_err(PanelError::from)
    }

    fn get_assignable_users(&self, project: &str, issue_key: Option<&str>) -> Result<Vec<User>> {
        self.list_assignable_users(project, issue_key)
            .map(|users| users.into_iter().filter_map(user_from_jira).collect())
            .map_err(PanelError::from)
    }

    fn get_property(&self, project: &str, property: &str) -> Result<Option<ProjectProperty>> {
        self.get_property(project, property)
            .map(|found| found.map(Into::into))
            .map_err(PanelError::from)
    }

    fn save_property(
        &self,
        project: &str,
        property: &str,
        value: &serde_json::Value,
    ) -> Result<()> {
        self.set_property(project, property, value)
            .map_err(PanelError::from)
    }

    fn delete_property(&self, project: &str, property: &str) -> Result<()> {
        self.delete_property(project, property)
            .map_err(PanelError::from)
    }
}
