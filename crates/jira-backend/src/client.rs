use std::time::Duration;

use base64::Engine;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use ureq::Agent;

use crate::error::{JiraError, Result};
use crate::models::*;

/// Fields requested when listing issues in the panel
const LIST_ISSUE_FIELDS: &[&str] = &[
    "key",
    "issuetype",
    "summary",
    "status",
    "assignee",
    "subtasks",
    "parent",
];

/// Fields requested for a single issue, which also needs the description
const ISSUE_DETAIL_FIELDS: &[&str] = &[
    "summary",
    "description",
    "issuetype",
    "status",
    "assignee",
    "subtasks",
    "parent",
];

type Response = ureq::http::Response<ureq::Body>;

/// Jira Cloud REST API client
pub struct JiraClient {
    agent: Agent,
    base_url: String,
    auth_header: String,
}

impl JiraClient {
    /// Create a new Jira client with Basic Auth (account email and API token)
    pub fn new(base_url: &str, email: &str, api_token: &str) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(30)))
            // Status codes are inspected by check_response
            .http_status_as_error(false)
            .build()
            .into();

        let credentials = format!("{}:{}", email, api_token);
        let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_header: format!("Basic {}", encoded),
        }
    }

    /// Base URL of the Jira site, without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Browser URL of an issue
    pub fn browse_url(&self, key: &str) -> String {
        format!("{}/browse/{}", self.base_url, key)
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/rest/api/3{}", self.base_url, path)
    }

    fn handle_error(&self, err: ureq::Error) -> JiraError {
        match &err {
            ureq::Error::StatusCode(401) => JiraError::Unauthorized,
            ureq::Error::StatusCode(404) => JiraError::NotFound("Not found".to_string()),
            ureq::Error::StatusCode(status) => JiraError::Api {
                status: *status,
                message: format!("HTTP {}", status),
            },
            _ => JiraError::Http(err),
        }
    }

    /// Check response status and return error if not successful
    fn check_response(&self, mut response: Response) -> Result<Response> {
        let status = response.status().as_u16();

        if (200..300).contains(&status) {
            return Ok(response);
        }

        let body = response
            .body_mut()
            .read_to_string()
            .unwrap_or_else(|_| String::new());

        // Jira error format: {"errorMessages":["..."], "errors":{"field":"..."}}
        let message = match serde_json::from_str::<serde_json::Value>(&body) {
            Ok(error_response) => {
                let mut messages: Vec<String> = error_response
                    .get("errorMessages")
                    .and_then(|e| e.as_array())
                    .map(|errors| {
                        errors
                            .iter()
                            .filter_map(|e| e.as_str().map(str::to_string))
                            .collect()
                    })
                    .unwrap_or_default();

                if let Some(errors) = error_response.get("errors").and_then(|e| e.as_object()) {
                    for (field, msg) in errors {
                        if let Some(s) = msg.as_str() {
                            messages.push(format!("{}: {}", field, s));
                        }
                    }
                }

                if messages.is_empty() {
                    body
                } else {
                    messages.join("; ")
                }
            }
            Err(_) if body.is_empty() => format!("HTTP {}", status),
            Err(_) => body,
        };

        match status {
            401 => Err(JiraError::Unauthorized),
            404 => Err(JiraError::NotFound(message)),
            _ => Err(JiraError::Api { status, message }),
        }
    }

    fn get(&self, url: &str) -> Result<Response> {
        debug!(%url, "GET");
        let response = self
            .agent
            .get(url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .call()
            .map_err(|e| self.handle_error(e))?;
        self.check_response(response)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let mut response = self.get(url)?;
        Ok(response.body_mut().read_json()?)
    }

    fn post<B: Serialize>(&self, url: &str, body: &B) -> Result<Response> {
        debug!(%url, "POST");
        let response = self
            .agent
            .post(url)
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send_json(body)
            .map_err(|e| self.handle_error(e))?;
        self.check_response(response)
    }

    fn put<B: Serialize>(&self, url: &str, body: &B) -> Result<Response> {
        debug!(%url, "PUT");
        let response = self
            .agent
            .put(url)
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send_json(body)
            .map_err(|e| self.handle_error(e))?;
        self.check_response(response)
    }

    fn delete(&self, url: &str) -> Result<Response> {
        debug!(%url, "DELETE");
        let response = self
            .agent
            .delete(url)
            .header("Authorization", &self.auth_header)
            .call()
            .map_err(|e| self.handle_error(e))?;
        self.check_response(response)
    }

    // ==================== Search ====================

    /// Search with the cursor-based `/search/jql` endpoint.
    /// An empty `next_page_token` requests the first page.
    pub fn search(
        &self,
        jql: &str,
        max_results: usize,
        next_page_token: &str,
    ) -> Result<JiraSearchResult> {
        let mut url = format!(
            "{}?jql={}&maxResults={}&fields={}",
            self.api_url("/search/jql"),
            urlencoding::encode(jql),
            max_results,
            LIST_ISSUE_FIELDS.join(",")
        );
        if !next_page_token.is_empty() {
            url.push_str("&nextPageToken=");
            url.push_str(&urlencoding::encode(next_page_token));
        }
        self.get_json(&url)
    }

    /// One page of issues without a parent in `project`
    pub fn search_root_issues(
        &self,
        project: &str,
        next_page_token: &str,
        max_results: usize,
    ) -> Result<JiraSearchResult> {
        let jql = format!("project = {} AND parent is EMPTY", jql_string(project));
        self.search(&jql, max_results, next_page_token)
            .map_err(|e| e.for_project(project))
    }

    /// Issues whose key is in `keys`, in a single request
    pub fn search_by_keys(&self, keys: &[String]) -> Result<Vec<JiraIssue>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let quoted: Vec<String> = keys.iter().map(|k| jql_string(k)).collect();
        let jql = format!("key in ({})", quoted.join(","));
        Ok(self.search(&jql, keys.len(), "")?.issues)
    }

    // ==================== Issue Operations ====================

    /// Get an issue by key or ID
    pub fn get_issue(&self, key: &str) -> Result<JiraIssue> {
        let url = format!(
            "{}?fields={}",
            self.api_url(&format!("/issue/{}", urlencoding::encode(key))),
            ISSUE_DETAIL_FIELDS.join(",")
        );
        self.get_json(&url).map_err(|e| e.for_issue(key))
    }

    /// Create an issue. Jira answers with the new id and key only.
    pub fn create_issue(&self, issue: &CreateJiraIssue) -> Result<CreatedJiraIssue> {
        let mut response = self.post(&self.api_url("/issue"), issue)?;
        Ok(response.body_mut().read_json()?)
    }

    /// Update fields of an existing issue
    pub fn update_issue(&self, key: &str, update: &UpdateJiraIssue) -> Result<()> {
        let url = self.api_url(&format!("/issue/{}", urlencoding::encode(key)));
        self.put(&url, update).map_err(|e| e.for_issue(key))?;
        Ok(())
    }

    pub fn delete_issue(&self, key: &str) -> Result<()> {
        let url = self.api_url(&format!("/issue/{}", urlencoding::encode(key)));
        self.delete(&url).map_err(|e| e.for_issue(key))?;
        Ok(())
    }

    // ==================== Workflow ====================

    /// Transitions available from the issue's current status
    pub fn get_transitions(&self, key: &str) -> Result<Vec<JiraTransition>> {
        let url = self.api_url(&format!("/issue/{}/transitions", urlencoding::encode(key)));
        let response: JiraTransitionsResponse =
            self.get_json(&url).map_err(|e| e.for_issue(key))?;
        Ok(response.transitions)
    }

    pub fn transition_issue(&self, key: &str, transition_id: &str) -> Result<()> {
        let url = self.api_url(&format!("/issue/{}/transitions", urlencoding::encode(key)));
        let body = DoJiraTransition {
            transition: IdRef {
                id: transition_id.to_string(),
            },
        };
        self.post(&url, &body).map_err(|e| e.for_issue(key))?;
        Ok(())
    }

    // ==================== Project metadata ====================

    /// Issue types that can be created in a project
    pub fn get_issue_types(&self, project: &str) -> Result<Vec<JiraIssueType>> {
        let url = self.api_url(&format!(
            "/issue/createmeta/{}/issuetypes",
            urlencoding::encode(project)
        ));
        let page: JiraIssueTypesPage = self.get_json(&url).map_err(|e| e.for_project(project))?;
        Ok(page.issue_types)
    }

    /// Statuses grouped by issue type
    pub fn get_project_statuses(&self, project: &str) -> Result<Vec<JiraIssueTypeStatuses>> {
        let url = self.api_url(&format!("/project/{}/statuses", urlencoding::encode(project)));
        self.get_json(&url).map_err(|e| e.for_project(project))
    }

    /// List users assignable to issues in a project, optionally to one issue
    pub fn list_assignable_users(
        &self,
        project: &str,
        issue_key: Option<&str>,
    ) -> Result<Vec<JiraUser>> {
        let mut url = format!(
            "{}?project={}",
            self.api_url("/user/assignable/search"),
            urlencoding::encode(project)
        );
        if let Some(key) = issue_key {
            url.push_str("&issueKey=");
            url.push_str(&urlencoding::encode(key));
        }
        self.get_json(&url)
    }

    // ==================== Project properties ====================

    fn property_url(&self, project: &str, property: &str) -> String {
        self.api_url(&format!(
            "/project/{}/properties/{}",
            urlencoding::encode(project),
            urlencoding::encode(property)
        ))
    }

    /// Read a project property. A 404 means the property is not set.
    pub fn get_property(&self, project: &str, property: &str) -> Result<Option<JiraProperty>> {
        match self.get_json(&self.property_url(project, property)) {
            Ok(found) => Ok(Some(found)),
            Err(JiraError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn set_property(
        &self,
        project: &str,
        property: &str,
        value: &serde_json::Value,
    ) -> Result<()> {
        self.put(&self.property_url(project, property), value)
            .map_err(|e| e.for_project(project))?;
        Ok(())
    }

    /// Remove a project property. Removing an unset property succeeds.
    pub fn delete_property(&self, project: &str, property: &str) -> Result<()> {
        match self.delete(&self.property_url(project, property)) {
            Ok(_) | Err(JiraError::NotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// Quote a value as a JQL string literal
pub(crate) fn jql_string(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}
