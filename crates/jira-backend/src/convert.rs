//! Conversions between Jira wire models and panel-core types

use panel_core::{
    CreatedIssue, FieldUpdate, Issue, IssuePage, IssueType, IssueTypeInfo, NewIssue,
    ProjectProperty, Status, Transition, User,
};

use crate::models::*;

impl From<JiraIssue> for Issue {
    fn from(j: JiraIssue) -> Self {
        let description = j
            .fields
            .description
            .as_ref()
            .map(adf_to_text)
            .filter(|s| !s.is_empty());

        Issue {
            id: j.id,
            key: j.key,
            issue_type: j.fields.issuetype.into(),
            summary: j.fields.summary,
            description,
            status: j.fields.status.into(),
            assignee: j.fields.assignee.and_then(user_from_jira),
            subtasks: j.fields.subtasks.into_iter().map(|s| s.key).collect(),
            parent: j.fields.parent.map(|p| p.key),
        }
    }
}

impl From<JiraIssueType> for IssueType {
    fn from(t: JiraIssueType) -> Self {
        IssueType {
            id: t.id.unwrap_or_default(),
            name: t.name,
            icon_url: t.icon_url,
        }
    }
}

impl From<JiraIssueType> for IssueTypeInfo {
    fn from(t: JiraIssueType) -> Self {
        IssueTypeInfo {
            id: t.id.unwrap_or_default(),
            name: t.name,
            icon_url: t.icon_url,
            subtask: t.subtask,
        }
    }
}

impl From<JiraStatus> for Status {
    fn from(s: JiraStatus) -> Self {
        Status {
            id: s.id,
            name: s.name,
            category: s.status_category.map(|c| c.key),
        }
    }
}

impl From<JiraTransition> for Transition {
    fn from(t: JiraTransition) -> Self {
        Transition {
            id: t.id,
            name: t.name,
            to: t.to.into(),
        }
    }
}

impl From<JiraSearchResult> for IssuePage {
    fn from(r: JiraSearchResult) -> Self {
        let next_page_cursor = r.next_page_token.unwrap_or_default();
        // Older responses omit isLast; a missing token then marks the end
        let is_last = r.is_last.unwrap_or(next_page_cursor.is_empty());
        IssuePage {
            issues: r.issues.into_iter().map(Into::into).collect(),
            next_page_cursor,
            is_last,
        }
    }
}

impl From<CreatedJiraIssue> for CreatedIssue {
    fn from(c: CreatedJiraIssue) -> Self {
        CreatedIssue { id: c.id, key: c.key }
    }
}

impl From<JiraProperty> for ProjectProperty {
    fn from(p: JiraProperty) -> Self {
        ProjectProperty {
            key: p.key,
            value: p.value,
        }
    }
}

/// Users without an account id (e.g. anonymized) cannot be assigned and are dropped
pub(crate) fn user_from_jira(u: JiraUser) -> Option<User> {
    let account_id = u.account_id?;
    Some(User {
        display_name: u.display_name.unwrap_or_else(|| account_id.clone()),
        account_id,
        avatar_urls: u.avatar_urls,
    })
}

pub(crate) fn new_issue_to_jira(project: &str, issue: &NewIssue) -> CreateJiraIssue {
    CreateJiraIssue {
        fields: CreateJiraIssueFields {
            project: KeyRef {
                key: project.to_string(),
            },
            summary: issue.summary.clone(),
            description: issue.description.as_deref().map(text_to_adf),
            issuetype: IdRef {
                id: issue.issue_type_id.clone(),
            },
        },
    }
}

pub(crate) fn field_update_to_jira(update: &FieldUpdate) -> UpdateJiraIssue {
    UpdateJiraIssue {
        fields: UpdateJiraIssueFields {
            summary: update.summary.clone(),
            description: update.description.as_deref().map(text_to_adf),
            issuetype: update.issue_type_id.clone().map(|id| IdRef { id }),
            assignee: update.assignee.clone().map(|account| {
                account.map(|account_id| AccountRef { account_id })
            }),
        },
    }
}

/// Flatten per-issue-type status lists into unique statuses, in first-seen order
pub(crate) fn collect_statuses(
    groups: Vec<JiraIssueTypeStatuses>,
    issue_type_id: Option<&str>,
) -> Vec<Status> {
    let mut seen = std::collections::HashSet::new();
    groups
        .into_iter()
        .filter(|group| issue_type_id.is_none_or(|id| group.id == id))
        .flat_map(|group| group.statuses)
        .filter(|status| seen.insert(status.id.clone()))
        .map(Into::into)
        .collect()
}
