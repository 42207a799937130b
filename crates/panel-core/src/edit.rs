//! Turning user edits into tracker calls.
//!
//! Status is never written as a field: it changes only through a workflow
//! transition whose target is the requested status.

use tracing::info;

use crate::error::{PanelError, Result};
use crate::models::{FieldUpdate, Issue, MutationOutcome, NewIssue, Transition};
use crate::traits::IssueGateway;

/// Desired state of an issue after editing. `None` leaves a value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueEdit {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub issue_type_id: Option<String>,
    pub status_id: Option<String>,
    /// `Some(None)` unassigns the issue
    pub assignee: Option<Option<String>>,
}

/// What actually has to change, relative to the current issue
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdatePlan {
    pub fields: FieldUpdate,
    pub status_id: Option<String>,
}

impl UpdatePlan {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.status_id.is_none()
    }
}

pub fn plan_update(current: &Issue, edit: &IssueEdit) -> UpdatePlan {
    let mut fields = FieldUpdate::default();

    if let Some(summary) = &edit.summary {
        if *summary != current.summary {
            fields.summary = Some(summary.clone());
        }
    }

    if let Some(description) = &edit.description {
        if description != current.description.as_deref().unwrap_or("") {
            fields.description = Some(description.clone());
        }
    }

    if let Some(type_id) = &edit.issue_type_id {
        if *type_id != current.issue_type.id {
            fields.issue_type_id = Some(type_id.clone());
        }
    }

    if let Some(assignee) = &edit.assignee {
        let current_assignee = current.assignee.as_ref().map(|u| u.account_id.as_str());
        if assignee.as_deref() != current_assignee {
            fields.assignee = Some(assignee.clone());
        }
    }

    let status_id = edit
        .status_id
        .as_ref()
        .filter(|id| **id != current.status.id)
        .cloned();

    UpdatePlan { fields, status_id }
}

/// Find the transition that moves `key` into the status `status_id`
pub fn find_transition(
    gateway: &dyn IssueGateway,
    key: &str,
    status_id: &str,
) -> Result<Transition> {
    gateway
        .get_transitions(key)?
        .into_iter()
        .find(|t| t.to.id == status_id)
        .ok_or_else(|| {
            PanelError::InvalidInput(format!("No transition found for status: {}", status_id))
        })
}

/// Apply an edit to an issue. Returns `None` when nothing differs from the
/// current state and no call was made.
///
/// The transition is resolved before any write, and only applied once the
/// field update went through.
pub fn apply_update(
    gateway: &dyn IssueGateway,
    current: &Issue,
    edit: &IssueEdit,
) -> Option<MutationOutcome> {
    let plan = plan_update(current, edit);
    if plan.is_empty() {
        return None;
    }
    let key = current.key.as_str();
    let failed = |e: PanelError| MutationOutcome::failed(e.to_string(), Some(key.to_string()));

    let transition = match &plan.status_id {
        Some(status_id) => match find_transition(gateway, key, status_id) {
            Ok(t) => Some(t),
            Err(e) => return Some(failed(e)),
        },
        None => None,
    };

    if !plan.fields.is_empty() {
        if let Err(e) = gateway.update_issue(key, &plan.fields) {
            return Some(failed(e));
        }
    }

    if let Some(transition) = transition {
        if let Err(e) = gateway.transition_issue(key, &transition.id) {
            let outcome = failed(e);
            if plan.fields.is_empty() {
                return Some(outcome);
            }
            return Some(outcome.after_partial_write());
        }
    }

    info!(issue = key, "issue updated");
    Some(MutationOutcome::succeeded(
        format!("Issue {} updated successfully", key),
        key,
    ))
}

/// Move an issue into a status through the matching transition
pub fn move_to_status(
    gateway: &dyn IssueGateway,
    key: &str,
    status_id: &str,
) -> Result<Transition> {
    let transition = find_transition(gateway, key, status_id)?;
    gateway.transition_issue(key, &transition.id)?;
    info!(issue = key, status = %transition.to.name, "issue transitioned");
    Ok(transition)
}

/// Trim and check a new issue before it is sent
pub fn validate_new_issue(issue: &NewIssue) -> Result<NewIssue> {
    let summary = issue.summary.trim();
    if summary.is_empty() {
        return Err(PanelError::InvalidInput("Please enter a summary".to_string()));
    }
    let issue_type_id = issue.issue_type_id.trim();
    if issue_type_id.is_empty() {
        return Err(PanelError::InvalidInput(
            "Please select an issue type".to_string(),
        ));
    }
    let description = issue
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(String::from);

    Ok(NewIssue {
        summary: summary.to_string(),
        description,
        issue_type_id: issue_type_id.to_string(),
    })
}
