use crate::cli::{IssueCommands, OutputFormat};
use crate::output::{output_list, output_outcome, output_result};
use anyhow::{Context, Result};
use colored::Colorize;
use panel_core::edit::validate_new_issue;
use panel_core::{apply_update, move_to_status, IssueEdit, IssueGateway, MutationOutcome, NewIssue};

pub fn handle_issue(
    client: &dyn IssueGateway,
    project: Option<&str>,
    site_url: &str,
    action: &IssueCommands,
    format: OutputFormat,
) -> Result<()> {
    match action {
        IssueCommands::Get { key } => handle_get(client, key, format),
        IssueCommands::Create {
            summary,
            issue_type,
            description,
        } => {
            let project = project.context(
                "Project not configured. Set via --project, JIRA_PANEL_PROJECT env var, or config file",
            )?;
            let new_issue = NewIssue {
                summary: summary.clone(),
                description: description.clone(),
                issue_type_id: issue_type.clone(),
            };
            handle_create(client, project, &new_issue, format)
        }
        IssueCommands::Update {
            key,
            summary,
            description,
            issue_type,
            status,
            assignee,
        } => {
            let edit = IssueEdit {
                summary: summary.clone(),
                description: description.clone(),
                issue_type_id: issue_type.clone(),
                status_id: status.clone(),
                assignee: assignee.as_deref().map(parse_assignee),
            };
            handle_update(client, key, &edit, format)
        }
        IssueCommands::Delete { key } => handle_delete(client, key, format),
        IssueCommands::Transitions { key } => {
            let transitions = client
                .get_transitions(key)
                .with_context(|| format!("Failed to fetch transitions for '{}'", key))?;
            output_list(&transitions, format);
            Ok(())
        }
        IssueCommands::Move { key, status } => handle_move(client, key, status, format),
        IssueCommands::Open { key } => handle_open(site_url, key),
    }
}

/// "none" (any case) or an empty value unassigns
pub(crate) fn parse_assignee(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(value.to_string())
    }
}

fn handle_get(client: &dyn IssueGateway, key: &str, format: OutputFormat) -> Result<()> {
    let issue = client
        .get_issue(key)
        .with_context(|| format!("Failed to fetch issue '{}'", key))?;

    output_result(&issue, format);
    Ok(())
}

fn handle_create(
    client: &dyn IssueGateway,
    project: &str,
    new_issue: &NewIssue,
    format: OutputFormat,
) -> Result<()> {
    let valid = validate_new_issue(new_issue)?;
    let created = client
        .create_issue(project, &valid)
        .context("Failed to create issue")?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({ "success": true, "issue": created });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            println!("Issue {} created successfully", created.key.cyan().bold());
        }
    }
    Ok(())
}

fn handle_update(
    client: &dyn IssueGateway,
    key: &str,
    edit: &IssueEdit,
    format: OutputFormat,
) -> Result<()> {
    let current = client
        .get_issue(key)
        .with_context(|| format!("Failed to fetch issue '{}'", key))?;

    match apply_update(client, &current, edit) {
        Some(outcome) => output_outcome(&outcome, format)
            .with_context(|| format!("Failed to update issue '{}'", key)),
        None => {
            let outcome = MutationOutcome::succeeded("Nothing to update", key);
            output_outcome(&outcome, format)
        }
    }
}

fn handle_delete(client: &dyn IssueGateway, key: &str, format: OutputFormat) -> Result<()> {
    client
        .delete_issue(key)
        .with_context(|| format!("Failed to delete issue '{}'", key))?;

    let outcome = MutationOutcome::succeeded(format!("Issue {} deleted successfully", key), key);
    output_outcome(&outcome, format)
}

fn handle_move(
    client: &dyn IssueGateway,
    key: &str,
    status_id: &str,
    format: OutputFormat,
) -> Result<()> {
    let transition = move_to_status(client, key, status_id)
        .with_context(|| format!("Failed to move issue '{}'", key))?;

    let outcome = MutationOutcome::succeeded(
        format!("Issue {} moved to {}", key, transition.to.name),
        key,
    );
    output_outcome(&outcome, format)
}

fn handle_open(site_url: &str, key: &str) -> Result<()> {
    let url = format!("{}/browse/{}", site_url.trim_end_matches('/'), key);
    open::that(&url).with_context(|| format!("Failed to open {}", url))?;
    println!("Opened {}", url);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignee_none_unassigns() {
        assert_eq!(parse_assignee("none"), None);
        assert_eq!(parse_assignee("NONE"), None);
        assert_eq!(parse_assignee("  "), None);
        assert_eq!(parse_assignee("5b10a284"), Some("5b10a284".to_string()));
    }
}
