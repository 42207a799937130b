use crate::cli::{OutputFormat, ProjectCommands};
use crate::output::output_list;
use anyhow::{Context, Result};
use panel_core::IssueGateway;

pub fn handle_project(
    client: &dyn IssueGateway,
    project: &str,
    action: &ProjectCommands,
    format: OutputFormat,
) -> Result<()> {
    match action {
        ProjectCommands::IssueTypes => {
            let types = client
                .get_issue_types(project)
                .with_context(|| format!("Failed to fetch issue types for '{}'", project))?;
            output_list(&types, format);
        }
        ProjectCommands::Statuses { issue_type } => {
            let statuses = client
                .get_statuses(project, issue_type.as_deref())
                .with_context(|| format!("Failed to fetch statuses for '{}'", project))?;
            output_list(&statuses, format);
        }
        ProjectCommands::Users { issue } => {
            let users = client
                .get_assignable_users(project, issue.as_deref())
                .with_context(|| format!("Failed to fetch assignable users for '{}'", project))?;
            output_list(&users, format);
        }
    }
    Ok(())
}
