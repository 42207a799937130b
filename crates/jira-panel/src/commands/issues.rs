use crate::cli::OutputFormat;
use crate::output::output_result;
use anyhow::{Context, Result};
use panel_core::{fetch_tree_page, IssueGateway};

/// Print one page of root issues with their subtasks attached
pub fn handle_issues(
    client: &dyn IssueGateway,
    project: &str,
    cursor: &str,
    page_size: usize,
    format: OutputFormat,
) -> Result<()> {
    let page = fetch_tree_page(client, project, cursor, page_size)
        .with_context(|| format!("Failed to list issues in project '{}'", project))?;

    output_result(&page, format);
    Ok(())
}
