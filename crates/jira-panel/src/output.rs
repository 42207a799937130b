use crate::cli::{ColorChoice, OutputFormat};
use colored::{ColoredString, Colorize};
use panel_core::{
    Flag, FlagKind, Issue, IssueNode, IssueTypeInfo, MutationOutcome, Row, Status, Transition,
    TreePage, User,
};
use serde::Serialize;
use std::io::IsTerminal;

/// Initialize color mode based on CLI choice and environment
pub fn init_color(choice: ColorChoice) {
    let should_color = match choice {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        // Respect NO_COLOR (https://no-color.org/), then require a terminal
        ColorChoice::Auto => std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal(),
    };
    colored::control::set_override(should_color);
}

pub fn output_result<T: Serialize + Displayable + ?Sized>(result: &T, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(result) {
                println!("{}", json);
            }
        }
        OutputFormat::Text => {
            println!("{}", result.display());
        }
    }
}

pub fn output_list<T: Serialize + Displayable>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(&items) {
                println!("{}", json);
            }
        }
        OutputFormat::Text => {
            if items.is_empty() {
                println!("{}", "(none)".dimmed());
            }
            for item in items {
                println!("{}", item.display());
            }
        }
    }
}

/// Print a mutation result. A failed outcome is reported as an error so
/// the process exits non-zero.
pub fn output_outcome(outcome: &MutationOutcome, format: OutputFormat) -> anyhow::Result<()> {
    if !outcome.success {
        return Err(anyhow::anyhow!("{}", outcome.message));
    }
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(outcome)?),
        OutputFormat::Text => println!("{} {}", "✓".green().bold(), outcome.message),
    }
    Ok(())
}

#[derive(Serialize)]
pub struct JsonError {
    pub error: bool,
    pub code: String,
    pub message: String,
}

pub fn output_error(err: &anyhow::Error, format: OutputFormat) {
    let message = match format {
        OutputFormat::Json => {
            let json_err = JsonError {
                error: true,
                code: "error".to_string(),
                message: format!("{:#}", err),
            };
            serde_json::to_string_pretty(&json_err)
                .unwrap_or_else(|_| format!(r#"{{"error": true, "message": "{}"}}"#, err))
        }
        OutputFormat::Text => format!("{}: {:#}", "Error".red().bold(), err),
    };
    eprintln!("{}", message);
}

pub trait Displayable {
    fn display(&self) -> String;
}

/// Status lozenge colored by category, the way the Jira board shows it
fn status_label(status: &Status) -> ColoredString {
    let label = status.name.to_uppercase();
    match status.category.as_deref() {
        Some("done") => label.green(),
        Some("indeterminate") => label.blue(),
        _ => match status.name.to_lowercase().as_str() {
            "done" => label.green(),
            "in progress" => label.blue(),
            _ => label.normal(),
        },
    }
}

fn assignee_label(assignee: Option<&User>) -> ColoredString {
    match assignee {
        Some(user) => user.display_name.cyan(),
        None => "Unassigned".dimmed(),
    }
}

/// One line of the tree: key, type, summary, status, assignee
fn issue_line(issue: &Issue) -> String {
    format!(
        "{} [{}] {}  {}  {}",
        issue.key.cyan().bold(),
        issue.issue_type.name.dimmed(),
        issue.summary.white().bold(),
        status_label(&issue.status),
        assignee_label(issue.assignee.as_ref())
    )
}

impl Displayable for Issue {
    fn display(&self) -> String {
        let mut output = format!(
            "{} - {}\n  {}: {}\n  {}: {}\n  {}: {}",
            self.key.cyan().bold(),
            self.summary.white().bold(),
            "Type".dimmed(),
            self.issue_type.name,
            "Status".dimmed(),
            status_label(&self.status),
            "Assignee".dimmed(),
            assignee_label(self.assignee.as_ref())
        );

        if let Some(parent) = &self.parent {
            output.push_str(&format!("\n  {}: {}", "Parent".dimmed(), parent.cyan()));
        }

        if !self.subtasks.is_empty() {
            let keys: Vec<String> = self.subtasks.iter().map(|k| k.cyan().to_string()).collect();
            output.push_str(&format!("\n  {}: {}", "Subtasks".dimmed(), keys.join(", ")));
        }

        if let Some(desc) = &self.description {
            output.push_str(&format!("\n  {}: {}", "Description".dimmed(), desc));
        }

        output
    }
}

impl Displayable for IssueNode {
    fn display(&self) -> String {
        let mut output = issue_line(&self.issue);
        for child in &self.children {
            output.push_str(&format!("\n  └ {}", issue_line(child)));
        }
        output
    }
}

impl Displayable for TreePage {
    fn display(&self) -> String {
        if self.issues.is_empty() {
            return "No issues found".dimmed().to_string();
        }
        let mut lines: Vec<String> = self.issues.iter().map(|n| n.display()).collect();
        if !self.is_last {
            lines.push(format!(
                "{} {}",
                "Next page cursor:".dimmed(),
                self.next_page_cursor
            ));
        }
        lines.join("\n")
    }
}

impl Displayable for Transition {
    fn display(&self) -> String {
        format!(
            "{} {} → {} ({})",
            self.id.dimmed(),
            self.name.white().bold(),
            status_label(&self.to),
            self.to.id.dimmed()
        )
    }
}

impl Displayable for IssueTypeInfo {
    fn display(&self) -> String {
        let subtask = if self.subtask {
            " (subtask)".yellow().to_string()
        } else {
            String::new()
        };
        format!("{} {}{}", self.id.dimmed(), self.name.white().bold(), subtask)
    }
}

impl Displayable for Status {
    fn display(&self) -> String {
        format!("{} {}", self.id.dimmed(), status_label(self))
    }
}

impl Displayable for User {
    fn display(&self) -> String {
        format!("{} {}", self.account_id.dimmed(), self.display_name.cyan())
    }
}

impl Displayable for Flag {
    fn display(&self) -> String {
        let title = match self.kind {
            FlagKind::Success => self.title.green().bold(),
            FlagKind::Error => self.title.red().bold(),
        };
        format!("[{}] {}: {}", self.id, title, self.description)
    }
}

/// Render visible browser rows with expansion markers
pub fn render_rows(rows: &[Row<'_>]) -> String {
    rows.iter()
        .map(|row| {
            let marker = match (row.expandable, row.expanded) {
                (true, true) => "▾ ",
                (true, false) => "▸ ",
                (false, _) => "  ",
            };
            let indent = "    ".repeat(row.depth);
            format!("{}{}{}", indent, marker, issue_line(row.issue))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(key: &str, status: &str, category: Option<&str>) -> Issue {
        Issue {
            id: "1".into(),
            key: key.into(),
            issue_type: panel_core::IssueType {
                id: "10001".into(),
                name: "Task".into(),
                icon_url: None,
            },
            summary: "Do the thing".into(),
            description: None,
            status: Status {
                id: "1".into(),
                name: status.into(),
                category: category.map(String::from),
            },
            assignee: None,
            subtasks: Vec::new(),
            parent: None,
        }
    }

    #[test]
    fn tree_lists_children_under_parent() {
        colored::control::set_override(false);
        let node = IssueNode {
            issue: issue("ABC-1", "To Do", Some("new")),
            children: vec![issue("ABC-2", "Done", Some("done"))],
        };
        let text = node.display();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("ABC-1 [Task] Do the thing  TO DO  Unassigned"));
        assert!(lines[1].contains("└ ABC-2"));
        assert!(lines[1].contains("DONE"));
    }

    #[test]
    fn last_page_has_no_cursor_line() {
        colored::control::set_override(false);
        let page = TreePage {
            issues: vec![IssueNode::leaf(issue("ABC-1", "To Do", None))],
            next_page_cursor: String::new(),
            is_last: true,
        };
        assert!(!page.display().contains("cursor"));
    }

    #[test]
    fn failed_outcome_becomes_error() {
        let outcome = MutationOutcome::failed("boom", Some("ABC-1".into()));
        let err = output_outcome(&outcome, OutputFormat::Json).unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }
}
