//! Line-oriented interactive panel over [`IssueBrowser`].
//!
//! Each input line is one command; the page is re-rendered after every
//! command so the output reads like successive frames of the panel.

use crate::cli::OutputFormat;
use crate::commands::issue::parse_assignee;
use crate::output::{render_rows, Displayable};
use anyhow::{anyhow, bail, Context, Result};
use colored::Colorize;
use panel_core::{IssueBrowser, IssueEdit, IssueGateway, NewIssue};
use std::io::{BufRead, Write};

const HELP: &str = "\
Commands:
  next | n                      next page
  prev | p                      previous page
  refresh | r                   reload the current page
  expand KEY | collapse KEY     show or hide subtasks of an issue
  expand-all | collapse-all     all issues at once
  create TYPE_ID SUMMARY...     create an issue
  edit KEY SUMMARY...           change an issue's summary
  assign KEY ACCOUNT_ID|none    change or clear the assignee
  move KEY STATUS_ID            move an issue to a status
  delete KEY                    delete an issue
  flags                         list notifications
  dismiss FLAG_ID               remove a notification
  help | ?                      this text
  quit | q                      leave";

#[derive(Debug, Clone, PartialEq)]
enum Action {
    Next,
    Previous,
    Refresh,
    Expand(String),
    Collapse(String),
    ExpandAll,
    CollapseAll,
    Create { issue_type: String, summary: String },
    Edit { key: String, summary: String },
    Assign { key: String, assignee: Option<String> },
    Move { key: String, status: String },
    Delete(String),
    Flags,
    Dismiss(u64),
    Help,
    Quit,
}

/// Parse one input line. Blank lines yield `None`.
fn parse_action(line: &str) -> Result<Option<Action>> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(None);
    };
    let mut arg = |name: &str| {
        words
            .next()
            .map(str::to_string)
            .ok_or_else(|| anyhow!("'{}' needs {}", command, name))
    };

    let action = match command {
        "next" | "n" => Action::Next,
        "prev" | "p" | "previous" => Action::Previous,
        "refresh" | "r" => Action::Refresh,
        "expand" => Action::Expand(arg("an issue key")?),
        "collapse" => Action::Collapse(arg("an issue key")?),
        "expand-all" => Action::ExpandAll,
        "collapse-all" => Action::CollapseAll,
        "create" => {
            let issue_type = arg("an issue type id")?;
            Action::Create {
                issue_type,
                summary: rest(line, 2),
            }
        }
        "edit" => {
            let key = arg("an issue key")?;
            Action::Edit {
                key,
                summary: rest(line, 2),
            }
        }
        "assign" => {
            let key = arg("an issue key")?;
            let assignee = parse_assignee(&arg("an account id or 'none'")?);
            Action::Assign { key, assignee }
        }
        "move" => {
            let key = arg("an issue key")?;
            let status = arg("a status id")?;
            Action::Move { key, status }
        }
        "delete" => Action::Delete(arg("an issue key")?),
        "flags" => Action::Flags,
        "dismiss" => {
            let id = arg("a flag id")?;
            Action::Dismiss(id.parse().with_context(|| format!("Invalid flag id: {}", id))?)
        }
        "help" | "?" => Action::Help,
        "quit" | "q" | "exit" => Action::Quit,
        other => bail!("Unknown command: {} (type 'help')", other),
    };
    Ok(Some(action))
}

/// Everything after the first `skip` words, with inner spacing preserved
fn rest(line: &str, skip: usize) -> String {
    let mut remaining = line.trim_start();
    for _ in 0..skip {
        remaining = remaining
            .find(char::is_whitespace)
            .map(|i| remaining[i..].trim_start())
            .unwrap_or("");
    }
    remaining.trim_end().to_string()
}

pub fn handle_browse(
    client: &dyn IssueGateway,
    project: &str,
    page_size: usize,
    format: OutputFormat,
) -> Result<()> {
    let mut browser = IssueBrowser::new(client, project, page_size);
    browser.load();

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    run_session(client, &mut browser, stdin.lock(), &mut stdout.lock(), format)
}

/// Drive the browser from `input` until EOF or `quit`
fn run_session<R: BufRead, W: Write>(
    client: &dyn IssueGateway,
    browser: &mut IssueBrowser<'_>,
    input: R,
    out: &mut W,
    format: OutputFormat,
) -> Result<()> {
    render(browser, out, format)?;

    for line in input.lines() {
        let line = line.context("Failed to read command")?;
        let action = match parse_action(&line) {
            Ok(Some(action)) => action,
            Ok(None) => continue,
            Err(e) => {
                writeln!(out, "{}: {}", "Error".red().bold(), e)?;
                continue;
            }
        };

        match action {
            Action::Quit => break,
            Action::Help => {
                writeln!(out, "{}", HELP)?;
                continue;
            }
            Action::Flags => {
                for flag in browser.flags() {
                    writeln!(out, "{}", flag.display())?;
                }
                continue;
            }
            Action::Next => {
                if !browser.next() {
                    writeln!(out, "{}", "Already on the last page".dimmed())?;
                }
            }
            Action::Previous => {
                if !browser.previous() {
                    writeln!(out, "{}", "Already on the first page".dimmed())?;
                }
            }
            Action::Refresh => browser.refresh(),
            Action::Expand(key) => browser.set_expanded(&key, true),
            Action::Collapse(key) => browser.set_expanded(&key, false),
            Action::ExpandAll => browser.expand_all(),
            Action::CollapseAll => browser.collapse_all(),
            Action::Create {
                issue_type,
                summary,
            } => {
                let new_issue = NewIssue {
                    summary,
                    description: None,
                    issue_type_id: issue_type,
                };
                browser.create_issue(&new_issue);
                report(out, browser)?;
            }
            Action::Edit { key, summary } => {
                let edit = IssueEdit {
                    summary: Some(summary),
                    ..IssueEdit::default()
                };
                edit_issue(client, browser, out, &key, &edit)?;
            }
            Action::Assign { key, assignee } => {
                let edit = IssueEdit {
                    assignee: Some(assignee),
                    ..IssueEdit::default()
                };
                edit_issue(client, browser, out, &key, &edit)?;
            }
            Action::Move { key, status } => {
                browser.transition_to_status(&key, &status);
                report(out, browser)?;
            }
            Action::Delete(key) => {
                browser.delete_issue(&key);
                report(out, browser)?;
            }
            Action::Dismiss(id) => {
                if !browser.dismiss_flag(id) {
                    writeln!(out, "No flag with id {}", id)?;
                }
            }
        }
        render(browser, out, format)?;
    }
    Ok(())
}

fn edit_issue<W: Write>(
    client: &dyn IssueGateway,
    browser: &mut IssueBrowser<'_>,
    out: &mut W,
    key: &str,
    edit: &IssueEdit,
) -> Result<()> {
    let current = match browser.find_issue(key).cloned() {
        Some(issue) => issue,
        None => match client.get_issue(key) {
            Ok(issue) => issue,
            Err(e) => {
                writeln!(out, "{}: {}", "Error".red().bold(), e)?;
                return Ok(());
            }
        },
    };
    match browser.update_issue(&current, edit) {
        Some(_) => report(out, browser),
        None => {
            writeln!(out, "{}", "Nothing to update".dimmed())?;
            Ok(())
        }
    }
}

/// Echo the flag raised by the mutation that just finished
fn report<W: Write>(out: &mut W, browser: &IssueBrowser<'_>) -> Result<()> {
    if let Some(flag) = browser.flags().first() {
        writeln!(out, "{}", flag.display())?;
    }
    Ok(())
}

fn render<W: Write>(browser: &IssueBrowser<'_>, out: &mut W, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let view = serde_json::json!({
                "page": browser.page_number(),
                "cursor": browser.current_cursor(),
                "issues": browser.issues(),
                "expanded": browser
                    .rows()
                    .iter()
                    .filter(|row| row.expanded)
                    .map(|row| row.issue.key.as_str())
                    .collect::<Vec<_>>(),
                "isLast": browser.is_last(),
                "error": browser.fetch_error(),
                "flags": browser.flags(),
            });
            writeln!(out, "{}", serde_json::to_string(&view)?)?;
        }
        OutputFormat::Text => {
            writeln!(
                out,
                "{} {} · page {}",
                "Project".dimmed(),
                browser.project().cyan().bold(),
                browser.page_number()
            )?;
            if let Some(error) = browser.fetch_error() {
                writeln!(out, "{}: {}", "Failed to load issues".red().bold(), error)?;
            } else if browser.issues().is_empty() {
                writeln!(out, "{}", "No issues found".dimmed())?;
            } else {
                writeln!(out, "{}", render_rows(&browser.rows()))?;
            }
            let mut nav = Vec::new();
            if browser.can_go_previous() {
                nav.push("prev");
            }
            if browser.can_go_next() {
                nav.push("next");
            }
            if !nav.is_empty() {
                writeln!(out, "{}", format!("[{}]", nav.join(" | ")).dimmed())?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_navigation() {
        assert_eq!(parse_action("next").unwrap(), Some(Action::Next));
        assert_eq!(parse_action("  p ").unwrap(), Some(Action::Previous));
        assert_eq!(parse_action("").unwrap(), None);
    }

    #[test]
    fn create_keeps_the_whole_summary() {
        assert_eq!(
            parse_action("create 10001 Fix  the login form").unwrap(),
            Some(Action::Create {
                issue_type: "10001".to_string(),
                summary: "Fix  the login form".to_string(),
            })
        );
    }

    #[test]
    fn assign_none_unassigns() {
        assert_eq!(
            parse_action("assign ABC-7 none").unwrap(),
            Some(Action::Assign {
                key: "ABC-7".to_string(),
                assignee: None,
            })
        );
    }

    #[test]
    fn missing_argument_is_reported() {
        let err = parse_action("delete").unwrap_err();
        assert_eq!(err.to_string(), "'delete' needs an issue key");
    }

    #[test]
    fn unknown_command_is_reported() {
        assert!(parse_action("frobnicate").is_err());
        assert!(parse_action("dismiss abc").is_err());
    }

    #[test]
    fn rest_skips_leading_words() {
        assert_eq!(rest("edit ABC-1 New title ", 2), "New title");
        assert_eq!(rest("edit ABC-1", 2), "");
    }
}
