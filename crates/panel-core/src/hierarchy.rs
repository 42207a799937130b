//! Paginated retrieval of root issues together with their direct subtasks.

use std::thread;

use tracing::{debug, warn};

use crate::error::Result;
use crate::models::{Issue, IssueNode, TreePage};
use crate::traits::IssueGateway;

/// Fetch one page of root issues and attach each one's subtasks.
///
/// A failure of the root listing fails the whole page. Subtasks are fetched
/// with one request per parent, concurrently; a failed subtask request leaves
/// that parent with no children and does not affect the others.
pub fn fetch_tree_page(
    gateway: &dyn IssueGateway,
    project: &str,
    cursor: &str,
    page_size: usize,
) -> Result<TreePage> {
    let page = gateway.list_root_issues(project, cursor, page_size)?;
    debug!(
        project,
        cursor,
        roots = page.issues.len(),
        is_last = page.is_last,
        "fetched root issue page"
    );

    Ok(TreePage {
        issues: attach_children(gateway, page.issues),
        next_page_cursor: page.next_page_cursor,
        is_last: page.is_last,
    })
}

/// Attach subtasks to every root issue, keeping the root order
pub fn attach_children(gateway: &dyn IssueGateway, roots: Vec<Issue>) -> Vec<IssueNode> {
    thread::scope(|scope| {
        let pending: Vec<_> = roots
            .into_iter()
            .map(|issue| {
                let handle = issue.has_subtasks().then(|| {
                    let keys = issue.subtasks.clone();
                    scope.spawn(move || children_of(gateway, &keys))
                });
                (issue, handle)
            })
            .collect();

        pending
            .into_iter()
            .map(|(issue, handle)| {
                let children = match handle {
                    Some(handle) => handle.join().unwrap_or_else(|_| {
                        warn!(issue = %issue.key, "subtask fetch panicked");
                        Vec::new()
                    }),
                    None => Vec::new(),
                };
                IssueNode { issue, children }
            })
            .collect()
    })
}

fn children_of(gateway: &dyn IssueGateway, keys: &[String]) -> Vec<Issue> {
    match gateway.issues_by_keys(keys) {
        Ok(children) => children,
        Err(e) => {
            warn!(keys = ?keys, error = %e, "failed to fetch subtasks");
            Vec::new()
        }
    }
}

/// Stack of visited page cursors for backward navigation over a
/// forward-only listing. The top of the stack is the current cursor and the
/// bottom is always the empty (first page) cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorStack {
    visited: Vec<String>,
}

impl Default for CursorStack {
    fn default() -> Self {
        Self::new()
    }
}

impl CursorStack {
    pub fn new() -> Self {
        Self {
            visited: vec![String::new()],
        }
    }

    /// Cursor of the page currently shown
    pub fn current(&self) -> &str {
        self.visited.last().map(String::as_str).unwrap_or("")
    }

    pub fn depth(&self) -> usize {
        self.visited.len()
    }

    pub fn is_first_page(&self) -> bool {
        self.visited.len() <= 1
    }

    /// Move forward: remember the current cursor and adopt `next`
    pub fn push(&mut self, next: impl Into<String>) {
        self.visited.push(next.into());
    }

    /// Move backward and return the cursor to re-fetch. Does nothing on the
    /// first page.
    pub fn pop(&mut self) -> Option<&str> {
        if self.is_first_page() {
            return None;
        }
        self.visited.pop();
        Some(self.current())
    }

    pub fn reset(&mut self) {
        self.visited.truncate(1);
    }
}
