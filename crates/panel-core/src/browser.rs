//! State container for the issue tree view.
//!
//! Holds everything the view renders: the current page of root issues with
//! their children, which rows are expanded, the cursor stack, loading and
//! error state, and the notification flags raised by mutations.

use std::collections::BTreeSet;

use chrono::Utc;
use tracing::{debug, info};

use crate::edit::{self, IssueEdit};
use crate::error::Result;
use crate::hierarchy::{fetch_tree_page, CursorStack};
use crate::models::{
    Flag, FlagKind, Issue, IssueNode, MutationOutcome, NewIssue, TreePage, MAX_PAGE_SIZE,
};
use crate::traits::IssueGateway;

/// Handle for one outstanding page fetch. Only the most recently issued
/// ticket may update the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    cursor: String,
}

impl FetchTicket {
    pub fn cursor(&self) -> &str {
        &self.cursor
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// A rendered row of the tree
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Row<'a> {
    pub depth: usize,
    pub issue: &'a Issue,
    pub expandable: bool,
    pub expanded: bool,
}

pub struct IssueBrowser<'a> {
    gateway: &'a dyn IssueGateway,
    project: String,
    page_size: usize,
    issues: Vec<IssueNode>,
    expanded: BTreeSet<String>,
    cursors: CursorStack,
    next_cursor: String,
    is_last: bool,
    loading: bool,
    fetch_error: Option<String>,
    flags: Vec<Flag>,
    next_flag_id: u64,
    generation: u64,
}

impl<'a> IssueBrowser<'a> {
    pub fn new(gateway: &'a dyn IssueGateway, project: impl Into<String>, page_size: usize) -> Self {
        Self {
            gateway,
            project: project.into(),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
            issues: Vec::new(),
            expanded: BTreeSet::new(),
            cursors: CursorStack::new(),
            next_cursor: String::new(),
            is_last: false,
            loading: false,
            fetch_error: None,
            flags: Vec::new(),
            next_flag_id: 1,
            generation: 0,
        }
    }

    // ========== Accessors ==========

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn issues(&self) -> &[IssueNode] {
        &self.issues
    }

    pub fn current_cursor(&self) -> &str {
        self.cursors.current()
    }

    pub fn next_cursor(&self) -> &str {
        &self.next_cursor
    }

    pub fn page_number(&self) -> usize {
        self.cursors.depth()
    }

    pub fn is_last(&self) -> bool {
        self.is_last
    }

    pub fn can_go_next(&self) -> bool {
        !self.is_last && !self.loading
    }

    pub fn can_go_previous(&self) -> bool {
        !self.cursors.is_first_page() && !self.loading
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn fetch_error(&self) -> Option<&str> {
        self.fetch_error.as_deref()
    }

    /// Flags, newest first
    pub fn flags(&self) -> &[Flag] {
        &self.flags
    }

    /// Find a loaded issue, root or child
    pub fn find_issue(&self, key: &str) -> Option<&Issue> {
        self.issues.iter().find_map(|node| {
            if node.issue.key == key {
                Some(&node.issue)
            } else {
                node.children.iter().find(|c| c.key == key)
            }
        })
    }

    // ========== Fetching ==========

    /// Start a fetch of the current cursor. Any ticket issued earlier
    /// becomes stale.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        self.loading = true;
        FetchTicket {
            generation: self.generation,
            cursor: self.cursors.current().to_string(),
        }
    }

    /// Apply the result of a fetch. Returns `false` and leaves the state
    /// untouched when a newer fetch has been started since.
    pub fn finish_fetch(&mut self, ticket: FetchTicket, result: Result<TreePage>) -> bool {
        if ticket.generation != self.generation {
            debug!(
                stale = ticket.generation,
                latest = self.generation,
                "discarding stale page fetch"
            );
            return false;
        }

        self.loading = false;
        match result {
            Ok(page) => {
                self.issues = page.issues;
                self.next_cursor = page.next_page_cursor;
                self.is_last = page.is_last;
                self.fetch_error = None;
            }
            Err(e) => {
                self.issues.clear();
                self.next_cursor.clear();
                self.is_last = true;
                self.fetch_error = Some(e.to_string());
            }
        }
        true
    }

    /// Fetch the page at the current cursor
    pub fn load(&mut self) {
        let ticket = self.begin_fetch();
        let result = fetch_tree_page(self.gateway, &self.project, ticket.cursor(), self.page_size);
        self.finish_fetch(ticket, result);
    }

    /// Re-fetch the current page in place
    pub fn refresh(&mut self) {
        self.load();
    }

    /// Go to the next page. Does nothing on the last page.
    pub fn next(&mut self) -> bool {
        if self.is_last {
            return false;
        }
        let next = std::mem::take(&mut self.next_cursor);
        self.cursors.push(next);
        self.load();
        true
    }

    /// Go back one page. Does nothing on the first page.
    pub fn previous(&mut self) -> bool {
        if self.cursors.pop().is_none() {
            return false;
        }
        self.load();
        true
    }

    // ========== Expansion ==========

    pub fn is_expanded(&self, key: &str) -> bool {
        self.expanded.contains(key)
    }

    pub fn toggle_expanded(&mut self, key: &str) -> bool {
        if !self.expanded.remove(key) {
            self.expanded.insert(key.to_string());
        }
        self.is_expanded(key)
    }

    pub fn set_expanded(&mut self, key: &str, expanded: bool) {
        if expanded {
            self.expanded.insert(key.to_string());
        } else {
            self.expanded.remove(key);
        }
    }

    pub fn expand_all(&mut self) {
        for node in &self.issues {
            if !node.children.is_empty() {
                self.expanded.insert(node.issue.key.clone());
            }
        }
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    /// Rows to render: every root, followed by its children when expanded
    pub fn rows(&self) -> Vec<Row<'_>> {
        let mut rows = Vec::new();
        for node in &self.issues {
            let expanded = self.is_expanded(node.key());
            rows.push(Row {
                depth: 0,
                issue: &node.issue,
                expandable: !node.children.is_empty(),
                expanded,
            });
            if expanded {
                rows.extend(node.children.iter().map(|child| Row {
                    depth: 1,
                    issue: child,
                    expandable: false,
                    expanded: false,
                }));
            }
        }
        rows
    }

    // ========== Mutations ==========

    pub fn create_issue(&mut self, new: &NewIssue) -> MutationOutcome {
        let result = edit::validate_new_issue(new)
            .and_then(|valid| self.gateway.create_issue(&self.project, &valid));

        let outcome = match result {
            Ok(created) => {
                info!(issue = %created.key, "issue created");
                MutationOutcome::succeeded(
                    format!("Issue {} created successfully", created.key),
                    created.key,
                )
            }
            Err(e) => MutationOutcome::failed(e.to_string(), None),
        };
        let key = outcome.issue_key.clone().unwrap_or_default();
        self.complete(
            &outcome,
            ("Issue Created", format!("Issue {} created successfully!", key)),
            ("Issue Creation Failed", "create"),
        );
        outcome
    }

    /// Apply an edit to an issue. Returns `None` when nothing changed, in
    /// which case no flag is raised and nothing is re-fetched.
    pub fn update_issue(&mut self, current: &Issue, edit: &IssueEdit) -> Option<MutationOutcome> {
        let outcome = edit::apply_update(self.gateway, current, edit)?;
        self.complete(
            &outcome,
            ("Issue Updated", format!("Issue {} updated successfully!", current.key)),
            ("Issue Update Failed", "update"),
        );
        Some(outcome)
    }

    pub fn delete_issue(&mut self, key: &str) -> MutationOutcome {
        let outcome = match self.gateway.delete_issue(key) {
            Ok(()) => {
                info!(issue = key, "issue deleted");
                self.expanded.remove(key);
                MutationOutcome::succeeded(format!("Issue {} deleted successfully", key), key)
            }
            Err(e) => MutationOutcome::failed(e.to_string(), Some(key.to_string())),
        };
        self.complete(
            &outcome,
            ("Issue Deleted", format!("Issue {} deleted successfully!", key)),
            ("Issue Deletion Failed", "delete"),
        );
        outcome
    }

    /// Move an issue to a status through its workflow
    pub fn transition_to_status(&mut self, key: &str, status_id: &str) -> MutationOutcome {
        let outcome = match edit::move_to_status(self.gateway, key, status_id) {
            Ok(transition) => {
                MutationOutcome::succeeded(format!("Issue {} moved to {}!", key, transition.to.name), key)
            }
            Err(e) => MutationOutcome::failed(e.to_string(), Some(key.to_string())),
        };
        self.complete(
            &outcome,
            ("Issue Transitioned", outcome.message.clone()),
            ("Issue Transition Failed", "transition"),
        );
        outcome
    }

    /// Raise the flag for a finished mutation and re-fetch the current page
    /// whenever the tracker was written to
    fn complete(
        &mut self,
        outcome: &MutationOutcome,
        (success_title, success_text): (&str, String),
        (failure_title, verb): (&str, &str),
    ) {
        if outcome.success {
            self.push_flag(FlagKind::Success, success_title, success_text);
        } else {
            self.push_flag(
                FlagKind::Error,
                failure_title,
                format!("Failed to {} issue: {}", verb, outcome.message),
            );
        }
        if outcome.wrote {
            self.refresh();
        }
    }

    // ========== Flags ==========

    fn push_flag(&mut self, kind: FlagKind, title: &str, description: String) {
        let flag = Flag {
            id: self.next_flag_id,
            kind,
            title: title.to_string(),
            description,
            created: Utc::now(),
        };
        self.next_flag_id += 1;
        self.flags.insert(0, flag);
    }

    pub fn dismiss_flag(&mut self, id: u64) -> bool {
        let before = self.flags.len();
        self.flags.retain(|f| f.id != id);
        self.flags.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeGateway, DONE};

    fn keys(browser: &IssueBrowser<'_>) -> Vec<String> {
        browser
            .issues()
            .iter()
            .map(|n| n.key().to_string())
            .collect()
    }

    /// Project "ABC" with 12 root issues, two of which have subtasks
    fn abc_project() -> FakeGateway {
        let gateway = FakeGateway::with_roots("ABC", 12);
        gateway.add_subtasks("ABC-2", &["ABC-201", "ABC-202"]);
        gateway.add_subtasks("ABC-8", &["ABC-801"]);
        gateway
    }

    #[test]
    fn forward_then_back_reproduces_first_page() {
        let gateway = abc_project();
        let mut browser = IssueBrowser::new(&gateway, "ABC", 5);

        browser.load();
        let first_page = keys(&browser);
        let c1 = browser.next_cursor().to_string();
        assert_eq!(first_page.len(), 5);
        assert!(!browser.is_last());
        assert!(!c1.is_empty());

        assert!(browser.next());
        assert_eq!(browser.current_cursor(), c1);
        assert_eq!(keys(&browser), vec!["ABC-6", "ABC-7", "ABC-8", "ABC-9", "ABC-10"]);
        assert!(!browser.is_last());
        let c2 = browser.next_cursor().to_string();
        assert!(!c2.is_empty());
        assert_ne!(c1, c2);

        assert!(browser.previous());
        assert_eq!(browser.current_cursor(), "");
        assert_eq!(keys(&browser), first_page);
        assert_eq!(browser.next_cursor(), c1);
    }

    #[test]
    fn last_page_disables_forward_navigation() {
        let gateway = abc_project();
        let mut browser = IssueBrowser::new(&gateway, "ABC", 5);
        browser.load();
        browser.next();
        browser.next();

        assert!(browser.is_last());
        assert_eq!(keys(&browser), vec!["ABC-11", "ABC-12"]);
        assert!(!browser.can_go_next());

        gateway.clear_calls();
        assert!(!browser.next());
        assert!(gateway.calls().is_empty());
        assert_eq!(browser.page_number(), 3);
    }

    #[test]
    fn back_from_third_page_lands_on_second() {
        let gateway = abc_project();
        let mut browser = IssueBrowser::new(&gateway, "ABC", 5);
        browser.load();
        browser.next();
        let second = keys(&browser);
        browser.next();

        browser.previous();

        assert_eq!(keys(&browser), second);
        assert_eq!(browser.page_number(), 2);
    }

    #[test]
    fn back_on_first_page_is_noop() {
        let gateway = abc_project();
        let mut browser = IssueBrowser::new(&gateway, "ABC", 5);
        browser.load();
        let before = keys(&browser);
        gateway.clear_calls();

        assert!(!browser.previous());

        assert_eq!(keys(&browser), before);
        assert_eq!(browser.current_cursor(), "");
        assert!(gateway.calls().is_empty());
    }

    #[test]
    fn children_loaded_only_for_parents_with_subtasks() {
        let gateway = abc_project();
        let mut browser = IssueBrowser::new(&gateway, "ABC", 5);
        browser.load();

        for node in browser.issues() {
            assert_eq!(node.children.is_empty(), node.issue.subtasks.is_empty());
        }
    }

    #[test]
    fn delete_refreshes_current_page_and_flags_success() {
        let gateway = abc_project();
        let mut browser = IssueBrowser::new(&gateway, "ABC", 5);
        browser.load();
        browser.next();
        let cursor = browser.current_cursor().to_string();
        assert!(keys(&browser).contains(&"ABC-7".to_string()));
        gateway.clear_calls();

        let outcome = browser.delete_issue("ABC-7");

        assert!(outcome.success);
        assert!(!keys(&browser).contains(&"ABC-7".to_string()));
        assert_eq!(browser.current_cursor(), cursor);
        assert!(gateway.calls().contains(&format!("list:{}", cursor)));
        let flag = &browser.flags()[0];
        assert_eq!(flag.kind, FlagKind::Success);
        assert_eq!(flag.title, "Issue Deleted");
        assert!(flag.description.contains("ABC-7"));
    }

    #[test]
    fn failed_delete_keeps_state_and_flags_error() {
        let gateway = abc_project();
        let mut browser = IssueBrowser::new(&gateway, "ABC", 5);
        browser.load();
        let before = keys(&browser);
        gateway.fail_mutations(true);
        gateway.clear_calls();

        let outcome = browser.delete_issue("ABC-3");

        assert!(!outcome.success);
        assert_eq!(keys(&browser), before);
        assert!(!gateway.calls().iter().any(|c| c.starts_with("list:")));
        assert_eq!(browser.flags()[0].kind, FlagKind::Error);
        assert!(browser.flags()[0]
            .description
            .starts_with("Failed to delete issue:"));
    }

    #[test]
    fn update_refetches_same_cursor() {
        let gateway = abc_project();
        let mut browser = IssueBrowser::new(&gateway, "ABC", 5);
        browser.load();
        browser.next();
        let cursor = browser.current_cursor().to_string();
        let current = browser.find_issue("ABC-6").unwrap().clone();
        gateway.clear_calls();

        let outcome = browser
            .update_issue(
                &current,
                &IssueEdit {
                    summary: Some("Renamed".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert!(outcome.success);
        let lists: Vec<String> = gateway
            .calls()
            .into_iter()
            .filter(|c| c.starts_with("list:"))
            .collect();
        assert_eq!(lists, vec![format!("list:{}", cursor)]);
        assert_eq!(browser.find_issue("ABC-6").unwrap().summary, "Renamed");
        assert_eq!(browser.flags()[0].title, "Issue Updated");
    }

    #[test]
    fn failed_transition_after_field_update_still_refreshes() {
        let gateway = abc_project();
        let mut browser = IssueBrowser::new(&gateway, "ABC", 5);
        browser.load();
        gateway.fail_transitions(true);
        let current = browser.find_issue("ABC-1").unwrap().clone();
        gateway.clear_calls();

        let outcome = browser
            .update_issue(
                &current,
                &IssueEdit {
                    summary: Some("Renamed".to_string()),
                    status_id: Some(DONE.0.to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert!(!outcome.success);
        assert!(gateway.calls().iter().any(|c| c == "list:"));
        assert_eq!(browser.find_issue("ABC-1").unwrap().summary, "Renamed");
        assert_eq!(browser.flags()[0].kind, FlagKind::Error);
        assert_eq!(browser.flags()[0].title, "Issue Update Failed");
    }

    #[test]
    fn update_without_changes_raises_no_flag() {
        let gateway = abc_project();
        let mut browser = IssueBrowser::new(&gateway, "ABC", 5);
        browser.load();
        let current = browser.find_issue("ABC-1").unwrap().clone();

        assert!(browser.update_issue(&current, &IssueEdit::default()).is_none());
        assert!(browser.flags().is_empty());
    }

    #[test]
    fn create_flags_new_key_and_refreshes() {
        let gateway = abc_project();
        let mut browser = IssueBrowser::new(&gateway, "ABC", 5);
        browser.load();

        let outcome = browser.create_issue(&NewIssue {
            summary: " New work ".to_string(),
            description: None,
            issue_type_id: "10001".to_string(),
        });

        assert!(outcome.success);
        let key = outcome.issue_key.clone().unwrap();
        assert_eq!(browser.issues()[0].issue.key, key);
        assert_eq!(browser.issues()[0].issue.summary, "New work");
        assert_eq!(
            browser.flags()[0].description,
            format!("Issue {} created successfully!", key)
        );
    }

    #[test]
    fn create_with_blank_summary_makes_no_call() {
        let gateway = abc_project();
        let mut browser = IssueBrowser::new(&gateway, "ABC", 5);
        gateway.clear_calls();

        let outcome = browser.create_issue(&NewIssue {
            summary: "  ".to_string(),
            description: None,
            issue_type_id: "10001".to_string(),
        });

        assert!(!outcome.success);
        assert!(gateway.calls().is_empty());
        assert_eq!(browser.flags()[0].title, "Issue Creation Failed");
    }

    #[test]
    fn transition_flags_target_status() {
        let gateway = abc_project();
        let mut browser = IssueBrowser::new(&gateway, "ABC", 5);
        browser.load();

        let outcome = browser.transition_to_status("ABC-1", DONE.0);

        assert!(outcome.success);
        assert_eq!(browser.flags()[0].description, "Issue ABC-1 moved to Done!");
        assert_eq!(browser.find_issue("ABC-1").unwrap().status.name, "Done");
    }

    #[test]
    fn listing_failure_clears_page_and_loading() {
        let gateway = abc_project();
        let mut browser = IssueBrowser::new(&gateway, "ABC", 5);
        browser.load();
        gateway.fail_listing(true);

        browser.refresh();

        assert!(browser.issues().is_empty());
        assert!(!browser.is_loading());
        assert!(browser.fetch_error().unwrap().contains("connection refused"));
    }

    #[test]
    fn stale_fetch_does_not_overwrite_newer_state() {
        let gateway = abc_project();
        let mut browser = IssueBrowser::new(&gateway, "ABC", 5);
        browser.load();

        let stale = browser.begin_fetch();
        let stale_page = fetch_tree_page(&gateway, "ABC", stale.cursor(), 5);
        browser.next();
        let shown = keys(&browser);

        assert!(!browser.finish_fetch(stale, stale_page));
        assert_eq!(keys(&browser), shown);
    }

    #[test]
    fn expansion_controls_rendered_rows() {
        let gateway = abc_project();
        let mut browser = IssueBrowser::new(&gateway, "ABC", 5);
        browser.load();
        assert_eq!(browser.rows().len(), 5);

        assert!(browser.toggle_expanded("ABC-2"));
        let rows = browser.rows();
        assert_eq!(rows.len(), 7);
        assert_eq!(rows[2].depth, 1);
        assert!(rows[1].expanded);

        assert!(!browser.toggle_expanded("ABC-2"));
        browser.expand_all();
        assert!(browser.is_expanded("ABC-2"));
        browser.collapse_all();
        assert_eq!(browser.rows().len(), 5);
    }

    #[test]
    fn dismiss_flag_removes_it() {
        let gateway = abc_project();
        let mut browser = IssueBrowser::new(&gateway, "ABC", 5);
        browser.load();
        browser.delete_issue("ABC-1");
        let id = browser.flags()[0].id;

        assert!(browser.dismiss_flag(id));
        assert!(browser.flags().is_empty());
        assert!(!browser.dismiss_flag(id));
    }
}
