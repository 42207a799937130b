//! In-memory gateway used by unit tests

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use crate::error::{PanelError, Result};
use crate::models::*;
use crate::traits::IssueGateway;

pub(crate) const TO_DO: (&str, &str) = ("1", "To Do");
pub(crate) const IN_PROGRESS: (&str, &str) = ("3", "In Progress");
pub(crate) const DONE: (&str, &str) = ("10001", "Done");

pub(crate) fn status((id, name): (&str, &str)) -> Status {
    Status {
        id: id.to_string(),
        name: name.to_string(),
        category: None,
    }
}

pub(crate) fn issue(key: &str, summary: &str) -> Issue {
    Issue {
        id: key.rsplit('-').next().unwrap_or("0").to_string(),
        key: key.to_string(),
        issue_type: IssueType {
            id: "10001".to_string(),
            name: "Task".to_string(),
            icon_url: None,
        },
        summary: summary.to_string(),
        description: None,
        status: status(TO_DO),
        assignee: None,
        subtasks: Vec::new(),
        parent: None,
    }
}

/// Tracker double holding issues in memory. Cursors are "tok-<offset>".
pub(crate) struct FakeGateway {
    issues: Mutex<Vec<Issue>>,
    failing_keys: Mutex<HashSet<String>>,
    fail_listing: AtomicBool,
    fail_mutations: AtomicBool,
    fail_transitions: AtomicBool,
    calls: Mutex<Vec<String>>,
    properties: Mutex<HashMap<(String, String), serde_json::Value>>,
    next_key: AtomicU64,
    project: String,
}

impl FakeGateway {
    pub(crate) fn with_roots(project: &str, count: usize) -> Self {
        let issues = (1..=count)
            .map(|n| issue(&format!("{}-{}", project, n), &format!("Issue {}", n)))
            .collect();
        Self {
            issues: Mutex::new(issues),
            failing_keys: Mutex::new(HashSet::new()),
            fail_listing: AtomicBool::new(false),
            fail_mutations: AtomicBool::new(false),
            fail_transitions: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
            properties: Mutex::new(HashMap::new()),
            next_key: AtomicU64::new(count as u64 + 1000),
            project: project.to_string(),
        }
    }

    pub(crate) fn add_subtasks(&self, parent: &str, keys: &[&str]) {
        let mut issues = self.issues.lock().unwrap();
        for key in keys {
            let mut sub = issue(key, &format!("Subtask {}", key));
            sub.parent = Some(parent.to_string());
            issues.push(sub);
        }
        if let Some(p) = issues.iter_mut().find(|i| i.key == parent) {
            p.subtasks.extend(keys.iter().map(|k| k.to_string()));
        }
    }

    pub(crate) fn fail_keys(&self, keys: &[&str]) {
        let mut failing = self.failing_keys.lock().unwrap();
        failing.extend(keys.iter().map(|k| k.to_string()));
    }

    pub(crate) fn fail_listing(&self, fail: bool) {
        self.fail_listing.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_mutations(&self, fail: bool) {
        self.fail_mutations.store(fail, Ordering::SeqCst);
    }

    /// Make only workflow transitions fail, leaving field updates working
    pub(crate) fn fail_transitions(&self, fail: bool) {
        self.fail_transitions.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub(crate) fn find(&self, key: &str) -> Option<Issue> {
        self.issues
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.key == key)
            .cloned()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_mutation(&self) -> Result<()> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(PanelError::Api {
                status: 403,
                message: "You do not have permission".to_string(),
            });
        }
        Ok(())
    }

    fn parse_cursor(cursor: &str) -> Result<usize> {
        if cursor.is_empty() {
            return Ok(0);
        }
        cursor
            .strip_prefix("tok-")
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| PanelError::InvalidInput(format!("bad cursor {}", cursor)))
    }
}

impl IssueGateway for FakeGateway {
    fn list_root_issues(&self, project: &str, cursor: &str, page_size: usize) -> Result<IssuePage> {
        self.record(format!("list:{}", cursor));
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(PanelError::Http("connection refused".to_string()));
        }
        if project != self.project {
            return Err(PanelError::ProjectNotFound(project.to_string()));
        }

        let offset = Self::parse_cursor(cursor)?;
        let roots: Vec<Issue> = self
            .issues
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.is_root())
            .cloned()
            .collect();
        let end = (offset + page_size).min(roots.len());
        let issues = roots.get(offset..end).map(<[Issue]>::to_vec).unwrap_or_default();
        let is_last = end >= roots.len();

        Ok(IssuePage {
            issues,
            next_page_cursor: if is_last { String::new() } else { format!("tok-{}", end) },
            is_last,
        })
    }

    fn issues_by_keys(&self, keys: &[String]) -> Result<Vec<Issue>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        self.record(format!("keys:{}", keys.join(",")));
        let failing = self.failing_keys.lock().unwrap();
        if keys.iter().any(|k| failing.contains(k)) {
            return Err(PanelError::Api {
                status: 500,
                message: "Internal server error".to_string(),
            });
        }
        Ok(self
            .issues
            .lock()
            .unwrap()
            .iter()
            .filter(|i| keys.contains(&i.key))
            .cloned()
            .collect())
    }

    fn get_issue(&self, key: &str) -> Result<Issue> {
        self.find(key)
            .ok_or_else(|| PanelError::IssueNotFound(key.to_string()))
    }

    fn create_issue(&self, project: &str, new: &NewIssue) -> Result<CreatedIssue> {
        self.record(format!("create:{}", new.summary));
        self.check_mutation()?;
        let n = self.next_key.fetch_add(1, Ordering::SeqCst);
        let key = format!("{}-{}", project, n);
        let mut created = issue(&key, &new.summary);
        created.description = new.description.clone();
        created.issue_type.id = new.issue_type_id.clone();
        self.issues.lock().unwrap().insert(0, created);
        Ok(CreatedIssue {
            id: n.to_string(),
            key,
        })
    }

    fn update_issue(&self, key: &str, update: &FieldUpdate) -> Result<()> {
        self.record(format!("update:{}", key));
        self.check_mutation()?;
        let mut issues = self.issues.lock().unwrap();
        let target = issues
            .iter_mut()
            .find(|i| i.key == key)
            .ok_or_else(|| PanelError::IssueNotFound(key.to_string()))?;
        if let Some(summary) = &update.summary {
            target.summary = summary.clone();
        }
        if let Some(description) = &update.description {
            target.description = Some(description.clone());
        }
        if let Some(type_id) = &update.issue_type_id {
            target.issue_type.id = type_id.clone();
        }
        if let Some(assignee) = &update.assignee {
            target.assignee = assignee.as_ref().map(|account_id| User {
                account_id: account_id.clone(),
                display_name: account_id.clone(),
                avatar_urls: BTreeMap::new(),
            });
        }
        Ok(())
    }

    fn delete_issue(&self, key: &str) -> Result<()> {
        self.record(format!("delete:{}", key));
        self.check_mutation()?;
        let mut issues = self.issues.lock().unwrap();
        let before = issues.len();
        issues.retain(|i| i.key != key && i.parent.as_deref() != Some(key));
        if issues.len() == before {
            return Err(PanelError::IssueNotFound(key.to_string()));
        }
        Ok(())
    }

    fn get_transitions(&self, key: &str) -> Result<Vec<Transition>> {
        self.record(format!("transitions:{}", key));
        self.get_issue(key)?;
        Ok([("11", TO_DO), ("21", IN_PROGRESS), ("31", DONE)]
            .into_iter()
            .map(|(id, to)| Transition {
                id: id.to_string(),
                name: to.1.to_string(),
                to: status(to),
            })
            .collect())
    }

    fn transition_issue(&self, key: &str, transition_id: &str) -> Result<()> {
        self.record(format!("transition:{}:{}", key, transition_id));
        self.check_mutation()?;
        if self.fail_transitions.load(Ordering::SeqCst) {
            return Err(PanelError::Api {
                status: 400,
                message: "Transition is not allowed".to_string(),
            });
        }
        let to = match transition_id {
            "11" => TO_DO,
            "21" => IN_PROGRESS,
            "31" => DONE,
            other => {
                return Err(PanelError::InvalidInput(format!(
                    "Transition {} is not valid",
                    other
                )))
            }
        };
        let mut issues = self.issues.lock().unwrap();
        let target = issues
            .iter_mut()
            .find(|i| i.key == key)
            .ok_or_else(|| PanelError::IssueNotFound(key.to_string()))?;
        target.status = status(to);
        Ok(())
    }

    fn get_issue_types(&self, _project: &str) -> Result<Vec<IssueTypeInfo>> {
        Ok(vec![
            IssueTypeInfo {
                id: "10001".to_string(),
                name: "Task".to_string(),
                icon_url: None,
                subtask: false,
            },
            IssueTypeInfo {
                id: "10003".to_string(),
                name: "Sub-task".to_string(),
                icon_url: None,
                subtask: true,
            },
        ])
    }

    fn get_statuses(&self, _project: &str, _issue_type_id: Option<&str>) -> Result<Vec<Status>> {
        Ok(vec![status(TO_DO), status(IN_PROGRESS), status(DONE)])
    }

    fn get_assignable_users(&self, _project: &str, _issue_key: Option<&str>) -> Result<Vec<User>> {
        Ok(vec![User {
            account_id: "5b10a2844c20165700ede21g".to_string(),
            display_name: "Mia Krystof".to_string(),
            avatar_urls: BTreeMap::new(),
        }])
    }

    fn get_property(&self, project: &str, property: &str) -> Result<Option<ProjectProperty>> {
        self.record(format!("get-property:{}", property));
        Ok(self
            .properties
            .lock()
            .unwrap()
            .get(&(project.to_string(), property.to_string()))
            .map(|value| ProjectProperty {
                key: property.to_string(),
                value: value.clone(),
            }))
    }

    fn save_property(
        &self,
        project: &str,
        property: &str,
        value: &serde_json::Value,
    ) -> Result<()> {
        self.record(format!("save-property:{}", property));
        self.check_mutation()?;
        self.properties
            .lock()
            .unwrap()
            .insert((project.to_string(), property.to_string()), value.clone());
        Ok(())
    }

    fn delete_property(&self, project: &str, property: &str) -> Result<()> {
        self.record(format!("delete-property:{}", property));
        self.check_mutation()?;
        self.properties
            .lock()
            .unwrap()
            .remove(&(project.to_string(), property.to_string()));
        Ok(())
    }
}
