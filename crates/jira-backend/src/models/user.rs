use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Jira user representation
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraUser {
    /// User account ID (Jira Cloud uses account IDs, not usernames)
    pub account_id: Option<String>,
    /// Display name
    pub display_name: Option<String>,
    /// Avatar URLs keyed by size ("16x16", "48x48", ...)
    #[serde(default)]
    pub avatar_urls: BTreeMap<String, String>,
    #[serde(default)]
    pub active: bool,
}
