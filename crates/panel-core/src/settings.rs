//! Project page visibility toggle, stored as a project property.
//!
//! Only the presence of the property matters: present means the project
//! page is hidden.

use tracing::info;

use crate::error::Result;
use crate::traits::IssueGateway;

pub const PAGE_VISIBILITY_PROPERTY: &str = "show-project-page";

/// Body written under the property when the page is hidden
pub fn hidden_marker() -> serde_json::Value {
    serde_json::json!({ "value": true })
}

pub fn is_page_visible(gateway: &dyn IssueGateway, project: &str) -> Result<bool> {
    let property = gateway.get_property(project, PAGE_VISIBILITY_PROPERTY)?;
    Ok(property.is_none())
}

pub fn set_page_visible(gateway: &dyn IssueGateway, project: &str, visible: bool) -> Result<()> {
    if visible {
        gateway.delete_property(project, PAGE_VISIBILITY_PROPERTY)?;
    } else {
        gateway.save_property(project, PAGE_VISIBILITY_PROPERTY, &hidden_marker())?;
    }
    info!(project, visible, "project page visibility changed");
    Ok(())
}
