pub mod browser;
pub mod edit;
pub mod error;
pub mod hierarchy;
pub mod models;
pub mod resolver;
pub mod settings;
pub mod traits;

#[cfg(test)]
mod testing;

pub use browser::{FetchTicket, IssueBrowser, Row};
pub use edit::{apply_update, move_to_status, plan_update, IssueEdit, UpdatePlan};
pub use error::{PanelError, Result};
pub use hierarchy::{fetch_tree_page, CursorStack};
pub use models::*;
pub use resolver::{Resolver, OPERATIONS};
pub use settings::{is_page_visible, set_page_visible, PAGE_VISIBILITY_PROPERTY};
pub use traits::IssueGateway;
