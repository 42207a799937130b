use panel_core::PanelError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JiraError {
    #[error("HTTP error: {0}")]
    Http(#[from] ureq::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Issue not found: {0}")]
    IssueNotFound(String),

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Authentication failed")]
    Unauthorized,

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

pub type Result<T> = std::result::Result<T, JiraError>;

impl JiraError {
    /// Attribute a bare 404 to the issue that was addressed
    pub(crate) fn for_issue(self, key: &str) -> Self {
        match self {
            JiraError::NotFound(_) => JiraError::IssueNotFound(key.to_string()),
            other => other,
        }
    }

    /// Attribute a bare 404 to the project that was addressed
    pub(crate) fn for_project(self, key: &str) -> Self {
        match self {
            JiraError::NotFound(_) => JiraError::ProjectNotFound(key.to_string()),
            other => other,
        }
    }
}

impl From<JiraError> for PanelError {
    fn from(err: JiraError) -> Self {
        match err {
            JiraError::Http(e) => PanelError::Http(e.to_string()),
            JiraError::Parse(e) => PanelError::Parse(e.to_string()),
            JiraError::Io(e) => PanelError::Io(e.to_string()),
            JiraError::IssueNotFound(key) => PanelError::IssueNotFound(key),
            JiraError::ProjectNotFound(key) => PanelError::ProjectNotFound(key),
            JiraError::NotFound(message) => PanelError::NotFound(message),
            JiraError::Unauthorized => PanelError::Unauthorized,
            JiraError::Api { status, message } => PanelError::Api { status, message },
        }
    }
}
