use thiserror::Error;

/// Backend-neutral errors surfaced by gateway operations
#[derive(Error, Debug)]
pub enum PanelError {
    #[error("Authentication failed")]
    Unauthorized,

    #[error("Issue not found: {0}")]
    IssueNotFound(String),

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl PanelError {
    /// Whether the error means the requested resource does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            PanelError::NotFound(_)
                | PanelError::IssueNotFound(_)
                | PanelError::ProjectNotFound(_)
                | PanelError::Api { status: 404, .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, PanelError>;
