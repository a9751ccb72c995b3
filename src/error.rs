use thiserror::Error;

/// Unified error type for gitflow-release operations
#[derive(Error, Debug)]
pub enum GitFlowError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Build error: {0}")]
    Build(String),

    #[error("Changelog error: {0}")]
    Changelog(String),

    #[error("Publish error: {0}")]
    Publish(String),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Gateway operation failed: {0}")]
    Gateway(String),

    #[error("No workflow matches branch '{current}' targeting '{target}'")]
    NoMatchingWorkflow { current: String, target: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),
}

/// Convenience type alias for Results in gitflow-release
pub type Result<T> = std::result::Result<T, GitFlowError>;

impl GitFlowError {
    /// Create a validation error with context
    pub fn validation(msg: impl Into<String>) -> Self {
        GitFlowError::Validation(msg.into())
    }

    /// Create a not-found error with context
    pub fn not_found(msg: impl Into<String>) -> Self {
        GitFlowError::NotFound(msg.into())
    }

    /// Create a build error with context
    pub fn build(msg: impl Into<String>) -> Self {
        GitFlowError::Build(msg.into())
    }

    /// Create a changelog error with context
    pub fn changelog(msg: impl Into<String>) -> Self {
        GitFlowError::Changelog(msg.into())
    }

    /// Create a publish error with context
    pub fn publish(msg: impl Into<String>) -> Self {
        GitFlowError::Publish(msg.into())
    }

    /// Create a format error with context
    pub fn format(msg: impl Into<String>) -> Self {
        GitFlowError::Format(msg.into())
    }

    /// Create a gateway error with context
    pub fn gateway(msg: impl Into<String>) -> Self {
        GitFlowError::Gateway(msg.into())
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        GitFlowError::Config(msg.into())
    }

    /// Whether this error must abort the pipeline.
    ///
    /// Changelog maintenance is best-effort; every other kind is fatal.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, GitFlowError::Changelog(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, GitFlowError::NotFound(_))
    }
}
