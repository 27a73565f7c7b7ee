use thiserror::Error;

pub type Result<T> = std::result::Result<T, PgnavError>;

#[derive(Debug, Error)]
pub enum PgnavError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config error: {0}")]
    Config(String),
    #[error("Invalid command: {0}")]
    Command(String),
    #[error("Error: {0}")]
    Generic(String),
}

impl From<String> for PgnavError {
    fn from(error: String) -> Self {
        PgnavError::Generic(error)
    }
}

impl From<&str> for PgnavError {
    fn from(error: &str) -> Self {
        PgnavError::Generic(error.to_string())
    }
}

/// Failure reported by a children loader. Never escapes the navigator: it
/// is rendered as a synthetic error node under the parent that failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoaderError {
    #[error("no such object: {0}")]
    NotFound(String),
    #[error("load failed: {0}")]
    Failed(String),
    #[error("load cancelled")]
    Cancelled,
}
