use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunboardError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Access denied by GitHub for {0}")]
    AccessDenied(String),

    #[error("GitHub API request failed with status {status}")]
    Upstream { status: u16 },

    #[error("Repository already registered: {0}")]
    Duplicate(String),

    #[error("Repository not registered: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RunboardError>;
