// src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Login to ILIAS failed. Check your user id and password.")]
    LoginFailed,
    #[error("No user id provided, cannot log in")]
    UserMissing,
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Network middleware error: {0}")]
    NetworkMiddleware(#[from] reqwest_middleware::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to persist temporary file: {0}")]
    TempFilePersist(#[from] tempfile::PersistError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
    #[error("Page '{url}' has no {what}")]
    Markup { what: &'static str, url: String },
    #[error("Interrupted by user")]
    UserInterrupt,
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;
