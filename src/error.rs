//! Error types for Sok.

use thiserror::Error;

/// Library-level error type for Sok operations.
#[derive(Error, Debug)]
pub enum SokError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Warehouse error: {0}")]
    Warehouse(String),

    #[error("Catalog ingest failed: {0}")]
    Ingest(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Summarization failed: {0}")]
    Summarization(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Search query must not be empty")]
    EmptyQuery,

    #[error("No results for the current query")]
    NoResults,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),
}

/// Result type alias for Sok operations.
pub type Result<T> = std::result::Result<T, SokError>;
