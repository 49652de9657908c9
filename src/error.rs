//! Error types for Palaver.

use thiserror::Error;

/// Library-level error type for Palaver operations.
#[derive(Error, Debug)]
pub enum PalaverError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Graph error: {0}")]
    Graph(String),
}

/// Result type alias for Palaver operations.
pub type Result<T> = std::result::Result<T, PalaverError>;
