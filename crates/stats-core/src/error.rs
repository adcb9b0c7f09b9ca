use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the chat-stats pipeline.
#[derive(Error, Debug)]
pub enum StatsError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// The conversation data directory does not exist.
    #[error("Data directory not found: {0}")]
    DataDirNotFound(PathBuf),

    /// The filtered-messages artifact is absent at analyze time.
    #[error("{0} not found. Run the collect stage first to produce it")]
    InterchangeNotFound(PathBuf),

    /// The message sequence holds nothing to divide by.
    #[error("Nothing to aggregate: {0}")]
    EmptyInput(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the chat-stats crates.
pub type Result<T> = std::result::Result<T, StatsError>;
