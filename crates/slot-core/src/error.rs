//! Error types for slot-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in slot-core
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file or create its directory
    #[error("failed to write '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A record dump is not valid JSON or does not match the dump layout
    #[error("failed to parse record dump '{path}': {source}")]
    DumpParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A config file is not valid JSON or does not match the config layout
    #[error("failed to parse config '{path}': {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// CSV writer error while serializing export rows
    #[error("failed to write export rows: {0}")]
    Csv(#[from] csv::Error),

    /// Directory traversal error
    #[error("failed to traverse directory: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// Record dump directory does not exist
    #[error("record dump directory not found: {0}")]
    DumpDirNotFound(PathBuf),

    /// Load order file does not exist
    #[error("load order file not found: {0}")]
    LoadOrderNotFound(PathBuf),

    /// Malformed plugin file name
    #[error("invalid mod key: '{0}'")]
    InvalidModKey(String),

    /// Malformed record identity
    #[error("invalid form key '{input}': {reason}")]
    InvalidFormKey { input: String, reason: String },

    /// No mod in the load order defines the record
    #[error("no record found for form key {0}")]
    RecordNotFound(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
