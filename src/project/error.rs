//! Error types for the project layer.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for project operations.
pub type ProjectResult<T> = Result<T, ProjectError>;

/// Errors that stop a run before any unit is inspected.
#[derive(Debug, Error)]
pub enum ProjectError {
    /// The project directory does not exist.
    #[error("No project directory at {path}")]
    ProjectDirNotFound { path: PathBuf },

    /// No `compile_commands.json` where one was expected.
    #[error("No compilation database found at {path}")]
    DatabaseNotFound { path: PathBuf },

    /// IO error while reading the build description.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The build description is not valid JSON of the expected shape.
    #[error("Malformed compilation database {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// An entry has neither `arguments` nor `command`.
    #[error("Entry for {file} has neither `arguments` nor `command`")]
    MissingCommand { file: String },

    /// A `command` string ends inside a quoted section.
    #[error("Unbalanced quotes in command: {command}")]
    UnbalancedQuotes { command: String },
}
