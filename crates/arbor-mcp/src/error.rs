//! Error types for the arbor MCP server.

use thiserror::Error;

/// Errors that can occur in the arbor MCP server.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested path resolves outside the allowed root.
    #[error("Access denied: {path} is outside the allowed root {root}")]
    AccessDenied {
        /// The path as requested.
        path: String,
        /// The allowed root directory.
        root: String,
    },

    /// The allowed root does not exist or is not a directory.
    #[error("Root not found: {path}")]
    RootNotFound {
        /// The path that was not found.
        path: String,
        /// The underlying IO error, if any.
        #[source]
        source: Option<std::io::Error>,
    },

    /// Invalid argument value provided.
    #[error("Invalid {field}: '{value}'. Valid values: {valid_values}")]
    InvalidArgument {
        /// The field name that had an invalid value.
        field: &'static str,
        /// The invalid value that was provided.
        value: String,
        /// Description of valid values.
        valid_values: &'static str,
    },

    /// An error from the analyzer.
    #[error("Analysis error: {0}")]
    Analysis(#[from] arbor::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A blocking analysis task panicked or was cancelled.
    #[error("Analysis task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Result type for arbor MCP operations.
pub type Result<T> = std::result::Result<T, Error>;
