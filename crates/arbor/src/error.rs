//! Error types for Arbor operations.
//!
//! Errors fall into two groups:
//!
//! - **`Error`**: failures of a single request. Query problems (unsupported
//!   language, out-of-range positions, malformed patterns) fail one query and
//!   leave the cache untouched. Infrastructure problems (grammar loading, I/O,
//!   configuration) stop the current operation.
//! - **`FileError`**: per-file problems collected while mapping a directory.
//!   They are reported alongside the results and never abort the walk.
//!
//! Syntax errors inside a source file are not errors at this level. They are
//! data carried in every parse result (see [`crate::SyntaxError`]).
//!
//! ## Error Categorization
//!
//! Both enums use a 4xx/5xx style split:
//! - Input problems (caller's fault): unsupported language, bad position, bad pattern
//! - Internal problems (our fault): grammar load failures, I/O, configuration

use std::path::PathBuf;
use thiserror::Error;

/// Result type for Arbor operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for Arbor operations.
#[derive(Debug, Error)]
pub enum Error {
    /// No grammar is registered for the file's language
    #[error("unsupported language: no grammar for {}", path.display())]
    Unsupported {
        /// Path whose language could not be resolved
        path: PathBuf,
    },

    /// A position lies outside the document
    #[error("position {position} is out of range (document length {length} bytes)")]
    OutOfRange {
        /// The requested position, rendered for display
        position: String,
        /// Length of the document in bytes
        length: usize,
    },

    /// A structural pattern could not be parsed
    #[error("malformed pattern at offset {offset}: {message}")]
    MalformedPattern {
        /// Byte offset inside the pattern where parsing failed
        offset: usize,
        /// What was wrong
        message: String,
    },

    /// A grammar could not be loaded into the parser
    #[error("grammar error: {0}")]
    Grammar(String),

    /// File system operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration or arguments
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Returns `true` if the caller can fix this error by changing the request.
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::Unsupported { .. } | Self::OutOfRange { .. } | Self::MalformedPattern { .. }
        )
    }

    /// Returns `true` if this is an infrastructure failure.
    #[must_use]
    pub fn is_internal_error(&self) -> bool {
        !self.is_input_error()
    }

    pub(crate) fn malformed(offset: usize, message: impl Into<String>) -> Self {
        Self::MalformedPattern {
            offset,
            message: message.into(),
        }
    }
}

/// Problem encountered with one file while mapping a directory.
///
/// Collected during the walk; the remaining files are still analyzed.
#[derive(Debug, Clone, serde::Serialize)]
pub struct FileError {
    /// Path to the file that failed
    pub path: PathBuf,
    /// Category of the error
    pub kind: FileErrorKind,
    /// Human-readable error message
    pub message: String,
}

impl std::fmt::Display for FileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} ({})",
            self.path.display(),
            self.message,
            self.kind
        )
    }
}

impl std::error::Error for FileError {}

/// Categorization of per-file errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileErrorKind {
    // === Input Problems (analogous to HTTP 4xx) ===
    /// The file parsed, but with syntax errors
    SyntaxErrors,

    /// File content is not valid UTF-8
    EncodingError,

    // === Internal Problems (analogous to HTTP 5xx) ===
    /// Could not read the file from disk
    IoError,

    /// The grammar failed to load
    GrammarError,
}

impl std::fmt::Display for FileErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SyntaxErrors => write!(f, "syntax errors"),
            Self::EncodingError => write!(f, "encoding error"),
            Self::IoError => write!(f, "I/O error"),
            Self::GrammarError => write!(f, "grammar error"),
        }
    }
}

impl FileErrorKind {
    /// Returns `true` if this is an input problem (4xx-style).
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::SyntaxErrors | Self::EncodingError)
    }
}

impl FileError {
    /// Create a new file error.
    #[must_use]
    pub fn new(path: PathBuf, kind: FileErrorKind, message: impl Into<String>) -> Self {
        Self {
            path,
            kind,
            message: message.into(),
        }
    }

    /// Create a syntax error summary for a file.
    #[must_use]
    pub fn syntax(path: PathBuf, count: usize, first_line: u32) -> Self {
        Self::new(
            path,
            FileErrorKind::SyntaxErrors,
            format!("{count} syntax error(s), first at line {first_line}"),
        )
    }

    /// Create an encoding error for a file.
    #[must_use]
    pub fn encoding_error(path: PathBuf) -> Self {
        Self::new(path, FileErrorKind::EncodingError, "file is not valid UTF-8")
    }

    /// Create an I/O error for a file.
    #[must_use]
    pub fn io_error(path: PathBuf, error: &std::io::Error) -> Self {
        Self::new(path, FileErrorKind::IoError, error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_errors_are_input_errors() {
        let unsupported = Error::Unsupported {
            path: PathBuf::from("notes.txt"),
        };
        let range = Error::OutOfRange {
            position: "offset 40".to_string(),
            length: 12,
        };
        let pattern = Error::malformed(3, "expected ')'");

        assert!(unsupported.is_input_error());
        assert!(range.is_input_error());
        assert!(pattern.is_input_error());
        assert!(Error::Grammar("abi mismatch".to_string()).is_internal_error());
        assert!(Error::Config("bad".to_string()).is_internal_error());
    }

    #[test]
    fn malformed_pattern_display_includes_offset() {
        let error = Error::malformed(7, "unterminated string");

        let display = error.to_string();
        assert!(display.contains("offset 7"));
        assert!(display.contains("unterminated string"));
    }

    #[test]
    fn file_error_display_includes_path_and_kind() {
        let error = FileError::syntax(PathBuf::from("src/app.py"), 2, 14);

        let display = error.to_string();
        assert!(display.contains("src/app.py"));
        assert!(display.contains("line 14"));
        assert!(display.contains("syntax errors"));
        assert!(error.kind.is_input_error());
    }

    #[test]
    fn io_file_error_is_internal() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error = FileError::io_error(PathBuf::from("secret.rs"), &io);

        assert!(!error.kind.is_input_error());
        assert!(error.message.contains("denied"));
    }
}
