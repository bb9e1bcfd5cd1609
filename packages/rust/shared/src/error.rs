//! Error types for ClipScout.
//!
//! Library crates use [`ClipScoutError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all ClipScout operations.
///
/// Extraction itself is infallible by construction; these variants cover the
/// collaborators around it (config, fetching, export).
#[derive(Debug, thiserror::Error)]
pub enum ClipScoutError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while fetching a page.
    #[error("network error: {0}")]
    Network(String),

    /// Payload or markup that could not be decoded.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Input validation error (bad URL, out-of-range count, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Rendering records into an export format failed.
    #[error("export error: {0}")]
    Export(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ClipScoutError>;

impl ClipScoutError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = ClipScoutError::config("origin is not a URL");
        assert_eq!(err.to_string(), "config error: origin is not a URL");

        let err = ClipScoutError::Network("https://example.com: HTTP 503".into());
        assert!(err.to_string().starts_with("network error"));

        let err = ClipScoutError::validation("count must be between 1 and 50");
        assert!(err.to_string().contains("between 1 and 50"));
    }

    #[test]
    fn io_error_keeps_path() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = ClipScoutError::io("/tmp/page.html", source);
        assert!(err.to_string().contains("/tmp/page.html"));
    }
}
