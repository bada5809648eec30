//! Error types for the conversion pipeline.
//!
//! The hierarchy follows the pipeline layers:
//!
//! - [`CoercionError`] - a numeric field value that cannot be read as a number
//! - [`ConvertError`] - any failure of `load`, `coerce` or `save`
//! - [`RunError`] - a [`ConvertError`] tagged with the [`Stage`] it happened in
//!
//! Every [`ConvertError`] maps to one of the three [`ErrorKind`]s the
//! converter can fail with.

use std::path::PathBuf;
use thiserror::Error;

use crate::pipeline::Stage;

// =============================================================================
// Coercion Errors
// =============================================================================

/// A recognized numeric field holds a value that is not a finite number.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Cannot convert field '{field}' (value '{value}') to an integer: {reason}")]
pub struct CoercionError {
    /// Field name.
    pub field: String,
    /// Raw text value.
    pub value: String,
    /// Why the value was rejected.
    pub reason: String,
}

impl CoercionError {
    pub fn new(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Conversion Errors
// =============================================================================

/// The three failure kinds a conversion can end with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    FileAccess,
    Parse,
    Coercion,
}

/// Errors raised by `load`, `coerce` and `save`.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Input missing or unreadable, or output not writable.
    #[error("Cannot access file '{}': {source}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed CSV structure or undecodable bytes.
    #[error("{}", format_parse(.path, .line, .message))]
    Parse {
        path: PathBuf,
        line: Option<u64>,
        message: String,
    },

    /// A numeric field could not be coerced.
    #[error("Row {row}: {source}")]
    Coercion {
        /// 1-based data row number (the header is not counted).
        row: usize,
        #[source]
        source: CoercionError,
    },
}

fn format_parse(path: &std::path::Path, line: &Option<u64>, message: &str) -> String {
    match line {
        Some(line) => format!(
            "Invalid CSV in '{}' at line {}: {}",
            path.display(),
            line,
            message
        ),
        None => format!("Invalid CSV in '{}': {}", path.display(), message),
    }
}

impl ConvertError {
    pub fn file_access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileAccess {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, line: Option<u64>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            line,
            message: message.into(),
        }
    }

    /// Which of the three failure kinds this is.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConvertError::FileAccess { .. } => ErrorKind::FileAccess,
            ConvertError::Parse { .. } => ErrorKind::Parse,
            ConvertError::Coercion { .. } => ErrorKind::Coercion,
        }
    }
}

// =============================================================================
// Run Errors (top-level)
// =============================================================================

/// Top-level error returned by [`crate::pipeline::run`].
#[derive(Debug, Error)]
#[error("{stage} failed: {source}")]
pub struct RunError {
    /// Stage the run was in when it failed.
    pub stage: Stage,
    #[source]
    pub source: ConvertError,
}

impl RunError {
    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for `load`, `coerce` and `save`.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Result type for a whole run.
pub type RunResult<T> = Result<T, RunError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        assert_eq!(ConvertError::file_access("in.csv", io).kind(), ErrorKind::FileAccess);
        assert_eq!(ConvertError::parse("in.csv", Some(3), "bad").kind(), ErrorKind::Parse);

        let err = ConvertError::Coercion {
            row: 1,
            source: CoercionError::new("year", "abc", "invalid float literal"),
        };
        assert_eq!(err.kind(), ErrorKind::Coercion);
    }

    #[test]
    fn test_coercion_error_format() {
        let err = ConvertError::Coercion {
            row: 4,
            source: CoercionError::new("year", "abc", "invalid float literal"),
        };
        let msg = err.to_string();
        assert!(msg.contains("Row 4"));
        assert!(msg.contains("'year'"));
        assert!(msg.contains("'abc'"));
    }

    #[test]
    fn test_parse_error_format() {
        let msg = ConvertError::parse("data.csv", Some(7), "found record with 3 fields").to_string();
        assert!(msg.contains("data.csv"));
        assert!(msg.contains("line 7"));

        let msg = ConvertError::parse("data.csv", None, "invalid UTF-8").to_string();
        assert!(!msg.contains("line"));
    }

    #[test]
    fn test_run_error_keeps_stage() {
        let err = RunError {
            stage: Stage::Saving,
            source: ConvertError::file_access(
                "out.json",
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            ),
        };
        assert_eq!(err.kind(), ErrorKind::FileAccess);
        assert!(err.to_string().starts_with("Saving failed"));
    }
}
