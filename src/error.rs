use std::io;
use std::sync::Arc;

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

#[derive(Debug, Diagnostic, Clone, Eq, PartialEq, Error)]
#[error("Failed to parse command line")]
pub struct ShellError<D: Diagnostic = ShellDiagnostic> {
    /// Original input that this failure came from.
    #[source_code]
    pub input: Arc<String>,

    /// Sub-diagnostics for this failure.
    #[related]
    pub diagnostics: Vec<D>,
}

/// An individual diagnostic message for a command-line parsing issue.
#[derive(Debug, Diagnostic, Clone, Eq, PartialEq, Error)]
#[error("{}", message.clone().unwrap_or_else(|| "Unexpected error".into()))]
pub struct ShellDiagnostic {
    /// Shared source for the diagnostic.
    #[source_code]
    pub input: Arc<String>,

    /// Offset in chars of the error.
    #[label("{}", label.clone().unwrap_or_else(|| "here".into()))]
    pub span: SourceSpan,

    /// Message for the error itself.
    pub message: Option<String>,

    /// Label text for this span. Defaults to `"here"`.
    pub label: Option<String>,

    /// Suggestion for fixing the parser error.
    #[help]
    pub help: Option<String>,

    /// Severity level for the Diagnostic.
    #[diagnostic(severity)]
    pub severity: miette::Severity,
}

/// Failure taxonomy for filesystem operations.
///
/// Every operation converts failures into one of these at its own boundary;
/// the dispatcher renders them as a single console line and the REPL loop
/// carries on.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum OpError {
    /// The named path does not resolve to an existing entry.
    #[error("'{0}' not found")]
    NotFound(String),

    /// The destination collides or the source is the wrong kind for the
    /// command.
    #[error("{0}")]
    InvalidTarget(String),

    /// The host denied the operation.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Anything else the host reported.
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

pub type OpResult<T> = Result<T, OpError>;

impl OpError {
    /// Classify an I/O failure for `path` into the taxonomy.
    pub fn io(path: impl AsRef<std::path::Path>, err: io::Error) -> Self {
        let shown = path.as_ref().display().to_string();
        match err.kind() {
            io::ErrorKind::NotFound => OpError::NotFound(shown),
            io::ErrorKind::PermissionDenied => OpError::PermissionDenied(shown),
            _ => OpError::Unexpected(format!("{shown}: {err}")),
        }
    }
}

impl From<io::Error> for OpError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => OpError::NotFound(err.to_string()),
            io::ErrorKind::PermissionDenied => OpError::PermissionDenied(err.to_string()),
            _ => OpError::Unexpected(err.to_string()),
        }
    }
}

impl From<walkdir::Error> for OpError {
    fn from(err: walkdir::Error) -> Self {
        let path = err
            .path()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        match err.io_error().map(io::Error::kind) {
            Some(io::ErrorKind::NotFound) => OpError::NotFound(path),
            Some(io::ErrorKind::PermissionDenied) => OpError::PermissionDenied(path),
            _ => OpError::Unexpected(err.to_string()),
        }
    }
}

impl From<zip::result::ZipError> for OpError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(io_err) => io_err.into(),
            zip::result::ZipError::FileNotFound => OpError::NotFound("archive member".into()),
            other => OpError::Unexpected(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_classification() {
        // Arrange
        let not_found = OpError::io("a.txt", io::Error::new(io::ErrorKind::NotFound, "gone"));
        let denied = OpError::io("b.txt", io::Error::new(io::ErrorKind::PermissionDenied, "nope"));
        let other = OpError::io("c.txt", io::Error::other("boom"));

        // Assert
        assert_eq!(not_found, OpError::NotFound("a.txt".into()));
        assert_eq!(denied, OpError::PermissionDenied("b.txt".into()));
        assert!(matches!(other, OpError::Unexpected(_)));
    }

    #[test]
    fn test_display_is_one_line() {
        let err = OpError::NotFound("missing.txt".into());
        assert_eq!(err.to_string(), "'missing.txt' not found");
        assert!(!err.to_string().contains('\n'));
    }
}
