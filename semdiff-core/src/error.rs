//! Error types for semdiff-core.

use thiserror::Error;

/// Result type alias for semdiff-core operations.
pub type Result<T> = std::result::Result<T, SemdiffError>;

/// Broad classes of failure, used by callers to pick exit codes and prefixes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The locator could not be split or uses an unknown address shape.
    Format,
    /// The locator was well formed but names nothing we can resolve.
    Resolution,
    /// An analyzer or adapter failed on a resource that does exist.
    Analysis,
}

impl ErrorKind {
    /// Prefix used when reporting the error to a user.
    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::Format => "Format error",
            ErrorKind::Resolution => "Resolution error",
            ErrorKind::Analysis => "Analysis error",
        }
    }
}

/// Errors that can occur while resolving or diffing resources.
#[derive(Error, Debug)]
pub enum SemdiffError {
    /// Locator cannot be split unambiguously, or has a bad revision address.
    #[error("Invalid locator: {message}")]
    Format {
        /// What was expected.
        message: String,
    },

    /// No adapter is registered for the scheme.
    #[error("Unsupported scheme: {scheme}://")]
    UnsupportedScheme {
        /// Scheme as written in the locator.
        scheme: String,
    },

    /// Filesystem path does not exist.
    #[error("Path not found: {path}")]
    PathNotFound {
        /// Path as given.
        path: String,
    },

    /// No registered analyzer handles this file.
    #[error("No analyzer registered for: {path}")]
    NoAnalyzer {
        /// File path.
        path: String,
    },

    /// Path is not inside a git work tree.
    #[error("Not a version-controlled resource: {path}")]
    NotVersionControlled {
        /// Path that was checked.
        path: String,
    },

    /// Revision expression does not name a commit.
    #[error("Unknown revision: {revision}")]
    UnknownRevision {
        /// Revision expression.
        revision: String,
    },

    /// Path does not exist in the tree of the given revision.
    #[error("Path not found at revision {revision}: {path}")]
    PathNotFoundAtRevision {
        /// Repository-relative path.
        path: String,
        /// Revision expression.
        revision: String,
    },

    /// Analyzer failed to produce a structure.
    #[error("Failed to analyze {path}: {message}")]
    Analysis {
        /// File that was being analyzed.
        path: String,
        /// Analyzer diagnostic.
        message: String,
    },

    /// Adapter failed to construct or produce a structure.
    #[error("Adapter {scheme}:// failed: {message}")]
    Adapter {
        /// Adapter scheme.
        scheme: String,
        /// Adapter diagnostic.
        message: String,
    },

    /// External command exited unsuccessfully or could not be spawned.
    #[error("Command `{command}` failed ({status}): {stderr}")]
    Command {
        /// Command line that was run.
        command: String,
        /// Exit status description.
        status: String,
        /// Captured diagnostic output.
        stderr: String,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SemdiffError {
    pub fn format(message: impl Into<String>) -> Self {
        SemdiffError::Format {
            message: message.into(),
        }
    }

    pub fn analysis(path: impl Into<String>, message: impl Into<String>) -> Self {
        SemdiffError::Analysis {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SemdiffError::Format { .. } => ErrorKind::Format,
            SemdiffError::Analysis { .. }
            | SemdiffError::Adapter { .. }
            | SemdiffError::Json(_) => ErrorKind::Analysis,
            SemdiffError::UnsupportedScheme { .. }
            | SemdiffError::PathNotFound { .. }
            | SemdiffError::NoAnalyzer { .. }
            | SemdiffError::NotVersionControlled { .. }
            | SemdiffError::UnknownRevision { .. }
            | SemdiffError::PathNotFoundAtRevision { .. }
            | SemdiffError::Command { .. }
            | SemdiffError::Io(_) => ErrorKind::Resolution,
        }
    }
}
