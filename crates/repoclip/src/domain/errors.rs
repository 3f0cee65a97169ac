//! Domain-specific errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// The repository root cannot be used. Always fatal.
#[derive(Debug, Error)]
pub enum PathError {
    #[error("repository root {} does not exist", path.display())]
    Missing { path: PathBuf },
    #[error("repository root {} is not a directory", path.display())]
    NotADirectory { path: PathBuf },
    #[error("repository root {} is not readable", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A revision could not be inspected. Recoverable unless the commit is required.
#[derive(Debug, Error)]
pub enum RevisionError {
    #[error("invalid revision '{0}'")]
    Invalid(String),
    #[error("{} is not inside a git repository", path.display())]
    NotARepository { path: PathBuf },
    #[error("revision '{revision}' could not be resolved: {message}")]
    Unresolved { revision: String, message: String },
    #[error("git executable is unavailable")]
    GitUnavailable(#[source] io::Error),
    #[error("`git {command}` failed: {stderr}")]
    GitFailed { command: String, stderr: String },
}

/// A selected file could not be included in the document.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("failed to read {path}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("{path} is not valid UTF-8 text")]
    Binary { path: String },
    #[error("{path} is {size} bytes, above the {limit} byte limit")]
    TooLarge { path: String, size: u64, limit: u64 },
}

impl ReadError {
    /// Root-relative path of the file that was skipped.
    pub fn path(&self) -> &str {
        match self {
            ReadError::Io { path, .. }
            | ReadError::Binary { path }
            | ReadError::TooLarge { path, .. } => path,
        }
    }
}

/// No clipboard backend accepted the document.
#[derive(Debug, Error)]
#[error("clipboard unavailable: {reason}")]
pub struct ClipboardError {
    pub reason: String,
}

impl ClipboardError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}
