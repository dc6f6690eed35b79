//! Error types for kernsweep-pkg

use thiserror::Error;

/// Errors that can occur while talking to the package host
#[derive(Error, Debug, Clone)]
pub enum HostError {
    /// A read-only query (`uname`, `dpkg -l`) exited non-zero
    #[error("query `{command}` failed with status {status}: {stderr}")]
    QueryFailed {
        /// Rendered command line
        command: String,
        /// Exit status
        status: i32,
        /// Stderr output
        stderr: String,
    },

    /// A mutating command exited non-zero
    #[error("command `{command}` failed with status {status}: {message}")]
    CommandFailed {
        /// Rendered command line
        command: String,
        /// Exit status
        status: i32,
        /// Error message
        message: String,
    },

    /// Lock file conflict (another dpkg/apt process running)
    #[error("lock file conflict: {0}")]
    LockConflict(String),

    /// Insufficient permissions (need root)
    #[error("insufficient permissions: {0}")]
    PermissionDenied(String),

    /// Query output could not be interpreted
    #[error("parse error: {0}")]
    ParseError(String),

    /// The command could not be run at all
    #[error("execution error: {0}")]
    ExecutionError(String),
}

impl HostError {
    /// Check if error indicates the caller lacks root
    #[must_use]
    pub fn needs_root(&self) -> bool {
        matches!(self, HostError::PermissionDenied(_))
    }

    /// Stderr or message text attached to the error, if any
    #[must_use]
    pub fn detail(&self) -> &str {
        match self {
            HostError::QueryFailed { stderr, .. } => stderr,
            HostError::CommandFailed { message, .. } => message,
            HostError::LockConflict(msg)
            | HostError::PermissionDenied(msg)
            | HostError::ParseError(msg)
            | HostError::ExecutionError(msg) => msg,
        }
    }
}
