//! Error types for kernsweep-exec

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while running a host command
#[derive(Error, Debug, Clone)]
pub enum ExecError {
    /// Command timed out
    #[error("command `{command}` timed out after {timeout:?}")]
    Timeout {
        /// Rendered command line
        command: String,
        /// Timeout duration that was exceeded
        timeout: Duration,
    },

    /// Process spawn error (binary missing, not executable, ...)
    #[error("failed to spawn `{command}`: {message}")]
    SpawnError {
        /// Rendered command line
        command: String,
        /// Underlying OS error
        message: String,
    },

    /// I/O error while collecting process output
    #[error("I/O error: {0}")]
    IoError(String),
}

impl ExecError {
    /// Whether the program could not be started at all
    #[must_use]
    pub fn is_spawn_failure(&self) -> bool {
        matches!(self, ExecError::SpawnError { .. })
    }
}
