//! Core error types for kernsweep-core

use std::fmt;

use kernsweep_pkg::HostError;
use thiserror::Error;

use crate::state::WorkflowState;

/// Step of the removal workflow that mutates the system
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalStage {
    /// Package purge
    Purge,
    /// Bootloader configuration regeneration
    Bootloader,
}

impl fmt::Display for RemovalStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemovalStage::Purge => write!(f, "package purge"),
            RemovalStage::Bootloader => write!(f, "bootloader update"),
        }
    }
}

/// Errors that can occur while discovering, selecting or removing kernels
///
/// Every variant is terminal for the invocation; nothing is retried.
#[derive(Error, Debug, Clone)]
pub enum KernelError {
    /// Running kernel or installed packages could not be determined
    #[error("cannot determine {what}")]
    Discovery {
        /// What was being queried
        what: &'static str,
        /// Underlying host failure
        #[source]
        source: HostError,
    },

    /// A kernel version string did not match `major.minor.patch-revision`
    #[error("invalid kernel version: {0}")]
    VersionParse(String),

    /// Package purge or bootloader update failed
    #[error("{stage} failed")]
    Removal {
        /// Failing step
        stage: RemovalStage,
        /// Packages already removed when the failure happened
        removed: Vec<String>,
        /// Underlying host failure
        #[source]
        source: HostError,
    },

    /// Mutating run attempted without root
    #[error("insufficient privileges: {0}")]
    Privilege(String),

    /// Run interrupted by the user
    #[error("interrupted by user")]
    UserAbort,

    /// Invalid workflow state transition attempted
    #[error("invalid state transition from {from} to {to}")]
    InvalidTransition {
        /// Current state
        from: WorkflowState,
        /// Attempted target state
        to: WorkflowState,
    },
}

impl KernelError {
    /// Packages already removed before the failure, empty for non-removal errors
    #[must_use]
    pub fn removed_packages(&self) -> &[String] {
        match self {
            KernelError::Removal { removed, .. } => removed,
            _ => &[],
        }
    }
}
