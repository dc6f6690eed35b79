//! kernsweep-core: Kernel selection and removal logic
//!
//! Parses and orders kernel versions, picks the oldest kernel that can go
//! while keeping the running kernel and one fallback, and drives the removal
//! through a confirm-then-purge state machine. All host access goes through
//! [`kernsweep_pkg::KernelHost`].

pub mod config;
pub mod confirm;
pub mod error;
pub mod inventory;
pub mod select;
pub mod state;
pub mod status;
pub mod version;
pub mod workflow;

pub use config::{Context, RunMode};
pub use confirm::{Confirmer, StdinConfirmer, is_affirmative};
pub use error::{KernelError, RemovalStage};
pub use inventory::{
    InstalledKernelSet, KernelPackage, PackageGroup, PackageKind, discover_current_kernel,
    discover_current_kernel_lenient, discover_installed,
};
pub use select::{removable_candidates, select_oldest_removable};
pub use state::WorkflowState;
pub use status::{KernelEntry, StatusReport, status};
pub use version::{CurrentKernel, KernelVersion};
pub use workflow::{RemovalPlan, RemovalWorkflow, WorkflowOutcome};
