//! Removal workflow state machine types

use std::fmt;

/// States of a `RemovalWorkflow`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    PackagesResolved,
    DryRun,
    ConfirmationPending,
    Removing,
    BootloaderUpdating,
    Done,
    Aborted,
    Failed,
}

impl WorkflowState {
    /// Whether the workflow may move from `self` to `next`
    #[must_use]
    pub fn can_transition_to(self, next: WorkflowState) -> bool {
        use WorkflowState::{
            Aborted, BootloaderUpdating, ConfirmationPending, Done, DryRun, Failed, Idle,
            PackagesResolved, Removing,
        };

        matches!(
            (self, next),
            (Idle, PackagesResolved | Done)
                | (PackagesResolved, ConfirmationPending | DryRun | Done)
                | (ConfirmationPending, Removing | Aborted)
                | (Removing, BootloaderUpdating | Failed)
                | (BootloaderUpdating, Done | Failed)
        )
    }

    /// No further transitions are possible
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            WorkflowState::DryRun
                | WorkflowState::Done
                | WorkflowState::Aborted
                | WorkflowState::Failed
        )
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkflowState::Idle => "idle",
            WorkflowState::PackagesResolved => "packages_resolved",
            WorkflowState::DryRun => "dry_run",
            WorkflowState::ConfirmationPending => "confirmation_pending",
            WorkflowState::Removing => "removing",
            WorkflowState::BootloaderUpdating => "bootloader_updating",
            WorkflowState::Done => "done",
            WorkflowState::Aborted => "aborted",
            WorkflowState::Failed => "failed",
        };
        f.write_str(name)
    }
}
