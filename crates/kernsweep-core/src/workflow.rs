//! Safe removal of the oldest unused kernel

use kernsweep_pkg::{HostError, KernelHost};
use serde::Serialize;
use tracing::{error, info, instrument, warn};

use crate::config::Context;
use crate::confirm::Confirmer;
use crate::error::{KernelError, RemovalStage};
use crate::inventory::{PackageGroup, discover_installed};
use crate::select::select_oldest_removable;
use crate::state::WorkflowState;

/// What a removal run intends to do
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovalPlan {
    /// Running kernel release, kept
    pub running: String,
    /// Kernel and packages to purge
    pub group: PackageGroup,
}

/// How a removal run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowOutcome {
    /// No kernel can be removed without losing the fallback
    NothingToRemove,
    /// Plan computed, nothing mutated
    DryRun(RemovalPlan),
    /// Operator declined; nothing mutated
    Aborted(RemovalPlan),
    /// Packages purged and bootloader regenerated
    Removed(RemovalPlan),
}

/// Drives one removal run through its state machine
///
/// Idle -> PackagesResolved -> ConfirmationPending -> Removing ->
/// BootloaderUpdating -> Done, branching to DryRun after resolution.
pub struct RemovalWorkflow<'a> {
    ctx: &'a Context,
    host: &'a dyn KernelHost,
    confirmer: &'a dyn Confirmer,
    state: WorkflowState,
}

impl<'a> RemovalWorkflow<'a> {
    pub fn new(ctx: &'a Context, host: &'a dyn KernelHost, confirmer: &'a dyn Confirmer) -> Self {
        Self {
            ctx,
            host,
            confirmer,
            state: WorkflowState::Idle,
        }
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> WorkflowState {
        self.state
    }

    fn transition_to(&mut self, next: WorkflowState) -> Result<(), KernelError> {
        if !self.state.can_transition_to(next) {
            return Err(KernelError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }

        info!(from = %self.state, to = %next, "state transition");
        self.state = next;
        Ok(())
    }

    /// Discover installed kernels and pick the group to remove
    async fn resolve(&mut self) -> Result<Option<RemovalPlan>, KernelError> {
        let installed = discover_installed(self.host).await?;
        let current = self.ctx.current();

        let Some(version) = select_oldest_removable(&installed, current) else {
            info!(running = %current, "no removable kernel");
            self.transition_to(WorkflowState::Done)?;
            return Ok(None);
        };

        let group = installed.package_group(&version);
        self.transition_to(WorkflowState::PackagesResolved)?;

        if group.is_empty() {
            warn!(kernel = %version, "no packages found for kernel");
            self.transition_to(WorkflowState::Done)?;
            return Ok(None);
        }

        info!(
            kernel = %version,
            packages = %group.packages.join(", "),
            "resolved removal plan"
        );

        Ok(Some(RemovalPlan {
            running: current.release().to_string(),
            group,
        }))
    }

    /// Run the workflow to a terminal state
    ///
    /// # Errors
    /// Discovery and parse errors before any mutation; `KernelError::Removal`
    /// when the purge or the bootloader update fails. Already purged packages
    /// are not restored.
    #[instrument(skip(self), fields(running = %self.ctx.current(), dry_run = self.ctx.is_dry_run()))]
    pub async fn run(&mut self) -> Result<WorkflowOutcome, KernelError> {
        if self.ctx.current().version().is_none() {
            return Err(KernelError::VersionParse(
                self.ctx.current().release().to_string(),
            ));
        }

        let Some(plan) = self.resolve().await? else {
            return Ok(WorkflowOutcome::NothingToRemove);
        };

        if self.ctx.is_dry_run() {
            self.transition_to(WorkflowState::DryRun)?;
            info!("dry run, nothing removed");
            return Ok(WorkflowOutcome::DryRun(plan));
        }

        self.transition_to(WorkflowState::ConfirmationPending)?;
        if !self.confirmer.confirm(&plan).await {
            self.transition_to(WorkflowState::Aborted)?;
            info!(kernel = %plan.group.version, "removal declined");
            return Ok(WorkflowOutcome::Aborted(plan));
        }

        self.transition_to(WorkflowState::Removing)?;
        if let Err(source) = self.host.purge_packages(&plan.group.packages).await {
            return Err(self.fail(RemovalStage::Purge, Vec::new(), source));
        }
        info!(kernel = %plan.group.version, "kernel packages purged");

        self.transition_to(WorkflowState::BootloaderUpdating)?;
        if let Err(source) = self.host.update_bootloader().await {
            return Err(self.fail(RemovalStage::Bootloader, plan.group.packages.clone(), source));
        }

        self.transition_to(WorkflowState::Done)?;
        Ok(WorkflowOutcome::Removed(plan))
    }

    fn fail(
        &mut self,
        stage: RemovalStage,
        removed: Vec<String>,
        source: HostError,
    ) -> KernelError {
        let previous = self.state;
        self.state = WorkflowState::Failed;

        error!(
            previous_state = %previous,
            stage = %stage,
            removed = %removed.join(", "),
            error = %source,
            "removal failed"
        );

        // apt-get refusing to run before touching anything is a privilege problem
        if stage == RemovalStage::Purge && source.needs_root() {
            return KernelError::Privilege(source.detail().trim().to_string());
        }

        KernelError::Removal {
            stage,
            removed,
            source,
        }
    }
}
