//! Per-invocation context shared by all operations

use kernsweep_pkg::KernelHost;

use crate::error::KernelError;
use crate::inventory::{discover_current_kernel, discover_current_kernel_lenient};
use crate::version::CurrentKernel;

/// What a run does once the removal plan is known
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Confirm, then purge and update the bootloader
    #[default]
    Remove,
    /// Report the plan without mutating the system
    DryRun,
}

/// Settings and host facts fixed for the lifetime of the process
#[derive(Debug, Clone)]
pub struct Context {
    /// Running kernel, queried once at startup
    current: CurrentKernel,
    /// Show informational detail
    pub verbose: bool,
    pub mode: RunMode,
}

impl Context {
    /// Create a context for a known running kernel
    #[must_use]
    pub fn new(current: CurrentKernel) -> Self {
        Self {
            current,
            verbose: false,
            mode: RunMode::default(),
        }
    }

    /// Query the running kernel from `host` and build a context around it
    ///
    /// # Errors
    /// Returns the discovery or parse error for the running kernel
    pub async fn discover(host: &dyn KernelHost) -> Result<Self, KernelError> {
        Ok(Self::new(discover_current_kernel(host).await?))
    }

    /// Like [`Context::discover`], but a running release without a version
    /// is kept as an unversioned kernel instead of failing
    ///
    /// Only suitable for read-only reporting; [`crate::RemovalWorkflow`]
    /// refuses to run on such a context.
    ///
    /// # Errors
    /// Returns the discovery error for the running kernel
    pub async fn discover_for_status(host: &dyn KernelHost) -> Result<Self, KernelError> {
        Ok(Self::new(discover_current_kernel_lenient(host).await?))
    }

    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.mode = if dry_run {
            RunMode::DryRun
        } else {
            RunMode::Remove
        };
        self
    }

    #[must_use]
    pub fn current(&self) -> &CurrentKernel {
        &self.current
    }

    #[must_use]
    pub fn is_dry_run(&self) -> bool {
        self.mode == RunMode::DryRun
    }
}
