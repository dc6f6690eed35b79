//! Command executor trait

use std::time::Duration;

use async_trait::async_trait;

use crate::command::CommandLine;
use crate::error::ExecError;
use crate::result::CommandResult;

/// Runs host commands and reports their exit status and output
///
/// A non-zero exit status is not an error at this level; callers inspect
/// [`CommandResult::success`].
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run a command to completion
    async fn run(&self, cmd: &CommandLine) -> Result<CommandResult, ExecError>;

    /// Run a command, failing with [`ExecError::Timeout`] if it takes too long
    async fn run_with_timeout(
        &self,
        cmd: &CommandLine,
        timeout: Duration,
    ) -> Result<CommandResult, ExecError>;
}
