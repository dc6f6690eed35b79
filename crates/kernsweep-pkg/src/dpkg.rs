//! dpkg/apt package host (Debian/Ubuntu)

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use kernsweep_exec::{CommandExecutor, CommandLine, CommandResult};
use tracing::{debug, info, instrument};

use crate::error::HostError;
use crate::traits::KernelHost;
use crate::types::InstalledPackage;

/// Settings for [`DpkgHost`]
#[derive(Debug, Clone)]
pub struct DpkgHostConfig {
    /// Prefix mutating commands with sudo
    pub use_sudo: bool,
    /// Command that regenerates the bootloader configuration
    pub bootloader_command: CommandLine,
    /// Upper bound for read-only queries
    pub query_timeout: Duration,
}

impl Default for DpkgHostConfig {
    fn default() -> Self {
        Self {
            use_sudo: false,
            bootloader_command: CommandLine::new("update-grub"),
            query_timeout: Duration::from_secs(30),
        }
    }
}

/// Package host backed by `uname`, `dpkg` and `apt-get`
pub struct DpkgHost {
    /// Executor for running commands
    executor: Arc<dyn CommandExecutor>,
    config: DpkgHostConfig,
}

impl DpkgHost {
    /// Create a new dpkg host
    ///
    /// # Arguments
    /// * `executor` - Executor for running host commands
    /// * `config` - Command settings
    pub fn new(executor: Arc<dyn CommandExecutor>, config: DpkgHostConfig) -> Self {
        Self { executor, config }
    }

    /// Build the purge command for a package list
    fn purge_cmd(&self, packages: &[String]) -> CommandLine {
        CommandLine::new("apt-get")
            .args(["remove", "--purge", "-y"])
            .args(packages.iter().cloned())
            .with_sudo(self.config.use_sudo)
    }

    fn bootloader_cmd(&self) -> CommandLine {
        self.config
            .bootloader_command
            .clone()
            .with_sudo(self.config.use_sudo)
    }

    /// Run a read-only query and return its stdout
    async fn query(&self, cmd: &CommandLine) -> Result<String, HostError> {
        let result = self
            .executor
            .run_with_timeout(cmd, self.config.query_timeout)
            .await
            .map_err(|e| HostError::ExecutionError(e.to_string()))?;

        if !result.success() {
            return Err(HostError::QueryFailed {
                command: cmd.to_string(),
                status: result.status,
                stderr: result.stderr.trim().to_string(),
            });
        }

        Ok(result.stdout)
    }

    /// Run a mutating command, classifying well-known apt failures
    async fn mutate(&self, cmd: &CommandLine) -> Result<CommandResult, HostError> {
        info!(command = %cmd, "running");

        let result = self
            .executor
            .run(cmd)
            .await
            .map_err(|e| HostError::ExecutionError(e.to_string()))?;

        if !result.success() {
            if result.stderr.contains("Could not get lock") {
                return Err(HostError::LockConflict(result.stderr));
            }
            if result.stderr.contains("Permission denied")
                || result.stderr.contains("are you root?")
            {
                return Err(HostError::PermissionDenied(result.stderr));
            }

            return Err(HostError::CommandFailed {
                command: cmd.to_string(),
                status: result.status,
                message: result.stderr.trim().to_string(),
            });
        }

        Ok(result)
    }

    /// Parse `dpkg -l` output, keeping only fully installed (`ii`) packages
    fn parse_dpkg_list(output: &str) -> Vec<InstalledPackage> {
        let mut packages = Vec::new();

        for line in output.lines() {
            // Example:
            // ii  linux-image-5.10.0-3-amd64  5.10.13-1  amd64  Linux 5.10 for 64-bit PCs
            if !line.starts_with("ii") {
                continue;
            }

            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 3 || parts[0] != "ii" {
                continue;
            }

            // Multi-arch installs report `name:arch`
            let name = parts[1].split(':').next().unwrap_or(parts[1]);
            packages.push(InstalledPackage::new(name, parts[2]));
        }

        packages
    }
}

#[async_trait]
impl KernelHost for DpkgHost {
    #[instrument(skip(self))]
    async fn running_kernel(&self) -> Result<String, HostError> {
        let stdout = self.query(&CommandLine::new("uname").arg("-r")).await?;
        let release = stdout.trim();

        if release.is_empty() {
            return Err(HostError::ParseError(
                "uname -r returned no kernel release".to_string(),
            ));
        }

        debug!(release = %release, "running kernel");
        Ok(release.to_string())
    }

    #[instrument(skip(self))]
    async fn installed_packages(&self) -> Result<Vec<InstalledPackage>, HostError> {
        let stdout = self.query(&CommandLine::new("dpkg").arg("-l")).await?;
        let packages = Self::parse_dpkg_list(&stdout);

        debug!(count = packages.len(), "installed packages");
        Ok(packages)
    }

    #[instrument(skip(self))]
    async fn purge_packages(&self, packages: &[String]) -> Result<(), HostError> {
        if packages.is_empty() {
            return Ok(());
        }

        self.mutate(&self.purge_cmd(packages)).await?;

        info!(count = packages.len(), "packages purged");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn update_bootloader(&self) -> Result<(), HostError> {
        self.mutate(&self.bootloader_cmd()).await?;

        info!("bootloader configuration regenerated");
        Ok(())
    }

    fn host_type(&self) -> &'static str {
        "dpkg"
    }
}
