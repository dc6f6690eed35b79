//! Builds the package host for this machine

use std::sync::Arc;

use eyre::Result;
use kernsweep_exec::LocalExecutor;
use kernsweep_pkg::{DpkgHost, KernelHost};
use tracing::debug;

use crate::config::Config;

/// Create the dpkg-backed host running commands locally
pub fn create_host(config: &Config) -> Result<Arc<dyn KernelHost>> {
    let host_config = config.host_config()?;

    debug!(
        use_sudo = host_config.use_sudo,
        bootloader = %host_config.bootloader_command,
        timeout = ?host_config.query_timeout,
        "creating dpkg host"
    );

    Ok(Arc::new(DpkgHost::new(
        Arc::new(LocalExecutor::new()),
        host_config,
    )))
}
