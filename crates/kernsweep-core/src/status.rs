//! Read-only report of installed kernels

use std::fmt::Write as _;

use kernsweep_pkg::KernelHost;
use serde::Serialize;

use crate::config::Context;
use crate::error::KernelError;
use crate::inventory::{InstalledKernelSet, discover_installed};
use crate::select::select_oldest_removable;
use crate::version::KernelVersion;

/// One installed kernel in the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KernelEntry {
    pub version: KernelVersion,
    pub running: bool,
    pub packages: Vec<String>,
}

/// Installed kernels newest first, plus the current removal candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub running: String,
    pub kernels: Vec<KernelEntry>,
    pub removable: Option<KernelVersion>,
}

impl StatusReport {
    #[must_use]
    pub fn build(ctx: &Context, installed: &InstalledKernelSet) -> Self {
        let current = ctx.current();
        let kernels = installed
            .newest_first()
            .map(|version| KernelEntry {
                version: *version,
                running: current.is(version),
                packages: installed.package_group(version).packages,
            })
            .collect();

        Self {
            running: current.release().to_string(),
            kernels,
            removable: select_oldest_removable(installed, current),
        }
    }

    /// Human-readable rendering; `verbose` adds each kernel's packages
    #[must_use]
    pub fn render(&self, verbose: bool) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Running kernel: {}", self.running);
        let _ = writeln!(out, "Installed kernels:");

        for entry in &self.kernels {
            let marker = if entry.running { " (running)" } else { "" };
            let _ = writeln!(out, "  - {}{marker}", entry.version);
            if verbose {
                for pkg in &entry.packages {
                    let _ = writeln!(out, "      {pkg}");
                }
            }
        }

        match self.removable {
            Some(version) => {
                let _ = writeln!(out, "\nOldest removable kernel: {version}");
            }
            None => {
                let _ = writeln!(out, "\nNo removable kernel found");
            }
        }
        out
    }
}

/// Discover installed kernels and build the status report
///
/// # Errors
/// `KernelError::Discovery` if the package listing fails
pub async fn status(ctx: &Context, host: &dyn KernelHost) -> Result<StatusReport, KernelError> {
    let installed = discover_installed(host).await?;
    Ok(StatusReport::build(ctx, &installed))
}
