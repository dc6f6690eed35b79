//! Package host trait

use async_trait::async_trait;

use crate::error::HostError;
use crate::types::InstalledPackage;

/// Everything the kernel cleaner needs from the machine it runs on
///
/// Implementations run external commands and parse their text output; tests
/// substitute fakes returning fixed data.
#[async_trait]
pub trait KernelHost: Send + Sync {
    /// Release string of the running kernel (`uname -r`)
    async fn running_kernel(&self) -> Result<String, HostError>;

    /// All packages currently in the installed state
    async fn installed_packages(&self) -> Result<Vec<InstalledPackage>, HostError>;

    /// Purge the given packages, including their configuration files
    async fn purge_packages(&self, packages: &[String]) -> Result<(), HostError>;

    /// Regenerate the bootloader configuration
    async fn update_bootloader(&self) -> Result<(), HostError>;

    /// Short name for logs
    fn host_type(&self) -> &'static str;
}
