//! Discovery of the running kernel and installed kernel packages

use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;

use kernsweep_pkg::{InstalledPackage, KernelHost};
use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::error::KernelError;
use crate::version::{CurrentKernel, KernelVersion};

// linux-image-5.10.0-3-amd64, linux-image-unsigned-5.4.0-1-generic,
// linux-modules-extra-5.4.0-1-generic, linux-headers-5.10.0-3-common,
// linux-modules-nvidia-535-5.15.0-91-generic
static KERNEL_PACKAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^linux-(image|headers|modules)(?:-[a-z0-9]+)*?-(\d+\.\d+\.\d+-\d+)")
        .expect("kernel package pattern is valid")
});

/// Which part of a kernel a package provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageKind {
    Image,
    Headers,
    Modules,
}

impl fmt::Display for PackageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageKind::Image => write!(f, "image"),
            PackageKind::Headers => write!(f, "headers"),
            PackageKind::Modules => write!(f, "modules"),
        }
    }
}

/// An installed package that belongs to a specific kernel version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelPackage {
    pub name: String,
    pub kind: PackageKind,
    pub version: KernelVersion,
}

impl KernelPackage {
    /// Classify a package name, `None` for anything that is not a versioned
    /// kernel image, headers or modules package
    #[must_use]
    pub fn classify(name: &str) -> Option<Self> {
        let caps = KERNEL_PACKAGE_RE.captures(name)?;
        let kind = match caps.get(1)?.as_str() {
            "image" => PackageKind::Image,
            "headers" => PackageKind::Headers,
            _ => PackageKind::Modules,
        };
        let version = KernelVersion::parse_prefix(caps.get(2)?.as_str())?;

        Some(Self {
            name: name.to_string(),
            kind,
            version,
        })
    }
}

/// Packages (image, headers, modules) tied to one kernel version
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageGroup {
    pub version: KernelVersion,
    /// Package names, sorted
    pub packages: Vec<String>,
}

impl PackageGroup {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len()
    }
}

/// Distinct kernel versions with an installed image, plus their packages
#[derive(Debug, Clone, Default)]
pub struct InstalledKernelSet {
    versions: BTreeSet<KernelVersion>,
    packages: Vec<KernelPackage>,
}

impl InstalledKernelSet {
    /// Build from the package database
    ///
    /// Packages whose names do not carry a `major.minor.patch-revision`
    /// version are skipped without a warning.
    #[must_use]
    pub fn from_packages(installed: &[InstalledPackage]) -> Self {
        let mut set = Self::default();

        for pkg in installed {
            if !pkg.name.starts_with("linux-") {
                continue;
            }
            match KernelPackage::classify(&pkg.name) {
                Some(kernel_pkg) => {
                    if kernel_pkg.kind == PackageKind::Image {
                        set.versions.insert(kernel_pkg.version);
                    }
                    set.packages.push(kernel_pkg);
                }
                None => debug!(package = %pkg.name, "skipping unversioned kernel package"),
            }
        }

        set
    }

    /// Versions in ascending order
    pub fn versions(&self) -> impl DoubleEndedIterator<Item = &KernelVersion> {
        self.versions.iter()
    }

    /// Versions newest first
    pub fn newest_first(&self) -> impl Iterator<Item = &KernelVersion> {
        self.versions.iter().rev()
    }

    #[must_use]
    pub fn contains(&self, version: &KernelVersion) -> bool {
        self.versions.contains(version)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Every installed image, headers or modules package of `version`
    ///
    /// Matching is on the parsed version, so `5.4.0-1` never picks up
    /// packages of `5.4.0-10`.
    #[must_use]
    pub fn package_group(&self, version: &KernelVersion) -> PackageGroup {
        let packages: BTreeSet<&str> = self
            .packages
            .iter()
            .filter(|p| p.version == *version)
            .map(|p| p.name.as_str())
            .collect();

        PackageGroup {
            version: *version,
            packages: packages.into_iter().map(str::to_string).collect(),
        }
    }
}

impl FromIterator<KernelVersion> for InstalledKernelSet {
    fn from_iter<I: IntoIterator<Item = KernelVersion>>(iter: I) -> Self {
        Self {
            versions: iter.into_iter().collect(),
            packages: Vec::new(),
        }
    }
}

/// Query the running kernel
///
/// # Errors
/// `KernelError::Discovery` if the query fails, `KernelError::VersionParse`
/// if the release string carries no version
#[instrument(skip(host), fields(host = host.host_type()))]
pub async fn discover_current_kernel(host: &dyn KernelHost) -> Result<CurrentKernel, KernelError> {
    CurrentKernel::from_release(running_release(host).await?)
}

/// Query the running kernel, accepting releases without a version
///
/// # Errors
/// `KernelError::Discovery` if the query fails
#[instrument(skip(host), fields(host = host.host_type()))]
pub async fn discover_current_kernel_lenient(
    host: &dyn KernelHost,
) -> Result<CurrentKernel, KernelError> {
    let current = CurrentKernel::from_release_lenient(running_release(host).await?);
    if current.version().is_none() {
        warn!(release = %current, "running kernel release carries no package version");
    }
    Ok(current)
}

async fn running_release(host: &dyn KernelHost) -> Result<String, KernelError> {
    host.running_kernel()
        .await
        .map_err(|source| KernelError::Discovery {
            what: "running kernel",
            source,
        })
}

/// Query the package database for installed kernels
///
/// # Errors
/// `KernelError::Discovery` if the package listing fails
#[instrument(skip(host), fields(host = host.host_type()))]
pub async fn discover_installed(host: &dyn KernelHost) -> Result<InstalledKernelSet, KernelError> {
    let packages = host
        .installed_packages()
        .await
        .map_err(|source| KernelError::Discovery {
            what: "installed kernel packages",
            source,
        })?;

    let set = InstalledKernelSet::from_packages(&packages);
    info!(kernels = set.len(), "discovered installed kernels");

    Ok(set)
}
