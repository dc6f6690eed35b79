//! Kernel version parsing and ordering

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Serialize, Serializer};

use crate::error::KernelError;

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\.(\d+)\.(\d+)-(\d+)").expect("kernel version pattern is valid")
});

/// Kernel version `major.minor.patch-revision`
///
/// Ordering is numeric field by field, so `5.9.0-1 < 5.10.0-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KernelVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub revision: u32,
}

impl KernelVersion {
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32, revision: u32) -> Self {
        Self {
            major,
            minor,
            patch,
            revision,
        }
    }

    /// Parse the version at the start of `s`, ignoring any flavour suffix
    ///
    /// `5.10.0-3-amd64` parses as `5.10.0-3`. Returns `None` when `s` does not
    /// start with a version.
    #[must_use]
    pub fn parse_prefix(s: &str) -> Option<Self> {
        let caps = VERSION_RE.captures(s)?;
        let field = |i: usize| caps.get(i)?.as_str().parse::<u32>().ok();

        Some(Self::new(field(1)?, field(2)?, field(3)?, field(4)?))
    }
}

impl FromStr for KernelVersion {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_prefix(s).ok_or_else(|| KernelError::VersionParse(s.to_string()))
    }
}

impl fmt::Display for KernelVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}-{}",
            self.major, self.minor, self.patch, self.revision
        )
    }
}

impl Serialize for KernelVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The kernel the machine is currently running
///
/// Fetched once at startup and never changed afterwards. `version` is `None`
/// for releases without a `major.minor.patch-revision` prefix, e.g. a
/// self-built `6.5.0`; such a kernel matches no installed package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentKernel {
    release: String,
    version: Option<KernelVersion>,
}

impl CurrentKernel {
    /// Build from a `uname -r` release string
    ///
    /// # Errors
    /// Returns `KernelError::VersionParse` if the release has no version prefix
    pub fn from_release(release: impl Into<String>) -> Result<Self, KernelError> {
        let release = release.into();
        let version = release.parse()?;
        Ok(Self {
            release,
            version: Some(version),
        })
    }

    /// Build from a release string, leaving the version unset if it does not
    /// parse
    pub fn from_release_lenient(release: impl Into<String>) -> Self {
        let release = release.into();
        let version = KernelVersion::parse_prefix(&release);
        Self { release, version }
    }

    /// Full release string, e.g. `5.10.0-3-amd64`
    #[must_use]
    pub fn release(&self) -> &str {
        &self.release
    }

    /// Parsed version, e.g. `5.10.0-3`
    #[must_use]
    pub fn version(&self) -> Option<KernelVersion> {
        self.version
    }

    /// Whether `version` is the running kernel
    #[must_use]
    pub fn is(&self, version: &KernelVersion) -> bool {
        self.version.as_ref() == Some(version)
    }
}

impl fmt::Display for CurrentKernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.release)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> KernelVersion {
        s.parse().unwrap()
    }

    #[test]
    fn test_numeric_not_lexical_order() {
        assert!(v("5.9.0-1") < v("5.10.0-1"));
        assert!("5.9.0-1" > "5.10.0-1");
    }

    #[test]
    fn test_field_precedence() {
        assert!(v("4.19.0-99") < v("5.0.0-1"));
        assert!(v("5.4.9-9") < v("5.4.10-1"));
        assert!(v("5.4.0-2") < v("5.4.0-10"));
        assert_eq!(v("5.4.0-1"), v("5.4.0-1-generic"));
    }

    #[test]
    fn test_parse_suffix_is_ignored() {
        assert_eq!(v("5.10.0-3-amd64"), KernelVersion::new(5, 10, 0, 3));
        assert_eq!(v("6.1.0-18-rt-amd64").to_string(), "6.1.0-18");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for input in ["", "amd64", "5.10", "5.10.0", "5.10.0-", "x5.10.0-3", "5.10.0-rc1"] {
            assert!(
                matches!(input.parse::<KernelVersion>(), Err(KernelError::VersionParse(_))),
                "{input} should not parse"
            );
        }
    }

    #[test]
    fn test_parse_rejects_overflow() {
        assert!("99999999999.0.0-1".parse::<KernelVersion>().is_err());
    }

    #[test]
    fn test_current_kernel_from_release() {
        let current = CurrentKernel::from_release("5.10.0-3-amd64").unwrap();
        assert_eq!(current.release(), "5.10.0-3-amd64");
        assert!(current.is(&KernelVersion::new(5, 10, 0, 3)));
        assert!(!current.is(&KernelVersion::new(5, 10, 0, 30)));

        assert!(CurrentKernel::from_release("custom-kernel").is_err());
        assert!(CurrentKernel::from_release("6.5.0").is_err());
    }

    #[test]
    fn test_lenient_release_without_revision() {
        let current = CurrentKernel::from_release_lenient("6.5.0");
        assert_eq!(current.release(), "6.5.0");
        assert_eq!(current.version(), None);
        assert!(!current.is(&KernelVersion::new(6, 5, 0, 0)));

        let current = CurrentKernel::from_release_lenient("5.10.0-3-amd64");
        assert_eq!(current.version(), Some(KernelVersion::new(5, 10, 0, 3)));
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&v("5.10.0-3")).unwrap();
        assert_eq!(json, "\"5.10.0-3\"");
    }
}
