//! Type definitions for the package database

use serde::{Deserialize, Serialize};

/// One installed package as reported by the package database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledPackage {
    /// Package name without architecture qualifier
    pub name: String,
    /// Debian package version (not the kernel release)
    pub version: String,
}

impl InstalledPackage {
    /// Create a new installed package record
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}
