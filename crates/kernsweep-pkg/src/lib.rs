//! kernsweep-pkg: Package host abstraction
//!
//! The [`traits::KernelHost`] capability covers every host interaction the
//! kernel cleaner needs: the running kernel, the package database, package
//! purge and bootloader regeneration. [`dpkg::DpkgHost`] implements it for
//! Debian-family systems.

pub mod dpkg;
pub mod error;
pub mod traits;
pub mod types;

pub use dpkg::{DpkgHost, DpkgHostConfig};
pub use error::HostError;
pub use traits::KernelHost;
pub use types::InstalledPackage;
