//! Oldest-removable kernel selection

use tracing::debug;

use crate::inventory::InstalledKernelSet;
use crate::version::{CurrentKernel, KernelVersion};

/// Installed kernels other than the running one, oldest first
#[must_use]
pub fn removable_candidates(
    installed: &InstalledKernelSet,
    current: &CurrentKernel,
) -> Vec<KernelVersion> {
    installed
        .versions()
        .filter(|v| !current.is(v))
        .copied()
        .collect()
}

/// The oldest kernel that may be removed, if any
///
/// Returns `None` unless at least two non-running kernels are installed, so
/// the running kernel and one spare always remain.
#[must_use]
pub fn select_oldest_removable(
    installed: &InstalledKernelSet,
    current: &CurrentKernel,
) -> Option<KernelVersion> {
    let candidates = removable_candidates(installed, current);

    if candidates.len() < 2 {
        debug!(
            candidates = candidates.len(),
            "keeping the running kernel and its fallback"
        );
        return None;
    }

    candidates.first().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(versions: &[&str]) -> InstalledKernelSet {
        versions
            .iter()
            .map(|v| v.parse::<KernelVersion>().unwrap())
            .collect()
    }

    fn current(release: &str) -> CurrentKernel {
        CurrentKernel::from_release(release).unwrap()
    }

    #[test]
    fn test_selects_oldest() {
        let installed = set(&["5.4.0-1", "5.8.0-2", "5.10.0-3"]);
        let selected = select_oldest_removable(&installed, &current("5.10.0-3"));
        assert_eq!(selected, Some(KernelVersion::new(5, 4, 0, 1)));
    }

    #[test]
    fn test_one_spare_returns_none() {
        let installed = set(&["5.8.0-2", "5.10.0-3"]);
        assert_eq!(select_oldest_removable(&installed, &current("5.10.0-3")), None);
    }

    #[test]
    fn test_only_running_returns_none() {
        let installed = set(&["5.10.0-3"]);
        assert_eq!(select_oldest_removable(&installed, &current("5.10.0-3")), None);
        assert_eq!(select_oldest_removable(&set(&[]), &current("5.10.0-3")), None);
    }

    #[test]
    fn test_running_oldest_is_never_selected() {
        let installed = set(&["5.4.0-1", "5.8.0-2", "5.10.0-3"]);
        let selected = select_oldest_removable(&installed, &current("5.4.0-1-generic"));
        assert_eq!(selected, Some(KernelVersion::new(5, 8, 0, 2)));
    }

    #[test]
    fn test_running_with_flavour_suffix_is_excluded() {
        let installed = set(&["5.8.0-2", "5.10.0-3"]);
        let candidates = removable_candidates(&installed, &current("5.10.0-3-amd64"));
        assert_eq!(candidates, vec![KernelVersion::new(5, 8, 0, 2)]);
    }

    #[test]
    fn test_numeric_order_decides() {
        let installed = set(&["5.10.0-1", "5.9.0-1", "5.11.0-1"]);
        let selected = select_oldest_removable(&installed, &current("5.11.0-1"));
        assert_eq!(selected, Some(KernelVersion::new(5, 9, 0, 1)));
    }

    #[test]
    fn test_running_not_installed_keeps_two() {
        // Custom-built kernel without a package: two packaged kernels, one is spare
        let installed = set(&["5.8.0-2", "5.10.0-3"]);
        let selected = select_oldest_removable(&installed, &current("6.1.0-1-custom"));
        assert_eq!(selected, Some(KernelVersion::new(5, 8, 0, 2)));
    }
}
