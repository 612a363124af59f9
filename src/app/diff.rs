//! Diff computation between local and remote file sets
//!
//! Pure set algebra: no I/O, no ordering assumptions beyond the
//! deterministic iteration order of the result sets.

use std::collections::BTreeSet;

/// The minimal set of operations needed to converge the local set onto the
/// remote manifest. Computed once per run; immutable afterward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffResult {
    /// Local entries absent from the remote manifest
    pub to_remove: BTreeSet<String>,
    /// Remote entries absent from the local set
    pub to_download: BTreeSet<String>,
}

impl DiffResult {
    /// True when no operation is required (sets already converged).
    pub fn is_empty(&self) -> bool {
        self.to_remove.is_empty() && self.to_download.is_empty()
    }
}

/// Compute the deletions and downloads that transform `local` into `remote`.
///
/// Files present in both sets are already satisfied and appear in neither
/// result. Applying all removals and then all downloads yields a local set
/// equal to `remote`.
pub fn compute_diff(local: &BTreeSet<String>, remote: &BTreeSet<String>) -> DiffResult {
    DiffResult {
        to_remove: local.difference(remote).cloned().collect(),
        to_download: remote.difference(local).cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_diff_partitions_correctly() {
        let local = set(&["beta.jar", "gamma.jar"]);
        let remote = set(&["alpha.jar", "beta.jar"]);

        let diff = compute_diff(&local, &remote);

        assert_eq!(diff.to_remove, set(&["gamma.jar"]));
        assert_eq!(diff.to_download, set(&["alpha.jar"]));
    }

    #[test]
    fn test_applying_diff_converges_on_remote() {
        let local = set(&["a", "b", "c"]);
        let remote = set(&["b", "c", "d", "e"]);

        let diff = compute_diff(&local, &remote);

        let mut converged: BTreeSet<String> =
            local.difference(&diff.to_remove).cloned().collect();
        converged.extend(diff.to_download.iter().cloned());
        assert_eq!(converged, remote);
    }

    #[test]
    fn test_satisfied_entries_touched_by_neither_phase() {
        let local = set(&["a", "b"]);
        let remote = set(&["b", "c"]);

        let diff = compute_diff(&local, &remote);

        let satisfied: BTreeSet<String> = local.intersection(&remote).cloned().collect();
        assert!(diff.to_remove.is_disjoint(&satisfied));
        assert!(diff.to_download.is_disjoint(&satisfied));
    }

    #[test]
    fn test_empty_local_downloads_everything() {
        let diff = compute_diff(&set(&[]), &set(&["a", "b"]));
        assert!(diff.to_remove.is_empty());
        assert_eq!(diff.to_download, set(&["a", "b"]));
    }

    #[test]
    fn test_empty_remote_removes_everything() {
        let diff = compute_diff(&set(&["a", "b"]), &set(&[]));
        assert_eq!(diff.to_remove, set(&["a", "b"]));
        assert!(diff.to_download.is_empty());
    }

    #[test]
    fn test_equal_sets_are_a_no_op() {
        let diff = compute_diff(&set(&["a", "b"]), &set(&["a", "b"]));
        assert!(diff.is_empty());
    }
}
