//! Post-run convergence verification
//!
//! Individual operations reporting success is not enough: a file that
//! appeared or vanished while the run was in flight leaves the directory in
//! an untrustworthy state. The verification step re-lists the mods directory
//! from scratch and requires set equality with the server manifest.

use std::path::Path;

use tracing::debug;

use crate::app::manifest::{list_local_files, RemoteManifest};
use crate::errors::{AppError, Result};

/// Verify that the mods directory (minus the running artifact) now equals
/// the remote manifest.
///
/// # Errors
///
/// Returns `AppError::VerificationMismatch` carrying both sets when they
/// differ, or `FilesystemError::List` when the directory cannot be re-read.
pub async fn verify_converged(
    mods_dir: &Path,
    artifact_name: &str,
    manifest: &RemoteManifest,
) -> Result<()> {
    let actual = list_local_files(mods_dir, artifact_name).await?;

    if &actual == manifest.files() {
        debug!("Verified {} files against the manifest", actual.len());
        return Ok(());
    }

    Err(AppError::VerificationMismatch {
        expected: manifest.files().clone(),
        actual,
    })
}
