//! Host-integration quick check
//!
//! Intended to run inside the game host at startup: decide cheaply whether
//! the mods directory already matches the server, and if not, launch the
//! sync tool as an independent process so the host can shut down and let it
//! work. This is the one boundary where silent suppression is correct: the
//! host must never be destabilized by a sync failure, so every internal
//! error here degrades to "do nothing".

use std::path::Path;
use std::process::Command;

use tracing::{debug, warn};

use crate::app::client::{ModServerClient, RemoteSource};
use crate::app::manifest::{list_local_files, RemoteManifest};
use crate::config::load_endpoint;
use crate::constants::{endpoint as resources, files};
use crate::errors::{FilesystemError, Result};

/// Outcome of the startup check, as seen by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCheck {
    /// The mods directory already matches the server; nothing to do.
    InSync,

    /// The sync tool was launched; the host should stop so files can be
    /// replaced underneath it.
    SyncLaunched,

    /// Something went wrong internally; the host proceeds as if the check
    /// never ran.
    Skipped,
}

/// Run the startup check, swallowing every internal error.
///
/// With no configuration file the sync tool is launched for initial setup.
/// Otherwise the expected set (`modlist` plus the declared artifact name) is
/// compared against the full mods directory listing; the tool's own file
/// must be present too, since it lives in the directory it manages.
pub async fn startup_check(working_dir: &Path, artifact: &Path) -> HostCheck {
    let client = match ModServerClient::new() {
        Ok(client) => client,
        Err(e) => {
            warn!("Startup check skipped, HTTP client unavailable: {}", e);
            return HostCheck::Skipped;
        }
    };
    startup_check_with(&client, working_dir, artifact).await
}

/// Startup check against an explicit remote source.
pub async fn startup_check_with<C: RemoteSource + ?Sized>(
    client: &C,
    working_dir: &Path,
    artifact: &Path,
) -> HostCheck {
    match check_inner(client, working_dir, artifact).await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!("Startup check failed, leaving mods untouched: {}", e);
            HostCheck::Skipped
        }
    }
}

async fn check_inner<C: RemoteSource + ?Sized>(
    client: &C,
    working_dir: &Path,
    artifact: &Path,
) -> Result<HostCheck> {
    let endpoint = match load_endpoint(working_dir).await? {
        Some(endpoint) => endpoint,
        None => {
            // First run: hand over to the sync tool for initial setup
            debug!("No configuration present, launching sync tool for setup");
            launch_sync_tool(artifact)?;
            return Ok(HostCheck::SyncLaunched);
        }
    };

    let declared = client
        .fetch_text(&endpoint.resolve(resources::ARTIFACT_NAME)?)
        .await?
        .trim()
        .to_string();
    let modlist = client
        .fetch_text(&endpoint.resolve(resources::MODLIST)?)
        .await?;

    let mut expected = RemoteManifest::from_modlist(&modlist, declared.clone())
        .files()
        .clone();
    expected.insert(declared);

    let mods_dir = working_dir.join(files::MODS_DIR);
    if mods_dir.is_dir() {
        // Empty exclusion: the tool's own file counts toward convergence here
        let local = list_local_files(&mods_dir, "").await?;
        if local == expected {
            debug!("Mods directory matches server, nothing to do");
            return Ok(HostCheck::InSync);
        }
    }

    launch_sync_tool(artifact)?;
    Ok(HostCheck::SyncLaunched)
}

/// Launch the sync tool as an independent process.
fn launch_sync_tool(artifact: &Path) -> Result<()> {
    Command::new(artifact)
        .spawn()
        .map_err(|source| FilesystemError::Spawn {
            program: artifact.to_path_buf(),
            source,
        })?;
    Ok(())
}
