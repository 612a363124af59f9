//! Command handlers for the modsync CLI
//!
//! Wires CLI arguments to the engine: resolves the working directory and
//! artifact identity, loads or collects the endpoint, attaches the progress
//! renderer, runs the pipeline, and translates its tagged outcome into
//! user-facing messages. Process exit codes are decided in `main`.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::app::{
    compute_diff, events, ModServerClient, RemoteManifest, RemoteSource, RunOutcome, SyncPipeline,
};
use crate::cli::{GlobalArgs, ProgressDisplay};
use crate::config::{self, Endpoint};
use crate::constants::{endpoint as resources, files};
use crate::errors::{ConfigError, FilesystemError, Result};

/// Handle the sync command (the default).
///
/// With no configuration file this becomes a setup-only run: the endpoint is
/// collected interactively, persisted, and no synchronization happens.
pub async fn handle_sync(global: &GlobalArgs) -> Result<()> {
    let working_dir = resolve_working_dir(global)?;

    let endpoint = match config::load_endpoint(&working_dir).await? {
        Some(endpoint) => endpoint,
        None => {
            info!("No configuration found, entering first-run setup");
            config::run_setup(&working_dir).await?;
            return Ok(());
        }
    };

    let artifact = resolve_artifact(global)?;
    let mods_dir = working_dir.join(files::MODS_DIR);
    info!(
        "Synchronizing {} against {}",
        mods_dir.display(),
        endpoint
    );

    let client = ModServerClient::new()?;
    let (events_tx, events_rx) = events::channel();
    let display = ProgressDisplay::new(global.quiet).spawn(events_rx);

    let pipeline = SyncPipeline::new(&client, events_tx);
    let outcome = pipeline.run(&endpoint, &mods_dir, &artifact).await;

    // Close the channel so the renderer drains and exits before we report
    drop(pipeline);
    let _ = display.await;

    match outcome? {
        RunOutcome::HandoffStarted => {
            println!("Sync tool update started. The tool will relaunch once replaced.");
        }
        RunOutcome::Synced {
            removed,
            downloaded,
        } => {
            if removed == 0 && downloaded == 0 {
                println!("Mods are already up to date.");
            } else {
                println!(
                    "Modpack updated: {} removed, {} downloaded. You may now relaunch the game.",
                    removed, downloaded
                );
            }
        }
    }

    Ok(())
}

/// Handle the check command: report what a run would change, touching nothing.
pub async fn handle_check(global: &GlobalArgs) -> Result<()> {
    let working_dir = resolve_working_dir(global)?;

    let endpoint = config::load_endpoint(&working_dir)
        .await?
        .ok_or_else(|| ConfigError::Missing {
            path: config::config_path(&working_dir),
        })?;

    let artifact = resolve_artifact(global)?;
    let client = ModServerClient::new()?;
    print_pending_changes(&client, &endpoint, &working_dir, &artifact).await
}

async fn print_pending_changes<C: RemoteSource + ?Sized>(
    client: &C,
    endpoint: &Endpoint,
    working_dir: &Path,
    artifact: &Path,
) -> Result<()> {
    let declared = client
        .fetch_text(&endpoint.resolve(resources::ARTIFACT_NAME)?)
        .await?
        .trim()
        .to_string();
    let modlist = client
        .fetch_text(&endpoint.resolve(resources::MODLIST)?)
        .await?;
    let manifest = RemoteManifest::from_modlist(&modlist, declared);

    let artifact_name = crate::app::self_update::artifact_file_name(artifact);
    if manifest.declared_artifact() != artifact_name {
        println!(
            "Sync tool outdated: server declares {}, running {}.",
            manifest.declared_artifact(),
            artifact_name
        );
    }

    let mods_dir = working_dir.join(files::MODS_DIR);
    let local = if mods_dir.is_dir() {
        crate::app::manifest::list_local_files(&mods_dir, &artifact_name).await?
    } else {
        Default::default()
    };

    let diff = compute_diff(&local, manifest.files());
    if diff.is_empty() {
        println!("Mods are up to date ({} files).", local.len());
        return Ok(());
    }

    for name in &diff.to_remove {
        println!("would delete   {}", name);
    }
    for name in &diff.to_download {
        println!("would download {}", name);
    }
    println!(
        "{} to delete, {} to download.",
        diff.to_remove.len(),
        diff.to_download.len()
    );
    Ok(())
}

/// Handle the setup command: (re)collect and persist the endpoint.
pub async fn handle_setup(global: &GlobalArgs) -> Result<()> {
    let working_dir = resolve_working_dir(global)?;
    config::run_setup(&working_dir).await?;
    Ok(())
}

fn resolve_working_dir(global: &GlobalArgs) -> Result<PathBuf> {
    match &global.working_dir {
        Some(dir) => Ok(dir.clone()),
        None => std::env::current_dir().map_err(|source| {
            FilesystemError::Environment {
                what: "working directory",
                source,
            }
            .into()
        }),
    }
}

fn resolve_artifact(global: &GlobalArgs) -> Result<PathBuf> {
    match &global.artifact {
        Some(path) => Ok(path.clone()),
        None => std::env::current_exe().map_err(|source| {
            FilesystemError::Environment {
                what: "current executable path",
                source,
            }
            .into()
        }),
    }
}
