//! Ordered execution of the computed diff
//!
//! The executor applies the deletion phase, then the download phase, and
//! nothing else. All deletions complete before the first download begins,
//! so a rename-like diff (the same name in both phases) never collides.
//! Any single failure is fatal for the run: a half-updated mod set must not
//! be treated as usable, so there is no partial-success continuation.

use std::path::Path;

use tracing::{debug, info};

use crate::app::client::RemoteSource;
use crate::app::diff::DiffResult;
use crate::app::events::{EventSender, SyncEvent};
use crate::config::Endpoint;
use crate::constants::endpoint as resources;
use crate::errors::{FilesystemError, Result};

/// Applies a [`DiffResult`] to the mods directory.
pub struct SyncExecutor<'a, C: RemoteSource + ?Sized> {
    client: &'a C,
    events: EventSender,
}

impl<'a, C: RemoteSource + ?Sized> SyncExecutor<'a, C> {
    /// Create an executor reporting progress to `events`.
    pub fn new(client: &'a C, events: EventSender) -> Self {
        Self { client, events }
    }

    /// Run the deletion phase, then the download phase.
    ///
    /// Emits one progress event per completed item per phase; phases with a
    /// zero total emit nothing. Fails fast on the first deletion or download
    /// error without entering the next phase.
    pub async fn execute(
        &self,
        diff: &DiffResult,
        mods_dir: &Path,
        endpoint: &Endpoint,
    ) -> Result<()> {
        self.delete_phase(diff, mods_dir).await?;
        self.download_phase(diff, mods_dir, endpoint).await
    }

    async fn delete_phase(&self, diff: &DiffResult, mods_dir: &Path) -> Result<()> {
        let total = diff.to_remove.len();
        if total == 0 {
            debug!("No stale files to delete");
            return Ok(());
        }

        let _ = self.events.send(SyncEvent::DeletePhaseStarted { total });
        info!("Deleting {} stale files", total);

        for (i, file_name) in diff.to_remove.iter().enumerate() {
            tokio::fs::remove_file(mods_dir.join(file_name))
                .await
                .map_err(|source| FilesystemError::Delete {
                    file_name: file_name.clone(),
                    source,
                })?;

            debug!("Deleted {}", file_name);
            let _ = self.events.send(SyncEvent::Deleted {
                file_name: file_name.clone(),
                index: i + 1,
                total,
            });
        }

        Ok(())
    }

    async fn download_phase(
        &self,
        diff: &DiffResult,
        mods_dir: &Path,
        endpoint: &Endpoint,
    ) -> Result<()> {
        let total = diff.to_download.len();
        if total == 0 {
            debug!("No new files to download");
            return Ok(());
        }

        let _ = self.events.send(SyncEvent::DownloadPhaseStarted { total });
        info!("Downloading {} new files", total);

        for (i, file_name) in diff.to_download.iter().enumerate() {
            let url = endpoint.resolve(&format!("{}/{}", resources::MODS_PREFIX, file_name))?;
            self.client.download_file(&url, mods_dir).await?;

            debug!("Downloaded {}", file_name);
            let _ = self.events.send(SyncEvent::Downloaded {
                file_name: file_name.clone(),
                index: i + 1,
                total,
            });
        }

        Ok(())
    }
}
