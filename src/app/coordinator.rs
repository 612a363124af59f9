//! Run orchestration
//!
//! Drives the whole pipeline as strictly sequential stages: self-update
//! check, manifest fetch, local listing, diff, execution, verification. The
//! engine never terminates the process or talks to a UI itself; it returns a
//! tagged [`RunOutcome`] (or an error) and the CLI adapter translates that
//! into messages and exit codes.

use std::path::Path;

use tracing::info;

use crate::app::client::RemoteSource;
use crate::app::diff::compute_diff;
use crate::app::events::{EventSender, SyncEvent};
use crate::app::executor::SyncExecutor;
use crate::app::manifest::{ensure_mods_dir, list_local_files, RemoteManifest};
use crate::app::self_update::{artifact_file_name, SelfUpdateCheck, SelfUpdateCoordinator};
use crate::app::verify::verify_converged;
use crate::config::Endpoint;
use crate::errors::Result;

/// Terminal state of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// A successor process was spawned; the caller must terminate now with a
    /// success exit code and perform no further work.
    HandoffStarted,

    /// The mods directory converged on the server manifest.
    Synced { removed: usize, downloaded: usize },
}

/// Single-run synchronization pipeline.
pub struct SyncPipeline<'a, C: RemoteSource + ?Sized> {
    client: &'a C,
    self_update: SelfUpdateCoordinator<'a, C>,
    events: EventSender,
}

impl<'a, C: RemoteSource + ?Sized> SyncPipeline<'a, C> {
    /// Create a pipeline reporting progress to `events`.
    pub fn new(client: &'a C, events: EventSender) -> Self {
        Self {
            client,
            self_update: SelfUpdateCoordinator::new(client),
            events,
        }
    }

    /// Override the self-update coordinator (tests).
    pub fn with_self_update(mut self, self_update: SelfUpdateCoordinator<'a, C>) -> Self {
        self.self_update = self_update;
        self
    }

    /// Execute one full run against `endpoint`.
    ///
    /// The self-update check runs first and short-circuits everything else:
    /// when a handoff is initiated no manifest fetch, diff, or mod download
    /// happens in this run.
    pub async fn run(
        &self,
        endpoint: &Endpoint,
        mods_dir: &Path,
        current_artifact: &Path,
    ) -> Result<RunOutcome> {
        let declared_artifact = match self.self_update.check(endpoint, current_artifact).await? {
            SelfUpdateCheck::HandoffReady(plan) => {
                let _ = self.events.send(SyncEvent::HandoffStarted {
                    artifact_name: artifact_file_name(&plan.current_artifact),
                });
                plan.spawn()?;
                return Ok(RunOutcome::HandoffStarted);
            }
            SelfUpdateCheck::UpToDate { declared_artifact } => declared_artifact,
        };

        let manifest = RemoteManifest::fetch(self.client, endpoint, declared_artifact).await?;

        ensure_mods_dir(mods_dir).await?;
        let artifact_name = artifact_file_name(current_artifact);
        let local = list_local_files(mods_dir, &artifact_name).await?;

        let diff = compute_diff(&local, manifest.files());
        info!(
            "Diff against {}: {} to remove, {} to download",
            endpoint,
            diff.to_remove.len(),
            diff.to_download.len()
        );

        let executor = SyncExecutor::new(self.client, self.events.clone());
        executor.execute(&diff, mods_dir, endpoint).await?;

        verify_converged(mods_dir, &artifact_name, &manifest).await?;
        let _ = self.events.send(SyncEvent::Converged);

        Ok(RunOutcome::Synced {
            removed: diff.to_remove.len(),
            downloaded: diff.to_download.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::tempdir;
    use url::Url;

    use crate::app::testing::FakeRemote;

    fn endpoint() -> Endpoint {
        Endpoint::parse("http://example.com/pack").unwrap()
    }

    async fn artifact_at(dir: &Path) -> std::path::PathBuf {
        let artifact = dir.join("sync.jar");
        tokio::fs::write(&artifact, b"self").await.unwrap();
        artifact
    }

    #[tokio::test]
    async fn test_full_run_converges() {
        let dir = tempdir().unwrap();
        let mods_dir = dir.path().join("mods");
        tokio::fs::create_dir(&mods_dir).await.unwrap();
        let artifact = artifact_at(&mods_dir).await;
        for name in ["beta.jar", "gamma.jar"] {
            tokio::fs::write(mods_dir.join(name), b"jar").await.unwrap();
        }

        let remote = FakeRemote::new()
            .with_text("mod_sync_jar_name", "sync.jar")
            .with_text("modlist", "alpha.jar/beta.jar")
            .with_file("alpha.jar", b"fresh");

        let (tx, _rx) = crate::app::events::channel();
        let pipeline = SyncPipeline::new(&remote, tx);
        let outcome = pipeline.run(&endpoint(), &mods_dir, &artifact).await.unwrap();

        assert_eq!(
            outcome,
            RunOutcome::Synced {
                removed: 1,
                downloaded: 1,
            }
        );
        assert!(mods_dir.join("alpha.jar").exists());
        assert!(mods_dir.join("beta.jar").exists());
        assert!(!mods_dir.join("gamma.jar").exists());
        // The running artifact is never a deletion candidate
        assert!(mods_dir.join("sync.jar").exists());
    }

    #[tokio::test]
    async fn test_converged_run_is_a_no_op() {
        let dir = tempdir().unwrap();
        let mods_dir = dir.path().join("mods");
        tokio::fs::create_dir(&mods_dir).await.unwrap();
        let artifact = artifact_at(&mods_dir).await;
        for name in ["alpha.jar", "beta.jar"] {
            tokio::fs::write(mods_dir.join(name), b"jar").await.unwrap();
        }

        let remote = FakeRemote::new()
            .with_text("mod_sync_jar_name", "sync.jar")
            .with_text("modlist", "alpha.jar/beta.jar");

        let (tx, mut rx) = crate::app::events::channel();
        let pipeline = SyncPipeline::new(&remote, tx);

        // Run twice: both runs see empty diffs and perform no file operation
        for _ in 0..2 {
            let outcome = pipeline.run(&endpoint(), &mods_dir, &artifact).await.unwrap();
            assert_eq!(
                outcome,
                RunOutcome::Synced {
                    removed: 0,
                    downloaded: 0,
                }
            );
        }
        assert_eq!(remote.download_count(), 0);

        // Zero-total phases emit nothing; only convergence is reported
        while let Ok(event) = rx.try_recv() {
            assert_eq!(event, SyncEvent::Converged);
        }
    }

    #[tokio::test]
    async fn test_missing_mods_dir_is_created() {
        let dir = tempdir().unwrap();
        let artifact = artifact_at(dir.path()).await;
        let mods_dir = dir.path().join("mods");

        let remote = FakeRemote::new()
            .with_text("mod_sync_jar_name", "sync.jar")
            .with_text("modlist", "alpha.jar")
            .with_file("alpha.jar", b"fresh");

        let (tx, _rx) = crate::app::events::channel();
        let pipeline = SyncPipeline::new(&remote, tx);
        pipeline.run(&endpoint(), &mods_dir, &artifact).await.unwrap();

        assert!(mods_dir.join("alpha.jar").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_handoff_short_circuits_mod_sync() {
        let dir = tempdir().unwrap();
        let artifact = artifact_at(dir.path()).await;
        let mods_dir = dir.path().join("mods");
        let helper_dir = tempdir().unwrap();

        // Helper body is a harmless script so the spawn really happens
        let remote = FakeRemote::new()
            .with_text("mod_sync_jar_name", "sync-0.2.jar")
            .with_text("modlist", "alpha.jar")
            .with_file("helper.sh", b"#!/bin/sh\nexit 0\n");

        let (tx, mut rx) = crate::app::events::channel();
        let self_update = SelfUpdateCoordinator::new(&remote)
            .with_relocator_url(Url::parse("http://helper.example.com/helper.sh").unwrap())
            .with_helper_dir(helper_dir.path().to_path_buf());
        let pipeline = SyncPipeline::new(&remote, tx).with_self_update(self_update);

        let outcome = pipeline.run(&endpoint(), &mods_dir, &artifact).await.unwrap();
        assert_eq!(outcome, RunOutcome::HandoffStarted);

        // Only the handoff sequence ran: no modlist fetch, no mod download,
        // and the mods directory was never touched
        assert_eq!(
            remote.calls(),
            vec![
                "text /pack/mod_sync_jar_name".to_string(),
                "download /helper.sh".to_string(),
            ]
        );
        assert!(!mods_dir.exists());

        assert_eq!(
            rx.try_recv().unwrap(),
            SyncEvent::HandoffStarted {
                artifact_name: "sync.jar".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_artifact_name_fetch_failure_aborts() {
        let dir = tempdir().unwrap();
        let artifact = artifact_at(dir.path()).await;
        let mods_dir = dir.path().join("mods");

        let remote = FakeRemote::new(); // every resource 404s
        let (tx, _rx) = crate::app::events::channel();
        let pipeline = SyncPipeline::new(&remote, tx);

        assert!(pipeline.run(&endpoint(), &mods_dir, &artifact).await.is_err());
        assert!(!mods_dir.exists());
    }
}
