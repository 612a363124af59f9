//! Self-update check and handoff
//!
//! Compares the running artifact's file name against the name the server
//! declares for the sync tool. On mismatch the run must not synchronize
//! mods; instead a relocation helper is downloaded from its fixed release
//! location and spawned as an independent successor process, and the caller
//! terminates. The helper receives exactly two positional arguments (the
//! absolute path of the running artifact and the URL of the replacement);
//! no other IPC channel exists between the two processes.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};
use url::Url;

use crate::app::client::RemoteSource;
use crate::config::Endpoint;
use crate::constants::{endpoint as resources, relocator};
use crate::errors::{FilesystemError, Result};

/// Outcome of the self-update check.
#[derive(Debug)]
pub enum SelfUpdateCheck {
    /// The running artifact matches the server's declaration. Carries the
    /// declared name so the caller does not have to fetch it again.
    UpToDate { declared_artifact: String },

    /// The artifact is outdated; the helper is downloaded and ready to spawn.
    HandoffReady(HandoffPlan),
}

/// Everything needed to launch the successor process. Spawning is separated
/// from the check so the destructive step happens exactly once, at the
/// caller's discretion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoffPlan {
    /// Downloaded relocation helper executable
    pub helper: PathBuf,
    /// Absolute path of the currently running artifact
    pub current_artifact: PathBuf,
    /// URL of the replacement artifact
    pub artifact_url: Url,
}

impl HandoffPlan {
    /// Spawn the relocation helper with the two-argument handoff contract.
    ///
    /// The helper runs as an independent process; this returns as soon as it
    /// has been launched. The caller is expected to terminate with a success
    /// exit code regardless of what the helper does next.
    ///
    /// # Errors
    ///
    /// Returns `FilesystemError::Spawn` when the helper cannot be launched.
    pub fn spawn(&self) -> Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.helper, std::fs::Permissions::from_mode(0o755))
                .map_err(|source| FilesystemError::Spawn {
                    program: self.helper.clone(),
                    source,
                })?;
        }

        Command::new(&self.helper)
            .arg(&self.current_artifact)
            .arg(self.artifact_url.as_str())
            .spawn()
            .map_err(|source| FilesystemError::Spawn {
                program: self.helper.clone(),
                source,
            })?;

        info!(
            "Handed off to {} for replacement of {}",
            self.helper.display(),
            self.current_artifact.display()
        );
        Ok(())
    }
}

/// Checks whether the sync tool itself must be replaced before any mod
/// synchronization may happen.
pub struct SelfUpdateCoordinator<'a, C: RemoteSource + ?Sized> {
    client: &'a C,
    relocator_url: Url,
    helper_dir: PathBuf,
}

impl<'a, C: RemoteSource + ?Sized> SelfUpdateCoordinator<'a, C> {
    /// Create a coordinator using the fixed relocation helper release URL
    /// and the system temp directory.
    pub fn new(client: &'a C) -> Self {
        // The release URL is a compile-time constant; parsing cannot fail
        let relocator_url =
            Url::parse(relocator::RELEASE_URL).expect("relocator release URL is valid");
        Self {
            client,
            relocator_url,
            helper_dir: std::env::temp_dir(),
        }
    }

    /// Override the relocation helper location (tests).
    pub fn with_relocator_url(mut self, url: Url) -> Self {
        self.relocator_url = url;
        self
    }

    /// Override the directory the helper is downloaded into (tests).
    pub fn with_helper_dir(mut self, dir: PathBuf) -> Self {
        self.helper_dir = dir;
        self
    }

    /// Fetch the server-declared artifact name and decide whether a handoff
    /// is required.
    ///
    /// On mismatch the relocation helper is downloaded and a [`HandoffPlan`]
    /// returned; nothing is spawned here.
    pub async fn check(
        &self,
        endpoint: &Endpoint,
        current_artifact: &Path,
    ) -> Result<SelfUpdateCheck> {
        let name_url = endpoint.resolve(resources::ARTIFACT_NAME)?;
        let declared_artifact = self.client.fetch_text(&name_url).await?.trim().to_string();
        let current_name = artifact_file_name(current_artifact);

        if declared_artifact == current_name {
            debug!("Sync tool {} is current", current_name);
            return Ok(SelfUpdateCheck::UpToDate { declared_artifact });
        }

        info!(
            "Sync tool update found: {} is declared, {} is running",
            declared_artifact, current_name
        );

        let helper = self
            .client
            .download_file(&self.relocator_url, &self.helper_dir)
            .await?;
        let artifact_url = endpoint.resolve(resources::ARTIFACT)?;
        let current_artifact =
            std::fs::canonicalize(current_artifact).map_err(|source| {
                FilesystemError::Canonicalize {
                    path: current_artifact.to_path_buf(),
                    source,
                }
            })?;

        Ok(SelfUpdateCheck::HandoffReady(HandoffPlan {
            helper,
            current_artifact,
            artifact_url,
        }))
    }
}

/// File name component of the running artifact's path.
pub fn artifact_file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    use crate::app::testing::FakeRemote;
    use crate::errors::AppError;

    const RELOCATOR_NAME: &str = "modsync-relocator-1.2";

    fn endpoint() -> Endpoint {
        Endpoint::parse("http://example.com/pack").unwrap()
    }

    fn relocator_url() -> Url {
        Url::parse(&format!("http://helper.example.com/{}", RELOCATOR_NAME)).unwrap()
    }

    #[tokio::test]
    async fn test_matching_name_is_up_to_date() {
        let dir = tempdir().unwrap();
        let artifact = dir.path().join("sync.jar");
        tokio::fs::write(&artifact, b"self").await.unwrap();

        let remote = FakeRemote::new().with_text("mod_sync_jar_name", "sync.jar\n");
        let coordinator = SelfUpdateCoordinator::new(&remote);

        match coordinator.check(&endpoint(), &artifact).await.unwrap() {
            SelfUpdateCheck::UpToDate { declared_artifact } => {
                assert_eq!(declared_artifact, "sync.jar");
            }
            other => panic!("Expected UpToDate, got {:?}", other),
        }

        // Only the name resource was requested; no helper download
        assert_eq!(remote.calls(), vec!["text /pack/mod_sync_jar_name"]);
    }

    #[tokio::test]
    async fn test_mismatch_produces_handoff_plan() {
        let dir = tempdir().unwrap();
        let artifact = dir.path().join("sync-0.1.jar");
        tokio::fs::write(&artifact, b"self").await.unwrap();

        let remote = FakeRemote::new()
            .with_text("mod_sync_jar_name", "sync-0.2.jar")
            .with_file(RELOCATOR_NAME, b"helper");
        let helper_dir = tempdir().unwrap();
        let coordinator = SelfUpdateCoordinator::new(&remote)
            .with_relocator_url(relocator_url())
            .with_helper_dir(helper_dir.path().to_path_buf());

        match coordinator.check(&endpoint(), &artifact).await.unwrap() {
            SelfUpdateCheck::HandoffReady(plan) => {
                assert_eq!(plan.helper, helper_dir.path().join(RELOCATOR_NAME));
                assert!(plan.current_artifact.is_absolute());
                assert!(plan.current_artifact.ends_with("sync-0.1.jar"));
                assert_eq!(
                    plan.artifact_url.as_str(),
                    "http://example.com/pack/mod_sync_jar"
                );
            }
            other => panic!("Expected HandoffReady, got {:?}", other),
        }

        assert!(helper_dir.path().join(RELOCATOR_NAME).exists());
    }

    #[tokio::test]
    async fn test_helper_download_failure_is_fatal() {
        let dir = tempdir().unwrap();
        let artifact = dir.path().join("sync-0.1.jar");
        tokio::fs::write(&artifact, b"self").await.unwrap();

        // Name mismatches but the helper release is unreachable
        let remote = FakeRemote::new().with_text("mod_sync_jar_name", "sync-0.2.jar");
        let coordinator = SelfUpdateCoordinator::new(&remote)
            .with_relocator_url(relocator_url())
            .with_helper_dir(dir.path().to_path_buf());

        let result = coordinator.check(&endpoint(), &artifact).await;
        assert!(matches!(result.unwrap_err(), AppError::Network(_)));
    }

    #[test]
    fn test_spawn_failure_reports_filesystem_error() {
        let dir = tempdir().unwrap();
        let plan = HandoffPlan {
            helper: dir.path().join("missing-helper"),
            current_artifact: dir.path().join("sync.jar"),
            artifact_url: Url::parse("http://example.com/pack/mod_sync_jar").unwrap(),
        };

        match plan.spawn().unwrap_err() {
            AppError::Filesystem(FilesystemError::Spawn { program, .. }) => {
                assert!(program.ends_with("missing-helper"));
            }
            other => panic!("Expected spawn failure, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_spawn_launches_helper_with_two_arguments() {
        let dir = tempdir().unwrap();
        let helper = dir.path().join("helper.sh");
        let marker = dir.path().join("args.txt");
        std::fs::write(
            &helper,
            format!("#!/bin/sh\necho \"$1 $2\" > {}\n", marker.display()),
        )
        .unwrap();

        let plan = HandoffPlan {
            helper,
            current_artifact: PathBuf::from("/tmp/sync.jar"),
            artifact_url: Url::parse("http://example.com/pack/mod_sync_jar").unwrap(),
        };
        plan.spawn().unwrap();

        // The helper runs detached; poll until it has written its marker
        let mut recorded = String::new();
        for _ in 0..100 {
            if let Ok(content) = std::fs::read_to_string(&marker) {
                if content.contains('\n') {
                    recorded = content;
                    break;
                }
            }
            std::thread::sleep(std::time::Duration::from_millis(20));
        }
        assert_eq!(
            recorded.trim(),
            "/tmp/sync.jar http://example.com/pack/mod_sync_jar"
        );
    }

    #[test]
    fn test_artifact_file_name() {
        assert_eq!(artifact_file_name(Path::new("/mods/sync.jar")), "sync.jar");
        assert_eq!(artifact_file_name(Path::new("/")), "");
    }
}
