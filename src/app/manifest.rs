//! Remote manifest and local file-set handling
//!
//! The manifest is the server's declared desired state: the set of mod file
//! names that should exist in the mods directory, plus the expected file
//! name of the sync tool artifact itself. It is built fresh on every run and
//! never cached.

use std::collections::BTreeSet;
use std::path::Path;

use tracing::debug;

use crate::app::client::RemoteSource;
use crate::config::Endpoint;
use crate::constants::endpoint as resources;
use crate::errors::{FilesystemError, Result};

/// Server-declared desired state for the mods directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteManifest {
    files: BTreeSet<String>,
    declared_artifact: String,
}

impl RemoteManifest {
    /// Parse a manifest from a raw `modlist` response body.
    ///
    /// File names are separated by `/`; surrounding whitespace (including
    /// response line terminators) is stripped and empty segments discarded.
    pub fn from_modlist(modlist: &str, declared_artifact: impl Into<String>) -> Self {
        let files = modlist
            .split(resources::MODLIST_SEPARATOR)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();

        Self {
            files,
            declared_artifact: declared_artifact.into(),
        }
    }

    /// Fetch the manifest from the server.
    ///
    /// The declared artifact name is passed in by the caller: the self-update
    /// check has already fetched it, and a handoff short-circuits the run
    /// before this point is ever reached.
    pub async fn fetch<C: RemoteSource + ?Sized>(
        client: &C,
        endpoint: &Endpoint,
        declared_artifact: String,
    ) -> Result<Self> {
        let url = endpoint.resolve(resources::MODLIST)?;
        let body = client.fetch_text(&url).await?;
        let manifest = Self::from_modlist(&body, declared_artifact);
        debug!("Fetched manifest with {} entries", manifest.files.len());
        Ok(manifest)
    }

    /// The set of file names the mods directory should converge to.
    pub fn files(&self) -> &BTreeSet<String> {
        &self.files
    }

    /// The server-declared file name of the sync tool artifact.
    pub fn declared_artifact(&self) -> &str {
        &self.declared_artifact
    }
}

/// List the file names currently present in the mods directory, excluding
/// the running artifact's own file.
///
/// # Errors
///
/// Returns `FilesystemError::List` when the directory cannot be read.
pub async fn list_local_files(mods_dir: &Path, exclude: &str) -> Result<BTreeSet<String>> {
    let mut entries =
        tokio::fs::read_dir(mods_dir)
            .await
            .map_err(|source| FilesystemError::List {
                path: mods_dir.to_path_buf(),
                source,
            })?;

    let mut files = BTreeSet::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|source| FilesystemError::List {
            path: mods_dir.to_path_buf(),
            source,
        })?
    {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name != exclude {
            files.insert(name);
        }
    }

    Ok(files)
}

/// Create the mods directory if it does not exist yet.
pub async fn ensure_mods_dir(mods_dir: &Path) -> Result<()> {
    tokio::fs::create_dir_all(mods_dir)
        .await
        .map_err(|source| FilesystemError::CreateDir {
            path: mods_dir.to_path_buf(),
            source,
        })?;
    Ok(())
}
