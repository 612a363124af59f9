//! In-memory [`RemoteSource`] fake shared by the engine unit tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use url::Url;

use crate::app::client::{file_name_from_url, RemoteSource};
use crate::errors::{FilesystemError, NetworkError, Result};

/// Serves canned text resources and file bodies, recording every request.
#[derive(Debug, Default)]
pub struct FakeRemote {
    texts: HashMap<String, String>,
    files: HashMap<String, Vec<u8>>,
    calls: Mutex<Vec<String>>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a text resource, keyed by its final path segment.
    pub fn with_text(mut self, resource: &str, body: &str) -> Self {
        self.texts.insert(resource.to_string(), body.to_string());
        self
    }

    /// Register a downloadable file body, keyed by file name.
    pub fn with_file(mut self, name: &str, content: &[u8]) -> Self {
        self.files.insert(name.to_string(), content.to_vec());
        self
    }

    /// Requests issued so far, in order, as `"text <path>"` / `"download <path>"`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn download_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.starts_with("download "))
            .count()
    }
}

#[async_trait]
impl RemoteSource for FakeRemote {
    async fn fetch_text(&self, url: &Url) -> Result<String> {
        let name = file_name_from_url(url)?;
        self.calls.lock().unwrap().push(format!("text {}", url.path()));

        self.texts.get(&name).cloned().ok_or_else(|| {
            NetworkError::Status {
                url: url.to_string(),
                status: 404,
            }
            .into()
        })
    }

    async fn download_file(&self, url: &Url, dest_dir: &Path) -> Result<PathBuf> {
        let name = file_name_from_url(url)?;
        self.calls
            .lock()
            .unwrap()
            .push(format!("download {}", url.path()));

        let content = self.files.get(&name).ok_or_else(|| NetworkError::Status {
            url: url.to_string(),
            status: 404,
        })?;

        let dest = dest_dir.join(&name);
        tokio::fs::write(&dest, content)
            .await
            .map_err(|source| FilesystemError::Write {
                path: dest.clone(),
                source,
            })?;
        Ok(dest)
    }
}
