//! HTTP access to the mod server
//!
//! Wraps a [`reqwest::Client`] configured with bounded connect/read timeouts
//! so a stalled server cannot hang a run indefinitely. The two operations,
//! fetching a text resource and streaming a file download, are exposed
//! through the [`RemoteSource`] trait so the executor, the self-update
//! coordinator, and the host check can run against in-memory fakes in tests.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use url::Url;

use crate::constants::http;
use crate::errors::{FilesystemError, NetworkError, NetworkResult, Result};

/// Remote side of a synchronization run.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Fetch a text resource. Requires a success status; the body is read
    /// fully as text.
    async fn fetch_text(&self, url: &Url) -> Result<String>;

    /// Download a binary resource into `dest_dir`. The destination file name
    /// is the URL's final path segment; an existing file of the same name is
    /// overwritten. Returns the path written.
    async fn download_file(&self, url: &Url, dest_dir: &Path) -> Result<PathBuf>;
}

/// HTTP client for the mod server resource contract.
#[derive(Debug, Clone)]
pub struct ModServerClient {
    http: reqwest::Client,
}

impl ModServerClient {
    /// Create a client with the crate's timeout and user-agent defaults.
    ///
    /// # Errors
    ///
    /// Returns `NetworkError::ClientBuild` if the underlying client cannot
    /// be constructed.
    pub fn new() -> NetworkResult<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(http::CONNECT_TIMEOUT)
            .read_timeout(http::READ_TIMEOUT)
            .user_agent(http::USER_AGENT)
            .build()
            .map_err(NetworkError::ClientBuild)?;

        Ok(Self { http })
    }

    /// Issue a GET and require a success status.
    async fn get_checked(&self, url: &Url) -> NetworkResult<reqwest::Response> {
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|source| NetworkError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl RemoteSource for ModServerClient {
    async fn fetch_text(&self, url: &Url) -> Result<String> {
        let response = self.get_checked(url).await?;
        let text = response
            .text()
            .await
            .map_err(|source| NetworkError::Transport {
                url: url.to_string(),
                source,
            })?;

        debug!("Fetched {} ({} bytes)", url, text.len());
        Ok(text)
    }

    async fn download_file(&self, url: &Url, dest_dir: &Path) -> Result<PathBuf> {
        let file_name = file_name_from_url(url)?;
        let dest = dest_dir.join(&file_name);

        let response = self.get_checked(url).await?;

        let mut file =
            tokio::fs::File::create(&dest)
                .await
                .map_err(|source| FilesystemError::Write {
                    path: dest.clone(),
                    source,
                })?;

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|source| NetworkError::Transport {
                url: url.to_string(),
                source,
            })?;
            file.write_all(&chunk)
                .await
                .map_err(|source| FilesystemError::Write {
                    path: dest.clone(),
                    source,
                })?;
        }
        file.flush()
            .await
            .map_err(|source| FilesystemError::Write {
                path: dest.clone(),
                source,
            })?;

        debug!("Downloaded {} to {}", url, dest.display());
        Ok(dest)
    }
}

/// Derive the destination file name from a URL's final path segment.
pub fn file_name_from_url(url: &Url) -> NetworkResult<String> {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .ok_or_else(|| NetworkError::NoFileName {
            url: url.to_string(),
        })
}
