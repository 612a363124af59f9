//! Endpoint configuration for modsync
//!
//! The only persisted configuration is a single line of text at
//! `config/modsync.txt`: the update URL all server resources are resolved
//! against. This module owns the [`Endpoint`] type, normalization of bare
//! host strings, loading and persisting the configuration file, and the
//! interactive first-run setup prompt.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use url::Url;

use crate::constants::{endpoint as defaults, files};
use crate::errors::{ConfigError, ConfigResult};

/// Base network location from which all manifest and file resources are
/// resolved.
///
/// Always carries an explicit scheme: bare host strings are normalized by
/// prefixing `http://` before first use. The path is normalized to end with
/// `/` so relative resources resolve under the configured path rather than
/// replacing its final segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base: Url,
}

impl Endpoint {
    /// Parse and normalize an endpoint string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::EmptyEndpoint` for blank input and
    /// `ConfigError::InvalidEndpoint` when the normalized string still does
    /// not parse as a URL.
    pub fn parse(raw: &str) -> ConfigResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::EmptyEndpoint);
        }

        let lowered = trimmed.to_ascii_lowercase();
        let with_scheme = if lowered.starts_with("http://") || lowered.starts_with("https://") {
            trimmed.to_string()
        } else {
            format!("{}://{}", defaults::DEFAULT_SCHEME, trimmed)
        };

        let mut base = Url::parse(&with_scheme).map_err(|source| ConfigError::InvalidEndpoint {
            url: trimmed.to_string(),
            source,
        })?;

        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self { base })
    }

    /// Resolve a relative resource path against the endpoint.
    pub fn resolve(&self, path: &str) -> Result<Url, crate::errors::NetworkError> {
        self.base
            .join(path)
            .map_err(|source| crate::errors::NetworkError::Resolve {
                base: self.base.to_string(),
                path: path.to_string(),
                source,
            })
    }

    /// The normalized endpoint URL.
    pub fn as_url(&self) -> &Url {
        &self.base
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.base.fmt(f)
    }
}

/// Path of the configuration file under the given working directory.
pub fn config_path(working_dir: &Path) -> PathBuf {
    working_dir.join(files::CONFIG_DIR).join(files::CONFIG_FILE)
}

/// Load the endpoint from the configuration file, if present.
///
/// Returns `Ok(None)` when the file does not exist (first run).
///
/// # Errors
///
/// Returns `ConfigError` when the file exists but cannot be read or holds
/// an invalid URL.
pub async fn load_endpoint(working_dir: &Path) -> ConfigResult<Option<Endpoint>> {
    let path = config_path(working_dir);
    if !path.exists() {
        debug!("No configuration file at {}", path.display());
        return Ok(None);
    }

    let raw = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| ConfigError::Unreadable {
            path: path.clone(),
            source,
        })?;

    let endpoint = Endpoint::parse(&raw)?;
    debug!("Loaded endpoint {} from {}", endpoint, path.display());
    Ok(Some(endpoint))
}

/// Persist the endpoint as the single line of the configuration file,
/// creating the config directory if needed.
pub async fn save_endpoint(working_dir: &Path, endpoint: &Endpoint) -> ConfigResult<()> {
    let path = config_path(working_dir);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| ConfigError::Unwritable {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    tokio::fs::write(&path, endpoint.to_string())
        .await
        .map_err(|source| ConfigError::Unwritable {
            path: path.clone(),
            source,
        })?;

    info!("Saved endpoint {} to {}", endpoint, path.display());
    Ok(())
}

/// Interactive first-run setup: prompt for the update URL on stdin,
/// normalize it, and persist it.
///
/// Re-prompts until a non-empty valid URL is entered. Returns the persisted
/// endpoint; the caller treats this as a setup-only run and exits without
/// syncing.
pub async fn run_setup(working_dir: &Path) -> ConfigResult<Endpoint> {
    println!("Please enter the update URL. If you are unsure, ask the server admin.");

    let endpoint = loop {
        print!("Update URL: ");
        io::stdout().flush().ok();

        let mut input = String::new();
        io::stdin()
            .read_line(&mut input)
            .map_err(|source| ConfigError::Unreadable {
                path: PathBuf::from("<stdin>"),
                source,
            })?;

        match Endpoint::parse(&input) {
            Ok(endpoint) => break endpoint,
            Err(e) => {
                println!("{}. Please try again.", e);
            }
        }
    };

    save_endpoint(working_dir, &endpoint).await?;
    println!("Configuration saved. Run modsync again to synchronize.");
    Ok(endpoint)
}
