//! Error types for modsync
//!
//! This module defines the error taxonomy for all components of the
//! application. Every failure aborts the run it occurs in; nothing here is
//! retried or recovered locally, so each variant carries enough context
//! (file name, URL, underlying cause) for user-facing reporting.

use std::collections::BTreeSet;
use std::path::PathBuf;

use thiserror::Error;

/// Configuration errors (missing, unreadable, or invalid endpoint)
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file does not exist and the command requires one
    #[error("No configuration file at {path}. Run 'modsync setup' first")]
    Missing { path: PathBuf },

    /// Configuration file exists but could not be read
    #[error("Failed to read configuration file: {path}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be written during setup
    #[error("Failed to write configuration file: {path}")]
    Unwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configured endpoint string is empty
    #[error("Update URL is empty")]
    EmptyEndpoint,

    /// The configured endpoint string is not a valid URL
    #[error("Invalid update URL: {url}")]
    InvalidEndpoint {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Network errors (non-success status, transport failure, timeout)
#[derive(Error, Debug)]
pub enum NetworkError {
    /// Server returned a non-success status code
    #[error("Received error code {status} from {url}")]
    Status { url: String, status: u16 },

    /// Transport-level failure (connect, read, timeout)
    #[error("Failed to get data from {url}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// HTTP client could not be constructed
    #[error("Failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    /// A resource path could not be resolved against the endpoint
    #[error("Failed to resolve resource {path} against {base}")]
    Resolve {
        base: String,
        path: String,
        #[source]
        source: url::ParseError,
    },

    /// URL has no usable final path segment to derive a file name from
    #[error("Cannot derive a file name from {url}")]
    NoFileName { url: String },
}

/// Filesystem errors (delete, list, write failures)
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// A stale file could not be deleted
    #[error("Failed to delete file {file_name}")]
    Delete {
        file_name: String,
        #[source]
        source: std::io::Error,
    },

    /// A directory could not be listed
    #[error("Failed to list directory {path}")]
    List {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A directory could not be created
    #[error("Failed to create directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Downloaded content could not be written to disk
    #[error("Failed to write file {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The process environment did not yield a usable path
    #[error("Failed to determine {what}")]
    Environment {
        what: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// A path could not be resolved to its absolute form
    #[error("Failed to resolve absolute path for {path}")]
    Canonicalize {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The successor process could not be spawned
    #[error("Failed to spawn {program}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level application error covering the whole run
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Network error
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// Filesystem error
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),

    /// Post-run directory state diverged from the server manifest
    #[error(
        "Mod list does not match server after download (expected {expected:?}, found {actual:?})"
    )]
    VerificationMismatch {
        expected: BTreeSet<String>,
        actual: BTreeSet<String>,
    },
}

impl AppError {
    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Config(_) => "config",
            AppError::Network(_) => "network",
            AppError::Filesystem(_) => "filesystem",
            AppError::VerificationMismatch { .. } => "verification",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Network result type alias
pub type NetworkResult<T> = std::result::Result<T, NetworkError>;
