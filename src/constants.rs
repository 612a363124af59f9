//! Application constants for modsync
//!
//! Centralizes the server resource contract, HTTP client settings, and
//! well-known file locations, organized by functional domain.

use std::time::Duration;

/// Server resource contract, relative to the configured endpoint
pub mod endpoint {
    /// Resource returning the `/`-separated list of expected mod file names
    pub const MODLIST: &str = "modlist";

    /// Resource returning the expected file name of the sync tool artifact
    pub const ARTIFACT_NAME: &str = "mod_sync_jar_name";

    /// Resource returning the sync tool artifact itself
    pub const ARTIFACT: &str = "mod_sync_jar";

    /// Sub-path under which individual mod files are served
    pub const MODS_PREFIX: &str = "mods";

    /// Separator between file names in the modlist response body
    pub const MODLIST_SEPARATOR: char = '/';

    /// Scheme prefixed onto bare host strings during normalization
    pub const DEFAULT_SCHEME: &str = "http";
}

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Default user agent for all HTTP requests
    pub const USER_AGENT: &str = concat!("modsync/", env!("CARGO_PKG_VERSION"));

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Timeout between successive reads of a response body
    pub const READ_TIMEOUT: Duration = Duration::from_secs(10);
}

/// Well-known file locations, relative to the working directory
pub mod files {
    /// Directory holding the configuration file
    pub const CONFIG_DIR: &str = "config";

    /// Configuration file name (single line: the update URL)
    pub const CONFIG_FILE: &str = "modsync.txt";

    /// Directory reconciled against the server manifest
    pub const MODS_DIR: &str = "mods";
}

/// Relocation helper used for the self-update handoff
pub mod relocator {
    /// Fixed, versioned release URL of the relocation helper. Served from
    /// outside the sync endpoint; must stay reachable while the endpoint's
    /// own artifact is being replaced.
    pub const RELEASE_URL: &str =
        "https://github.com/modsync/relocator/releases/download/1.2/modsync-relocator-1.2";
}

// Re-export commonly used constants for convenience
pub use endpoint::{MODLIST, MODLIST_SEPARATOR};
pub use http::{CONNECT_TIMEOUT, READ_TIMEOUT, USER_AGENT};
