//! Progress events emitted by the synchronization engine
//!
//! The engine never talks to a UI directly: it emits one event per completed
//! item per phase onto an unbounded channel, and whatever presentation layer
//! is attached renders them. Dropping the receiver silently discards events
//! without affecting the run.

use tokio::sync::mpsc;

/// Events emitted across the engine/presentation boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// The deletion phase is starting. Not emitted when `total` would be zero.
    DeletePhaseStarted { total: usize },

    /// A stale file was deleted. `index` is 1-based.
    Deleted {
        file_name: String,
        index: usize,
        total: usize,
    },

    /// The download phase is starting. Not emitted when `total` would be zero.
    DownloadPhaseStarted { total: usize },

    /// A mod file was downloaded. `index` is 1-based.
    Downloaded {
        file_name: String,
        index: usize,
        total: usize,
    },

    /// A self-update handoff was initiated; the process will terminate.
    HandoffStarted { artifact_name: String },

    /// Post-download verification passed and the run converged.
    Converged,
}

/// Sending half of the progress channel.
pub type EventSender = mpsc::UnboundedSender<SyncEvent>;

/// Receiving half of the progress channel.
pub type EventReceiver = mpsc::UnboundedReceiver<SyncEvent>;

/// Create a progress channel pair.
pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Phase completion percentage for a 1-based `index` out of `total`.
pub fn percent(index: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((index as f64 / total as f64) * 100.0).round() as u8
}
