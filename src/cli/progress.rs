//! Terminal progress rendering for synchronization runs
//!
//! Consumes the engine's event channel and renders one indicatif bar per
//! phase. The renderer runs as its own task so status updates never block
//! the engine's I/O; dropping the sender ends the task.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::app::events::{percent, EventReceiver, SyncEvent};

/// Renders engine progress events to the terminal.
pub struct ProgressDisplay {
    quiet: bool,
}

impl ProgressDisplay {
    /// Create a display; `quiet` suppresses all bar output.
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    /// Spawn the rendering task. It exits once the event channel closes.
    pub fn spawn(self, mut events: EventReceiver) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut current: Option<ProgressBar> = None;

            while let Some(event) = events.recv().await {
                match event {
                    SyncEvent::DeletePhaseStarted { total } => {
                        current = Some(self.phase_bar("Deleting stale mods", total));
                    }
                    SyncEvent::Deleted {
                        file_name,
                        index,
                        total,
                    } => {
                        if let Some(bar) = &current {
                            bar.set_position(index as u64);
                            bar.set_message(format!(
                                "Deleting {} ({}/{})",
                                file_name, index, total
                            ));
                        }
                        debug!(
                            "Delete progress: {}% ({}/{})",
                            percent(index, total),
                            index,
                            total
                        );
                    }
                    SyncEvent::DownloadPhaseStarted { total } => {
                        if let Some(bar) = current.take() {
                            bar.finish_with_message("Stale mods deleted");
                        }
                        current = Some(self.phase_bar("Downloading new mods", total));
                    }
                    SyncEvent::Downloaded {
                        file_name,
                        index,
                        total,
                    } => {
                        if let Some(bar) = &current {
                            bar.set_position(index as u64);
                            bar.set_message(format!(
                                "Downloading {} ({}/{})",
                                file_name, index, total
                            ));
                        }
                        debug!(
                            "Download progress: {}% ({}/{})",
                            percent(index, total),
                            index,
                            total
                        );
                    }
                    SyncEvent::HandoffStarted { artifact_name } => {
                        if !self.quiet {
                            println!(
                                "Sync tool update found! {} will now be replaced.",
                                artifact_name
                            );
                        }
                    }
                    SyncEvent::Converged => {
                        if let Some(bar) = current.take() {
                            bar.finish_with_message("Mods directory matches the server");
                        }
                    }
                }
            }

            // Channel closed mid-phase (fatal error in the engine): leave the
            // bar where it stopped rather than pretending it finished
            if let Some(bar) = current.take() {
                bar.abandon();
            }
        })
    }

    fn phase_bar(&self, label: &str, total: usize) -> ProgressBar {
        let bar = if self.quiet {
            ProgressBar::with_draw_target(Some(total as u64), ProgressDrawTarget::hidden())
        } else {
            ProgressBar::new(total as u64)
        };

        if let Ok(style) =
            ProgressStyle::default_bar().template("{msg} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%)")
        {
            bar.set_style(style.progress_chars("##-"));
        }
        bar.set_message(label.to_string());
        bar
    }
}
