//! Data bridge — connects [`Monitor`] watch channels to TUI actions.
//!
//! Runs as a background task: performs the monitor's initial
//! synchronization, then forwards every status / results / logs change
//! as an [`Action`] through the TUI's action channel. In-band scan
//! errors are surfaced as error notifications here, once per distinct
//! message, so the app loop never has to diff status payloads.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use scandeck_core::Monitor;

use crate::action::{Action, Notification};

/// Spawn the bridge between the monitor's reactive state and the TUI.
pub async fn run_data_bridge(
    monitor: Monitor,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    monitor.start().await;

    let mut status_rx = monitor.subscribe_status();
    let mut results_rx = monitor.subscribe_results();
    let mut logs_rx = monitor.subscribe_logs();

    // Push initial snapshots so screens have data immediately.
    let _ = action_tx.send(Action::StatusUpdated(status_rx.borrow_and_update().clone()));
    let _ = action_tx.send(Action::ResultsUpdated(
        results_rx.borrow_and_update().clone(),
    ));
    let _ = action_tx.send(Action::LogsUpdated(logs_rx.borrow_and_update().clone()));

    let mut last_error: Option<String> = None;

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            Ok(()) = status_rx.changed() => {
                let status = status_rx.borrow_and_update().clone();
                if status.error != last_error {
                    if let Some(ref message) = status.error {
                        let _ = action_tx.send(Action::Notify(Notification::error(message.clone())));
                    }
                    last_error.clone_from(&status.error);
                }
                let _ = action_tx.send(Action::StatusUpdated(status));
            }

            Ok(()) = results_rx.changed() => {
                let _ = action_tx.send(Action::ResultsUpdated(results_rx.borrow_and_update().clone()));
            }

            Ok(()) = logs_rx.changed() => {
                let _ = action_tx.send(Action::LogsUpdated(logs_rx.borrow_and_update().clone()));
            }
        }
    }

    debug!("data bridge stopped");
}
