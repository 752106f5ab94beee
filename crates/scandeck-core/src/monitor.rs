// ── Monitor ──
//
// Lifecycle owner for the scanner service connection: the 1-second
// status poller, the 2-second log poller, and the command surface
// (start/stop scan, speedtest, refresh, clear logs). State fans out to
// consumers through `watch` channels; the TUI's data bridge forwards
// changes into its action loop.
//
// Overlap policy: each poll tick awaits its request before the next tick
// can fire, and missed ticks are skipped, so a poller never has more
// than one request in flight. A slow response delays that tick's update
// and nothing else.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use scandeck_api::{LogEntry, ScanParams, ScanStatus, ScannerClient};

use crate::error::CoreError;
use crate::model::EndpointResult;

/// Poll periods for the two background loops.
#[derive(Debug, Clone, Copy)]
pub struct PollIntervals {
    pub status: Duration,
    pub logs: Duration,
}

impl Default for PollIntervals {
    fn default() -> Self {
        Self {
            status: Duration::from_secs(1),
            logs: Duration::from_secs(2),
        }
    }
}

/// Connection to one scanner service instance.
///
/// Cheaply cloneable via `Arc`. Constructed at startup, torn down with
/// [`shutdown()`](Self::shutdown) — after which no background task runs.
#[derive(Clone)]
pub struct Monitor {
    inner: Arc<MonitorInner>,
}

struct MonitorInner {
    client: ScannerClient,
    intervals: PollIntervals,
    status_tx: watch::Sender<ScanStatus>,
    results_tx: watch::Sender<Arc<Vec<EndpointResult>>>,
    logs_tx: watch::Sender<Arc<Vec<LogEntry>>>,
    cancel: CancellationToken,
    status_task: Mutex<Option<JoinHandle<()>>>,
    log_task: Mutex<Option<JoinHandle<()>>>,
}

impl Monitor {
    pub fn new(client: ScannerClient, intervals: PollIntervals) -> Self {
        let (status_tx, _) = watch::channel(ScanStatus::default());
        let (results_tx, _) = watch::channel(Arc::new(Vec::new()));
        let (logs_tx, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            inner: Arc::new(MonitorInner {
                client,
                intervals,
                status_tx,
                results_tx,
                logs_tx,
                cancel: CancellationToken::new(),
                status_task: Mutex::new(None),
                log_task: Mutex::new(None),
            }),
        }
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_status(&self) -> watch::Receiver<ScanStatus> {
        self.inner.status_tx.subscribe()
    }

    pub fn subscribe_results(&self) -> watch::Receiver<Arc<Vec<EndpointResult>>> {
        self.inner.results_tx.subscribe()
    }

    pub fn subscribe_logs(&self) -> watch::Receiver<Arc<Vec<LogEntry>>> {
        self.inner.logs_tx.subscribe()
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Initial synchronization: one status fetch, one results fetch, and
    /// the always-on log poller. Starts the status poller only if a scan
    /// is already active on the server. Fetch failures are logged and
    /// swallowed — the pollers self-heal on later ticks.
    pub async fn start(&self) {
        match self.inner.client.scan_status().await {
            Ok(status) => {
                let active = status.active;
                self.inner.status_tx.send_replace(status);
                if active {
                    self.ensure_status_polling().await;
                }
            }
            Err(e) => warn!(error = %e, "initial status fetch failed"),
        }

        if let Err(e) = self.refresh_results().await {
            warn!(error = %e, "initial results fetch failed");
        }

        let mut log_task = self.inner.log_task.lock().await;
        if log_task.as_ref().is_none_or(JoinHandle::is_finished) {
            let monitor = self.clone();
            let cancel = self.inner.cancel.clone();
            *log_task = Some(tokio::spawn(log_poll_task(monitor, cancel)));
        }

        info!("monitor started");
    }

    /// Cancel and join all background tasks. Idempotent — a second call
    /// is a no-op.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        for slot in [&self.inner.status_task, &self.inner.log_task] {
            if let Some(handle) = slot.lock().await.take() {
                let _ = handle.await;
            }
        }
        debug!("monitor shut down");
    }

    /// Spawn the status poll loop unless one is already running.
    /// Starting an already-started poller is a no-op.
    pub async fn ensure_status_polling(&self) {
        let mut task = self.inner.status_task.lock().await;
        if task.as_ref().is_some_and(|h| !h.is_finished()) {
            return;
        }
        let monitor = self.clone();
        let cancel = self.inner.cancel.clone();
        *task = Some(tokio::spawn(status_poll_task(monitor, cancel)));
        debug!("status poller started");
    }

    /// Whether the status poll loop is currently running.
    pub async fn is_status_polling(&self) -> bool {
        self.inner
            .status_task
            .lock()
            .await
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// POST the scan parameters; on accept, begin status polling.
    /// Errors propagate so the UI can re-enable its control and surface
    /// the message.
    pub async fn start_scan(&self, params: &ScanParams) -> Result<(), CoreError> {
        self.inner.client.start_scan(params).await?;
        self.ensure_status_polling().await;
        Ok(())
    }

    /// Request cancellation of the running scan.
    pub async fn stop_scan(&self) -> Result<(), CoreError> {
        self.inner.client.stop_scan().await?;
        Ok(())
    }

    /// Dispatch a VPN speedtest for the given domains. On accept, the
    /// log snapshot is reset (a fresh run gets a fresh console) and the
    /// status poller tracks its progress — the speedtest reuses the scan
    /// status channel.
    pub async fn run_speedtest(&self, domains: &[String]) -> Result<(), CoreError> {
        self.inner.client.run_speedtest(domains).await?;
        self.inner.logs_tx.send_replace(Arc::new(Vec::new()));
        self.ensure_status_polling().await;
        Ok(())
    }

    /// Fetch and normalize the full result set, then publish it.
    pub async fn refresh_results(&self) -> Result<(), CoreError> {
        let wire = self.inner.client.results().await?;
        let results: Vec<EndpointResult> = wire
            .into_iter()
            .map(|(domain, entry)| EndpointResult::from_wire(domain, entry))
            .collect();
        debug!(count = results.len(), "results refreshed");
        self.inner.results_tx.send_replace(Arc::new(results));
        Ok(())
    }

    /// Clear the server log buffer and reset the local snapshot to a
    /// single synthetic system entry.
    pub async fn clear_logs(&self) -> Result<(), CoreError> {
        self.inner.client.clear_logs().await?;
        let entry = LogEntry {
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            level: "system".to_owned(),
            message: "Logs cleared".to_owned(),
        };
        self.inner.logs_tx.send_replace(Arc::new(vec![entry]));
        Ok(())
    }
}

// ── Background tasks ─────────────────────────────────────────────────

/// Poll scan status until the scan finishes or the monitor shuts down.
///
/// When `active` transitions to false the task triggers one final
/// results refresh (capturing the completed state) and exits; the next
/// `start_scan` spawns a fresh poller. Poll failures never kill the
/// loop.
async fn status_poll_task(monitor: Monitor, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(monitor.inner.intervals.status);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                match monitor.inner.client.scan_status().await {
                    Ok(status) => {
                        let active = status.active;
                        monitor.inner.status_tx.send_replace(status);
                        if !active {
                            if let Err(e) = monitor.refresh_results().await {
                                warn!(error = %e, "final results refresh failed");
                            }
                            debug!("scan inactive, status poller stopping");
                            break;
                        }
                    }
                    Err(e) if e.is_transient() => debug!(error = %e, "status poll missed"),
                    Err(e) => warn!(error = %e, "status poll failed"),
                }
            }
        }
    }
}

/// Poll the log feed for the monitor's whole lifetime, replacing the
/// published snapshot wholesale on every successful fetch.
async fn log_poll_task(monitor: Monitor, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(monitor.inner.intervals.logs);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                match monitor.inner.client.logs().await {
                    Ok(entries) => {
                        monitor.inner.logs_tx.send_replace(Arc::new(entries));
                    }
                    Err(e) if e.is_transient() => debug!(error = %e, "log poll missed"),
                    Err(e) => warn!(error = %e, "log poll failed"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_intervals() -> PollIntervals {
        PollIntervals {
            status: Duration::from_millis(10),
            logs: Duration::from_millis(10),
        }
    }

    async fn monitor_for(server: &MockServer) -> Monitor {
        let base = server.uri().parse().expect("mock server URI");
        let client = ScannerClient::with_client(reqwest::Client::new(), base);
        Monitor::new(client, fast_intervals())
    }

    async fn mock_empty_results(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/api/results"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(server)
            .await;
    }

    async fn mock_empty_logs(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/api/logs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn poller_stops_itself_and_refreshes_when_scan_ends() {
        let server = MockServer::start().await;
        mock_empty_logs(&server).await;

        // One active tick, then inactive forever.
        Mock::given(method("GET"))
            .and(path("/api/scan/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "active": true, "progress": {"done": 1, "total": 2}
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/scan/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "active": false, "progress": {"done": 2, "total": 2}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/results"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "a.com": [10.0, "1.1.1.1", "US", "NY"]
            })))
            .mount(&server)
            .await;

        let monitor = monitor_for(&server).await;
        let mut status_rx = monitor.subscribe_status();
        let results_rx = monitor.subscribe_results();

        monitor.start().await;
        assert!(monitor.is_status_polling().await);

        // Wait for the inactive transition to land.
        tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                status_rx.changed().await.expect("status channel open");
                if !status_rx.borrow().active {
                    break;
                }
            }
        })
        .await
        .expect("scan must go inactive");

        // The final refresh runs before the poller exits.
        tokio::time::timeout(Duration::from_secs(2), async {
            while results_rx.borrow().is_empty() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("final results refresh");
        assert_eq!(results_rx.borrow()[0].domain, "a.com");

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!monitor.is_status_polling().await);

        monitor.shutdown().await;
    }

    #[tokio::test]
    async fn ensure_status_polling_is_idempotent() {
        let server = MockServer::start().await;
        mock_empty_results(&server).await;
        mock_empty_logs(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/scan/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "active": true, "progress": {"done": 0, "total": 10}
            })))
            .mount(&server)
            .await;

        let monitor = monitor_for(&server).await;
        monitor.ensure_status_polling().await;
        monitor.ensure_status_polling().await;
        assert!(monitor.is_status_polling().await);

        monitor.shutdown().await;
        assert!(!monitor.is_status_polling().await);
        // Shutting down twice is a no-op.
        monitor.shutdown().await;
    }

    #[tokio::test]
    async fn poll_failures_are_swallowed_and_retried() {
        let server = MockServer::start().await;
        mock_empty_results(&server).await;
        mock_empty_logs(&server).await;

        // Two failures, then a healthy active status.
        Mock::given(method("GET"))
            .and(path("/api/scan/status"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/scan/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "active": true, "progress": {"done": 5, "total": 10}
            })))
            .mount(&server)
            .await;

        let monitor = monitor_for(&server).await;
        let mut status_rx = monitor.subscribe_status();
        monitor.ensure_status_polling().await;

        tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                status_rx.changed().await.expect("status channel open");
                if status_rx.borrow().active {
                    break;
                }
            }
        })
        .await
        .expect("poller must recover after failures");

        monitor.shutdown().await;
    }

    #[tokio::test]
    async fn clear_logs_resets_to_single_system_entry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/logs/clear"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "cleared"})))
            .mount(&server)
            .await;

        let monitor = monitor_for(&server).await;
        let logs_rx = monitor.subscribe_logs();

        monitor.clear_logs().await.expect("clear accepted");

        let logs = logs_rx.borrow().clone();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].level, "system");
        assert_eq!(logs[0].message, "Logs cleared");
    }

    #[tokio::test]
    async fn speedtest_clears_logs_and_starts_polling() {
        let server = MockServer::start().await;
        mock_empty_results(&server).await;
        Mock::given(method("POST"))
            .and(path("/api/vpn-speedtest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "started"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/scan/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "active": true, "progress": {"done": 0, "total": 2}
            })))
            .mount(&server)
            .await;

        let monitor = monitor_for(&server).await;
        let logs_rx = monitor.subscribe_logs();

        let domains = vec!["a.com".to_owned()];
        monitor.run_speedtest(&domains).await.expect("accepted");

        assert!(logs_rx.borrow().is_empty());
        assert!(monitor.is_status_polling().await);

        monitor.shutdown().await;
    }

    #[tokio::test]
    async fn rejected_speedtest_propagates_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/vpn-speedtest"))
            .respond_with(
                ResponseTemplate::new(409)
                    .set_body_json(json!({"message": "Scan already in progress"})),
            )
            .mount(&server)
            .await;

        let monitor = monitor_for(&server).await;
        let err = monitor
            .run_speedtest(&["a.com".to_owned()])
            .await
            .expect_err("must be rejected");
        assert_eq!(err.toast_message(), "Scan already in progress");
        assert!(!monitor.is_status_polling().await);
    }
}
