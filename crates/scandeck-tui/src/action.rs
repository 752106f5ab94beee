//! All possible UI actions. Actions are the sole mechanism for state mutation.

use std::sync::Arc;

use scandeck_core::{EndpointResult, LogEntry, ScanStatus, SortField};

use crate::screen::ScreenId;

/// Notification severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// A toast notification, auto-dismissed after a few seconds.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Error,
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Info,
        }
    }
}

/// Every state transition in the TUI is expressed as an Action.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Navigation ────────────────────────────────────────────────
    SwitchScreen(ScreenId),
    ToggleHelp,

    // ── Data events (from the monitor via the data bridge) ────────
    StatusUpdated(ScanStatus),
    ResultsUpdated(Arc<Vec<EndpointResult>>),
    LogsUpdated(Arc<Vec<LogEntry>>),

    // ── Scan controls ─────────────────────────────────────────────
    StartScan,
    ScanRejected(String),
    StopScan,
    StopRejected(String),
    RefreshResults,

    // ── Speedtest ─────────────────────────────────────────────────
    RunSpeedtest(Vec<String>),
    SpeedtestRejected(String),

    // ── Logs ──────────────────────────────────────────────────────
    ClearLogs,
    ClearLogsRejected(String),

    // ── Results table ─────────────────────────────────────────────
    SortColumn(SortField),

    // ── Notifications ─────────────────────────────────────────────
    Notify(Notification),
}
