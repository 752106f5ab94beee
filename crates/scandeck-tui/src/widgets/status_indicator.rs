//! Scan state indicator — colored dot plus label.

use ratatui::style::Style;
use ratatui::text::Span;
use scandeck_core::ScanStatus;

use crate::theme;

/// Visible scan state, derived from the latest status payload plus the
/// optimistic stop flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Ready,
    Scanning,
    Stopping,
    Error,
}

impl ScanState {
    pub fn derive(status: &ScanStatus, stop_pending: bool) -> Self {
        if status.error.is_some() {
            Self::Error
        } else if status.active && (status.stopping || stop_pending) {
            Self::Stopping
        } else if status.active {
            Self::Scanning
        } else {
            Self::Ready
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Ready => "Ready",
            Self::Scanning => "Scanning...",
            Self::Stopping => "Stopping...",
            Self::Error => "Error",
        }
    }
}

/// Styled `●`/`○`/`◐` state dot.
pub fn state_span(state: ScanState) -> Span<'static> {
    let (symbol, color) = match state {
        ScanState::Ready => ("○", theme::OK_GREEN),
        ScanState::Scanning => ("●", theme::ACCENT_BLUE),
        ScanState::Stopping => ("◐", theme::WARN_AMBER),
        ScanState::Error => ("●", theme::ERR_RED),
    };
    Span::styled(symbol, Style::default().fg(color))
}
