//! Palette and semantic styling for the dashboard.

use ratatui::style::{Color, Modifier, Style};
use scandeck_core::LatencyClass;

// ── Core palette ──────────────────────────────────────────────────────

pub const ACCENT_BLUE: Color = Color::Rgb(96, 165, 250); // #60a5fa
pub const ACCENT_VIOLET: Color = Color::Rgb(167, 139, 250); // #a78bfa
pub const OK_GREEN: Color = Color::Rgb(16, 185, 129); // #10b981
pub const WARN_AMBER: Color = Color::Rgb(245, 158, 11); // #f59e0b
pub const ERR_RED: Color = Color::Rgb(239, 68, 68); // #ef4444

pub const FG_DIM: Color = Color::Rgb(148, 163, 184); // #94a3b8
pub const FG_MUTED: Color = Color::Rgb(100, 116, 139); // #64748b
pub const BG_HIGHLIGHT: Color = Color::Rgb(30, 41, 59); // #1e293b
pub const BG_DARK: Color = Color::Rgb(15, 23, 42); // #0f172a

// ── Semantic styles ───────────────────────────────────────────────────

/// Title text for blocks/panels.
pub fn title_style() -> Style {
    Style::default().fg(ACCENT_BLUE).add_modifier(Modifier::BOLD)
}

/// Border for a focused panel.
pub fn border_focused() -> Style {
    Style::default().fg(ACCENT_VIOLET)
}

/// Border for an unfocused panel.
pub fn border_default() -> Style {
    Style::default().fg(FG_MUTED)
}

/// Table header row.
pub fn table_header() -> Style {
    Style::default()
        .fg(ACCENT_BLUE)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
}

/// Normal table row text.
pub fn table_row() -> Style {
    Style::default().fg(FG_DIM)
}

/// Highlighted table row.
pub fn table_highlight() -> Style {
    Style::default()
        .fg(ACCENT_VIOLET)
        .bg(BG_HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

/// Latency cell, colored by severity bucket.
pub fn latency_style(class: LatencyClass) -> Style {
    let color = match class {
        LatencyClass::Good => OK_GREEN,
        LatencyClass::Medium => WARN_AMBER,
        LatencyClass::Bad => ERR_RED,
    };
    Style::default().fg(color)
}

/// Log line, colored by the server-reported level string.
pub fn log_level_style(level: &str) -> Style {
    let color = match level.to_lowercase().as_str() {
        "error" | "critical" => ERR_RED,
        "warning" | "warn" => WARN_AMBER,
        "system" => ACCENT_VIOLET,
        "debug" => FG_MUTED,
        _ => FG_DIM,
    };
    Style::default().fg(color)
}

/// Active tab in the tab bar.
pub fn tab_active() -> Style {
    Style::default()
        .fg(ACCENT_VIOLET)
        .add_modifier(Modifier::BOLD)
}

/// Inactive tab in the tab bar.
pub fn tab_inactive() -> Style {
    Style::default().fg(FG_DIM)
}

/// Key hint text (e.g., "q quit  ? help").
pub fn key_hint() -> Style {
    Style::default().fg(FG_MUTED)
}

/// Key hint key character.
pub fn key_hint_key() -> Style {
    Style::default().fg(ACCENT_BLUE).add_modifier(Modifier::BOLD)
}
