//! Logs screen — live feed from the scanner, pinned to the bottom by default.

use std::cell::Cell;
use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use scandeck_core::LogEntry;

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::fmt;

pub struct LogsScreen {
    focused: bool,
    logs: Arc<Vec<LogEntry>>,
    /// None means pinned to the newest line; Some(n) is a fixed offset
    /// from the top while the user is scrolled back.
    scroll: Option<usize>,
    /// Viewport height observed during the last render, used to size
    /// scroll steps and the pin threshold.
    viewport: Cell<usize>,
}

impl LogsScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            logs: Arc::new(Vec::new()),
            scroll: None,
            viewport: Cell::new(0),
        }
    }

    fn max_scroll(&self) -> usize {
        self.logs.len().saturating_sub(self.viewport.get())
    }

    fn scroll_by(&mut self, delta: isize) {
        let max = self.max_scroll();
        let current = self.scroll.unwrap_or(max);
        let next = (current as isize + delta).clamp(0, max as isize) as usize;
        // Scrolling to the last line re-pins the feed.
        self.scroll = if next >= max { None } else { Some(next) };
    }

    fn log_line(entry: &LogEntry) -> Line<'static> {
        let level = entry.level.to_uppercase();
        Line::from(vec![
            Span::styled(
                format!(" {} ", fmt::sanitize(&entry.timestamp)),
                Style::default().fg(theme::FG_MUTED),
            ),
            Span::styled(format!("[{level:>8}] "), theme::log_level_style(&entry.level)),
            Span::styled(
                fmt::sanitize(&entry.message),
                Style::default().fg(theme::FG_DIM),
            ),
        ])
    }
}

impl Component for LogsScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.scroll_by(1);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.scroll_by(-1);
                None
            }
            KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.scroll_by(self.viewport.get().max(1) as isize / 2);
                None
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.scroll_by(-(self.viewport.get().max(1) as isize / 2));
                None
            }
            KeyCode::Char('g') => {
                self.scroll = Some(0);
                None
            }
            KeyCode::Char('G') => {
                self.scroll = None;
                None
            }
            KeyCode::Char('c') => Some(Action::ClearLogs),
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        if let Action::LogsUpdated(logs) = action {
            self.logs = Arc::clone(logs);
            // A pinned view follows the new tail; a scrolled-back view
            // keeps its position (clamped on render).
            if let Some(offset) = self.scroll {
                self.scroll = Some(offset.min(self.max_scroll()));
            }
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let title = format!(" Logs ({}) ", self.logs.len());
        let block = Block::default()
            .title(title)
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::vertical([
            Constraint::Min(1),    // feed
            Constraint::Length(1), // hints
        ])
        .split(inner);

        let height = chunks[0].height as usize;
        self.viewport.set(height);

        let lines: Vec<Line> = if self.logs.is_empty() {
            vec![Line::from(Span::styled(
                "  No log entries yet",
                Style::default().fg(theme::FG_MUTED),
            ))]
        } else {
            self.logs.iter().map(Self::log_line).collect()
        };

        let max = lines.len().saturating_sub(height);
        let offset = match self.scroll {
            None => max,
            Some(n) => n.min(max),
        };

        let feed = Paragraph::new(lines).scroll((offset as u16, 0));
        frame.render_widget(feed, chunks[0]);

        let mut hints = vec![
            Span::styled(" j/k ", theme::key_hint_key()),
            Span::styled("scroll  ", theme::key_hint()),
            Span::styled("g/G ", theme::key_hint_key()),
            Span::styled("top/bottom  ", theme::key_hint()),
            Span::styled("c ", theme::key_hint_key()),
            Span::styled("clear", theme::key_hint()),
        ];
        if self.scroll.is_some() {
            hints.push(Span::styled(
                "   ── scrolled back, G to follow ──",
                Style::default().fg(theme::WARN_AMBER),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(hints)), chunks[1]);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}
