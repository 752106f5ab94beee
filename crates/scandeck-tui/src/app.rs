//! Application core — event loop, screen management, action dispatch.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Gauge, Paragraph, Tabs},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use scandeck_core::{Monitor, ScanParams, ScanStatus};

use crate::action::{Action, Notification, NotificationLevel};
use crate::component::Component;
use crate::data_bridge;
use crate::event::{Event, EventReader};
use crate::screen::ScreenId;
use crate::screens::{LogsScreen, ResultsScreen};
use crate::theme;
use crate::tui::Tui;
use crate::widgets::status_indicator::{self, ScanState};

/// How long a toast stays visible.
const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

/// Top-level application state and event loop.
pub struct App {
    active_screen: ScreenId,
    screens: HashMap<ScreenId, Box<dyn Component>>,
    running: bool,
    monitor: Monitor,
    /// Parameters used when the user starts a scan.
    scan_params: ScanParams,
    /// Latest scan status from the monitor.
    status: ScanStatus,
    /// A start request is in flight and not yet reflected in status.
    start_pending: bool,
    /// A stop request is in flight and not yet reflected in status.
    stop_pending: bool,
    help_visible: bool,
    /// Active notification toast with display timestamp.
    notification: Option<(Notification, Instant)>,
    throbber_state: throbber_widgets_tui::ThrobberState,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
}

impl App {
    pub fn new(monitor: Monitor, scan_params: ScanParams) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        let mut screens: HashMap<ScreenId, Box<dyn Component>> = HashMap::new();
        screens.insert(ScreenId::Results, Box::new(ResultsScreen::new()));
        screens.insert(ScreenId::Logs, Box::new(LogsScreen::new()));

        Self {
            active_screen: ScreenId::Results,
            screens,
            running: true,
            monitor,
            scan_params,
            status: ScanStatus::default(),
            start_pending: false,
            stop_pending: false,
            help_visible: false,
            notification: None,
            throbber_state: throbber_widgets_tui::ThrobberState::default(),
            action_tx,
            action_rx,
        }
    }

    fn init_screens(&mut self) -> Result<()> {
        for screen in self.screens.values_mut() {
            screen.init(self.action_tx.clone())?;
        }
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(true);
        }
        Ok(())
    }

    /// Run the main event loop.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;
        self.init_screens()?;

        // Data bridge feeds monitor state into the action channel.
        let bridge_cancel = CancellationToken::new();
        {
            let monitor = self.monitor.clone();
            let tx = self.action_tx.clone();
            let cancel = bridge_cancel.clone();
            tokio::spawn(async move {
                data_bridge::run_data_bridge(monitor, tx, cancel).await;
            });
        }

        let mut events = EventReader::new(
            Duration::from_millis(250), // 4 Hz tick
            Duration::from_millis(33),  // ~30 FPS render
        );

        info!("TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => {
                    self.action_tx.send(Action::Resize(w, h))?;
                }
                Event::Tick => {
                    self.action_tx.send(Action::Tick)?;
                }
                Event::Render => {
                    self.action_tx.send(Action::Render)?;
                }
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        events.stop();
        bridge_cancel.cancel();
        self.monitor.shutdown().await;
        info!("TUI event loop ended");
        Ok(())
    }

    /// Map a key event to an action. Global keys are handled here;
    /// everything else is delegated to the active screen component.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        // A screen capturing text input gets every key except Ctrl-C.
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            if screen.wants_text_input() {
                if key.modifiers.contains(KeyModifiers::CONTROL)
                    && key.code == KeyCode::Char('c')
                {
                    return Ok(Some(Action::Quit));
                }
                return screen.handle_key_event(key);
            }
        }

        if self.help_visible {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    Ok(Some(Action::ToggleHelp))
                }
                _ => Ok(None),
            };
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c')) => return Ok(Some(Action::Quit)),
            (KeyModifiers::NONE, KeyCode::Char('q')) => return Ok(Some(Action::Quit)),

            (_, KeyCode::Char('?')) => return Ok(Some(Action::ToggleHelp)),

            // Scan controls are global across screens
            (KeyModifiers::NONE, KeyCode::Char('s')) => return Ok(Some(Action::StartScan)),
            (KeyModifiers::NONE, KeyCode::Char('x')) => return Ok(Some(Action::StopScan)),
            (KeyModifiers::NONE, KeyCode::Char('r')) => {
                return Ok(Some(Action::RefreshResults));
            }

            // Screen navigation via number keys
            (KeyModifiers::NONE, KeyCode::Char(c @ '1'..='2')) => {
                let n = c as u8 - b'0';
                if let Some(screen) = ScreenId::from_number(n) {
                    return Ok(Some(Action::SwitchScreen(screen)));
                }
            }
            (KeyModifiers::NONE, KeyCode::Tab) => {
                return Ok(Some(Action::SwitchScreen(self.active_screen.next())));
            }

            _ => {}
        }

        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            return screen.handle_key_event(key);
        }

        Ok(None)
    }

    /// Process a single action — update app state and propagate to screens.
    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => {
                self.running = false;
            }

            Action::Tick => {
                if self.status.active {
                    self.throbber_state.calc_next();
                }
                // Auto-dismiss notifications
                if let Some((_, created)) = &self.notification {
                    if created.elapsed() >= NOTIFICATION_TTL {
                        self.notification = None;
                    }
                }
            }

            Action::Resize(w, h) => {
                debug!("terminal resized to {w}x{h}");
            }

            Action::SwitchScreen(target) => {
                if *target != self.active_screen {
                    debug!("switching screen: {} → {}", self.active_screen, target);
                    if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                        screen.set_focused(false);
                    }
                    self.active_screen = *target;
                    if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                        screen.set_focused(true);
                    }
                }
            }

            Action::ToggleHelp => {
                self.help_visible = !self.help_visible;
            }

            // ── Data updates go to ALL screens so they stay in sync ──
            Action::StatusUpdated(status) => {
                if status.active {
                    self.start_pending = false;
                }
                if !status.active || status.stopping {
                    self.stop_pending = false;
                }
                self.status = status.clone();
                self.broadcast(action)?;
            }

            Action::ResultsUpdated(_) | Action::LogsUpdated(_) => {
                self.broadcast(action)?;
            }

            // ── Scan control pipeline ────────────────────────────────
            Action::StartScan => {
                if self.status.active || self.start_pending {
                    self.notify(Notification::info("Scan already running"));
                } else {
                    self.start_pending = true;
                    let monitor = self.monitor.clone();
                    let params = self.scan_params.clone();
                    let tx = self.action_tx.clone();
                    tokio::spawn(async move {
                        match monitor.start_scan(&params).await {
                            Ok(()) => {
                                let _ = tx.send(Action::Notify(Notification::success(
                                    "Scan started",
                                )));
                            }
                            Err(e) => {
                                warn!(error = %e, "start scan failed");
                                let _ = tx.send(Action::ScanRejected(e.toast_message()));
                            }
                        }
                    });
                }
            }

            Action::ScanRejected(message) => {
                self.start_pending = false;
                self.notify(Notification::error(message.clone()));
            }

            Action::StopScan => {
                if !self.status.active {
                    self.notify(Notification::info("No scan running"));
                } else if !self.stop_pending {
                    self.stop_pending = true;
                    let monitor = self.monitor.clone();
                    let tx = self.action_tx.clone();
                    tokio::spawn(async move {
                        match monitor.stop_scan().await {
                            Ok(()) => {
                                let _ = tx.send(Action::Notify(Notification::info(
                                    "Stopping scan…",
                                )));
                            }
                            Err(e) => {
                                warn!(error = %e, "stop scan failed");
                                let _ = tx.send(Action::StopRejected(e.toast_message()));
                            }
                        }
                    });
                }
            }

            Action::StopRejected(message) => {
                self.stop_pending = false;
                self.notify(Notification::error(message.clone()));
            }

            Action::RefreshResults => {
                let monitor = self.monitor.clone();
                let tx = self.action_tx.clone();
                tokio::spawn(async move {
                    match monitor.refresh_results().await {
                        Ok(()) => {
                            let _ = tx.send(Action::Notify(Notification::success(
                                "Results refreshed",
                            )));
                        }
                        Err(e) => {
                            warn!(error = %e, "refresh results failed");
                            let _ = tx.send(Action::Notify(Notification::error(
                                e.toast_message(),
                            )));
                        }
                    }
                });
            }

            Action::RunSpeedtest(domains) => {
                let monitor = self.monitor.clone();
                let domains = domains.clone();
                let tx = self.action_tx.clone();
                tokio::spawn(async move {
                    let count = domains.len();
                    match monitor.run_speedtest(&domains).await {
                        Ok(()) => {
                            let _ = tx.send(Action::Notify(Notification::success(format!(
                                "Speedtest started for {count} endpoint{}",
                                if count == 1 { "" } else { "s" }
                            ))));
                        }
                        Err(e) => {
                            warn!(error = %e, "speedtest failed");
                            let _ = tx.send(Action::SpeedtestRejected(e.toast_message()));
                        }
                    }
                });
            }

            Action::SpeedtestRejected(message) => {
                self.notify(Notification::error(message.clone()));
            }

            Action::ClearLogs => {
                let monitor = self.monitor.clone();
                let tx = self.action_tx.clone();
                tokio::spawn(async move {
                    if let Err(e) = monitor.clear_logs().await {
                        warn!(error = %e, "clear logs failed");
                        let _ = tx.send(Action::ClearLogsRejected(e.toast_message()));
                    }
                });
            }

            Action::ClearLogsRejected(message) => {
                self.notify(Notification::error(message.clone()));
            }

            Action::Notify(n) => {
                self.notification = Some((n.clone(), Instant::now()));
            }

            // Render is handled in the main loop, not here
            Action::Render => {}

            // Everything else goes to the active screen only
            other => {
                if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                    if let Some(follow_up) = screen.update(other)? {
                        self.action_tx.send(follow_up)?;
                    }
                }
            }
        }

        Ok(())
    }

    fn broadcast(&mut self, action: &Action) -> Result<()> {
        for screen in self.screens.values_mut() {
            if let Some(follow_up) = screen.update(action)? {
                self.action_tx.send(follow_up)?;
            }
        }
        Ok(())
    }

    fn notify(&mut self, n: Notification) {
        self.notification = Some((n, Instant::now()));
    }

    // ── Rendering ─────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let layout = Layout::vertical([
            Constraint::Length(4), // header with scan status
            Constraint::Min(1),    // screen content
            Constraint::Length(1), // tab bar
            Constraint::Length(1), // status bar
        ])
        .split(area);

        self.render_header(frame, layout[0]);

        if let Some(screen) = self.screens.get(&self.active_screen) {
            screen.render(frame, layout[1]);
        }

        self.render_tab_bar(frame, layout[2]);
        self.render_status_bar(frame, layout[3]);

        if self.help_visible {
            self.render_help_overlay(frame, area);
        }

        if let Some((ref notif, _)) = self.notification {
            self.render_notification(frame, area, notif);
        }
    }

    /// Header: scan state indicator plus a progress gauge while scanning.
    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" scandeck ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks =
            Layout::horizontal([Constraint::Length(24), Constraint::Min(10)]).split(inner);

        let state = ScanState::derive(&self.status, self.stop_pending);
        let state_line = Line::from(vec![
            Span::raw(" "),
            status_indicator::state_span(state),
            Span::styled(
                format!(" {}", state.label()),
                Style::default().fg(theme::FG_DIM),
            ),
        ]);
        frame.render_widget(Paragraph::new(state_line), chunks[0]);

        if self.status.active {
            let progress = &self.status.progress;
            let percent = progress.percent();
            let label = format!("{}/{} ({percent}%)", progress.done, progress.total);
            let gauge = Gauge::default()
                .gauge_style(Style::default().fg(theme::ACCENT_BLUE).bg(theme::BG_HIGHLIGHT))
                .ratio(f64::from(percent) / 100.0)
                .label(label);
            frame.render_widget(gauge, chunks[1]);

            let throbber = throbber_widgets_tui::Throbber::default()
                .throbber_style(Style::default().fg(theme::WARN_AMBER));
            let throbber_area = Rect::new(chunks[0].x + 20, chunks[0].y, 2, 1);
            frame.render_stateful_widget(
                throbber,
                throbber_area,
                &mut self.throbber_state.clone(),
            );
        } else if let Some(ref message) = self.status.error {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    format!("last error: {message}"),
                    Style::default().fg(theme::ERR_RED),
                )),
                chunks[1],
            );
        }
    }

    fn render_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = ScreenId::ALL
            .iter()
            .map(|&id| {
                let style = if id == self.active_screen {
                    theme::tab_active()
                } else {
                    theme::tab_inactive()
                };
                Line::from(Span::styled(
                    format!(" {} {} ", id.number(), id.label()),
                    style,
                ))
            })
            .collect();

        let tabs = Tabs::new(titles)
            .divider(Span::styled(" ", theme::key_hint()))
            .select(
                ScreenId::ALL
                    .iter()
                    .position(|&s| s == self.active_screen)
                    .unwrap_or(0),
            );

        frame.render_widget(tabs, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let state = ScanState::derive(&self.status, self.stop_pending);
        let line = Line::from(vec![
            Span::raw(" "),
            status_indicator::state_span(state),
            Span::styled(
                format!(" {}", state.label()),
                Style::default().fg(theme::FG_DIM),
            ),
            Span::styled(
                " │ s start  x stop  r refresh  Tab screens  ? help  q quit",
                theme::key_hint(),
            ),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_help_overlay(&self, frame: &mut Frame, area: Rect) {
        let help_width = 56u16.min(area.width.saturating_sub(4));
        let help_height = 20u16.min(area.height.saturating_sub(4));

        let x = (area.width.saturating_sub(help_width)) / 2;
        let y = (area.height.saturating_sub(help_height)) / 2;
        let help_area = Rect::new(area.x + x, area.y + y, help_width, help_height);

        frame.render_widget(
            Block::default().style(Style::default().bg(theme::BG_DARK)),
            help_area,
        );

        let block = Block::default()
            .title(" Keyboard Shortcuts ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());

        let inner = block.inner(help_area);
        frame.render_widget(block, help_area);

        let entry = |keys: &str, desc: &str| {
            Line::from(vec![
                Span::styled(format!("  {keys:<12}"), theme::key_hint_key()),
                Span::styled(desc.to_string(), theme::key_hint()),
            ])
        };

        let help_text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "  Global",
                Style::default().fg(theme::ACCENT_BLUE),
            )),
            entry("1-2, Tab", "Switch screen"),
            entry("s / x", "Start / stop scan"),
            entry("r", "Refresh results"),
            entry("q, Ctrl-c", "Quit"),
            Line::from(""),
            Line::from(Span::styled(
                "  Results",
                Style::default().fg(theme::ACCENT_BLUE),
            )),
            entry("j/k", "Move row cursor"),
            entry("h/l, g/G", "Previous/next, first/last page"),
            entry("space, a, A", "Select row, page, all matches"),
            entry("o / O", "Cycle sort column / flip order"),
            entry("/", "Filter by domain, country, city"),
            entry("v", "Speedtest selected endpoints"),
            Line::from(""),
            Line::from(Span::styled(
                "  Logs",
                Style::default().fg(theme::ACCENT_BLUE),
            )),
            entry("j/k, g/G", "Scroll, jump to top/bottom"),
            entry("c", "Clear logs"),
        ];

        frame.render_widget(Paragraph::new(help_text), inner);
    }

    /// Toast in the bottom-right corner, above the status bar.
    #[allow(clippy::unused_self)]
    fn render_notification(&self, frame: &mut Frame, area: Rect, notif: &Notification) {
        let msg_len = notif.message.len() as u16;
        let width = (msg_len + 6).clamp(20, 60);
        let height = 3u16;

        let x = area.width.saturating_sub(width + 1);
        let y = area.height.saturating_sub(height + 2);
        let toast_area = Rect::new(area.x + x, area.y + y, width, height);

        let (border_color, icon) = match notif.level {
            NotificationLevel::Success => (theme::OK_GREEN, "✓"),
            NotificationLevel::Error => (theme::ERR_RED, "✗"),
            NotificationLevel::Info => (theme::ACCENT_BLUE, "·"),
        };

        frame.render_widget(
            Block::default().style(Style::default().bg(theme::BG_DARK)),
            toast_area,
        );

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border_color));

        let inner = block.inner(toast_area);
        frame.render_widget(block, toast_area);

        let line = Line::from(vec![
            Span::styled(format!(" {icon} "), Style::default().fg(border_color)),
            Span::styled(&notif.message, Style::default().fg(theme::FG_DIM)),
        ]);
        frame.render_widget(Paragraph::new(line), inner);
    }
}
