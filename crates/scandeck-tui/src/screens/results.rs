//! Results screen — sortable, filterable, paginated endpoint table.

use color_eyre::eyre::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table};
use tui_input::Input;
use tui_input::backend::crossterm::EventHandler;

use scandeck_core::{EndpointResult, PagerItem, ResultsStore, SortField, SortOrder, TableView};

use crate::action::{Action, Notification};
use crate::component::Component;
use crate::theme;
use crate::widgets::fmt;

pub struct ResultsScreen {
    focused: bool,
    store: ResultsStore,
    /// Row cursor within the current page.
    cursor: usize,
    search: Input,
    /// When true, printable keys go to the search box.
    searching: bool,
}

impl ResultsScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            store: ResultsStore::new(),
            cursor: 0,
            search: Input::default(),
            searching: false,
        }
    }

    fn page_len(&self) -> usize {
        self.store.page_rows().len()
    }

    fn clamp_cursor(&mut self) {
        let len = self.page_len();
        if len == 0 {
            self.cursor = 0;
        } else if self.cursor >= len {
            self.cursor = len - 1;
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.page_len();
        if len == 0 {
            return;
        }
        let next = (self.cursor as isize + delta).clamp(0, len as isize - 1);
        self.cursor = next as usize;
    }

    fn cursor_domain(&self) -> Option<String> {
        self.store.page_rows().get(self.cursor).map(|r| r.domain.clone())
    }

    /// Cycle the sort column forward through the column list.
    fn next_sort_field(&self) -> SortField {
        let (current, _) = self.store.sort();
        let idx = SortField::ALL
            .iter()
            .position(|f| *f == current)
            .unwrap_or(0);
        SortField::ALL[(idx + 1) % SortField::ALL.len()]
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Esc => {
                self.searching = false;
                self.search.reset();
                self.store.set_filter("");
                self.cursor = 0;
            }
            KeyCode::Enter => {
                self.searching = false;
            }
            _ => {
                self.search.handle_event(&Event::Key(key));
                self.store.set_filter(self.search.value());
                self.cursor = 0;
            }
        }
        None
    }

    fn render_search_line(&self, frame: &mut Frame, area: Rect) {
        let query = self.search.value();
        let (label_style, value) = if self.searching {
            (
                Style::default().fg(theme::ACCENT_VIOLET).add_modifier(Modifier::BOLD),
                format!("{query}▏"),
            )
        } else if query.is_empty() {
            (Style::default().fg(theme::FG_MUTED), "press / to search".into())
        } else {
            (Style::default().fg(theme::FG_DIM), query.to_string())
        };

        let line = Line::from(vec![
            Span::styled(" Search: ", label_style),
            Span::styled(value, Style::default().fg(theme::ACCENT_BLUE)),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_table(&self, frame: &mut Frame, area: Rect, view: &TableView) {
        if view.no_results {
            let placeholder = Paragraph::new(Line::from(Span::styled(
                "  No results found",
                Style::default().fg(theme::FG_MUTED),
            )));
            frame.render_widget(placeholder, area);
            return;
        }

        let (sort_field, sort_order) = view.sort;
        let arrow = match sort_order {
            SortOrder::Asc => "↑",
            SortOrder::Desc => "↓",
        };
        let header_cell = |field: SortField| {
            if field == sort_field {
                Cell::from(format!("{field} {arrow}")).style(
                    theme::table_header().add_modifier(Modifier::REVERSED),
                )
            } else {
                Cell::from(field.to_string()).style(theme::table_header())
            }
        };

        let mut header_cells = vec![Cell::from(" ").style(theme::table_header())];
        header_cells.extend(SortField::ALL.into_iter().map(header_cell));
        header_cells.push(Cell::from("RX Mbps").style(theme::table_header()));
        header_cells.push(Cell::from("TX Mbps").style(theme::table_header()));
        let header = Row::new(header_cells);

        let rows: Vec<Row> = view
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let at_cursor = i == self.cursor;
                let marker = if row.selected { "✓" } else { " " };
                let prefix = if at_cursor { "▸" } else { " " };

                let row_style = if at_cursor {
                    theme::table_highlight()
                } else {
                    theme::table_row()
                };

                Row::new(vec![
                    Cell::from(format!("{prefix}{marker}"))
                        .style(Style::default().fg(theme::OK_GREEN)),
                    Cell::from(fmt::sanitize(&row.domain)),
                    Cell::from(fmt::fmt_latency(row.latency_ms))
                        .style(theme::latency_style(row.latency_class)),
                    Cell::from(row.ip.clone()),
                    Cell::from(fmt::sanitize(&row.country)),
                    Cell::from(fmt::sanitize(&row.city)),
                    Cell::from(fmt::fmt_speed(row.rx_speed_mbps)),
                    Cell::from(fmt::fmt_speed(row.tx_speed_mbps)),
                ])
                .style(row_style)
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(3),
                Constraint::Min(20),
                Constraint::Length(10),
                Constraint::Length(16),
                Constraint::Length(14),
                Constraint::Length(14),
                Constraint::Length(8),
                Constraint::Length(8),
            ],
        )
        .header(header)
        .column_spacing(1);

        frame.render_widget(table, area);
    }

    fn render_pager_line(&self, frame: &mut Frame, area: Rect, view: &TableView) {
        let mut spans = Vec::new();

        let prev_style = if view.prev_enabled {
            Style::default().fg(theme::ACCENT_BLUE)
        } else {
            Style::default().fg(theme::FG_MUTED)
        };
        let next_style = if view.next_enabled {
            Style::default().fg(theme::ACCENT_BLUE)
        } else {
            Style::default().fg(theme::FG_MUTED)
        };

        spans.push(Span::styled(" ◂ Prev ", prev_style));
        for item in &view.pager {
            match item {
                PagerItem::Page { number, current } => {
                    if *current {
                        spans.push(Span::styled(
                            format!("[{number}]"),
                            Style::default()
                                .fg(theme::ACCENT_VIOLET)
                                .add_modifier(Modifier::BOLD),
                        ));
                    } else {
                        spans.push(Span::styled(
                            format!(" {number} "),
                            Style::default().fg(theme::FG_DIM),
                        ));
                    }
                }
                PagerItem::Ellipsis => {
                    spans.push(Span::styled(" … ", Style::default().fg(theme::FG_MUTED)));
                }
            }
        }
        spans.push(Span::styled(" Next ▸", next_style));

        spans.push(Span::styled(
            format!(
                "   {} of {} shown · {} of {} selected in view",
                view.filtered_count, view.total_count, view.selected_in_view, view.selected_count
            ),
            Style::default().fg(theme::FG_MUTED),
        ));

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

impl Component for ResultsScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.searching {
            return Ok(self.handle_search_key(key));
        }

        let action = match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_cursor(1);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_cursor(-1);
                None
            }
            KeyCode::Char('h') | KeyCode::Left => {
                self.store.prev_page();
                self.clamp_cursor();
                None
            }
            KeyCode::Char('l') | KeyCode::Right => {
                self.store.next_page();
                self.clamp_cursor();
                None
            }
            KeyCode::Char('g') => {
                self.store.set_page(1);
                self.cursor = 0;
                None
            }
            KeyCode::Char('G') => {
                self.store.set_page(self.store.page_count());
                self.clamp_cursor();
                None
            }
            KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.move_cursor(10);
                None
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.move_cursor(-10);
                None
            }
            KeyCode::Char('/') => {
                self.searching = true;
                None
            }
            KeyCode::Char(' ') => {
                if let Some(domain) = self.cursor_domain() {
                    self.store.toggle_selected(&domain);
                }
                None
            }
            KeyCode::Char('a') => {
                self.store.toggle_page_selection();
                None
            }
            KeyCode::Char('A') => {
                self.store.toggle_global_selection();
                None
            }
            KeyCode::Char('o') => Some(Action::SortColumn(self.next_sort_field())),
            KeyCode::Char('O') => {
                let (current, _) = self.store.sort();
                Some(Action::SortColumn(current))
            }
            KeyCode::Char('v') => {
                let domains = self.store.selected_domains();
                if domains.is_empty() {
                    Some(Action::Notify(Notification::info(
                        "No endpoints selected for speedtest",
                    )))
                } else {
                    Some(Action::RunSpeedtest(domains))
                }
            }
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::ResultsUpdated(results) => {
                let snapshot: Vec<EndpointResult> = results.iter().cloned().collect();
                self.store.replace_all(snapshot);
                self.search.reset();
                self.cursor = 0;
            }
            Action::SortColumn(field) => {
                self.store.sort_by_column(*field);
                self.cursor = 0;
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let view = self.store.view();

        let title = format!(" Results ({}/{}) ", view.filtered_count, view.total_count);
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
            Constraint::Length(1), // search line
            Constraint::Min(1),    // table
            Constraint::Length(1), // pager
            Constraint::Length(1), // hints
        ])
        .split(inner);

        self.render_search_line(frame, chunks[0]);
        self.render_table(frame, chunks[1], &view);
        self.render_pager_line(frame, chunks[2], &view);

        let hints = Line::from(vec![
            Span::styled(" space ", theme::key_hint_key()),
            Span::styled("select  ", theme::key_hint()),
            Span::styled("a/A ", theme::key_hint_key()),
            Span::styled("page/all  ", theme::key_hint()),
            Span::styled("o/O ", theme::key_hint_key()),
            Span::styled("sort  ", theme::key_hint()),
            Span::styled("h/l ", theme::key_hint_key()),
            Span::styled("page  ", theme::key_hint()),
            Span::styled("/ ", theme::key_hint_key()),
            Span::styled("search  ", theme::key_hint()),
            Span::styled("v ", theme::key_hint_key()),
            Span::styled(
                format!("speedtest ({})", view.selected_in_view),
                theme::key_hint(),
            ),
        ]);
        frame.render_widget(Paragraph::new(hints), chunks[3]);
    }

    fn wants_text_input(&self) -> bool {
        self.searching
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}
