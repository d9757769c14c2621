//! Overview module — the "at a glance" health summary.
//!
//! Fetches the aggregated SAP system health and shows the global
//! counters plus one row per SID with a status icon for the SAP
//! instances, the database, the pacemaker clusters and the hosts.

use crate::sap::health::{self, SystemHealth};
use crate::sap::{ApiResult, Client};
use crate::types::{FlashMessage, HealthStatus};
use crate::ui::theme::Theme;
use crate::ui::widgets;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};
use std::sync::mpsc;

pub struct HomeState {
    pub rows: Vec<SystemHealth>,
    pub selected: usize,
    pub loading: bool,
    pub loaded: bool,
    pub load_error: Option<String>,
    load_rx: Option<mpsc::Receiver<ApiResult<Vec<SystemHealth>>>>,
    pub flash_message: Option<FlashMessage>,
}

impl HomeState {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            selected: 0,
            loading: false,
            loaded: false,
            load_error: None,
            load_rx: None,
            flash_message: None,
        }
    }

    /// Kick off the first fetch when the tab is entered (non-blocking).
    pub fn ensure_loaded(&mut self, client: &Client) {
        if self.loaded || self.loading {
            return;
        }
        self.reload(client);
    }

    pub fn reload(&mut self, client: &Client) {
        self.loading = true;
        let (tx, rx) = mpsc::channel();
        self.load_rx = Some(rx);
        let client = client.clone();

        std::thread::spawn(move || {
            let _ = tx.send(health::fetch_summary(&client));
        });
    }

    /// Drain the background fetch. A failed fetch falls back to an empty
    /// summary with an error flash.
    pub fn poll(&mut self) {
        if let Some(rx) = &self.load_rx {
            match rx.try_recv() {
                Ok(Ok(rows)) => {
                    self.rows = rows;
                    self.load_error = None;
                    self.loading = false;
                    self.loaded = true;
                    self.load_rx = None;
                    if self.selected >= self.rows.len() {
                        self.selected = self.rows.len().saturating_sub(1);
                    }
                }
                Ok(Err(e)) => {
                    self.rows = Vec::new();
                    self.load_error = Some(e.to_string());
                    self.loading = false;
                    self.loaded = true;
                    self.load_rx = None;
                    self.flash_message = Some(FlashMessage::new(e.to_string(), true));
                }
                Err(mpsc::TryRecvError::Empty) => {}
                Err(mpsc::TryRecvError::Disconnected) => {
                    self.loading = false;
                    self.loaded = true;
                    self.load_rx = None;
                }
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, client: &Client) -> Result<bool> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if !self.rows.is_empty() {
                    self.selected = (self.selected + 1).min(self.rows.len() - 1);
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Char('g') => self.selected = 0,
            KeyCode::Char('G') => {
                if !self.rows.is_empty() {
                    self.selected = self.rows.len() - 1;
                }
            }
            KeyCode::Char('r') => self.reload(client),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

pub fn render(frame: &mut Frame, state: &HomeState, theme: &Theme, area: Rect) {
    let block = Block::default()
        .style(theme.block_style())
        .title(" At a glance ")
        .title_style(theme.title())
        .borders(Borders::ALL)
        .border_style(theme.border_focused());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height < 5 || inner.width < 40 {
        return;
    }

    if state.loading {
        widgets::render_loading(frame, "Loading...", theme, inner);
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Length(2), // global counters
        Constraint::Min(3),    // per-SID table
    ])
    .split(inner);

    render_counters(frame, state, theme, chunks[0]);
    render_summary_table(frame, state, theme, chunks[1]);

    if let Some(msg) = &state.flash_message {
        widgets::render_flash_message(frame, &msg.text, msg.is_error, theme, inner);
    }
}

fn render_counters(frame: &mut Frame, state: &HomeState, theme: &Theme, area: Rect) {
    let counters = health::summarize(&state.rows);

    let line = Line::from(vec![
        Span::styled(" Global health   ", theme.text_dim()),
        widgets::counter_span(HealthStatus::Passing, counters.passing, theme),
        Span::raw("   "),
        widgets::counter_span(HealthStatus::Warning, counters.warning, theme),
        Span::raw("   "),
        widgets::counter_span(HealthStatus::Critical, counters.critical, theme),
        Span::raw("   "),
        widgets::counter_span(HealthStatus::Unknown, counters.unknown, theme),
    ]);
    frame.render_widget(Paragraph::new(line).style(theme.block_style()), area);
}

fn render_summary_table(frame: &mut Frame, state: &HomeState, theme: &Theme, area: Rect) {
    if state.rows.is_empty() {
        let text = if state.load_error.is_some() {
            "No data — the health summary could not be loaded"
        } else {
            "No SAP systems discovered yet"
        };
        frame.render_widget(Paragraph::new(text).style(theme.text_dim()), area);
        return;
    }

    let header = Row::new(vec![
        Cell::from(" SID").style(theme.title()),
        Cell::from("SAP INSTANCES").style(theme.title()),
        Cell::from("DATABASE").style(theme.title()),
        Cell::from("PACEMAKER CLUSTERS").style(theme.title()),
        Cell::from("HOSTS").style(theme.title()),
    ])
    .style(theme.block_style());

    let rows: Vec<Row> = state
        .rows
        .iter()
        .enumerate()
        .map(|(i, system)| {
            let row_style = if i == state.selected {
                theme.selected()
            } else {
                theme.text()
            };
            let cell = |status: HealthStatus| {
                Cell::from(Line::from(widgets::status_span(status, theme)))
            };

            // systems not fully discovered yet may come without a SID
            let sid = if system.sid.is_empty() {
                system.id.as_str()
            } else {
                system.sid.as_str()
            };

            Row::new(vec![
                Cell::from(format!(" {}", sid)),
                cell(system.sapsystem_health),
                cell(system.database_health),
                cell(system.clusters_health),
                cell(system.hosts_health),
            ])
            .style(row_style)
        })
        .collect();

    let widths = [
        Constraint::Length(8),
        Constraint::Percentage(25),
        Constraint::Percentage(25),
        Constraint::Percentage(25),
        Constraint::Percentage(25),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .style(theme.block_style());
    frame.render_widget(table, area);
}
