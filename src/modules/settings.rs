//! Cluster check-settings editor.
//!
//! Two sub-tabs: connection settings (one connection user per host) and
//! the check selection (catalog groups with group-level and per-check
//! toggles). Saving posts the whole selection plus the connection users
//! back to the server.

use crate::sap::checks::{
    self, CatalogEntry, CheckSettings, SettingsPayload,
};
use crate::sap::{ApiError, ApiResult, Client};
use crate::types::{self, FlashMessage};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, List, ListItem, Paragraph, Row, Table, Tabs},
    Frame,
};
use std::collections::{HashMap, HashSet};
use std::sync::mpsc;

use crate::ui::theme::Theme;
use crate::ui::widgets;

// ── Sub-tabs ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettingsSubTab {
    #[default]
    Connection,
    Selection,
}

impl SettingsSubTab {
    pub fn next(&self) -> Self {
        match self {
            SettingsSubTab::Connection => SettingsSubTab::Selection,
            SettingsSubTab::Selection => SettingsSubTab::Connection,
        }
    }
}

/// One navigable row of the selection sub-tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SelectionRow {
    Group(usize),
    Check(usize, usize),
}

/// Result of the combined catalog + settings fetch. A failed settings
/// fetch degrades to empty settings (the catalog is still usable); a
/// failed catalog fetch fails the whole load.
struct LoadOutcome {
    catalog: Vec<CatalogEntry>,
    settings: CheckSettings,
    settings_error: Option<String>,
}

pub struct SettingsState {
    pub cluster_id: Option<String>,
    pub cluster_name: String,

    pub catalog: Vec<CatalogEntry>,
    pub selected_checks: Vec<String>,
    /// (hostname, connection user), one entry per cluster host
    pub connections: Vec<(String, String)>,

    pub sub_tab: SettingsSubTab,
    pub cursor: usize,
    pub collapsed: HashSet<String>,
    pub editing: bool,
    pub edit_buffer: String,

    pub loading: bool,
    pub saving: bool,
    pub loaded: bool,
    pub load_error: Option<String>,
    load_rx: Option<mpsc::Receiver<ApiResult<LoadOutcome>>>,
    save_rx: Option<mpsc::Receiver<ApiResult<()>>>,

    pub flash_message: Option<FlashMessage>,
}

impl SettingsState {
    pub fn new() -> Self {
        Self {
            cluster_id: None,
            cluster_name: String::new(),
            catalog: Vec::new(),
            selected_checks: Vec::new(),
            connections: Vec::new(),
            sub_tab: SettingsSubTab::Connection,
            cursor: 0,
            collapsed: HashSet::new(),
            editing: false,
            edit_buffer: String::new(),
            loading: false,
            saving: false,
            loaded: false,
            load_error: None,
            load_rx: None,
            save_rx: None,
            flash_message: None,
        }
    }

    /// Bind the editor to a cluster and fetch catalog + stored settings.
    pub fn open(&mut self, client: &Client, cluster_id: String, cluster_name: String) {
        self.cluster_id = Some(cluster_id.clone());
        self.cluster_name = cluster_name;
        self.catalog = Vec::new();
        self.selected_checks = Vec::new();
        self.connections = Vec::new();
        self.sub_tab = SettingsSubTab::Connection;
        self.cursor = 0;
        self.collapsed.clear();
        self.editing = false;
        self.loaded = false;
        self.load_error = None;
        self.loading = true;

        let (tx, rx) = mpsc::channel();
        self.load_rx = Some(rx);
        let client = client.clone();

        std::thread::spawn(move || {
            let outcome = checks::fetch_catalog(&client).map(|catalog| {
                match checks::fetch_settings(&client, &cluster_id) {
                    Ok(settings) => LoadOutcome {
                        catalog,
                        settings,
                        settings_error: None,
                    },
                    Err(e) => LoadOutcome {
                        catalog,
                        settings: CheckSettings::default(),
                        settings_error: Some(e.to_string()),
                    },
                }
            });
            let _ = tx.send(outcome);
        });
    }

    pub fn poll(&mut self) {
        if let Some(rx) = &self.load_rx {
            match rx.try_recv() {
                Ok(Ok(outcome)) => {
                    self.catalog = outcome.catalog;
                    self.selected_checks = outcome.settings.selected_checks;
                    self.connections = checks::merge_connection_settings(
                        &outcome.settings.hostnames,
                        &outcome.settings.connection_settings,
                    );
                    self.load_error = outcome.settings_error.clone();
                    if let Some(e) = outcome.settings_error {
                        self.flash_message = Some(FlashMessage::new(e, true));
                    }
                    self.loading = false;
                    self.loaded = true;
                    self.load_rx = None;
                }
                Ok(Err(e)) => {
                    self.load_error = Some(e.to_string());
                    self.loading = false;
                    self.loaded = true;
                    self.load_rx = None;
                    self.flash_message = Some(FlashMessage::new(e.to_string(), true));
                }
                Err(mpsc::TryRecvError::Empty) => {}
                Err(mpsc::TryRecvError::Disconnected) => {
                    self.loading = false;
                    self.load_rx = None;
                }
            }
        }

        if let Some(rx) = &self.save_rx {
            match rx.try_recv() {
                Ok(Ok(())) => {
                    self.saving = false;
                    self.save_rx = None;
                    self.flash_message =
                        Some(FlashMessage::new("Settings saved".to_string(), false));
                }
                Ok(Err(e)) => {
                    self.saving = false;
                    self.save_rx = None;
                    self.flash_message = Some(FlashMessage::new(save_error_text(&e), true));
                }
                Err(mpsc::TryRecvError::Empty) => {}
                Err(mpsc::TryRecvError::Disconnected) => {
                    self.saving = false;
                    self.save_rx = None;
                }
            }
        }
    }

    fn selection_rows(&self) -> Vec<SelectionRow> {
        let mut rows = Vec::new();
        for (gi, entry) in self.catalog.iter().enumerate() {
            rows.push(SelectionRow::Group(gi));
            if !self.collapsed.contains(&entry.group) {
                for ci in 0..entry.checks.len() {
                    rows.push(SelectionRow::Check(gi, ci));
                }
            }
        }
        rows
    }

    fn row_count(&self) -> usize {
        match self.sub_tab {
            SettingsSubTab::Connection => self.connections.len(),
            SettingsSubTab::Selection => self.selection_rows().len(),
        }
    }

    fn clamp_cursor(&mut self) {
        let count = self.row_count();
        if count == 0 {
            self.cursor = 0;
        } else if self.cursor >= count {
            self.cursor = count - 1;
        }
    }

    /// Group checkbox semantics: selected when at least one of the
    /// group's checks is; toggling removes them all or adds them all.
    fn toggle_group(&mut self, gi: usize) {
        let ids = self.catalog[gi].check_ids();
        if types::has_one(&ids, &self.selected_checks) {
            types::remove_all(&ids, &mut self.selected_checks);
        } else {
            self.selected_checks.extend(ids);
        }
    }

    fn start_save(&mut self, client: &Client) {
        let Some(cluster_id) = self.cluster_id.clone() else {
            return;
        };
        if self.saving {
            return;
        }
        self.saving = true;

        let payload = SettingsPayload {
            selected_checks: self.selected_checks.clone(),
            connection_settings: self
                .connections
                .iter()
                .cloned()
                .collect::<HashMap<String, String>>(),
        };

        let (tx, rx) = mpsc::channel();
        self.save_rx = Some(rx);
        let client = client.clone();

        std::thread::spawn(move || {
            let _ = tx.send(checks::save_settings(&client, &cluster_id, &payload));
        });
    }

    pub fn handle_key(&mut self, key: KeyEvent, client: &Client) -> Result<bool> {
        // Connection-user editing captures everything
        if self.editing {
            match key.code {
                KeyCode::Esc => {
                    self.editing = false;
                    self.edit_buffer.clear();
                }
                KeyCode::Enter => {
                    if let Some(entry) = self.connections.get_mut(self.cursor) {
                        entry.1 = self.edit_buffer.clone();
                    }
                    self.editing = false;
                    self.edit_buffer.clear();
                }
                KeyCode::Backspace => {
                    self.edit_buffer.pop();
                }
                KeyCode::Char(c) => self.edit_buffer.push(c),
                _ => {}
            }
            return Ok(true);
        }

        match key.code {
            KeyCode::Char('[') | KeyCode::Char(']') => {
                self.sub_tab = self.sub_tab.next();
                self.cursor = 0;
                return Ok(true);
            }
            KeyCode::Char('j') | KeyCode::Down => {
                let count = self.row_count();
                if count > 0 {
                    self.cursor = (self.cursor + 1).min(count - 1);
                }
                return Ok(true);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.cursor = self.cursor.saturating_sub(1);
                return Ok(true);
            }
            KeyCode::Char('s') => {
                if self.loaded {
                    self.start_save(client);
                }
                return Ok(true);
            }
            KeyCode::Char('r') => {
                if let Some(id) = self.cluster_id.clone() {
                    let name = self.cluster_name.clone();
                    self.open(client, id, name);
                }
                return Ok(true);
            }
            _ => {}
        }

        match self.sub_tab {
            SettingsSubTab::Connection => match key.code {
                KeyCode::Enter => {
                    if let Some((_, user)) = self.connections.get(self.cursor) {
                        self.edit_buffer = user.clone();
                        self.editing = true;
                    }
                    Ok(true)
                }
                _ => Ok(false),
            },
            SettingsSubTab::Selection => match key.code {
                KeyCode::Char(' ') => {
                    match self.selection_rows().get(self.cursor) {
                        Some(SelectionRow::Group(gi)) => self.toggle_group(*gi),
                        Some(SelectionRow::Check(gi, ci)) => {
                            let id = self.catalog[*gi].checks[*ci].id.clone();
                            types::toggle(id, &mut self.selected_checks);
                        }
                        None => {}
                    }
                    Ok(true)
                }
                KeyCode::Enter => {
                    if let Some(SelectionRow::Group(gi)) = self.selection_rows().get(self.cursor) {
                        let name = self.catalog[*gi].group.clone();
                        if !self.collapsed.remove(&name) {
                            self.collapsed.insert(name);
                        }
                        self.clamp_cursor();
                    }
                    Ok(true)
                }
                _ => Ok(false),
            },
        }
    }
}

fn save_error_text(err: &ApiError) -> String {
    format!("Saving settings failed: {}", err)
}

// ── Rendering ──

pub fn render(frame: &mut Frame, state: &SettingsState, theme: &Theme, area: Rect) {
    let title = if state.cluster_name.is_empty() {
        " Check settings ".to_string()
    } else {
        format!(" Check settings — {} ", state.cluster_name)
    };

    let block = Block::default()
        .style(theme.block_style())
        .title(title)
        .title_style(theme.title())
        .borders(Borders::ALL)
        .border_style(theme.border_focused());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height < 6 || inner.width < 40 {
        return;
    }

    if state.cluster_id.is_none() {
        frame.render_widget(
            Paragraph::new("  Open a cluster's checks first, then press s for its settings")
                .style(theme.text_dim()),
            inner,
        );
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Length(2), // tab bar
        Constraint::Min(3),    // content
        Constraint::Length(1), // hint / saving line
    ])
    .split(inner);

    let tabs = Tabs::new(vec![
        Line::from(" Connection settings "),
        Line::from(" Checks selection "),
    ])
    .select(match state.sub_tab {
        SettingsSubTab::Connection => 0,
        SettingsSubTab::Selection => 1,
    })
    .style(theme.tab_inactive())
    .highlight_style(theme.tab_active())
    .divider(" ");
    frame.render_widget(tabs, chunks[0]);

    if state.loading {
        widgets::render_loading(frame, "Loading catalog and settings...", theme, chunks[1]);
        return;
    }

    match state.sub_tab {
        SettingsSubTab::Connection => render_connection(frame, state, theme, chunks[1]),
        SettingsSubTab::Selection => render_selection(frame, state, theme, chunks[1]),
    }

    let hint = if state.saving {
        Line::styled(" ⏳ saving...", theme.warning())
    } else {
        Line::styled(
            " space toggle · enter edit/collapse · [ ] switch tab · s save",
            theme.text_dim(),
        )
    };
    frame.render_widget(Paragraph::new(hint).style(theme.block_style()), chunks[2]);

    if let Some(msg) = &state.flash_message {
        widgets::render_flash_message(frame, &msg.text, msg.is_error, theme, inner);
    }
}

fn render_connection(frame: &mut Frame, state: &SettingsState, theme: &Theme, area: Rect) {
    if state.connections.is_empty() {
        frame.render_widget(
            Paragraph::new("  No hosts in this cluster").style(theme.text_dim()),
            area,
        );
        return;
    }

    let header = Row::new(vec![
        Cell::from(" HOST").style(theme.title()),
        Cell::from("CONNECTION USER").style(theme.title()),
        Cell::from("DEFAULT USER").style(theme.title()),
    ])
    .style(theme.block_style());

    let rows: Vec<Row> = state
        .connections
        .iter()
        .enumerate()
        .map(|(i, (host, user))| {
            let selected = i == state.cursor;
            let style = if selected { theme.selected() } else { theme.text() };
            let user_text = if selected && state.editing {
                format!("{}▏", state.edit_buffer)
            } else if user.is_empty() {
                "(default)".to_string()
            } else {
                user.clone()
            };
            Row::new(vec![
                Cell::from(format!(" {}", host)),
                Cell::from(user_text),
                Cell::from("root"),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Percentage(40),
        Constraint::Percentage(40),
        Constraint::Percentage(20),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .style(theme.block_style());
    frame.render_widget(table, area);
}

fn render_selection(frame: &mut Frame, state: &SettingsState, theme: &Theme, area: Rect) {
    if state.catalog.is_empty() {
        let text = match &state.load_error {
            Some(err) => format!("  Catalog could not be loaded: {}", err),
            None => "  The check catalog is empty".to_string(),
        };
        frame.render_widget(Paragraph::new(text).style(theme.text_dim()), area);
        return;
    }

    let rows = state.selection_rows();
    let items: Vec<ListItem> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let selected = i == state.cursor;
            let line = match row {
                SelectionRow::Group(gi) => {
                    let entry = &state.catalog[*gi];
                    let mark = if types::has_one(&entry.check_ids(), &state.selected_checks) {
                        "[x]"
                    } else {
                        "[ ]"
                    };
                    let arrow = if state.collapsed.contains(&entry.group) {
                        "▸"
                    } else {
                        "▾"
                    };
                    Line::from(vec![
                        Span::styled(
                            format!(" {} {} {}", arrow, mark, entry.group),
                            if selected { theme.selected() } else { theme.tab_active() },
                        ),
                    ])
                }
                SelectionRow::Check(gi, ci) => {
                    let check = &state.catalog[*gi].checks[*ci];
                    let mark = if state.selected_checks.contains(&check.id) {
                        "[x]"
                    } else {
                        "[ ]"
                    };
                    Line::from(vec![
                        Span::styled(
                            format!("     {} {:<10} ", mark, check.id),
                            if selected { theme.selected() } else { theme.text() },
                        ),
                        Span::styled(
                            check.description.clone(),
                            if selected { theme.selected() } else { theme.text_dim() },
                        ),
                    ])
                }
            };
            ListItem::new(line)
        })
        .collect();

    frame.render_widget(List::new(items).style(theme.block_style()), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sap::checks::CatalogCheck;

    fn catalog() -> Vec<CatalogEntry> {
        vec![
            CatalogEntry {
                group: "Corosync".into(),
                checks: vec![
                    CatalogCheck {
                        id: "1.1.1".into(),
                        description: "token".into(),
                    },
                    CatalogCheck {
                        id: "1.1.2".into(),
                        description: "consensus".into(),
                    },
                ],
            },
            CatalogEntry {
                group: "Pacemaker".into(),
                checks: vec![CatalogCheck {
                    id: "2.1.1".into(),
                    description: "stonith".into(),
                }],
            },
        ]
    }

    #[test]
    fn test_group_toggle_adds_then_removes_all() {
        let mut state = SettingsState::new();
        state.catalog = catalog();

        state.toggle_group(0);
        assert_eq!(state.selected_checks, vec!["1.1.1", "1.1.2"]);

        // one selected check is enough to flip the group off entirely
        state.selected_checks = vec!["1.1.2".to_string()];
        state.toggle_group(0);
        assert!(state.selected_checks.is_empty());
    }

    #[test]
    fn test_selection_rows_respect_collapse() {
        let mut state = SettingsState::new();
        state.catalog = catalog();
        assert_eq!(state.selection_rows().len(), 5);

        state.collapsed.insert("Corosync".to_string());
        let rows = state.selection_rows();
        assert_eq!(
            rows,
            vec![
                SelectionRow::Group(0),
                SelectionRow::Group(1),
                SelectionRow::Check(1, 0),
            ]
        );
    }
}
