//! Resource list views — hosts, clusters and SAP systems.
//!
//! One state instance per collection. The view is a server-side page:
//! pagination, name search and the health/SID/tag filters all live in an
//! explicit `ListQuery`; any change rebuilds the query and re-fetches
//! that page in the background. A failed re-fetch keeps the previous
//! rows on screen.
//!
//! Each row carries a tag widget: `t` adds a tag (validated before
//! anything is sent), `x` removes one. Adding refreshes the tag-filter
//! option catalog; removing a tag that is part of the active tag filter
//! reloads the list with that filter value dropped.

use crate::sap::lists::{
    self, ListPage, ListQuery, ResourceKind, ResourceRow, PER_PAGE_CHOICES,
};
use crate::sap::{tags, ApiResult, Client};
use crate::types::{self, FlashMessage, HealthStatus};
use crate::ui::theme::Theme;
use crate::ui::widgets;
use anyhow::Result;
use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, Paragraph, Row, Table},
    Frame,
};
use std::sync::mpsc;

// ── Tag widget ──

/// Per-row tag control: idle → editing → pending → idle, or back to
/// idle with an error flash and nothing changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagWidget {
    Idle,
    Editing { buffer: String },
    RemoveSelect { index: usize },
    Pending,
}

#[derive(Debug, Clone)]
enum TagAction {
    Add { row_id: String, tag: String },
    Remove { row_id: String, tag: String },
}

// ── Filter popup ──

const FILTER_SECTIONS: [&str; 3] = ["Health", "SIDs", "Tags"];

#[derive(Debug, Clone)]
pub struct FilterPopup {
    pub section: usize,
    pub cursor: usize,
    pub dirty: bool,
}

// ── Module state ──

pub struct ResourceListState {
    pub kind: ResourceKind,

    pub rows: Vec<ResourceRow>,
    pub total: usize,
    pub query: ListQuery,

    /// Options for the tag filter, from `GET /api/tags?resource_type=`
    pub tag_options: Vec<String>,
    /// SID filter options, accumulated from fetched rows
    pub sid_options: Vec<String>,

    pub selected: usize,
    pub loading: bool,
    pub loaded: bool,
    pub load_error: Option<String>,
    load_rx: Option<mpsc::Receiver<ApiResult<ListPage>>>,
    catalog_rx: Option<mpsc::Receiver<ApiResult<Vec<String>>>>,
    tag_rx: Option<mpsc::Receiver<(TagAction, ApiResult<()>)>>,

    pub tag_widget: TagWidget,
    pub filter_popup: Option<FilterPopup>,
    pub search_active: bool,
    pub search_buffer: String,

    pub last_refresh: Option<DateTime<Local>>,
    /// Set by the Clusters view when the user opens a cluster's checks
    pub open_request: Option<(String, String)>,
    pub flash_message: Option<FlashMessage>,
}

impl ResourceListState {
    pub fn new(kind: ResourceKind, per_page: usize) -> Self {
        Self {
            kind,
            rows: Vec::new(),
            total: 0,
            query: ListQuery::new(per_page),
            tag_options: Vec::new(),
            sid_options: Vec::new(),
            selected: 0,
            loading: false,
            loaded: false,
            load_error: None,
            load_rx: None,
            catalog_rx: None,
            tag_rx: None,
            tag_widget: TagWidget::Idle,
            filter_popup: None,
            search_active: false,
            search_buffer: String::new(),
            last_refresh: None,
            open_request: None,
            flash_message: None,
        }
    }

    /// True while a sub-control wants every key.
    pub fn captures_keys(&self) -> bool {
        self.filter_popup.is_some()
            || self.search_active
            || matches!(
                self.tag_widget,
                TagWidget::Editing { .. } | TagWidget::RemoveSelect { .. }
            )
    }

    pub fn take_open_request(&mut self) -> Option<(String, String)> {
        self.open_request.take()
    }

    pub fn ensure_loaded(&mut self, client: &Client) {
        if self.loaded || self.loading {
            return;
        }
        self.reload(client);
        self.refresh_tag_options(client);
    }

    /// Fetch the page for the current query. The response replaces the
    /// rows whenever it arrives, even if the query changed meanwhile.
    pub fn reload(&mut self, client: &Client) {
        self.loading = true;
        let (tx, rx) = mpsc::channel();
        self.load_rx = Some(rx);
        let client = client.clone();
        let kind = self.kind;
        let query = self.query.clone();

        std::thread::spawn(move || {
            let _ = tx.send(lists::fetch_page(&client, kind, &query));
        });
    }

    /// Re-fetch the tag filter option catalog.
    pub fn refresh_tag_options(&mut self, client: &Client) {
        let (tx, rx) = mpsc::channel();
        self.catalog_rx = Some(rx);
        let client = client.clone();
        let kind = self.kind;

        std::thread::spawn(move || {
            let _ = tx.send(tags::fetch_catalog(&client, kind));
        });
    }

    pub fn poll(&mut self, client: &Client) {
        if let Some(rx) = &self.load_rx {
            match rx.try_recv() {
                Ok(Ok(page)) => {
                    self.rows = page.items;
                    self.total = page.total;
                    self.load_error = None;
                    self.loading = false;
                    self.loaded = true;
                    self.load_rx = None;
                    self.last_refresh = Some(Local::now());
                    self.merge_sid_options();
                    self.clamp_selection();
                }
                Ok(Err(e)) => {
                    // the old rows stay on screen
                    self.load_error = Some(e.to_string());
                    self.loading = false;
                    self.loaded = true;
                    self.load_rx = None;
                }
                Err(mpsc::TryRecvError::Empty) => {}
                Err(mpsc::TryRecvError::Disconnected) => {
                    self.loading = false;
                    self.load_rx = None;
                }
            }
        }

        if let Some(rx) = &self.catalog_rx {
            match rx.try_recv() {
                Ok(Ok(options)) => {
                    self.tag_options = options;
                    // keep selected filter values listed even if the
                    // catalog no longer contains them
                    for tag in &self.query.tags {
                        if !self.tag_options.contains(tag) {
                            self.tag_options.push(tag.clone());
                        }
                    }
                    self.catalog_rx = None;
                }
                Ok(Err(_)) => {
                    // dropdown keeps its previous options
                    self.catalog_rx = None;
                }
                Err(mpsc::TryRecvError::Empty) => {}
                Err(mpsc::TryRecvError::Disconnected) => {
                    self.catalog_rx = None;
                }
            }
        }

        if let Some(rx) = &self.tag_rx {
            match rx.try_recv() {
                Ok((action, result)) => {
                    self.tag_rx = None;
                    self.tag_widget = TagWidget::Idle;
                    self.finish_tag_action(client, action, result);
                }
                Err(mpsc::TryRecvError::Empty) => {}
                Err(mpsc::TryRecvError::Disconnected) => {
                    self.tag_rx = None;
                    self.tag_widget = TagWidget::Idle;
                }
            }
        }
    }

    fn finish_tag_action(&mut self, client: &Client, action: TagAction, result: ApiResult<()>) {
        match (action, result) {
            (TagAction::Add { row_id, tag }, Ok(())) => {
                if let Some(row) = self.rows.iter_mut().find(|r| r.id == row_id) {
                    if !row.tags.contains(&tag) {
                        row.tags.push(tag.clone());
                    }
                }
                self.refresh_tag_options(client);
                self.flash_message = Some(FlashMessage::new(format!("Tag \"{}\" added", tag), false));
            }
            (TagAction::Remove { row_id, tag }, Ok(())) => {
                if self.query.tags.contains(&tag) {
                    // the removed tag was part of the active filter:
                    // drop it from the query and reload the whole list
                    self.query.tags.retain(|t| t != &tag);
                    self.reload(client);
                } else if let Some(row) = self.rows.iter_mut().find(|r| r.id == row_id) {
                    row.tags.retain(|t| t != &tag);
                }
                self.refresh_tag_options(client);
                self.flash_message =
                    Some(FlashMessage::new(format!("Tag \"{}\" removed", tag), false));
            }
            (_, Err(e)) => {
                self.flash_message = Some(FlashMessage::new(e.to_string(), true));
            }
        }
    }

    fn spawn_tag_action(&mut self, client: &Client, action: TagAction) {
        self.tag_widget = TagWidget::Pending;
        let (tx, rx) = mpsc::channel();
        self.tag_rx = Some(rx);
        let client = client.clone();
        let kind = self.kind;

        std::thread::spawn(move || {
            let result = match &action {
                TagAction::Add { row_id, tag } => tags::add(&client, kind, row_id, tag),
                TagAction::Remove { row_id, tag } => tags::remove(&client, kind, row_id, tag),
            };
            let _ = tx.send((action, result));
        });
    }

    fn merge_sid_options(&mut self) {
        for row in &self.rows {
            for sid in &row.sids {
                if !sid.is_empty() && !self.sid_options.contains(sid) {
                    self.sid_options.push(sid.clone());
                }
            }
        }
        for sid in &self.query.sids {
            if !self.sid_options.contains(sid) {
                self.sid_options.push(sid.clone());
            }
        }
        self.sid_options.sort();
    }

    fn clamp_selection(&mut self) {
        if self.rows.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.rows.len() {
            self.selected = self.rows.len() - 1;
        }
    }

    fn selected_row(&self) -> Option<&ResourceRow> {
        self.rows.get(self.selected)
    }

    // ── Key handling ──

    pub fn handle_key(&mut self, key: KeyEvent, client: &Client) -> Result<bool> {
        if self.filter_popup.is_some() {
            self.handle_filter_key(key, client);
            return Ok(true);
        }
        if self.search_active {
            self.handle_search_key(key, client);
            return Ok(true);
        }
        match self.tag_widget {
            TagWidget::Editing { .. } => {
                self.handle_tag_edit_key(key, client);
                return Ok(true);
            }
            TagWidget::RemoveSelect { .. } => {
                self.handle_tag_remove_key(key, client);
                return Ok(true);
            }
            _ => {}
        }

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
            KeyCode::Char('h') | KeyCode::Left => {
                if self.query.page > 1 {
                    self.query.page -= 1;
                    self.reload(client);
                }
            }
            KeyCode::Char('l') | KeyCode::Right => {
                if self.query.page < lists::total_pages(self.total, self.query.per_page) {
                    self.query.page += 1;
                    self.reload(client);
                }
            }
            KeyCode::Char('+') => {
                self.cycle_per_page(1);
                self.reload(client);
            }
            KeyCode::Char('-') => {
                self.cycle_per_page(-1);
                self.reload(client);
            }
            KeyCode::Char('f') => {
                self.filter_popup = Some(FilterPopup {
                    section: 0,
                    cursor: 0,
                    dirty: false,
                });
            }
            KeyCode::Char('/') => {
                self.search_buffer = self.query.name.clone();
                self.search_active = true;
            }
            KeyCode::Char('t') => {
                if self.selected_row().is_some() && self.tag_widget == TagWidget::Idle {
                    self.tag_widget = TagWidget::Editing {
                        buffer: String::new(),
                    };
                }
            }
            KeyCode::Char('x') => {
                if self.tag_widget == TagWidget::Idle {
                    if let Some(row) = self.selected_row() {
                        if !row.tags.is_empty() {
                            self.tag_widget = TagWidget::RemoveSelect { index: 0 };
                        }
                    }
                }
            }
            KeyCode::Char('r') => {
                self.reload(client);
                self.refresh_tag_options(client);
            }
            KeyCode::Enter => {
                if self.kind == ResourceKind::Clusters {
                    if let Some(row) = self.selected_row() {
                        self.open_request = Some((row.id.clone(), row.name.clone()));
                    }
                }
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn cycle_per_page(&mut self, direction: isize) {
        let idx = PER_PAGE_CHOICES
            .iter()
            .position(|&p| p == self.query.per_page)
            .unwrap_or(0) as isize;
        let idx = (idx + direction).rem_euclid(PER_PAGE_CHOICES.len() as isize) as usize;
        self.query.per_page = PER_PAGE_CHOICES[idx];
        self.query.page = 1;
    }

    fn handle_search_key(&mut self, key: KeyEvent, client: &Client) {
        match key.code {
            KeyCode::Esc => {
                self.search_active = false;
                self.search_buffer.clear();
            }
            KeyCode::Enter => {
                self.search_active = false;
                if self.query.name != self.search_buffer {
                    self.query.name = self.search_buffer.clone();
                    self.query.page = 1;
                    self.reload(client);
                }
            }
            KeyCode::Backspace => {
                self.search_buffer.pop();
            }
            KeyCode::Char(c) => self.search_buffer.push(c),
            _ => {}
        }
    }

    fn handle_tag_edit_key(&mut self, key: KeyEvent, client: &Client) {
        let TagWidget::Editing { buffer } = &mut self.tag_widget else {
            return;
        };
        match key.code {
            KeyCode::Esc => {
                self.tag_widget = TagWidget::Idle;
            }
            KeyCode::Enter => {
                let tag = buffer.trim().to_string();
                if tag.is_empty() {
                    self.tag_widget = TagWidget::Idle;
                    return;
                }
                if !tags::is_valid(&tag) {
                    // nothing is sent; the input stays for a fix-up
                    self.flash_message = Some(FlashMessage::new(
                        "Invalid tag: letters, digits, spaces, - and _ only".to_string(),
                        true,
                    ));
                    return;
                }
                let Some(row) = self.selected_row() else {
                    self.tag_widget = TagWidget::Idle;
                    return;
                };
                let action = TagAction::Add {
                    row_id: row.id.clone(),
                    tag,
                };
                self.spawn_tag_action(client, action);
            }
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Char(c) => buffer.push(c),
            _ => {}
        }
    }

    fn handle_tag_remove_key(&mut self, key: KeyEvent, client: &Client) {
        let tag_count = self.selected_row().map(|r| r.tags.len()).unwrap_or(0);
        let TagWidget::RemoveSelect { index } = &mut self.tag_widget else {
            return;
        };
        match key.code {
            KeyCode::Esc => {
                self.tag_widget = TagWidget::Idle;
            }
            KeyCode::Left | KeyCode::Char('h') => {
                *index = index.saturating_sub(1);
            }
            KeyCode::Right | KeyCode::Char('l') => {
                if tag_count > 0 {
                    *index = (*index + 1).min(tag_count - 1);
                }
            }
            KeyCode::Enter => {
                let idx = *index;
                let Some(row) = self.selected_row() else {
                    self.tag_widget = TagWidget::Idle;
                    return;
                };
                let Some(tag) = row.tags.get(idx).cloned() else {
                    self.tag_widget = TagWidget::Idle;
                    return;
                };
                let action = TagAction::Remove {
                    row_id: row.id.clone(),
                    tag,
                };
                self.spawn_tag_action(client, action);
            }
            _ => {}
        }
    }

    fn handle_filter_key(&mut self, key: KeyEvent, client: &Client) {
        let sid_len = self.sid_options.len();
        let tag_len = self.tag_options.len();
        let Some(popup) = &mut self.filter_popup else {
            return;
        };
        let section_len = |section: usize| match section {
            0 => HealthStatus::ALL.len(),
            1 => sid_len,
            _ => tag_len,
        };

        match key.code {
            KeyCode::Esc | KeyCode::Enter => {
                let dirty = popup.dirty;
                self.filter_popup = None;
                if dirty {
                    self.query.page = 1;
                    self.reload(client);
                }
                return;
            }
            KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => {
                popup.section = (popup.section + 1) % FILTER_SECTIONS.len();
                popup.cursor = 0;
            }
            KeyCode::Left | KeyCode::Char('h') => {
                popup.section = (popup.section + FILTER_SECTIONS.len() - 1) % FILTER_SECTIONS.len();
                popup.cursor = 0;
            }
            KeyCode::Char('j') | KeyCode::Down => {
                let len = section_len(popup.section);
                if len > 0 {
                    popup.cursor = (popup.cursor + 1).min(len - 1);
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                popup.cursor = popup.cursor.saturating_sub(1);
            }
            KeyCode::Char(' ') => {
                let section = popup.section;
                let cursor = popup.cursor;
                popup.dirty = true;
                match section {
                    0 => {
                        types::toggle(HealthStatus::ALL[cursor], &mut self.query.health);
                    }
                    1 => {
                        if let Some(sid) = self.sid_options.get(cursor).cloned() {
                            types::toggle(sid, &mut self.query.sids);
                        }
                    }
                    _ => {
                        if let Some(tag) = self.tag_options.get(cursor).cloned() {
                            types::toggle(tag, &mut self.query.tags);
                        }
                    }
                }
            }
            _ => {}
        }
    }
}

// ── Rendering ──

pub fn render(frame: &mut Frame, state: &ResourceListState, theme: &Theme, area: Rect) {
    let block = Block::default()
        .style(theme.block_style())
        .title(format!(" {} ", state.kind.label()))
        .title_style(theme.title())
        .borders(Borders::ALL)
        .border_style(theme.border_focused());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height < 6 || inner.width < 40 {
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Length(1), // health counts + pagination
        Constraint::Length(1), // active filters
        Constraint::Min(3),    // table
        Constraint::Length(1), // footer (tag widget / search / refresh)
    ])
    .split(inner);

    render_summary_line(frame, state, theme, chunks[0]);
    render_filter_line(frame, state, theme, chunks[1]);

    if state.loading && state.rows.is_empty() {
        widgets::render_loading(frame, "Loading...", theme, chunks[2]);
    } else {
        render_table(frame, state, theme, chunks[2]);
    }

    render_footer(frame, state, theme, chunks[3]);

    if state.filter_popup.is_some() {
        render_filter_popup(frame, state, theme, area);
    }

    if let Some(msg) = &state.flash_message {
        widgets::render_flash_message(frame, &msg.text, msg.is_error, theme, inner);
    }
}

fn render_summary_line(frame: &mut Frame, state: &ResourceListState, theme: &Theme, area: Rect) {
    let counters = lists::health_counts(&state.rows);
    let pages = lists::total_pages(state.total, state.query.per_page);

    let left = Line::from(vec![
        Span::raw(" "),
        widgets::counter_span(HealthStatus::Passing, counters.passing, theme),
        Span::raw("  "),
        widgets::counter_span(HealthStatus::Warning, counters.warning, theme),
        Span::raw("  "),
        widgets::counter_span(HealthStatus::Critical, counters.critical, theme),
    ]);
    frame.render_widget(Paragraph::new(left).style(theme.block_style()), area);

    let right_text = format!(
        "page {}/{} · {} per page · {} total ",
        state.query.page, pages, state.query.per_page, state.total
    );
    let right_len = right_text.chars().count() as u16;
    let right_area = Rect {
        x: area.x + area.width.saturating_sub(right_len),
        y: area.y,
        width: right_len.min(area.width),
        height: 1,
    };
    frame.render_widget(Paragraph::new(right_text).style(theme.text_dim()), right_area);
}

fn render_filter_line(frame: &mut Frame, state: &ResourceListState, theme: &Theme, area: Rect) {
    let query = &state.query;
    let line = if query.has_filters() {
        let mut parts = Vec::new();
        if !query.name.is_empty() {
            parts.push(format!("name~\"{}\"", query.name));
        }
        if !query.health.is_empty() {
            let values: Vec<&str> = query.health.iter().map(|s| s.as_str()).collect();
            parts.push(format!("health={}", values.join(",")));
        }
        if !query.sids.is_empty() {
            parts.push(format!("sids={}", query.sids.join(",")));
        }
        if !query.tags.is_empty() {
            parts.push(format!("tags={}", query.tags.join(",")));
        }
        Line::from(vec![
            Span::styled(" filters ", theme.text_dim()),
            Span::styled(parts.join(" · "), theme.tab_active()),
        ])
    } else {
        Line::styled(" no filters · f to filter, / to search", theme.text_dim())
    };
    frame.render_widget(Paragraph::new(line).style(theme.block_style()), area);
}

fn render_table(frame: &mut Frame, state: &ResourceListState, theme: &Theme, area: Rect) {
    if state.rows.is_empty() {
        let text = if state.loaded {
            "  Nothing matches the current filters"
        } else {
            "  No data yet"
        };
        frame.render_widget(Paragraph::new(text).style(theme.text_dim()), area);
        return;
    }

    let header = Row::new(vec![
        Cell::from(" NAME").style(theme.title()),
        Cell::from("HEALTH").style(theme.title()),
        Cell::from("SIDS").style(theme.title()),
        Cell::from("TAGS").style(theme.title()),
        Cell::from("INFO").style(theme.title()),
    ])
    .style(theme.block_style());

    let rows: Vec<Row> = state
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let style = if i == state.selected {
                theme.selected()
            } else {
                theme.text()
            };

            let health_cell = Cell::from(Line::from(vec![
                widgets::status_span(row.health, theme),
                Span::styled(format!(" {}", row.health.as_str()), style),
            ]));

            let info = if row.cluster_type.is_empty() && row.hosts_count == 0 {
                String::new()
            } else if row.cluster_type.is_empty() {
                format!("{} hosts", row.hosts_count)
            } else {
                format!("{} · {} hosts", row.cluster_type, row.hosts_count)
            };

            Row::new(vec![
                Cell::from(format!(" {}", row.name)),
                health_cell,
                Cell::from(row.sids.join(", ")),
                Cell::from(row.tags.join(", ")),
                Cell::from(info),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Percentage(30),
        Constraint::Length(12),
        Constraint::Percentage(15),
        Constraint::Percentage(25),
        Constraint::Percentage(30),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .style(theme.block_style());
    frame.render_widget(table, area);
}

fn render_footer(frame: &mut Frame, state: &ResourceListState, theme: &Theme, area: Rect) {
    match &state.tag_widget {
        TagWidget::Editing { buffer } => {
            let line = Line::from(vec![
                Span::styled(" New tag: ", theme.tab_active()),
                Span::styled(format!("{}▏", buffer), theme.text()),
                Span::styled("  enter add · esc cancel", theme.text_dim()),
            ]);
            frame.render_widget(Paragraph::new(line).style(theme.block_style()), area);
            return;
        }
        TagWidget::RemoveSelect { index } => {
            let mut spans = vec![Span::styled(" Remove tag: ", theme.tab_active())];
            if let Some(row) = state.rows.get(state.selected) {
                for (i, tag) in row.tags.iter().enumerate() {
                    let style = if i == *index {
                        theme.selected()
                    } else {
                        theme.text_dim()
                    };
                    spans.push(Span::styled(format!("[{}]", tag), style));
                    spans.push(Span::raw(" "));
                }
            }
            spans.push(Span::styled("enter remove · esc cancel", theme.text_dim()));
            frame.render_widget(
                Paragraph::new(Line::from(spans)).style(theme.block_style()),
                area,
            );
            return;
        }
        TagWidget::Pending => {
            widgets::render_loading(frame, "Applying tag change...", theme, area);
            return;
        }
        TagWidget::Idle => {}
    }

    if state.search_active {
        let line = Line::from(vec![
            Span::styled(" Search name: ", theme.tab_active()),
            Span::styled(format!("{}▏", state.search_buffer), theme.text()),
            Span::styled("  enter apply · esc cancel", theme.text_dim()),
        ]);
        frame.render_widget(Paragraph::new(line).style(theme.block_style()), area);
        return;
    }

    let mut spans = Vec::new();
    if let Some(refreshed) = &state.last_refresh {
        spans.push(Span::styled(
            format!(" last update {}", refreshed.format("%H:%M:%S")),
            theme.text_dim(),
        ));
    }
    if let Some(err) = &state.load_error {
        spans.push(Span::styled(format!("  ({})", err), theme.text_dim()));
    }
    if !spans.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::from(spans)).style(theme.block_style()),
            area,
        );
    }
}

fn render_filter_popup(frame: &mut Frame, state: &ResourceListState, theme: &Theme, area: Rect) {
    let Some(popup) = &state.filter_popup else {
        return;
    };

    let width = 62.min(area.width.saturating_sub(4));
    let height = 16.min(area.height.saturating_sub(4));
    let popup_area = widgets::centered_rect(width, height, area);

    frame.render_widget(Clear, popup_area);
    let block = Block::default()
        .style(theme.block_style())
        .title(" Filters ")
        .title_style(theme.title())
        .borders(Borders::ALL)
        .border_style(theme.border_focused());
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let chunks = Layout::vertical([
        Constraint::Min(3),    // sections
        Constraint::Length(1), // hint
    ])
    .split(inner);

    let columns = Layout::horizontal([
        Constraint::Percentage(33),
        Constraint::Percentage(33),
        Constraint::Percentage(34),
    ])
    .split(chunks[0]);

    for (section, column) in columns.iter().enumerate() {
        let focused = section == popup.section;
        let section_block = Block::default()
            .style(theme.block_style())
            .title(FILTER_SECTIONS[section])
            .title_style(if focused { theme.tab_active() } else { theme.tab_inactive() })
            .borders(Borders::ALL)
            .border_style(if focused { theme.border_focused() } else { theme.border() });
        let section_inner = section_block.inner(*column);
        frame.render_widget(section_block, *column);

        let items: Vec<ListItem> = match section {
            0 => HealthStatus::ALL
                .iter()
                .enumerate()
                .map(|(i, status)| {
                    filter_item(
                        status.as_str(),
                        state.query.health.contains(status),
                        focused && i == popup.cursor,
                        theme,
                    )
                })
                .collect(),
            1 => state
                .sid_options
                .iter()
                .enumerate()
                .map(|(i, sid)| {
                    filter_item(
                        sid,
                        state.query.sids.contains(sid),
                        focused && i == popup.cursor,
                        theme,
                    )
                })
                .collect(),
            _ => state
                .tag_options
                .iter()
                .enumerate()
                .map(|(i, tag)| {
                    filter_item(
                        tag,
                        state.query.tags.contains(tag),
                        focused && i == popup.cursor,
                        theme,
                    )
                })
                .collect(),
        };

        if items.is_empty() {
            frame.render_widget(
                Paragraph::new("(none)").style(theme.text_dim()),
                section_inner,
            );
        } else {
            frame.render_widget(List::new(items).style(theme.block_style()), section_inner);
        }
    }

    frame.render_widget(
        Paragraph::new(" tab section · space toggle · enter apply")
            .style(Style::default().fg(theme.accent_dim)),
        chunks[1],
    );
}

fn filter_item<'a>(label: &'a str, active: bool, under_cursor: bool, theme: &Theme) -> ListItem<'a> {
    let mark = if active { "[x]" } else { "[ ]" };
    let style = if under_cursor {
        theme.selected()
    } else if active {
        theme.tab_active()
    } else {
        theme.text()
    };
    ListItem::new(Line::from(Span::styled(format!("{} {}", mark, label), style)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, tags: &[&str]) -> ResourceRow {
        ResourceRow {
            id: id.to_string(),
            name: id.to_string(),
            health: HealthStatus::Passing,
            sids: vec!["PRD".to_string()],
            tags: tags.iter().map(|t| t.to_string()).collect(),
            cluster_type: String::new(),
            hosts_count: 0,
        }
    }

    fn state() -> ResourceListState {
        let mut state = ResourceListState::new(ResourceKind::Hosts, 10);
        state.rows = vec![row("h1", &["prod", "hana"]), row("h2", &[])];
        state.loaded = true;
        state
    }

    #[test]
    fn test_removing_filtered_tag_reloads_without_it() {
        let client = Client::new("http://localhost:0");
        let mut state = state();
        state.query.tags = vec!["prod".to_string()];

        state.finish_tag_action(
            &client,
            TagAction::Remove {
                row_id: "h1".to_string(),
                tag: "prod".to_string(),
            },
            Ok(()),
        );

        // the filter value is gone and a reload is in flight
        assert!(state.query.tags.is_empty());
        assert!(state.loading);
    }

    #[test]
    fn test_removing_unfiltered_tag_updates_row_only() {
        let client = Client::new("http://localhost:0");
        let mut state = state();
        state.query.tags = vec!["prod".to_string()];

        state.finish_tag_action(
            &client,
            TagAction::Remove {
                row_id: "h1".to_string(),
                tag: "hana".to_string(),
            },
            Ok(()),
        );

        assert_eq!(state.query.tags, vec!["prod".to_string()]);
        assert!(!state.loading);
        assert_eq!(state.rows[0].tags, vec!["prod".to_string()]);
    }

    #[test]
    fn test_failed_tag_action_changes_nothing() {
        let client = Client::new("http://localhost:0");
        let mut state = state();

        state.finish_tag_action(
            &client,
            TagAction::Add {
                row_id: "h2".to_string(),
                tag: "new".to_string(),
            },
            Err(crate::sap::ApiError::Transport("connection refused".into())),
        );

        assert!(state.rows[1].tags.is_empty());
        assert!(state.flash_message.as_ref().unwrap().is_error);
    }

    #[test]
    fn test_successful_add_updates_row() {
        let client = Client::new("http://localhost:0");
        let mut state = state();

        state.finish_tag_action(
            &client,
            TagAction::Add {
                row_id: "h2".to_string(),
                tag: "new".to_string(),
            },
            Ok(()),
        );

        assert_eq!(state.rows[1].tags, vec!["new".to_string()]);
        assert!(!state.flash_message.as_ref().unwrap().is_error);
    }

    #[test]
    fn test_per_page_cycle_resets_page() {
        let mut state = state();
        state.query.page = 4;
        state.cycle_per_page(1);
        assert_eq!(state.query.per_page, 25);
        assert_eq!(state.query.page, 1);
        state.cycle_per_page(-1);
        assert_eq!(state.query.per_page, 10);
    }

    #[test]
    fn test_sid_options_accumulate() {
        let mut state = state();
        state.query.sids = vec!["OLD".to_string()];
        state.merge_sid_options();
        assert_eq!(state.sid_options, vec!["OLD".to_string(), "PRD".to_string()]);
    }
}
