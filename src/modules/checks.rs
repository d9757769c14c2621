//! Check results module — grouped results table for one cluster.
//!
//! Shows every configured check for the opened cluster, grouped by
//! category, one column per cluster host. Groups collapse like an
//! accordion; a status-filter bar narrows the visible checks. A group
//! whose checks are all filtered away keeps its header row.

use crate::sap::checks::{self, CheckGroup, ClusterHost, ClusterResults};
use crate::sap::{ApiResult, Client};
use crate::types::{self, FlashMessage, HealthStatus};
use crate::ui::theme::Theme;
use crate::ui::widgets;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};
use std::collections::{BTreeMap, HashSet};
use std::sync::mpsc;

/// One navigable row of the results table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksRow {
    /// Group header (index into the visible groups)
    Group(usize),
    /// Check row (group index, check index)
    Check(usize, usize),
}

pub struct ChecksState {
    pub cluster_id: Option<String>,
    pub cluster_name: String,

    pub groups: Vec<CheckGroup>,
    pub cluster_hosts: BTreeMap<String, ClusterHost>,

    /// Active status filters; empty means "show all"
    pub filters: Vec<HealthStatus>,
    pub filter_cursor: usize,
    /// Collapsed group names
    pub collapsed: HashSet<String>,
    pub selected: usize,

    pub loading: bool,
    pub loaded: bool,
    pub load_error: Option<String>,
    load_rx: Option<mpsc::Receiver<ApiResult<ClusterResults>>>,

    /// Set when the user asks for the check-settings editor
    pub settings_requested: bool,
    pub flash_message: Option<FlashMessage>,
}

impl ChecksState {
    pub fn new() -> Self {
        Self {
            cluster_id: None,
            cluster_name: String::new(),
            groups: Vec::new(),
            cluster_hosts: BTreeMap::new(),
            filters: Vec::new(),
            filter_cursor: 0,
            collapsed: HashSet::new(),
            selected: 0,
            loading: false,
            loaded: false,
            load_error: None,
            load_rx: None,
            settings_requested: false,
            flash_message: None,
        }
    }

    /// Bind the module to a cluster and fetch its results. View state
    /// (filters, collapsed groups, selection) starts fresh.
    pub fn open(&mut self, client: &Client, cluster_id: String, cluster_name: String) {
        self.cluster_id = Some(cluster_id);
        self.cluster_name = cluster_name;
        self.groups = Vec::new();
        self.cluster_hosts = BTreeMap::new();
        self.filters.clear();
        self.filter_cursor = 0;
        self.collapsed.clear();
        self.selected = 0;
        self.loaded = false;
        self.load_error = None;
        self.reload(client);
    }

    pub fn reload(&mut self, client: &Client) {
        let Some(cluster_id) = self.cluster_id.clone() else {
            return;
        };
        self.loading = true;
        let (tx, rx) = mpsc::channel();
        self.load_rx = Some(rx);
        let client = client.clone();

        std::thread::spawn(move || {
            let _ = tx.send(checks::fetch_results(&client, &cluster_id));
        });
    }

    pub fn poll(&mut self) {
        if let Some(rx) = &self.load_rx {
            match rx.try_recv() {
                Ok(Ok(results)) => {
                    self.groups = checks::group_checks(results.checks);
                    self.cluster_hosts = results.hosts;
                    self.load_error = None;
                    self.loading = false;
                    self.loaded = true;
                    self.load_rx = None;
                    self.clamp_selection();
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
    }

    /// Groups narrowed to the active filter set. Emptied groups keep
    /// their entry so the header row still renders.
    pub fn visible_groups(&self) -> Vec<CheckGroup> {
        checks::filter_groups(&self.groups, &self.filters)
    }

    /// Flat navigation order: every header, then its checks unless the
    /// group is collapsed.
    pub fn visible_rows(&self) -> Vec<ChecksRow> {
        let mut rows = Vec::new();
        for (gi, group) in self.visible_groups().iter().enumerate() {
            rows.push(ChecksRow::Group(gi));
            if !self.collapsed.contains(&group.name) {
                for ci in 0..group.checks.len() {
                    rows.push(ChecksRow::Check(gi, ci));
                }
            }
        }
        rows
    }

    fn clamp_selection(&mut self) {
        let count = self.visible_rows().len();
        if count == 0 {
            self.selected = 0;
        } else if self.selected >= count {
            self.selected = count - 1;
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, client: &Client) -> Result<bool> {
        let rows = self.visible_rows();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if !rows.is_empty() {
                    self.selected = (self.selected + 1).min(rows.len() - 1);
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Char('g') => self.selected = 0,
            KeyCode::Char('G') => {
                if !rows.is_empty() {
                    self.selected = rows.len() - 1;
                }
            }
            KeyCode::Left => {
                self.filter_cursor = self.filter_cursor.saturating_sub(1);
            }
            KeyCode::Right => {
                self.filter_cursor = (self.filter_cursor + 1).min(HealthStatus::ALL.len() - 1);
            }
            KeyCode::Char(' ') => {
                types::toggle(HealthStatus::ALL[self.filter_cursor], &mut self.filters);
                self.clamp_selection();
            }
            KeyCode::Char('a') => {
                // "See all" — drop every filter
                self.filters.clear();
                self.clamp_selection();
            }
            KeyCode::Enter => {
                if let Some(ChecksRow::Group(gi)) = rows.get(self.selected) {
                    let name = self.visible_groups()[*gi].name.clone();
                    if !self.collapsed.remove(&name) {
                        self.collapsed.insert(name);
                    }
                    self.clamp_selection();
                }
            }
            KeyCode::Char('r') => self.reload(client),
            KeyCode::Char('s') => {
                if self.cluster_id.is_some() {
                    self.settings_requested = true;
                }
            }
            _ => return Ok(false),
        }
        Ok(true)
    }
}

pub fn render(frame: &mut Frame, state: &ChecksState, theme: &Theme, area: Rect) {
    let title = if state.cluster_name.is_empty() {
        " Checks ".to_string()
    } else {
        format!(" Checks — {} ", state.cluster_name)
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
            Paragraph::new("  Open a cluster from the Clusters view to see its check results")
                .style(theme.text_dim()),
            inner,
        );
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Length(1), // filter bar
        Constraint::Length(1), // unreachable hosts note
        Constraint::Min(3),    // table
        Constraint::Length(1), // detail line
    ])
    .split(inner);

    render_filter_bar(frame, state, theme, chunks[0]);
    render_hosts_note(frame, state, theme, chunks[1]);

    if state.loading {
        widgets::render_loading(frame, "Fetching check results...", theme, chunks[2]);
    } else {
        render_table(frame, state, theme, chunks[2]);
        render_detail_line(frame, state, theme, chunks[3]);
    }

    if let Some(msg) = &state.flash_message {
        widgets::render_flash_message(frame, &msg.text, msg.is_error, theme, inner);
    }
}

fn render_filter_bar(frame: &mut Frame, state: &ChecksState, theme: &Theme, area: Rect) {
    let mut spans = vec![Span::styled(" Filter ", theme.text_dim())];
    for (i, status) in HealthStatus::ALL.iter().enumerate() {
        let active = state.filters.contains(status);
        let mark = if active { "■" } else { "□" };
        let mut style = theme.status_style(*status);
        if i == state.filter_cursor {
            style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
        }
        spans.push(Span::styled(format!("{} {}", mark, status.as_str()), style));
        spans.push(Span::raw("  "));
    }
    spans.push(Span::styled(
        "←/→ move · space toggle · a see all",
        theme.text_dim(),
    ));
    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(theme.block_style()),
        area,
    );
}

fn render_hosts_note(frame: &mut Frame, state: &ChecksState, theme: &Theme, area: Rect) {
    let unreachable: Vec<String> = state
        .cluster_hosts
        .iter()
        .filter(|(_, host)| !host.reachable)
        .map(|(name, host)| {
            if host.msg.is_empty() {
                name.clone()
            } else {
                format!("{} ({})", name, host.msg)
            }
        })
        .collect();

    if unreachable.is_empty() {
        return;
    }

    let line = Line::from(vec![
        Span::styled(" ⚠ unreachable: ", theme.warning()),
        Span::styled(unreachable.join(", "), theme.text_dim()),
    ]);
    frame.render_widget(Paragraph::new(line).style(theme.block_style()), area);
}

fn render_table(frame: &mut Frame, state: &ChecksState, theme: &Theme, area: Rect) {
    let groups = state.visible_groups();
    let hostnames: Vec<&String> = state.cluster_hosts.keys().collect();

    if state.loaded && groups.is_empty() {
        let text = match &state.load_error {
            Some(err) => format!("  Check results could not be loaded: {}", err),
            None => "  No check results for this cluster".to_string(),
        };
        frame.render_widget(Paragraph::new(text).style(theme.text_dim()), area);
        return;
    }

    // Header: description, check id, one column per expected host. An
    // unreachable host gets a warning marker next to its name.
    let mut header_cells = vec![
        Cell::from(" DESCRIPTION").style(theme.title()),
        Cell::from("ID").style(theme.title()),
    ];
    for hostname in &hostnames {
        let host = &state.cluster_hosts[*hostname];
        let cell = if host.reachable {
            Cell::from(hostname.as_str()).style(theme.title())
        } else {
            Cell::from(Line::from(vec![
                Span::styled("⚠ ", theme.warning()),
                Span::styled(hostname.as_str(), theme.title()),
            ]))
        };
        header_cells.push(cell);
    }
    let header = Row::new(header_cells).style(theme.block_style());

    let visible = state.visible_rows();
    let mut rows: Vec<Row> = Vec::new();
    for (ri, row_ref) in visible.iter().enumerate() {
        let selected = ri == state.selected;
        match row_ref {
            ChecksRow::Group(gi) => {
                let group = &groups[*gi];
                let marker = if state.collapsed.contains(&group.name) {
                    "▸"
                } else {
                    "▾"
                };
                let style = if selected {
                    theme.selected()
                } else {
                    theme.tab_active()
                };
                let mut cells =
                    vec![Cell::from(format!(" {} {}", marker, group.name)).style(style)];
                for _ in 0..hostnames.len() + 1 {
                    cells.push(Cell::from(""));
                }
                rows.push(Row::new(cells).style(style));
            }
            ChecksRow::Check(gi, ci) => {
                let check = &groups[*gi].checks[*ci];
                let style = if selected { theme.selected() } else { theme.text() };
                let mut cells = vec![
                    Cell::from(format!("   {}", check.description)),
                    Cell::from(check.id.clone()),
                ];
                for hostname in &hostnames {
                    let (status, _) = check.host_cell(hostname);
                    cells.push(Cell::from(Line::from(widgets::status_span(status, theme))));
                }
                rows.push(Row::new(cells).style(style));
            }
        }
    }

    let mut widths = vec![Constraint::Min(24), Constraint::Length(10)];
    for _ in &hostnames {
        widths.push(Constraint::Min(10));
    }

    let table = Table::new(rows, widths)
        .header(header)
        .style(theme.block_style());
    frame.render_widget(table, area);
}

/// The tooltip surface: per-host messages of the selected check.
fn render_detail_line(frame: &mut Frame, state: &ChecksState, theme: &Theme, area: Rect) {
    let groups = state.visible_groups();
    let visible = state.visible_rows();

    let Some(ChecksRow::Check(gi, ci)) = visible.get(state.selected) else {
        return;
    };
    let check = &groups[*gi].checks[*ci];

    let msgs: Vec<String> = state
        .cluster_hosts
        .keys()
        .filter_map(|hostname| {
            let (_, msg) = check.host_cell(hostname);
            if msg.is_empty() {
                None
            } else {
                Some(format!("{}: {}", hostname, msg))
            }
        })
        .collect();

    if msgs.is_empty() {
        return;
    }

    frame.render_widget(
        Paragraph::new(format!(" {}", msgs.join(" · "))).style(theme.text_dim()),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sap::checks::{CheckResult, HostResult};
    use std::collections::HashMap;

    fn state_with_checks() -> ChecksState {
        let mut state = ChecksState::new();
        state.cluster_id = Some("c1".into());
        let mk = |id: &str, group: &str, status: HealthStatus| CheckResult {
            id: id.into(),
            description: String::new(),
            group: group.into(),
            hosts: HashMap::from([(
                "h1".to_string(),
                HostResult {
                    result: status,
                    msg: String::new(),
                },
            )]),
        };
        state.groups = checks::group_checks(vec![
            mk("a", "G1", HealthStatus::Critical),
            mk("b", "G1", HealthStatus::Passing),
            mk("c", "G2", HealthStatus::Warning),
        ]);
        state
    }

    #[test]
    fn test_visible_rows_include_headers() {
        let state = state_with_checks();
        let rows = state.visible_rows();
        assert_eq!(
            rows,
            vec![
                ChecksRow::Group(0),
                ChecksRow::Check(0, 0),
                ChecksRow::Check(0, 1),
                ChecksRow::Group(1),
                ChecksRow::Check(1, 0),
            ]
        );
    }

    #[test]
    fn test_collapsed_group_hides_its_checks() {
        let mut state = state_with_checks();
        state.collapsed.insert("G1".to_string());
        let rows = state.visible_rows();
        assert_eq!(
            rows,
            vec![
                ChecksRow::Group(0),
                ChecksRow::Group(1),
                ChecksRow::Check(1, 0),
            ]
        );
    }

    #[test]
    fn test_filter_keeps_empty_group_header_row() {
        let mut state = state_with_checks();
        state.filters = vec![HealthStatus::Warning];
        // G1 loses both checks but its header row stays navigable
        let rows = state.visible_rows();
        assert_eq!(
            rows,
            vec![
                ChecksRow::Group(0),
                ChecksRow::Group(1),
                ChecksRow::Check(1, 0),
            ]
        );
    }

    #[test]
    fn test_filter_double_toggle_restores_rows() {
        let mut state = state_with_checks();
        let before = state.visible_rows();
        types::toggle(HealthStatus::Critical, &mut state.filters);
        assert_ne!(state.visible_rows(), before);
        types::toggle(HealthStatus::Critical, &mut state.filters);
        assert_eq!(state.visible_rows(), before);
    }

    #[test]
    fn test_multi_select_filter() {
        let mut state = state_with_checks();
        state.filters = vec![HealthStatus::Critical, HealthStatus::Warning];
        let groups = state.visible_groups();
        let ids: Vec<&str> = groups
            .iter()
            .flat_map(|g| g.checks.iter().map(|c| c.id.as_str()))
            .collect();
        assert_eq!(ids, vec!["a", "c"]);
    }
}
