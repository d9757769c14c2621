//! Main rendering module for sapmate
//!
//! Renders the complete UI: the (collapsible) navigation sidebar, the
//! active module content, the global status bar and popup overlays.

use crate::app::{App, PopupState};
use crate::sap::lists::PER_PAGE_CHOICES;
use crate::ui::widgets;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Tab definition with index for keybinding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleTab {
    Overview,
    Hosts,
    Clusters,
    SapSystems,
    Checks,
    CheckSettings,
    Settings,
    Help,
}

impl ModuleTab {
    pub fn label(&self) -> &'static str {
        match self {
            ModuleTab::Overview => "Overview",
            ModuleTab::Hosts => "Hosts",
            ModuleTab::Clusters => "Clusters",
            ModuleTab::SapSystems => "SAP Systems",
            ModuleTab::Checks => "Checks",
            ModuleTab::CheckSettings => "Check Settings",
            ModuleTab::Settings => "Settings",
            ModuleTab::Help => "Help",
        }
    }

    /// Keybind hint shown in sidebar
    pub fn key_hint(&self) -> &'static str {
        match self {
            ModuleTab::Overview => "1",
            ModuleTab::Hosts => "2",
            ModuleTab::Clusters => "3",
            ModuleTab::SapSystems => "4",
            ModuleTab::Checks => "5",
            ModuleTab::CheckSettings => "6",
            ModuleTab::Settings => ",",
            ModuleTab::Help => "?",
        }
    }
}

/// Modules shown in the main sidebar area
const SIDEBAR_MODULES: &[ModuleTab] = &[
    ModuleTab::Overview,
    ModuleTab::Hosts,
    ModuleTab::Clusters,
    ModuleTab::SapSystems,
    ModuleTab::Checks,
    ModuleTab::CheckSettings,
];

/// Bottom items (below separator)
const SIDEBAR_BOTTOM: &[ModuleTab] = &[ModuleTab::Settings, ModuleTab::Help];

const SIDEBAR_WIDTH: u16 = 22;
const SIDEBAR_WIDTH_COLLAPSED: u16 = 5;

/// Main render function – entry point for all UI rendering
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();
    let theme = &app.theme;

    // Fill entire background
    frame.render_widget(Block::default().style(theme.block_style()), area);

    let vertical = Layout::vertical([
        Constraint::Min(8),    // sidebar + content
        Constraint::Length(1), // status bar
    ])
    .split(area);

    let sidebar_width = if app.config.collapsed_sidebar {
        SIDEBAR_WIDTH_COLLAPSED
    } else {
        SIDEBAR_WIDTH
    };
    let horizontal = Layout::horizontal([
        Constraint::Length(sidebar_width),
        Constraint::Min(30),
    ])
    .split(vertical[0]);

    render_sidebar(frame, app, horizontal[0]);
    render_module_content(frame, app, horizontal[1]);
    render_status_bar(frame, app, vertical[1]);
    render_popups(frame, app, area);
}

fn render_sidebar(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let collapsed = app.config.collapsed_sidebar;

    let sidebar_block = Block::default()
        .style(theme.block_style())
        .borders(Borders::RIGHT)
        .border_style(theme.border());
    let inner = sidebar_block.inner(area);
    frame.render_widget(sidebar_block, area);

    let mut lines: Vec<Line> = Vec::new();

    if collapsed {
        lines.push(Line::styled(" ☰", Style::default().fg(theme.accent)));
    } else {
        lines.push(Line::from(vec![
            Span::styled(
                " sapmate",
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" v{}", env!("CARGO_PKG_VERSION")),
                Style::default().fg(theme.fg_dim),
            ),
        ]));
    }
    lines.push(Line::raw(""));

    for &module in SIDEBAR_MODULES {
        render_sidebar_item(&mut lines, app, module, collapsed);
    }

    lines.push(Line::raw(""));
    let sep_width = inner.width.saturating_sub(2) as usize;
    lines.push(Line::styled(
        format!(" {}", "─".repeat(sep_width.min(18))),
        Style::default().fg(theme.border),
    ));

    for &module in SIDEBAR_BOTTOM {
        render_sidebar_item(&mut lines, app, module, collapsed);
    }

    frame.render_widget(Paragraph::new(lines).style(theme.block_style()), area);
}

fn render_sidebar_item<'a>(
    lines: &mut Vec<Line<'a>>,
    app: &App,
    module: ModuleTab,
    collapsed: bool,
) {
    let theme = &app.theme;
    let is_active = app.active_tab == module;
    let hint = module.key_hint();

    let label = if collapsed {
        String::new()
    } else {
        format!(" {}", module.label())
    };

    if is_active {
        lines.push(Line::from(vec![
            Span::styled(" ▸ ", Style::default().fg(theme.accent)),
            Span::styled(hint.to_string(), Style::default().fg(theme.accent)),
            Span::styled(
                label,
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD),
            ),
        ]));
    } else {
        lines.push(Line::from(vec![
            Span::styled("   ", Style::default()),
            Span::styled(hint.to_string(), Style::default().fg(theme.fg_dim)),
            Span::styled(label, Style::default().fg(theme.fg)),
        ]));
    }
}

fn render_module_content(frame: &mut Frame, app: &mut App, area: Rect) {
    match app.active_tab {
        ModuleTab::Overview => {
            crate::modules::home::render(frame, &app.home, &app.theme, area);
        }
        ModuleTab::Hosts => {
            crate::modules::lists::render(frame, &app.hosts, &app.theme, area);
        }
        ModuleTab::Clusters => {
            crate::modules::lists::render(frame, &app.clusters, &app.theme, area);
        }
        ModuleTab::SapSystems => {
            crate::modules::lists::render(frame, &app.sapsystems, &app.theme, area);
        }
        ModuleTab::Checks => {
            crate::modules::checks::render(frame, &app.checks, &app.theme, area);
        }
        ModuleTab::CheckSettings => {
            crate::modules::settings::render(frame, &app.check_settings, &app.theme, area);
        }
        ModuleTab::Settings => render_app_settings(frame, app, area),
        ModuleTab::Help => render_help(frame, app, area),
    }
}

fn render_app_settings(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let block = Block::default()
        .style(theme.block_style())
        .title(" Settings ")
        .title_style(theme.title())
        .borders(Borders::ALL)
        .border_style(theme.border_focused());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let server_value = if app.settings_editing && app.settings_selected == 0 {
        format!("{}▏", app.settings_edit_buffer)
    } else {
        app.config.server_url.clone()
    };

    let per_page_values: Vec<String> =
        PER_PAGE_CHOICES.iter().map(|p| p.to_string()).collect();

    let items: [(&str, String); 4] = [
        ("Server URL", server_value),
        ("Theme", app.config.theme.as_str().to_string()),
        (
            "Default page size",
            format!(
                "{}  (choices: {})",
                app.config.per_page,
                per_page_values.join("/")
            ),
        ),
        (
            "Collapsed sidebar",
            if app.config.collapsed_sidebar {
                "yes".to_string()
            } else {
                "no".to_string()
            },
        ),
    ];

    let mut lines = vec![Line::raw("")];
    for (i, (label, value)) in items.iter().enumerate() {
        let selected = i == app.settings_selected;
        let marker = if selected { " ▸ " } else { "   " };
        let label_style = if selected {
            theme.selected()
        } else {
            theme.text()
        };
        lines.push(Line::from(vec![
            Span::styled(marker, Style::default().fg(theme.accent)),
            Span::styled(format!("{:<20}", label), label_style),
            Span::styled(value.clone(), theme.text_dim()),
        ]));
    }
    lines.push(Line::raw(""));
    lines.push(Line::styled(
        "  enter: edit/cycle · changing the server reloads every view",
        theme.text_dim(),
    ));

    frame.render_widget(Paragraph::new(lines).style(theme.block_style()), inner);
}

fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let block = Block::default()
        .style(theme.block_style())
        .title(" Help ")
        .title_style(theme.title())
        .borders(Borders::ALL)
        .border_style(theme.border_focused());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = vec![
        Line::raw(""),
        Line::styled("  Global", theme.title()),
        Line::styled("    1-6 , ?      switch view", theme.text()),
        Line::styled("    b            collapse/expand sidebar", theme.text()),
        Line::styled("    q            quit", theme.text()),
        Line::raw(""),
        Line::styled("  Lists (Hosts / Clusters / SAP Systems)", theme.title()),
        Line::styled("    j/k          move · h/l page · +/- page size", theme.text()),
        Line::styled("    f            filter by health / SID / tag", theme.text()),
        Line::styled("    /            search by name", theme.text()),
        Line::styled("    t / x        add / remove a tag", theme.text()),
        Line::styled("    enter        open cluster checks (Clusters)", theme.text()),
        Line::raw(""),
        Line::styled("  Checks", theme.title()),
        Line::styled("    ←/→ + space  toggle status filters · a see all", theme.text()),
        Line::styled("    enter        collapse/expand a group", theme.text()),
        Line::styled("    s            open the check settings editor", theme.text()),
        Line::raw(""),
        Line::styled("  Everywhere: r refreshes the current view", theme.text_dim()),
    ];

    frame.render_widget(Paragraph::new(lines).style(theme.block_style()), inner);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let left = match app.active_tab {
        ModuleTab::Overview => " j/k move · r refresh",
        ModuleTab::Hosts | ModuleTab::SapSystems => {
            " j/k move · h/l page · f filter · / search · t/x tags"
        }
        ModuleTab::Clusters => " j/k move · enter checks · f filter · t/x tags",
        ModuleTab::Checks => " ←/→+space filter · enter fold · s settings",
        ModuleTab::CheckSettings => " space toggle · [ ] tab · s save",
        ModuleTab::Settings => " j/k move · enter change",
        ModuleTab::Help => " q quit",
    };
    let right = format!("{} ", app.client.base_url());
    widgets::render_status_bar(frame, left, &right, &app.theme, area);
}

fn render_popups(frame: &mut Frame, app: &App, area: Rect) {
    match &app.popup {
        PopupState::Error { title, message } => {
            widgets::render_error_popup(frame, title, message, &app.theme, area);
        }
        PopupState::None => {}
    }

    if let Some(msg) = &app.flash_message {
        widgets::render_flash_message(frame, &msg.text, msg.is_error, &app.theme, area);
    }
}
