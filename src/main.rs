//! sapmate — SAP cluster monitoring TUI
//!
//! A terminal client for a SAP-cluster monitoring server:
//! - Health overview across SAP systems
//! - Hosts / clusters / SAP systems lists with filters and tags
//! - Per-cluster check results and check settings
//!
//! Usage: sapmate [--help] [--version]

mod app;
mod config;
mod modules;
mod sap;
mod types;
mod ui;

use anyhow::{Context, Result};
use app::App;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io::stdout;
use std::time::Duration;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    if args.iter().any(|a| a == "--version" || a == "-v") {
        println!("sapmate {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if let Err(e) = run_app() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

fn print_help() {
    println!(
        r#"sapmate - SAP cluster monitoring TUI

USAGE:
    sapmate [OPTIONS]

OPTIONS:
    -h, --help       Print help information
    -v, --version    Print version information

KEYBINDINGS:
    1-6              Switch views
    j/k              Navigate up/down
    h/l              Previous/next page (list views)
    f                Filter, / search, t/x tags (list views)
    Enter            Select/confirm
    b                Collapse/expand sidebar
    q                Quit

VIEWS:
    [1] Overview         SAP systems health at a glance
    [2] Hosts            Host list with health, SIDs and tags
    [3] Clusters         Pacemaker clusters; Enter opens the checks
    [4] SAP Systems      SAP systems list
    [5] Checks           Grouped check results per cluster host
    [6] Check Settings   Check selection & connection settings
    [,] Settings         Server URL, theme, page size
    [?] Help             Keybindings

CONFIG:
    ~/.config/sapmate/config.toml
"#
    );
}

fn run_app() -> Result<()> {
    let config = config::Config::load().context("Failed to load configuration")?;

    let mut app = App::new(config).context("Failed to initialize application")?;

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("Failed to setup terminal")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    // Install panic handler so terminal is restored on panic
    // (without this, a panic leaves the terminal in raw mode + alternate screen)
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(std::io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        let _ = execute!(std::io::stdout(), crossterm::cursor::Show);
        original_hook(info);
    }));

    let result = main_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("Failed to restore terminal")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

fn main_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    // Fetch the overview right away; everything else loads lazily
    app.home.ensure_loaded(&app.client);

    loop {
        terminal.draw(|frame| {
            ui::render(frame, app);
        })?;

        // Drain background fetches, expire flash messages
        app.update_timers()?;

        // Poll for events with timeout (keeps spinners and flashes moving)
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key)?;
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_does_not_panic() {
        print_help();
    }
}
