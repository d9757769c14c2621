//! Application state and event handling for sapmate

use crate::config::Config;
use crate::modules::checks::ChecksState;
use crate::modules::home::HomeState;
use crate::modules::lists::ResourceListState;
use crate::modules::settings::SettingsState;
use crate::sap::lists::{ResourceKind, PER_PAGE_CHOICES};
use crate::sap::Client;
use crate::types::{self, FlashMessage};
use crate::ui::{ModuleTab, Theme};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

/// Main application state
pub struct App {
    pub should_quit: bool,
    pub active_tab: ModuleTab,
    pub config: Config,
    pub theme: Theme,
    pub client: Client,
    pub popup: PopupState,
    pub flash_message: Option<FlashMessage>,

    // Settings view
    pub settings_selected: usize,
    pub settings_editing: bool,
    pub settings_edit_buffer: String,

    // Module states
    pub home: HomeState,
    pub hosts: ResourceListState,
    pub clusters: ResourceListState,
    pub sapsystems: ResourceListState,
    pub checks: ChecksState,
    pub check_settings: SettingsState,
}

#[derive(Debug, Clone)]
pub enum PopupState {
    None,
    Error { title: String, message: String },
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let theme = Theme::from_name(config.theme);
        let client = Client::new(&config.server_url);
        let per_page = config.per_page;

        Ok(Self {
            should_quit: false,
            active_tab: ModuleTab::Overview,
            config,
            theme,
            client,
            popup: PopupState::None,
            flash_message: None,
            settings_selected: 0,
            settings_editing: false,
            settings_edit_buffer: String::new(),
            home: HomeState::new(),
            hosts: ResourceListState::new(ResourceKind::Hosts, per_page),
            clusters: ResourceListState::new(ResourceKind::Clusters, per_page),
            sapsystems: ResourceListState::new(ResourceKind::SapSystems, per_page),
            checks: ChecksState::new(),
            check_settings: SettingsState::new(),
        })
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        types::expire_flash(&mut self.flash_message, 3);

        // App-level popup handling
        if let PopupState::Error { .. } = &self.popup {
            match key.code {
                KeyCode::Char('o') | KeyCode::Enter | KeyCode::Esc => {
                    self.popup = PopupState::None;
                }
                _ => {}
            }
            return Ok(());
        }

        // Settings text editing captures ALL keys
        if self.settings_editing {
            self.handle_settings_edit_key(key)?;
            return Ok(());
        }

        // Let the active module consume the key first
        let consumed = self.try_module_key(key)?;
        if !consumed {
            self.handle_global_key(key)?;
        }

        // A list view asked to open a cluster's check results
        if let Some((cluster_id, cluster_name)) = self.clusters.take_open_request() {
            self.checks.open(&self.client, cluster_id, cluster_name);
            self.active_tab = ModuleTab::Checks;
        }

        // The checks view asked for the settings editor
        if self.checks.settings_requested {
            self.checks.settings_requested = false;
            if let Some(cluster_id) = self.checks.cluster_id.clone() {
                let cluster_name = self.checks.cluster_name.clone();
                self.check_settings.open(&self.client, cluster_id, cluster_name);
                self.active_tab = ModuleTab::CheckSettings;
            }
        }

        Ok(())
    }

    fn try_module_key(&mut self, key: KeyEvent) -> Result<bool> {
        match self.active_tab {
            ModuleTab::Overview => {
                if is_global_key(key) {
                    return Ok(false);
                }
                self.home.handle_key(key, &self.client)
            }
            ModuleTab::Hosts => Self::list_key(&mut self.hosts, key, &self.client),
            ModuleTab::Clusters => Self::list_key(&mut self.clusters, key, &self.client),
            ModuleTab::SapSystems => Self::list_key(&mut self.sapsystems, key, &self.client),
            ModuleTab::Checks => {
                if is_global_key(key) {
                    return Ok(false);
                }
                self.checks.handle_key(key, &self.client)
            }
            ModuleTab::CheckSettings => {
                // editing a connection user captures everything
                if self.check_settings.editing {
                    return self.check_settings.handle_key(key, &self.client);
                }
                if is_global_key(key) {
                    return Ok(false);
                }
                self.check_settings.handle_key(key, &self.client)
            }
            _ => Ok(false),
        }
    }

    /// List modules capture every key while a filter popup, search input
    /// or tag widget is open.
    fn list_key(state: &mut ResourceListState, key: KeyEvent, client: &Client) -> Result<bool> {
        if state.captures_keys() {
            state.handle_key(key, client)?;
            return Ok(true);
        }
        if is_global_key(key) {
            return Ok(false);
        }
        state.handle_key(key, client)
    }

    fn handle_global_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                return Ok(());
            }
            KeyCode::Char('1') => self.active_tab = ModuleTab::Overview,
            KeyCode::Char('2') => self.active_tab = ModuleTab::Hosts,
            KeyCode::Char('3') => self.active_tab = ModuleTab::Clusters,
            KeyCode::Char('4') => self.active_tab = ModuleTab::SapSystems,
            KeyCode::Char('5') => self.active_tab = ModuleTab::Checks,
            KeyCode::Char('6') => self.active_tab = ModuleTab::CheckSettings,
            KeyCode::Char(',') => self.active_tab = ModuleTab::Settings,
            KeyCode::Char('?') => self.active_tab = ModuleTab::Help,
            KeyCode::Char('b') => {
                self.config.collapsed_sidebar = !self.config.collapsed_sidebar;
                let _ = self.config.save();
            }
            _ => {}
        }

        if self.active_tab == ModuleTab::Settings {
            self.handle_settings_key(key)?;
        }

        // Lazy-load when entering a data view
        match self.active_tab {
            ModuleTab::Overview => self.home.ensure_loaded(&self.client),
            ModuleTab::Hosts => self.hosts.ensure_loaded(&self.client),
            ModuleTab::Clusters => self.clusters.ensure_loaded(&self.client),
            ModuleTab::SapSystems => self.sapsystems.ensure_loaded(&self.client),
            ModuleTab::Checks => {
                if self.checks.cluster_id.is_none() {
                    self.flash_message = Some(FlashMessage::new(
                        "Open a cluster from the Clusters view first".to_string(),
                        false,
                    ));
                }
            }
            _ => {}
        }

        Ok(())
    }

    /// Drain background work. Called once per tick from the main loop.
    pub fn update_timers(&mut self) -> Result<()> {
        self.home.poll();
        self.hosts.poll(&self.client);
        self.clusters.poll(&self.client);
        self.sapsystems.poll(&self.client);
        self.checks.poll();
        self.check_settings.poll();

        types::expire_flash(&mut self.flash_message, 3);
        types::expire_flash(&mut self.home.flash_message, 3);
        types::expire_flash(&mut self.hosts.flash_message, 3);
        types::expire_flash(&mut self.clusters.flash_message, 3);
        types::expire_flash(&mut self.sapsystems.flash_message, 3);
        types::expire_flash(&mut self.checks.flash_message, 3);
        types::expire_flash(&mut self.check_settings.flash_message, 3);

        Ok(())
    }

    fn handle_settings_key(&mut self, key: KeyEvent) -> Result<()> {
        const SETTINGS_COUNT: usize = 4;
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if self.settings_selected < SETTINGS_COUNT - 1 {
                    self.settings_selected += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.settings_selected = self.settings_selected.saturating_sub(1);
            }
            KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => {
                match self.settings_selected {
                    // Server URL (text editable)
                    0 => {
                        self.settings_editing = true;
                        self.settings_edit_buffer = self.config.server_url.clone();
                        return Ok(());
                    }
                    1 => {
                        self.config.theme = self.config.theme.next();
                        self.theme = Theme::from_name(self.config.theme);
                    }
                    2 => {
                        let idx = PER_PAGE_CHOICES
                            .iter()
                            .position(|&p| p == self.config.per_page)
                            .unwrap_or(0);
                        self.config.per_page = PER_PAGE_CHOICES[(idx + 1) % PER_PAGE_CHOICES.len()];
                    }
                    3 => {
                        self.config.collapsed_sidebar = !self.config.collapsed_sidebar;
                    }
                    _ => {}
                }
                self.save_config();
            }
            _ => {}
        }
        Ok(())
    }

    /// Handle key events while editing the server URL.
    fn handle_settings_edit_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => {
                self.settings_editing = false;
                self.settings_edit_buffer.clear();
            }
            KeyCode::Enter => {
                let value = self.settings_edit_buffer.trim().to_string();
                self.settings_editing = false;
                self.settings_edit_buffer.clear();
                if !value.is_empty() && value != self.config.server_url {
                    self.config.server_url = value;
                    self.apply_server_url();
                }
                self.save_config();
            }
            KeyCode::Backspace => {
                self.settings_edit_buffer.pop();
            }
            KeyCode::Char(c) => {
                self.settings_edit_buffer.push(c);
            }
            _ => {}
        }
        Ok(())
    }

    /// Point every view at the new server and drop the fetched state.
    fn apply_server_url(&mut self) {
        self.client = Client::new(&self.config.server_url);
        let per_page = self.config.per_page;
        self.home = HomeState::new();
        self.hosts = ResourceListState::new(ResourceKind::Hosts, per_page);
        self.clusters = ResourceListState::new(ResourceKind::Clusters, per_page);
        self.sapsystems = ResourceListState::new(ResourceKind::SapSystems, per_page);
        self.checks = ChecksState::new();
        self.check_settings = SettingsState::new();
    }

    fn save_config(&mut self) {
        if let Err(e) = self.config.save() {
            self.popup = PopupState::Error {
                title: "Saving settings failed".to_string(),
                message: e.to_string(),
            };
        } else {
            self.flash_message = Some(FlashMessage::new("Settings saved".to_string(), false));
        }
    }
}

/// Keys that always stay global: tab switching, sidebar and quit.
fn is_global_key(key: KeyEvent) -> bool {
    matches!(
        key.code,
        KeyCode::Char('1'..='6') | KeyCode::Char(',') | KeyCode::Char('?') | KeyCode::Char('q')
            | KeyCode::Char('b')
    )
}
