use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::{debug, info, warn};
use ratatui::{
    Frame, Terminal,
    layout::{Constraint, Direction, Layout, Rect, Size},
};

use crate::document::DocumentFormat;
use crate::event_source::EventSource;
use crate::inputs::{AppCommand, InputOutcome, map_key};
use crate::notification::NotificationManager;
use crate::render::adjust::BRIGHTNESS_STEP;
use crate::render::{PageImage, RenderParams, RenderResponse, RenderService, RequestId};
use crate::settings::{LastSession, SettingsStore, WindowGeometry};
use crate::terminal::{CellSize, TerminalEnv};
use crate::theme::Base16Palette;
use crate::viewer::{Command, Effect, ViewerState};
use crate::widget::{
    HalfBlockRaster, HelpPopup, HelpPopupAction, InfoPopup, ListEntry, ListKind, ListPopup,
    ListPopupAction, ListTarget, PageView, Pan, Prompt, PromptKind, SettingChange, SettingsAction,
    SettingsPopup, StatusInfo, render_status_bar, render_toolbar,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Quit,
}

enum Popup {
    Help(HelpPopup),
    List(ListPopup),
    Info(InfoPopup),
    Settings(SettingsPopup),
}

/// The terminal front end: routes keys to the viewer, owns the render
/// service of the open document and draws the result.
pub struct App {
    viewer: ViewerState,
    settings: SettingsStore,
    pub notifications: NotificationManager,
    render: Option<RenderService>,
    pending_render: Option<RequestId>,
    page_image: Option<Arc<PageImage>>,
    raster: Option<HalfBlockRaster>,
    pan: Pan,
    popup: Option<Popup>,
    prompt: Option<Prompt>,
    cell_size: CellSize,
    terminal_env: TerminalEnv,
    page_area: Rect,
}

impl App {
    /// App for the current terminal
    pub fn new(settings: SettingsStore) -> Self {
        Self::with_terminal(settings, CellSize::detect(), TerminalEnv::read())
    }

    pub fn with_terminal(
        mut settings: SettingsStore,
        cell_size: CellSize,
        terminal_env: TerminalEnv,
    ) -> Self {
        let mut notifications = NotificationManager::new();
        if let Some(e) = settings.take_load_error() {
            notifications.warn(format!("Settings reset to defaults: {e}"));
        }

        let viewer = ViewerState::new(settings.settings().default_zoom.to_zoom());
        Self {
            viewer,
            settings,
            notifications,
            render: None,
            pending_render: None,
            page_image: None,
            raster: None,
            pan: Pan::default(),
            popup: None,
            prompt: None,
            cell_size,
            terminal_env,
            page_area: Rect::default(),
        }
    }

    pub fn viewer(&self) -> &ViewerState {
        &self.viewer
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    /// Newest rendered page of the open document
    pub fn page_image(&self) -> Option<&PageImage> {
        self.page_image.as_deref()
    }

    pub fn is_rendering(&self) -> bool {
        self.pending_render.is_some()
    }

    pub fn has_popup(&self) -> bool {
        self.popup.is_some()
    }

    pub fn prompt_kind(&self) -> Option<PromptKind> {
        self.prompt.as_ref().map(|p| p.kind)
    }

    pub fn pan(&self) -> Pan {
        self.pan
    }

    fn palette(&self) -> &'static Base16Palette {
        self.settings
            .settings()
            .theme
            .resolve(self.terminal_env.colorfgbg.as_deref())
    }

    /// Open a document; failures become a status message
    pub fn open_path(&mut self, path: &Path) -> bool {
        self.execute(Command::Open(path.to_path_buf()))
    }

    /// Reopen the last document at its last page when enabled
    pub fn restore_session(&mut self) -> bool {
        let settings = self.settings.settings();
        if !settings.restore_session {
            return false;
        }
        let Some(LastSession { path, page }) = settings.last_session.clone() else {
            return false;
        };
        if !path.exists() {
            debug!("Last session document {path:?} is gone");
            return false;
        }

        info!("Restoring session {path:?} at page {}", page + 1);
        if !self.open_path(&path) {
            return false;
        }
        if page > 0 && page < self.viewer.page_count() {
            self.execute(Command::GotoPage(page));
        }
        true
    }

    /// Remember the open document and terminal size for the next launch
    pub fn save_session(&mut self, size: Option<Size>) {
        let session = self.viewer.document().map(|doc| LastSession {
            path: doc.path().to_path_buf(),
            page: self.viewer.current_page(),
        });
        self.settings.record_session(session);

        if let Some(size) = size {
            let window = WindowGeometry {
                width: size.width,
                height: size.height,
            };
            self.settings.set_window_geometry(window);
        }
    }

    /// Recompute the page view area and viewport for a terminal size
    pub fn handle_resize(&mut self, size: Size) {
        let area = Rect::new(0, 0, size.width, size.height);
        let page_area = Self::split_screen(area)[1];
        if page_area == self.page_area {
            return;
        }
        self.page_area = page_area;
        self.execute(Command::SetViewport(self.cell_size.viewport(page_area)));
        if let Some(image) = self.page_image.clone() {
            self.raster = Some(HalfBlockRaster::from_image(&image.image, self.cell_size));
        }
    }

    fn split_screen(area: Rect) -> [Rect; 3] {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);
        [chunks[0], chunks[1], chunks[2]]
    }

    /// Apply a viewer command; errors are reported, never fatal
    fn execute(&mut self, command: Command) -> bool {
        match self.viewer.apply(command) {
            Ok(effects) => {
                self.handle_effects(effects);
                true
            }
            Err(e) => {
                warn!("{e}");
                self.notifications.error(e.to_string());
                false
            }
        }
    }

    fn handle_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::DocumentOpened(path) => self.document_opened(&path),
                Effect::DocumentClosed => {
                    self.render = None;
                    self.clear_page();
                    self.notifications.info("Document closed");
                }
                Effect::RenderCurrentPage => self.request_render(),
                Effect::SearchUpdated => {
                    let search = self.viewer.search();
                    if search.is_active() && search.matches.is_empty() {
                        let message = format!("No matches for \"{}\"", search.query);
                        self.notifications.warn(message);
                    }
                }
            }
        }
    }

    fn document_opened(&mut self, path: &Path) {
        // The previous worker must release its document first
        self.render = None;
        self.clear_page();
        self.render = Some(RenderService::new(path));
        self.settings.add_recent_file(path);

        if let Some(doc) = self.viewer.document() {
            let message = format!("Opened {} ({} pages)", doc.display_name(), doc.page_count());
            self.notifications.info(message);
        }
    }

    fn clear_page(&mut self) {
        self.pending_render = None;
        self.page_image = None;
        self.raster = None;
        self.pan = Pan::default();
    }

    fn render_params(&self) -> RenderParams {
        let settings = self.settings.settings();
        RenderParams {
            zoom: self.viewer.zoom().factor(),
            brightness: settings.brightness,
            night_mode: settings.night_mode,
        }
    }

    fn request_render(&mut self) {
        if !self.viewer.is_open() {
            return;
        }
        let params = self.render_params();
        let page = self.viewer.current_page();
        if let Some(service) = self.render.as_mut() {
            self.pending_render = Some(service.request_page(page, params));
        }
    }

    /// Take the newest finished render, returns whether anything changed
    pub fn poll_renders(&mut self) -> bool {
        let response = self.render.as_mut().and_then(RenderService::poll);
        match response {
            Some(response) => {
                self.accept_render(response);
                true
            }
            None => false,
        }
    }

    /// Block until the pending render finishes; for tests and startup
    pub fn wait_for_render(&mut self, timeout: Duration) -> bool {
        if self.pending_render.is_none() {
            return false;
        }
        let response = self.render.as_mut().and_then(|s| s.wait(timeout));
        match response {
            Some(response) => {
                self.accept_render(response);
                true
            }
            None => false,
        }
    }

    fn accept_render(&mut self, response: RenderResponse) {
        match response {
            RenderResponse::Page { id, data } => {
                debug!("Render {id:?} done: page {} {}x{}", data.page, data.width(), data.height());
                let new_page = self
                    .page_image
                    .as_ref()
                    .is_none_or(|previous| previous.page != data.page);
                if new_page {
                    self.pan = Pan::default();
                }
                self.raster = Some(HalfBlockRaster::from_image(&data.image, self.cell_size));
                self.page_image = Some(data);
                self.pending_render = None;
            }
            RenderResponse::Error { id, error } => {
                warn!("Render {id:?} failed: {error}");
                self.pending_render = None;
                self.notifications.error(format!("Cannot render page: {error}"));
            }
            RenderResponse::Unavailable(fault) => {
                warn!("Renderer unavailable, closing document: {fault}");
                self.execute(Command::Close);
                self.notifications.error(format!("Cannot render document: {fault}"));
            }
            RenderResponse::Cancelled(_) => {}
        }
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) -> Option<AppAction> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('q') {
            return Some(AppAction::Quit);
        }

        if let Some(prompt) = self.prompt.as_mut() {
            match prompt.input.handle_key(&key) {
                InputOutcome::Editing => {}
                InputOutcome::Cancel => self.prompt = None,
                InputOutcome::Submit(text) => {
                    let kind = prompt.kind;
                    self.prompt = None;
                    self.submit_prompt(kind, &text);
                }
            }
            return None;
        }

        if self.popup.is_some() {
            self.handle_popup_key(&key);
            return None;
        }

        let command = map_key(&key)?;
        self.run_command(command)
    }

    fn handle_popup_key(&mut self, key: &KeyEvent) {
        let Some(popup) = self.popup.as_mut() else {
            return;
        };
        match popup {
            Popup::Help(help) => {
                if let Some(HelpPopupAction::Close) = help.handle_key(key) {
                    self.popup = None;
                }
            }
            Popup::Info(_) => self.popup = None,
            Popup::List(list) => {
                if let Some(action) = list.handle_key(key) {
                    self.handle_list_action(action);
                }
            }
            Popup::Settings(popup) => {
                if let Some(action) = popup.handle_key(key, self.settings.settings()) {
                    self.handle_settings_action(action);
                }
            }
        }
    }

    fn handle_settings_action(&mut self, action: SettingsAction) {
        match action {
            SettingsAction::Close => self.popup = None,
            SettingsAction::EditDefaultDirectory => {
                let current = self
                    .settings
                    .settings()
                    .default_directory
                    .as_ref()
                    .map(|dir| dir.display().to_string())
                    .unwrap_or_default();
                self.prompt = Some(Prompt::with_text(PromptKind::DefaultDirectory, current));
            }
            SettingsAction::Apply(change) => self.apply_setting(change),
        }
    }

    fn apply_setting(&mut self, change: SettingChange) {
        debug!("Settings change: {change:?}");
        match change {
            SettingChange::Theme(theme) => self.settings.set_theme(theme),
            SettingChange::DefaultZoom(zoom) => {
                self.settings.set_default_zoom(zoom);
                self.viewer.set_default_zoom(zoom.to_zoom());
            }
            SettingChange::NightMode(on) => {
                self.settings.set_night_mode(on);
                self.request_render();
            }
            SettingChange::Brightness(brightness) => {
                self.settings.set_brightness(brightness);
                self.request_render();
            }
            SettingChange::RestoreSession(on) => self.settings.set_restore_session(on),
            SettingChange::RecentFilesLimit(limit) => self.settings.set_recent_files_limit(limit),
            SettingChange::ClearRecentFiles => {
                self.settings.clear_recent_files();
                self.notifications.info("Recent files cleared");
            }
        }
    }

    fn handle_list_action(&mut self, action: ListPopupAction) {
        match action {
            ListPopupAction::Close => self.popup = None,
            ListPopupAction::Open(target) => {
                self.popup = None;
                match target {
                    ListTarget::File(path) => {
                        self.open_path(&path);
                    }
                    ListTarget::Bookmark { path, page } => {
                        let is_current = self.viewer.document().is_some_and(|d| d.path() == path);
                        if is_current || self.open_path(&path) {
                            self.execute(Command::GotoPage(page));
                        }
                    }
                    ListTarget::Page(page) => {
                        self.execute(Command::GotoPage(page));
                    }
                }
            }
            ListPopupAction::Delete(target) => {
                match &target {
                    ListTarget::File(path) => self.settings.remove_recent_file(path),
                    ListTarget::Bookmark { path, page } => {
                        self.settings.remove_bookmark(path, *page);
                    }
                    ListTarget::Page(_) => return,
                }
                if let Some(Popup::List(list)) = self.popup.as_mut() {
                    list.remove_selected();
                }
            }
        }
    }

    fn require_document(&mut self) -> bool {
        if self.viewer.is_open() {
            true
        } else {
            self.notifications
                .error(crate::error::ViewerError::NoDocument.to_string());
            false
        }
    }

    fn run_command(&mut self, command: AppCommand) -> Option<AppAction> {
        match command {
            AppCommand::Quit => return Some(AppAction::Quit),
            AppCommand::OpenPrompt => {
                let start = self.open_prompt_start();
                self.prompt = Some(Prompt::with_text(PromptKind::Open, start));
            }
            AppCommand::CloseDocument => {
                self.execute(Command::Close);
            }
            AppCommand::PrevPage => {
                self.execute(Command::PrevPage);
            }
            AppCommand::NextPage => {
                self.execute(Command::NextPage);
            }
            AppCommand::FirstPage => {
                self.execute(Command::FirstPage);
            }
            AppCommand::LastPage => {
                self.execute(Command::LastPage);
            }
            AppCommand::GotoPrompt => {
                if self.require_document() {
                    self.prompt = Some(Prompt::new(PromptKind::GotoPage));
                }
            }
            AppCommand::ZoomIn => {
                self.execute(Command::ZoomIn);
            }
            AppCommand::ZoomOut => {
                self.execute(Command::ZoomOut);
            }
            AppCommand::ResetZoom => {
                self.execute(Command::SetZoom(1.0));
            }
            AppCommand::FitWidth => {
                self.execute(Command::FitWidth);
            }
            AppCommand::FitPage => {
                self.execute(Command::FitPage);
            }
            AppCommand::FindPrompt => {
                if self.require_document() {
                    let query = self.viewer.search().query.clone();
                    self.prompt = Some(Prompt::with_text(PromptKind::Find, query));
                }
            }
            AppCommand::NextMatch | AppCommand::PrevMatch => {
                if !self.viewer.search().is_active() {
                    self.notifications.info("No active search, press / to find");
                } else if command == AppCommand::NextMatch {
                    self.execute(Command::NextMatch);
                } else {
                    self.execute(Command::PrevMatch);
                }
            }
            AppCommand::ToggleBookmark => self.toggle_bookmark(),
            AppCommand::BookmarkLabelPrompt => {
                if self.require_document() {
                    let label = self.current_bookmark_label().unwrap_or_default();
                    self.prompt = Some(Prompt::with_text(PromptKind::BookmarkLabel, label));
                }
            }
            AppCommand::ShowBookmarks => self.show_bookmarks(),
            AppCommand::ShowRecent => self.show_recent(),
            AppCommand::ShowOutline => self.show_outline(),
            AppCommand::ShowInfo => {
                if let Some(doc) = self.viewer.document() {
                    self.popup = Some(Popup::Info(InfoPopup::for_document(doc)));
                } else {
                    self.require_document();
                }
            }
            AppCommand::ShowHelp => self.popup = Some(Popup::Help(HelpPopup::new())),
            AppCommand::ShowSettings => self.popup = Some(Popup::Settings(SettingsPopup::new())),
            AppCommand::CycleTheme => {
                let theme = self.settings.cycle_theme();
                self.notifications.info(format!("Theme: {}", theme.name()));
            }
            AppCommand::ToggleNightMode => {
                let on = self.settings.toggle_night_mode();
                self.notifications
                    .info(if on { "Night mode on" } else { "Night mode off" });
                self.request_render();
            }
            AppCommand::BrightnessDown | AppCommand::BrightnessUp => {
                let delta = if command == AppCommand::BrightnessUp {
                    BRIGHTNESS_STEP
                } else {
                    -BRIGHTNESS_STEP
                };
                let brightness = self.settings.adjust_brightness(delta);
                self.notifications
                    .info(format!("Brightness {:.0}%", brightness * 100.0));
                self.request_render();
            }
            AppCommand::PanUp | AppCommand::PanDown | AppCommand::PanLeft | AppCommand::PanRight => {
                self.pan_by(command);
            }
            AppCommand::Dismiss => {
                if !self.notifications.dismiss_current() && self.viewer.search().is_active() {
                    self.execute(Command::Search(String::new()));
                }
            }
        }
        None
    }

    fn open_prompt_start(&self) -> String {
        let dir = self
            .settings
            .settings()
            .default_directory
            .clone()
            .or_else(|| {
                self.viewer
                    .document()
                    .and_then(|d| d.path().parent().map(Path::to_path_buf))
            });
        match dir {
            Some(dir) => format!("{}{}", dir.display(), std::path::MAIN_SEPARATOR),
            None => String::new(),
        }
    }

    fn submit_prompt(&mut self, kind: PromptKind, text: &str) {
        match kind {
            PromptKind::Open => {
                let text = text.trim();
                if text.is_empty() {
                    return;
                }
                let path = expand_home(text);
                if self.open_path(&path) {
                    let dir = self
                        .viewer
                        .document()
                        .and_then(|d| d.path().parent().map(Path::to_path_buf));
                    if dir != self.settings.settings().default_directory {
                        self.settings.set_default_directory(dir);
                    }
                }
            }
            PromptKind::Find => {
                self.execute(Command::Search(text.to_string()));
            }
            PromptKind::GotoPage => match text.trim().parse::<usize>() {
                Ok(number) if number >= 1 => {
                    self.execute(Command::GotoPage(number - 1));
                }
                _ => self
                    .notifications
                    .error(format!("Not a page number: {}", text.trim())),
            },
            PromptKind::BookmarkLabel => {
                let Some(path) = self.viewer.document().map(|d| d.path().to_path_buf()) else {
                    return;
                };
                let page = self.viewer.current_page();
                let label = Some(text.trim().to_string()).filter(|l| !l.is_empty());
                self.settings.add_bookmark(&path, page, label);
                self.notifications
                    .info(format!("Bookmarked page {}", page + 1));
            }
            PromptKind::DefaultDirectory => {
                let text = text.trim();
                if text.is_empty() {
                    self.settings.set_default_directory(None);
                    return;
                }
                let dir = expand_home(text);
                if dir.is_dir() {
                    self.settings.set_default_directory(Some(dir));
                } else {
                    self.notifications
                        .error(format!("Not a directory: {}", dir.display()));
                }
            }
        }
    }

    fn current_bookmark_label(&self) -> Option<String> {
        let doc = self.viewer.document()?;
        let page = self.viewer.current_page();
        self.settings
            .bookmarks_for(doc.path())
            .into_iter()
            .find(|b| b.page == page)
            .and_then(|b| b.label.clone())
    }

    fn is_bookmarked(&self) -> bool {
        self.viewer.document().is_some_and(|doc| {
            self.settings
                .settings()
                .bookmarks
                .contains(doc.path(), self.viewer.current_page())
        })
    }

    fn toggle_bookmark(&mut self) {
        let Some(path) = self.viewer.document().map(|d| d.path().to_path_buf()) else {
            self.require_document();
            return;
        };
        let page = self.viewer.current_page();
        let message = if self.settings.toggle_bookmark(&path, page) {
            format!("Bookmarked page {}", page + 1)
        } else {
            format!("Removed bookmark on page {}", page + 1)
        };
        self.notifications.info(message);
    }

    fn show_bookmarks(&mut self) {
        let entries: Vec<ListEntry> = self
            .settings
            .settings()
            .bookmarks
            .sorted()
            .into_iter()
            .map(|b| {
                let detail = format!("{} p.{}", file_name(&b.path), b.page + 1);
                ListEntry::new(
                    b.title(),
                    detail,
                    ListTarget::Bookmark {
                        path: b.path.clone(),
                        page: b.page,
                    },
                )
            })
            .collect();

        let mut list = ListPopup::new(ListKind::Bookmarks, entries);
        if let Some(doc) = self.viewer.document() {
            list.select_target(&ListTarget::Bookmark {
                path: doc.path().to_path_buf(),
                page: self.viewer.current_page(),
            });
        }
        self.popup = Some(Popup::List(list));
    }

    fn show_recent(&mut self) {
        let entries = self
            .settings
            .settings()
            .recent_files
            .iter()
            .map(|path| {
                let dir = path
                    .parent()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                ListEntry::new(file_name(path), dir, ListTarget::File(path.to_path_buf()))
            })
            .collect();
        self.popup = Some(Popup::List(ListPopup::new(ListKind::Recent, entries)));
    }

    fn show_outline(&mut self) {
        let Some(doc) = self.viewer.document() else {
            self.require_document();
            return;
        };
        if doc.format() != DocumentFormat::Pdf {
            self.notifications
                .info(format!("{} files have no outline", doc.format()));
            return;
        }

        let outline = doc.outline();
        // Land on the last heading at or before the current page
        let current = self.viewer.current_page();
        let nearest = outline
            .iter()
            .map(|entry| entry.page)
            .filter(|page| *page <= current)
            .max();

        let entries: Vec<ListEntry> = outline
            .into_iter()
            .map(|entry| {
                let detail = format!("p.{}", entry.page + 1);
                ListEntry {
                    depth: entry.level,
                    ..ListEntry::new(entry.title, detail, ListTarget::Page(entry.page))
                }
            })
            .collect();

        let mut list = ListPopup::new(ListKind::Outline, entries);
        if let Some(page) = nearest {
            list.select_target(&ListTarget::Page(page));
        }
        self.popup = Some(Popup::List(list));
    }

    fn pan_by(&mut self, command: AppCommand) {
        let Some(raster) = self.raster.as_ref() else {
            return;
        };
        let step_y = (self.page_area.height / 4).max(1);
        let step_x = (self.page_area.width / 4).max(1);
        let pan = match command {
            AppCommand::PanUp => Pan {
                y: self.pan.y.saturating_sub(step_y),
                ..self.pan
            },
            AppCommand::PanDown => Pan {
                y: self.pan.y.saturating_add(step_y),
                ..self.pan
            },
            AppCommand::PanLeft => Pan {
                x: self.pan.x.saturating_sub(step_x),
                ..self.pan
            },
            AppCommand::PanRight => Pan {
                x: self.pan.x.saturating_add(step_x),
                ..self.pan
            },
            _ => self.pan,
        };
        self.pan = pan.clamp_to(raster, self.page_area);
    }

    pub fn draw(&mut self, f: &mut Frame) {
        let palette = self.palette();
        let [top, page_area, bottom] = Self::split_screen(f.area());

        let title = self
            .viewer
            .document()
            .map(|doc| (doc.display_name(), doc.format().label()));
        render_toolbar(
            f,
            top,
            title.as_ref().map(|(name, format)| (name.as_str(), *format)),
            palette,
        );

        let placeholder = if self.viewer.is_open() {
            format!("Rendering page {}…", self.viewer.current_page() + 1)
        } else {
            "Press Ctrl+O to open a PDF, DOCX or PPTX file, ? for help".to_string()
        };
        f.render_widget(
            PageView::new(self.raster.as_ref(), palette.base_00)
                .pan(self.pan)
                .placeholder(placeholder)
                .true_color(!self.terminal_env.needs_indexed_colors()),
            page_area,
        );

        let zoom = self.viewer.zoom();
        let status = StatusInfo {
            notification: self.notifications.current(),
            page: self
                .viewer
                .is_open()
                .then(|| (self.viewer.current_page(), self.viewer.page_count())),
            zoom_percent: zoom.percent(),
            zoom_mode: zoom.mode().label(),
            image_size: self.page_image.as_ref().map(|i| (i.width(), i.height())),
            search: self.viewer.search().position_label(),
            rendering: self.pending_render.is_some(),
            bookmarked: self.is_bookmarked(),
        };
        render_status_bar(f, bottom, &status, palette);

        if let Some(prompt) = &self.prompt {
            prompt.render(f, bottom, palette);
        }

        let area = f.area();
        match self.popup.as_mut() {
            Some(Popup::Help(help)) => help.render(f, area, palette),
            Some(Popup::List(list)) => list.render(f, area, palette),
            Some(Popup::Info(info)) => info.render(f, area, palette),
            Some(Popup::Settings(popup)) => {
                popup.render(f, area, palette, self.settings.settings());
            }
            None => {}
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn expand_home(text: &str) -> PathBuf {
    match text.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(text)),
        None => PathBuf::from(text),
    }
}

pub fn run_app_with_event_source<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    event_source: &mut dyn EventSource,
) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    let tick_rate = Duration::from_millis(50);
    let mut last_tick = Instant::now();
    let mut first_render = true;
    app.handle_resize(terminal.size()?);

    loop {
        let mut events_processed = 0;
        let mut should_quit = false;
        while event_source.poll(Duration::from_millis(0))? && events_processed < 50 {
            let event = event_source.read()?;
            events_processed += 1;
            match event {
                Event::Key(key) => {
                    if app.handle_key_event(key) == Some(AppAction::Quit) {
                        should_quit = true;
                    }
                }
                Event::Resize(cols, rows) => app.handle_resize(Size::new(cols, rows)),
                _ => {}
            }
            if should_quit {
                break;
            }
        }

        let mut needs_redraw = events_processed > 0;
        if first_render {
            needs_redraw = true;
            first_render = false;
        }

        if last_tick.elapsed() >= tick_rate {
            if app.notifications.update() {
                needs_redraw = true;
            }
            if app.poll_renders() {
                needs_redraw = true;
            }
            last_tick = Instant::now();
        }

        if needs_redraw {
            terminal.draw(|f| app.draw(f))?;
        }

        if should_quit {
            break;
        }

        // Nothing happened, wait for input or the next tick
        if events_processed == 0 {
            let timeout = tick_rate.saturating_sub(last_tick.elapsed());
            event_source.poll(timeout)?;
        }
    }

    let size = terminal.size().ok();
    app.save_session(size);
    Ok(())
}
