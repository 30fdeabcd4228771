use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

use crate::bookmark::{Bookmark, Bookmarks};
use crate::recent_files::{self, RecentFiles};
use crate::render::adjust;
use crate::theme::Theme;
use crate::viewer::{Zoom, ZoomMode};

pub const CURRENT_VERSION: u32 = 1;
const SETTINGS_FILENAME: &str = "config.yaml";
const APP_NAME: &str = "folio";

const HEADER: &str = "# folio settings, rewritten on every change\n";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("cannot access settings file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("settings file {} is malformed: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("cannot serialize settings: {0}")]
    Serialize(#[source] serde_yaml::Error),
}

/// Fit modes accepted as a default zoom
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitSetting {
    FitWidth,
    FitPage,
}

/// Zoom applied when a document opens: `fit_width`, `fit_page` or a factor
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ZoomSetting {
    Fit(FitSetting),
    Factor(f32),
}

impl Default for ZoomSetting {
    fn default() -> Self {
        ZoomSetting::Fit(FitSetting::FitPage)
    }
}

impl ZoomSetting {
    pub fn to_zoom(self) -> Zoom {
        match self {
            ZoomSetting::Fit(FitSetting::FitWidth) => Zoom::fit(ZoomMode::FitWidth),
            ZoomSetting::Fit(FitSetting::FitPage) => Zoom::fit(ZoomMode::FitPage),
            ZoomSetting::Factor(factor) => Zoom::custom(factor),
        }
    }
}

/// Terminal size at exit, in cells.
///
/// Kept as a record only: a terminal program cannot resize or place the
/// window it runs in, so nothing reads this back on startup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowGeometry {
    pub width: u16,
    pub height: u16,
}

/// Document and page shown when the viewer last exited
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastSession {
    pub path: PathBuf,
    pub page: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub version: u32,
    pub theme: Theme,
    pub default_zoom: ZoomSetting,
    pub brightness: f32,
    pub night_mode: bool,
    pub window: WindowGeometry,
    pub recent_files: RecentFiles,
    pub recent_files_limit: usize,
    pub bookmarks: Bookmarks,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_directory: Option<PathBuf>,
    pub restore_session: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_session: Option<LastSession>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            theme: Theme::default(),
            default_zoom: ZoomSetting::default(),
            brightness: 1.0,
            night_mode: false,
            window: WindowGeometry::default(),
            recent_files: RecentFiles::new(),
            recent_files_limit: recent_files::DEFAULT_LIMIT,
            bookmarks: Bookmarks::new(),
            default_directory: None,
            restore_session: true,
            last_session: None,
        }
    }
}

impl Settings {
    /// Bring hand-edited or older values back into range
    fn sanitize(&mut self) {
        self.brightness = adjust::clamp_brightness(self.brightness);
        self.recent_files_limit = self.recent_files_limit.max(1);
        self.recent_files.truncate(self.recent_files_limit);
        self.bookmarks.dedup();
    }
}

fn migrate_settings(settings: &mut Settings) {
    info!(
        "Migrating settings from v{} to v{}",
        settings.version, CURRENT_VERSION
    );
    settings.version = CURRENT_VERSION;
}

/// Settings plus where they live.
///
/// Every mutating method writes the file right away; write failures are
/// logged and otherwise ignored. A store without a path never touches disk.
#[derive(Debug)]
pub struct SettingsStore {
    settings: Settings,
    path: Option<PathBuf>,
    load_error: Option<SettingsError>,
}

impl SettingsStore {
    /// In-memory store, nothing is read or written
    pub fn ephemeral() -> Self {
        Self {
            settings: Settings::default(),
            path: None,
            load_error: None,
        }
    }

    /// `<config_dir>/folio/config.yaml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|config| config.join(APP_NAME).join(SETTINGS_FILENAME))
    }

    /// Load from `path`, never failing.
    ///
    /// A missing file is created with defaults. An unreadable or malformed
    /// file yields defaults and keeps the error for [`take_load_error`].
    ///
    /// [`take_load_error`]: SettingsStore::take_load_error
    pub fn load(path: &Path) -> Self {
        let mut store = Self {
            settings: Settings::default(),
            path: Some(path.to_path_buf()),
            load_error: None,
        };

        match Self::read(path) {
            Ok(Some(mut settings)) => {
                debug!("Loaded settings from {path:?}");
                let migrate = settings.version < CURRENT_VERSION;
                if migrate {
                    migrate_settings(&mut settings);
                }
                settings.sanitize();
                store.settings = settings;
                if migrate {
                    store.persist();
                }
            }
            Ok(None) => {
                info!("Settings file not found, creating with defaults at {path:?}");
                store.persist();
            }
            Err(e) => {
                error!("{e}");
                store.load_error = Some(e);
            }
        }
        store
    }

    /// Load from the default location, or stay in memory when there is none
    pub fn load_default() -> Self {
        match Self::default_path() {
            Some(path) => Self::load(&path),
            None => {
                warn!("Could not determine config directory, using default settings");
                Self::ephemeral()
            }
        }
    }

    fn read(path: &Path) -> Result<Option<Settings>, SettingsError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(SettingsError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        if content.trim().is_empty() {
            return Ok(Some(Settings::default()));
        }

        serde_yaml::from_str::<Settings>(&content)
            .map(Some)
            .map_err(|source| SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The error that forced defaults at load time, reported once
    pub fn take_load_error(&mut self) -> Option<SettingsError> {
        self.load_error.take()
    }

    /// Write the settings file now
    pub fn save(&self) -> Result<(), SettingsError> {
        let Some(path) = &self.path else {
            // Ephemeral settings don't save to disk
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| SettingsError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let yaml = serde_yaml::to_string(&self.settings).map_err(SettingsError::Serialize)?;
        fs::write(path, format!("{HEADER}{yaml}")).map_err(|source| SettingsError::Io {
            path: path.clone(),
            source,
        })?;
        debug!("Saved settings to {path:?}");
        Ok(())
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            error!("Failed to save settings: {e}");
        }
    }

    fn update(&mut self, change: impl FnOnce(&mut Settings)) {
        change(&mut self.settings);
        self.persist();
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.update(|s| s.theme = theme);
    }

    pub fn cycle_theme(&mut self) -> Theme {
        let next = self.settings.theme.next();
        self.set_theme(next);
        next
    }

    pub fn set_default_zoom(&mut self, zoom: ZoomSetting) {
        self.update(|s| s.default_zoom = zoom);
    }

    /// Store a clamped brightness and return it
    pub fn set_brightness(&mut self, brightness: f32) -> f32 {
        let brightness = adjust::clamp_brightness(brightness);
        self.update(|s| s.brightness = brightness);
        brightness
    }

    pub fn adjust_brightness(&mut self, delta: f32) -> f32 {
        self.set_brightness(self.settings.brightness + delta)
    }

    pub fn set_night_mode(&mut self, on: bool) {
        self.update(|s| s.night_mode = on);
    }

    pub fn toggle_night_mode(&mut self) -> bool {
        self.set_night_mode(!self.settings.night_mode);
        self.settings.night_mode
    }

    pub fn add_recent_file(&mut self, path: &Path) {
        self.update(|s| s.recent_files.add(path, s.recent_files_limit));
    }

    pub fn remove_recent_file(&mut self, path: &Path) {
        self.update(|s| {
            s.recent_files.remove(path);
        });
    }

    pub fn clear_recent_files(&mut self) {
        self.update(|s| s.recent_files.clear());
    }

    pub fn set_recent_files_limit(&mut self, limit: usize) {
        self.update(|s| {
            s.recent_files_limit = limit.max(1);
            s.recent_files.truncate(s.recent_files_limit);
        });
    }

    /// Returns whether a new bookmark was created
    pub fn add_bookmark(&mut self, path: &Path, page: usize, label: Option<String>) -> bool {
        let added = self.settings.bookmarks.add(path, page, label);
        self.persist();
        added
    }

    pub fn remove_bookmark(&mut self, path: &Path, page: usize) -> bool {
        let removed = self.settings.bookmarks.remove(path, page);
        if removed {
            self.persist();
        }
        removed
    }

    /// Returns whether the page is bookmarked afterwards
    pub fn toggle_bookmark(&mut self, path: &Path, page: usize) -> bool {
        let now = self.settings.bookmarks.toggle(path, page);
        self.persist();
        now
    }

    pub fn bookmarks_for(&self, path: &Path) -> Vec<&Bookmark> {
        self.settings.bookmarks.for_document(path)
    }

    pub fn set_window_geometry(&mut self, window: WindowGeometry) {
        if self.settings.window != window {
            self.update(|s| s.window = window);
        }
    }

    pub fn record_session(&mut self, session: Option<LastSession>) {
        if self.settings.last_session != session {
            self.update(|s| s.last_session = session);
        }
    }

    pub fn set_default_directory(&mut self, dir: Option<PathBuf>) {
        self.update(|s| s.default_directory = dir);
    }

    pub fn set_restore_session(&mut self, restore: bool) {
        self.update(|s| s.restore_session = restore);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_zoom_accepts_modes_and_factors() {
        let s: Settings = serde_yaml::from_str("default_zoom: fit_width").unwrap();
        assert_eq!(s.default_zoom, ZoomSetting::Fit(FitSetting::FitWidth));
        let s: Settings = serde_yaml::from_str("default_zoom: 1.5").unwrap();
        assert_eq!(s.default_zoom, ZoomSetting::Factor(1.5));
        assert_eq!(s.default_zoom.to_zoom().factor(), 1.5);
        assert_eq!(
            ZoomSetting::default().to_zoom().mode(),
            ZoomMode::FitPage
        );
    }

    #[test]
    fn unknown_keys_are_ignored_and_missing_keys_default() {
        let s: Settings =
            serde_yaml::from_str("theme: dark\nsome_future_option: 42\n").unwrap();
        assert_eq!(s.theme, Theme::Dark);
        assert_eq!(s.brightness, 1.0);
        assert_eq!(s.recent_files_limit, recent_files::DEFAULT_LIMIT);
        assert!(s.restore_session);
    }

    #[test]
    fn sanitize_clamps_values() {
        let mut s: Settings =
            serde_yaml::from_str("brightness: 9.0\nrecent_files_limit: 0\n").unwrap();
        s.sanitize();
        assert_eq!(s.brightness, adjust::MAX_BRIGHTNESS);
        assert_eq!(s.recent_files_limit, 1);
    }

    #[test]
    fn ephemeral_store_mutates_in_memory() {
        let mut store = SettingsStore::ephemeral();
        assert_eq!(store.cycle_theme(), Theme::Dark);
        assert!(store.toggle_night_mode());
        assert_eq!(store.set_brightness(0.0), adjust::MIN_BRIGHTNESS);
        store.add_recent_file(Path::new("a.pdf"));
        assert_eq!(store.settings().recent_files.len(), 1);
        assert!(store.path().is_none());
        assert!(store.save().is_ok());
    }
}
