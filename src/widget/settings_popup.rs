//! Settings popup for display, startup and recent-file preferences

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::centered_rect;
use crate::render::adjust::BRIGHTNESS_STEP;
use crate::settings::{FitSetting, Settings, ZoomSetting};
use crate::theme::{Base16Palette, Theme};

/// Upper bound offered for the recent files list
const MAX_RECENT_FILES_LIMIT: usize = 50;

const ZOOM_CHOICES: [ZoomSetting; 8] = [
    ZoomSetting::Fit(FitSetting::FitPage),
    ZoomSetting::Fit(FitSetting::FitWidth),
    ZoomSetting::Factor(0.5),
    ZoomSetting::Factor(0.75),
    ZoomSetting::Factor(1.0),
    ZoomSetting::Factor(1.25),
    ZoomSetting::Factor(1.5),
    ZoomSetting::Factor(2.0),
];

#[derive(Clone, Debug, PartialEq)]
pub enum SettingChange {
    Theme(Theme),
    DefaultZoom(ZoomSetting),
    NightMode(bool),
    Brightness(f32),
    RestoreSession(bool),
    RecentFilesLimit(usize),
    ClearRecentFiles,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SettingsAction {
    Close,
    Apply(SettingChange),
    /// Ask for a new default directory
    EditDefaultDirectory,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Row {
    Theme,
    DefaultZoom,
    NightMode,
    Brightness,
    RestoreSession,
    DefaultDirectory,
    RecentFilesLimit,
    ClearRecentFiles,
}

const ROWS: [Row; 8] = [
    Row::Theme,
    Row::DefaultZoom,
    Row::NightMode,
    Row::Brightness,
    Row::RestoreSession,
    Row::DefaultDirectory,
    Row::RecentFilesLimit,
    Row::ClearRecentFiles,
];

impl Row {
    fn label(self) -> &'static str {
        match self {
            Row::Theme => "Theme",
            Row::DefaultZoom => "Default zoom",
            Row::NightMode => "Night mode",
            Row::Brightness => "Brightness",
            Row::RestoreSession => "Restore last session",
            Row::DefaultDirectory => "Default directory",
            Row::RecentFilesLimit => "Recent files kept",
            Row::ClearRecentFiles => "Clear recent files",
        }
    }

    /// Section header shown above the row, if it starts one
    fn section(self) -> Option<&'static str> {
        match self {
            Row::Theme => Some("Display"),
            Row::RestoreSession => Some("Startup"),
            Row::RecentFilesLimit => Some("Recent Files"),
            _ => None,
        }
    }

    fn value(self, settings: &Settings) -> String {
        let on_off = |on: bool| if on { "on" } else { "off" }.to_string();
        match self {
            Row::Theme => settings.theme.name().to_string(),
            Row::DefaultZoom => zoom_label(settings.default_zoom),
            Row::NightMode => on_off(settings.night_mode),
            Row::Brightness => format!("{:.0}%", settings.brightness * 100.0),
            Row::RestoreSession => on_off(settings.restore_session),
            Row::DefaultDirectory => settings
                .default_directory
                .as_ref()
                .map(|dir| dir.display().to_string())
                .unwrap_or_else(|| "(none)".to_string()),
            Row::RecentFilesLimit => settings.recent_files_limit.to_string(),
            Row::ClearRecentFiles => format!("{} stored", settings.recent_files.len()),
        }
    }
}

fn zoom_label(zoom: ZoomSetting) -> String {
    match zoom {
        ZoomSetting::Fit(FitSetting::FitPage) => "Fit page".to_string(),
        ZoomSetting::Fit(FitSetting::FitWidth) => "Fit width".to_string(),
        ZoomSetting::Factor(factor) => format!("{:.0}%", factor * 100.0),
    }
}

fn step_zoom(current: ZoomSetting, forward: bool) -> ZoomSetting {
    let len = ZOOM_CHOICES.len();
    let next = match ZOOM_CHOICES.iter().position(|z| *z == current) {
        Some(i) if forward => (i + 1) % len,
        Some(i) => (i + len - 1) % len,
        None => 0,
    };
    ZOOM_CHOICES[next]
}

pub struct SettingsPopup {
    selected: usize,
}

impl Default for SettingsPopup {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsPopup {
    pub fn new() -> Self {
        Self { selected: 0 }
    }

    fn row(&self) -> Row {
        ROWS[self.selected]
    }

    fn next(&mut self) {
        self.selected = (self.selected + 1) % ROWS.len();
    }

    fn previous(&mut self) {
        self.selected = (self.selected + ROWS.len() - 1) % ROWS.len();
    }

    /// The value the selected row moves to, one step forward or back
    fn step(&self, settings: &Settings, forward: bool) -> Option<SettingChange> {
        let change = match self.row() {
            Row::Theme => {
                let theme = if forward {
                    settings.theme.next()
                } else {
                    settings.theme.next().next()
                };
                SettingChange::Theme(theme)
            }
            Row::DefaultZoom => {
                SettingChange::DefaultZoom(step_zoom(settings.default_zoom, forward))
            }
            Row::NightMode => SettingChange::NightMode(!settings.night_mode),
            Row::Brightness => {
                let delta = if forward {
                    BRIGHTNESS_STEP
                } else {
                    -BRIGHTNESS_STEP
                };
                SettingChange::Brightness(settings.brightness + delta)
            }
            Row::RestoreSession => SettingChange::RestoreSession(!settings.restore_session),
            Row::RecentFilesLimit => {
                let limit = if forward {
                    settings.recent_files_limit + 1
                } else {
                    settings.recent_files_limit.saturating_sub(1)
                };
                SettingChange::RecentFilesLimit(limit.clamp(1, MAX_RECENT_FILES_LIMIT))
            }
            Row::DefaultDirectory | Row::ClearRecentFiles => return None,
        };
        Some(change)
    }

    pub fn handle_key(&mut self, key: &KeyEvent, settings: &Settings) -> Option<SettingsAction> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.next(),
            KeyCode::Char('k') | KeyCode::Up => self.previous(),
            KeyCode::Enter => {
                return match self.row() {
                    Row::DefaultDirectory => Some(SettingsAction::EditDefaultDirectory),
                    Row::ClearRecentFiles => {
                        Some(SettingsAction::Apply(SettingChange::ClearRecentFiles))
                    }
                    _ => self.step(settings, true).map(SettingsAction::Apply),
                };
            }
            KeyCode::Char('l') | KeyCode::Right | KeyCode::Char(' ') => {
                return self.step(settings, true).map(SettingsAction::Apply);
            }
            KeyCode::Char('h') | KeyCode::Left => {
                return self.step(settings, false).map(SettingsAction::Apply);
            }
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('s') => {
                return Some(SettingsAction::Close);
            }
            _ => {}
        }
        None
    }

    pub fn render(&self, f: &mut Frame, area: Rect, palette: &Base16Palette, settings: &Settings) {
        let popup_area = centered_rect(60, 70, area);
        f.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(" Settings ")
            .title_bottom(Line::from(" j/k select · h/l change · Enter edit · Esc close ").right_aligned())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.base_0c))
            .style(Style::default().bg(palette.base_00));

        let label_width = ROWS.iter().map(|r| r.label().len()).max().unwrap_or(0) + 2;
        let mut lines = Vec::new();
        for (i, row) in ROWS.iter().enumerate() {
            if let Some(section) = row.section() {
                if !lines.is_empty() {
                    lines.push(Line::default());
                }
                lines.push(Line::from(vec![
                    Span::styled("▸ ", Style::default().fg(palette.base_0d)),
                    Span::styled(section, Style::default().fg(palette.base_06)),
                ]));
            }

            let is_selected = i == self.selected;
            let prefix = if is_selected { "» " } else { "  " };
            let prefix_style = if is_selected {
                Style::default()
                    .fg(palette.base_0a)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            lines.push(Line::from(vec![
                Span::styled(prefix, prefix_style),
                Span::styled(
                    format!("{:<label_width$}", row.label()),
                    Style::default().fg(palette.base_05),
                ),
                Span::styled(row.value(settings), Style::default().fg(palette.base_06)),
            ]));
        }

        f.render_widget(Paragraph::new(lines).block(block), popup_area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn press(
        popup: &mut SettingsPopup,
        settings: &Settings,
        code: KeyCode,
    ) -> Option<SettingsAction> {
        popup.handle_key(&KeyEvent::new(code, KeyModifiers::NONE), settings)
    }

    #[test]
    fn zoom_choices_cycle_both_ways() {
        let fit_page = ZoomSetting::Fit(FitSetting::FitPage);
        assert_eq!(
            step_zoom(fit_page, true),
            ZoomSetting::Fit(FitSetting::FitWidth)
        );
        assert_eq!(step_zoom(fit_page, false), ZoomSetting::Factor(2.0));
        // A hand-edited factor restarts the cycle
        assert_eq!(step_zoom(ZoomSetting::Factor(3.3), true), fit_page);
    }

    #[test]
    fn rows_produce_changes() {
        let settings = Settings::default();
        let mut popup = SettingsPopup::new();

        assert_eq!(
            press(&mut popup, &settings, KeyCode::Char('l')),
            Some(SettingsAction::Apply(SettingChange::Theme(Theme::Dark)))
        );
        assert_eq!(
            press(&mut popup, &settings, KeyCode::Char('h')),
            Some(SettingsAction::Apply(SettingChange::Theme(Theme::System)))
        );

        // Up from the first row wraps to the last
        press(&mut popup, &settings, KeyCode::Up);
        assert_eq!(
            press(&mut popup, &settings, KeyCode::Enter),
            Some(SettingsAction::Apply(SettingChange::ClearRecentFiles))
        );
        assert_eq!(press(&mut popup, &settings, KeyCode::Char('l')), None);

        press(&mut popup, &settings, KeyCode::Up);
        assert_eq!(
            press(&mut popup, &settings, KeyCode::Char('h')),
            Some(SettingsAction::Apply(SettingChange::RecentFilesLimit(9)))
        );

        press(&mut popup, &settings, KeyCode::Up);
        assert_eq!(
            press(&mut popup, &settings, KeyCode::Enter),
            Some(SettingsAction::EditDefaultDirectory)
        );
        assert_eq!(
            press(&mut popup, &settings, KeyCode::Esc),
            Some(SettingsAction::Close)
        );
    }

    #[test]
    fn recent_limit_stays_in_bounds() {
        let settings = Settings {
            recent_files_limit: 1,
            ..Settings::default()
        };
        let mut popup = SettingsPopup::new();
        popup.selected = ROWS.iter().position(|r| *r == Row::RecentFilesLimit).unwrap();
        assert_eq!(
            press(&mut popup, &settings, KeyCode::Left),
            Some(SettingsAction::Apply(SettingChange::RecentFilesLimit(1)))
        );
    }
}
