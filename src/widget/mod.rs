pub mod help_popup;
pub mod info_popup;
pub mod list_popup;
pub mod page_view;
pub mod prompt;
pub mod settings_popup;
pub mod status_bar;
pub mod toolbar;

use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub use help_popup::{HelpPopup, HelpPopupAction};
pub use info_popup::InfoPopup;
pub use list_popup::{ListEntry, ListKind, ListPopup, ListPopupAction, ListTarget};
pub use page_view::{HalfBlockRaster, Pan, PageView};
pub use prompt::{Prompt, PromptKind};
pub use settings_popup::{SettingChange, SettingsAction, SettingsPopup};
pub use status_bar::{StatusInfo, render_status_bar};
pub use toolbar::render_toolbar;

/// Rect of `percent_x` by `percent_y` centered in `r`
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Fixed `width` columns, `percent_y` of the height, centered in `r`
pub fn content_sized_rect(width: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    let width = width.min(r.width);
    let margin = r.width.saturating_sub(width) / 2;

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(margin),
            Constraint::Length(width),
            Constraint::Length(margin),
        ])
        .split(popup_layout[1])[1]
}
