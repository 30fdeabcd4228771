use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::notification::{Notification, NotificationLevel};
use crate::theme::Base16Palette;

/// Everything the bottom line shows
#[derive(Debug, Default)]
pub struct StatusInfo<'a> {
    pub notification: Option<&'a Notification>,
    /// 0-based page and page count
    pub page: Option<(usize, usize)>,
    pub zoom_percent: u32,
    pub zoom_mode: &'static str,
    /// Pixel size of the displayed image
    pub image_size: Option<(u32, u32)>,
    pub search: Option<String>,
    pub rendering: bool,
    pub bookmarked: bool,
}

impl StatusInfo<'_> {
    fn right_side(&self) -> String {
        let mut parts = Vec::new();
        if let Some(search) = &self.search {
            parts.push(search.clone());
        }
        if self.rendering {
            parts.push("rendering…".to_string());
        }
        if let Some((width, height)) = self.image_size {
            parts.push(format!("{width}×{height}px"));
        }
        if self.page.is_some() {
            if self.zoom_mode.is_empty() {
                parts.push(format!("{}%", self.zoom_percent));
            } else {
                parts.push(format!("{}% ({})", self.zoom_percent, self.zoom_mode));
            }
        }
        if let Some((page, count)) = self.page {
            let mark = if self.bookmarked { "★ " } else { "" };
            parts.push(format!("{mark}{}/{count}", page + 1));
        }
        parts.join("  │  ")
    }
}

pub fn render_status_bar(f: &mut Frame, area: Rect, info: &StatusInfo, palette: &Base16Palette) {
    let (bg, fg, accent) = palette.bar_colors();
    let right = info.right_side();
    let right_width = u16::try_from(right.chars().count() + 2).unwrap_or(u16::MAX);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(right_width)])
        .split(area);

    let left = match info.notification {
        Some(n) => {
            let color = match n.level {
                NotificationLevel::Error => palette.error_color(),
                NotificationLevel::Warning => palette.highlight_color(),
                NotificationLevel::Info => accent,
            };
            Line::from(Span::styled(
                format!(" {}", n.message),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ))
        }
        None => Line::from(Span::styled(
            " ? help",
            Style::default().fg(palette.base_03),
        )),
    };

    f.render_widget(
        Paragraph::new(left).style(Style::default().bg(bg).fg(fg)),
        chunks[0],
    );
    f.render_widget(
        Paragraph::new(Line::from(format!("{right} ")).right_aligned())
            .style(Style::default().bg(bg).fg(fg)),
        chunks[1],
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn right_side_lists_search_zoom_and_page() {
        let info = StatusInfo {
            page: Some((1, 12)),
            zoom_percent: 125,
            zoom_mode: "fit width",
            image_size: Some((765, 990)),
            search: Some("2/3".into()),
            bookmarked: true,
            ..StatusInfo::default()
        };
        assert_eq!(
            info.right_side(),
            "2/3  │  765×990px  │  125% (fit width)  │  ★ 2/12"
        );
    }

    #[test]
    fn nothing_but_rendering_without_a_document() {
        let info = StatusInfo {
            rendering: true,
            zoom_percent: 100,
            ..StatusInfo::default()
        };
        assert_eq!(info.right_side(), "rendering…");
    }
}
