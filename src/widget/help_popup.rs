use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use super::content_sized_rect;
use crate::theme::Base16Palette;

pub enum HelpPopupAction {
    Close,
}

pub struct HelpPopup {
    content: &'static str,
    scroll_offset: usize,
    last_popup_area: Option<Rect>,
}

impl Default for HelpPopup {
    fn default() -> Self {
        Self::new()
    }
}

impl HelpPopup {
    pub fn new() -> Self {
        HelpPopup {
            content: include_str!("../../readme.txt"),
            scroll_offset: 0,
            last_popup_area: None,
        }
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect, palette: &Base16Palette) {
        let max_content_width = self
            .content
            .lines()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(60);

        // Two columns of margin on each side plus borders
        let desired_width = (max_content_width + 6).min(area.width as usize);

        let popup_area = content_sized_rect(desired_width as u16, 90, area);
        self.last_popup_area = Some(popup_area);

        f.render_widget(Clear, popup_area);

        let lines: Vec<Line> = self
            .content
            .lines()
            .skip(self.scroll_offset)
            .map(|line| {
                Line::from(Span::styled(
                    format!("  {line}"),
                    Style::default().fg(palette.base_05),
                ))
            })
            .collect();

        let paragraph = Paragraph::new(lines)
            .block(
                Block::default()
                    .title(" Help - Press ? or ESC to close ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(palette.base_0c))
                    .style(Style::default().bg(palette.base_00)),
            )
            .wrap(Wrap { trim: false });

        f.render_widget(paragraph, popup_area);
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    fn max_offset(&self) -> usize {
        self.content.lines().count().saturating_sub(1)
    }

    fn page_size(&self) -> usize {
        self.last_popup_area
            .map_or(10, |area| (area.height as usize / 2).max(1))
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> Option<HelpPopupAction> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.scroll_offset = (self.scroll_offset + 1).min(self.max_offset());
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.scroll_offset = self.scroll_offset.saturating_sub(1);
            }
            KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.scroll_offset = (self.scroll_offset + self.page_size()).min(self.max_offset());
            }
            KeyCode::PageDown => {
                self.scroll_offset = (self.scroll_offset + self.page_size()).min(self.max_offset());
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.scroll_offset = self.scroll_offset.saturating_sub(self.page_size());
            }
            KeyCode::PageUp => {
                self.scroll_offset = self.scroll_offset.saturating_sub(self.page_size());
            }
            KeyCode::Home => self.scroll_offset = 0,
            KeyCode::End | KeyCode::Char('G') => self.scroll_offset = self.max_offset(),
            KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') | KeyCode::F(1) => {
                return Some(HelpPopupAction::Close);
            }
            _ => {}
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(popup: &mut HelpPopup, code: KeyCode) -> Option<HelpPopupAction> {
        popup.handle_key(&KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn scrolling_stays_within_content() {
        let mut popup = HelpPopup::new();
        assert!(press(&mut popup, KeyCode::Up).is_none());
        assert_eq!(popup.scroll_offset(), 0);

        press(&mut popup, KeyCode::Char('j'));
        assert_eq!(popup.scroll_offset(), 1);

        press(&mut popup, KeyCode::End);
        let bottom = popup.scroll_offset();
        press(&mut popup, KeyCode::Down);
        assert_eq!(popup.scroll_offset(), bottom);
    }

    #[test]
    fn escape_closes() {
        let mut popup = HelpPopup::new();
        assert!(matches!(
            press(&mut popup, KeyCode::Esc),
            Some(HelpPopupAction::Close)
        ));
    }
}
