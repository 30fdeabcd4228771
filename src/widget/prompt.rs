use ratatui::{
    Frame,
    layout::{Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
};

use crate::inputs::LineInput;
use crate::theme::Base16Palette;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PromptKind {
    Open,
    Find,
    GotoPage,
    BookmarkLabel,
    DefaultDirectory,
}

impl PromptKind {
    pub fn label(self) -> &'static str {
        match self {
            PromptKind::Open => "Open: ",
            PromptKind::Find => "Find: ",
            PromptKind::GotoPage => "Go to page: ",
            PromptKind::BookmarkLabel => "Bookmark label: ",
            PromptKind::DefaultDirectory => "Default directory: ",
        }
    }
}

/// A line input bound to what its answer is for
pub struct Prompt {
    pub kind: PromptKind,
    pub input: LineInput,
}

impl Prompt {
    pub fn new(kind: PromptKind) -> Self {
        Self {
            kind,
            input: LineInput::new(),
        }
    }

    pub fn with_text(kind: PromptKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            input: LineInput::with_text(text),
        }
    }

    /// Draw over `area` (one line) and place the terminal cursor
    pub fn render(&self, f: &mut Frame, area: Rect, palette: &Base16Palette) {
        let label = self.kind.label();
        let label_width = label.chars().count() as u16;
        let text = self.input.text();

        // Keep the cursor visible on narrow terminals
        let room = area.width.saturating_sub(label_width + 1) as usize;
        let skip = self.input.cursor().saturating_sub(room);
        let visible: String = text.chars().skip(skip).collect();

        f.render_widget(Clear, area);
        let line = Line::from(vec![
            Span::styled(
                label,
                Style::default()
                    .fg(palette.base_0d)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(visible, Style::default().fg(palette.base_06)),
        ]);
        f.render_widget(
            Paragraph::new(line).style(Style::default().bg(palette.base_01)),
            area,
        );

        let cursor_x = area.x + label_width + (self.input.cursor() - skip) as u16;
        f.set_cursor_position(Position::new(
            cursor_x.min(area.right().saturating_sub(1)),
            area.y,
        ));
    }
}
