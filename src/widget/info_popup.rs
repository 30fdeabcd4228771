use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use super::content_sized_rect;
use crate::document::{Document, human_size};
use crate::theme::Base16Palette;

/// Document properties as label/value rows
pub struct InfoPopup {
    rows: Vec<(&'static str, String)>,
}

impl InfoPopup {
    pub fn for_document(document: &Document) -> Self {
        let metadata = document.metadata();
        let mut rows = vec![
            ("File", document.display_name()),
            ("Location", document.path().display().to_string()),
            ("Format", document.format().label().to_string()),
            ("Size", human_size(document.file_size())),
            ("Pages", document.page_count().to_string()),
        ];
        let optional = [
            ("Title", metadata.title),
            ("Author", metadata.author),
            ("Subject", metadata.subject),
            ("Keywords", metadata.keywords),
            ("Creator", metadata.creator),
            ("Producer", metadata.producer),
            ("Created", metadata.created),
            ("Modified", metadata.modified),
            ("Encryption", metadata.encryption),
        ];
        rows.extend(
            optional
                .into_iter()
                .filter_map(|(label, value)| value.filter(|v| !v.trim().is_empty()).map(|v| (label, v))),
        );
        Self { rows }
    }

    pub fn rows(&self) -> &[(&'static str, String)] {
        &self.rows
    }

    pub fn render(&self, f: &mut Frame, area: Rect, palette: &Base16Palette) {
        let label_width = self.rows.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
        let widest = self
            .rows
            .iter()
            .map(|(_, v)| v.chars().count())
            .max()
            .unwrap_or(0);
        let width = (label_width + widest + 8).min(area.width as usize) as u16;
        let popup_area = content_sized_rect(width, 60, area);
        f.render_widget(Clear, popup_area);

        let lines: Vec<Line> = self
            .rows
            .iter()
            .map(|(label, value)| {
                Line::from(vec![
                    Span::styled(
                        format!(" {label:>label_width$}  "),
                        Style::default()
                            .fg(palette.base_0d)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(value.as_str(), Style::default().fg(palette.base_05)),
                ])
            })
            .collect();

        let paragraph = Paragraph::new(lines)
            .block(
                Block::default()
                    .title(" Document Info ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(palette.base_0c))
                    .style(Style::default().bg(palette.base_00)),
            )
            .wrap(Wrap { trim: false });
        f.render_widget(paragraph, popup_area);
    }
}
