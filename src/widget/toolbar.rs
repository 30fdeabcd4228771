use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::theme::Base16Palette;

const HINTS: &str = "^O open  / find  g goto  +/- zoom  w/f fit  m marks  r recent  ? help";

/// Top line: document name and format on the left, key hints on the right
pub fn render_toolbar(
    f: &mut Frame,
    area: Rect,
    title: Option<(&str, &str)>,
    palette: &Base16Palette,
) {
    let (bg, fg, accent) = palette.bar_colors();

    let mut spans = vec![Span::styled(
        " folio ",
        Style::default()
            .fg(bg)
            .bg(accent)
            .add_modifier(Modifier::BOLD),
    )];
    match title {
        Some((name, format)) => {
            spans.push(Span::styled(
                format!(" {name} "),
                Style::default().fg(fg).add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled(
                format!("[{format}]"),
                Style::default().fg(palette.base_03),
            ));
        }
        None => spans.push(Span::styled(
            " no document",
            Style::default().fg(palette.base_03),
        )),
    }

    let used: usize = spans.iter().map(|s| s.content.chars().count()).sum();
    let free = usize::from(area.width).saturating_sub(used + 1);
    if free >= HINTS.len() {
        spans.push(Span::raw(" ".repeat(free - HINTS.chars().count())));
        spans.push(Span::styled(HINTS, Style::default().fg(palette.base_04)));
    }

    f.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(bg).fg(fg)),
        area,
    );
}
