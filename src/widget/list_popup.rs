//! Selectable list popup for recent files, bookmarks and the outline

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use super::centered_rect;
use crate::theme::Base16Palette;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListKind {
    Recent,
    Bookmarks,
    Outline,
}

impl ListKind {
    fn title(self) -> &'static str {
        match self {
            ListKind::Recent => " Recent Files ",
            ListKind::Bookmarks => " Bookmarks ",
            ListKind::Outline => " Outline ",
        }
    }

    fn empty_message(self) -> &'static str {
        match self {
            ListKind::Recent => "No recent files",
            ListKind::Bookmarks => "No bookmarks yet, press b on a page",
            ListKind::Outline => "This document has no outline",
        }
    }

    fn deletable(self) -> bool {
        matches!(self, ListKind::Recent | ListKind::Bookmarks)
    }
}

/// Where an entry leads
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListTarget {
    File(PathBuf),
    Bookmark { path: PathBuf, page: usize },
    Page(usize),
}

#[derive(Clone, Debug)]
pub struct ListEntry {
    pub label: String,
    pub detail: String,
    /// Indentation level
    pub depth: usize,
    pub target: ListTarget,
}

impl ListEntry {
    pub fn new(label: impl Into<String>, detail: impl Into<String>, target: ListTarget) -> Self {
        Self {
            label: label.into(),
            detail: detail.into(),
            depth: 0,
            target,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ListPopupAction {
    Close,
    Open(ListTarget),
    Delete(ListTarget),
}

pub struct ListPopup {
    kind: ListKind,
    entries: Vec<ListEntry>,
    state: ListState,
}

impl ListPopup {
    pub fn new(kind: ListKind, entries: Vec<ListEntry>) -> Self {
        let mut state = ListState::default();
        if !entries.is_empty() {
            state.select(Some(0));
        }
        Self {
            kind,
            entries,
            state,
        }
    }

    pub fn kind(&self) -> ListKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn selected(&self) -> Option<&ListEntry> {
        self.state.selected().and_then(|i| self.entries.get(i))
    }

    /// Select the first entry matching `target`
    pub fn select_target(&mut self, target: &ListTarget) {
        if let Some(i) = self.entries.iter().position(|e| &e.target == target) {
            self.state.select(Some(i));
        }
    }

    pub fn next(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < self.entries.len() => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => self.entries.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    /// Drop the selected entry after it was deleted from the store
    pub fn remove_selected(&mut self) {
        let Some(i) = self.state.selected() else {
            return;
        };
        if i < self.entries.len() {
            self.entries.remove(i);
        }
        if self.entries.is_empty() {
            self.state.select(None);
        } else {
            self.state.select(Some(i.min(self.entries.len() - 1)));
        }
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> Option<ListPopupAction> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.next(),
            KeyCode::Char('k') | KeyCode::Up => self.previous(),
            KeyCode::Home => {
                if !self.entries.is_empty() {
                    self.state.select(Some(0));
                }
            }
            KeyCode::End => {
                if !self.entries.is_empty() {
                    self.state.select(Some(self.entries.len() - 1));
                }
            }
            KeyCode::Enter => {
                return self
                    .selected()
                    .map(|e| ListPopupAction::Open(e.target.clone()));
            }
            KeyCode::Char('d') | KeyCode::Delete if self.kind.deletable() => {
                return self
                    .selected()
                    .map(|e| ListPopupAction::Delete(e.target.clone()));
            }
            KeyCode::Esc | KeyCode::Char('q') => return Some(ListPopupAction::Close),
            KeyCode::Char('m') if self.kind == ListKind::Bookmarks => {
                return Some(ListPopupAction::Close);
            }
            KeyCode::Char('r') if self.kind == ListKind::Recent => {
                return Some(ListPopupAction::Close);
            }
            KeyCode::Char('o') if self.kind == ListKind::Outline => {
                return Some(ListPopupAction::Close);
            }
            _ => {}
        }
        None
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect, palette: &Base16Palette) {
        let popup_area = centered_rect(60, 70, area);
        f.render_widget(Clear, popup_area);

        let hint = if self.kind.deletable() {
            " Enter open · d delete · Esc close "
        } else {
            " Enter go · Esc close "
        };
        let block = Block::default()
            .title(self.kind.title())
            .title_bottom(Line::from(hint).right_aligned())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.base_0c))
            .style(Style::default().bg(palette.base_00));

        if self.entries.is_empty() {
            let message = Paragraph::new(Line::from(Span::styled(
                self.kind.empty_message(),
                Style::default().fg(palette.base_03),
            )))
            .block(block);
            f.render_widget(message, popup_area);
            return;
        }

        let items: Vec<ListItem> = self
            .entries
            .iter()
            .map(|entry| {
                ListItem::new(Line::from(vec![
                    Span::raw("  ".repeat(entry.depth)),
                    Span::styled(entry.label.as_str(), Style::default().fg(palette.base_05)),
                    Span::raw("  "),
                    Span::styled(entry.detail.as_str(), Style::default().fg(palette.base_03)),
                ]))
            })
            .collect();

        let (selection_bg, selection_fg) = palette.selection_colors();
        let list = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .bg(selection_bg)
                    .fg(selection_fg)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        f.render_stateful_widget(list, popup_area, &mut self.state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn press(popup: &mut ListPopup, code: KeyCode) -> Option<ListPopupAction> {
        popup.handle_key(&KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn pages(n: usize) -> Vec<ListEntry> {
        (0..n)
            .map(|i| ListEntry::new(format!("Chapter {i}"), "", ListTarget::Page(i)))
            .collect()
    }

    #[test]
    fn selection_wraps_around() {
        let mut popup = ListPopup::new(ListKind::Outline, pages(3));
        press(&mut popup, KeyCode::Up);
        assert_eq!(popup.selected().unwrap().target, ListTarget::Page(2));
        press(&mut popup, KeyCode::Down);
        assert_eq!(popup.selected().unwrap().target, ListTarget::Page(0));
        assert_eq!(
            press(&mut popup, KeyCode::Enter),
            Some(ListPopupAction::Open(ListTarget::Page(0)))
        );
    }

    #[test]
    fn outline_entries_cannot_be_deleted() {
        let mut popup = ListPopup::new(ListKind::Outline, pages(2));
        assert_eq!(press(&mut popup, KeyCode::Char('d')), None);
    }

    #[test]
    fn delete_then_remove_keeps_a_selection() {
        let entries = vec![
            ListEntry::new("a.pdf", "", ListTarget::File("a.pdf".into())),
            ListEntry::new("b.pdf", "", ListTarget::File("b.pdf".into())),
        ];
        let mut popup = ListPopup::new(ListKind::Recent, entries);
        press(&mut popup, KeyCode::End);
        assert_eq!(
            press(&mut popup, KeyCode::Char('d')),
            Some(ListPopupAction::Delete(ListTarget::File("b.pdf".into())))
        );
        popup.remove_selected();
        assert_eq!(popup.len(), 1);
        assert_eq!(
            popup.selected().unwrap().target,
            ListTarget::File("a.pdf".into())
        );
        popup.remove_selected();
        assert!(popup.selected().is_none());
        assert_eq!(press(&mut popup, KeyCode::Enter), None);
    }
}
