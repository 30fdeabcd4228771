//! Key bindings of the page view

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What a key press in the page view asks for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppCommand {
    Quit,
    OpenPrompt,
    CloseDocument,
    PrevPage,
    NextPage,
    FirstPage,
    LastPage,
    GotoPrompt,
    ZoomIn,
    ZoomOut,
    ResetZoom,
    FitWidth,
    FitPage,
    FindPrompt,
    NextMatch,
    PrevMatch,
    ToggleBookmark,
    BookmarkLabelPrompt,
    ShowBookmarks,
    ShowRecent,
    ShowOutline,
    ShowInfo,
    ShowHelp,
    ShowSettings,
    CycleTheme,
    ToggleNightMode,
    BrightnessDown,
    BrightnessUp,
    PanUp,
    PanDown,
    PanLeft,
    PanRight,
    /// Esc: drop the status message and the search highlight
    Dismiss,
}

/// Map a key press to a command; `None` for unbound keys
pub fn map_key(key: &KeyEvent) -> Option<AppCommand> {
    use AppCommand::*;

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('o') => Some(OpenPrompt),
            KeyCode::Char('q') | KeyCode::Char('c') => Some(Quit),
            KeyCode::Char('f') => Some(FindPrompt),
            KeyCode::Char('n') => Some(ToggleNightMode),
            _ => None,
        };
    }

    let command = match key.code {
        KeyCode::Char('q') => Quit,
        KeyCode::Left | KeyCode::PageUp | KeyCode::Char('h') => PrevPage,
        KeyCode::Right | KeyCode::PageDown | KeyCode::Char('l') | KeyCode::Char(' ') => NextPage,
        KeyCode::Home => FirstPage,
        KeyCode::End => LastPage,
        KeyCode::Char('g') => GotoPrompt,
        KeyCode::Char('+') | KeyCode::Char('=') => ZoomIn,
        KeyCode::Char('-') => ZoomOut,
        KeyCode::Char('0') => ResetZoom,
        KeyCode::Char('w') => FitWidth,
        KeyCode::Char('f') => FitPage,
        KeyCode::Char('/') => FindPrompt,
        KeyCode::Char('n') => NextMatch,
        KeyCode::Char('N') => PrevMatch,
        KeyCode::Char('b') => ToggleBookmark,
        KeyCode::Char('B') => BookmarkLabelPrompt,
        KeyCode::Char('m') => ShowBookmarks,
        KeyCode::Char('r') => ShowRecent,
        KeyCode::Char('o') => ShowOutline,
        KeyCode::Char('i') => ShowInfo,
        KeyCode::Char('t') => CycleTheme,
        KeyCode::Char('s') => ShowSettings,
        KeyCode::Char('[') => BrightnessDown,
        KeyCode::Char(']') => BrightnessUp,
        KeyCode::Up | KeyCode::Char('k') => PanUp,
        KeyCode::Down | KeyCode::Char('j') => PanDown,
        KeyCode::Char('H') => PanLeft,
        KeyCode::Char('L') => PanRight,
        KeyCode::Char('c') => CloseDocument,
        KeyCode::F(1) | KeyCode::Char('?') => ShowHelp,
        KeyCode::Esc => Dismiss,
        _ => return None,
    };
    Some(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn navigation_keys() {
        for code in [KeyCode::Right, KeyCode::PageDown, KeyCode::Char('l'), KeyCode::Char(' ')] {
            assert_eq!(map_key(&key(code)), Some(AppCommand::NextPage));
        }
        for code in [KeyCode::Left, KeyCode::PageUp, KeyCode::Char('h')] {
            assert_eq!(map_key(&key(code)), Some(AppCommand::PrevPage));
        }
        assert_eq!(map_key(&key(KeyCode::Home)), Some(AppCommand::FirstPage));
        assert_eq!(map_key(&key(KeyCode::End)), Some(AppCommand::LastPage));
    }

    #[test]
    fn control_chords_take_precedence() {
        assert_eq!(map_key(&ctrl('o')), Some(AppCommand::OpenPrompt));
        assert_eq!(map_key(&ctrl('f')), Some(AppCommand::FindPrompt));
        assert_eq!(map_key(&ctrl('n')), Some(AppCommand::ToggleNightMode));
        assert_eq!(map_key(&ctrl('q')), Some(AppCommand::Quit));
        assert_eq!(map_key(&ctrl('x')), None);
        assert_eq!(map_key(&key(KeyCode::Char('n'))), Some(AppCommand::NextMatch));
    }

    #[test]
    fn shifted_letters_are_distinct() {
        let shifted = |c| KeyEvent::new(KeyCode::Char(c), KeyModifiers::SHIFT);
        assert_eq!(map_key(&shifted('N')), Some(AppCommand::PrevMatch));
        assert_eq!(map_key(&shifted('B')), Some(AppCommand::BookmarkLabelPrompt));
        assert_eq!(map_key(&key(KeyCode::Char('b'))), Some(AppCommand::ToggleBookmark));
        assert_eq!(map_key(&key(KeyCode::Char('s'))), Some(AppCommand::ShowSettings));
        assert_eq!(map_key(&key(KeyCode::Char('x'))), None);
    }
}
