//! Single-line text entry used by prompts

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    /// Still editing
    Editing,
    /// Enter pressed with this text
    Submit(String),
    /// Esc pressed
    Cancel,
}

/// Editable line with a cursor counted in chars
#[derive(Debug, Clone, Default)]
pub struct LineInput {
    text: String,
    cursor: usize,
}

impl LineInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefilled input with the cursor at the end
    pub fn with_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.chars().count();
        Self { text, cursor }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> InputOutcome {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('u') => self.clear(),
                KeyCode::Char('w') => self.delete_word(),
                KeyCode::Char('a') => self.cursor = 0,
                KeyCode::Char('e') => self.cursor = self.len(),
                _ => {}
            }
            return InputOutcome::Editing;
        }

        match key.code {
            KeyCode::Enter => return InputOutcome::Submit(self.text.clone()),
            KeyCode::Esc => return InputOutcome::Cancel,
            KeyCode::Char(c) => self.insert(c),
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    self.remove_at(self.cursor);
                }
            }
            KeyCode::Delete => {
                if self.cursor < self.len() {
                    self.remove_at(self.cursor);
                }
            }
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.len()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.len(),
            _ => {}
        }
        InputOutcome::Editing
    }

    pub fn insert(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    fn len(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map_or(self.text.len(), |(i, _)| i)
    }

    fn remove_at(&mut self, char_index: usize) {
        let at = self.byte_index(char_index);
        self.text.remove(at);
    }

    /// Delete back to the start of the previous word
    fn delete_word(&mut self) {
        let chars: Vec<char> = self.text.chars().collect();
        let mut start = self.cursor;
        while start > 0 && chars[start - 1].is_whitespace() {
            start -= 1;
        }
        while start > 0 && !chars[start - 1].is_whitespace() {
            start -= 1;
        }
        let from = self.byte_index(start);
        let to = self.byte_index(self.cursor);
        self.text.replace_range(from..to, "");
        self.cursor = start;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(input: &mut LineInput, code: KeyCode) -> InputOutcome {
        input.handle_key(&KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(input: &mut LineInput, text: &str) {
        for c in text.chars() {
            press(input, KeyCode::Char(c));
        }
    }

    #[test]
    fn typing_and_submitting() {
        let mut input = LineInput::new();
        type_text(&mut input, "héllo");
        assert_eq!(input.cursor(), 5);
        assert_eq!(
            press(&mut input, KeyCode::Enter),
            InputOutcome::Submit("héllo".into())
        );
    }

    #[test]
    fn editing_in_the_middle() {
        let mut input = LineInput::with_text("/docs/report.pdf");
        press(&mut input, KeyCode::Home);
        press(&mut input, KeyCode::Delete);
        type_text(&mut input, "~");
        assert_eq!(input.text(), "~docs/report.pdf");

        press(&mut input, KeyCode::End);
        press(&mut input, KeyCode::Backspace);
        press(&mut input, KeyCode::Left);
        press(&mut input, KeyCode::Backspace);
        assert_eq!(input.text(), "~docs/report.d");
        assert_eq!(press(&mut input, KeyCode::Esc), InputOutcome::Cancel);
    }

    #[test]
    fn control_word_delete_and_clear() {
        let mut input = LineInput::with_text("open the deck ");
        input.handle_key(&KeyEvent::new(KeyCode::Char('w'), KeyModifiers::CONTROL));
        assert_eq!(input.text(), "open the ");
        input.handle_key(&KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert_eq!(input.text(), "");
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn backspace_at_start_is_a_no_op() {
        let mut input = LineInput::new();
        assert_eq!(press(&mut input, KeyCode::Backspace), InputOutcome::Editing);
        assert_eq!(input.text(), "");
    }
}
