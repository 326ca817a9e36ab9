//! Single-line input buffer with a character cursor

use unicode_width::UnicodeWidthStr;

#[derive(Debug, Default)]
pub struct InputState {
    content: String,
    /// Cursor position in chars
    cursor: usize,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Display column of the cursor
    pub fn cursor_column(&self) -> usize {
        self.content[..self.byte_index()].width()
    }

    fn byte_index(&self) -> usize {
        self.content
            .char_indices()
            .nth(self.cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.content.len())
    }

    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_index();
        self.content.insert(at, c);
        self.cursor += 1;
    }

    /// Insert pasted text, folding newlines into spaces
    pub fn insert_str(&mut self, text: &str) {
        for c in text.chars() {
            self.insert_char(if c == '\n' || c == '\r' { ' ' } else { c });
        }
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_index();
        self.content.remove(at);
    }

    pub fn delete(&mut self) {
        if self.cursor < self.content.chars().count() {
            let at = self.byte_index();
            self.content.remove(at);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.content.chars().count());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.content.chars().count();
    }

    /// Replace the content, cursor at the end
    pub fn set(&mut self, text: &str) {
        self.content.clear();
        self.cursor = 0;
        self.insert_str(text);
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
    }

    /// Take the content, leaving the buffer empty
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_in_the_middle() {
        let mut input = InputState::new();
        input.insert_str("helo");
        input.move_left();
        input.insert_char('l');
        assert_eq!(input.content(), "hello");

        input.home();
        input.delete();
        input.end();
        input.backspace();
        assert_eq!(input.content(), "ell");
    }

    #[test]
    fn test_multibyte_cursor() {
        let mut input = InputState::new();
        input.set("añb");
        input.move_left();
        input.backspace();
        assert_eq!(input.content(), "ab");
        assert_eq!(input.cursor_column(), 1);
    }

    #[test]
    fn test_paste_folds_newlines() {
        let mut input = InputState::new();
        input.insert_str("a\nb");
        assert_eq!(input.take(), "a b");
        assert!(input.is_empty());
    }
}
