//! Keyboard event handlers

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use perspicacity_core::PrimaryAction;

use crate::tui::app::App;
use crate::tui::components::Popup;

impl App {
    /// Main keyboard event dispatcher
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        if key_event.kind == KeyEventKind::Release {
            return;
        }
        let code = key_event.code;
        let modifiers = key_event.modifiers;
        let ctrl = modifiers.contains(KeyModifiers::CONTROL);
        let alt = modifiers.contains(KeyModifiers::ALT);

        if ctrl && matches!(code, KeyCode::Char('c') | KeyCode::Char('q')) {
            self.should_quit = true;
            return;
        }

        if self.popup != Popup::None {
            if matches!(code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
                self.popup = Popup::None;
            }
            return;
        }

        match code {
            KeyCode::Enter => self.handle_enter(),
            KeyCode::Esc => self.handle_escape(),
            KeyCode::Tab if self.editing.is_none() => {
                self.conversation.toggle_mode();
            }
            KeyCode::Up if ctrl => self.select_turn(-1),
            KeyCode::Down if ctrl => self.select_turn(1),
            KeyCode::Left if ctrl => self.cycle_tab(-1),
            KeyCode::Right if ctrl => self.cycle_tab(1),
            KeyCode::Up => self.user_scroll(-1),
            KeyCode::Down => self.user_scroll(1),
            KeyCode::PageUp => self.user_scroll(-(self.page() as isize)),
            KeyCode::PageDown => self.user_scroll(self.page() as isize),
            KeyCode::Char('r') if alt => self.regenerate(true),
            KeyCode::Char(c) if ctrl => self.handle_control(c),
            _ => self.handle_input_key(code),
        }
    }

    fn page(&self) -> usize {
        (self.viewport_height / 2).max(1)
    }

    fn handle_control(&mut self, c: char) {
        match c {
            'e' => self.begin_edit(),
            'r' => self.regenerate(false),
            'y' => self.copy_selected(),
            'o' => self.ask_expert(),
            'x' => self.toggle_more(),
            'n' => {
                self.selected = None;
                self.conversation.new_conversation();
            }
            'u' => {
                self.input.clear();
                self.sync_draft();
            }
            _ => {}
        }
    }

    /// Send while idle, stop while generating, confirm while editing
    fn handle_enter(&mut self) {
        if let Some(turn) = self.editing {
            self.confirm_edit(turn);
            return;
        }

        let text = self.input.content().trim().to_string();
        if text.starts_with('/') && !self.conversation.is_generating() {
            self.handle_slash_command(&text);
            return;
        }

        match self.conversation.primary_action(&text) {
            Ok(PrimaryAction::Submitted(_)) => {
                self.input.clear();
                self.selected = None;
            }
            Ok(PrimaryAction::Stopped) | Ok(PrimaryAction::Ignored) => {}
            // Missing credentials: the conversation already notified
            Err(e) => tracing::info!("Submit refused: {}", e),
        }
    }

    fn handle_escape(&mut self) {
        if let Some(turn) = self.editing {
            self.cancel_edit(turn);
        } else if self.conversation.is_generating() {
            self.conversation.stop();
        } else {
            self.selected = None;
        }
    }

    fn handle_input_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char(c) => self.input.insert_char(c),
            KeyCode::Backspace => self.input.backspace(),
            KeyCode::Delete => self.input.delete(),
            KeyCode::Left => self.input.move_left(),
            KeyCode::Right => self.input.move_right(),
            KeyCode::Home => self.input.home(),
            KeyCode::End => self.input.end(),
            _ => return,
        }
        self.sync_draft();
    }

    pub fn handle_paste(&mut self, text: &str) {
        if self.popup != Popup::None {
            return;
        }
        self.input.insert_str(text);
        self.sync_draft();
    }
}
