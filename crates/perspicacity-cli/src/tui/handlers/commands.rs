//! Slash command handler

use perspicacity_core::Mode;

use crate::tui::app::App;
use crate::tui::components::{Popup, Toast};

impl App {
    /// Handle slash commands
    pub fn handle_slash_command(&mut self, cmd: &str) {
        let command = cmd
            .split_whitespace()
            .next()
            .map(str::to_lowercase)
            .unwrap_or_default();

        match command.as_str() {
            "/new" => {
                self.selected = None;
                self.conversation.new_conversation();
            }
            "/search" => self.conversation.set_mode(Mode::Search),
            "/research" => self.conversation.set_mode(Mode::Research),
            "/settings" | "/auth" => self.popup = Popup::Settings,
            "/help" => self.popup = Popup::Help,
            "/quit" | "/exit" => self.should_quit = true,
            _ => {
                self.show_toast(Toast::error(format!("Unknown command: {command}")));
                return;
            }
        }
        self.input.clear();
    }
}
