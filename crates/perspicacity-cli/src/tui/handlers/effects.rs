//! Carry out the side effects the conversation asks for

use perspicacity_core::Effect;

use crate::tui::app::App;
use crate::tui::components::{Popup, Toast};

impl App {
    pub fn apply_effects(&mut self) {
        for effect in self.conversation.take_effects() {
            match effect {
                Effect::ScrollToBottom => self.scroll.request_scroll_to_bottom(),
                Effect::ScrollToTurn(turn) => self.pending_turn = Some(turn),
                Effect::Notify { message, level } => {
                    self.toasts.push(Toast::new(message, level.into()));
                }
                Effect::OpenSettings => self.popup = Popup::Settings,
            }
            self.needs_redraw = true;
        }
    }
}
