//! Mouse event handling

use crossterm::event::{MouseEvent, MouseEventKind};

use crate::tui::app::App;

/// Lines moved per wheel notch
const WHEEL_LINES: usize = 3;

impl App {
    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollUp => self.user_scroll(-(WHEEL_LINES as isize)),
            MouseEventKind::ScrollDown => self.user_scroll(WHEEL_LINES as isize),
            _ => {}
        }
    }

    /// Reader-initiated scroll. Tells the conversation how far from the
    /// bottom the view ended up so reveals stop pulling it down.
    pub fn user_scroll(&mut self, delta: isize) {
        if delta < 0 {
            self.scroll.scroll_up(delta.unsigned_abs());
        } else {
            self.scroll.scroll_down(delta as usize);
        }
        self.conversation
            .on_user_scroll(self.scroll.distance_from_bottom());
    }
}
