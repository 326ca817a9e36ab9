//! Main application state and event loop

use std::io;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{
        DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
        Event, EventStream,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};

use perspicacity_core::{Conversation, TurnId};

use crate::tui::components::{Popup, Toast, ToastQueue};
use crate::tui::state::{InputState, ScrollState};
use crate::tui::theme::Theme;

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Frame interval while idle
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

pub struct App {
    pub conversation: Conversation,
    pub input: InputState,
    pub scroll: ScrollState,
    pub toasts: ToastQueue,
    pub theme: Theme,
    pub popup: Popup,
    /// Turn targeted by the per-turn actions
    pub selected: Option<TurnId>,
    /// User turn whose text the input box is editing
    pub editing: Option<TurnId>,
    /// Turn to scroll into view once its offset is known
    pub pending_turn: Option<TurnId>,
    pub viewport_height: usize,
    pub should_quit: bool,
    pub needs_redraw: bool,
    started: Instant,
    clipboard: Option<arboard::Clipboard>,
}

impl App {
    pub fn new(conversation: Conversation) -> Self {
        let clipboard = match arboard::Clipboard::new() {
            Ok(clipboard) => Some(clipboard),
            Err(e) => {
                tracing::warn!("Clipboard unavailable: {}", e);
                None
            }
        };
        Self {
            conversation,
            input: InputState::new(),
            scroll: ScrollState::new(),
            toasts: ToastQueue::new(),
            theme: Theme::default(),
            popup: Popup::None,
            selected: None,
            editing: None,
            pending_turn: None,
            viewport_height: 0,
            should_quit: false,
            needs_redraw: true,
            started: Instant::now(),
            clipboard,
        }
    }

    pub fn show_toast(&mut self, toast: Toast) {
        self.toasts.push(toast);
        self.needs_redraw = true;
    }

    pub fn spinner(&self) -> &'static str {
        let frame = (self.started.elapsed().as_millis() / 80) as usize;
        SPINNER_FRAMES[frame % SPINNER_FRAMES.len()]
    }

    pub fn copy_to_clipboard(&mut self, text: String) {
        let result = match self.clipboard.as_mut() {
            Some(clipboard) => clipboard.set_text(text).map_err(|e| e.to_string()),
            None => Err("clipboard unavailable".to_string()),
        };
        match result {
            Ok(()) => self.show_toast(Toast::success("Copied to clipboard")),
            Err(e) => {
                tracing::warn!("Copy failed: {}", e);
                self.show_toast(Toast::error("Could not copy to clipboard"));
            }
        }
    }

    /// Run the application
    pub async fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            EnterAlternateScreen,
            EnableMouseCapture,
            EnableBracketedPaste
        )?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal).await;

        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture,
            DisableBracketedPaste
        )?;
        terminal.show_cursor()?;
        result
    }

    async fn main_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        loop {
            // Session updates from the answer task
            if self.conversation.pump() {
                self.needs_redraw = true;
            }
            self.apply_effects();

            if self.toasts.tick() {
                self.needs_redraw = true;
            }

            // Spinners and toast progress bars animate
            if self.conversation.is_generating() || !self.toasts.is_empty() {
                self.needs_redraw = true;
            }

            if self.needs_redraw {
                terminal.draw(|f| self.ui(f))?;
                self.needs_redraw = false;
            }

            tokio::select! {
                biased;

                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        match event {
                            Event::Key(key) => self.handle_key(key),
                            Event::Mouse(mouse) => self.handle_mouse(mouse),
                            Event::Paste(text) => self.handle_paste(&text),
                            _ => {}
                        }
                        self.needs_redraw = true;
                    }
                }
                _ = tokio::time::sleep(FRAME_INTERVAL) => {}
            }

            if self.should_quit {
                break;
            }
        }
        Ok(())
    }
}
