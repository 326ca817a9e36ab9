//! Per-turn actions: selection, editing, regeneration, copy and tabs

use perspicacity_core::render::Tab;
use perspicacity_core::{EditOutcome, Entry, TurnId};

use crate::tui::app::App;
use crate::tui::components::Toast;

impl App {
    /// Move the selection through the turns. Past either end clears it.
    pub fn select_turn(&mut self, delta: isize) {
        let ids: Vec<TurnId> = self.conversation.transcript().turn_ids().collect();
        if ids.is_empty() {
            return;
        }
        let next = match self.selected.and_then(|s| ids.iter().position(|id| *id == s)) {
            Some(index) => {
                let index = index as isize + delta;
                (0..ids.len() as isize)
                    .contains(&index)
                    .then(|| ids[index as usize])
            }
            None if delta < 0 => ids.last().copied(),
            None => ids.first().copied(),
        };
        self.selected = next;
        if let Some(turn) = next {
            self.pending_turn = Some(turn);
        }
    }

    /// Assistant turn the answer actions apply to: the selection (or the
    /// answer below a selected question), otherwise the newest answer.
    fn target_assistant(&self) -> Option<TurnId> {
        let transcript = self.conversation.transcript();
        match self.selected.and_then(|id| transcript.get(id)) {
            Some(Entry::Assistant(turn)) => Some(turn.id),
            Some(Entry::User(turn)) => transcript.following_assistant(turn.id),
            _ => transcript.last_assistant(),
        }
    }

    fn target_user(&self) -> Option<TurnId> {
        let transcript = self.conversation.transcript();
        match self.selected.and_then(|id| transcript.get(id)) {
            Some(Entry::User(turn)) => Some(turn.id),
            Some(Entry::Assistant(turn)) => transcript.preceding_user(turn.id),
            _ => transcript.last_user(),
        }
    }

    pub fn begin_edit(&mut self) {
        let Some(turn) = self.target_user() else {
            return;
        };
        let Some(query) = self
            .conversation
            .transcript()
            .user(turn)
            .map(|user| user.query.clone())
        else {
            return;
        };
        match self.conversation.begin_edit(turn) {
            Ok(()) => {
                self.editing = Some(turn);
                self.selected = Some(turn);
                self.input.set(&query);
            }
            Err(e) => tracing::warn!("Cannot edit {}: {}", turn, e),
        }
    }

    pub fn sync_draft(&mut self) {
        if let Some(turn) = self.editing {
            if let Err(e) = self.conversation.update_draft(turn, self.input.content()) {
                tracing::warn!("Draft update for {} failed: {}", turn, e);
            }
        }
    }

    pub fn confirm_edit(&mut self, turn: TurnId) {
        let text = self.input.content().to_string();
        match self.conversation.confirm_edit(turn, &text) {
            Ok(EditOutcome::Ignored) => {}
            Ok(_) => self.finish_edit(),
            Err(e) => {
                tracing::warn!("Edit of {} failed: {}", turn, e);
                self.finish_edit();
            }
        }
    }

    pub fn cancel_edit(&mut self, turn: TurnId) {
        if let Err(e) = self.conversation.cancel_edit(turn) {
            tracing::warn!("Cancel edit of {} failed: {}", turn, e);
        }
        self.finish_edit();
    }

    fn finish_edit(&mut self) {
        self.editing = None;
        self.input.clear();
    }

    /// Regenerate the targeted answer, optionally in the other mode
    pub fn regenerate(&mut self, switch_mode: bool) {
        let Some(turn) = self.target_assistant() else {
            return;
        };
        let Some(mode) = self
            .conversation
            .transcript()
            .assistant(turn)
            .map(|t| if switch_mode { t.mode.toggled() } else { t.mode })
        else {
            return;
        };
        if let Err(e) = self.conversation.regenerate(turn, mode) {
            tracing::warn!("Regenerate {} failed: {}", turn, e);
        }
    }

    pub fn copy_selected(&mut self) {
        let turn = match self.selected {
            Some(turn) => Some(turn),
            None => self.target_assistant(),
        };
        match turn.and_then(|t| self.conversation.copy_text(t)) {
            Some(text) => self.copy_to_clipboard(text),
            None => self.show_toast(Toast::error("Nothing to copy yet")),
        }
    }

    pub fn ask_expert(&mut self) {
        let Some(url) = self
            .target_assistant()
            .and_then(|t| self.conversation.ask_expert_link(t))
            .map(str::to_string)
        else {
            return;
        };
        if let Err(e) = webbrowser::open(&url) {
            tracing::warn!("Failed to open {}: {}", url, e);
            self.show_toast(Toast::error("Could not open the browser"));
        }
    }

    pub fn cycle_tab(&mut self, delta: isize) {
        if let Some(turn) = self.target_assistant() {
            self.conversation.cycle_tab(turn, delta);
        }
    }

    /// Show more or fewer cards on the active list tab
    pub fn toggle_more(&mut self) {
        let Some(turn) = self.target_assistant() else {
            return;
        };
        let active = self
            .conversation
            .transcript()
            .assistant(turn)
            .and_then(|t| t.view.active_tab);
        if let Some(tab @ (Tab::Sources | Tab::Articles | Tab::Books)) = active {
            self.conversation.toggle_expanded(turn, tab);
        }
    }
}
