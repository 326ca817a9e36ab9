//! Conversation transcript
//!
//! Ordered user and assistant turns plus conversation-start markers. The
//! transcript is the display surface: history for the next request is read
//! back from it rather than kept in a parallel structure.

mod context;
mod view;

pub use context::{reconstitute, DisplaySurface, RenderedEntry, TranscriptSurface};
pub use view::{ActionBar, AnswerView, ResearchStep};

use std::fmt;

use crate::api::Mode;

/// Stable identifier of a transcript turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TurnId(u64);

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A user query as displayed
#[derive(Debug, Clone)]
pub struct UserTurn {
    pub id: TurnId,
    pub query: String,
    pub mode: Mode,
    /// In-progress edit text while the turn is being edited
    pub draft: Option<String>,
}

impl UserTurn {
    pub fn is_editing(&self) -> bool {
        self.draft.is_some()
    }
}

/// An answer area bound to the query and mode that produced it
#[derive(Debug, Clone)]
pub struct AssistantTurn {
    pub id: TurnId,
    pub query: String,
    pub mode: Mode,
    pub view: AnswerView,
}

#[derive(Debug, Clone)]
pub enum Entry {
    /// Boundary that history reconstruction never crosses
    ConversationStart,
    User(UserTurn),
    Assistant(AssistantTurn),
}

impl Entry {
    pub fn id(&self) -> Option<TurnId> {
        match self {
            Entry::ConversationStart => None,
            Entry::User(turn) => Some(turn.id),
            Entry::Assistant(turn) => Some(turn.id),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Transcript {
    entries: Vec<Entry>,
    next_id: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self {
            entries: vec![Entry::ConversationStart],
            next_id: 1,
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Number of user/assistant turns, markers excluded
    pub fn turn_count(&self) -> usize {
        self.entries.iter().filter(|e| e.id().is_some()).count()
    }

    fn allocate(&mut self) -> TurnId {
        let id = TurnId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Append a user turn and its empty answer area together.
    pub fn push_exchange(&mut self, query: &str, mode: Mode) -> (TurnId, TurnId) {
        let user = self.allocate();
        let assistant = self.allocate();
        self.entries.push(Entry::User(UserTurn {
            id: user,
            query: query.to_string(),
            mode,
            draft: None,
        }));
        self.entries.push(Entry::Assistant(AssistantTurn {
            id: assistant,
            query: query.to_string(),
            mode,
            view: AnswerView::default(),
        }));
        (user, assistant)
    }

    /// Begin a new conversation. Returns false if one was just started.
    pub fn start_conversation(&mut self) -> bool {
        if matches!(self.entries.last(), Some(Entry::ConversationStart)) {
            return false;
        }
        self.entries.push(Entry::ConversationStart);
        true
    }

    pub fn position(&self, id: TurnId) -> Option<usize> {
        self.entries.iter().position(|e| e.id() == Some(id))
    }

    pub fn get(&self, id: TurnId) -> Option<&Entry> {
        self.position(id).map(|index| &self.entries[index])
    }

    pub fn user(&self, id: TurnId) -> Option<&UserTurn> {
        match self.get(id) {
            Some(Entry::User(turn)) => Some(turn),
            _ => None,
        }
    }

    pub fn user_mut(&mut self, id: TurnId) -> Option<&mut UserTurn> {
        let index = self.position(id)?;
        match &mut self.entries[index] {
            Entry::User(turn) => Some(turn),
            _ => None,
        }
    }

    pub fn assistant(&self, id: TurnId) -> Option<&AssistantTurn> {
        match self.get(id) {
            Some(Entry::Assistant(turn)) => Some(turn),
            _ => None,
        }
    }

    pub fn assistant_mut(&mut self, id: TurnId) -> Option<&mut AssistantTurn> {
        let index = self.position(id)?;
        match &mut self.entries[index] {
            Entry::Assistant(turn) => Some(turn),
            _ => None,
        }
    }

    /// The answer area immediately after a user turn, if any
    pub fn following_assistant(&self, user: TurnId) -> Option<TurnId> {
        let index = self.position(user)?;
        match self.entries.get(index + 1) {
            Some(Entry::Assistant(turn)) => Some(turn.id),
            _ => None,
        }
    }

    /// The user turn immediately before an answer area, if any
    pub fn preceding_user(&self, assistant: TurnId) -> Option<TurnId> {
        let index = self.position(assistant)?;
        match index.checked_sub(1).and_then(|i| self.entries.get(i)) {
            Some(Entry::User(turn)) => Some(turn.id),
            _ => None,
        }
    }

    pub fn last_assistant(&self) -> Option<TurnId> {
        self.entries.iter().rev().find_map(|e| match e {
            Entry::Assistant(turn) => Some(turn.id),
            _ => None,
        })
    }

    pub fn last_user(&self) -> Option<TurnId> {
        self.entries.iter().rev().find_map(|e| match e {
            Entry::User(turn) => Some(turn.id),
            _ => None,
        })
    }

    /// Turn ids in display order
    pub fn turn_ids(&self) -> impl Iterator<Item = TurnId> + '_ {
        self.entries.iter().filter_map(Entry::id)
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exchange_is_adjacent_pair() {
        let mut transcript = Transcript::new();
        let (user, assistant) = transcript.push_exchange("q", Mode::Research);

        assert_eq!(transcript.following_assistant(user), Some(assistant));
        assert_eq!(transcript.preceding_user(assistant), Some(user));
        assert_eq!(transcript.assistant(assistant).map(|t| t.mode), Some(Mode::Research));
        assert_eq!(transcript.turn_count(), 2);
    }

    #[test]
    fn test_lookups_reject_wrong_kind() {
        let mut transcript = Transcript::new();
        let (user, assistant) = transcript.push_exchange("q", Mode::Search);
        assert!(transcript.user(assistant).is_none());
        assert!(transcript.assistant(user).is_none());
        assert!(transcript.following_assistant(assistant).is_none());
    }

    #[test]
    fn test_conversation_markers_do_not_stack() {
        let mut transcript = Transcript::new();
        assert!(!transcript.start_conversation());
        transcript.push_exchange("q", Mode::Search);
        assert!(transcript.start_conversation());
        assert!(!transcript.start_conversation());
        assert_eq!(transcript.entries().len(), 4);
    }

    #[test]
    fn test_last_turns() {
        let mut transcript = Transcript::new();
        assert!(transcript.last_assistant().is_none());
        transcript.push_exchange("a", Mode::Search);
        let (user, assistant) = transcript.push_exchange("b", Mode::Search);
        assert_eq!(transcript.last_user(), Some(user));
        assert_eq!(transcript.last_assistant(), Some(assistant));
        assert_eq!(transcript.turn_ids().count(), 4);
    }
}
