//! History reconstruction from what the transcript displays

use super::{Entry, Transcript, TurnId};
use crate::api::{HistoryMessage, Role};
use crate::render::text::strip_citation_markers;
use crate::render::Markup;

/// One displayed entry, as plain text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedEntry {
    ConversationStart,
    Turn { role: Role, text: String },
}

/// Read access to a display surface
pub trait DisplaySurface {
    /// Entries strictly before `id`, newest first
    fn rendered_before(&self, id: TurnId) -> Vec<RenderedEntry>;
}

/// Ordered history of the turns preceding `id`, oldest first.
///
/// Stops at the nearest conversation-start marker. Assistant text has
/// citation markers removed and whitespace collapsed. Entries left empty
/// are omitted.
pub fn reconstitute(surface: &dyn DisplaySurface, id: TurnId) -> Vec<HistoryMessage> {
    let mut history = Vec::new();
    for entry in surface.rendered_before(id) {
        let (role, text) = match entry {
            RenderedEntry::ConversationStart => break,
            RenderedEntry::Turn { role, text } => (role, text),
        };
        let content = match role {
            Role::User => text.trim().to_string(),
            Role::Assistant => strip_citation_markers(&text),
        };
        if !content.is_empty() {
            history.push(HistoryMessage::new(role, content));
        }
    }
    history.reverse();
    history
}

/// A transcript viewed through the markup that painted it
pub struct TranscriptSurface<'a> {
    transcript: &'a Transcript,
    markup: &'a dyn Markup,
}

impl<'a> TranscriptSurface<'a> {
    pub fn new(transcript: &'a Transcript, markup: &'a dyn Markup) -> Self {
        Self { transcript, markup }
    }
}

impl DisplaySurface for TranscriptSurface<'_> {
    fn rendered_before(&self, id: TurnId) -> Vec<RenderedEntry> {
        let entries = self.transcript.entries();
        let end = self.transcript.position(id).unwrap_or(entries.len());
        entries[..end]
            .iter()
            .rev()
            .map(|entry| match entry {
                Entry::ConversationStart => RenderedEntry::ConversationStart,
                Entry::User(turn) => RenderedEntry::Turn {
                    role: Role::User,
                    text: turn.query.clone(),
                },
                // Only the primary answer area counts, never indicators or actions
                Entry::Assistant(turn) => RenderedEntry::Turn {
                    role: Role::Assistant,
                    text: turn
                        .view
                        .answer
                        .as_deref()
                        .map(|markup| self.markup.text_content(markup))
                        .unwrap_or_default(),
                },
            })
            .collect()
    }
}
