//! Editing queries and regenerating answers in place

use tracing::info;

use super::{Conversation, Effect, NoticeLevel};
use crate::api::Mode;
use crate::error::{EngineError, Result};
use crate::transcript::{AnswerView, Entry, TurnId, UserTurn};

/// What confirming an edit did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// Blank text; the turn stays in edit mode
    Ignored,
    /// Same text; edit mode closed, nothing else changed
    Unchanged,
    /// Query updated and the following answer regenerated
    Regenerated(TurnId),
    /// Query updated but no answer follows it
    Updated,
}

impl Conversation {
    fn user_turn_mut(&mut self, id: TurnId) -> Result<&mut UserTurn> {
        match self.transcript.get(id) {
            None => return Err(EngineError::TurnNotFound(id)),
            Some(Entry::User(_)) => {}
            Some(_) => return Err(EngineError::NotEditable(id)),
        }
        self.transcript
            .user_mut(id)
            .ok_or(EngineError::TurnNotFound(id))
    }

    /// Switch a user turn into edit mode, seeding the draft with its query
    pub fn begin_edit(&mut self, id: TurnId) -> Result<()> {
        let turn = self.user_turn_mut(id)?;
        if turn.draft.is_none() {
            turn.draft = Some(turn.query.clone());
        }
        Ok(())
    }

    pub fn update_draft(&mut self, id: TurnId, text: &str) -> Result<()> {
        let turn = self.user_turn_mut(id)?;
        turn.draft = Some(text.to_string());
        Ok(())
    }

    pub fn cancel_edit(&mut self, id: TurnId) -> Result<()> {
        self.user_turn_mut(id)?.draft = None;
        Ok(())
    }

    /// Confirm an edit with `text`.
    ///
    /// A changed query regenerates the answer right after it, in that
    /// answer's current mode.
    pub fn confirm_edit(&mut self, id: TurnId, text: &str) -> Result<EditOutcome> {
        let query = text.trim();
        if query.is_empty() {
            return Ok(EditOutcome::Ignored);
        }

        let turn = self.user_turn_mut(id)?;
        turn.draft = None;
        if turn.query == query {
            return Ok(EditOutcome::Unchanged);
        }
        turn.query = query.to_string();
        info!("Query of turn {} edited", id);

        match self.transcript.following_assistant(id) {
            Some(assistant) => {
                let mode = self
                    .transcript
                    .assistant(assistant)
                    .map(|t| t.mode)
                    .ok_or(EngineError::NothingToRegenerate(assistant))?;
                self.restart(assistant, mode, Some(query))?;
                Ok(EditOutcome::Regenerated(assistant))
            }
            None => {
                self.notify("Could not find response to regenerate", NoticeLevel::Error);
                Ok(EditOutcome::Updated)
            }
        }
    }

    /// Regenerate an answer in `mode`, keeping its query and position
    pub fn regenerate(&mut self, assistant: TurnId, mode: Mode) -> Result<()> {
        self.restart(assistant, mode, None)
    }

    /// Clear an answer area and run a fresh session for it
    fn restart(&mut self, assistant: TurnId, mode: Mode, query: Option<&str>) -> Result<()> {
        match self.transcript.get(assistant) {
            None => return Err(EngineError::TurnNotFound(assistant)),
            Some(Entry::Assistant(_)) => {}
            Some(_) => return Err(EngineError::NothingToRegenerate(assistant)),
        }
        let credentials = self.resolve_credentials()?;

        self.interrupt();

        let turn = self
            .transcript
            .assistant_mut(assistant)
            .ok_or(EngineError::NothingToRegenerate(assistant))?;
        if let Some(query) = query {
            turn.query = query.to_string();
        }
        turn.mode = mode;
        turn.view = AnswerView::default();
        let query = turn.query.clone();

        self.follow.reset();
        self.effects.push(Effect::ScrollToTurn(assistant));

        // History includes the (possibly edited) query this answer belongs to
        let history = self.history_before(assistant);
        info!(
            "Regenerating turn {} in {} mode with {} history messages",
            assistant,
            mode,
            history.len()
        );
        self.launch(assistant, mode, &query, history, &credentials);
        Ok(())
    }
}
