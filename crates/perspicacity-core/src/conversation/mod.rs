//! Conversation engine
//!
//! Ties the transcript, the session controller and the credential store
//! together. Frontends call the operations here, apply the session updates
//! they receive, and act on the returned [`Effect`]s.

mod regenerate;

pub use regenerate::EditOutcome;

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::{AnswerTransport, HistoryMessage, Mode, QueryRequest};
use crate::config::ClientConfig;
use crate::constants::session::{NO_ANSWER_PLACEHOLDER, STOPPED_PLACEHOLDER};
use crate::error::Result;
use crate::render::{HtmlMarkup, Markup, Renderer, ScrollFollow, Tab};
use crate::session::{
    EndCause, Envelope, SessionController, SessionPhase, SessionRequest, SessionUpdate,
};
use crate::storage::{CredentialStore, Credentials};
use crate::transcript::{reconstitute, Entry, Transcript, TranscriptSurface, TurnId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// Side effects for the frontend to carry out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Follow the newest content
    ScrollToBottom,
    /// Bring a turn into view
    ScrollToTurn(TurnId),
    Notify { message: String, level: NoticeLevel },
    /// Show where the credentials are configured
    OpenSettings,
}

/// Result of pressing the send/stop control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryAction {
    Submitted(TurnId),
    Stopped,
    /// Empty input while idle
    Ignored,
}

pub struct Conversation {
    transcript: Transcript,
    sessions: SessionController,
    credentials: CredentialStore,
    markup: Arc<dyn Markup>,
    follow: ScrollFollow,
    mode: Mode,
    ask_expert_url: String,
    effects: Vec<Effect>,
}

impl Conversation {
    pub fn new(
        config: &ClientConfig,
        transport: Arc<dyn AnswerTransport>,
        credentials: CredentialStore,
    ) -> Self {
        Self::with_markup(config, transport, credentials, Arc::new(HtmlMarkup))
    }

    pub fn with_markup(
        config: &ClientConfig,
        transport: Arc<dyn AnswerTransport>,
        credentials: CredentialStore,
        markup: Arc<dyn Markup>,
    ) -> Self {
        let renderer = Renderer::new(markup.clone())
            .with_pacing(config.reveal_delay(), config.follow_every_words);
        let sessions = SessionController::new(transport, Arc::new(renderer))
            .with_cold_start(config.cold_start_timeout());
        Self {
            transcript: Transcript::new(),
            sessions,
            credentials,
            markup,
            follow: ScrollFollow::new(config.scroll_threshold),
            mode: Mode::default(),
            ask_expert_url: config.ask_expert_url.clone(),
            effects: Vec::new(),
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn markup(&self) -> &Arc<dyn Markup> {
        &self.markup
    }

    /// Mode used for the next submitted query
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn toggle_mode(&mut self) -> Mode {
        self.mode = self.mode.toggled();
        self.mode
    }

    pub fn is_generating(&self) -> bool {
        self.sessions.is_active()
    }

    pub fn phase(&self) -> SessionPhase {
        self.sessions.phase()
    }

    pub fn last_outcome(&self) -> Option<SessionPhase> {
        self.sessions.last_outcome()
    }

    pub fn active_turn(&self) -> Option<TurnId> {
        self.sessions.active_turn()
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn credentials_mut(&mut self) -> &mut CredentialStore {
        &mut self.credentials
    }

    /// Drain effects produced since the last call
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    fn notify(&mut self, message: impl Into<String>, level: NoticeLevel) {
        self.effects.push(Effect::Notify {
            message: message.into(),
            level,
        });
    }

    /// Send while idle, stop while generating
    pub fn primary_action(&mut self, input: &str) -> Result<PrimaryAction> {
        if self.sessions.is_active() {
            self.stop();
            return Ok(PrimaryAction::Stopped);
        }
        Ok(match self.submit(input)? {
            Some(turn) => PrimaryAction::Submitted(turn),
            None => PrimaryAction::Ignored,
        })
    }

    /// Append a user/assistant pair and start a session for it.
    ///
    /// Returns the assistant turn, or `None` for blank input. Fails before
    /// touching the transcript when a credential is missing.
    pub fn submit(&mut self, input: &str) -> Result<Option<TurnId>> {
        let query = input.trim();
        if query.is_empty() {
            return Ok(None);
        }
        let credentials = self.resolve_credentials()?;

        // A submit never runs alongside another session
        self.interrupt();

        let mode = self.mode;
        let (user, assistant) = self.transcript.push_exchange(query, mode);
        self.follow.reset();
        self.effects.push(Effect::ScrollToTurn(user));

        let history = self.history_before(user);
        info!(
            "Submitting {} query for turn {} with {} history messages",
            mode,
            assistant,
            history.len()
        );
        self.launch(assistant, mode, query, history, &credentials);
        Ok(Some(assistant))
    }

    /// User stop. Leaves the turn interactive and notifies.
    pub fn stop(&mut self) -> bool {
        if !self.interrupt() {
            return false;
        }
        self.notify("Generation stopped", NoticeLevel::Info);
        true
    }

    /// Stop the active session and settle its turn, without notifying
    fn interrupt(&mut self) -> bool {
        let Some(stopped) = self.sessions.stop() else {
            return false;
        };
        let placeholder = self.markup.notice(STOPPED_PLACEHOLDER);
        if let Some(turn) = self.transcript.assistant_mut(stopped.turn) {
            turn.view
                .install_placeholder(turn.mode, placeholder, STOPPED_PLACEHOLDER);
            turn.view.attach_actions(&turn.query);
        }
        true
    }

    /// Apply one session update to its turn
    pub fn apply(&mut self, envelope: Envelope) {
        let turn_id = envelope.turn;
        let Some(turn) = self.transcript.assistant_mut(turn_id) else {
            warn!("Update for unknown turn {}", turn_id);
            return;
        };

        match envelope.update {
            SessionUpdate::Connected => debug!("Turn {} connected", turn_id),
            SessionUpdate::Progress { status } => turn.view.show_status(turn.mode, &status),
            SessionUpdate::Follow => {
                if self.follow.should_follow() {
                    self.effects.push(Effect::ScrollToBottom);
                }
            }
            SessionUpdate::AnswerReady(prepared) => turn.view.install(&prepared),
            SessionUpdate::Reveal(unit) => turn.view.append(&unit),
            SessionUpdate::RevealFinished => {
                turn.view.attach_actions(&turn.query);
            }
            SessionUpdate::Ended(cause) => self.finish(turn_id, cause),
        }
    }

    fn finish(&mut self, turn_id: TurnId, cause: EndCause) {
        let placeholder = self.markup.notice(NO_ANSWER_PLACEHOLDER);
        let Some(turn) = self.transcript.assistant_mut(turn_id) else {
            return;
        };
        match cause {
            EndCause::NoAnswer => {
                turn.view
                    .install_placeholder(turn.mode, placeholder, NO_ANSWER_PLACEHOLDER);
                turn.view.attach_actions(&turn.query);
            }
            EndCause::Stopped => {}
            _ => {
                turn.view.clear_indicator();
                turn.view.attach_actions(&turn.query);
            }
        }
    }

    /// Apply every pending update. Returns true if any was applied.
    pub fn pump(&mut self) -> bool {
        let mut applied = false;
        while let Some(envelope) = self.sessions.poll() {
            self.apply(envelope);
            applied = true;
        }
        applied
    }

    /// Wait for and apply the next update. Pending forever while idle.
    pub async fn step(&mut self) -> bool {
        match self.sessions.next().await {
            Some(envelope) => {
                self.apply(envelope);
                true
            }
            None => false,
        }
    }

    /// Drive the active session to its end
    pub async fn settle(&mut self) {
        while self.sessions.is_active() {
            if !self.step().await {
                break;
            }
        }
    }

    /// Record a reader-initiated scroll
    pub fn on_user_scroll(&mut self, distance_from_bottom: usize) {
        self.follow.on_user_scroll(distance_from_bottom);
    }

    pub fn follow(&self) -> &ScrollFollow {
        &self.follow
    }

    /// Start a new conversation below the current one
    pub fn new_conversation(&mut self) {
        self.interrupt();
        if self.transcript.start_conversation() {
            info!("New conversation started");
        }
        self.follow.reset();
        self.effects.push(Effect::ScrollToBottom);
    }

    pub fn select_tab(&mut self, turn: TurnId, tab: Tab) -> bool {
        self.transcript
            .assistant_mut(turn)
            .map(|t| t.view.select_tab(tab))
            .unwrap_or(false)
    }

    pub fn cycle_tab(&mut self, turn: TurnId, delta: isize) -> Option<Tab> {
        self.transcript
            .assistant_mut(turn)
            .and_then(|t| t.view.cycle_tab(delta))
    }

    /// Show or hide the cards beyond the first few on a list tab
    pub fn toggle_expanded(&mut self, turn: TurnId, tab: Tab) {
        if let Some(turn) = self.transcript.assistant_mut(turn) {
            turn.view.toggle_expanded(tab);
        }
    }

    /// Clipboard text for a turn: the query for user turns, the copy action
    /// payload for finished answers.
    pub fn copy_text(&self, turn: TurnId) -> Option<String> {
        match self.transcript.get(turn)? {
            Entry::User(user) => Some(user.query.clone()),
            Entry::Assistant(assistant) => assistant
                .view
                .actions
                .as_ref()
                .map(|actions| actions.copy_text.clone()),
            Entry::ConversationStart => None,
        }
    }

    /// Link for the ask-an-expert action when the answer offers it
    pub fn ask_expert_link(&self, turn: TurnId) -> Option<&str> {
        let assistant = self.transcript.assistant(turn)?;
        assistant
            .view
            .actions
            .as_ref()
            .filter(|actions| actions.ask_expert)
            .map(|_| self.ask_expert_url.as_str())
    }

    /// History that precedes `turn`, read back from the transcript
    pub fn history_before(&self, turn: TurnId) -> Vec<HistoryMessage> {
        let surface = TranscriptSurface::new(&self.transcript, self.markup.as_ref());
        reconstitute(&surface, turn)
    }

    fn resolve_credentials(&mut self) -> Result<Credentials> {
        if let Err(e) = self.credentials.reload() {
            warn!("Failed to reload credentials: {}", e);
        }
        match self.credentials.credentials() {
            Ok(credentials) => Ok(credentials),
            Err(e) => {
                if let Some(key) = self.credentials.first_missing() {
                    self.notify(
                        format!("Please set your {} API key in settings", key.display_name()),
                        NoticeLevel::Error,
                    );
                }
                self.effects.push(Effect::OpenSettings);
                Err(e)
            }
        }
    }

    fn launch(
        &mut self,
        turn: TurnId,
        mode: Mode,
        query: &str,
        history: Vec<HistoryMessage>,
        credentials: &Credentials,
    ) {
        let request = QueryRequest::new(query, history, credentials);
        self.sessions.start(SessionRequest {
            turn,
            mode,
            request,
        });
    }
}
