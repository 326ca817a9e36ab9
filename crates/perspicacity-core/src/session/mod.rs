//! Streaming answer sessions
//!
//! A session is one request/response cycle producing one assistant turn.
//! At most one session is active. Its driver task reports through a shared
//! channel, tagging every update with the session id so late updates from a
//! superseded or stopped session are discarded.

mod driver;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use crate::api::{AnswerTransport, Mode, QueryRequest};
use crate::constants;
use crate::render::{PreparedAnswer, Renderer};
use crate::transcript::TurnId;

use driver::{Emitter, SessionTask};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Lifecycle of the controller.
///
/// `Completed`, `Failed` and `Stopped` are reported by
/// [`SessionController::last_outcome`]; once a session ends the controller
/// itself is back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    /// Request sent, nothing received yet
    Sending,
    /// First chunk received
    Streaming,
    Completed,
    Failed,
    Stopped,
}

/// Why a session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndCause {
    /// A success answer was revealed
    Completed,
    /// The server reported an error, revealed as the answer
    ServerError,
    /// The stream closed without a terminal event
    NoAnswer,
    /// Nothing arrived before the cold-start deadline
    TimedOut,
    /// The server could not be reached
    Unreachable,
    /// Any other failure, revealed as the answer
    Failed(String),
    /// The user stopped generation
    Stopped,
}

impl EndCause {
    pub fn phase(&self) -> SessionPhase {
        match self {
            EndCause::Completed | EndCause::NoAnswer => SessionPhase::Completed,
            EndCause::Stopped => SessionPhase::Stopped,
            EndCause::ServerError
            | EndCause::TimedOut
            | EndCause::Unreachable
            | EndCause::Failed(_) => SessionPhase::Failed,
        }
    }
}

#[derive(Debug, Clone)]
pub enum SessionUpdate {
    /// First response chunk arrived; the cold-start deadline is disarmed
    Connected,
    Progress { status: String },
    /// Move the view to the newest content if the reader allows it
    Follow,
    /// Create the tabbed answer area, answer text still empty
    AnswerReady(Box<PreparedAnswer>),
    /// Next revealed unit of answer markup
    Reveal(String),
    /// The whole answer is on screen
    RevealFinished,
    Ended(EndCause),
}

#[derive(Debug, Clone)]
pub struct Envelope {
    pub session: SessionId,
    pub turn: TurnId,
    pub update: SessionUpdate,
}

/// Cause flags, written before cancellation is signalled and read after
/// the driver observes it.
#[derive(Debug, Default)]
pub(crate) struct SessionFlags {
    stopped_by_user: AtomicBool,
    timed_out: AtomicBool,
}

impl SessionFlags {
    fn mark_stopped(&self) {
        self.stopped_by_user.store(true, Ordering::SeqCst);
    }

    fn mark_timed_out(&self) {
        self.timed_out.store(true, Ordering::SeqCst);
    }

    fn stopped_by_user(&self) -> bool {
        self.stopped_by_user.load(Ordering::SeqCst)
    }

    fn timed_out(&self) -> bool {
        self.timed_out.load(Ordering::SeqCst)
    }
}

/// What a new session should produce
#[derive(Debug, Clone)]
pub struct SessionRequest {
    pub turn: TurnId,
    pub mode: Mode,
    pub request: QueryRequest,
}

/// The session that a user stop interrupted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoppedSession {
    pub id: SessionId,
    pub turn: TurnId,
    pub mode: Mode,
}

struct ActiveSession {
    id: SessionId,
    turn: TurnId,
    mode: Mode,
    phase: SessionPhase,
    /// Parent token. Cancelling it stops both transport and reveal.
    stop: CancellationToken,
    flags: Arc<SessionFlags>,
    handle: JoinHandle<()>,
}

/// Owns the single active session and the update channel
pub struct SessionController {
    transport: Arc<dyn AnswerTransport>,
    renderer: Arc<Renderer>,
    cold_start: Duration,
    active: Option<ActiveSession>,
    last_outcome: Option<SessionPhase>,
    next_id: u64,
    tx: mpsc::UnboundedSender<Envelope>,
    rx: mpsc::UnboundedReceiver<Envelope>,
}

impl SessionController {
    pub fn new(transport: Arc<dyn AnswerTransport>, renderer: Arc<Renderer>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            transport,
            renderer,
            cold_start: constants::session::COLD_START_TIMEOUT,
            active: None,
            last_outcome: None,
            next_id: 1,
            tx,
            rx,
        }
    }

    pub fn with_cold_start(mut self, timeout: Duration) -> Self {
        self.cold_start = timeout;
        self
    }

    pub fn renderer(&self) -> &Arc<Renderer> {
        &self.renderer
    }

    pub fn phase(&self) -> SessionPhase {
        self.active
            .as_ref()
            .map(|s| s.phase)
            .unwrap_or(SessionPhase::Idle)
    }

    /// Terminal phase of the most recent session, if any has ended
    pub fn last_outcome(&self) -> Option<SessionPhase> {
        self.last_outcome
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_turn(&self) -> Option<TurnId> {
        self.active.as_ref().map(|s| s.turn)
    }

    pub fn active_id(&self) -> Option<SessionId> {
        self.active.as_ref().map(|s| s.id)
    }

    /// Start a session, abandoning any session still running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self, request: SessionRequest) -> SessionId {
        self.abandon();

        let id = SessionId(self.next_id);
        self.next_id += 1;

        let stop = CancellationToken::new();
        let flags = Arc::new(SessionFlags::default());
        let task = SessionTask {
            mode: request.mode,
            request: request.request,
            transport: self.transport.clone(),
            renderer: self.renderer.clone(),
            cold_start: self.cold_start,
            stop: stop.clone(),
            flags: flags.clone(),
            emit: Emitter::new(self.tx.clone(), id, request.turn),
        };
        let handle = tokio::spawn(task.run());

        info!("Started {} ({}) for turn {}", id, request.mode, request.turn);
        self.active = Some(ActiveSession {
            id,
            turn: request.turn,
            mode: request.mode,
            phase: SessionPhase::Sending,
            stop,
            flags,
            handle,
        });
        id
    }

    /// User stop. Cancels transport and reveal and forgets the session at once.
    pub fn stop(&mut self) -> Option<StoppedSession> {
        let active = self.active.take()?;
        active.flags.mark_stopped();
        active.stop.cancel();
        self.last_outcome = Some(SessionPhase::Stopped);
        info!("Stopped {} for turn {}", active.id, active.turn);
        Some(StoppedSession {
            id: active.id,
            turn: active.turn,
            mode: active.mode,
        })
    }

    /// Drop the active session without user-stop semantics.
    pub fn abandon(&mut self) {
        if let Some(active) = self.active.take() {
            debug!("Abandoning {} for turn {}", active.id, active.turn);
            active.stop.cancel();
            active.handle.abort();
        }
    }

    /// Keep updates for the active session, tracking its phase
    fn accept(&mut self, envelope: Envelope) -> Option<Envelope> {
        let Some(active) = self.active.as_mut().filter(|a| a.id == envelope.session) else {
            trace!("Discarding stale update from {}", envelope.session);
            return None;
        };
        match &envelope.update {
            SessionUpdate::Connected => active.phase = SessionPhase::Streaming,
            SessionUpdate::Ended(cause) => {
                info!("{} ended: {:?}", active.id, cause);
                self.last_outcome = Some(cause.phase());
                self.active = None;
            }
            _ => {}
        }
        Some(envelope)
    }

    /// Next pending update without waiting
    pub fn poll(&mut self) -> Option<Envelope> {
        while let Ok(envelope) = self.rx.try_recv() {
            if let Some(envelope) = self.accept(envelope) {
                return Some(envelope);
            }
        }
        None
    }

    /// Wait for the next update of the active session.
    ///
    /// Pending forever while idle, which suits a `select!` arm.
    pub async fn next(&mut self) -> Option<Envelope> {
        loop {
            let envelope = self.rx.recv().await?;
            if let Some(envelope) = self.accept(envelope) {
                return Some(envelope);
            }
        }
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.abandon();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{AnswerResponse, ByteStream, HistoryMessage};
    use crate::error::Result;
    use crate::render::HtmlMarkup;
    use crate::storage::Credentials;
    use crate::transcript::Transcript;
    use async_trait::async_trait;
    use bytes::Bytes;
    use futures::StreamExt;
    use std::sync::Mutex;

    /// Replies with fixed frames, or never when `frames` is `None`
    struct Scripted {
        frames: Option<Vec<&'static str>>,
        opened: Mutex<Vec<Mode>>,
    }

    #[async_trait]
    impl AnswerTransport for Scripted {
        async fn open(&self, mode: Mode, _request: &QueryRequest) -> Result<AnswerResponse> {
            self.opened.lock().unwrap().push(mode);
            let Some(frames) = self.frames.clone() else {
                return futures::future::pending().await;
            };
            let body: ByteStream = futures::stream::iter(
                frames
                    .into_iter()
                    .map(|f| Ok(Bytes::from(format!("data: {f}\n")))),
            )
            .boxed();
            Ok(AnswerResponse {
                is_event_stream: true,
                body,
            })
        }
    }

    fn controller(frames: Option<Vec<&'static str>>) -> SessionController {
        let transport = Arc::new(Scripted {
            frames,
            opened: Mutex::new(Vec::new()),
        });
        let renderer = Arc::new(Renderer::new(Arc::new(HtmlMarkup)));
        SessionController::new(transport, renderer)
    }

    fn request(turn: TurnId, mode: Mode) -> SessionRequest {
        let credentials = Credentials {
            api_key: "g".into(),
            google_api_key: "k".into(),
        };
        SessionRequest {
            turn,
            mode,
            request: QueryRequest::new("q", Vec::<HistoryMessage>::new(), &credentials),
        }
    }

    fn turns() -> (TurnId, TurnId) {
        let mut transcript = Transcript::new();
        let (_, first) = transcript.push_exchange("a", Mode::Search);
        let (_, second) = transcript.push_exchange("b", Mode::Search);
        (first, second)
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_runs_to_completion() {
        let mut sessions = controller(Some(vec![r#"{"status":"Working"}"#, r#"{"final_answer":"Done"}"#]));
        let (turn, _) = turns();
        sessions.start(request(turn, Mode::Search));
        assert_eq!(sessions.phase(), SessionPhase::Sending);

        let mut updates = Vec::new();
        while sessions.is_active() {
            if let Some(envelope) = sessions.next().await {
                updates.push(envelope.update);
            }
        }

        assert!(matches!(updates.first(), Some(SessionUpdate::Connected)));
        assert!(updates
            .iter()
            .any(|u| matches!(u, SessionUpdate::Progress { status } if status == "Working")));
        assert!(updates.iter().any(|u| matches!(u, SessionUpdate::RevealFinished)));
        assert!(matches!(updates.last(), Some(SessionUpdate::Ended(EndCause::Completed))));
        assert_eq!(sessions.phase(), SessionPhase::Idle);
        assert_eq!(sessions.last_outcome(), Some(SessionPhase::Completed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_session_supersedes_old() {
        let mut sessions = controller(None);
        let (first, second) = turns();
        let old = sessions.start(request(first, Mode::Search));
        let new = sessions.start(request(second, Mode::Research));

        assert_ne!(old, new);
        assert_eq!(sessions.active_id(), Some(new));
        assert_eq!(sessions.active_turn(), Some(second));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_clears_session_and_drops_late_updates() {
        let mut sessions = controller(None);
        let (turn, _) = turns();
        let id = sessions.start(request(turn, Mode::Search));

        let stopped = sessions.stop();
        assert_eq!(
            stopped,
            Some(StoppedSession {
                id,
                turn,
                mode: Mode::Search
            })
        );
        assert!(!sessions.is_active());
        assert_eq!(sessions.last_outcome(), Some(SessionPhase::Stopped));

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(sessions.poll().is_none());
        assert!(sessions.stop().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cold_start_timeout_reveals_busy_message() {
        let mut sessions = controller(None).with_cold_start(Duration::from_millis(8000));
        let (turn, _) = turns();
        sessions.start(request(turn, Mode::Search));

        let mut revealed = String::new();
        let mut cause = None;
        while sessions.is_active() {
            match sessions.next().await.map(|e| e.update) {
                Some(SessionUpdate::Reveal(unit)) => revealed.push_str(&unit),
                Some(SessionUpdate::Ended(c)) => cause = Some(c),
                _ => {}
            }
        }

        assert_eq!(cause, Some(EndCause::TimedOut));
        assert!(revealed.contains("busy or just waking up"));
        assert_eq!(sessions.last_outcome(), Some(SessionPhase::Failed));
    }
}
