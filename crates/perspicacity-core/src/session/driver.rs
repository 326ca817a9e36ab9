//! Session driver task
//!
//! Races the cold-start deadline against the transport, decodes frames,
//! interprets events and reveals terminal answers. The user-stop token is
//! the parent of the transport token, so a deadline can cut the transport
//! while leaving the reveal of the busy message intact.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::{EndCause, Envelope, SessionFlags, SessionId, SessionUpdate};
use crate::api::{interpret, AnswerPayload, AnswerTransport, FrameDecoder, Mode, QueryRequest, StreamEvent};
use crate::constants::session::{GENERAL_ERROR_MESSAGE, SERVER_BUSY_MESSAGE};
use crate::error::EngineError;
use crate::render::{RevealOutcome, RevealSink, Renderer};
use crate::transcript::TurnId;

/// Tags and forwards updates for one session
#[derive(Clone)]
pub(super) struct Emitter {
    tx: mpsc::UnboundedSender<Envelope>,
    session: SessionId,
    turn: TurnId,
}

impl Emitter {
    pub(super) fn new(tx: mpsc::UnboundedSender<Envelope>, session: SessionId, turn: TurnId) -> Self {
        Self { tx, session, turn }
    }

    fn send(&self, update: SessionUpdate) {
        // The receiver lives as long as the controller
        let _ = self.tx.send(Envelope {
            session: self.session,
            turn: self.turn,
            update,
        });
    }
}

impl RevealSink for Emitter {
    fn append(&mut self, unit: &str) {
        self.send(SessionUpdate::Reveal(unit.to_string()));
    }

    fn follow(&mut self) {
        self.send(SessionUpdate::Follow);
    }
}

/// How the transport phase ended
enum StreamEnd {
    /// A terminal event was handled; `failure` if it was a server error
    Answered { failure: bool },
    /// Closed without any terminal event
    Exhausted,
    /// A cancellation was observed; the flags tell which one
    Cancelled,
    Errored(EngineError),
}

pub(super) struct SessionTask {
    pub(super) mode: Mode,
    pub(super) request: QueryRequest,
    pub(super) transport: Arc<dyn AnswerTransport>,
    pub(super) renderer: Arc<Renderer>,
    pub(super) cold_start: Duration,
    pub(super) stop: CancellationToken,
    pub(super) flags: Arc<SessionFlags>,
    pub(super) emit: Emitter,
}

impl SessionTask {
    pub(super) async fn run(self) {
        let transport_token = self.stop.child_token();
        let mut steps = Vec::new();

        let end = self.stream(&transport_token, &mut steps).await;

        let cause = match end {
            StreamEnd::Answered { failure: false } => EndCause::Completed,
            StreamEnd::Answered { failure: true } => EndCause::ServerError,
            StreamEnd::Exhausted => EndCause::NoAnswer,
            StreamEnd::Cancelled if self.flags.stopped_by_user() => EndCause::Stopped,
            StreamEnd::Cancelled if self.flags.timed_out() => {
                self.present(AnswerPayload::text_only(SERVER_BUSY_MESSAGE), steps)
                    .await;
                EndCause::TimedOut
            }
            // Superseded; nobody is listening
            StreamEnd::Cancelled => return,
            StreamEnd::Errored(e) if e.is_network() => {
                warn!("Answer service unreachable: {}", e);
                self.present(AnswerPayload::text_only(SERVER_BUSY_MESSAGE), steps)
                    .await;
                EndCause::Unreachable
            }
            StreamEnd::Errored(e) => {
                if let EngineError::Status(code, body) = &e {
                    error!("Answer service returned {}: {}", code, body);
                } else {
                    error!("Answer session failed: {}", e);
                }
                let message = match e.to_string() {
                    text if text.trim().is_empty() => GENERAL_ERROR_MESSAGE.to_string(),
                    text => text,
                };
                self.present(AnswerPayload::text_only(message.clone()), steps)
                    .await;
                EndCause::Failed(message)
            }
        };

        self.emit.send(SessionUpdate::Ended(cause));
    }

    async fn stream(&self, cancel: &CancellationToken, steps: &mut Vec<String>) -> StreamEnd {
        let deadline = tokio::time::sleep(self.cold_start);
        tokio::pin!(deadline);

        let opened = tokio::select! {
            biased;
            _ = cancel.cancelled() => return StreamEnd::Cancelled,
            _ = &mut deadline => return self.expire(cancel),
            opened = self.transport.open(self.mode, &self.request) => opened,
        };
        let response = match opened {
            Ok(response) => response,
            Err(e) => return StreamEnd::Errored(e),
        };
        if !response.is_event_stream {
            warn!("Response is not an event stream; nothing to render");
            return StreamEnd::Exhausted;
        }

        let mut body = response.body;
        let mut decoder = FrameDecoder::new();
        let mut first_contact = false;
        // Some(is_failure) once the first terminal event was handled
        let mut terminal: Option<bool> = None;

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return StreamEnd::Cancelled,
                _ = &mut deadline, if !first_contact => return self.expire(cancel),
                next = body.next() => next,
            };

            if !first_contact {
                first_contact = true;
                debug!("First response chunk received");
                self.emit.send(SessionUpdate::Connected);
            }

            let bytes = match next {
                Some(Ok(bytes)) => bytes,
                Some(Err(e)) if terminal.is_some() => {
                    warn!("Stream failed after the terminal event: {}", e);
                    break;
                }
                Some(Err(e)) => return StreamEnd::Errored(e),
                None => break,
            };

            let frames: Vec<String> = decoder.push(&bytes).collect();
            for payload in frames {
                let event = match interpret(&payload) {
                    Ok(Some(event)) => event,
                    Ok(None) => {
                        debug!("Frame without status, answer or error: {}", payload);
                        continue;
                    }
                    Err(e) => {
                        warn!("Skipping malformed frame: {} ({})", e, payload);
                        continue;
                    }
                };

                match event {
                    StreamEvent::Progress { .. } if terminal.is_some() => {
                        debug!("Ignoring progress after terminal event");
                    }
                    StreamEvent::Progress { status } => self.progress(status, steps),
                    _ if terminal.is_some() => {
                        warn!("Ignoring additional terminal event");
                    }
                    StreamEvent::Success(payload) => {
                        terminal = Some(false);
                        info!(
                            "Answer received: {} chars, {} sources",
                            payload.answer.len(),
                            payload.sources.len()
                        );
                        self.present(payload, steps.clone()).await;
                    }
                    StreamEvent::Failure { message } => {
                        terminal = Some(true);
                        warn!("Server reported error: {}", message);
                        self.present(AnswerPayload::text_only(message), steps.clone())
                            .await;
                    }
                }

                if cancel.is_cancelled() {
                    return StreamEnd::Cancelled;
                }
            }
        }

        decoder.finish();
        match terminal {
            Some(failure) => StreamEnd::Answered { failure },
            None => StreamEnd::Exhausted,
        }
    }

    fn expire(&self, cancel: &CancellationToken) -> StreamEnd {
        warn!("No response within {:?}", self.cold_start);
        self.flags.mark_timed_out();
        cancel.cancel();
        StreamEnd::Cancelled
    }

    fn progress(&self, status: String, steps: &mut Vec<String>) {
        debug!("Progress: {}", status);
        let research = self.mode == Mode::Research;
        if research {
            steps.push(status.clone());
        }
        self.emit.send(SessionUpdate::Progress { status });
        if research {
            self.emit.send(SessionUpdate::Follow);
        }
    }

    /// Prepare and reveal an answer. Only a user stop interrupts the reveal.
    async fn present(&self, payload: AnswerPayload, steps: Vec<String>) {
        let prepared = self.renderer.prepare(payload, self.mode, steps);
        self.emit
            .send(SessionUpdate::AnswerReady(Box::new(prepared.clone())));

        let mut sink = self.emit.clone();
        match self.renderer.reveal(&prepared, &mut sink, &self.stop).await {
            RevealOutcome::Completed { units } => {
                debug!("Revealed {} units", units);
                self.emit.send(SessionUpdate::RevealFinished);
            }
            RevealOutcome::Stopped { units } => {
                debug!("Reveal interrupted after {} units", units);
            }
        }
    }
}
