#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use perspicacity_core::api::{AnswerResponse, ByteStream, QueryRequest};
use perspicacity_core::{
    AnswerTransport, ClientConfig, Conversation, CredentialKey, CredentialStore, EngineError, Mode,
    Result, TurnId,
};

/// Gap between scripted chunks
pub const CHUNK_GAP: Duration = Duration::from_millis(10);

/// How the scripted server answers one request
pub enum Script {
    /// Never answers
    Silent,
    /// Sends `data:` records, then closes or hangs
    Frames { records: Vec<String>, hang: bool },
    /// Answers with a non-success status
    Status(u16),
    /// Answers with a body that is not an event stream
    Plain,
    /// Sends `data:` records, then the connection resets
    Dropped { records: Vec<String> },
}

impl Script {
    pub fn frames(records: &[&str]) -> Self {
        Script::Frames {
            records: records.iter().map(|r| r.to_string()).collect(),
            hang: false,
        }
    }

    pub fn dropped(records: &[&str]) -> Self {
        Script::Dropped {
            records: records.iter().map(|r| r.to_string()).collect(),
        }
    }

    pub fn answer(text: &str) -> Self {
        let record = serde_json::json!({ "final_answer": text }).to_string();
        Script::Frames {
            records: vec![record],
            hang: false,
        }
    }
}

/// Serves queued scripts in order and records every request
#[derive(Default)]
pub struct ScriptedTransport {
    scripts: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<(Mode, QueryRequest)>>,
}

impl ScriptedTransport {
    pub fn new(scripts: Vec<Script>) -> Arc<Self> {
        Arc::new(Self {
            scripts: Mutex::new(scripts.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn push(&self, script: Script) {
        self.scripts.lock().unwrap().push_back(script);
    }

    pub fn requests(&self) -> Vec<(Mode, QueryRequest)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnswerTransport for ScriptedTransport {
    async fn open(&self, mode: Mode, request: &QueryRequest) -> Result<AnswerResponse> {
        self.requests.lock().unwrap().push((mode, request.clone()));
        let script = self.scripts.lock().unwrap().pop_front();

        match script.unwrap_or(Script::Silent) {
            Script::Silent => std::future::pending().await,
            Script::Status(code) => Err(EngineError::Status(code, "scripted failure".into())),
            Script::Plain => Ok(AnswerResponse {
                is_event_stream: false,
                body: futures::stream::empty().boxed(),
            }),
            Script::Dropped { records } => {
                let body = futures::stream::iter(records)
                    .then(|record| async move {
                        tokio::time::sleep(CHUNK_GAP).await;
                        Ok::<_, EngineError>(Bytes::from(format!("data: {record}\n")))
                    })
                    .chain(futures::stream::once(async {
                        Err(EngineError::Io(std::io::Error::from(
                            std::io::ErrorKind::ConnectionReset,
                        )))
                    }))
                    .boxed();
                Ok(AnswerResponse {
                    is_event_stream: true,
                    body,
                })
            }
            Script::Frames { records, hang } => {
                let chunks = futures::stream::iter(records).then(|record| async move {
                    tokio::time::sleep(CHUNK_GAP).await;
                    Ok::<_, EngineError>(Bytes::from(format!("data: {record}\n")))
                });
                let body: ByteStream = if hang {
                    chunks.chain(futures::stream::pending()).boxed()
                } else {
                    chunks
                        .chain(futures::stream::once(async {
                            Ok::<_, EngineError>(Bytes::from_static(b"data: Stream finished.\n"))
                        }))
                        .boxed()
                };
                Ok(AnswerResponse {
                    is_event_stream: true,
                    body,
                })
            }
        }
    }
}

pub fn credentials() -> CredentialStore {
    let mut store = CredentialStore::default();
    store.set(CredentialKey::Gemini, "gemini-test");
    store.set(CredentialKey::Google, "google-test");
    store
}

pub fn conversation(transport: Arc<ScriptedTransport>) -> Conversation {
    Conversation::new(&ClientConfig::default(), transport, credentials())
}

/// Visible text of an answer area
pub fn answer_text(conversation: &Conversation, turn: TurnId) -> String {
    conversation
        .transcript()
        .assistant(turn)
        .and_then(|t| t.view.answer.as_deref())
        .map(|markup| conversation.markup().text_content(markup))
        .unwrap_or_default()
}

pub fn answer_markup(conversation: &Conversation, turn: TurnId) -> String {
    conversation
        .transcript()
        .assistant(turn)
        .and_then(|t| t.view.answer.clone())
        .unwrap_or_default()
}

/// Let freshly spawned session tasks reach the transport
pub async fn let_driver_run() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
