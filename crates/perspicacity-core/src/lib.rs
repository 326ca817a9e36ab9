//! Perspicacity Core - streaming answer sessions for the Perspicacity service
//!
//! This crate provides everything except the terminal frontend:
//! - Event stream decoding and interpretation
//! - Session lifecycle with cold-start detection and cancellation
//! - Paced answer rendering with citation links
//! - Transcript, history reconstruction, editing and regeneration
//! - Credential storage and configuration

pub mod api;
pub mod config;
pub mod constants;
pub mod conversation;
pub mod error;
pub mod paths;
pub mod render;
pub mod session;
pub mod storage;
pub mod transcript;

// Re-exports for convenience
pub use api::{AnswerTransport, HttpTransport, Mode};
pub use config::ClientConfig;
pub use conversation::{Conversation, EditOutcome, Effect, NoticeLevel, PrimaryAction};
pub use error::{EngineError, Result};
pub use session::{EndCause, SessionPhase};
pub use storage::{CredentialKey, CredentialStore};
pub use transcript::{Entry, Transcript, TurnId};
