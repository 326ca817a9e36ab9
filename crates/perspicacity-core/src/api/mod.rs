//! Answer service protocol
//!
//! Request/response types, the line-delimited event stream decoder, the
//! event interpreter, and the HTTP transport.

pub mod client;
pub mod events;
pub mod sse;
pub mod types;

pub use client::{AnswerResponse, AnswerTransport, ByteStream, HttpTransport};
pub use events::{interpret, AnswerPayload, StreamEvent};
pub use sse::FrameDecoder;
pub use types::{HistoryMessage, Mode, QueryRequest, Role, SourceItem};
