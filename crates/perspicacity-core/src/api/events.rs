//! Event interpretation
//!
//! Classifies a decoded frame payload by field presence.

use serde_json::Value;

use super::types::SourceItem;
use crate::constants;

/// A classified server event
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Work in progress, not terminal
    Progress { status: String },
    /// Final answer with its side lists
    Success(AnswerPayload),
    /// Server-reported failure
    Failure { message: String },
}

impl StreamEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StreamEvent::Progress { .. })
    }
}

/// Payload of a terminal success event
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnswerPayload {
    pub answer: String,
    pub sources: Vec<SourceItem>,
    pub articles: Vec<SourceItem>,
    pub books: Vec<SourceItem>,
    /// Whether the ask-a-human-expert action is offered
    pub ask_expert: bool,
}

impl AnswerPayload {
    /// A payload carrying only text, used for synthesized answers
    pub fn text_only(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            ..Default::default()
        }
    }
}

/// Parse and classify one payload.
///
/// `Err` means the payload is not valid JSON; callers log and skip it.
/// `Ok(None)` means it parsed but carries none of the known fields.
pub fn interpret(payload: &str) -> Result<Option<StreamEvent>, serde_json::Error> {
    let json: Value = serde_json::from_str(payload)?;

    if let Some(status) = json.get("status").filter(|v| is_truthy(v)) {
        return Ok(Some(StreamEvent::Progress {
            status: text_of(status),
        }));
    }

    if let Some(answer) = json.get("final_answer").filter(|v| is_truthy(v)) {
        return Ok(Some(StreamEvent::Success(AnswerPayload {
            answer: text_of(answer),
            sources: list_of(&json, "sources"),
            articles: list_of(&json, "articles"),
            books: list_of(&json, "books"),
            ask_expert: json
                .get("show_ask_scholar_button")
                .map(is_truthy)
                .unwrap_or(false),
        })));
    }

    if let Some(error) = json.get("error").filter(|v| is_truthy(v)) {
        let message = json
            .get("message")
            .filter(|v| is_truthy(v))
            .map(text_of)
            .or_else(|| error.as_str().map(str::to_string))
            .unwrap_or_else(|| constants::session::SERVER_ERROR_FALLBACK.to_string());
        return Ok(Some(StreamEvent::Failure { message }));
    }

    Ok(None)
}

/// Presence in the loose sense the service uses: null, false, 0 and ""
/// count as absent.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn list_of(json: &Value, key: &str) -> Vec<SourceItem> {
    json.get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().map(SourceItem::from_value).collect())
        .unwrap_or_default()
}
