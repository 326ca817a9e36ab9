//! Wire types shared by the transport and the transcript

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::storage::Credentials;

/// Processing mode, selecting the service endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Search,
    Research,
}

impl Mode {
    /// Endpoint path on the service origin
    pub fn endpoint_path(&self) -> &'static str {
        match self {
            Mode::Search => "/search",
            Mode::Research => "/research",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Mode::Search => "Search",
            Mode::Research => "Research",
        }
    }

    pub fn toggled(&self) -> Mode {
        match self {
            Mode::Search => Mode::Research,
            Mode::Research => Mode::Search,
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Speaker of a transcript turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry of `conversation_history`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub role: Role,
    pub content: String,
}

impl HistoryMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// POST body for `/search` and `/research`
#[derive(Debug, Clone, Serialize)]
pub struct QueryRequest {
    pub query: String,
    pub conversation_history: Vec<HistoryMessage>,
    pub api_key: String,
    pub google_api_key: String,
}

impl QueryRequest {
    pub fn new(query: &str, history: Vec<HistoryMessage>, credentials: &Credentials) -> Self {
        Self {
            query: query.to_string(),
            conversation_history: history,
            api_key: credentials.api_key.clone(),
            google_api_key: credentials.google_api_key.clone(),
        }
    }
}

/// A source, article or book attached to an answer.
///
/// Position in the server's list is significant: the 1-based index is the
/// citation number used in the answer text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceItem {
    pub url: String,
    pub title: String,
    pub snippet: String,
}

impl SourceItem {
    /// Lenient conversion from a server object. Missing fields become empty
    /// strings so that list positions (and thus citation numbers) never shift.
    pub fn from_value(value: &Value) -> Self {
        let field = |name: &str| {
            value
                .get(name)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let snippet = ["snippet", "text", "description"]
            .iter()
            .map(|name| field(name))
            .find(|s| !s.is_empty())
            .unwrap_or_default();
        Self {
            url: field("url"),
            title: field("title"),
            snippet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_endpoints() {
        assert_eq!(Mode::Search.endpoint_path(), "/search");
        assert_eq!(Mode::Research.endpoint_path(), "/research");
        assert_eq!(Mode::Search.toggled(), Mode::Research);
    }

    #[test]
    fn test_request_body_shape() {
        let creds = Credentials {
            api_key: "a".into(),
            google_api_key: "b".into(),
        };
        let req = QueryRequest::new(
            "why?",
            vec![HistoryMessage::new(Role::User, "hi")],
            &creds,
        );
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["query"], "why?");
        assert_eq!(json["api_key"], "a");
        assert_eq!(json["google_api_key"], "b");
        assert_eq!(json["conversation_history"][0]["role"], "user");
        assert_eq!(json["conversation_history"][0]["content"], "hi");
    }

    #[test]
    fn test_source_item_snippet_fallbacks() {
        let item = SourceItem::from_value(&serde_json::json!({
            "url": "https://a.org", "title": "A", "description": "desc"
        }));
        assert_eq!(item.snippet, "desc");

        let item = SourceItem::from_value(&serde_json::json!({
            "url": "https://a.org", "text": "body", "description": "desc"
        }));
        assert_eq!(item.snippet, "body");

        let item = SourceItem::from_value(&serde_json::json!({ "title": 3 }));
        assert_eq!(item, SourceItem::default());
    }
}
