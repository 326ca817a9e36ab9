//! Application constants and configuration defaults
//!
//! Centralized location for magic numbers and default values

use std::time::Duration;

/// HTTP client configuration
pub mod http {
    use super::*;

    /// Remote origin serving the `/search` and `/research` endpoints
    pub const DEFAULT_BASE_URL: &str = "https://perspicacity.onrender.com";

    /// Connection timeout for HTTP requests
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Whole-request timeout. Research answers can stream for several minutes.
    pub const STREAM_TIMEOUT: Duration = Duration::from_secs(600);

    /// User agent sent with every request
    pub const USER_AGENT: &str = "Perspicacity/0.1";
}

/// Session lifecycle configuration
pub mod session {
    use super::*;

    /// Deadline for the first byte of a response. The hosted service sleeps
    /// when idle and may take a while to wake.
    pub const COLD_START_TIMEOUT: Duration = Duration::from_millis(8000);

    /// Shown in place of an answer on timeout or connectivity failure
    pub const SERVER_BUSY_MESSAGE: &str = "I couldn't get a response from the server. It might be busy or just waking up. Please try sending your message again in a moment.";

    /// Fallback for failures that carry no message of their own
    pub const GENERAL_ERROR_MESSAGE: &str =
        "I encountered an issue processing your request. Please try again.";

    /// Fallback for a server error event without `message` or `error` text
    pub const SERVER_ERROR_FALLBACK: &str = "An error occurred during research.";

    /// Placeholder installed when generation is stopped before any answer
    pub const STOPPED_PLACEHOLDER: &str = "Generation stopped.";

    /// Placeholder installed when a stream closes without a terminal event
    pub const NO_ANSWER_PLACEHOLDER: &str = "No answer was received.";
}

/// Incremental renderer configuration
pub mod render {
    use super::*;

    /// Delay between two revealed words
    pub const REVEAL_DELAY: Duration = Duration::from_millis(20);

    /// Request a scroll-follow every N revealed words
    pub const FOLLOW_EVERY_WORDS: usize = 50;

    /// Distance from the bottom beyond which the user counts as scrolled away
    pub const SCROLL_THRESHOLD: usize = 100;

    /// Source cards shown before "show more"
    pub const INITIAL_SOURCE_CARDS: usize = 5;

    /// Maximum title length on a source card
    pub const CARD_TITLE_CHARS: usize = 100;

    /// Maximum snippet length on a source card
    pub const CARD_SNIPPET_CHARS: usize = 150;

    /// Link offered when the server allows asking a human expert
    pub const ASK_EXPERT_URL: &str = "https://islamqa.info/en/ask";
}

/// UI configuration
pub mod ui {
    /// Config directory name
    pub const CONFIG_DIR_NAME: &str = ".perspicacity";

    /// Log subdirectory name
    pub const LOGS_DIR_NAME: &str = "logs";
}
