//! Engine error types

use std::io::ErrorKind;

use thiserror::Error;

use crate::transcript::TurnId;

/// Errors raised by the session engine and its collaborators
#[derive(Debug, Error)]
pub enum EngineError {
    /// A required secret is not configured
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),

    /// The transcript has no turn with this id
    #[error("turn not found: {0}")]
    TurnNotFound(TurnId),

    /// Edit requested on something other than a user turn
    #[error("turn {0} cannot be edited")]
    NotEditable(TurnId),

    /// Regeneration requested on something other than an assistant turn
    #[error("turn {0} has no answer to regenerate")]
    NothingToRegenerate(TurnId),

    /// Transport-level failure (connect, DNS, reset)
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status. The body is kept for logs.
    #[error("server returned HTTP {0}")]
    Status(u16, String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed configuration file
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

impl EngineError {
    /// Whether this failure belongs to the "server unreachable" class that
    /// is presented the same way as a cold-start timeout.
    pub fn is_network(&self) -> bool {
        match self {
            EngineError::Http(e) => {
                e.is_connect() || e.is_timeout() || e.is_request() || e.is_body()
            }
            EngineError::Io(e) => matches!(
                e.kind(),
                ErrorKind::ConnectionRefused
                    | ErrorKind::ConnectionReset
                    | ErrorKind::ConnectionAborted
                    | ErrorKind::NotConnected
                    | ErrorKind::BrokenPipe
                    | ErrorKind::TimedOut
                    | ErrorKind::UnexpectedEof
            ),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dropped_connection_is_network_class() {
        let reset = EngineError::Io(std::io::Error::from(ErrorKind::ConnectionReset));
        assert!(reset.is_network());
        let eof = EngineError::Io(std::io::Error::from(ErrorKind::UnexpectedEof));
        assert!(eof.is_network());
    }

    #[test]
    fn test_other_failures_are_not_network_class() {
        let denied = EngineError::Io(std::io::Error::from(ErrorKind::PermissionDenied));
        assert!(!denied.is_network());
        assert!(!EngineError::Status(500, String::new()).is_network());
    }
}
