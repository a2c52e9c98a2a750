use crate::call::CallState;
use thiserror::Error;

/// Failures reported by a [`MediaBackend`](crate::media::MediaBackend).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    #[error("local media unavailable: {0}")]
    Unavailable(String),

    #[error("no media session is active")]
    NoSession,

    #[error("negotiation failed: {0}")]
    Negotiation(String),

    #[error("invalid ICE candidate: {0}")]
    Candidate(String),

    #[error("media backend error: {0}")]
    Backend(String),
}

impl From<webrtc::Error> for MediaError {
    fn from(e: webrtc::Error) -> Self {
        MediaError::Backend(e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    #[error("cannot {action} while {state}")]
    InvalidState {
        action: &'static str,
        state: CallState,
    },

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error("signaling unavailable: {0}")]
    Signaling(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("chat message is empty")]
    Empty,

    #[error("signaling unavailable: {0}")]
    Signaling(String),
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("could not reach relay at {url} after {attempts} attempt(s): {reason}")]
    ConnectFailed {
        url: String,
        attempts: u32,
        reason: String,
    },

    #[error("relay connection closed")]
    Closed,

    #[error("relay sent an unexpected frame: {0}")]
    UnexpectedFrame(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error(transparent)]
    Call(#[from] CallError),

    #[error(transparent)]
    Chat(#[from] ChatError),
}
