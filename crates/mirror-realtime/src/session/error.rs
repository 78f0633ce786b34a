//! Errors raised while a session talks to its client.

use thiserror::Error;

use mirror_core::error::{AppError, ErrorKind};

/// A client broke the wire protocol or its transport failed.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The connection ended before the identification message arrived.
    #[error("connection closed before identification")]
    Closed,
    /// The identification frame could not be read as UTF-8 text.
    #[error("identification frame is not text")]
    NotText,
    /// The identification message is valid JSON but not an object.
    #[error("identification message must be a JSON object")]
    NotAnObject,
    /// The identification message failed to parse or lacks a required field.
    #[error("malformed identification message: {0}")]
    Malformed(#[source] serde_json::Error),
    /// The transport reported an error.
    #[error("transport error: {0}")]
    Transport(String),
}

impl From<ProtocolError> for AppError {
    fn from(err: ProtocolError) -> Self {
        let kind = match err {
            ProtocolError::Transport(_) => ErrorKind::Transport,
            _ => ErrorKind::Protocol,
        };
        AppError::with_source(kind, err.to_string(), err)
    }
}
