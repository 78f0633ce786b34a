//! Session lifecycle states.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a session is in its lifecycle.
///
/// `Connecting -> Identifying -> Relaying -> Closing -> Closed`. A session
/// that fails identification skips `Relaying`; the transport may fail in
/// any state, which moves the session straight to `Closing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Connecting,
    Identifying,
    Relaying,
    Closing,
    Closed,
}

impl SessionState {
    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Connecting, Identifying)
                | (Connecting, Closing)
                | (Identifying, Relaying)
                | (Identifying, Closing)
                | (Relaying, Closing)
                | (Closing, Closed)
        )
    }

    /// Whether the session is registered and forwarding messages.
    pub fn is_relaying(self) -> bool {
        self == SessionState::Relaying
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Identifying => "identifying",
            Self::Relaying => "relaying",
            Self::Closing => "closing",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
