//! Client mode: the two fixed sides of a mirrored pair.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which side of the mirrored link a client sits on.
///
/// The set is closed. Every `Mode` has exactly one mirror, so a web
/// client `X` always pairs with the desktop client `X` and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Browser-side client.
    Web,
    /// Native desktop client.
    Desktop,
}

impl Mode {
    /// All modes, in a stable order.
    pub const ALL: [Mode; 2] = [Mode::Web, Mode::Desktop];

    /// Return the opposite mode.
    pub fn mirror(self) -> Self {
        match self {
            Self::Web => Self::Desktop,
            Self::Desktop => Self::Web,
        }
    }

    /// Wire representation of the mode.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::Desktop => "desktop",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown mode string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown client mode '{0}', expected 'web' or 'desktop'")]
pub struct ParseModeError(pub String);

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "web" => Ok(Self::Web),
            "desktop" => Ok(Self::Desktop),
            other => Err(ParseModeError(other.to_string())),
        }
    }
}
