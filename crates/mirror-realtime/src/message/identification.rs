//! The identification ("authentication") message that opens every session.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use mirror_core::types::{ClientId, Mode};

use crate::session::error::ProtocolError;

/// First message a client must send: `{"client_mode": ..., "client_id": ...}`.
///
/// Unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identification {
    /// Which side of the link the client is on.
    pub client_mode: Mode,
    /// Client-chosen id, shared with its mirror peer.
    pub client_id: ClientId,
}

impl Identification {
    /// Create an identification for the given side and id.
    pub fn new(client_mode: Mode, client_id: impl Into<ClientId>) -> Self {
        Self {
            client_mode,
            client_id: client_id.into(),
        }
    }

    /// Parse the raw text of an identification message.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_str(text).map_err(ProtocolError::Malformed)?;
        if !value.is_object() {
            return Err(ProtocolError::NotAnObject);
        }
        serde_json::from_value(value).map_err(ProtocolError::Malformed)
    }

    /// Human-readable `id[mode]` tag used in logs.
    pub fn tag(&self) -> String {
        format!("{}[{}]", self.client_id, self.client_mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let ident = Identification::parse(r#"{"client_mode":"desktop","client_id":"abc"}"#)
            .expect("valid identification");
        assert_eq!(ident, Identification::new(Mode::Desktop, "abc"));
        assert_eq!(ident.tag(), "abc[desktop]");
    }

    #[test]
    fn test_parse_ignores_extra_keys() {
        let ident =
            Identification::parse(r#"{"client_mode":"web","client_id":"x","version":3}"#)
                .expect("extra keys are fine");
        assert_eq!(ident.client_mode, Mode::Web);
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        assert!(matches!(
            Identification::parse("{not json"),
            Err(ProtocolError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_rejects_missing_fields() {
        assert!(matches!(
            Identification::parse(r#"{"client_mode":"web"}"#),
            Err(ProtocolError::Malformed(_))
        ));
        assert!(matches!(
            Identification::parse(r#"{"client_id":"abc"}"#),
            Err(ProtocolError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_rejects_wrong_types() {
        assert!(Identification::parse(r#"{"client_mode":"phone","client_id":"abc"}"#).is_err());
        assert!(Identification::parse(r#"{"client_mode":"web","client_id":7}"#).is_err());
    }

    #[test]
    fn test_parse_rejects_non_objects() {
        assert!(matches!(
            Identification::parse(r#"["web","abc"]"#),
            Err(ProtocolError::NotAnObject)
        ));
        assert!(matches!(
            Identification::parse("\"web\""),
            Err(ProtocolError::NotAnObject)
        ));
    }
}
