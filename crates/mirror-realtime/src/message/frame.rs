//! Transport-neutral frames exchanged between a session and its socket.
//!
//! Control frames (ping/pong) never reach the session; the transport
//! adapter answers them itself.

/// A frame received from a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    /// A text frame.
    Text(String),
    /// A binary frame. Decoded as UTF-8 text when possible.
    Binary(Vec<u8>),
    /// The client started the closing handshake.
    Close,
}

impl InboundFrame {
    /// Consume the frame as text, if it carries valid UTF-8.
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text),
            Self::Binary(bytes) => String::from_utf8(bytes).ok(),
            Self::Close => None,
        }
    }
}

/// A frame sent to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    /// A text frame carrying one JSON document.
    Text(String),
    /// Close the connection.
    Close,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_utf8_is_text() {
        let frame = InboundFrame::Binary(b"{\"a\":1}".to_vec());
        assert_eq!(frame.into_text().as_deref(), Some("{\"a\":1}"));
    }

    #[test]
    fn test_binary_garbage_is_not_text() {
        let frame = InboundFrame::Binary(vec![0xff, 0xfe, 0x00]);
        assert_eq!(frame.into_text(), None);
    }

    #[test]
    fn test_close_is_not_text() {
        assert_eq!(InboundFrame::Close.into_text(), None);
    }
}
