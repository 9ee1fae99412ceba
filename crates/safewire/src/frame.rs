//! The guard-visible message unit.
//!
//! The guard passes whole messages through; it never touches wire framing.
//! [`Frame`] and [`FrameKind`] are the thin surface it exposes over the
//! transport's message type, covering the two data-frame flavors a peer can
//! exchange. Control frames (ping/pong/close) are connection plumbing and
//! never appear here.

use tokio_tungstenite::tungstenite::Message;

use crate::ConnError;

/// The two data-frame flavors of a message connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// A UTF-8 text message.
    Text,
    /// An opaque binary message.
    Binary,
}

/// One received message: its kind plus the payload bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Whether the peer sent this as text or binary.
    pub kind: FrameKind,
    /// The payload, byte-identical to what the peer sent.
    pub data: Vec<u8>,
}

impl Frame {
    /// Returns the payload as `&str` if this is a text frame.
    pub fn as_text(&self) -> Option<&str> {
        match self.kind {
            // Text frames are UTF-8 validated by the transport on receipt.
            FrameKind::Text => std::str::from_utf8(&self.data).ok(),
            FrameKind::Binary => None,
        }
    }

    /// Consumes the frame, returning the payload bytes.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

/// Builds the outgoing transport message for a frame kind and payload.
///
/// Text payloads must be valid UTF-8 — the transport's text type enforces
/// it, so the check happens here where it can be reported as a guard error
/// instead of a panic.
pub(crate) fn to_message(kind: FrameKind, data: &[u8]) -> Result<Message, ConnError> {
    match kind {
        FrameKind::Text => {
            let text = std::str::from_utf8(data).map_err(|_| ConnError::InvalidUtf8)?;
            Ok(Message::Text(text.to_owned().into()))
        }
        FrameKind::Binary => Ok(Message::Binary(data.to_vec().into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_payload_becomes_text_message() {
        let msg = to_message(FrameKind::Text, b"hello").unwrap();
        assert_eq!(msg, Message::Text("hello".into()));
    }

    #[test]
    fn test_binary_payload_becomes_binary_message() {
        let msg = to_message(FrameKind::Binary, &[0x00, 0xFF, 0x7F]).unwrap();
        assert_eq!(msg, Message::Binary(vec![0x00, 0xFF, 0x7F].into()));
    }

    #[test]
    fn test_invalid_utf8_text_is_rejected() {
        let err = to_message(FrameKind::Text, &[0xFF, 0xFE]).unwrap_err();
        assert!(matches!(err, ConnError::InvalidUtf8));
    }

    #[test]
    fn test_invalid_utf8_is_fine_as_binary() {
        // The same bytes are legal in a binary frame.
        assert!(to_message(FrameKind::Binary, &[0xFF, 0xFE]).is_ok());
    }

    #[test]
    fn test_frame_as_text() {
        let frame = Frame {
            kind: FrameKind::Text,
            data: b"hi".to_vec(),
        };
        assert_eq!(frame.as_text(), Some("hi"));

        let frame = Frame {
            kind: FrameKind::Binary,
            data: b"hi".to_vec(),
        };
        assert_eq!(frame.as_text(), None);
    }

    #[test]
    fn test_frame_into_data() {
        let frame = Frame {
            kind: FrameKind::Binary,
            data: vec![1, 2, 3],
        };
        assert_eq!(frame.into_data(), vec![1, 2, 3]);
    }
}
