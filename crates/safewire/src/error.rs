use tokio_tungstenite::tungstenite::Error as WsError;

/// Errors surfaced by guard operations.
///
/// The taxonomy is inherited from the underlying transport: the guard
/// performs no recovery and no retries, and it does not distinguish a
/// permanently closed connection from a transient failure — that
/// classification stays with the transport. The only errors the guard
/// originates itself are [`ReadContended`](ConnError::ReadContended) and
/// [`InvalidUtf8`](ConnError::InvalidUtf8).
#[derive(Debug, thiserror::Error)]
pub enum ConnError {
    /// Serializing a value for `send_json` failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// Transmitting a frame failed. Includes writes against a connection
    /// that is already closed.
    #[error("send failed: {0}")]
    SendFailed(#[source] WsError),

    /// Receiving the next frame failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] WsError),

    /// Driving the close handshake failed.
    #[error("close failed: {0}")]
    CloseFailed(#[source] WsError),

    /// A text frame's payload was not valid UTF-8.
    #[error("text frame payload is not valid UTF-8")]
    InvalidUtf8,

    /// `recv` was called while another read was in flight. A connection has
    /// exactly one reader; a second one is a caller bug, reported rather
    /// than queued.
    #[error("connection already has a reader")]
    ReadContended,
}
