//! Write-serialized guards for WebSocket connections shared across tasks.
//!
//! A `tokio-tungstenite` stream tolerates one reader alongside one writer,
//! but it cannot survive two writes in flight at once: interleaved sends
//! corrupt the connection's framing state. Safewire wraps an established
//! stream in a [`SharedConn`] that serializes every write through a single
//! per-connection lock, so any number of tasks can send on the same
//! connection through one `Arc<SharedConn<_>>`.
//!
//! Reads stay outside that lock entirely. The contract is the usual one for
//! message connections: exactly one task reads, any number write. A second
//! concurrent reader is reported as [`ConnError::ReadContended`] rather than
//! left undefined.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use safewire::{FrameKind, SharedConn};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let (ws, _) = tokio_tungstenite::connect_async("ws://127.0.0.1:9001").await?;
//! let conn = Arc::new(SharedConn::new(ws));
//!
//! // Writers can live on any task.
//! let announcer = Arc::clone(&conn);
//! tokio::spawn(async move {
//!     let _ = announcer.send_frame(FrameKind::Text, b"server tick").await;
//! });
//!
//! conn.send_json(&serde_json::json!({ "seq": 1 })).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Feature flags
//!
//! - `json` (default) — [`SharedConn::send_json`] via `serde_json`
//! - `unguarded` — consuming raw-stream accessors that bypass the guard

mod conn;
mod error;
mod frame;

pub use conn::{MessageStream, SharedConn};
pub use error::ConnError;
pub use frame::{Frame, FrameKind};

use std::fmt;

/// Opaque identifier for a guarded connection.
///
/// Assigned automatically when a [`SharedConn`] is created; exists purely so
/// log lines from different connections can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnId(u64);

impl ConnId {
    /// Creates a new `ConnId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conn_id_new_and_into_inner() {
        let id = ConnId::new(42);
        assert_eq!(id.into_inner(), 42);
    }

    #[test]
    fn test_conn_id_display() {
        let id = ConnId::new(7);
        assert_eq!(id.to_string(), "conn-7");
    }

    #[test]
    fn test_conn_id_equality() {
        let a = ConnId::new(1);
        let b = ConnId::new(1);
        let c = ConnId::new(2);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_conn_id_hash_works_as_map_key() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(ConnId::new(1), "reader");
        map.insert(ConnId::new(2), "writer");
        assert_eq!(map[&ConnId::new(1)], "reader");
    }
}
