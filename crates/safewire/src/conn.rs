//! The serialized connection guard.

use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
#[cfg(feature = "json")]
use serde::Serialize;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

use crate::frame::{self, Frame, FrameKind};
use crate::{ConnError, ConnId};

/// Counter for generating unique connection IDs.
static NEXT_CONN_ID: AtomicU64 = AtomicU64::new(1);

/// Shape of a stream the guard can wrap: anything that speaks transport
/// [`Message`]s in both directions.
///
/// Every `tokio-tungstenite` stream flavor qualifies — plain server streams,
/// `MaybeTlsStream` client streams, streams over Unix sockets. The guard
/// does not care which side of the connection it holds.
pub trait MessageStream:
    Stream<Item = Result<Message, WsError>> + Sink<Message, Error = WsError> + Unpin + Send
{
}

impl<S> MessageStream for S where
    S: Stream<Item = Result<Message, WsError>> + Sink<Message, Error = WsError> + Unpin + Send
{
}

/// A write-serialized handle to one WebSocket connection.
///
/// The underlying transport permits a single in-flight write; `SharedConn`
/// makes that safe to share by funneling every send through one
/// per-connection lock. Clone an `Arc<SharedConn<_>>` into as many tasks as
/// need to write — each send is one whole message on the wire, in the order
/// callers acquire the lock.
///
/// Reads bypass the lock completely. The stream is split once at
/// construction: the write half lives behind the write-lock, the read half
/// outside it, so a task blocked in [`recv`](Self::recv) never delays a
/// writer and vice versa. At most one task may read (see [`recv`](Self::recv)).
///
/// One guard per connection. Wrapping the same connection in two guards
/// would let their callers race each other again.
pub struct SharedConn<S: MessageStream> {
    id: ConnId,
    writer: Mutex<SplitSink<S, Message>>,
    reader: Mutex<SplitStream<S>>,
}

impl<S: MessageStream> SharedConn<S> {
    /// Wraps an already-established connection in a new guard.
    ///
    /// No validation is performed on the handle; a connection that is
    /// already dead surfaces its state on the first operation.
    pub fn new(stream: S) -> Self {
        let id = ConnId::new(NEXT_CONN_ID.fetch_add(1, Ordering::Relaxed));
        let (sink, stream) = stream.split();
        tracing::debug!(%id, "connection wrapped in write guard");

        Self {
            id,
            writer: Mutex::new(sink),
            reader: Mutex::new(stream),
        }
    }

    /// Returns the identifier assigned to this guard, for log correlation.
    pub fn id(&self) -> ConnId {
        self.id
    }

    /// Serializes `value` as JSON and sends it as one text frame.
    ///
    /// The write-lock is held for the whole encode-and-send, so concurrent
    /// callers' messages reach the wire whole, never interleaved. The lock
    /// is released on every exit path; an encoding or transport failure is
    /// returned unchanged and never wedges the connection for other writers.
    #[cfg(feature = "json")]
    pub async fn send_json<T>(&self, value: &T) -> Result<(), ConnError>
    where
        T: Serialize + ?Sized,
    {
        let mut sink = self.writer.lock().await;
        let text = serde_json::to_string(value).map_err(ConnError::Encode)?;
        sink.send(Message::Text(text.into()))
            .await
            .map_err(ConnError::SendFailed)
    }

    /// Sends one pre-encoded frame of the given kind.
    ///
    /// Same locking discipline as [`send_json`](Self::send_json). Text
    /// payloads must be valid UTF-8.
    pub async fn send_frame(&self, kind: FrameKind, data: &[u8]) -> Result<(), ConnError> {
        let mut sink = self.writer.lock().await;
        let msg = frame::to_message(kind, data)?;
        sink.send(msg).await.map_err(ConnError::SendFailed)
    }

    /// Receives the next data frame.
    ///
    /// Returns `Ok(None)` when the peer closed cleanly. Control frames are
    /// the transport's business and are skipped here.
    ///
    /// Reads never touch the write-lock: a pending `recv` runs alongside
    /// in-flight sends. The connection contract allows exactly one reader,
    /// so the read half is claimed without blocking; if another `recv` is
    /// already in flight this returns [`ConnError::ReadContended`]
    /// immediately instead of queueing the misuse.
    pub async fn recv(&self) -> Result<Option<Frame>, ConnError> {
        let mut stream = self
            .reader
            .try_lock()
            .map_err(|_| ConnError::ReadContended)?;

        loop {
            match stream.next().await {
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(Frame {
                        kind: FrameKind::Text,
                        data: text.as_bytes().to_vec(),
                    }));
                }
                Some(Ok(Message::Binary(data))) => {
                    return Ok(Some(Frame {
                        kind: FrameKind::Binary,
                        data: data.into(),
                    }));
                }
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => {
                    // skip ping/pong/raw frames
                    tracing::trace!(id = %self.id, "skipped control frame");
                    continue;
                }
                Some(Err(e)) => return Err(ConnError::ReceiveFailed(e)),
            }
        }
    }

    /// Closes the connection, sending the close frame and flushing it.
    ///
    /// Takes the write-lock (the sink needs exclusive access), so a close
    /// racing in-flight sends waits its turn, and writers queued behind it
    /// each fail with the transport's closed-connection error. Idempotency
    /// is whatever the transport provides; a repeat close surfaces its
    /// result unchanged.
    pub async fn close(&self) -> Result<(), ConnError> {
        tracing::debug!(id = %self.id, "closing connection");
        let mut sink = self.writer.lock().await;
        sink.close().await.map_err(ConnError::CloseFailed)
    }
}

#[cfg(feature = "unguarded")]
impl<S: MessageStream> SharedConn<S> {
    /// Consumes the guard and returns the underlying stream, reunited.
    ///
    /// There is no borrowed escape hatch: while a guard exists, every write
    /// goes through the lock. A caller that wants the raw stream gives the
    /// guard up first, which the borrow checker makes visible at the call
    /// site.
    pub fn into_inner(self) -> S {
        let sink = self.writer.into_inner();
        let stream = self.reader.into_inner();
        // Both halves come from the single split in `new`.
        sink.reunite(stream).expect("halves belong to the same split")
    }

    /// Consumes the guard and returns the raw halves without reuniting them.
    pub fn into_split(self) -> (SplitSink<S, Message>, SplitStream<S>) {
        (self.writer.into_inner(), self.reader.into_inner())
    }
}
