//! Broadcast demo: many writers per connection.
//!
//! Each connected client is served by two independent writers sharing one
//! guard: an echo task that answers the client's own messages, and a
//! server-wide announcer that pushes a tick to every client once a second.
//! Without the guard the two would race on the socket; with it, each
//! message reaches the wire whole.
//!
//! Try it with a WebSocket client of your choice:
//!
//! ```text
//! RUST_LOG=debug cargo run -p broadcast
//! websocat ws://127.0.0.1:9001
//! ```

use std::sync::Arc;
use std::time::Duration;

use safewire::SharedConn;
use serde::Serialize;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

type Conn = Arc<SharedConn<tokio_tungstenite::WebSocketStream<TcpStream>>>;

#[derive(Serialize)]
struct Announcement {
    tick: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let listener = TcpListener::bind("127.0.0.1:9001").await?;
    tracing::info!("broadcast demo listening on ws://127.0.0.1:9001");

    let clients: Arc<Mutex<Vec<Conn>>> = Arc::new(Mutex::new(Vec::new()));

    // The announcer writes to every client's guard, concurrently with
    // whatever the per-client echo tasks are sending.
    let announce_clients = Arc::clone(&clients);
    tokio::spawn(async move {
        let mut tick = 0u64;
        loop {
            tokio::time::sleep(Duration::from_secs(1)).await;
            tick += 1;
            for conn in announce_clients.lock().await.iter() {
                if let Err(e) = conn.send_json(&Announcement { tick }).await {
                    tracing::debug!(id = %conn.id(), error = %e, "announce failed");
                }
            }
        }
    });

    loop {
        let (stream, addr) = listener.accept().await?;
        let clients = Arc::clone(&clients);

        tokio::spawn(async move {
            let ws = match tokio_tungstenite::accept_async(stream).await {
                Ok(ws) => ws,
                Err(e) => {
                    tracing::debug!(%addr, error = %e, "handshake failed");
                    return;
                }
            };

            let conn: Conn = Arc::new(SharedConn::new(ws));
            tracing::info!(id = %conn.id(), %addr, "client connected");
            clients.lock().await.push(Arc::clone(&conn));

            // This task is the connection's single reader.
            loop {
                match conn.recv().await {
                    Ok(Some(frame)) => {
                        if let Err(e) = conn.send_frame(frame.kind, &frame.data).await {
                            tracing::debug!(id = %conn.id(), error = %e, "echo failed");
                            break;
                        }
                    }
                    Ok(None) => {
                        tracing::info!(id = %conn.id(), "client disconnected");
                        break;
                    }
                    Err(e) => {
                        tracing::debug!(id = %conn.id(), error = %e, "recv error");
                        break;
                    }
                }
            }

            clients.lock().await.retain(|c| c.id() != conn.id());
        });
    }
}
