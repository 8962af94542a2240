//! Connection manager with sequential retry and automatic reconnection

use crate::connection::session::{run_session, DisconnectReason};
use bytes::Bytes;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Retry policy for the connection loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Give up after this many connection attempts
    Bounded(u32),
    /// Retry forever, sleeping `reconnect_delay` between cycles
    Infinite,
}

/// Configuration for the connection manager
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Target host
    pub host: String,
    /// Target TCP port
    pub port: u16,
    /// Retry policy
    pub retry: RetryPolicy,
    /// Delay between reconnect cycles in infinite mode
    pub reconnect_delay: Duration,
    /// Liveness ping period
    pub heartbeat_interval: Duration,
    /// Read buffer size per chunk
    pub read_chunk: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "192.168.49.1".into(),
            port: 8333,
            retry: RetryPolicy::Bounded(1),
            reconnect_delay: Duration::from_millis(500),
            heartbeat_interval: Duration::from_secs(10),
            read_chunk: 256,
        }
    }
}

impl ConnectionConfig {
    fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Events emitted by the connection manager
#[derive(Debug, Clone)]
pub enum ConnectionEvent {
    /// Successfully connected to the target
    Connected { peer: SocketAddr },
    /// Bytes received from the peer
    Data(Bytes),
    /// An active session ended
    Disconnected { reason: DisconnectReason },
    /// A connection attempt failed before a session was established
    AttemptFailed { attempt: u32, error: String },
    /// All bounded attempts have been used up
    RetriesExhausted { attempts: u32 },
}

/// Manages the connection lifecycle on a background task
pub struct ConnectionManager {
    event_rx: mpsc::Receiver<ConnectionEvent>,
}

impl ConnectionManager {
    /// Create a new connection manager and start the connection loop
    pub fn new(config: ConnectionConfig) -> Self {
        let (event_tx, event_rx) = mpsc::channel::<ConnectionEvent>(100);

        tokio::spawn(async move {
            connection_loop(config, event_tx).await;
        });

        Self { event_rx }
    }

    /// Receive the next connection event.
    ///
    /// Returns `None` once the loop has ended (bounded attempts exhausted).
    pub async fn recv(&mut self) -> Option<ConnectionEvent> {
        self.event_rx.recv().await
    }
}

/// Sequential attempt loop. One cycle is one connect attempt plus, when the
/// connect succeeds, the full session; a session that is later lost still
/// consumes its attempt. Bounded mode runs attempts back to back; infinite
/// mode sleeps `reconnect_delay` between cycles.
async fn connection_loop(config: ConnectionConfig, event_tx: mpsc::Sender<ConnectionEvent>) {
    let addr = config.address();
    let mut attempt: u32 = 0;

    loop {
        if let RetryPolicy::Bounded(max) = config.retry {
            if attempt >= max {
                let _ = event_tx
                    .send(ConnectionEvent::RetriesExhausted { attempts: attempt })
                    .await;
                return;
            }
        }
        attempt += 1;

        let connected = TcpStream::connect(&addr)
            .await
            .and_then(|stream| stream.peer_addr().map(|peer| (stream, peer)));

        match connected {
            Ok((stream, peer)) => {
                if event_tx
                    .send(ConnectionEvent::Connected { peer })
                    .await
                    .is_err()
                {
                    return;
                }

                let reason = run_session(stream, &config, &event_tx).await;
                debug!("Session ended: {}", reason);

                if matches!(reason, DisconnectReason::OutputClosed) {
                    return;
                }
                if event_tx
                    .send(ConnectionEvent::Disconnected { reason })
                    .await
                    .is_err()
                {
                    return;
                }
            }
            Err(e) => {
                warn!("Connection attempt {} failed: {}", attempt, e);
                if event_tx
                    .send(ConnectionEvent::AttemptFailed {
                        attempt,
                        error: e.to_string(),
                    })
                    .await
                    .is_err()
                {
                    return;
                }
            }
        }

        if config.retry == RetryPolicy::Infinite {
            sleep(config.reconnect_delay).await;
        }
    }
}
