//! Active session handling
//!
//! A session exclusively owns its TCP stream and multiplexes reads with the
//! heartbeat timer in a single task, so the heartbeat can never observe a
//! half-torn-down stream and the socket is closed exactly once, when the
//! session future returns.

use crate::connection::manager::{ConnectionConfig, ConnectionEvent};
use bytes::Bytes;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant};
use tracing::warn;

/// Liveness ping payload, written to the peer every heartbeat period
pub const PING: &[u8] = b"ping";

/// Back-off before retrying a read after a transient error
const READ_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Why an active session ended
#[derive(Debug, Clone, Error)]
pub enum DisconnectReason {
    /// The peer closed the connection
    #[error("peer closed the connection")]
    PeerClosed,
    /// The liveness ping could not be delivered
    #[error("heartbeat write failed: {0}")]
    HeartbeatFailed(String),
    /// The event receiver was dropped; nobody is listening for output
    #[error("console output closed")]
    OutputClosed,
}

/// Run one session to completion and report why it ended.
///
/// The heartbeat interval first fires one full period after connect.
/// Transient read errors are logged and retried after a short delay; only
/// peer close or a failed heartbeat write end the session.
pub async fn run_session(
    stream: TcpStream,
    config: &ConnectionConfig,
    event_tx: &mpsc::Sender<ConnectionEvent>,
) -> DisconnectReason {
    let (mut reader, mut writer) = stream.into_split();

    let mut heartbeat = interval_at(
        Instant::now() + config.heartbeat_interval,
        config.heartbeat_interval,
    );
    let mut read_buf = vec![0u8; config.read_chunk];

    loop {
        tokio::select! {
            _ = heartbeat.tick() => {
                if let Err(e) = send_ping(&mut writer).await {
                    warn!("Heartbeat write failed: {}", e);
                    return DisconnectReason::HeartbeatFailed(e.to_string());
                }
            }

            result = reader.read(&mut read_buf) => {
                match result {
                    Ok(0) => return DisconnectReason::PeerClosed,
                    Ok(n) => {
                        let data = Bytes::copy_from_slice(&read_buf[..n]);
                        if event_tx.send(ConnectionEvent::Data(data)).await.is_err() {
                            return DisconnectReason::OutputClosed;
                        }
                    }
                    Err(e) => {
                        warn!("Read error (non-fatal): {}", e);
                        tokio::time::sleep(READ_RETRY_DELAY).await;
                    }
                }
            }
        }
    }
}

async fn send_ping<W: AsyncWrite + Unpin>(writer: &mut W) -> std::io::Result<()> {
    writer.write_all(PING).await?;
    writer.flush().await
}
