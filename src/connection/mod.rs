//! Connection lifecycle: retry loop, active session, heartbeat liveness
//!
//! This module handles:
//! - Sequential connection attempts with a bounded or infinite retry policy
//! - Streaming received bytes to the caller over an event channel
//! - Periodic liveness pings and dead-connection detection

mod manager;
mod session;

pub use manager::{ConnectionConfig, ConnectionEvent, ConnectionManager, RetryPolicy};
pub use session::{DisconnectReason, PING};
