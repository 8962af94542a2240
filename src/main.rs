mod cli;
mod connection;

use clap::Parser;
use connection::{ConnectionEvent, ConnectionManager};
use std::io::Write;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let args = cli::Args::parse();
    let config = args.to_config();

    info!("Starting connection to {}:{}", config.host, config.port);

    let mut conn = ConnectionManager::new(config);
    let mut stdout = std::io::stdout();

    while let Some(event) = conn.recv().await {
        match event {
            ConnectionEvent::Connected { peer } => {
                info!("Connection made: {}", peer);
            }
            ConnectionEvent::Data(data) => {
                // Stream payload goes to stdout verbatim; all-whitespace
                // chunks are suppressed
                let text = String::from_utf8_lossy(&data);
                if !text.trim().is_empty() {
                    let _ = stdout.write_all(text.as_bytes());
                    let _ = stdout.flush();
                }
            }
            ConnectionEvent::Disconnected { reason } => {
                warn!("Connection lost: {}", reason);
            }
            ConnectionEvent::AttemptFailed { attempt, error } => {
                warn!("Connection attempt {} failed: {}", attempt, error);
            }
            ConnectionEvent::RetriesExhausted { attempts } => {
                info!("Gave up after {} attempts", attempts);
            }
        }
    }

    info!("Either a fatal error has occurred or there have been too many attempts, restarting");
}
