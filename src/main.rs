//! Chatroom relay - Entry Point
//!
//! Parses configuration, binds the listener and runs the ChatServer.

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use chatroom_relay::{ChatServer, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();

    // Initialize logging with environment filter
    // RUST_LOG wins over --log-filter, e.g. RUST_LOG=chatroom_relay=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .init();

    // Start TCP listener
    let listener = TcpListener::bind(config.listen).await?;
    info!(
        "Chatroom relay listening on {} (max {} clients)",
        listener.local_addr()?,
        config.max_clients
    );

    ChatServer::new(listener, &config).run_until_ctrl_c().await;

    Ok(())
}
