//! ChatServer accept loop
//!
//! Owns the listener and the shared `Relay`, spawning one handler task per
//! accepted connection until the shutdown future resolves.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::handler::handle_connection;
use crate::relay::Relay;

/// The chatroom server
pub struct ChatServer {
    listener: TcpListener,
    relay: Arc<Relay>,
    max_line_length: usize,
}

impl ChatServer {
    /// Create a server on an already bound listener
    pub fn new(listener: TcpListener, config: &Config) -> Self {
        Self {
            listener,
            relay: Arc::new(Relay::new(config.max_clients)),
            max_line_length: config.max_line_length,
        }
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Shared relay, e.g. for inspecting the registry
    pub fn relay(&self) -> Arc<Relay> {
        Arc::clone(&self.relay)
    }

    /// Accept connections until `shutdown` resolves
    ///
    /// Connection handlers already running are left to finish on their own.
    pub async fn run_until<F>(self, shutdown: F)
    where
        F: Future<Output = ()> + Send,
    {
        let ChatServer {
            listener,
            relay,
            max_line_length,
        } = self;
        tokio::pin!(shutdown);

        info!(
            "ChatServer started (capacity {} sessions)",
            relay.registry().capacity()
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                accept_result = listener.accept() => match accept_result {
                    Ok((stream, addr)) => {
                        info!("New connection from {}", addr);
                        let relay = Arc::clone(&relay);

                        // Spawn handler task for each connection
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(stream, relay, max_line_length).await {
                                error!("Connection handler error: {}", e);
                            }
                        });
                    }
                    Err(e) => {
                        error!("Failed to accept connection: {}", e);
                    }
                },
            }
        }

        info!("ChatServer shutting down ({} sessions live)", relay.registry().len());
    }

    /// Accept connections until Ctrl-C
    pub async fn run_until_ctrl_c(self) {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to install Ctrl-C handler: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }
}
