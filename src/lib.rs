//! Minimal TCP Chatroom Relay Library
//!
//! A line-based chat relay: every participant connects over TCP, sends a
//! display name as its first line, and from then on each line it sends is
//! either broadcast to everyone else or, with `/msg <name> <body>`,
//! delivered privately to one participant.
//!
//! # Architecture
//! - `Registry` is the only shared mutable state: one mutex over the live
//!   session list and its name index
//! - `router` turns a line into deliveries using registry snapshots
//! - `Relay` ties join/leave bookkeeping to the registry and sends
//!   deliveries without holding the lock
//! - Each connection has a read task and a write task; the write task
//!   drains the session's channel into the socket
//!
//! # Example
//! ```ignore
//! use tokio::net::TcpListener;
//! use chatroom_relay::{ChatServer, Config};
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let config = Config::default();
//!     let listener = TcpListener::bind(config.listen).await?;
//!     ChatServer::new(listener, &config).run_until_ctrl_c().await;
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod handler;
pub mod message;
pub mod registry;
pub mod relay;
pub mod router;
pub mod server;
pub mod session;
pub mod types;

// Re-export main types for convenience
pub use codec::{ChatLineCodec, InboundLine};
pub use config::Config;
pub use error::{AppError, ParseError, RegistryError, SendError};
pub use handler::handle_connection;
pub use message::{ClientMessage, ServerMessage};
pub use registry::Registry;
pub use relay::{Flow, Relay};
pub use router::{route, Delivery};
pub use server::ChatServer;
pub use session::Session;
pub use types::{DisplayName, SessionId};
