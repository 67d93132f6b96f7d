//! Relay configuration
//!
//! Every option can come from the command line or the environment.

use std::net::SocketAddr;

use clap::Parser;

/// Default listen address (all interfaces, port 8080)
pub const DEFAULT_LISTEN: &str = "0.0.0.0:8080";

/// Default maximum number of joined participants
pub const DEFAULT_MAX_CLIENTS: usize = 100;

/// Default maximum inbound line length in bytes
pub const DEFAULT_MAX_LINE_LENGTH: usize = 1024;

/// Default tracing filter when RUST_LOG is unset
pub const DEFAULT_LOG_FILTER: &str = "chatroom_relay=info";

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Socket address to accept chat connections on
    #[arg(long, env = "CHATROOM_LISTEN", default_value = DEFAULT_LISTEN)]
    pub listen: SocketAddr,

    /// Connections beyond this many joined participants are refused
    #[arg(long, env = "CHATROOM_MAX_CLIENTS", default_value_t = DEFAULT_MAX_CLIENTS)]
    pub max_clients: usize,

    /// Longer inbound lines are discarded
    #[arg(long, env = "CHATROOM_MAX_LINE_LENGTH", default_value_t = DEFAULT_MAX_LINE_LENGTH)]
    pub max_line_length: usize,

    /// Tracing filter used when RUST_LOG is not set
    #[arg(long, env = "CHATROOM_LOG", default_value = DEFAULT_LOG_FILTER)]
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 8080)),
            max_clients: DEFAULT_MAX_CLIENTS,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}
