//! Error types for the chat relay
//!
//! Defines connection-level errors, registry errors, line parse errors
//! and message send errors. Uses thiserror for ergonomic error definitions.

use thiserror::Error;
use tokio_util::codec::AnyDelimiterCodecError;

use crate::types::SessionId;

/// Application-level errors
///
/// Covers both fatal errors (connection termination) and
/// handshake refusals (notice sent to the peer, then close).
#[derive(Debug, Error)]
pub enum AppError {
    /// IO error (fatal)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Line framing error (socket read failure)
    #[error("Line codec error: {0}")]
    Codec(#[from] AnyDelimiterCodecError),

    /// Handshake name outside 2-31 bytes or containing control characters
    #[error("Invalid display name: {0:?}")]
    InvalidName(String),

    /// Registration refused
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Session registry errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Live-session count has reached the configured maximum
    #[error("Registry full ({max} sessions)")]
    CapacityExceeded { max: usize },

    /// The session handle is already live
    #[error("Session {0} is already registered")]
    AlreadyRegistered(SessionId),
}

/// Inbound line classification errors
///
/// Neither variant is ever reported to the sender; the line is dropped.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// Nothing left after trimming the line terminator
    #[error("Empty line")]
    Empty,

    /// `/msg` without a target name and a body
    #[error("Malformed /msg, expected `/msg <name> <body>`")]
    MalformedDirect,
}

/// Message send errors
///
/// Occurs when the session's writer task has ended (peer gone or write failed).
#[derive(Debug, Error)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    ChannelClosed,
}
