//! Line protocol definitions
//!
//! Inbound lines are classified into `ClientMessage`s; everything the relay
//! writes to a socket is a `ServerMessage`, whose `Display` impl is the exact
//! wire text including the trailing newline.

use std::fmt;

use crate::error::{AppError, ParseError, RegistryError};
use crate::types::{MAX_NAME_LEN, MIN_NAME_LEN};

/// Prefix of a directed message: `/msg <name> <body>`
pub const DIRECT_MARKER: &str = "/msg ";

/// Line that ends the sender's session
pub const EXIT_COMMAND: &str = "/exit";

/// Client → relay message, borrowed from one inbound line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientMessage<'a> {
    /// Plain line for everyone else
    Chat { body: &'a str },
    /// Private line for one named participant
    Direct { target: &'a str, body: &'a str },
    /// Leave the chatroom
    Exit,
}

impl<'a> ClientMessage<'a> {
    /// Classify one inbound line
    ///
    /// The trailing terminator is stripped first. A `/msg` line without a
    /// body is `MalformedDirect`; callers drop it without telling the sender.
    pub fn parse(raw: &'a str) -> Result<Self, ParseError> {
        let line = raw.trim_end_matches(|c: char| c == '\r' || c == '\n');
        if line.is_empty() {
            return Err(ParseError::Empty);
        }

        if line.trim() == EXIT_COMMAND {
            return Ok(Self::Exit);
        }

        if let Some(rest) = line.strip_prefix(DIRECT_MARKER) {
            let (target, body) = rest
                .trim_start()
                .split_once(' ')
                .ok_or(ParseError::MalformedDirect)?;
            if body.trim().is_empty() {
                return Err(ParseError::MalformedDirect);
            }
            return Ok(Self::Direct { target, body });
        }

        Ok(Self::Chat { body: line })
    }
}

/// Relay → client message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// Sent only to the participant who just joined
    Welcome { name: String },
    /// Broadcast line from another participant
    Chat { from: String, body: String },
    /// Direct line from another participant
    Private { from: String, body: String },
    /// Direct-message target is not connected
    UserNotFound,
    /// Someone else joined
    Joined { name: String },
    /// Someone else left
    Left { name: String },
    /// Handshake refused: registry at capacity
    ChatroomFull,
    /// Handshake refused: bad name
    InvalidName,
}

impl fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Welcome { name } => writeln!(f, "Welcome to the chatroom, {}!", name),
            Self::Chat { from, body } => writeln!(f, "{}: {}", from, body),
            Self::Private { from, body } => writeln!(f, "[Private from {}]: {}", from, body),
            Self::UserNotFound => writeln!(f, "User not found."),
            Self::Joined { name } => writeln!(f, "{} has joined the chatroom.", name),
            Self::Left { name } => writeln!(f, "{} has left the chatroom.", name),
            Self::ChatroomFull => writeln!(f, "Chatroom is full, try again later."),
            Self::InvalidName => writeln!(
                f,
                "Name must be between {} and {} characters.",
                MIN_NAME_LEN, MAX_NAME_LEN
            ),
        }
    }
}

impl ServerMessage {
    /// Notice written before closing a refused handshake
    ///
    /// `None` for errors that close the connection without a notice.
    pub fn refusal(err: &AppError) -> Option<Self> {
        match err {
            AppError::Registry(RegistryError::CapacityExceeded { .. }) => Some(Self::ChatroomFull),
            AppError::InvalidName(_) => Some(Self::InvalidName),
            AppError::Registry(RegistryError::AlreadyRegistered(_))
            | AppError::Io(_)
            | AppError::Codec(_) => None,
        }
    }
}
