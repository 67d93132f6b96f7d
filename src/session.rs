//! Session struct definition
//!
//! Represents a joined participant: its transport handle, display name,
//! and the channel feeding its socket writer.

use tokio::sync::mpsc;

use crate::error::SendError;
use crate::message::ServerMessage;
use crate::types::{DisplayName, SessionId};

/// Connected participant
///
/// Cheap to clone; the registry and broadcast snapshots hold clones while
/// the connection handler owns the receiving end of `sender`.
#[derive(Debug, Clone)]
pub struct Session {
    /// Transport handle
    pub id: SessionId,
    /// Name chosen during the handshake
    pub name: DisplayName,
    /// Relay → socket writer channel
    sender: mpsc::UnboundedSender<ServerMessage>,
}

impl Session {
    /// Create a new session with the given ID, name and writer channel
    pub fn new(
        id: SessionId,
        name: DisplayName,
        sender: mpsc::UnboundedSender<ServerMessage>,
    ) -> Self {
        Self { id, name, sender }
    }

    /// Queue a message for this session's socket writer
    ///
    /// Never blocks. Returns an error if the writer has gone away.
    pub fn send(&self, msg: ServerMessage) -> Result<(), SendError> {
        self.sender.send(msg).map_err(|_| SendError::ChannelClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_reaches_writer() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let name = DisplayName::parse("Alice").unwrap();
        let session = Session::new(SessionId::new(), name, tx);

        session.send(ServerMessage::UserNotFound).unwrap();
        assert!(matches!(rx.try_recv(), Ok(ServerMessage::UserNotFound)));
    }

    #[test]
    fn test_send_after_writer_dropped_fails() {
        let (tx, rx) = mpsc::unbounded_channel();
        let name = DisplayName::parse("Alice").unwrap();
        let session = Session::new(SessionId::new(), name, tx);

        drop(rx);
        assert!(matches!(
            session.send(ServerMessage::UserNotFound),
            Err(SendError::ChannelClosed)
        ));
    }
}
