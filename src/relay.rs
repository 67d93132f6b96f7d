//! Relay: session lifecycle on top of the registry and router
//!
//! Shared by every connection handler behind an `Arc`. Each operation first
//! computes its deliveries (registry lock taken only inside the registry)
//! and then hands them to `dispatch`, which performs the sends lock-free.

use std::collections::VecDeque;

use tracing::{debug, info};

use crate::error::RegistryError;
use crate::message::{ClientMessage, ServerMessage};
use crate::registry::Registry;
use crate::router::{self, Delivery};
use crate::session::Session;
use crate::types::SessionId;

/// What the connection handler should do after a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// The chatroom core
#[derive(Debug)]
pub struct Relay {
    registry: Registry,
}

impl Relay {
    /// Create a relay admitting at most `max_sessions` participants
    pub fn new(max_sessions: usize) -> Self {
        Self {
            registry: Registry::new(max_sessions),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Connecting → Active
    ///
    /// Welcomes the session, registers it and announces it to everyone else.
    /// The welcome is queued before registration so that no broadcast can
    /// overtake it. On `CapacityExceeded` the caller must refuse the
    /// connection and drop the session's queue unwritten.
    pub fn join(&self, session: Session) -> Result<(), RegistryError> {
        let welcome = ServerMessage::Welcome {
            name: session.name.to_string(),
        };
        if let Err(e) = session.send(welcome) {
            debug!("Welcome to {} not queued: {}", session.id, e);
        }

        let live = self.registry.register(session.clone())?;
        info!(
            "{} ({}) has joined the chatroom ({} online)",
            session.name, session.id, live
        );
        self.dispatch(router::announce_join(&self.registry, &session));
        Ok(())
    }

    /// Active → Closed
    ///
    /// Deregisters and announces the departure. Returns false when the
    /// session was already gone, in which case nothing is announced.
    pub fn leave(&self, id: SessionId) -> bool {
        let Some(session) = self.registry.deregister(id) else {
            return false;
        };
        info!(
            "{} ({}) has left the chatroom ({} online)",
            session.name,
            session.id,
            self.registry.len()
        );
        self.dispatch(router::announce_leave(&self.registry, &session));
        true
    }

    /// Process one inbound line from an active session
    pub fn handle_line(&self, sender: &Session, line: &str) -> Flow {
        if ClientMessage::parse(line) == Ok(ClientMessage::Exit) {
            return Flow::Exit;
        }
        self.dispatch(router::route(&self.registry, sender, line));
        Flow::Continue
    }

    /// Send deliveries in order
    ///
    /// A failed send means the target's writer is gone: the target is
    /// deregistered and, if it was still live, its leave announcement is
    /// queued behind the remaining deliveries. Failures against sessions
    /// that already left are ignored.
    pub fn dispatch(&self, deliveries: Vec<Delivery>) {
        let mut queue = VecDeque::from(deliveries);
        while let Some(Delivery { target, message }) = queue.pop_front() {
            if let Err(e) = target.send(message) {
                debug!("Write to {} ({}) failed: {}", target.name, target.id, e);
                if let Some(gone) = self.registry.deregister(target.id) {
                    info!(
                        "{} ({}) dropped after write failure ({} online)",
                        gone.name,
                        gone.id,
                        self.registry.len()
                    );
                    queue.extend(router::announce_leave(&self.registry, &gone));
                }
            }
        }
    }
}
