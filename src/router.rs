//! Message routing
//!
//! Turns one inbound line into the list of deliveries it causes. Routing
//! only reads the registry (a snapshot or a name lookup) and never writes to
//! a socket; `Relay::dispatch` performs the sends afterwards.

use tracing::debug;

use crate::message::{ClientMessage, ServerMessage};
use crate::registry::Registry;
use crate::session::Session;
use crate::types::SessionId;

/// One outbound message addressed to one session
#[derive(Debug, Clone)]
pub struct Delivery {
    pub target: Session,
    pub message: ServerMessage,
}

impl Delivery {
    pub fn new(target: Session, message: ServerMessage) -> Self {
        Self { target, message }
    }
}

/// Route a raw inbound line from `sender`
///
/// Empty lines and malformed `/msg` lines produce no deliveries. Never fails.
pub fn route(registry: &Registry, sender: &Session, raw: &str) -> Vec<Delivery> {
    match ClientMessage::parse(raw) {
        Ok(msg) => route_message(registry, sender, msg),
        Err(e) => {
            debug!("Dropping line from {}: {}", sender.id, e);
            Vec::new()
        }
    }
}

/// Route an already classified message
pub fn route_message(registry: &Registry, sender: &Session, msg: ClientMessage<'_>) -> Vec<Delivery> {
    let from = sender.name.to_string();
    match msg {
        ClientMessage::Chat { body } => broadcast(
            registry,
            sender.id,
            ServerMessage::Chat {
                from,
                body: body.to_string(),
            },
        ),
        ClientMessage::Direct { target, body } => match registry.find_by_name(target) {
            Some(recipient) => vec![Delivery::new(
                recipient,
                ServerMessage::Private {
                    from,
                    body: body.to_string(),
                },
            )],
            None => {
                debug!("{} sent a private message to unknown user '{}'", from, target);
                vec![Delivery::new(sender.clone(), ServerMessage::UserNotFound)]
            }
        },
        // Exit is a lifecycle event, nothing to deliver
        ClientMessage::Exit => Vec::new(),
    }
}

/// One delivery of `message` per live session except `except`, in snapshot order
pub fn broadcast(registry: &Registry, except: SessionId, message: ServerMessage) -> Vec<Delivery> {
    registry
        .snapshot_all()
        .into_iter()
        .filter(|s| s.id != except)
        .map(|s| Delivery::new(s, message.clone()))
        .collect()
}

/// Join announcement for everyone except the joiner
pub fn announce_join(registry: &Registry, joined: &Session) -> Vec<Delivery> {
    broadcast(
        registry,
        joined.id,
        ServerMessage::Joined {
            name: joined.name.to_string(),
        },
    )
}

/// Leave announcement for every remaining session
pub fn announce_leave(registry: &Registry, left: &Session) -> Vec<Delivery> {
    broadcast(
        registry,
        left.id,
        ServerMessage::Left {
            name: left.name.to_string(),
        },
    )
}
