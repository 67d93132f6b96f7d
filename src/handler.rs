//! TCP connection handler
//!
//! Handles individual client connections: line framing, the name
//! handshake, and bidirectional communication with the Relay.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::codec::FramedRead;
use tracing::{debug, info, warn};

use crate::codec::{ChatLineCodec, InboundLine};
use crate::error::AppError;
use crate::message::ServerMessage;
use crate::relay::{Flow, Relay};
use crate::session::Session;
use crate::types::{DisplayName, SessionId};

/// How long queued notices may take to reach a departing peer
const WRITE_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle a new TCP connection
///
/// Reads the name line, joins the relay, then runs a read task
/// (socket → Relay) and a write task (Relay → socket) until either ends.
pub async fn handle_connection(
    stream: TcpStream,
    relay: Arc<Relay>,
    max_line_length: usize,
) -> Result<(), AppError> {
    let peer_addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    debug!("New TCP connection from {}", peer_addr);

    let (read_half, mut write_half) = stream.into_split();
    let mut lines = FramedRead::new(read_half, ChatLineCodec::new(max_line_length));

    // Name handshake
    let raw_name = match lines.next().await {
        Some(Ok(InboundLine::Line(line))) => line,
        Some(Ok(InboundLine::Overlong)) => {
            let err = AppError::InvalidName("<too long>".to_string());
            return refuse(&mut write_half, &peer_addr, err).await;
        }
        Some(Err(e)) => return Err(e.into()),
        None => {
            debug!("{} closed before sending a name", peer_addr);
            return Ok(());
        }
    };
    let name = match DisplayName::parse(&raw_name) {
        Ok(name) => name,
        Err(err) => return refuse(&mut write_half, &peer_addr, err).await,
    };

    // Create channel for relay -> client messages
    let session_id = SessionId::new();
    let (msg_tx, mut msg_rx) = mpsc::unbounded_channel::<ServerMessage>();
    let session = Session::new(session_id, name, msg_tx);

    if let Err(e) = relay.join(session.clone()) {
        return refuse(&mut write_half, &peer_addr, e.into()).await;
    }
    info!("Session {} ({}) active from {}", session_id, session.name, peer_addr);

    // Spawn read task (socket -> Relay)
    let read_relay = Arc::clone(&relay);
    let read_session = session.clone();
    let mut read_task = tokio::spawn(async move {
        while let Some(line_result) = lines.next().await {
            match line_result {
                Ok(InboundLine::Line(line)) => {
                    if read_relay.handle_line(&read_session, &line) == Flow::Exit {
                        debug!("Session {} sent exit", read_session.id);
                        break;
                    }
                }
                Ok(InboundLine::Overlong) => {
                    warn!("Session {} sent an overlong line, discarded", read_session.id);
                }
                Err(e) => {
                    debug!("Read error for {}: {}", read_session.id, e);
                    break;
                }
            }
        }
        debug!("Read task ended for {}", read_session.id);
    });

    // Spawn write task (Relay -> socket)
    let mut write_task = tokio::spawn(async move {
        while let Some(msg) = msg_rx.recv().await {
            if let Err(e) = write_half.write_all(msg.to_string().as_bytes()).await {
                debug!("Socket write failed for {}: {}", session_id, e);
                break;
            }
        }
        debug!("Write task ended for {}", session_id);

        let _ = write_half.shutdown().await;
    });

    // Wait for either task to complete
    let writer_done = tokio::select! {
        _ = &mut read_task => {
            debug!("Read task completed for {}", session_id);
            false
        }
        _ = &mut write_task => {
            debug!("Write task completed for {}", session_id);
            true
        }
    };
    read_task.abort();

    relay.leave(session_id);
    drop(session);

    // The writer finishes once the last Session clone is gone and its queue
    // is flushed. A peer that stopped reading would block it forever.
    if !writer_done && timeout(WRITE_DRAIN_TIMEOUT, &mut write_task).await.is_err() {
        debug!("Write task for {} did not drain, aborting", session_id);
        write_task.abort();
    }

    info!("Session {} disconnected", session_id);

    Ok(())
}

/// Write the refusal notice for `err` and close the connection
async fn refuse(
    write_half: &mut OwnedWriteHalf,
    peer_addr: &str,
    err: AppError,
) -> Result<(), AppError> {
    info!("Refusing {}: {}", peer_addr, err);
    if let Some(notice) = ServerMessage::refusal(&err) {
        write_half.write_all(notice.to_string().as_bytes()).await?;
    }
    write_half.shutdown().await?;
    Ok(())
}
