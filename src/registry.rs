//! Session registry
//!
//! The only shared mutable state in the relay. One mutex guards both the
//! live session list and the name index so readers never observe them out
//! of step. No I/O happens while the lock is held: broadcasts iterate over
//! a snapshot.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::RegistryError;
use crate::session::Session;
use crate::types::SessionId;

/// Lock-protected set of live sessions
#[derive(Debug)]
pub struct Registry {
    inner: Mutex<Inner>,
    max_sessions: usize,
}

#[derive(Debug, Default)]
struct Inner {
    /// Live sessions in registration order
    sessions: Vec<Session>,
    /// Display name -> session ids, in registration order
    by_name: HashMap<String, Vec<SessionId>>,
}

impl Inner {
    fn reindex(&mut self) {
        self.by_name.clear();
        for session in &self.sessions {
            self.by_name
                .entry(session.name.as_str().to_string())
                .or_default()
                .push(session.id);
        }
    }
}

impl Registry {
    /// Create an empty registry admitting at most `max_sessions` live sessions
    pub fn new(max_sessions: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            max_sessions,
        }
    }

    // Every critical section leaves `Inner` consistent, so a panic elsewhere
    // while holding the lock does not invalidate the data.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a session to the live set
    ///
    /// Name collisions are accepted; both sessions stay addressable by id.
    /// Returns the new live count.
    pub fn register(&self, session: Session) -> Result<usize, RegistryError> {
        let mut inner = self.lock();
        if inner.sessions.len() >= self.max_sessions {
            return Err(RegistryError::CapacityExceeded {
                max: self.max_sessions,
            });
        }
        if inner.sessions.iter().any(|s| s.id == session.id) {
            return Err(RegistryError::AlreadyRegistered(session.id));
        }

        inner.sessions.push(session);
        inner.reindex();
        Ok(inner.sessions.len())
    }

    /// Remove a session
    ///
    /// Returns the removed session, or `None` if it was not live. Calling
    /// this twice for the same id is harmless.
    pub fn deregister(&self, id: SessionId) -> Option<Session> {
        let mut inner = self.lock();
        let pos = inner.sessions.iter().position(|s| s.id == id)?;
        let removed = inner.sessions.remove(pos);
        inner.reindex();
        Some(removed)
    }

    /// Look up a live session by display name
    ///
    /// With duplicate names the earliest registered session wins.
    pub fn find_by_name(&self, name: &str) -> Option<Session> {
        let inner = self.lock();
        let id = *inner.by_name.get(name)?.first()?;
        inner.sessions.iter().find(|s| s.id == id).cloned()
    }

    /// Point-in-time copy of the live sessions, in registration order
    pub fn snapshot_all(&self) -> Vec<Session> {
        self.lock().sessions.clone()
    }

    /// Number of live sessions
    pub fn len(&self) -> usize {
        self.lock().sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Configured session limit
    pub fn capacity(&self) -> usize {
        self.max_sessions
    }

    #[cfg(test)]
    fn index_is_consistent(&self) -> bool {
        let inner = self.lock();
        let indexed: usize = inner.by_name.values().map(Vec::len).sum();
        indexed == inner.sessions.len()
            && inner.by_name.iter().all(|(name, ids)| {
                ids.iter().all(|id| {
                    inner
                        .sessions
                        .iter()
                        .any(|s| s.id == *id && s.name.as_str() == name)
                })
            })
    }
}
