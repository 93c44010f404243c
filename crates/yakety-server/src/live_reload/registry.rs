//! Session registry.
//!
//! Tracks the browser tabs currently connected to the live reload endpoint.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

/// Unique identifier of one connected browser tab.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct SessionId(Uuid);

impl SessionId {
    /// Generate a fresh identifier.
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Error from a local transport write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub(crate) enum SendError {
    /// The connection behind the transport has gone away.
    #[error("transport closed")]
    Closed,
}

/// Outbound half of a notification channel.
///
/// `send` only reports whether the message was accepted locally; there is no
/// acknowledgement that the browser received it.
pub(crate) trait Transport: Send + Sync {
    /// Whether the transport can currently accept a message.
    fn is_open(&self) -> bool;

    /// Queue a text message for delivery.
    fn send(&self, message: &str) -> Result<(), SendError>;
}

/// One connected observer.
#[derive(Clone)]
pub(crate) struct Session {
    id: SessionId,
    transport: Arc<dyn Transport>,
}

impl Session {
    pub(crate) fn new(id: SessionId, transport: Arc<dyn Transport>) -> Self {
        Self { id, transport }
    }

    pub(crate) fn id(&self) -> SessionId {
        self.id
    }

    pub(crate) fn is_open(&self) -> bool {
        self.transport.is_open()
    }

    pub(crate) fn send(&self, message: &str) -> Result<(), SendError> {
        self.transport.send(message)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("open", &self.is_open())
            .finish()
    }
}

/// Set of live sessions, unique per [`SessionId`].
///
/// Only the live reload hub owns a registry, so every mutation is serialized
/// through its command queue.
#[derive(Debug, Default)]
pub(crate) struct SessionRegistry {
    sessions: HashMap<SessionId, Session>,
}

impl SessionRegistry {
    /// Add a session to the live set.
    pub(crate) fn register(&mut self, session: Session) {
        let id = session.id();
        self.sessions.insert(id, session);
        tracing::info!(session = %id, live = self.sessions.len(), "Live reload client connected");
    }

    /// Remove a session. Late or duplicate close signals are a no-op.
    ///
    /// Returns `true` if the session was present.
    pub(crate) fn unregister(&mut self, id: SessionId) -> bool {
        let removed = self.sessions.remove(&id).is_some();
        if removed {
            tracing::info!(session = %id, live = self.sessions.len(), "Live reload client disconnected");
        }
        removed
    }

    /// Copy of the sessions registered right now.
    pub(crate) fn snapshot(&self) -> Vec<Session> {
        self.sessions.values().cloned().collect()
    }

    /// Apply `f` once to every session registered at call time.
    pub(crate) fn for_each_live(&self, mut f: impl FnMut(&Session)) {
        for session in &self.snapshot() {
            f(session);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.sessions.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
