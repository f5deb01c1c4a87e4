//! The session table: every live session, findable by id or by player.

use std::collections::HashMap;

use pairplay_protocol::{ConnectionId, SessionId, Variant};

use crate::{MatchError, MatchSession, Player};

/// Owns every live [`MatchSession`].
///
/// A connection is registered to at most one session at a time.
#[derive(Debug)]
pub struct SessionTable {
    sessions: HashMap<SessionId, MatchSession>,
    by_connection: HashMap<ConnectionId, SessionId>,
    next_id: u64,
}

impl SessionTable {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
            by_connection: HashMap::new(),
            next_id: 1,
        }
    }

    /// Creates a session in `Matched` with `a` in seat A.
    ///
    /// # Errors
    /// `AlreadyQueued` if the two players are the same connection or either
    /// one already has a session.
    pub fn create(
        &mut self,
        a: Player,
        b: Player,
        variant: Variant,
    ) -> Result<&mut MatchSession, MatchError> {
        if a.connection_id == b.connection_id {
            return Err(MatchError::AlreadyQueued(a.connection_id));
        }
        for conn in [a.connection_id, b.connection_id] {
            if self.by_connection.contains_key(&conn) {
                return Err(MatchError::AlreadyQueued(conn));
            }
        }

        let id = SessionId(self.next_id);
        self.next_id += 1;
        self.by_connection.insert(a.connection_id, id);
        self.by_connection.insert(b.connection_id, id);

        tracing::info!(
            session_id = %id,
            %variant,
            a = %a.connection_id,
            b = %b.connection_id,
            "session created"
        );
        Ok(self
            .sessions
            .entry(id)
            .or_insert(MatchSession::new(id, a, b, variant)))
    }

    /// The session `connection_id` plays in.
    pub fn find(&self, connection_id: ConnectionId) -> Option<&MatchSession> {
        let id = self.by_connection.get(&connection_id)?;
        self.sessions.get(id)
    }

    pub fn find_mut(&mut self, connection_id: ConnectionId) -> Option<&mut MatchSession> {
        let id = self.by_connection.get(&connection_id)?;
        self.sessions.get_mut(id)
    }

    pub fn get(&self, id: SessionId) -> Option<&MatchSession> {
        self.sessions.get(&id)
    }

    /// Deletes a session and both registrations. Idempotent.
    pub fn remove(&mut self, id: SessionId) -> Option<MatchSession> {
        let session = self.sessions.remove(&id)?;
        for p in session.participants() {
            self.by_connection.remove(&p.connection_id);
        }
        tracing::debug!(session_id = %id, "session removed");
        Some(session)
    }

    pub fn contains(&self, connection_id: ConnectionId) -> bool {
        self.by_connection.contains_key(&connection_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for SessionTable {
    fn default() -> Self {
        Self::new()
    }
}
