//! The lobby: the one place that mutates the pool and the session table.
//!
//! A server holds exactly one `Lobby` and passes every request through it.
//! Tests build their own, so nothing here is global.

use pairplay_protocol::{ConnectionId, Move, ServerEvent, SessionId, Variant};

use crate::{MatchError, Outbound, Player, SessionPhase, SessionTable, WaitingPool};

/// Where a connection stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerStatus {
    /// Neither queued nor playing.
    Unknown,
    /// Waiting for an opponent.
    Idle { variant: Variant },
    /// Seated in a session.
    Playing {
        session_id: SessionId,
        phase: SessionPhase,
    },
}

/// Matchmaking context: one [`WaitingPool`] plus one [`SessionTable`].
#[derive(Debug, Default)]
pub struct Lobby {
    pool: WaitingPool,
    sessions: SessionTable,
}

impl Lobby {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a player and pairs them if someone of the same variant waits.
    ///
    /// # Errors
    /// `AlreadyQueued` if the connection is waiting or playing.
    pub fn join(
        &mut self,
        connection_id: ConnectionId,
        display_name: impl Into<String>,
        variant: Variant,
    ) -> Result<Vec<Outbound>, MatchError> {
        if self.sessions.contains(connection_id) {
            return Err(MatchError::AlreadyQueued(connection_id));
        }
        self.pool
            .enqueue(Player::new(connection_id, display_name, variant))?;

        let mut out = Vec::new();
        if let Some((a, b)) = self.pool.try_pair(variant) {
            let session = self.sessions.create(a, b, variant)?;
            out.extend(session.start());
        }
        if self.pool.contains(connection_id) {
            out.push(Outbound::new(connection_id, ServerEvent::Waiting));
        }
        Ok(out)
    }

    /// Routes a move to the caller's session.
    pub fn submit_move(
        &mut self,
        connection_id: ConnectionId,
        mv: Move,
    ) -> Result<Vec<Outbound>, MatchError> {
        self.sessions
            .find_mut(connection_id)
            .ok_or(MatchError::SessionNotFound(connection_id))?
            .submit(connection_id, mv)
    }

    /// Starts another round in the caller's session.
    pub fn rematch(&mut self, connection_id: ConnectionId) -> Result<Vec<Outbound>, MatchError> {
        self.sessions
            .find_mut(connection_id)
            .ok_or(MatchError::SessionNotFound(connection_id))?
            .rematch(connection_id)
    }

    /// Leaves the queue silently, or ends the caller's session.
    ///
    /// # Errors
    /// `SessionNotFound` if the connection is neither queued nor playing.
    pub fn leave(&mut self, connection_id: ConnectionId) -> Result<Vec<Outbound>, MatchError> {
        if self.pool.remove(connection_id).is_some() {
            tracing::info!(%connection_id, "left queue");
            return Ok(Vec::new());
        }

        let session = self
            .sessions
            .find_mut(connection_id)
            .ok_or(MatchError::SessionNotFound(connection_id))?;
        let id = session.id();
        let out = session.end(connection_id)?;
        self.sessions.remove(id);
        Ok(out)
    }

    /// Cleans up after a closed connection. Never fails.
    pub fn disconnect(&mut self, connection_id: ConnectionId) -> Vec<Outbound> {
        self.leave(connection_id).unwrap_or_default()
    }

    pub fn status(&self, connection_id: ConnectionId) -> PlayerStatus {
        if let Some(variant) = self.pool.variant_of(connection_id) {
            return PlayerStatus::Idle { variant };
        }
        match self.sessions.find(connection_id) {
            Some(session) => PlayerStatus::Playing {
                session_id: session.id(),
                phase: session.phase(),
            },
            None => PlayerStatus::Unknown,
        }
    }

    pub fn pool(&self) -> &WaitingPool {
        &self.pool
    }

    pub fn sessions(&self) -> &SessionTable {
        &self.sessions
    }
}
