//! Error types for the matchmaking core.
//!
//! Every error is reported to the requesting connection only, and a request
//! that fails leaves the pool and every session exactly as they were.

use pairplay_protocol::{ConnectionId, RejectReason, SessionId};

/// Why a move was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoveViolation {
    /// Tic-tac-toe: the other seat holds the turn.
    #[error("it is not your turn")]
    OutOfTurn,

    /// Tic-tac-toe: the cell already holds a mark.
    #[error("cell is already taken")]
    Occupied,

    /// Tic-tac-toe: the index is not in 0..=8.
    #[error("cell index is off the board")]
    OutOfRange,

    /// A throw sent to a board game, or a placement sent to a throw game.
    #[error("move does not fit this game")]
    WrongVariant,

    /// The round is resolved; only a rematch can start another one.
    #[error("the round is already over")]
    RoundOver,
}

/// Errors returned by [`Lobby`](crate::Lobby) and the types it owns.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    /// The connection is already waiting or already playing.
    #[error("{0} is already queued or in a session")]
    AlreadyQueued(ConnectionId),

    /// The connection is not one of the session's players.
    #[error("{0} is not a participant in session {1}")]
    NotAParticipant(ConnectionId, SessionId),

    /// A throw from this connection is already pending this round.
    #[error("{0} already moved this round")]
    DuplicateMove(ConnectionId),

    /// The move was refused; see [`MoveViolation`].
    #[error("invalid move: {0}")]
    InvalidMove(#[from] MoveViolation),

    /// The connection is not in any session (or, for `leave`, not queued
    /// either).
    #[error("{0} is not in a session")]
    SessionNotFound(ConnectionId),

    /// A rematch needs a resolved round.
    #[error("session {0} has a round in progress")]
    RoundInProgress(SessionId),
}

impl MatchError {
    /// The wire reason sent back in `rejected`.
    pub fn reason(&self) -> RejectReason {
        match self {
            Self::AlreadyQueued(_) => RejectReason::AlreadyQueued,
            Self::NotAParticipant(..) => RejectReason::NotAParticipant,
            Self::DuplicateMove(_) => RejectReason::DuplicateMove,
            Self::InvalidMove(_) => RejectReason::InvalidMove,
            Self::SessionNotFound(_) => RejectReason::SessionNotFound,
            Self::RoundInProgress(_) => RejectReason::RoundInProgress,
        }
    }
}
