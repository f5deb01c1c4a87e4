//! The events that travel on a Pairplay connection.
//!
//! Every frame is an [`Envelope`] around exactly one event. Events are a
//! closed set: a frame whose `type` tag is not listed here does not decode,
//! and the gateway answers it with a `rejected` event instead of passing
//! anything loosely typed to the core.
//!
//! JSON shape (internally tagged, camelCase names and fields):
//!
//! ```text
//! { "seq": 3, "timestamp": 1520,
//!   "event": { "type": "join", "displayName": "Alice", "variant": "ticTacToe" } }
//! { "seq": 7, "timestamp": 1604,
//!   "event": { "type": "result", "outcome": "winA", "seat": "A", "score": { ... } } }
//! ```

use serde::{Deserialize, Serialize};

use crate::{Board, Choice, ConnectionId, Mark, Outcome, Score, Seat, SessionId, Variant};

/// The protocol version announced in `welcome`. Bump on breaking changes to
/// event shapes.
pub const PROTOCOL_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// The top-level frame. Every message on the wire is an `Envelope`.
///
/// `seq` counts frames per direction per connection; `timestamp` is
/// milliseconds since the sender started. Both default to 0 when a client
/// leaves them out, so a minimal client can send `{"event": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<E> {
    /// Per-connection sequence number.
    #[serde(default)]
    pub seq: u64,

    /// Milliseconds since the sender started.
    #[serde(default)]
    pub timestamp: u64,

    /// The event carried by this frame.
    pub event: E,
}

impl<E> Envelope<E> {
    /// Wraps an event.
    pub fn new(seq: u64, timestamp: u64, event: E) -> Self {
        Self {
            seq,
            timestamp,
            event,
        }
    }
}

// ---------------------------------------------------------------------------
// Client → server
// ---------------------------------------------------------------------------

/// Everything a client may ask of the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    /// "Find me an opponent." The display name comes from whatever identity
    /// provider the client uses; the server treats it as an opaque label.
    Join {
        display_name: String,
        #[serde(default)]
        variant: Variant,
    },

    /// Submit a move. Rock-paper-scissors sends `choice`, tic-tac-toe sends
    /// `cellIndex`. Exactly one must be present.
    ///
    /// `cellIndex` is signed so that a negative index still decodes and is
    /// refused as an off-board move rather than as a malformed frame.
    Move {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        choice: Option<Choice>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cell_index: Option<i64>,
    },

    /// Play another round with the same opponent.
    Rematch,

    /// Leave the queue or the current session.
    Leave,

    /// Keep-alive. Any frame resets the idle timer; this one also gets a
    /// `pong` back so the client can measure round-trip time.
    Ping { client_time: u64 },
}

impl ClientEvent {
    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Join { .. } => "join",
            Self::Move { .. } => "move",
            Self::Rematch => "rematch",
            Self::Leave => "leave",
            Self::Ping { .. } => "ping",
        }
    }
}

// ---------------------------------------------------------------------------
// Server → client
// ---------------------------------------------------------------------------

/// Why a client request was refused. Sent only to the client that made it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RejectReason {
    /// Already waiting for an opponent or already playing.
    AlreadyQueued,
    /// The connection is not one of the session's two players.
    NotAParticipant,
    /// A rock-paper-scissors move was already submitted this round.
    DuplicateMove,
    /// Wrong move shape, occupied cell, off-board index, out of turn, or the
    /// round is already over.
    InvalidMove,
    /// The connection is not in any session.
    SessionNotFound,
    /// A rematch was requested before the current round resolved.
    RoundInProgress,
    /// The display name is empty or too long.
    InvalidName,
    /// The frame could not be decoded.
    Malformed,
}

/// Everything the server may tell a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// First frame on every connection.
    Welcome {
        connection_id: ConnectionId,
        protocol_version: u32,
    },

    /// Queued; no opponent yet.
    Waiting,

    /// Paired. Sent to both players at once.
    OpponentFound {
        session_id: SessionId,
        opponent_name: String,
        variant: Variant,
        seat: Seat,
        /// Tic-tac-toe only.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        assigned_mark: Option<Mark>,
        your_turn: bool,
    },

    /// Rock-paper-scissors: your throw is in, the opponent's is not.
    MoveLocked,

    /// Rock-paper-scissors: the opponent's throw, sent once both are in.
    OpponentMove { choice: Choice },

    /// Tic-tac-toe: the board after an accepted move. Sent to both players.
    MoveBroadcast {
        board: Board,
        cell_index: usize,
        mark: Mark,
        /// Absent once the game is over.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        next_turn: Option<Seat>,
    },

    /// The round is resolved. `seat` is the recipient's own seat, so
    /// `outcome: winA` with `seat: A` means "you won".
    Result {
        outcome: Outcome,
        seat: Seat,
        score: Score,
    },

    /// A rematch began; moves are accepted again.
    RematchStarted { round: u32, your_turn: bool },

    /// The opponent left or disconnected. The session is gone.
    OpponentLeft,

    /// A request from this client was refused. Nothing changed.
    Rejected {
        reason: RejectReason,
        message: String,
    },

    /// Answer to `ping`.
    Pong { client_time: u64, server_time: u64 },
}
