//! One pairing of two players and its state machine.
//!
//! ```text
//! Matched → AwaitingMoves → Resolved ─(rematch)→ AwaitingMoves
//!    └───────────┴─────────────┴──────(leave)──→ Ended
//! ```
//!
//! Every transition returns the notices it produced. A transition that
//! fails returns an error and changes nothing.

use std::collections::HashMap;
use std::fmt;

use pairplay_protocol::{
    BOARD_CELLS, Board, Choice, ConnectionId, Move, Outcome, Score, Seat, ServerEvent, SessionId,
    Variant,
};

use crate::resolver::{BoardStatus, resolve_board, resolve_rps};
use crate::{MatchError, MoveViolation, Player};

/// A notice for one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub to: ConnectionId,
    pub event: ServerEvent,
}

impl Outbound {
    pub fn new(to: ConnectionId, event: ServerEvent) -> Self {
        Self { to, event }
    }
}

/// One of the two players in a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub connection_id: ConnectionId,
    pub display_name: String,
    pub seat: Seat,
}

/// The lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Both players are known; `opponentFound` not yet sent.
    Matched,
    /// Moves are accepted.
    AwaitingMoves,
    /// The round has an outcome; waiting for a rematch or a leave.
    Resolved,
    /// Someone left. The session is about to be removed.
    Ended,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Matched => write!(f, "Matched"),
            Self::AwaitingMoves => write!(f, "AwaitingMoves"),
            Self::Resolved => write!(f, "Resolved"),
            Self::Ended => write!(f, "Ended"),
        }
    }
}

/// Per-variant round state.
#[derive(Debug, Clone)]
enum Round {
    Throws {
        pending: HashMap<ConnectionId, Choice>,
    },
    Board {
        board: Board,
        turn: Seat,
    },
}

impl Round {
    fn fresh(variant: Variant) -> Self {
        match variant {
            Variant::RockPaperScissors => Self::Throws {
                pending: HashMap::new(),
            },
            Variant::TicTacToe => Self::Board {
                board: Board::new(),
                turn: Seat::A,
            },
        }
    }
}

/// A live pairing. Owned by the [`SessionTable`](crate::SessionTable).
#[derive(Debug, Clone)]
pub struct MatchSession {
    id: SessionId,
    variant: Variant,
    /// Index 0 is seat A, index 1 is seat B.
    players: [Participant; 2],
    phase: SessionPhase,
    state: Round,
    round: u32,
    score: Score,
    last_outcome: Option<Outcome>,
    resolutions: u32,
}

impl MatchSession {
    /// Seats `a` in A and `b` in B. The caller passes the earlier-queued
    /// player as `a`.
    pub(crate) fn new(id: SessionId, a: Player, b: Player, variant: Variant) -> Self {
        let participant = |player: Player, seat| Participant {
            connection_id: player.connection_id,
            display_name: player.display_name,
            seat,
        };
        Self {
            id,
            variant,
            players: [participant(a, Seat::A), participant(b, Seat::B)],
            phase: SessionPhase::Matched,
            state: Round::fresh(variant),
            round: 1,
            score: Score::default(),
            last_outcome: None,
            resolutions: 0,
        }
    }

    // -- Queries --------------------------------------------------------

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// The current round, starting at 1. A rematch adds one.
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn last_outcome(&self) -> Option<Outcome> {
        self.last_outcome
    }

    /// How many rounds have been resolved. Exactly one per round.
    pub fn resolutions(&self) -> u32 {
        self.resolutions
    }

    pub fn participants(&self) -> &[Participant; 2] {
        &self.players
    }

    pub fn participant(&self, seat: Seat) -> &Participant {
        match seat {
            Seat::A => &self.players[0],
            Seat::B => &self.players[1],
        }
    }

    pub fn seat_of(&self, connection_id: ConnectionId) -> Option<Seat> {
        self.players
            .iter()
            .find(|p| p.connection_id == connection_id)
            .map(|p| p.seat)
    }

    /// The other player, if `connection_id` is one of the two.
    pub fn opponent_of(&self, connection_id: ConnectionId) -> Option<&Participant> {
        self.seat_of(connection_id)
            .map(|seat| self.participant(seat.other()))
    }

    /// The throw a player has locked in this round (rock-paper-scissors).
    pub fn pending_move(&self, connection_id: ConnectionId) -> Option<Choice> {
        match &self.state {
            Round::Throws { pending } => pending.get(&connection_id).copied(),
            Round::Board { .. } => None,
        }
    }

    /// Number of throws locked in this round.
    pub fn pending_count(&self) -> usize {
        match &self.state {
            Round::Throws { pending } => pending.len(),
            Round::Board { .. } => 0,
        }
    }

    /// The board (tic-tac-toe only).
    pub fn board(&self) -> Option<&Board> {
        match &self.state {
            Round::Board { board, .. } => Some(board),
            Round::Throws { .. } => None,
        }
    }

    /// The seat allowed to place next (tic-tac-toe only).
    pub fn turn_owner(&self) -> Option<Seat> {
        match &self.state {
            Round::Board { turn, .. } => Some(*turn),
            Round::Throws { .. } => None,
        }
    }

    // -- Transitions ----------------------------------------------------

    /// `Matched → AwaitingMoves`. Tells both players who they face.
    ///
    /// Calling it in any other phase does nothing.
    pub fn start(&mut self) -> Vec<Outbound> {
        if self.phase != SessionPhase::Matched {
            return Vec::new();
        }
        self.phase = SessionPhase::AwaitingMoves;

        tracing::info!(
            session_id = %self.id,
            variant = %self.variant,
            seat_a = %self.players[0].connection_id,
            seat_b = %self.players[1].connection_id,
            "session started"
        );

        self.players
            .iter()
            .map(|me| {
                let opponent = self.participant(me.seat.other());
                Outbound::new(
                    me.connection_id,
                    ServerEvent::OpponentFound {
                        session_id: self.id,
                        opponent_name: opponent.display_name.clone(),
                        variant: self.variant,
                        seat: me.seat,
                        assigned_mark: match self.variant {
                            Variant::TicTacToe => Some(me.seat.mark()),
                            Variant::RockPaperScissors => None,
                        },
                        your_turn: self.is_turn_of(me.seat),
                    },
                )
            })
            .collect()
    }

    /// Applies one move from `connection_id`.
    ///
    /// # Errors
    /// - `NotAParticipant` if the sender is not seated here
    /// - `DuplicateMove` for a second throw in the same round
    /// - `InvalidMove` for anything the rules refuse
    pub fn submit(
        &mut self,
        connection_id: ConnectionId,
        mv: Move,
    ) -> Result<Vec<Outbound>, MatchError> {
        let seat = self
            .seat_of(connection_id)
            .ok_or(MatchError::NotAParticipant(connection_id, self.id))?;

        match self.phase {
            SessionPhase::AwaitingMoves => {}
            SessionPhase::Matched => return Err(MoveViolation::OutOfTurn.into()),
            SessionPhase::Resolved | SessionPhase::Ended => {
                return Err(MoveViolation::RoundOver.into());
            }
        }

        let a = self.players[0].connection_id;
        let b = self.players[1].connection_id;

        let (mut out, status) = match (&mut self.state, mv) {
            (Round::Throws { pending }, Move::Throw(choice)) => {
                if pending.contains_key(&connection_id) {
                    return Err(MatchError::DuplicateMove(connection_id));
                }
                pending.insert(connection_id, choice);
                tracing::debug!(session_id = %self.id, %connection_id, "move locked");

                let (Some(&choice_a), Some(&choice_b)) = (pending.get(&a), pending.get(&b)) else {
                    return Ok(vec![Outbound::new(connection_id, ServerEvent::MoveLocked)]);
                };
                let out = vec![
                    Outbound::new(a, ServerEvent::OpponentMove { choice: choice_b }),
                    Outbound::new(b, ServerEvent::OpponentMove { choice: choice_a }),
                ];
                (out, BoardStatus::Finished(resolve_rps(choice_a, choice_b)))
            }

            (Round::Board { board, turn }, Move::Place(index)) => {
                if seat != *turn {
                    return Err(MoveViolation::OutOfTurn.into());
                }
                if index >= BOARD_CELLS {
                    return Err(MoveViolation::OutOfRange.into());
                }
                let mark = seat.mark();
                if !board.place(index, mark) {
                    return Err(MoveViolation::Occupied.into());
                }
                *turn = turn.other();

                let status = resolve_board(board);
                let next_turn = (!status.is_finished()).then_some(*turn);
                let broadcast = ServerEvent::MoveBroadcast {
                    board: *board,
                    cell_index: index,
                    mark,
                    next_turn,
                };
                let out = vec![
                    Outbound::new(a, broadcast.clone()),
                    Outbound::new(b, broadcast),
                ];
                (out, status)
            }

            _ => return Err(MoveViolation::WrongVariant.into()),
        };

        if let BoardStatus::Finished(outcome) = status {
            out.extend(self.resolve(outcome));
        }
        Ok(out)
    }

    /// `Resolved → AwaitingMoves` with the same pairing and score.
    ///
    /// # Errors
    /// `NotAParticipant`, or `RoundInProgress` unless the round is resolved.
    pub fn rematch(&mut self, connection_id: ConnectionId) -> Result<Vec<Outbound>, MatchError> {
        if self.seat_of(connection_id).is_none() {
            return Err(MatchError::NotAParticipant(connection_id, self.id));
        }
        if self.phase != SessionPhase::Resolved {
            return Err(MatchError::RoundInProgress(self.id));
        }

        self.state = Round::fresh(self.variant);
        self.round += 1;
        self.phase = SessionPhase::AwaitingMoves;
        tracing::info!(session_id = %self.id, round = self.round, "rematch started");

        Ok(self
            .players
            .iter()
            .map(|p| {
                Outbound::new(
                    p.connection_id,
                    ServerEvent::RematchStarted {
                        round: self.round,
                        your_turn: self.is_turn_of(p.seat),
                    },
                )
            })
            .collect())
    }

    /// `→ Ended`. The remaining player gets exactly one `opponentLeft`.
    ///
    /// # Errors
    /// `NotAParticipant` if `connection_id` is not seated here.
    pub fn end(&mut self, connection_id: ConnectionId) -> Result<Vec<Outbound>, MatchError> {
        let remaining = self
            .opponent_of(connection_id)
            .map(|p| p.connection_id)
            .ok_or(MatchError::NotAParticipant(connection_id, self.id))?;

        if self.phase == SessionPhase::Ended {
            return Ok(Vec::new());
        }
        self.phase = SessionPhase::Ended;
        tracing::info!(session_id = %self.id, left = %connection_id, "session ended");

        Ok(vec![Outbound::new(remaining, ServerEvent::OpponentLeft)])
    }

    fn is_turn_of(&self, seat: Seat) -> bool {
        match &self.state {
            Round::Board { turn, .. } => *turn == seat,
            // Both throw at once.
            Round::Throws { .. } => true,
        }
    }

    fn resolve(&mut self, outcome: Outcome) -> Vec<Outbound> {
        self.score.record(outcome);
        self.last_outcome = Some(outcome);
        self.resolutions += 1;
        self.phase = SessionPhase::Resolved;

        tracing::info!(
            session_id = %self.id,
            round = self.round,
            winner = ?outcome.winner(),
            rounds_played = self.score.rounds(),
            "round resolved"
        );

        self.players
            .iter()
            .map(|p| {
                Outbound::new(
                    p.connection_id,
                    ServerEvent::Result {
                        outcome,
                        seat: p.seat,
                        score: self.score,
                    },
                )
            })
            .collect()
    }
}
