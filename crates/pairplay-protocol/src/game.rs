//! Game value types shared by the wire and the matchmaking core.
//!
//! These are plain data: who sits where, what was thrown, what the board
//! looks like, who won. The rules that decide outcomes live in
//! `pairplay-match`; this module only names things.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// A unique identifier for one pairing of two players.
///
/// Allocated by the session table. A rematch keeps the same id; a new
/// pairing after someone leaves gets a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Variant, seats, marks
// ---------------------------------------------------------------------------

/// Which ruleset a session runs.
///
/// Players are only ever paired with someone who asked for the same
/// variant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum Variant {
    /// Simultaneous throws, one round at a time.
    #[default]
    RockPaperScissors,
    /// Alternating placements on a 3×3 board.
    TicTacToe,
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RockPaperScissors => write!(f, "rock-paper-scissors"),
            Self::TicTacToe => write!(f, "tic-tac-toe"),
        }
    }
}

/// One side of a session.
///
/// Seat `A` always belongs to the player who queued first. Outcomes are
/// expressed in seats (`WinA`/`WinB`), so both clients can read the same
/// `result` event and know whether they won.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Seat {
    A,
    B,
}

impl Seat {
    /// The other seat.
    pub fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }

    /// The tic-tac-toe mark held by this seat.
    pub fn mark(self) -> Mark {
        match self {
            Self::A => Mark::Cross,
            Self::B => Mark::Circle,
        }
    }
}

/// A tic-tac-toe mark. `cross` is held by seat A and always moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    Cross,
    Circle,
}

impl Mark {
    /// The seat that places this mark.
    pub fn seat(self) -> Seat {
        match self {
            Self::Cross => Seat::A,
            Self::Circle => Seat::B,
        }
    }
}

// ---------------------------------------------------------------------------
// Moves
// ---------------------------------------------------------------------------

/// A rock-paper-scissors throw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Choice {
    Rock,
    Paper,
    Scissors,
}

impl Choice {
    /// All three throws, in a fixed order.
    pub const ALL: [Choice; 3] = [Choice::Rock, Choice::Paper, Choice::Scissors];
}

/// A validated move shape.
///
/// On the wire a `move` event carries either `choice` or `cellIndex`; the
/// gateway turns that pair of optional fields into one of these before the
/// core sees it. Whether the shape fits the session's variant, and whether
/// the index is on the board, is for the session to decide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    /// A rock-paper-scissors throw.
    Throw(Choice),
    /// A tic-tac-toe placement at a board index (0..=8, row-major).
    Place(usize),
}

impl Move {
    /// Builds a move from the two optional wire fields.
    ///
    /// Returns `None` unless exactly one of them is present. A negative
    /// index saturates to `usize::MAX`, which no board has, so the session
    /// refuses it as out of range after its turn check.
    pub fn from_parts(choice: Option<Choice>, cell_index: Option<i64>) -> Option<Self> {
        match (choice, cell_index) {
            (Some(choice), None) => Some(Self::Throw(choice)),
            (None, Some(index)) => {
                Some(Self::Place(usize::try_from(index).unwrap_or(usize::MAX)))
            }
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// Number of cells on a tic-tac-toe board.
pub const BOARD_CELLS: usize = 9;

/// A 3×3 tic-tac-toe board stored row-major: index `row * 3 + col`.
///
/// Serialized as a 9-element array of `null | "cross" | "circle"`, the same
/// shape the browser client renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board([Option<Mark>; BOARD_CELLS]);

impl Board {
    /// An empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a board from raw cells.
    pub fn from_cells(cells: [Option<Mark>; BOARD_CELLS]) -> Self {
        Self(cells)
    }

    /// The mark at `index`, or `None` if the cell is empty or off the board.
    pub fn get(&self, index: usize) -> Option<Mark> {
        self.0.get(index).copied().flatten()
    }

    /// Places `mark` at `index` if that cell is free.
    ///
    /// Returns `false` and leaves the board untouched otherwise.
    pub fn place(&mut self, index: usize, mark: Mark) -> bool {
        match self.0.get_mut(index) {
            Some(cell) if cell.is_none() => {
                *cell = Some(mark);
                true
            }
            _ => false,
        }
    }

    /// `true` when no cell is empty.
    pub fn is_full(&self) -> bool {
        self.0.iter().all(Option::is_some)
    }

    /// Number of occupied cells.
    pub fn filled(&self) -> usize {
        self.0.iter().filter(|cell| cell.is_some()).count()
    }
}

// ---------------------------------------------------------------------------
// Outcome and score
// ---------------------------------------------------------------------------

/// The resolved result of one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    WinA,
    WinB,
    Draw,
}

impl Outcome {
    /// A win for `seat`.
    pub fn win_for(seat: Seat) -> Self {
        match seat {
            Seat::A => Self::WinA,
            Seat::B => Self::WinB,
        }
    }

    /// The winning seat, or `None` for a draw.
    pub fn winner(self) -> Option<Seat> {
        match self {
            Self::WinA => Some(Seat::A),
            Self::WinB => Some(Seat::B),
            Self::Draw => None,
        }
    }

    /// The same result seen with the seats swapped.
    pub fn flipped(self) -> Self {
        match self {
            Self::WinA => Self::WinB,
            Self::WinB => Self::WinA,
            Self::Draw => Self::Draw,
        }
    }
}

/// Running tally for one session. Lives and dies with the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    pub wins_a: u32,
    pub wins_b: u32,
    pub draws: u32,
}

impl Score {
    /// Counts one resolved round.
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::WinA => self.wins_a += 1,
            Outcome::WinB => self.wins_b += 1,
            Outcome::Draw => self.draws += 1,
        }
    }

    /// Total rounds counted.
    pub fn rounds(&self) -> u32 {
        self.wins_a + self.wins_b + self.draws
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_display_and_json() {
        assert_eq!(SessionId(4).to_string(), "S-4");
        assert_eq!(serde_json::to_string(&SessionId(4)).unwrap(), "4");
    }

    #[test]
    fn test_variant_json_names() {
        assert_eq!(
            serde_json::to_string(&Variant::RockPaperScissors).unwrap(),
            r#""rockPaperScissors""#
        );
        assert_eq!(
            serde_json::to_string(&Variant::TicTacToe).unwrap(),
            r#""ticTacToe""#
        );
        assert_eq!(Variant::default(), Variant::RockPaperScissors);
    }

    #[test]
    fn test_seat_marks_pair_up() {
        assert_eq!(Seat::A.mark(), Mark::Cross);
        assert_eq!(Seat::B.mark(), Mark::Circle);
        assert_eq!(Mark::Cross.seat(), Seat::A);
        assert_eq!(Seat::A.other(), Seat::B);
        assert_eq!(serde_json::to_string(&Mark::Circle).unwrap(), r#""circle""#);
    }

    #[test]
    fn test_move_from_parts_requires_exactly_one_field() {
        assert_eq!(
            Move::from_parts(Some(Choice::Rock), None),
            Some(Move::Throw(Choice::Rock))
        );
        assert_eq!(Move::from_parts(None, Some(4)), Some(Move::Place(4)));
        assert_eq!(Move::from_parts(None, None), None);
        assert_eq!(Move::from_parts(Some(Choice::Paper), Some(1)), None);
    }

    #[test]
    fn test_move_from_parts_negative_index_is_off_the_board() {
        let Some(Move::Place(index)) = Move::from_parts(None, Some(-1)) else {
            panic!("expected a placement");
        };
        assert!(index >= BOARD_CELLS);
    }

    #[test]
    fn test_board_place_refuses_occupied_and_out_of_range() {
        let mut board = Board::new();
        assert!(board.place(0, Mark::Cross));
        assert!(!board.place(0, Mark::Circle));
        assert_eq!(board.get(0), Some(Mark::Cross));
        assert!(!board.place(9, Mark::Circle));
        assert_eq!(board.filled(), 1);
    }

    #[test]
    fn test_board_serializes_as_nine_cells() {
        let mut board = Board::new();
        board.place(4, Mark::Circle);
        let json: serde_json::Value = serde_json::to_value(board).unwrap();
        let cells = json.as_array().expect("array");
        assert_eq!(cells.len(), 9);
        assert!(cells[0].is_null());
        assert_eq!(cells[4], "circle");
    }

    #[test]
    fn test_outcome_flip_and_winner() {
        assert_eq!(Outcome::WinA.flipped(), Outcome::WinB);
        assert_eq!(Outcome::Draw.flipped(), Outcome::Draw);
        assert_eq!(Outcome::win_for(Seat::B), Outcome::WinB);
        assert_eq!(Outcome::WinB.winner(), Some(Seat::B));
        assert_eq!(
            serde_json::to_string(&Outcome::WinA).unwrap(),
            r#""winA""#
        );
    }

    #[test]
    fn test_score_records_each_outcome() {
        let mut score = Score::default();
        score.record(Outcome::WinA);
        score.record(Outcome::Draw);
        score.record(Outcome::WinA);
        assert_eq!(
            score,
            Score {
                wins_a: 2,
                wins_b: 0,
                draws: 1
            }
        );
        assert_eq!(score.rounds(), 3);
    }
}
