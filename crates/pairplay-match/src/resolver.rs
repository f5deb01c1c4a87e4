//! Outcome resolution.
//!
//! Pure functions of the moves or the board. The server computes every
//! result with these and broadcasts its own value; clients never decide.

use pairplay_protocol::{Board, Choice, Outcome};

/// The eight three-in-a-row lines of a row-major 3×3 board.
pub const WINNING_LINES: [[usize; 3]; 8] = [
    // Rows
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    // Columns
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    // Diagonals
    [0, 4, 8],
    [2, 4, 6],
];

/// Where a tic-tac-toe board stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardStatus {
    /// No line is complete and at least one cell is free.
    InProgress,
    /// The game is over with this outcome.
    Finished(Outcome),
}

impl BoardStatus {
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Finished(_))
    }
}

/// Resolves one rock-paper-scissors round, `a` being seat A's throw.
///
/// Rock beats scissors, scissors beats paper, paper beats rock.
pub fn resolve_rps(a: Choice, b: Choice) -> Outcome {
    use Choice::{Paper, Rock, Scissors};

    match (a, b) {
        (Rock, Rock) => Outcome::Draw,
        (Rock, Paper) => Outcome::WinB,
        (Rock, Scissors) => Outcome::WinA,
        (Paper, Rock) => Outcome::WinA,
        (Paper, Paper) => Outcome::Draw,
        (Paper, Scissors) => Outcome::WinB,
        (Scissors, Rock) => Outcome::WinB,
        (Scissors, Paper) => Outcome::WinA,
        (Scissors, Scissors) => Outcome::Draw,
    }
}

/// Checks a board for a completed line, then for a full board.
///
/// A win on the last free cell is a win, not a draw.
pub fn resolve_board(board: &Board) -> BoardStatus {
    for [a, b, c] in WINNING_LINES {
        if let Some(mark) = board.get(a) {
            if board.get(b) == Some(mark) && board.get(c) == Some(mark) {
                return BoardStatus::Finished(Outcome::win_for(mark.seat()));
            }
        }
    }

    if board.is_full() {
        BoardStatus::Finished(Outcome::Draw)
    } else {
        BoardStatus::InProgress
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairplay_protocol::Mark;

    fn board(cells: &str) -> Board {
        // 'X' cross, 'O' circle, anything else empty.
        let mut out = [None; 9];
        for (i, c) in cells.chars().enumerate() {
            out[i] = match c {
                'X' => Some(Mark::Cross),
                'O' => Some(Mark::Circle),
                _ => None,
            };
        }
        Board::from_cells(out)
    }

    #[test]
    fn test_resolve_rps_covers_all_nine_pairs() {
        use Choice::{Paper, Rock, Scissors};
        let expected = [
            (Rock, Rock, Outcome::Draw),
            (Rock, Paper, Outcome::WinB),
            (Rock, Scissors, Outcome::WinA),
            (Paper, Rock, Outcome::WinA),
            (Paper, Paper, Outcome::Draw),
            (Paper, Scissors, Outcome::WinB),
            (Scissors, Rock, Outcome::WinB),
            (Scissors, Paper, Outcome::WinA),
            (Scissors, Scissors, Outcome::Draw),
        ];
        for (a, b, outcome) in expected {
            assert_eq!(resolve_rps(a, b), outcome, "{a:?} vs {b:?}");
        }
    }

    #[test]
    fn test_resolve_rps_swapping_seats_flips_outcome() {
        for a in Choice::ALL {
            for b in Choice::ALL {
                assert_eq!(resolve_rps(b, a), resolve_rps(a, b).flipped());
            }
        }
    }

    #[test]
    fn test_resolve_board_empty_is_in_progress() {
        assert_eq!(resolve_board(&Board::new()), BoardStatus::InProgress);
    }

    #[test]
    fn test_resolve_board_every_line_wins() {
        for line in WINNING_LINES {
            let mut cells = [None; 9];
            for i in line {
                cells[i] = Some(Mark::Circle);
            }
            assert_eq!(
                resolve_board(&Board::from_cells(cells)),
                BoardStatus::Finished(Outcome::WinB),
                "line {line:?}"
            );
        }
    }

    #[test]
    fn test_resolve_board_full_without_line_is_draw() {
        assert_eq!(
            resolve_board(&board("XOXXOOOXX")),
            BoardStatus::Finished(Outcome::Draw)
        );
    }

    #[test]
    fn test_resolve_board_win_on_last_cell_is_win() {
        // Cross completes the left column with the ninth mark.
        assert_eq!(
            resolve_board(&board("XOXXOOXXO")),
            BoardStatus::Finished(Outcome::WinA)
        );
    }

    #[test]
    fn test_resolve_board_partial_without_line_is_in_progress() {
        let status = resolve_board(&board("XO..X...O"));
        assert_eq!(status, BoardStatus::InProgress);
        assert!(!status.is_finished());
    }
}
