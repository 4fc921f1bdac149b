//! Tic-tac-toe implementation for search validation.
//!
//! Tic-tac-toe is small enough that search results can be checked by hand:
//! - a one-move win must always be found
//! - openings should favor the center and corners
//! - a full board is a draw for both sides

use std::fmt;
use uct_core::{Game, Outcome};

/// Tic-tac-toe player.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Player {
    X,
    O,
}

impl Player {
    /// Get the opposing player.
    pub fn opposite(self) -> Self {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }

    /// Mark this player leaves on the board.
    pub fn symbol(self) -> char {
        match self {
            Player::X => 'X',
            Player::O => 'O',
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Tic-tac-toe board state.
#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub struct TicTacToeState {
    /// Board: 9 cells, indexed 0-8 (row-major).
    /// ```text
    /// 0 | 1 | 2
    /// ---------
    /// 3 | 4 | 5
    /// ---------
    /// 6 | 7 | 8
    /// ```
    board: [Option<Player>; 9],

    /// Current player to move.
    current: Player,

    /// Cached winner (if any).
    winner: Option<Player>,
}

impl TicTacToeState {
    /// Create a new empty board with X to move.
    pub fn new() -> Self {
        Self {
            board: [None; 9],
            current: Player::X,
            winner: None,
        }
    }

    /// Get the current player to move.
    pub fn current_player(&self) -> Player {
        self.current
    }

    /// Get the winner, if any.
    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    /// Build a position from 9 row-major cells: `X`, `O`, or `.`/space for empty.
    ///
    /// The side to move is X when both sides have the same number of marks,
    /// O when X has one more. Returns None for malformed input or impossible
    /// mark counts.
    pub fn from_cells(cells: &str) -> Option<Self> {
        let mut board = [None; 9];
        let mut count = 0;

        for (i, c) in cells.chars().enumerate() {
            if i >= 9 {
                return None;
            }
            board[i] = match c {
                'X' | 'x' => Some(Player::X),
                'O' | 'o' => Some(Player::O),
                '.' | ' ' | '-' => None,
                _ => return None,
            };
            count += 1;
        }
        if count != 9 {
            return None;
        }

        let xs = board.iter().filter(|&&c| c == Some(Player::X)).count();
        let os = board.iter().filter(|&&c| c == Some(Player::O)).count();
        let current = match xs.checked_sub(os) {
            Some(0) => Player::X,
            Some(1) => Player::O,
            _ => return None,
        };

        let mut state = Self {
            board,
            current,
            winner: None,
        };
        state.winner = state.check_winner();
        Some(state)
    }

    /// Get the piece at a cell, if any.
    pub fn get(&self, cell: usize) -> Option<Player> {
        self.board.get(cell).copied().flatten()
    }

    /// True if `cell` is on the board and empty.
    pub fn is_valid_move(&self, cell: usize) -> bool {
        cell < 9 && self.board[cell].is_none()
    }

    /// Number of marks on the board.
    pub fn move_count(&self) -> usize {
        self.board.iter().filter(|c| c.is_some()).count()
    }

    /// Owner of a completed row, column or diagonal, if any.
    fn check_winner(&self) -> Option<Player> {
        // Three cells starting at `start`, `step` apart
        let line = |start: usize, step: usize| -> Option<Player> {
            let owner = self.board[start]?;
            (self.board[start + step] == Some(owner) && self.board[start + 2 * step] == Some(owner))
                .then_some(owner)
        };

        (0..3)
            .find_map(|row| line(row * 3, 1))
            .or_else(|| (0..3).find_map(|col| line(col, 3)))
            .or_else(|| line(0, 4))
            .or_else(|| line(2, 2))
    }

    /// Check if the board is full (draw if no winner).
    fn is_full(&self) -> bool {
        self.board.iter().all(|c| c.is_some())
    }
}

impl Default for TicTacToeState {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders the board as a boxed grid, one row per line, indented by four
/// spaces:
/// ```text
///     ----------
///     |X |  |  |
///     ----------
///     |  |O |  |
///     ----------
///     |  |  |  |
///     ----------
/// ```
impl fmt::Display for TicTacToeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(3 * 3 + 1);

        for row in self.board.chunks(3) {
            writeln!(f, "    {}", rule)?;
            write!(f, "    |")?;
            for cell in row {
                write!(f, "{} |", cell.map_or(' ', Player::symbol))?;
            }
            writeln!(f)?;
        }
        writeln!(f, "    {}", rule)
    }
}

/// Tic-tac-toe action (cell index 0-8).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TicTacToeAction(pub u8);

impl TicTacToeAction {
    /// Action for a 0-based row and column, if both are on the board.
    pub fn from_row_col(row: u8, col: u8) -> Option<Self> {
        if row < 3 && col < 3 {
            Some(Self(row * 3 + col))
        } else {
            None
        }
    }

    /// Get the row (0-2).
    pub fn row(self) -> u8 {
        self.0 / 3
    }

    /// Get the column (0-2).
    pub fn col(self) -> u8 {
        self.0 % 3
    }
}

impl fmt::Display for TicTacToeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row(), self.col())
    }
}

/// Tic-tac-toe game implementation.
#[derive(Clone, Debug)]
pub struct TicTacToe;

impl Game for TicTacToe {
    type State = TicTacToeState;
    type Action = TicTacToeAction;
    type Party = Player;

    fn initial_state(&self) -> Self::State {
        TicTacToeState::new()
    }

    fn legal_actions(&self, state: &Self::State) -> Vec<Self::Action> {
        state
            .board
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_none())
            .map(|(i, _)| TicTacToeAction(i as u8))
            .collect()
    }

    fn apply(&self, state: &Self::State, action: Self::Action) -> Self::State {
        let mut new_state = state.clone();
        new_state.board[action.0 as usize] = Some(state.current);
        new_state.current = state.current.opposite();
        new_state.winner = new_state.check_winner();
        new_state
    }

    fn is_game_over(&self, state: &Self::State, _party: Self::Party) -> bool {
        state.winner.is_some() || state.is_full()
    }

    fn game_result(&self, state: &Self::State, party: Self::Party) -> Outcome {
        match state.winner {
            Some(winner) if winner == party => Outcome::Win,
            Some(_) => Outcome::Loss,
            None => Outcome::Draw,
        }
    }

    fn next_to_move(&self, state: &Self::State) -> Self::Party {
        state.current
    }
}
