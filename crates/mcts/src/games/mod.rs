//! Game implementations bundled with the search engine.
//!
//! These games are used to validate the search and by the arena binary.

pub mod tictactoe;

pub use tictactoe::{Player, TicTacToe, TicTacToeAction, TicTacToeState};
