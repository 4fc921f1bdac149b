//! UCT Core - Game abstractions and common types
//!
//! This crate provides the [`Game`] trait that a turn-based, perfect-information
//! game implements to be searched by `uct-mcts`, plus the small typed values
//! the search engine passes around.
//!
//! # Types
//!
//! - [`Game`] - Trait for game implementations
//! - [`Outcome`] - Result of a finished game for one party (win, draw or loss)
//! - [`OutcomeTally`] - Per-outcome simulation counters

mod error;
mod game;
mod types;

pub use error::{Result, UctError};
pub use game::Game;
pub use types::{Outcome, OutcomeTally};
