//! Monte Carlo Tree Search with UCT selection.
//!
//! This crate provides a generic MCTS implementation that can be used with
//! any game implementing the `uct_core::Game` trait.
//!
//! # Features
//!
//! - **Generic**: Works with any `Game` implementation
//! - **UCT Selection**: Win/loss differential plus a `sqrt(2 ln N / n)` exploration term
//! - **Arena Tree**: Nodes live in one vector per search, parents are indices
//! - **Rollout Policies**: Uniform random playouts, or heavy playouts that model
//!   the opponent with a nested search
//! - **Seedable**: The random generator is injected, so searches are reproducible
//!
//! # Example
//!
//! ```
//! use uct_mcts::{Mcts, MctsConfig, games::{Player, TicTacToe}};
//! use uct_core::Game;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let game = TicTacToe;
//! let state = game.initial_state();
//!
//! let config = MctsConfig::with_simulations(200);
//! let mut mcts = Mcts::new(config, ChaCha8Rng::seed_from_u64(42));
//!
//! let result = mcts.search(&game, &state, Player::X, Player::O).unwrap();
//! println!("Best action: {}", result.best_action);
//! println!("Value: {}", result.value);
//! assert_eq!(result.root_visits, 200);
//! ```

pub mod config;
pub mod games;
pub mod node;
pub mod policy;
pub mod search;
pub mod tree;

pub use config::{MctsConfig, Playout};
pub use node::{Node, NodeId, NodeStats};
pub use policy::{rollout, OpponentModelPolicy, RolloutPolicy, UniformPolicy};
pub use search::{run, ChildStats, Mcts, SearchResult};
pub use tree::Tree;
