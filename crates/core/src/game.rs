use crate::Outcome;
use std::fmt::Debug;
use std::hash::Hash;

/// A game abstraction for tree search.
///
/// This trait defines the interface that any game must implement to be
/// searched. It covers deterministic, perfect-information, turn-based games
/// (tic-tac-toe, connect four, chess, ...). The search engine never looks
/// inside the associated types; it only calls the methods below.
pub trait Game: Clone + Send + Sync {
    /// The game state (e.g., a board plus the side to move)
    type State: Clone + Send + Debug;

    /// A game action (e.g., the cell to mark)
    type Action: Clone + Copy + Send + Eq + Hash + Debug;

    /// A participant in the game, compared only for equality
    type Party: Clone + Copy + Send + Eq + Debug;

    /// Returns the initial game state
    fn initial_state(&self) -> Self::State;

    /// Returns all legal actions from the given state.
    ///
    /// Must be non-empty unless the state is terminal.
    fn legal_actions(&self, state: &Self::State) -> Vec<Self::Action>;

    /// Applies an action, returning a new state (immutable operation)
    fn apply(&self, state: &Self::State, action: Self::Action) -> Self::State;

    /// Returns true if the game has ended, judged from `party`'s point of view.
    ///
    /// Every sequence of legal moves must reach a state where this is true
    /// after finitely many steps; rollouts rely on it to terminate.
    fn is_game_over(&self, state: &Self::State, party: Self::Party) -> bool;

    /// Returns the result of a finished game for `party`.
    ///
    /// Only meaningful when [`Game::is_game_over`] is true for `party`.
    fn game_result(&self, state: &Self::State, party: Self::Party) -> Outcome;

    /// Returns the party whose turn it is
    fn next_to_move(&self, state: &Self::State) -> Self::Party;
}
