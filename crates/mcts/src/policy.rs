//! Rollout policies for the simulation phase.
//!
//! The `RolloutPolicy` trait lets a search swap how simulated moves are picked:
//! - `UniformPolicy` draws uniformly from the legal actions
//! - `OpponentModelPolicy` answers for the opponent with a nested search

use crate::node::NodeId;
use crate::search::simulate;
use crate::tree::Tree;
use rand::Rng;
use tracing::trace;
use uct_core::Game;

/// Strategy for choosing a move during a rollout.
pub trait RolloutPolicy<G: Game> {
    /// Pick one of `actions`, the non-empty legal actions of `state`.
    fn choose_action<R: Rng>(
        &self,
        game: &G,
        state: &G::State,
        actions: &[G::Action],
        rng: &mut R,
    ) -> G::Action;
}

/// Play from `state` until the game is over for `entity`.
///
/// Returns the final state. The tree is never touched: this is a disposable
/// walk. If a non-terminal state lists no actions the walk stops there.
pub fn rollout<G, P, R>(
    game: &G,
    state: &G::State,
    entity: G::Party,
    policy: &P,
    rng: &mut R,
) -> G::State
where
    G: Game,
    P: RolloutPolicy<G>,
    R: Rng,
{
    let mut state = state.clone();

    while !game.is_game_over(&state, entity) {
        let legal_actions = game.legal_actions(&state);
        if legal_actions.is_empty() {
            break;
        }

        let action = policy.choose_action(game, &state, &legal_actions, rng);
        state = game.apply(&state, action);
    }

    state
}

/// Uniformly random move choice.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformPolicy;

impl<G: Game> RolloutPolicy<G> for UniformPolicy {
    fn choose_action<R: Rng>(
        &self,
        _game: &G,
        _state: &G::State,
        actions: &[G::Action],
        rng: &mut R,
    ) -> G::Action {
        actions[rng.gen_range(0..actions.len())]
    }
}

/// Heavy playout: models the opponent as a player who searches too.
///
/// On the opponent's turn it first takes any move that ends the game. If
/// there is none it runs a fresh search from the opponent's side with
/// `nested_simulations` uniform rollouts and plays that search's choice.
/// On the entity's own turn it plays uniformly at random.
///
/// The nested search always uses [`UniformPolicy`], so opponent modelling
/// never nests more than one level deep.
#[derive(Clone, Debug)]
pub struct OpponentModelPolicy<G: Game> {
    entity: G::Party,
    opponent: G::Party,
    nested_simulations: usize,
    exploration: f64,
}

impl<G: Game> OpponentModelPolicy<G> {
    /// Create a policy for `entity` playing against `opponent`.
    ///
    /// `nested_simulations` is clamped to at least one.
    pub fn new(
        entity: G::Party,
        opponent: G::Party,
        nested_simulations: usize,
        exploration: f64,
    ) -> Self {
        Self {
            entity,
            opponent,
            nested_simulations: nested_simulations.max(1),
            exploration,
        }
    }

    /// Budget of each nested opponent search.
    pub fn nested_simulations(&self) -> usize {
        self.nested_simulations
    }

    fn opponent_reply<R: Rng>(
        &self,
        game: &G,
        state: &G::State,
        actions: &[G::Action],
        rng: &mut R,
    ) -> G::Action {
        // A move that ends the game is assumed to be the one a competent opponent takes
        if let Some(&finishing) = actions
            .iter()
            .find(|&&action| game.is_game_over(&game.apply(state, action), self.entity))
        {
            return finishing;
        }

        let mut tree = Tree::new(
            game,
            state.clone(),
            self.opponent,
            self.entity,
            self.nested_simulations,
        );
        for _ in 0..self.nested_simulations {
            simulate(game, &mut tree, &UniformPolicy, self.exploration, rng);
        }

        if tree.children(NodeId::ROOT).is_empty() {
            // Only reachable when the game disagrees with itself about whose
            // game is over; fall back to a random reply.
            return UniformPolicy.choose_action(game, state, actions, rng);
        }

        let best = tree.best_child(NodeId::ROOT, 0.0);
        let reply = tree
            .get(best)
            .parent_action
            .expect("BUG: non-root node without parent action");

        trace!(
            simulations = self.nested_simulations,
            nodes = tree.len(),
            ?reply,
            "nested opponent search"
        );

        reply
    }
}

impl<G: Game> RolloutPolicy<G> for OpponentModelPolicy<G> {
    fn choose_action<R: Rng>(
        &self,
        game: &G,
        state: &G::State,
        actions: &[G::Action],
        rng: &mut R,
    ) -> G::Action {
        if game.next_to_move(state) == self.opponent {
            self.opponent_reply(game, state, actions, rng)
        } else {
            UniformPolicy.choose_action(game, state, actions, rng)
        }
    }
}
