//! Monte Carlo Tree Search driver.
//!
//! Runs a fixed number of simulations, each one:
//! 1. Selection/expansion: walk down with UCT, expand one untried action
//! 2. Simulation: roll out to a terminal state with the configured policy
//! 3. Backpropagation: record the searching party's result up to the root
//!
//! The final move is the root child with the best win/loss differential
//! (UCT with exploration 0).

use crate::{
    config::{MctsConfig, Playout},
    node::NodeId,
    policy::{rollout, OpponentModelPolicy, RolloutPolicy, UniformPolicy},
    tree::Tree,
};
use rand::Rng;
use std::marker::PhantomData;
use tracing::{debug, warn};
use uct_core::{Game, Result, UctError};

/// Statistics of one root child after a search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChildStats<A> {
    /// Action leading to the child.
    pub action: A,

    /// Simulations through the child.
    pub visits: u32,

    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
}

/// Result of a search.
#[derive(Clone, Debug)]
pub struct SearchResult<G: Game> {
    /// Chosen action (root child with the best win/loss differential).
    pub best_action: G::Action,

    /// State reached by playing `best_action`.
    pub next_state: G::State,

    /// Total simulations recorded at the root.
    pub root_visits: u32,

    /// Per-child statistics, in expansion order.
    pub children: Vec<ChildStats<G::Action>>,

    /// Mean win/loss differential of the chosen child, in [-1, 1].
    pub value: f64,
}

/// Run one simulation on `tree` and record its result.
pub(crate) fn simulate<G, P, R>(
    game: &G,
    tree: &mut Tree<G>,
    policy: &P,
    exploration: f64,
    rng: &mut R,
) where
    G: Game,
    P: RolloutPolicy<G>,
    R: Rng,
{
    let node_id = tree.select_and_expand(game, NodeId::ROOT, exploration);
    let terminal = rollout(game, &tree.get(node_id).state, tree.entity(), policy, rng);
    let outcome = game.game_result(&terminal, tree.entity());
    tree.backpropagate(node_id, outcome);
}

/// Monte Carlo Tree Search with UCT selection.
///
/// Generic over:
/// - `G`: The game being played
/// - `R`: The random number generator
pub struct Mcts<G: Game, R: Rng> {
    config: MctsConfig,
    rng: R,
    _game: PhantomData<G>,
}

impl<G, R> Mcts<G, R>
where
    G: Game,
    R: Rng,
{
    /// Create a new search instance.
    pub fn new(config: MctsConfig, rng: R) -> Self {
        Self {
            config,
            rng,
            _game: PhantomData,
        }
    }

    /// The configuration this instance searches with.
    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    /// Build a tree from `state` by running the configured number of simulations.
    ///
    /// # Errors
    /// - `UctError::InvalidBudget` / `UctError::InvalidExploration` for a bad config
    /// - `UctError::TerminalRoot` if `state` is already game over for `entity`
    /// - `UctError::NoLegalActions` if `state` is live but offers no move
    pub fn grow(
        &mut self,
        game: &G,
        state: &G::State,
        entity: G::Party,
        opponent: G::Party,
    ) -> Result<Tree<G>> {
        self.config.validate()?;

        if game.is_game_over(state, entity) {
            warn!(?entity, "rejecting search from a terminal state");
            return Err(UctError::TerminalRoot);
        }

        let mut tree = Tree::new(
            game,
            state.clone(),
            entity,
            opponent,
            self.config.num_simulations,
        );

        if tree.root().untried_actions.is_empty() {
            warn!(?entity, "rejecting search from a state without legal actions");
            return Err(UctError::NoLegalActions);
        }

        match self.config.playout {
            Playout::Uniform => self.run_simulations(game, &mut tree, &UniformPolicy),
            Playout::Heavy => {
                let policy = OpponentModelPolicy::new(
                    entity,
                    opponent,
                    self.config.nested_simulations(),
                    self.config.exploration,
                );
                self.run_simulations(game, &mut tree, &policy);
            }
        }

        Ok(tree)
    }

    /// Run the search from `state` and pick a move for `entity`.
    ///
    /// # Errors
    /// Same as [`Mcts::grow`].
    pub fn search(
        &mut self,
        game: &G,
        state: &G::State,
        entity: G::Party,
        opponent: G::Party,
    ) -> Result<SearchResult<G>> {
        let tree = self.grow(game, state, entity, opponent)?;
        let result = extract_result(&tree);

        debug!(
            simulations = self.config.num_simulations,
            playout = ?self.config.playout,
            nodes = tree.len(),
            root_visits = result.root_visits,
            best_action = ?result.best_action,
            value = result.value,
            "search finished"
        );

        Ok(result)
    }

    fn run_simulations<P: RolloutPolicy<G>>(&mut self, game: &G, tree: &mut Tree<G>, policy: &P) {
        for _ in 0..self.config.num_simulations {
            simulate(game, tree, policy, self.config.exploration, &mut self.rng);
        }
    }
}

/// Read the decision and root statistics off a grown tree.
fn extract_result<G: Game>(tree: &Tree<G>) -> SearchResult<G> {
    // INVARIANT: a grown tree ran at least one simulation from a live root,
    // so the root has at least one visited child
    let best = tree.best_child(NodeId::ROOT, 0.0);
    let best_node = tree.get(best);

    let children = tree
        .children(NodeId::ROOT)
        .iter()
        .map(|&id| {
            let node = tree.get(id);
            ChildStats {
                action: node
                    .parent_action
                    .expect("BUG: root child without parent action"),
                visits: node.stats.visit_count,
                wins: node.stats.tally.wins(),
                draws: node.stats.tally.draws(),
                losses: node.stats.tally.losses(),
            }
        })
        .collect();

    SearchResult {
        best_action: best_node
            .parent_action
            .expect("BUG: root child without parent action"),
        next_state: best_node.state.clone(),
        root_visits: tree.root().stats.visit_count,
        children,
        value: best_node.stats.mean_value(),
    }
}

/// Pick a move for `entity` with a one-off search.
///
/// Convenience wrapper over [`Mcts::search`] for callers that do not keep a
/// search instance around.
///
/// # Errors
/// Same as [`Mcts::grow`].
pub fn run<G, R>(
    game: &G,
    state: &G::State,
    entity: G::Party,
    opponent: G::Party,
    simulation_budget: usize,
    use_heavy_policy: bool,
    rng: &mut R,
) -> Result<SearchResult<G>>
where
    G: Game,
    R: Rng,
{
    let config = if use_heavy_policy {
        MctsConfig::heavy(simulation_budget)
    } else {
        MctsConfig::with_simulations(simulation_budget)
    };

    Mcts::new(config, rng).search(game, state, entity, opponent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use uct_core::Outcome;

    // Simple test game: race to 5
    // Players take turns adding 1 or 2. First to reach exactly 5 wins.
    // First player can always win with optimal play.
    #[derive(Clone, Debug)]
    struct RaceToFive;

    #[derive(Clone, PartialEq, Eq, Debug)]
    struct RaceState {
        count: u8,
        current_player: u8,
    }

    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
    struct RaceAction(u8); // 1 or 2

    impl Game for RaceToFive {
        type State = RaceState;
        type Action = RaceAction;
        type Party = u8;

        fn initial_state(&self) -> Self::State {
            RaceState {
                count: 0,
                current_player: 0,
            }
        }

        fn legal_actions(&self, state: &Self::State) -> Vec<Self::Action> {
            if state.count >= 5 {
                Vec::new()
            } else {
                let mut actions = vec![RaceAction(1)];
                if state.count + 2 <= 5 {
                    actions.push(RaceAction(2));
                }
                actions
            }
        }

        fn apply(&self, state: &Self::State, action: Self::Action) -> Self::State {
            RaceState {
                count: state.count + action.0,
                current_player: 1 - state.current_player,
            }
        }

        fn is_game_over(&self, state: &Self::State, _party: Self::Party) -> bool {
            state.count >= 5
        }

        fn game_result(&self, state: &Self::State, party: Self::Party) -> Outcome {
            // The player who just moved reached 5 and wins
            if 1 - state.current_player == party {
                Outcome::Win
            } else {
                Outcome::Loss
            }
        }

        fn next_to_move(&self, state: &Self::State) -> Self::Party {
            state.current_player
        }
    }

    #[test]
    fn test_mcts_basic() {
        let config = MctsConfig::with_simulations(100);
        let mut mcts = Mcts::new(config, ChaCha8Rng::seed_from_u64(42));

        let game = RaceToFive;
        let state = game.initial_state();

        let result = mcts.search(&game, &state, 0, 1).unwrap();
        assert_eq!(mcts.config().num_simulations, 100);

        // Should return a valid action
        assert!(result.best_action == RaceAction(1) || result.best_action == RaceAction(2));

        // Every simulation passes through the root
        assert_eq!(result.root_visits, 100);
        let child_visits: u32 = result.children.iter().map(|c| c.visits).sum();
        assert_eq!(child_visits, 100);
        assert!(result.value >= -1.0 && result.value <= 1.0);
    }

    #[test]
    fn test_mcts_deterministic() {
        let config = MctsConfig::with_simulations(50);

        let run_search = |seed: u64| {
            let mut mcts = Mcts::new(config.clone(), ChaCha8Rng::seed_from_u64(seed));
            let game = RaceToFive;
            let state = game.initial_state();
            mcts.search(&game, &state, 0, 1).unwrap()
        };

        let result1 = run_search(12345);
        let result2 = run_search(12345);

        // Same seed should produce same results
        assert_eq!(result1.best_action, result2.best_action);
        assert_eq!(result1.children, result2.children);
    }

    #[test]
    fn test_mcts_takes_immediate_win() {
        // At 3, adding 2 reaches 5 and wins on the spot
        let game = RaceToFive;
        let state = RaceState {
            count: 3,
            current_player: 0,
        };

        for seed in 0..10 {
            let mut mcts = Mcts::new(
                MctsConfig::with_simulations(50),
                ChaCha8Rng::seed_from_u64(seed),
            );
            let result = mcts.search(&game, &state, 0, 1).unwrap();
            assert_eq!(result.best_action, RaceAction(2));
            assert_eq!(result.next_state.count, 5);
            assert!((result.value - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_heavy_search() {
        let game = RaceToFive;
        let state = game.initial_state();
        let mut mcts = Mcts::new(MctsConfig::heavy(60), ChaCha8Rng::seed_from_u64(5));

        let result = mcts.search(&game, &state, 0, 1).unwrap();
        assert_eq!(result.root_visits, 60);
        assert!(game.legal_actions(&state).contains(&result.best_action));
    }

    #[test]
    fn test_grow_respects_budget() {
        let game = RaceToFive;
        let mut mcts = Mcts::new(
            MctsConfig::with_simulations(37),
            ChaCha8Rng::seed_from_u64(9),
        );

        let tree = mcts.grow(&game, &game.initial_state(), 0, 1).unwrap();
        assert_eq!(tree.root().stats.visit_count, 37);
        assert_eq!(tree.simulation_budget(), 37);
        assert_eq!(tree.root().stats.tally.total(), 37);
    }

    #[test]
    fn test_rejects_zero_budget() {
        let game = RaceToFive;
        let mut mcts = Mcts::new(MctsConfig::with_simulations(0), ChaCha8Rng::seed_from_u64(1));

        let err = mcts.search(&game, &game.initial_state(), 0, 1).unwrap_err();
        assert_eq!(err, UctError::InvalidBudget(0));
    }

    #[test]
    fn test_rejects_terminal_root() {
        let game = RaceToFive;
        let state = RaceState {
            count: 5,
            current_player: 1,
        };
        let mut mcts = Mcts::new(MctsConfig::with_simulations(10), ChaCha8Rng::seed_from_u64(1));

        let err = mcts.search(&game, &state, 0, 1).unwrap_err();
        assert_eq!(err, UctError::TerminalRoot);
    }

    #[test]
    fn test_run_wrapper() {
        let game = RaceToFive;
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let uniform = run(&game, &game.initial_state(), 0, 1, 80, false, &mut rng).unwrap();
        assert_eq!(uniform.root_visits, 80);

        let heavy = run(&game, &game.initial_state(), 0, 1, 20, true, &mut rng).unwrap();
        assert_eq!(heavy.root_visits, 20);

        let err = run(&game, &game.initial_state(), 0, 1, 0, false, &mut rng).unwrap_err();
        assert_eq!(err, UctError::InvalidBudget(0));
    }
}
