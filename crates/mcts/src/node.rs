//! Search node types for tree storage.
//!
//! Uses arena allocation with indices: children are owned through the arena
//! and the parent link is a plain index, so there is no ownership cycle.

use uct_core::{Game, Outcome, OutcomeTally};

/// Index into the node arena.
///
/// This is a lightweight handle that references a node in the tree.
/// Using indices instead of pointers avoids Rc/RefCell overhead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The root node is always at index 0.
    pub const ROOT: NodeId = NodeId(0);

    /// Position of the node in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Statistics for a single search node.
#[derive(Clone, Copy, Debug, Default)]
pub struct NodeStats {
    /// Number of simulations that passed through this node.
    pub visit_count: u32,

    /// Simulation results, seen by the searching party.
    pub tally: OutcomeTally,
}

impl NodeStats {
    /// Record one simulation result.
    pub fn record(&mut self, outcome: Outcome) {
        self.visit_count += 1;
        self.tally.record(outcome);
    }

    /// Mean win/loss differential in [-1, 1].
    ///
    /// Returns 0.0 if the node has never been visited.
    pub fn mean_value(&self) -> f64 {
        if self.visit_count == 0 {
            0.0
        } else {
            self.tally.win_loss_difference() as f64 / f64::from(self.visit_count)
        }
    }
}

/// A node in the search tree.
///
/// Each node holds the game state it represents; the tree's searching
/// party and budget are shared by all nodes and live on [`crate::tree::Tree`].
#[derive(Clone, Debug)]
pub struct Node<G: Game> {
    /// Game state at this node.
    pub state: G::State,

    /// Node this one was expanded from (None for root).
    pub parent: Option<NodeId>,

    /// Action that led to this node (None for root).
    pub parent_action: Option<G::Action>,

    /// Children in expansion order.
    pub children: Vec<NodeId>,

    /// Legal actions not yet expanded into a child.
    pub untried_actions: Vec<G::Action>,

    /// Node statistics (visits and outcome tally).
    pub stats: NodeStats,
}

impl<G: Game> Node<G> {
    /// Create a node for `state`, listing its legal actions once.
    pub fn new(
        game: &G,
        state: G::State,
        parent: Option<NodeId>,
        parent_action: Option<G::Action>,
    ) -> Self {
        let untried_actions = game.legal_actions(&state);
        Self {
            state,
            parent,
            parent_action,
            children: Vec::new(),
            untried_actions,
            stats: NodeStats::default(),
        }
    }

    /// Create the root node.
    pub fn root(game: &G, state: G::State) -> Self {
        Self::new(game, state, None, None)
    }

    /// True once every legal action has a child.
    pub fn is_fully_expanded(&self) -> bool {
        self.untried_actions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::{TicTacToe, TicTacToeAction};

    #[test]
    fn test_node_stats_mean_value() {
        let mut stats = NodeStats::default();

        // Unvisited node has Q = 0
        assert_eq!(stats.mean_value(), 0.0);

        // Two wins, one draw, one loss: (2 - 1) / 4
        stats.record(Outcome::Win);
        stats.record(Outcome::Win);
        stats.record(Outcome::Draw);
        stats.record(Outcome::Loss);
        assert_eq!(stats.visit_count, 4);
        assert_eq!(stats.tally.total(), stats.visit_count);
        assert!((stats.mean_value() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_root_node() {
        let game = TicTacToe;
        let root: Node<TicTacToe> = Node::root(&game, TicTacToe.initial_state());

        assert_eq!(root.parent, None);
        assert_eq!(root.parent_action, None);
        assert!(root.children.is_empty());
        assert_eq!(root.untried_actions.len(), 9);
        assert!(!root.is_fully_expanded());
        assert_eq!(root.stats.visit_count, 0);
    }

    #[test]
    fn test_child_node() {
        let game = TicTacToe;
        let state = game.apply(&game.initial_state(), TicTacToeAction(4));
        let child: Node<TicTacToe> =
            Node::new(&game, state, Some(NodeId::ROOT), Some(TicTacToeAction(4)));

        assert_eq!(child.parent, Some(NodeId::ROOT));
        assert_eq!(child.parent_action, Some(TicTacToeAction(4)));
        assert_eq!(child.untried_actions.len(), 8);
        assert!(!child.untried_actions.contains(&TicTacToeAction(4)));
    }
}
