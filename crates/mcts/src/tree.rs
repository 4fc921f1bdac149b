//! Arena-allocated search tree.
//!
//! Using a Vec<Node> with indices provides better cache locality
//! and simpler ownership compared to Rc<RefCell<Node>>. Parent links are
//! indices too, so dropping the tree releases every node at once.
//!
//! The tree implements three of the four MCTS phases: selection with
//! expansion, UCT child choice, and backpropagation. Simulation lives in
//! [`crate::policy`].

use crate::node::{Node, NodeId, NodeStats};
use uct_core::{Game, Outcome};

/// UCT score of a child seen from its parent.
///
/// `(wins - losses) / n_child + c * sqrt(2 * ln(n_parent / n_child))`
///
/// The child must have been visited at least once.
pub fn uct_score(parent_visits: u32, child: &NodeStats, exploration: f64) -> f64 {
    let child_visits = f64::from(child.visit_count);
    let exploitation = child.tally.win_loss_difference() as f64 / child_visits;
    let exploration_term =
        exploration * (2.0 * (f64::from(parent_visits) / child_visits).ln()).sqrt();
    exploitation + exploration_term
}

/// Arena-allocated search tree for one search.
///
/// Nodes are stored in a contiguous vector and referenced by index.
/// The searching party (`entity`), its `opponent` and the simulation budget
/// are fixed for the whole tree.
#[derive(Debug)]
pub struct Tree<G: Game> {
    nodes: Vec<Node<G>>,
    entity: G::Party,
    opponent: G::Party,
    simulation_budget: usize,
}

impl<G: Game> Tree<G> {
    /// Create a tree holding only a root for `state`.
    pub fn new(
        game: &G,
        state: G::State,
        entity: G::Party,
        opponent: G::Party,
        simulation_budget: usize,
    ) -> Self {
        Self {
            nodes: vec![Node::root(game, state)],
            entity,
            opponent,
            simulation_budget,
        }
    }

    /// Get a reference to a node by ID.
    ///
    /// # Panics
    /// Panics if the NodeId is invalid.
    pub fn get(&self, id: NodeId) -> &Node<G> {
        &self.nodes[id.0]
    }

    fn get_mut(&mut self, id: NodeId) -> &mut Node<G> {
        &mut self.nodes[id.0]
    }

    fn add(&mut self, node: Node<G>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Get the number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty (never true, the root always exists).
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get the root node.
    pub fn root(&self) -> &Node<G> {
        self.get(NodeId::ROOT)
    }

    /// Iterate over every node ID in creation order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Children of a node in expansion order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.get(id).children
    }

    /// Parent of a node (None for the root).
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).parent
    }

    /// The party this tree searches for.
    pub fn entity(&self) -> G::Party {
        self.entity
    }

    /// The party searched against.
    pub fn opponent(&self) -> G::Party {
        self.opponent
    }

    /// Planned number of simulations for this tree.
    pub fn simulation_budget(&self) -> usize {
        self.simulation_budget
    }

    /// True if the node's state is game over for the searching party.
    pub fn is_terminal(&self, game: &G, id: NodeId) -> bool {
        game.is_game_over(&self.get(id).state, self.entity)
    }

    /// True if every legal action of the node has been expanded.
    pub fn is_fully_expanded(&self, id: NodeId) -> bool {
        self.get(id).is_fully_expanded()
    }

    /// Pick the node the next simulation should run from.
    ///
    /// Walks down from `from`: stops at a terminal node, expands the first
    /// node that still has untried actions, and otherwise descends through
    /// [`Tree::best_child`] using `exploration`.
    pub fn select_and_expand(&mut self, game: &G, from: NodeId, exploration: f64) -> NodeId {
        let mut current = from;

        while !self.is_terminal(game, current) {
            if !self.is_fully_expanded(current) {
                return self.expand(game, current);
            }
            current = self.best_child(current, exploration);
        }

        current
    }

    /// Expand one untried action of `id` into a new child.
    ///
    /// Pops the last untried action, so repeated calls cover every legal
    /// action exactly once.
    ///
    /// # Panics
    /// Panics if the node is already fully expanded.
    pub fn expand(&mut self, game: &G, id: NodeId) -> NodeId {
        let action = self
            .get_mut(id)
            .untried_actions
            .pop()
            .expect("BUG: expand called on a fully expanded node");

        let next_state = game.apply(&self.get(id).state, action);
        let child = Node::new(game, next_state, Some(id), Some(action));
        let child_id = self.add(child);
        self.get_mut(id).children.push(child_id);

        child_id
    }

    /// Select the child with the highest UCT score.
    ///
    /// Ties keep the earliest child. With `exploration == 0.0` this is pure
    /// exploitation over the win/loss differential.
    ///
    /// # Panics
    /// Panics if the node has no children or a child was never visited.
    pub fn best_child(&self, id: NodeId, exploration: f64) -> NodeId {
        let node = self.get(id);
        let parent_visits = node.stats.visit_count;

        let mut best = None;
        let mut best_score = f64::NEG_INFINITY;

        for &child_id in &node.children {
            let child = &self.get(child_id).stats;
            assert!(
                child.visit_count > 0,
                "BUG: best_child reached an unvisited child"
            );

            let score = uct_score(parent_visits, child, exploration);
            if best.is_none() || score > best_score {
                best_score = score;
                best = Some(child_id);
            }
        }

        // INVARIANT: only called on expanded nodes with children
        best.expect("BUG: best_child called on node without children")
    }

    /// Record a simulation result on `id` and every ancestor up to the root.
    ///
    /// `outcome` is the searching party's result in the terminal state the
    /// rollout reached.
    pub fn backpropagate(&mut self, id: NodeId, outcome: Outcome) {
        let mut current = Some(id);

        while let Some(node_id) = current {
            let node = self.get_mut(node_id);
            node.stats.record(outcome);
            current = node.parent;
        }
    }

    /// Simulations that ended exactly at this node rather than in a child.
    pub fn stopped_at(&self, id: NodeId) -> u32 {
        let node = self.get(id);
        let through_children: u32 = node
            .children
            .iter()
            .map(|&child| self.get(child).stats.visit_count)
            .sum();
        node.stats.visit_count - through_children
    }
}
