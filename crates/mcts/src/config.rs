//! Search configuration parameters.
//!
//! These parameters control the behavior of the Monte Carlo Tree Search algorithm.

use tracing::warn;
use uct_core::{Result, UctError};

/// Exploration parameter used while descending the tree.
pub const DEFAULT_EXPLORATION: f64 = 0.1;

/// Largest simulation budget a search accepts; node visit counts are `u32`.
pub const MAX_SIMULATIONS: usize = u32::MAX as usize;

/// Rollout policy applied during the simulation phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Playout {
    /// Every simulated move is drawn uniformly from the legal actions.
    #[default]
    Uniform,

    /// Simulated opponent moves come from a nested opponent-perspective search.
    Heavy,
}

/// Search configuration parameters.
#[derive(Clone, Debug)]
pub struct MctsConfig {
    /// Number of simulations per search.
    pub num_simulations: usize,

    /// UCT exploration parameter used during selection.
    /// Part of the formula: q + c * sqrt(2 * ln(N_parent / N_child)).
    /// The final move choice always uses 0 (pure exploitation).
    pub exploration: f64,

    /// Rollout policy for the simulation phase.
    pub playout: Playout,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            num_simulations: 1000,
            exploration: DEFAULT_EXPLORATION,
            playout: Playout::Uniform,
        }
    }
}

impl MctsConfig {
    /// Create a new config with the specified number of simulations.
    pub fn with_simulations(num_simulations: usize) -> Self {
        Self {
            num_simulations,
            ..Default::default()
        }
    }

    /// Create a config using heavy (opponent-modelling) playouts.
    pub fn heavy(num_simulations: usize) -> Self {
        Self {
            num_simulations,
            playout: Playout::Heavy,
            ..Default::default()
        }
    }

    /// Budget of the nested opponent search run by heavy playouts.
    ///
    /// Half the outer budget, never less than one simulation.
    pub fn nested_simulations(&self) -> usize {
        (self.num_simulations / 2).max(1)
    }

    /// Check the configuration before any search work starts.
    ///
    /// # Errors
    /// - `UctError::InvalidBudget` if `num_simulations` is zero or above [`MAX_SIMULATIONS`]
    /// - `UctError::InvalidExploration` if `exploration` is negative or not finite
    pub fn validate(&self) -> Result<()> {
        if self.num_simulations == 0 {
            warn!("rejecting search with an empty simulation budget");
            return Err(UctError::InvalidBudget(self.num_simulations));
        }

        if self.num_simulations > MAX_SIMULATIONS {
            warn!(
                simulations = self.num_simulations,
                max = MAX_SIMULATIONS,
                "rejecting simulation budget that would overflow visit counts"
            );
            return Err(UctError::InvalidBudget(self.num_simulations));
        }

        if !self.exploration.is_finite() || self.exploration < 0.0 {
            warn!(exploration = self.exploration, "rejecting exploration parameter");
            return Err(UctError::InvalidExploration(self.exploration));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MctsConfig::default();
        assert_eq!(config.num_simulations, 1000);
        assert!((config.exploration - 0.1).abs() < 1e-12);
        assert_eq!(config.playout, Playout::Uniform);
    }

    #[test]
    fn test_with_simulations() {
        let config = MctsConfig::with_simulations(100);
        assert_eq!(config.num_simulations, 100);
        // Other values should be default
        assert_eq!(config.playout, Playout::Uniform);
        assert!((config.exploration - DEFAULT_EXPLORATION).abs() < 1e-12);
    }

    #[test]
    fn test_heavy() {
        let config = MctsConfig::heavy(400);
        assert_eq!(config.num_simulations, 400);
        assert_eq!(config.playout, Playout::Heavy);
    }

    #[test]
    fn test_nested_simulations() {
        assert_eq!(MctsConfig::with_simulations(1000).nested_simulations(), 500);
        assert_eq!(MctsConfig::with_simulations(7).nested_simulations(), 3);

        // Halving a budget of one must not produce an empty nested search
        assert_eq!(MctsConfig::with_simulations(1).nested_simulations(), 1);
    }

    #[test]
    fn test_validate_rejects_zero_budget() {
        let config = MctsConfig::with_simulations(0);
        assert_eq!(config.validate(), Err(UctError::InvalidBudget(0)));
    }

    #[test]
    fn test_validate_rejects_oversized_budget() {
        assert!(MctsConfig::with_simulations(MAX_SIMULATIONS).validate().is_ok());

        // Unrepresentable on 32-bit targets, where usize cannot exceed the cap
        if let Some(too_many) = MAX_SIMULATIONS.checked_add(1) {
            let config = MctsConfig::with_simulations(too_many);
            assert_eq!(config.validate(), Err(UctError::InvalidBudget(too_many)));
        }
    }

    #[test]
    fn test_validate_rejects_bad_exploration() {
        let mut config = MctsConfig::default();

        config.exploration = -0.5;
        assert!(matches!(
            config.validate(),
            Err(UctError::InvalidExploration(_))
        ));

        config.exploration = f64::NAN;
        assert!(matches!(
            config.validate(),
            Err(UctError::InvalidExploration(_))
        ));
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(MctsConfig::default().validate().is_ok());
        assert!(MctsConfig::heavy(1).validate().is_ok());

        let mut greedy = MctsConfig::default();
        greedy.exploration = 0.0;
        assert!(greedy.validate().is_ok());
    }
}
