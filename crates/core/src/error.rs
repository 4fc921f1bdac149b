use thiserror::Error;

/// Errors reported by the search engine.
///
/// Every variant is a caller error detected before any search work starts;
/// none of them is retried and no partial tree is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UctError {
    #[error("Simulation budget must be between 1 and u32::MAX, got {0}")]
    InvalidBudget(usize),

    #[error("Root state is already terminal")]
    TerminalRoot,

    #[error("No legal actions available")]
    NoLegalActions,

    #[error("Invalid exploration parameter: {0}")]
    InvalidExploration(f64),

    #[error("Invalid outcome {0}: expected -1, 0 or 1")]
    InvalidOutcome(i64),
}

/// Convenience Result type for search operations
pub type Result<T> = std::result::Result<T, UctError>;
