//! Search domain types with enforced invariants.
//!
//! - Outcome: a game result restricted to {-1, 0, +1}
//! - OutcomeTally: per-outcome counters whose total is the visit count

use crate::{Result, UctError};
use std::fmt;

/// Result of a finished game from one party's perspective.
///
/// # Example
/// ```
/// use uct_core::Outcome;
///
/// let outcome = Outcome::try_from(-1i8).unwrap();
/// assert_eq!(outcome, Outcome::Loss);
/// assert_eq!(outcome.flipped(), Outcome::Win);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    Loss = -1,
    Draw = 0,
    Win = 1,
}

impl Outcome {
    /// All outcomes, ordered from worst to best.
    pub const ALL: [Outcome; 3] = [Outcome::Loss, Outcome::Draw, Outcome::Win];

    /// Integer value: -1, 0 or 1.
    pub fn value(self) -> i8 {
        self as i8
    }

    /// The same result seen by the other party of a two-party game.
    pub fn flipped(self) -> Self {
        match self {
            Outcome::Loss => Outcome::Win,
            Outcome::Draw => Outcome::Draw,
            Outcome::Win => Outcome::Loss,
        }
    }

    fn slot(self) -> usize {
        (self.value() + 1) as usize
    }
}

impl TryFrom<i8> for Outcome {
    type Error = UctError;

    /// # Errors
    /// Returns `UctError::InvalidOutcome` for anything but -1, 0 or 1.
    fn try_from(value: i8) -> Result<Self> {
        match value {
            -1 => Ok(Outcome::Loss),
            0 => Ok(Outcome::Draw),
            1 => Ok(Outcome::Win),
            other => Err(UctError::InvalidOutcome(i64::from(other))),
        }
    }
}

impl From<Outcome> for i8 {
    fn from(outcome: Outcome) -> Self {
        outcome.value()
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Loss => write!(f, "loss"),
            Outcome::Draw => write!(f, "draw"),
            Outcome::Win => write!(f, "win"),
        }
    }
}

/// Count of simulations ending in each outcome.
///
/// Invariant: `total()` equals the number of outcomes recorded, which the
/// search keeps equal to the owning node's visit count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OutcomeTally([u32; 3]);

impl OutcomeTally {
    /// An empty tally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one finished simulation.
    pub fn record(&mut self, outcome: Outcome) {
        self.0[outcome.slot()] += 1;
    }

    /// Number of simulations that ended in `outcome`.
    pub fn get(&self, outcome: Outcome) -> u32 {
        self.0[outcome.slot()]
    }

    pub fn wins(&self) -> u32 {
        self.get(Outcome::Win)
    }

    pub fn draws(&self) -> u32 {
        self.get(Outcome::Draw)
    }

    pub fn losses(&self) -> u32 {
        self.get(Outcome::Loss)
    }

    /// Sum over all three outcomes.
    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }

    /// Wins minus losses, the numerator of the exploitation term.
    pub fn win_loss_difference(&self) -> i64 {
        i64::from(self.wins()) - i64::from(self.losses())
    }
}

impl fmt::Display for OutcomeTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "W: {} D: {} L: {}",
            self.wins(),
            self.draws(),
            self.losses()
        )
    }
}
