use std::{fmt::Display, str::FromStr};

use thiserror::Error;

use super::cost::CostMatrix;
use super::greedy::GreedyNearest;
use super::hungarian::OptimalAssignment;

/// One planned ride/chair pairing, by index into the cost matrix's rows and columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pairing {
    pub ride: usize,
    pub chair: usize,
    pub cost: i64,
}

/// A pluggable assignment strategy over a cost matrix.
///
/// Every implementation must guarantee that each ride appears in at most one pairing, that each
/// chair appears in at most one pairing, and that no pairing carries an unreachable cost.
pub trait AssignmentStrategy: Send + Sync {
    fn solve(&self, costs: &CostMatrix) -> Vec<Pairing>;
}

//--------------------------------------     StrategyKind      --------------------------------------------------------
/// Process-wide selection of the assignment strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    /// Oldest ride first, cheapest chair per ride. O(rides × chairs).
    Greedy,
    /// Minimum-total-cost bipartite assignment (Kuhn-Munkres). O(n³) in the larger side of the
    /// matrix, so only viable while the pending sets stay small.
    Optimal,
}

impl StrategyKind {
    pub fn strategy(self) -> Box<dyn AssignmentStrategy> {
        match self {
            StrategyKind::Greedy => Box::new(GreedyNearest),
            StrategyKind::Optimal => Box::new(OptimalAssignment),
        }
    }
}

impl Default for StrategyKind {
    fn default() -> Self {
        Self::Greedy
    }
}

impl Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrategyKind::Greedy => write!(f, "greedy"),
            StrategyKind::Optimal => write!(f, "optimal"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid matching strategy: {0}")]
pub struct InvalidStrategy(String);

impl FromStr for StrategyKind {
    type Err = InvalidStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "greedy" => Ok(Self::Greedy),
            "optimal" => Ok(Self::Optimal),
            s => Err(InvalidStrategy(s.to_string())),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn strategy_names_parse() {
        assert_eq!("greedy".parse::<StrategyKind>().unwrap(), StrategyKind::Greedy);
        assert_eq!("OPTIMAL".parse::<StrategyKind>().unwrap(), StrategyKind::Optimal);
        assert!("fastest".parse::<StrategyKind>().is_err());
    }
}
