//! The dispatch matching engine's planning half: cost estimation and assignment solving.
//!
//! Everything in this module is pure. The database layer reads the eligibility sets, hands them
//! to a [`MatchPlanner`], and commits whatever pairings come back; nothing here touches storage.

pub mod cost;
pub mod greedy;
pub mod hungarian;
pub mod strategy;

pub use cost::{CostMatrix, CostModel, UNREACHABLE_COST};
pub use greedy::GreedyNearest;
pub use hungarian::OptimalAssignment;
pub use strategy::{AssignmentStrategy, Pairing, StrategyKind};

use crate::db_types::{FreeChair, Ride};

/// The configured cost model and strategy for this process, applied to one cycle's eligibility
/// sets at a time.
pub struct MatchPlanner {
    model: CostModel,
    strategy: Box<dyn AssignmentStrategy>,
}

impl MatchPlanner {
    pub fn new(model: CostModel, kind: StrategyKind) -> Self {
        Self { model, strategy: kind.strategy() }
    }

    /// Plugs in a custom strategy implementation, e.g. for benchmarking one strategy against
    /// another on the same store.
    pub fn with_strategy(model: CostModel, strategy: Box<dyn AssignmentStrategy>) -> Self {
        Self { model, strategy }
    }

    pub fn plan(&self, rides: &[Ride], chairs: &[FreeChair]) -> Vec<Pairing> {
        let matrix = CostMatrix::build(self.model, rides, chairs);
        if matrix.is_empty() {
            return Vec::new();
        }
        self.strategy.solve(&matrix)
    }
}

impl Default for MatchPlanner {
    fn default() -> Self {
        Self::new(CostModel::default(), StrategyKind::default())
    }
}

impl std::fmt::Debug for MatchPlanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MatchPlanner({})", self.model)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::Utc;

    use crate::db_types::{ChairId, Coordinate, FreeChair, Ride, RideId};

    pub fn ride_at(pickup: Coordinate, destination: Coordinate) -> Ride {
        let now = Utc::now();
        Ride {
            id: RideId::random(),
            rider_id: "rider".to_string(),
            chair_id: None,
            pickup_latitude: pickup.latitude,
            pickup_longitude: pickup.longitude,
            destination_latitude: destination.latitude,
            destination_longitude: destination.longitude,
            evaluation: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn chair_at(location: Coordinate, speed: i64) -> FreeChair {
        FreeChair { id: ChairId::random(), speed, latitude: location.latitude, longitude: location.longitude }
    }
}
