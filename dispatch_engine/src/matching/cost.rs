use std::{fmt::Display, str::FromStr};

use thiserror::Error;

use crate::db_types::{FreeChair, Ride};

/// Sentinel cost for pairs that must never be selected: padding cells in the square matrix fed to
/// the optimal solver, and candidates with no usable speed. Strictly greater than any real cost.
pub const UNREACHABLE_COST: i64 = 1_000_000_000;

//--------------------------------------       CostModel       --------------------------------------------------------
/// How the cost of sending a chair to a ride is estimated. Cost is always an estimated travel
/// time: grid distance divided by the chair's speed, with truncating integer division.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostModel {
    /// Distance from the chair to the pickup coordinate only.
    Pickup,
    /// Distance to the pickup plus the ride's own trip distance, weighted. Favours chairs for
    /// short trips when supply is tight.
    PickupAndDropoff { trip_weight: i64 },
}

impl CostModel {
    /// The weighted variant as it is deployed: the trip leg counts double.
    pub fn pickup_and_dropoff() -> Self {
        Self::PickupAndDropoff { trip_weight: 2 }
    }

    pub fn cost(&self, ride: &Ride, chair: &FreeChair) -> i64 {
        if chair.speed <= 0 {
            return UNREACHABLE_COST;
        }
        let pickup_leg = chair.location().distance_to(ride.pickup());
        match self {
            CostModel::Pickup => pickup_leg / chair.speed,
            CostModel::PickupAndDropoff { trip_weight } => {
                let trip_leg = ride.pickup().distance_to(ride.destination());
                (pickup_leg + trip_weight * trip_leg) / chair.speed
            },
        }
    }
}

impl Default for CostModel {
    fn default() -> Self {
        Self::Pickup
    }
}

impl Display for CostModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CostModel::Pickup => write!(f, "pickup"),
            CostModel::PickupAndDropoff { .. } => write!(f, "pickup-dropoff"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid cost model: {0}")]
pub struct InvalidCostModel(String);

impl FromStr for CostModel {
    type Err = InvalidCostModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pickup" => Ok(Self::Pickup),
            "pickup-dropoff" => Ok(Self::pickup_and_dropoff()),
            s => Err(InvalidCostModel(s.to_string())),
        }
    }
}

//--------------------------------------      CostMatrix       --------------------------------------------------------
/// The ride × chair cost table for one matching cycle. Rows are rides in oldest-request-first
/// order; columns are free chairs in their (deterministic) enumeration order.
#[derive(Debug, Clone)]
pub struct CostMatrix {
    rides: usize,
    chairs: usize,
    costs: Vec<i64>,
}

impl CostMatrix {
    pub fn build(model: CostModel, rides: &[Ride], chairs: &[FreeChair]) -> Self {
        let mut costs = Vec::with_capacity(rides.len() * chairs.len());
        for ride in rides {
            for chair in chairs {
                costs.push(model.cost(ride, chair));
            }
        }
        Self { rides: rides.len(), chairs: chairs.len(), costs }
    }

    pub fn rides(&self) -> usize {
        self.rides
    }

    pub fn chairs(&self) -> usize {
        self.chairs
    }

    pub fn is_empty(&self) -> bool {
        self.rides == 0 || self.chairs == 0
    }

    pub fn cost(&self, ride: usize, chair: usize) -> i64 {
        self.costs[ride * self.chairs + chair]
    }
}

#[cfg(test)]
impl CostMatrix {
    /// Build a matrix from raw row-major costs, for exercising solvers directly.
    pub(crate) fn from_costs(rides: usize, chairs: usize, costs: Vec<i64>) -> Self {
        assert_eq!(costs.len(), rides * chairs);
        Self { rides, chairs, costs }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::db_types::Coordinate;
    use crate::matching::fixtures::{chair_at, ride_at};

    #[test]
    fn pickup_cost_is_truncating_division() {
        let ride = ride_at(Coordinate::new(1, 1), Coordinate::new(5, 5));
        let chair = chair_at(Coordinate::new(10, 10), 5);
        // distance 18, speed 5
        assert_eq!(CostModel::Pickup.cost(&ride, &chair), 3);
    }

    #[test]
    fn dropoff_leg_is_weighted() {
        let ride = ride_at(Coordinate::new(0, 0), Coordinate::new(3, 3));
        let chair = chair_at(Coordinate::new(2, 2), 1);
        // pickup leg 4, trip leg 6 doubled
        assert_eq!(CostModel::pickup_and_dropoff().cost(&ride, &chair), 16);
        assert_eq!(CostModel::Pickup.cost(&ride, &chair), 4);
    }

    #[test]
    fn larger_distance_never_costs_less() {
        let near = ride_at(Coordinate::new(1, 0), Coordinate::new(2, 2));
        let far = ride_at(Coordinate::new(50, 0), Coordinate::new(51, 2));
        let chair = chair_at(Coordinate::new(0, 0), 3);
        for model in [CostModel::Pickup, CostModel::pickup_and_dropoff()] {
            assert!(model.cost(&near, &chair) <= model.cost(&far, &chair));
            assert!(model.cost(&near, &chair) >= 0);
        }
    }

    #[test]
    fn zero_speed_is_unreachable() {
        let ride = ride_at(Coordinate::new(1, 1), Coordinate::new(2, 2));
        let chair = chair_at(Coordinate::new(0, 0), 0);
        assert_eq!(CostModel::Pickup.cost(&ride, &chair), UNREACHABLE_COST);
    }

    #[test]
    fn model_names_parse() {
        assert_eq!("pickup".parse::<CostModel>().unwrap(), CostModel::Pickup);
        assert_eq!("Pickup-Dropoff".parse::<CostModel>().unwrap(), CostModel::pickup_and_dropoff());
        assert!("random".parse::<CostModel>().is_err());
    }

    #[test]
    fn matrix_is_row_major_over_rides() {
        let rides =
            vec![ride_at(Coordinate::new(0, 0), Coordinate::new(1, 1)), ride_at(Coordinate::new(4, 4), Coordinate::new(1, 1))];
        let chairs = vec![chair_at(Coordinate::new(0, 0), 1), chair_at(Coordinate::new(2, 2), 1)];
        let matrix = CostMatrix::build(CostModel::Pickup, &rides, &chairs);
        assert_eq!(matrix.rides(), 2);
        assert_eq!(matrix.chairs(), 2);
        assert_eq!(matrix.cost(0, 0), 0);
        assert_eq!(matrix.cost(0, 1), 4);
        assert_eq!(matrix.cost(1, 0), 8);
        assert_eq!(matrix.cost(1, 1), 4);
    }
}
