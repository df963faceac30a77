use serde::{Deserialize, Serialize};

use crate::db_types::{ChairId, Ride, RideId};

/// Emitted once per assignment that survives a matching cycle's commit phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RideAssignedEvent {
    pub ride_id: RideId,
    pub chair_id: ChairId,
}

impl RideAssignedEvent {
    pub fn new(ride_id: RideId, chair_id: ChairId) -> Self {
        Self { ride_id, chair_id }
    }
}

/// Emitted when a rider's evaluation completes a ride and frees its chair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RideCompletedEvent {
    pub ride: Ride,
}

impl RideCompletedEvent {
    pub fn new(ride: Ride) -> Self {
        Self { ride }
    }
}
