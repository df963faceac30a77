use thiserror::Error;

use crate::db_types::{ChairId, RideId, RideStatusType};

#[derive(Debug, Error)]
pub enum SqliteDatabaseError {
    #[error("Database connection error: {0}")]
    DriverError(#[from] sqlx::Error),
    #[error("Ride not found: {0}")]
    RideNotFound(RideId),
    #[error("Chair not found: {0}")]
    ChairNotFound(ChairId),
    #[error("Chair model does not exist: {0}")]
    UnknownChairModel(String),
    #[error("Rider {0} already has an unfinished ride")]
    RideInProgress(String),
    #[error("A ride cannot move from {from} to {to}")]
    InvalidStatusTransition { from: RideStatusType, to: RideStatusType },
}
