use thiserror::Error;

use crate::db::common::{DispatchDatabase, FleetManagement, RideManagement};

#[derive(Debug, Error)]
pub enum MatchingApiError<B: DispatchDatabase> {
    #[error("Database error: {0}")]
    DatabaseError(B::Error),
}

#[derive(Debug, Error)]
pub enum RideFlowError<B: RideManagement> {
    #[error("Database error: {0}")]
    DatabaseError(B::Error),
    #[error("Evaluation must be between 1 and 5, not {0}")]
    InvalidEvaluation(i64),
}

#[derive(Debug, Error)]
pub enum FleetApiError<B: FleetManagement> {
    #[error("Database error: {0}")]
    DatabaseError(B::Error),
    #[error("Chair model {model} must have a positive speed, not {speed}")]
    NonPositiveSpeed { model: String, speed: i64 },
}
