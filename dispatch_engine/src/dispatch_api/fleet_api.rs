use std::fmt::Debug;

use log::*;

use crate::db::common::FleetManagement;
use crate::db_types::{Chair, ChairId, ChairModel, Coordinate, NewChair};
use crate::dispatch_api::errors::FleetApiError;

/// `FleetApi` is the chair-side API: models, registration, activity flags and location reports.
pub struct FleetApi<B> {
    db: B,
}

impl<B> Debug for FleetApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FleetApi")
    }
}

impl<B> FleetApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> FleetApi<B>
where B: FleetManagement
{
    /// Registers a chair model. The model's speed feeds straight into cost estimation, so it
    /// must be positive; a zero or negative speed would make every ride unreachable.
    pub async fn add_chair_model(&self, model: ChairModel) -> Result<(), FleetApiError<B>> {
        if model.speed <= 0 {
            return Err(FleetApiError::NonPositiveSpeed { model: model.name, speed: model.speed });
        }
        self.db.add_chair_model(model).await.map_err(FleetApiError::DatabaseError)
    }

    /// Registers a new chair. Chairs start inactive and without a location, which keeps them out
    /// of the matching pool until they activate and report in.
    pub async fn register_chair(&self, chair: NewChair) -> Result<Chair, FleetApiError<B>> {
        let chair = self.db.register_chair(chair).await.map_err(FleetApiError::DatabaseError)?;
        debug!("🪑️ Chair {} ({}) joined the fleet", chair.id, chair.model);
        Ok(chair)
    }

    pub async fn fetch_chair(&self, id: &ChairId) -> Result<Option<Chair>, FleetApiError<B>> {
        self.db.fetch_chair(id).await.map_err(FleetApiError::DatabaseError)
    }

    pub async fn activate_chair(&self, id: &ChairId) -> Result<(), FleetApiError<B>> {
        self.db.set_chair_activity(id, true).await.map_err(FleetApiError::DatabaseError)
    }

    pub async fn deactivate_chair(&self, id: &ChairId) -> Result<(), FleetApiError<B>> {
        self.db.set_chair_activity(id, false).await.map_err(FleetApiError::DatabaseError)
    }

    /// Records a location report for the chair. The report is appended to the location log and
    /// becomes the chair's last-known coordinate for matching.
    pub async fn record_location(&self, id: &ChairId, location: Coordinate) -> Result<(), FleetApiError<B>> {
        self.db.record_chair_location(id, location).await.map_err(FleetApiError::DatabaseError)
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}
