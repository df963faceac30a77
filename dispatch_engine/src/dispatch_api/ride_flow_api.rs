use std::fmt::Debug;

use log::*;

use crate::db::common::RideManagement;
use crate::db_types::{NewRide, Ride, RideId, RideStatusEvent, RideStatusType};
use crate::dispatch_api::errors::RideFlowError;
use crate::events::{EventProducers, RideCompletedEvent};

/// `RideFlowApi` is the ride-side API: creating rides and walking them through the lifecycle.
///
/// All transitions here are driven by external actors — the chair reporting progress, the rider
/// evaluating the ride. The one transition this API never performs is `MATCHING → ENROUTE`;
/// that belongs to the matching cycle alone.
pub struct RideFlowApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for RideFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RideFlowApi")
    }
}

impl<B> RideFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> RideFlowApi<B>
where B: RideManagement
{
    /// Submits a new ride. The ride starts its life with a single `MATCHING` status event and no
    /// chair; the next matching cycle will consider it. A rider can only have one unfinished
    /// ride at a time.
    pub async fn create_ride(&self, ride: NewRide) -> Result<Ride, RideFlowError<B>> {
        let ride = self.db.create_ride(ride).await.map_err(RideFlowError::DatabaseError)?;
        debug!("🔄️ Ride {} accepted for rider {}. Pickup at {}", ride.id, ride.rider_id, ride.pickup());
        Ok(ride)
    }

    /// The chair reports arrival at the pickup coordinate.
    pub async fn arrive_at_pickup(&self, id: &RideId) -> Result<RideStatusEvent, RideFlowError<B>> {
        self.advance(id, RideStatusType::Pickup).await
    }

    /// The chair reports that the rider is on board and the trip has started.
    pub async fn start_carrying(&self, id: &RideId) -> Result<RideStatusEvent, RideFlowError<B>> {
        self.advance(id, RideStatusType::Carrying).await
    }

    /// The chair reports arrival at the destination.
    pub async fn arrive_at_destination(&self, id: &RideId) -> Result<RideStatusEvent, RideFlowError<B>> {
        self.advance(id, RideStatusType::Arrived).await
    }

    async fn advance(&self, id: &RideId, to: RideStatusType) -> Result<RideStatusEvent, RideFlowError<B>> {
        let event = self.db.advance_ride_status(id, to).await.map_err(RideFlowError::DatabaseError)?;
        trace!("🔄️ Ride {id} progressed to {to}");
        Ok(event)
    }

    /// The rider evaluates the ride, which completes it and frees the chair. Only legal once the
    /// chair has arrived at the destination.
    pub async fn submit_evaluation(&self, id: &RideId, evaluation: i64) -> Result<Ride, RideFlowError<B>> {
        if !(1..=5).contains(&evaluation) {
            return Err(RideFlowError::InvalidEvaluation(evaluation));
        }
        let ride = self.db.complete_ride(id, evaluation).await.map_err(RideFlowError::DatabaseError)?;
        self.call_ride_completed_hook(&ride).await;
        debug!("🔄️ Ride {} completed. Chair {:?} is free again", ride.id, ride.chair_id);
        Ok(ride)
    }

    async fn call_ride_completed_hook(&self, ride: &Ride) {
        for emitter in &self.producers.ride_completed_producer {
            debug!("🔄️ Notifying ride completed hook subscribers");
            let event = RideCompletedEvent::new(ride.clone());
            emitter.publish_event(event).await;
        }
    }

    pub async fn fetch_ride(&self, id: &RideId) -> Result<Option<Ride>, RideFlowError<B>> {
        self.db.fetch_ride(id).await.map_err(RideFlowError::DatabaseError)
    }

    /// The ride's current status, derived from the latest entry in its status log.
    pub async fn ride_status(&self, id: &RideId) -> Result<RideStatusType, RideFlowError<B>> {
        self.db.ride_status(id).await.map_err(RideFlowError::DatabaseError)
    }

    /// The ride's full status history, oldest first.
    pub async fn status_history(&self, id: &RideId) -> Result<Vec<RideStatusEvent>, RideFlowError<B>> {
        self.db.status_history(id).await.map_err(RideFlowError::DatabaseError)
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}
