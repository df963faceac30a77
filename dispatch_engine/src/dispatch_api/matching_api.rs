use std::fmt::Debug;

use log::*;

use crate::db::common::{AssignedPair, CycleOutcome, CycleReport, DispatchDatabase};
use crate::dispatch_api::errors::MatchingApiError;
use crate::events::{EventProducers, RideAssignedEvent};
use crate::matching::MatchPlanner;

/// `MatchingApi` owns the periodic half of the engine: it runs one matching cycle per call,
/// with the configured planner, and notifies subscribers of every assignment that committed.
///
/// The whole cycle is a single transaction inside the backend, so concurrent callers are safe;
/// an overlapping cycle either fully precedes or fully follows this one from the store's point
/// of view, and a lost commit race shows up as a dropped pairing, not an error.
pub struct MatchingApi<B> {
    db: B,
    planner: MatchPlanner,
    producers: EventProducers,
}

impl<B> Debug for MatchingApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MatchingApi")
    }
}

impl<B> MatchingApi<B> {
    pub fn new(db: B, planner: MatchPlanner, producers: EventProducers) -> Self {
        Self { db, planner, producers }
    }
}

impl<B> MatchingApi<B>
where B: DispatchDatabase
{
    /// Runs one matching cycle. Returns the cycle's report; inspect
    /// [`CycleReport::outcome`] for the nothing-to-do / assigned distinction. Errors are
    /// terminal for this tick only — the caller's next tick is the retry.
    pub async fn run_cycle(&self) -> Result<CycleReport, MatchingApiError<B>> {
        let report = self.db.run_matching_cycle(&self.planner).await.map_err(MatchingApiError::DatabaseError)?;
        match report.outcome() {
            CycleOutcome::NothingToDo => {
                trace!(
                    "🔄️ Nothing to match: {} rides waiting, {} chairs free",
                    report.eligible_rides,
                    report.free_chairs
                );
            },
            CycleOutcome::Assigned { count } => {
                debug!(
                    "🔄️ Matching cycle complete. {count} of {} waiting rides assigned across {} free chairs ({} dropped)",
                    report.eligible_rides, report.free_chairs, report.dropped
                );
                self.call_ride_assigned_hook(&report.assignments).await;
            },
        }
        Ok(report)
    }

    async fn call_ride_assigned_hook(&self, assignments: &[AssignedPair]) {
        for emitter in &self.producers.ride_assigned_producer {
            debug!("🔄️ Notifying ride assigned hook subscribers");
            for pair in assignments {
                let event = RideAssignedEvent::new(pair.ride_id.clone(), pair.chair_id.clone());
                emitter.publish_event(event).await;
            }
        }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}
