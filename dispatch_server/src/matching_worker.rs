use dispatch_engine::events::EventProducers;
use dispatch_engine::matching::MatchPlanner;
use dispatch_engine::{CycleOutcome, MatchingApi, SqliteDatabase};
use log::*;
use tokio::task::JoinHandle;

/// Starts the matching worker. Do not await the returned JoinHandle, as it will run indefinitely.
///
/// One matching cycle runs per tick. A failed cycle is abandoned wholesale; there is no retry
/// loop, because the next tick is the retry.
pub fn start_matching_worker(
    db: SqliteDatabase,
    producers: EventProducers,
    planner: MatchPlanner,
    interval: std::time::Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        let api = MatchingApi::new(db, planner, producers);
        info!("🕰️ Matching worker started. One cycle every {}ms", interval.as_millis());
        loop {
            timer.tick().await;
            match api.run_cycle().await {
                Ok(report) => match report.outcome() {
                    CycleOutcome::NothingToDo => {
                        trace!(
                            "🕰️ Nothing to match: {} rides waiting, {} chairs free",
                            report.eligible_rides,
                            report.free_chairs
                        );
                    },
                    CycleOutcome::Assigned { count } => {
                        info!(
                            "🕰️ {count} of {} waiting rides assigned ({} pairings dropped)",
                            report.eligible_rides, report.dropped
                        );
                    },
                },
                Err(e) => {
                    error!("🕰️ Error running matching cycle: {e}. Waiting for the next tick.");
                },
            }
        }
    })
}
