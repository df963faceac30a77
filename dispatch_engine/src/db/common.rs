use crate::db_types::{
    Chair, ChairId, ChairModel, Coordinate, NewChair, NewRide, Ride, RideId, RideStatusEvent, RideStatusType,
};
use crate::matching::MatchPlanner;

//--------------------------------------     Cycle results     --------------------------------------------------------

/// One committed assignment from a matching cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignedPair {
    pub ride_id: RideId,
    pub chair_id: ChairId,
    pub cost: i64,
}

/// The two outcome classes of a matching cycle. An empty eligibility set is not an error, it is
/// simply a tick with nothing to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No eligible rides, no schedulable free chairs, or no viable pairing between them.
    NothingToDo,
    /// A commit happened. The count can be zero when every planned pairing lost a race to a
    /// concurrent cycle.
    Assigned { count: usize },
}

/// What one invocation of the matching engine saw and did.
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    pub eligible_rides: usize,
    pub free_chairs: usize,
    /// Pairings that survived the commit phase, in planning order.
    pub assignments: Vec<AssignedPair>,
    /// Pairings dropped at commit time because a concurrent cycle got there first.
    pub dropped: usize,
    committed: bool,
}

impl CycleReport {
    pub fn nothing_to_do(eligible_rides: usize, free_chairs: usize) -> Self {
        Self { eligible_rides, free_chairs, ..Self::default() }
    }

    pub fn committed(eligible_rides: usize, free_chairs: usize, assignments: Vec<AssignedPair>, dropped: usize) -> Self {
        Self { eligible_rides, free_chairs, assignments, dropped, committed: true }
    }

    pub fn outcome(&self) -> CycleOutcome {
        if self.committed {
            CycleOutcome::Assigned { count: self.assignments.len() }
        } else {
            CycleOutcome::NothingToDo
        }
    }
}

//--------------------------------------        Traits         --------------------------------------------------------

/// The storage backend for the dispatch engine itself.
///
/// A matching cycle is a single transaction from eligibility reads through assignment writes, so
/// the whole cycle lives behind one call; callers cannot accidentally split it.
#[allow(async_fn_in_trait)]
pub trait DispatchDatabase: Clone {
    type Error: std::error::Error;

    /// The URL of the database
    fn url(&self) -> &str;

    /// Runs one matching cycle in a single transaction:
    /// * reads the rides awaiting assignment (oldest request first) and the free chairs,
    /// * asks the planner for a pairing,
    /// * commits each pairing with a compare-and-set write of the ride's chair reference plus an
    ///   appended `ENROUTE` status event.
    ///
    /// A pairing whose compare-and-set finds the ride already taken is dropped from the batch; a
    /// store error rolls the whole cycle back.
    async fn run_matching_cycle(&self, planner: &MatchPlanner) -> Result<CycleReport, Self::Error>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Ride creation, lifecycle progression and status queries.
#[allow(async_fn_in_trait)]
pub trait RideManagement {
    type Error: std::error::Error;

    /// Atomically inserts the ride and its initial `MATCHING` status event. Fails when the rider
    /// already has a ride whose latest status is not `COMPLETED`.
    async fn create_ride(&self, ride: NewRide) -> Result<Ride, Self::Error>;

    async fn fetch_ride(&self, id: &RideId) -> Result<Option<Ride>, Self::Error>;

    /// The ride's current status, derived from the latest entry in its status log.
    async fn ride_status(&self, id: &RideId) -> Result<RideStatusType, Self::Error>;

    /// The full status log for a ride, oldest first.
    async fn status_history(&self, id: &RideId) -> Result<Vec<RideStatusEvent>, Self::Error>;

    /// Appends `to` to the ride's status log, provided it is the single legal successor of the
    /// current status. `MATCHING → ENROUTE` is reserved to the matching cycle and is rejected
    /// here, as is `ARRIVED → COMPLETED`, which only [`RideManagement::complete_ride`] performs.
    async fn advance_ride_status(&self, id: &RideId, to: RideStatusType) -> Result<RideStatusEvent, Self::Error>;

    /// Records the rider's evaluation and appends the terminal `COMPLETED` event. Only legal
    /// while the latest status is `ARRIVED`. Completion is what returns the chair to the free
    /// pool.
    async fn complete_ride(&self, id: &RideId, evaluation: i64) -> Result<Ride, Self::Error>;
}

/// Chair fleet bookkeeping: models, registration, activity and location reports.
#[allow(async_fn_in_trait)]
pub trait FleetManagement {
    type Error: std::error::Error;

    async fn add_chair_model(&self, model: ChairModel) -> Result<(), Self::Error>;

    /// Registers a chair against an existing model. New chairs start inactive.
    async fn register_chair(&self, chair: NewChair) -> Result<Chair, Self::Error>;

    async fn fetch_chair(&self, id: &ChairId) -> Result<Option<Chair>, Self::Error>;

    async fn set_chair_activity(&self, id: &ChairId, active: bool) -> Result<(), Self::Error>;

    /// Appends a location report and refreshes the chair's last-known coordinate, atomically.
    /// A chair that has never reported stays out of the matching pool; an unknown location is
    /// never treated as the origin.
    async fn record_chair_location(&self, id: &ChairId, location: Coordinate) -> Result<(), Self::Error>;
}
