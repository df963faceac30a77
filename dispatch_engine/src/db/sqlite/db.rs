use std::fmt::Debug;

use chrono::Utc;
use log::*;
use sqlx::SqlitePool;

use super::{chairs, new_pool, rides, SqliteDatabaseError};
use crate::db::common::{AssignedPair, CycleReport, DispatchDatabase, FleetManagement, RideManagement};
use crate::db_types::{
    Chair, ChairId, ChairModel, Coordinate, NewChair, NewRide, Ride, RideId, RideStatusEvent, RideStatusType,
};
use crate::matching::MatchPlanner;

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object from the `DISPATCH_DATABASE_URL` environment variable.
    pub async fn new(max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        let url = super::db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    /// Creates the database file if it does not exist yet.
    pub async fn create_if_missing(url: &str) -> Result<(), SqliteDatabaseError> {
        use sqlx::migrate::MigrateDatabase;
        if !sqlx::Sqlite::database_exists(url).await? {
            sqlx::Sqlite::create_database(url).await?;
            info!("🗃️ Created Sqlite database {url}");
        }
        Ok(())
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Brings the schema up to date.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./src/db/sqlite/migrations").run(&self.pool).await
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl DispatchDatabase for SqliteDatabase {
    type Error = SqliteDatabaseError;

    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn run_matching_cycle(&self, planner: &MatchPlanner) -> Result<CycleReport, Self::Error> {
        let mut tx = self.pool.begin().await?;
        let pending = rides::eligible_rides(&mut tx).await?;
        if pending.is_empty() {
            return Ok(CycleReport::nothing_to_do(0, 0));
        }
        let free = chairs::free_chairs(&mut tx).await?;
        if free.is_empty() {
            return Ok(CycleReport::nothing_to_do(pending.len(), 0));
        }
        let pairings = planner.plan(&pending, &free);
        if pairings.is_empty() {
            return Ok(CycleReport::nothing_to_do(pending.len(), free.len()));
        }

        let mut assignments = Vec::with_capacity(pairings.len());
        let mut dropped = 0;
        let now = Utc::now();
        for pairing in pairings {
            let ride = &pending[pairing.ride];
            let chair = &free[pairing.chair];
            if rides::assign_chair_if_free(&ride.id, &chair.id, now, &mut tx).await? {
                rides::append_status(&ride.id, RideStatusType::Enroute, now, &mut tx).await?;
                debug!("🗃️ Ride {} assigned to chair {} at cost {}", ride.id, chair.id, pairing.cost);
                assignments.push(AssignedPair {
                    ride_id: ride.id.clone(),
                    chair_id: chair.id.clone(),
                    cost: pairing.cost,
                });
            } else {
                warn!("🗃️ Ride {} or chair {} was claimed by a concurrent cycle. Dropping the pairing.", ride.id, chair.id);
                dropped += 1;
            }
        }
        tx.commit().await?;
        Ok(CycleReport::committed(pending.len(), free.len(), assignments, dropped))
    }

    async fn close(&mut self) -> Result<(), Self::Error> {
        self.pool.close().await;
        Ok(())
    }
}

impl RideManagement for SqliteDatabase {
    type Error = SqliteDatabaseError;

    async fn create_ride(&self, ride: NewRide) -> Result<Ride, Self::Error> {
        let mut tx = self.pool.begin().await?;
        if rides::has_unfinished_ride(&ride.rider_id, &mut tx).await? {
            return Err(SqliteDatabaseError::RideInProgress(ride.rider_id));
        }
        let now = Utc::now();
        let created = rides::insert_ride(ride, now, &mut tx).await?;
        rides::append_status(&created.id, RideStatusType::Matching, now, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Ride {} created for rider {}", created.id, created.rider_id);
        Ok(created)
    }

    async fn fetch_ride(&self, id: &RideId) -> Result<Option<Ride>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        rides::fetch_ride(id, &mut conn).await
    }

    async fn ride_status(&self, id: &RideId) -> Result<RideStatusType, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        rides::latest_status(id, &mut conn)
            .await?
            .ok_or_else(|| SqliteDatabaseError::RideNotFound(id.clone()))
    }

    async fn status_history(&self, id: &RideId) -> Result<Vec<RideStatusEvent>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        rides::status_history(id, &mut conn).await
    }

    async fn advance_ride_status(&self, id: &RideId, to: RideStatusType) -> Result<RideStatusEvent, Self::Error> {
        // Only the chair-progress transitions may come through here. MATCHING → ENROUTE belongs
        // to the matching cycle, and ARRIVED → COMPLETED to complete_ride.
        use RideStatusType::*;
        let mut tx = self.pool.begin().await?;
        let current = rides::latest_status(id, &mut tx)
            .await?
            .ok_or_else(|| SqliteDatabaseError::RideNotFound(id.clone()))?;
        let legal = current.next() == Some(to) && matches!(to, Pickup | Carrying | Arrived);
        if !legal {
            return Err(SqliteDatabaseError::InvalidStatusTransition { from: current, to });
        }
        let event = rides::append_status(id, to, Utc::now(), &mut tx).await?;
        tx.commit().await?;
        Ok(event)
    }

    async fn complete_ride(&self, id: &RideId, evaluation: i64) -> Result<Ride, Self::Error> {
        let mut tx = self.pool.begin().await?;
        let ride = rides::fetch_ride(id, &mut tx).await?.ok_or_else(|| SqliteDatabaseError::RideNotFound(id.clone()))?;
        let current = rides::latest_status(id, &mut tx)
            .await?
            .ok_or_else(|| SqliteDatabaseError::RideNotFound(id.clone()))?;
        if current != RideStatusType::Arrived {
            return Err(SqliteDatabaseError::InvalidStatusTransition {
                from: current,
                to: RideStatusType::Completed,
            });
        }
        let now = Utc::now();
        rides::set_evaluation(id, evaluation, now, &mut tx).await?;
        rides::append_status(id, RideStatusType::Completed, now, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Ride {id} completed with evaluation {evaluation}");
        Ok(Ride { evaluation: Some(evaluation), updated_at: now, ..ride })
    }
}

impl FleetManagement for SqliteDatabase {
    type Error = SqliteDatabaseError;

    async fn add_chair_model(&self, model: ChairModel) -> Result<(), Self::Error> {
        let mut conn = self.pool.acquire().await?;
        chairs::insert_model(model, &mut conn).await
    }

    async fn register_chair(&self, chair: NewChair) -> Result<Chair, Self::Error> {
        let mut tx = self.pool.begin().await?;
        if !chairs::model_exists(&chair.model, &mut tx).await? {
            return Err(SqliteDatabaseError::UnknownChairModel(chair.model));
        }
        let created = chairs::insert_chair(chair, Utc::now(), &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Chair {} ({}) registered", created.id, created.model);
        Ok(created)
    }

    async fn fetch_chair(&self, id: &ChairId) -> Result<Option<Chair>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        chairs::fetch_chair(id, &mut conn).await
    }

    async fn set_chair_activity(&self, id: &ChairId, active: bool) -> Result<(), Self::Error> {
        let mut conn = self.pool.acquire().await?;
        let touched = chairs::set_activity(id, active, Utc::now(), &mut conn).await?;
        if touched == 0 {
            return Err(SqliteDatabaseError::ChairNotFound(id.clone()));
        }
        Ok(())
    }

    async fn record_chair_location(&self, id: &ChairId, location: Coordinate) -> Result<(), Self::Error> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();
        let touched = chairs::update_last_location(id, location, now, &mut tx).await?;
        if touched == 0 {
            return Err(SqliteDatabaseError::ChairNotFound(id.clone()));
        }
        chairs::insert_location(id, location, now, &mut tx).await?;
        tx.commit().await?;
        trace!("🗃️ Chair {id} reported {location}");
        Ok(())
    }
}
