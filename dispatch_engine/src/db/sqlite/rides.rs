use chrono::{DateTime, Utc};
use log::trace;
use sqlx::SqliteConnection;
use ulid::Ulid;

use crate::db::sqlite::SqliteDatabaseError;
use crate::db_types::{ChairId, NewRide, Ride, RideId, RideStatusEvent, RideStatusType};

/// Inserts a new ride row. This is not atomic on its own; embed the call in a transaction
/// together with [`append_status`] so the ride and its initial status event land together.
pub async fn insert_ride(
    ride: NewRide,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Ride, SqliteDatabaseError> {
    let id = RideId::random();
    sqlx::query(
        r#"
            INSERT INTO rides (
                id,
                rider_id,
                pickup_latitude,
                pickup_longitude,
                destination_latitude,
                destination_longitude,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8);
        "#,
    )
    .bind(&id)
    .bind(&ride.rider_id)
    .bind(ride.pickup.latitude)
    .bind(ride.pickup.longitude)
    .bind(ride.destination.latitude)
    .bind(ride.destination.longitude)
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await?;
    Ok(Ride {
        id,
        rider_id: ride.rider_id,
        chair_id: None,
        pickup_latitude: ride.pickup.latitude,
        pickup_longitude: ride.pickup.longitude,
        destination_latitude: ride.destination.latitude,
        destination_longitude: ride.destination.longitude,
        evaluation: None,
        created_at: now,
        updated_at: now,
    })
}

/// Appends one entry to a ride's status log under a fresh ULID.
pub async fn append_status(
    ride_id: &RideId,
    status: RideStatusType,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<RideStatusEvent, SqliteDatabaseError> {
    let id = Ulid::new().to_string();
    sqlx::query("INSERT INTO ride_statuses (id, ride_id, status, created_at) VALUES ($1, $2, $3, $4)")
        .bind(&id)
        .bind(ride_id)
        .bind(status.to_string())
        .bind(now)
        .execute(&mut *conn)
        .await?;
    trace!("🗃️ Ride {ride_id} is now {status}");
    Ok(RideStatusEvent { id, ride_id: ride_id.clone(), status, created_at: now })
}

pub async fn fetch_ride(id: &RideId, conn: &mut SqliteConnection) -> Result<Option<Ride>, SqliteDatabaseError> {
    let ride = sqlx::query_as::<_, Ride>(
        r#"
            SELECT id, rider_id, chair_id, pickup_latitude, pickup_longitude,
                   destination_latitude, destination_longitude, evaluation, created_at, updated_at
            FROM rides
            WHERE id = $1;
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(ride)
}

/// The ride's current status: the entry with the latest timestamp in its status log, or `None`
/// for an unknown ride.
pub async fn latest_status(
    ride_id: &RideId,
    conn: &mut SqliteConnection,
) -> Result<Option<RideStatusType>, SqliteDatabaseError> {
    let status = sqlx::query_scalar::<_, RideStatusType>(
        "SELECT status FROM ride_statuses WHERE ride_id = $1 ORDER BY created_at DESC, id DESC LIMIT 1",
    )
    .bind(ride_id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(status)
}

/// The full status log for a ride, oldest entry first.
pub async fn status_history(
    ride_id: &RideId,
    conn: &mut SqliteConnection,
) -> Result<Vec<RideStatusEvent>, SqliteDatabaseError> {
    let events = sqlx::query_as::<_, RideStatusEvent>(
        "SELECT id, ride_id, status, created_at FROM ride_statuses WHERE ride_id = $1 ORDER BY created_at ASC, id ASC",
    )
    .bind(ride_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(events)
}

/// Whether the rider has any ride whose latest status is not `COMPLETED`.
pub async fn has_unfinished_ride(rider_id: &str, conn: &mut SqliteConnection) -> Result<bool, SqliteDatabaseError> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
            SELECT COUNT(*)
            FROM rides r
            JOIN (SELECT ride_id, MAX(created_at) AS max_created FROM ride_statuses GROUP BY ride_id) latest
              ON latest.ride_id = r.id
            JOIN ride_statuses rs ON rs.ride_id = r.id AND rs.created_at = latest.max_created
            WHERE r.rider_id = $1 AND rs.status != 'COMPLETED';
        "#,
    )
    .bind(rider_id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(count > 0)
}

/// The rides awaiting assignment: latest status `MATCHING` and no chair bound, oldest request
/// first. The ULID id breaks creation-time ties deterministically.
pub async fn eligible_rides(conn: &mut SqliteConnection) -> Result<Vec<Ride>, SqliteDatabaseError> {
    let rides = sqlx::query_as::<_, Ride>(
        r#"
            SELECT r.id, r.rider_id, r.chair_id, r.pickup_latitude, r.pickup_longitude,
                   r.destination_latitude, r.destination_longitude, r.evaluation, r.created_at, r.updated_at
            FROM rides r
            JOIN (SELECT ride_id, MAX(created_at) AS max_created FROM ride_statuses GROUP BY ride_id) latest
              ON latest.ride_id = r.id
            JOIN ride_statuses rs ON rs.ride_id = r.id AND rs.created_at = latest.max_created
            WHERE rs.status = 'MATCHING' AND r.chair_id IS NULL
            ORDER BY r.created_at ASC, r.id ASC;
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;
    trace!("🗃️ {} rides awaiting assignment", rides.len());
    Ok(rides)
}

/// Compare-and-set write of the ride's chair reference. The guards close the race against a
/// concurrent cycle: the ride must still be unassigned and the chair must not have been claimed
/// for any other unfinished ride. Returns false when the race was lost.
pub async fn assign_chair_if_free(
    ride_id: &RideId,
    chair_id: &ChairId,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<bool, SqliteDatabaseError> {
    let result = sqlx::query(
        r#"
            UPDATE rides
            SET chair_id = $1, updated_at = $2
            WHERE id = $3
              AND chair_id IS NULL
              AND NOT EXISTS (
                  SELECT 1
                  FROM rides r2
                  JOIN (SELECT ride_id, MAX(created_at) AS max_created FROM ride_statuses GROUP BY ride_id) latest
                    ON latest.ride_id = r2.id
                  JOIN ride_statuses rs ON rs.ride_id = r2.id AND rs.created_at = latest.max_created
                  WHERE r2.chair_id = $4 AND rs.status != 'COMPLETED'
              );
        "#,
    )
    .bind(chair_id)
    .bind(now)
    .bind(ride_id)
    .bind(chair_id)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn set_evaluation(
    ride_id: &RideId,
    evaluation: i64,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<(), SqliteDatabaseError> {
    sqlx::query("UPDATE rides SET evaluation = $1, updated_at = $2 WHERE id = $3")
        .bind(evaluation)
        .bind(now)
        .bind(ride_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}
