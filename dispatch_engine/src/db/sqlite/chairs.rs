use chrono::{DateTime, Utc};
use log::trace;
use sqlx::SqliteConnection;
use ulid::Ulid;

use crate::db::sqlite::SqliteDatabaseError;
use crate::db_types::{Chair, ChairId, ChairModel, Coordinate, FreeChair, NewChair};

pub async fn insert_model(model: ChairModel, conn: &mut SqliteConnection) -> Result<(), SqliteDatabaseError> {
    sqlx::query("INSERT INTO chair_models (name, speed) VALUES ($1, $2)")
        .bind(&model.name)
        .bind(model.speed)
        .execute(&mut *conn)
        .await?;
    trace!("🗃️ Chair model {} registered with speed {}", model.name, model.speed);
    Ok(())
}

pub async fn model_exists(name: &str, conn: &mut SqliteConnection) -> Result<bool, SqliteDatabaseError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM chair_models WHERE name = $1")
        .bind(name)
        .fetch_one(&mut *conn)
        .await?;
    Ok(count > 0)
}

pub async fn insert_chair(
    chair: NewChair,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Chair, SqliteDatabaseError> {
    let id = ChairId::random();
    sqlx::query(
        r#"
            INSERT INTO chairs (id, name, model, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, FALSE, $4, $5);
        "#,
    )
    .bind(&id)
    .bind(&chair.name)
    .bind(&chair.model)
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await?;
    Ok(Chair {
        id,
        name: chair.name,
        model: chair.model,
        is_active: false,
        last_latitude: None,
        last_longitude: None,
        created_at: now,
        updated_at: now,
    })
}

pub async fn fetch_chair(id: &ChairId, conn: &mut SqliteConnection) -> Result<Option<Chair>, SqliteDatabaseError> {
    let chair = sqlx::query_as::<_, Chair>(
        r#"
            SELECT id, name, model, is_active, last_latitude, last_longitude, created_at, updated_at
            FROM chairs
            WHERE id = $1;
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(chair)
}

/// Returns the number of rows touched, so callers can distinguish an unknown chair.
pub async fn set_activity(
    id: &ChairId,
    active: bool,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<u64, SqliteDatabaseError> {
    let result = sqlx::query("UPDATE chairs SET is_active = $1, updated_at = $2 WHERE id = $3")
        .bind(active)
        .bind(now)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}

pub async fn insert_location(
    chair_id: &ChairId,
    location: Coordinate,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<(), SqliteDatabaseError> {
    sqlx::query(
        "INSERT INTO chair_locations (id, chair_id, latitude, longitude, created_at) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(Ulid::new().to_string())
    .bind(chair_id)
    .bind(location.latitude)
    .bind(location.longitude)
    .bind(now)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Refreshes the chair's last-known coordinate. Returns the number of rows touched.
pub async fn update_last_location(
    chair_id: &ChairId,
    location: Coordinate,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<u64, SqliteDatabaseError> {
    let result = sqlx::query("UPDATE chairs SET last_latitude = $1, last_longitude = $2, updated_at = $3 WHERE id = $4")
        .bind(location.latitude)
        .bind(location.longitude)
        .bind(now)
        .bind(chair_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}

/// The matching candidates: active chairs with a known location and a positive model speed that
/// are not bound to any ride whose latest status is not `COMPLETED`. Ordered by id so the
/// enumeration order, and with it greedy tie-breaking, is deterministic.
pub async fn free_chairs(conn: &mut SqliteConnection) -> Result<Vec<FreeChair>, SqliteDatabaseError> {
    let chairs = sqlx::query_as::<_, FreeChair>(
        r#"
            SELECT c.id, cm.speed, c.last_latitude AS latitude, c.last_longitude AS longitude
            FROM chairs c
            JOIN chair_models cm ON cm.name = c.model
            WHERE c.is_active = TRUE
              AND c.last_latitude IS NOT NULL
              AND c.last_longitude IS NOT NULL
              AND cm.speed > 0
              AND c.id NOT IN (
                  SELECT r.chair_id
                  FROM rides r
                  JOIN (SELECT ride_id, MAX(created_at) AS max_created FROM ride_statuses GROUP BY ride_id) latest
                    ON latest.ride_id = r.id
                  JOIN ride_statuses rs ON rs.ride_id = r.id AND rs.created_at = latest.max_created
                  WHERE r.chair_id IS NOT NULL AND rs.status != 'COMPLETED'
              )
            ORDER BY c.id ASC;
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;
    trace!("🗃️ {} chairs free for matching", chairs.len());
    Ok(chairs)
}
