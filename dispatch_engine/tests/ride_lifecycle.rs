mod support;

use dispatch_engine::db_types::{ChairModel, Coordinate, NewChair, NewRide, RideStatusType};
use dispatch_engine::events::EventProducers;
use dispatch_engine::matching::{CostModel, MatchPlanner, StrategyKind};
use dispatch_engine::{
    FleetApi, FleetApiError, MatchingApi, RideFlowApi, RideFlowError, SqliteDatabase, SqliteDatabaseError,
};
use support::prepare_env::{prepare_test_env, random_db_path};

fn ride_api(db: &SqliteDatabase) -> RideFlowApi<SqliteDatabase> {
    RideFlowApi::new(db.clone(), EventProducers::default())
}

/// Seeds one active, located chair and runs a greedy cycle so a ride can leave `MATCHING`.
async fn assign_a_chair(db: &SqliteDatabase) {
    let fleet = FleetApi::new(db.clone());
    fleet.add_chair_model(ChairModel::new("standard", 2)).await.unwrap();
    let chair = fleet.register_chair(NewChair::new("w1", "standard")).await.unwrap();
    fleet.activate_chair(&chair.id).await.unwrap();
    fleet.record_location(&chair.id, Coordinate::new(0, 0)).await.unwrap();
    let planner = MatchPlanner::new(CostModel::Pickup, StrategyKind::Greedy);
    MatchingApi::new(db.clone(), planner, EventProducers::default()).run_cycle().await.unwrap();
}

fn new_ride(rider: &str) -> NewRide {
    NewRide::new(rider, Coordinate::new(1, 1), Coordinate::new(5, 5))
}

#[tokio::test]
async fn a_new_ride_starts_in_matching() {
    let db = prepare_test_env(&random_db_path()).await;
    let api = ride_api(&db);
    let ride = api.create_ride(new_ride("rider-1")).await.unwrap();
    assert!(ride.chair_id.is_none());
    assert!(ride.evaluation.is_none());
    assert_eq!(api.ride_status(&ride.id).await.unwrap(), RideStatusType::Matching);
    let history = api.status_history(&ride.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, RideStatusType::Matching);
}

#[tokio::test]
async fn one_unfinished_ride_per_rider() {
    let db = prepare_test_env(&random_db_path()).await;
    let api = ride_api(&db);
    api.create_ride(new_ride("rider-1")).await.unwrap();
    let err = api.create_ride(new_ride("rider-1")).await.unwrap_err();
    assert!(matches!(err, RideFlowError::DatabaseError(SqliteDatabaseError::RideInProgress(_))));
    // Another rider is unaffected.
    api.create_ride(new_ride("rider-2")).await.unwrap();
}

#[tokio::test]
async fn the_full_lifecycle_runs_forward_only() {
    let db = prepare_test_env(&random_db_path()).await;
    let api = ride_api(&db);
    let ride = api.create_ride(new_ride("rider-1")).await.unwrap();

    // Nothing can move before the matching engine assigns a chair.
    let err = api.arrive_at_pickup(&ride.id).await.unwrap_err();
    assert!(matches!(
        err,
        RideFlowError::DatabaseError(SqliteDatabaseError::InvalidStatusTransition {
            from: RideStatusType::Matching,
            to: RideStatusType::Pickup,
        })
    ));

    assign_a_chair(&db).await;
    assert_eq!(api.ride_status(&ride.id).await.unwrap(), RideStatusType::Enroute);

    // Skipping the pickup arrival is rejected.
    assert!(api.start_carrying(&ride.id).await.is_err());
    assert!(api.arrive_at_destination(&ride.id).await.is_err());

    api.arrive_at_pickup(&ride.id).await.unwrap();
    assert_eq!(api.ride_status(&ride.id).await.unwrap(), RideStatusType::Pickup);
    // Moving backwards is rejected too.
    assert!(api.arrive_at_pickup(&ride.id).await.is_err());

    api.start_carrying(&ride.id).await.unwrap();
    // Completion before arrival is rejected.
    let err = api.submit_evaluation(&ride.id, 5).await.unwrap_err();
    assert!(matches!(
        err,
        RideFlowError::DatabaseError(SqliteDatabaseError::InvalidStatusTransition {
            from: RideStatusType::Carrying,
            to: RideStatusType::Completed,
        })
    ));

    api.arrive_at_destination(&ride.id).await.unwrap();
    let completed = api.submit_evaluation(&ride.id, 5).await.unwrap();
    assert_eq!(completed.evaluation, Some(5));
    assert_eq!(api.ride_status(&ride.id).await.unwrap(), RideStatusType::Completed);

    // Terminal means terminal.
    assert!(api.arrive_at_pickup(&ride.id).await.is_err());

    // The log now holds the whole forward-only journey, in order, with monotonic timestamps.
    let history = api.status_history(&ride.id).await.unwrap();
    let statuses: Vec<_> = history.iter().map(|e| e.status).collect();
    assert_eq!(statuses, vec![
        RideStatusType::Matching,
        RideStatusType::Enroute,
        RideStatusType::Pickup,
        RideStatusType::Carrying,
        RideStatusType::Arrived,
        RideStatusType::Completed,
    ]);
    for pair in history.windows(2) {
        assert!(pair[0].created_at < pair[1].created_at);
    }
}

#[tokio::test]
async fn evaluations_outside_the_scale_are_rejected() {
    let db = prepare_test_env(&random_db_path()).await;
    let api = ride_api(&db);
    let ride = api.create_ride(new_ride("rider-1")).await.unwrap();
    assign_a_chair(&db).await;
    api.arrive_at_pickup(&ride.id).await.unwrap();
    api.start_carrying(&ride.id).await.unwrap();
    api.arrive_at_destination(&ride.id).await.unwrap();

    for bad in [0, 6, -1] {
        let err = api.submit_evaluation(&ride.id, bad).await.unwrap_err();
        assert!(matches!(err, RideFlowError::InvalidEvaluation(_)));
    }
    // The failed attempts changed nothing.
    assert_eq!(api.ride_status(&ride.id).await.unwrap(), RideStatusType::Arrived);
    api.submit_evaluation(&ride.id, 1).await.unwrap();
}

#[tokio::test]
async fn a_rider_can_ride_again_after_completion() {
    let db = prepare_test_env(&random_db_path()).await;
    let api = ride_api(&db);
    let ride = api.create_ride(new_ride("rider-1")).await.unwrap();
    assign_a_chair(&db).await;
    api.arrive_at_pickup(&ride.id).await.unwrap();
    api.start_carrying(&ride.id).await.unwrap();
    api.arrive_at_destination(&ride.id).await.unwrap();
    api.submit_evaluation(&ride.id, 3).await.unwrap();

    api.create_ride(new_ride("rider-1")).await.unwrap();
}

#[tokio::test]
async fn location_reports_append_and_refresh_the_last_coordinate() {
    let db = prepare_test_env(&random_db_path()).await;
    let fleet = FleetApi::new(db.clone());
    fleet.add_chair_model(ChairModel::new("standard", 2)).await.unwrap();
    let chair = fleet.register_chair(NewChair::new("w1", "standard")).await.unwrap();
    assert_eq!(chair.last_location(), None);

    fleet.record_location(&chair.id, Coordinate::new(3, 4)).await.unwrap();
    fleet.record_location(&chair.id, Coordinate::new(5, 6)).await.unwrap();

    let chair = fleet.fetch_chair(&chair.id).await.unwrap().unwrap();
    assert_eq!(chair.last_location(), Some(Coordinate::new(5, 6)));

    let reports = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM chair_locations WHERE chair_id = $1")
        .bind(&chair.id)
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(reports, 2);
}

#[tokio::test]
async fn fleet_bookkeeping_rejects_bad_input() {
    let db = prepare_test_env(&random_db_path()).await;
    let fleet = FleetApi::new(db.clone());

    let err = fleet.add_chair_model(ChairModel::new("hoverboard", 0)).await.unwrap_err();
    assert!(matches!(err, FleetApiError::NonPositiveSpeed { .. }));

    let err = fleet.register_chair(NewChair::new("w1", "no-such-model")).await.unwrap_err();
    assert!(matches!(err, FleetApiError::DatabaseError(SqliteDatabaseError::UnknownChairModel(_))));

    let ghost = dispatch_engine::db_types::ChairId::random();
    let err = fleet.activate_chair(&ghost).await.unwrap_err();
    assert!(matches!(err, FleetApiError::DatabaseError(SqliteDatabaseError::ChairNotFound(_))));
    let err = fleet.record_location(&ghost, Coordinate::new(0, 0)).await.unwrap_err();
    assert!(matches!(err, FleetApiError::DatabaseError(SqliteDatabaseError::ChairNotFound(_))));
}
