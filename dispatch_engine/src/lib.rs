//! Dispatch Engine
//!
//! The dispatch engine is the core of the chair dispatch service: it pairs rides awaiting
//! assignment with free chairs, on a fixed external cadence, entirely through the relational
//! store. This library contains the engine's full logic and is HTTP-agnostic.
//!
//! The library is divided into three main sections:
//! 1. Database management and control ([`mod@db`]). SQLite is the supported backend. You should
//!    never need to access the database directly; use the public API instead. The exception is
//!    the data types used in the database, which are defined in [`db_types`] and are public.
//! 2. The matching planner ([`matching`]): the pure half of the engine. Cost models, the ride ×
//!    chair cost matrix, and the pluggable assignment strategies (greedy nearest-first and
//!    optimal Kuhn-Munkres).
//! 3. The public API ([`mod@dispatch_api`]): matching cycles, ride lifecycle flows and fleet
//!    bookkeeping, each generic over the backend traits it needs.
//!
//! The engine also emits events when rides are assigned or completed. A simple handler framework
//! lets you hook into these events and perform custom actions; see [`events`].
mod db;

pub mod db_types;
mod dispatch_api;
pub mod events;
pub mod matching;

#[cfg(feature = "sqlite")]
pub use db::sqlite::SqliteDatabase;
pub use db::common::{
    AssignedPair,
    CycleOutcome,
    CycleReport,
    DispatchDatabase,
    FleetManagement,
    RideManagement,
};
#[cfg(feature = "sqlite")]
pub use db::sqlite::SqliteDatabaseError;
pub use sqlx::migrate::MigrateError;
pub use dispatch_api::{
    errors::{FleetApiError, MatchingApiError, RideFlowError},
    fleet_api::FleetApi,
    matching_api::MatchingApi,
    ride_flow_api::RideFlowApi,
};
