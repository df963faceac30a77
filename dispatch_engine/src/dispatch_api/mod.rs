//! # Dispatch engine public API
//!
//! The `dispatch_api` module exposes the programmatic API for the dispatch engine. The API is
//! modular, so clients can pick the functionality they need, and every API is generic over the
//! database backend trait it requires.
//!
//! * [`matching_api`] runs matching cycles: the periodic pairing of waiting rides with free
//!   chairs.
//! * [`ride_flow_api`] is the ride-side API: creating rides, progressing them through their
//!   lifecycle, and recording evaluations.
//! * [`fleet_api`] is the chair-side API: models, registration, activity and location reports.
//!
//! The pattern for using the APIs is the same everywhere: construct the API with a database
//! backend that implements the trait the API needs.
//!
//! ```rust,ignore
//! use dispatch_engine::{MatchingApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url("sqlite://data/dispatch.db", 10).await?;
//! // SqliteDatabase implements DispatchDatabase
//! let api = MatchingApi::new(db, planner, producers);
//! let report = api.run_cycle().await?;
//! ```

pub mod errors;
pub mod fleet_api;
pub mod matching_api;
pub mod ride_flow_api;
