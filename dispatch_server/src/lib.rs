//! # Dispatch server
//! This crate hosts the daemon around the dispatch engine. It is responsible for:
//! * loading configuration from the environment,
//! * preparing the database and running migrations at startup,
//! * wiring up the event hooks,
//! * running the matching worker on its fixed cadence.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more
//! information.

pub mod config;
pub mod errors;
pub mod matching_worker;
pub mod server;
