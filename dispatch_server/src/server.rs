use std::{future::Future, pin::Pin};

use dispatch_engine::events::{EventHandlers, EventHooks};
use dispatch_engine::matching::MatchPlanner;
use dispatch_engine::SqliteDatabase;
use log::*;

use crate::{config::ServerConfig, errors::ServerError, matching_worker::start_matching_worker};

/// Buffer size for the event channels. Assignment bursts larger than this just apply
/// backpressure on the publishing cycle.
const EVENT_BUFFER_SIZE: usize = 100;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    SqliteDatabase::create_if_missing(&config.database_url).await?;
    let db = SqliteDatabase::new_with_url(&config.database_url, config.max_db_connections).await?;
    db.run_migrations().await?;
    info!("🚀️ Database ready at {}", config.database_url);

    let mut hooks = EventHooks::default();
    hooks.on_ride_assigned(|ev| {
        Box::pin(async move {
            match serde_json::to_string(&ev) {
                Ok(json) => info!("🚀️ Assignment committed: {json}"),
                Err(e) => warn!("🚀️ Could not serialise assignment event: {e}"),
            }
        }) as Pin<Box<dyn Future<Output = ()> + Send>>
    });
    let handlers = EventHandlers::new(EVENT_BUFFER_SIZE, hooks);
    let producers = handlers.producers();
    handlers.start_handlers().await;

    let planner = MatchPlanner::new(config.cost_model, config.strategy);
    info!("🚀️ Matching with the {} strategy and the {} cost model", config.strategy, config.cost_model);
    let worker = start_matching_worker(db, producers, planner, config.match_interval);

    info!("🚀️ Dispatch server is running. Press Ctrl-C to stop.");
    tokio::signal::ctrl_c().await.ok();
    info!("🚀️ Shutting down");
    worker.abort();
    Ok(())
}
