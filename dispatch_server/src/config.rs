use std::{env, time::Duration};

use dispatch_engine::matching::{CostModel, StrategyKind};
use log::*;

const DEFAULT_DATABASE_URL: &str = "sqlite://data/dispatch.db";
const DEFAULT_MATCH_INTERVAL_MS: u64 = 500;
const DEFAULT_MAX_DB_CONNECTIONS: u32 = 25;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub database_url: String,
    pub max_db_connections: u32,
    /// How often the matching worker runs one cycle. The worker tolerates a cycle overrunning
    /// the interval; the next tick simply runs late.
    pub match_interval: Duration,
    /// Which assignment strategy the matching engine uses for the life of the process.
    pub strategy: StrategyKind,
    pub cost_model: CostModel,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_db_connections: DEFAULT_MAX_DB_CONNECTIONS,
            match_interval: Duration::from_millis(DEFAULT_MATCH_INTERVAL_MS),
            strategy: StrategyKind::default(),
            cost_model: CostModel::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env_or_default() -> Self {
        let database_url = env::var("DISPATCH_DATABASE_URL").ok().unwrap_or_else(|| {
            info!("🪛️ DISPATCH_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.into()
        });
        let max_db_connections = env::var("DISPATCH_MAX_DB_CONNECTIONS")
            .map(|s| {
                s.parse::<u32>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid value for DISPATCH_MAX_DB_CONNECTIONS. {e} Using the default, \
                         {DEFAULT_MAX_DB_CONNECTIONS}, instead."
                    );
                    DEFAULT_MAX_DB_CONNECTIONS
                })
            })
            .unwrap_or(DEFAULT_MAX_DB_CONNECTIONS);
        let match_interval = env::var("DISPATCH_MATCH_INTERVAL_MS")
            .map(|s| {
                s.parse::<u64>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid value for DISPATCH_MATCH_INTERVAL_MS. {e} Using the default, \
                         {DEFAULT_MATCH_INTERVAL_MS}, instead."
                    );
                    DEFAULT_MATCH_INTERVAL_MS
                })
            })
            .map(Duration::from_millis)
            .unwrap_or_else(|_| Duration::from_millis(DEFAULT_MATCH_INTERVAL_MS));
        let strategy = env::var("DISPATCH_MATCHING_STRATEGY")
            .map(|s| {
                s.parse::<StrategyKind>().unwrap_or_else(|e| {
                    error!("🪛️ {e} Using the default, {}, instead.", StrategyKind::default());
                    StrategyKind::default()
                })
            })
            .unwrap_or_default();
        let cost_model = env::var("DISPATCH_COST_MODEL")
            .map(|s| {
                s.parse::<CostModel>().unwrap_or_else(|e| {
                    error!("🪛️ {e} Using the default, {}, instead.", CostModel::default());
                    CostModel::default()
                })
            })
            .unwrap_or_default();
        Self { database_url, max_db_connections, match_interval, strategy, cost_model }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = ServerConfig::default();
        assert_eq!(config.match_interval, Duration::from_millis(500));
        assert_eq!(config.strategy, StrategyKind::Greedy);
        assert_eq!(config.cost_model, CostModel::Pickup);
        assert!(config.max_db_connections > 0);
    }
}
