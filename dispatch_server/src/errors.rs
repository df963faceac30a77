use dispatch_engine::{MigrateError, SqliteDatabaseError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] SqliteDatabaseError),
    #[error("Migration error: {0}")]
    MigrationError(#[from] MigrateError),
}
