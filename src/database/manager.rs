use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the data store
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Duplicate value for {0}")]
    Conflict(String),

    #[error("Referenced record does not exist")]
    InvalidReference,

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Fixture error: {0}")]
    Fixture(String),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return DatabaseError::Conflict(db.constraint().unwrap_or("unique key").to_string());
            }
            if db.is_foreign_key_violation() {
                return DatabaseError::InvalidReference;
            }
        }
        DatabaseError::Sqlx(err)
    }
}

/// Open the connection pool described by the configuration.
pub async fn connect(url: &str, config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connection_timeout))
        .connect(url)
        .await?;

    info!("Created database pool (max {} connections)", config.max_connections);
    Ok(pool)
}

/// Apply pending migrations from `migrations/`.
pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}

/// Pings the pool to ensure connectivity
pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
