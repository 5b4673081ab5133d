//! Postgres persistence for users and trip requests.

mod trips;
mod users;

use sqlx::postgres::PgPoolOptions;
pub use sqlx::PgPool;
use tracing::info;

use crate::config::DatabaseConfig;

pub use trips::PgTripRequestStore;
pub use users::PgUserRepository;

const UNIQUE_VIOLATION: &str = "23505";

/// Error enumeration shared by every repository implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("record status changed concurrently")]
    StaleStatus,
    #[error("stored record is corrupt: {0}")]
    Corrupt(String),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(value: sqlx::Error) -> Self {
        match &value {
            sqlx::Error::RowNotFound => Self::NotFound,
            sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                Self::Conflict
            }
            _ => Self::Unavailable(value.to_string()),
        }
    }
}

/// Open a lazily-connecting pool; the first query establishes the connection.
pub fn connect(config: &DatabaseConfig) -> Result<PgPool, StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect_lazy(&config.url)?;
    Ok(pool)
}

/// Apply the bundled schema migrations.
pub async fn migrate(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|err| StoreError::Unavailable(format!("migration failed: {err}")))?;
    info!("database schema up to date");
    Ok(())
}
