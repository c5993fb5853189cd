use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config;
use crate::store::collection::Collection;
use crate::store::names;

/// Errors from the document store layer
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid collection name: {0}")]
    InvalidCollectionName(String),

    #[error("Invalid field name: {0}")]
    InvalidFieldName(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Handle to the document store. Built once at startup and handed to every
/// handler through the router state; the inner pool is cheaply cloneable and
/// safe for concurrent use.
#[derive(Clone)]
pub struct StoreClient {
    pool: PgPool,
}

impl StoreClient {
    /// Local development default; any real deployment sets DATABASE_URL.
    const DEFAULT_DATABASE_URL: &'static str = "postgres://localhost:5432/kotha";

    /// Build the client from `DATABASE_URL`. The pool connects lazily, so
    /// this succeeds even while the database is still coming up; operations
    /// fail individually until it does.
    pub fn connect() -> Result<Self, StoreError> {
        let url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| Self::DEFAULT_DATABASE_URL.to_string());

        let store_cfg = &config::config().store;
        let pool = PgPoolOptions::new()
            .max_connections(store_cfg.max_connections)
            .acquire_timeout(Duration::from_secs(store_cfg.connect_timeout_secs))
            .connect_lazy(&url)?;

        Ok(Self { pool })
    }

    /// Create the backing table for every named collection. Documents live
    /// in a JSONB column keyed by a server-generated UUID, with the creation
    /// instant alongside for time ordering.
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        for name in names::ALL {
            let ddl = format!(
                "CREATE TABLE IF NOT EXISTS \"{}\" (\
                 id UUID PRIMARY KEY, \
                 doc JSONB NOT NULL, \
                 created_at TIMESTAMPTZ NOT NULL DEFAULT now())",
                name
            );
            sqlx::query(&ddl).execute(&self.pool).await?;
        }
        info!("store schema ready ({} collections)", names::ALL.len());
        Ok(())
    }

    /// Scope operations to a named collection.
    pub fn collection(&self, name: &str) -> Result<Collection, StoreError> {
        if !Self::is_valid_collection_name(name) {
            return Err(StoreError::InvalidCollectionName(name.to_string()));
        }
        Ok(Collection::new(name, self.pool.clone()))
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Collection names are interpolated into SQL identifiers, so only the
    /// known collections pass.
    fn is_valid_collection_name(name: &str) -> bool {
        names::ALL.contains(&name)
    }
}
