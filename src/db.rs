//! PostgreSQL connection pool handle. Created once at start-up, closed at shutdown.

use crate::config::DatabaseSettings;
use crate::error::AppError;
use crate::repository::{PgRepository, Repository, RepositoryProvider};
use crate::table::Table;
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create the database if missing, then open the pool.
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, AppError> {
        let url = settings.url();
        ensure_database_exists(&url).await?;
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .connect(&url)
            .await?;
        tracing::info!(
            host = %settings.host,
            database = %settings.database,
            max_connections = settings.max_connections,
            "database pool opened"
        );
        Ok(Database { pool })
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Database { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Wait for checked-out connections to return, then close the pool.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("database pool closed");
    }
}

#[async_trait]
impl RepositoryProvider for Database {
    fn repository(&self, table: &'static Table) -> Box<dyn Repository> {
        Box::new(PgRepository::new(self.pool.clone(), table))
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}

/// Connect to the `postgres` maintenance database and create the target database if it is missing.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let opts = PgConnectOptions::from_str(database_url)
        .map_err(|e| AppError::BadRequest(format!("invalid database url: {}", e)))?;
    let db_name = match opts.get_database() {
        Some(name) if !name.is_empty() && name != "postgres" => name.to_string(),
        _ => return Ok(()),
    };
    let mut conn = opts.database("postgres").connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        sqlx::query(&format!("CREATE DATABASE {}", crate::sql::quoted(&db_name)))
            .execute(&mut conn)
            .await?;
        tracing::info!(database = %db_name, "database created");
    }
    Ok(())
}
