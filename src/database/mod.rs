//! Database connection and management module
//!
//! Builds the PostGIS connection pool from [`DatabaseConfig`], applies the
//! embedded schema and hands out the Postgres-backed user store.

use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::config::{DatabaseConfig, SslMode};

pub mod user_repository;

pub use user_repository::PgUserStore;

/// Schema for `users` and `geofences`, applied by [`DatabaseManager::run_migrations`]
pub const SCHEMA_SQL: &str = include_str!("../../migrations/001_geofence_schema.sql");

impl From<SslMode> for PgSslMode {
    fn from(mode: SslMode) -> Self {
        match mode {
            SslMode::Disable => PgSslMode::Disable,
            SslMode::Allow => PgSslMode::Allow,
            SslMode::Prefer => PgSslMode::Prefer,
            SslMode::Require => PgSslMode::Require,
            SslMode::VerifyCa => PgSslMode::VerifyCa,
            SslMode::VerifyFull => PgSslMode::VerifyFull,
        }
    }
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> PgConnectOptions {
        let options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
            .ssl_mode(self.ssl_mode.into());

        match self.statement_timeout {
            Some(timeout) => options.options([(
                "statement_timeout",
                format!("{}ms", timeout.as_millis()),
            )]),
            None => options,
        }
    }
}

/// Database connection manager
pub struct DatabaseManager {
    pool: PgPool,
}

impl DatabaseManager {
    /// Create a new database manager with the given configuration
    pub async fn new(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        info!("Connecting to database: {}", config.display_target());

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(config.connect_options())
            .await
            .map_err(|e| {
                warn!("Failed to connect to database: {}", e);
                e
            })?;

        info!("Database connection pool created successfully");

        Ok(Self { pool })
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create a Postgres-backed user store sharing this pool
    pub fn user_store(&self) -> PgUserStore {
        PgUserStore::new(self.pool.clone())
    }

    /// Test database connectivity
    pub async fn test_connection(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| ())
    }

    /// Apply the embedded schema; safe to run repeatedly
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        info!("Running database migrations");
        sqlx::raw_sql(SCHEMA_SQL).execute(&self.pool).await?;

        let postgis: String = sqlx::query_scalar("SELECT postgis_lib_version()")
            .fetch_one(&self.pool)
            .await?;
        info!("Schema ready (PostGIS {})", postgis);
        Ok(())
    }

    /// Close the pool, waiting for checked-out connections to be returned
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
