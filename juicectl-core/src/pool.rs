//! Database connection pool management
//!
//! Uses sqlx PgPool with explicit connection limits. Every command opens the
//! pool once, uses it serially and closes it before the process exits.

use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use tracing::debug;

use crate::config::DbConfig;
use crate::Result;

/// Explicitly constructed, explicitly closed handle to the shop database.
#[derive(Debug, Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Open a pool against the configured database.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is malformed or the first connection fails.
    pub async fn connect(config: &DbConfig) -> Result<Self> {
        let options = connect_options(config)?;
        debug!(db = %config.describe(), "connecting to database");

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Wrap an existing pool (used by tests that receive one from `sqlx::test`)
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Wait for checked-out connections to return, then close them all.
    pub async fn close(self) {
        self.pool.close().await;
        debug!("database pool closed");
    }
}

/// Translate config into sqlx connect options.
///
/// `DATABASE_URL` wins over the individual fields when present.
pub fn connect_options(config: &DbConfig) -> Result<PgConnectOptions> {
    if let Some(url) = &config.url {
        return Ok(PgConnectOptions::from_str(url)?);
    }

    let mut options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .database(&config.database)
        .username(&config.user);
    if !config.password.is_empty() {
        options = options.password(&config.password);
    }
    Ok(options)
}

/// Connect, run `op`, and close the pool on success and failure alike.
///
/// The handle passed to `op` shares the pool with the one closed here, so
/// nothing `op` does can outlive the call.
///
/// # Example
///
/// ```ignore
/// let counts = with_database(&config, |db| async move {
///     repos::catalog::counts(db.pool()).await
/// })
/// .await?;
/// ```
pub async fn with_database<T, F, Fut>(config: &DbConfig, op: F) -> Result<T>
where
    F: FnOnce(Database) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let db = Database::connect(config).await?;
    let handle = db.clone();
    let result = op(db).await;
    handle.close().await;
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_options_from_fields() {
        let config = DbConfig {
            host: "db.internal".to_string(),
            port: 6543,
            database: "shop".to_string(),
            user: "ops".to_string(),
            ..DbConfig::default()
        };
        let options = connect_options(&config).expect("options");
        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 6543);
        assert_eq!(options.get_database(), Some("shop"));
        assert_eq!(options.get_username(), "ops");
    }

    #[test]
    fn connect_options_prefers_url() {
        let config = DbConfig {
            url: Some("postgres://alice@urlhost:7000/other".to_string()),
            ..DbConfig::default()
        };
        let options = connect_options(&config).expect("options");
        assert_eq!(options.get_host(), "urlhost");
        assert_eq!(options.get_port(), 7000);
        assert_eq!(options.get_database(), Some("other"));
    }

    #[test]
    fn connect_options_rejects_bad_url() {
        let config = DbConfig {
            url: Some("not a url".to_string()),
            ..DbConfig::default()
        };
        assert!(connect_options(&config).is_err());
    }

    #[tokio::test]
    async fn with_database_reports_connection_failure() {
        // Nothing listens on port 1; the closure must never run.
        let config = DbConfig {
            port: 1,
            acquire_timeout_secs: 2,
            ..DbConfig::default()
        };
        let result = with_database(&config, |_db| async { Ok(()) }).await;
        assert!(matches!(result, Err(crate::Error::Database(_))));
    }

    // Integration tests require a real database
    // Run with: DATABASE_URL=postgres://... cargo test -p juicectl-core -- --ignored

    #[sqlx::test(migrations = false)]
    #[ignore = "requires database"]
    async fn pool_acquires_connection(pool: PgPool) {
        let db = Database::from_pool(pool);
        let result: (i32,) = sqlx::query_as("SELECT 1")
            .fetch_one(db.pool())
            .await
            .expect("query failed");
        assert_eq!(result.0, 1);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn with_database_closes_pool_after_error() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let config = DbConfig {
            url: Some(url),
            ..DbConfig::default()
        };

        let mut leaked = None;
        let result: Result<()> = with_database(&config, |db| {
            leaked = Some(db.clone());
            async move {
                sqlx::query("SELECT * FROM table_that_does_not_exist")
                    .execute(db.pool())
                    .await?;
                Ok::<_, crate::Error>(())
            }
        })
        .await;

        assert!(result.is_err());
        assert!(leaked.expect("closure ran").pool().is_closed());
    }
}
