//! Connection pool construction.
//!
//! The pool is the shared connection handle every customer operation runs on.

use crate::config::{ConnectionArgs, PoolOptions};
use crate::error::{DbError, DbResult};
use sqlx::MySqlPool;
use sqlx::mysql::MySqlPoolOptions;
use tracing::{debug, info, warn};

/// Open a MySQL pool for the configured target.
pub async fn connect(args: &ConnectionArgs, pool_opts: &PoolOptions) -> DbResult<MySqlPool> {
    pool_opts.validate()?;
    let options = args.connect_options()?.charset("utf8mb4");

    info!(
        target_db = %args.masked_url(),
        max_connections = pool_opts.max_connections,
        "Connecting to database"
    );

    let pool = MySqlPoolOptions::new()
        .min_connections(pool_opts.min_connections)
        .max_connections(pool_opts.max_connections)
        .acquire_timeout(pool_opts.acquire_timeout())
        .test_before_acquire(true)
        .connect_with(options)
        .await
        .map_err(|e| {
            DbError::connection(format!("Failed to connect: {}", e), connection_suggestion(&e))
        })?;

    match server_version(&pool).await {
        Ok(version) => info!(version = %version, "Connected successfully"),
        Err(e) => warn!(error = %e, "Connected, but failed to get server version"),
    }

    Ok(pool)
}

/// `SELECT VERSION()` on the pool.
pub async fn server_version(pool: &MySqlPool) -> DbResult<String> {
    let version = sqlx::query_scalar::<_, String>(crate::db::statements::SERVER_VERSION)
        .fetch_one(pool)
        .await?;
    debug!(version = %version, "Got server version");
    Ok(version)
}

/// Generate a helpful suggestion for connection errors.
fn connection_suggestion(error: &sqlx::Error) -> String {
    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") {
        return "Check that the MySQL server is running and accessible (--host/--port)".to_string();
    }

    if error_str.contains("access denied") || error_str.contains("password") {
        return "Verify --user and --password".to_string();
    }

    if error_str.contains("unknown database") {
        return "Check that the database named by --database exists".to_string();
    }

    if error_str.contains("tls") || error_str.contains("ssl") {
        return "Check TLS/SSL configuration or try disabling it".to_string();
    }

    "Verify the connection parameters: --host, --port, --user, --password, --database".to_string()
}
