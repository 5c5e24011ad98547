//! Database service for account-service.
//!
//! `Database` owns the SQLite pool and the startup chores (migrations, seed
//! script, health check). The statement functions below take a connection so
//! the caller decides the transaction boundary.

use crate::models::{Account, AccountError};
use crate::services::metrics::DB_QUERY_DURATION;
use service_core::error::AppError;
use sqlx::error::DatabaseError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, Transaction};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database connection pool.
    ///
    /// An in-memory database lives only as long as its connection, so it is
    /// pinned to a single connection that is never recycled.
    #[instrument(skip(database_url), fields(service = "account-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        let in_memory = is_in_memory(database_url);

        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            in_memory = in_memory,
            "Connecting to SQLite"
        );

        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!("Invalid DATABASE_URL: {}", e)))?
            .create_if_missing(true);

        let mut pool_options = SqlitePoolOptions::new().acquire_timeout(Duration::from_secs(30));

        pool_options = if in_memory {
            pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            pool_options
                .max_connections(max_connections)
                .min_connections(min_connections)
                .idle_timeout(Duration::from_secs(600))
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("SQLite connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    /// Execute a SQL script, typically seed data, statement by statement.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn run_script(&self, path: &Path) -> Result<(), AppError> {
        let script = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!(
                "Failed to read SQL script {}: {}",
                path.display(),
                e
            ))
        })?;

        sqlx::raw_sql(&script)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("SQL script failed: {}", e)))?;

        info!("SQL script applied");
        Ok(())
    }

    /// Begin a transaction. Dropping it without commit rolls it back.
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>, AccountError> {
        Ok(self.pool.begin().await?)
    }
}

// -------------------------------------------------------------------------
// Account statements
// -------------------------------------------------------------------------

/// Fetch a single account.
#[instrument(skip(conn))]
pub async fn find_account(
    conn: &mut SqliteConnection,
    account_number: i64,
) -> Result<Option<Account>, AccountError> {
    let timer = DB_QUERY_DURATION
        .with_label_values(&["find_account"])
        .start_timer();

    let account = sqlx::query_as::<_, Account>(
        r#"
        SELECT account_number, balance
        FROM accounts
        WHERE account_number = ?
        "#,
    )
    .bind(account_number)
    .fetch_optional(conn)
    .await?;

    timer.observe_duration();

    Ok(account)
}

/// All account numbers in ascending order.
#[instrument(skip(conn))]
pub async fn list_account_numbers(conn: &mut SqliteConnection) -> Result<Vec<i64>, AccountError> {
    let timer = DB_QUERY_DURATION
        .with_label_values(&["list_account_numbers"])
        .start_timer();

    let numbers = sqlx::query_scalar::<_, i64>(
        "SELECT account_number FROM accounts ORDER BY account_number",
    )
    .fetch_all(conn)
    .await?;

    timer.observe_duration();

    Ok(numbers)
}

/// Add `delta` to an account balance and return the updated row, or `None`
/// if no row was changed: the account does not exist, or a positive `delta`
/// would push the balance past `i64::MAX`.
///
/// A negative result trips the `balance >= 0` check and surfaces as
/// [`AccountError::Overdraft`]; the caller's transaction must then be rolled
/// back.
#[instrument(skip(conn))]
pub async fn adjust_balance(
    conn: &mut SqliteConnection,
    account_number: i64,
    delta: i64,
) -> Result<Option<Account>, AccountError> {
    let timer = DB_QUERY_DURATION
        .with_label_values(&["adjust_balance"])
        .start_timer();

    let account = sqlx::query_as::<_, Account>(
        r#"
        UPDATE accounts
        SET balance = balance + ?
        WHERE account_number = ?
          AND (? <= 0 OR balance <= 9223372036854775807 - ?)
        RETURNING account_number, balance
        "#,
    )
    .bind(delta)
    .bind(account_number)
    .bind(delta)
    .bind(delta)
    .fetch_optional(conn)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if is_balance_violation(&**db_err) => {
            debug!(account_number, delta, "Balance constraint rejected update");
            AccountError::Overdraft(account_number)
        }
        _ => AccountError::Database(e),
    })?;

    timer.observe_duration();

    Ok(account)
}

/// Delete an account. Returns whether a row was removed.
#[instrument(skip(conn))]
pub async fn delete_account(
    conn: &mut SqliteConnection,
    account_number: i64,
) -> Result<bool, AccountError> {
    let timer = DB_QUERY_DURATION
        .with_label_values(&["delete_account"])
        .start_timer();

    let result = sqlx::query("DELETE FROM accounts WHERE account_number = ?")
        .bind(account_number)
        .execute(conn)
        .await?;

    timer.observe_duration();

    Ok(result.rows_affected() > 0)
}

/// `sqlite::memory:` and `sqlite:file:name?mode=memory` style URLs.
fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

fn is_balance_violation(err: &dyn DatabaseError) -> bool {
    err.is_check_violation() || err.message().contains("CHECK constraint failed")
}
