//! Common test utilities for account-service integration tests.
//!
//! Every test gets its own in-memory SQLite database, migrated and seeded
//! from `tests/fixtures/seed.sql` (account 1 = 100, account 2 = 200).

#![allow(dead_code)]

use account_service::config::{AccountConfig, DatabaseConfig};
use account_service::services::{AccountService, Database};
use account_service::startup::Application;
use secrecy::Secret;
use service_core::config::Config as CommonConfig;
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,account_service=debug,sqlx=warn")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub fn seed_script() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/seed.sql")
}

fn test_config() -> AccountConfig {
    AccountConfig {
        common: CommonConfig {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
        },
        service_name: "account-service-test".to_string(),
        service_version: "test".to_string(),
        log_level: "debug".to_string(),
        otlp_endpoint: None,
        database: DatabaseConfig {
            url: Secret::new("sqlite::memory:".to_string()),
            max_connections: 1,
            min_connections: 1,
        },
        seed_script: Some(seed_script()),
    }
}

/// Running application reachable over HTTP.
pub struct TestApp {
    pub address: String,
    pub http_port: u16,
    pub db: Database,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        init_tracing();

        let app = Application::build(test_config())
            .await
            .expect("Failed to build test application");

        let http_port = app.http_port();
        let address = format!("http://127.0.0.1:{}", http_port);
        let db = app.db().clone();

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        let client = reqwest::Client::new();

        // Wait for the server by polling the health endpoint
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;
        }

        TestApp {
            address,
            http_port,
            db,
            client,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Balance read straight from the table, bypassing the service.
    pub async fn balance(&self, account_number: i64) -> i64 {
        balance_of(&self.db, account_number).await
    }
}

/// Service over a fresh seeded database, for tests that skip HTTP.
pub async fn spawn_service() -> (AccountService, Database) {
    init_tracing();

    let db = Database::new("sqlite::memory:", 1, 1)
        .await
        .expect("Failed to open test database");
    db.run_migrations().await.expect("Failed to run migrations");
    db.run_script(&seed_script())
        .await
        .expect("Failed to seed test database");

    let service = AccountService::new(Arc::new(db.clone()));
    (service, db)
}

pub async fn balance_of(db: &Database, account_number: i64) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT balance FROM accounts WHERE account_number = ?")
        .bind(account_number)
        .fetch_one(db.pool())
        .await
        .expect("Failed to read balance")
}

pub async fn account_exists(db: &Database, account_number: i64) -> bool {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM accounts WHERE account_number = ?")
        .bind(account_number)
        .fetch_one(db.pool())
        .await
        .expect("Failed to count accounts")
        > 0
}
