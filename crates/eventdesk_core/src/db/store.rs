//! Process-wide store handle and startup lifecycle.
//!
//! # Responsibility
//! - Hold the database location owned by the process.
//! - Ensure the schema once at startup without crashing on failure.
//! - Hand out one fresh connection per logical operation.
//! - Report store health for front-end health checks.
//!
//! # Invariants
//! - Startup schema failures are logged and reported as `Degraded`, never
//!   propagated as a panic.
//! - Connections are never cached; each operation drops its own.

use super::migrations::{current_user_version, latest_version};
use super::open::{open_configured, open_db};
use super::DbResult;
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use rusqlite::Connection;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Result of the startup schema step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreStatus {
    /// Schema is at the latest version and the store is reachable.
    Ready,
    /// Schema could not be ensured; operations will fail until it can.
    Degraded { reason: String },
}

impl StoreStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// Store-access capability passed explicitly to every operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    /// Creates a handle for the database file at `path`.
    ///
    /// Does not touch the filesystem; see [`bootstrap_store`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Database file location.
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// Opens one connection for a single logical operation.
    ///
    /// The connection is released when dropped, on every exit path.
    pub fn connect(&self) -> DbResult<Connection> {
        open_configured(self.path.as_path())
    }

    /// Ensures the schema idempotently by running pending migrations.
    pub fn ensure_schema(&self) -> DbResult<()> {
        let conn = open_db(self.path.as_path())?;
        drop(conn);
        Ok(())
    }

    /// Checks the store and reports health metadata.
    ///
    /// Never fails: connectivity problems become an `unhealthy` report.
    pub fn health(&self) -> StoreHealth {
        let checked_at = Utc::now();
        let database = match self.inspect() {
            Ok(database) => database,
            Err(err) => {
                warn!(
                    "event=store_health module=db status=error error_code=store_unreachable error={err}"
                );
                DatabaseHealth {
                    status: HealthState::Unhealthy,
                    connected: false,
                    path: self.path.display().to_string(),
                    sqlite_version: None,
                    schema_version: None,
                    latest_schema_version: latest_version(),
                    server_time: None,
                    error: Some(err.to_string()),
                }
            }
        };

        let overall_status = match database.status {
            HealthState::Healthy => HealthState::Healthy,
            HealthState::Degraded | HealthState::Unhealthy => HealthState::Degraded,
        };

        StoreHealth {
            overall_status,
            checked_at,
            database,
        }
    }

    fn inspect(&self) -> DbResult<DatabaseHealth> {
        let conn = self.connect()?;
        let (sqlite_version, server_time): (String, String) = conn.query_row(
            "SELECT sqlite_version(), strftime('%Y-%m-%dT%H:%M:%fZ', 'now');",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        let schema_version = current_user_version(&conn)?;
        let latest = latest_version();

        let (status, error) = if schema_version == latest {
            (HealthState::Healthy, None)
        } else {
            (
                HealthState::Degraded,
                Some(format!(
                    "schema version {schema_version} does not match expected {latest}"
                )),
            )
        };

        Ok(DatabaseHealth {
            status,
            connected: true,
            path: self.path.display().to_string(),
            sqlite_version: Some(sqlite_version),
            schema_version: Some(schema_version),
            latest_schema_version: latest,
            server_time: Some(server_time),
            error,
        })
    }
}

/// Health classification used in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Database section of a health report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseHealth {
    pub status: HealthState,
    pub connected: bool,
    pub path: String,
    pub sqlite_version: Option<String>,
    pub schema_version: Option<u32>,
    pub latest_schema_version: u32,
    /// Store clock as reported by SQLite, RFC 3339 UTC.
    pub server_time: Option<String>,
    pub error: Option<String>,
}

/// Full health report. `overall_status` is `healthy` or `degraded`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreHealth {
    pub overall_status: HealthState,
    pub checked_at: DateTime<Utc>,
    pub database: DatabaseHealth,
}

/// Ensures the store schema at process start.
///
/// Returns the handle together with the outcome. A failure is logged and
/// reported as [`StoreStatus::Degraded`] so callers can keep serving health
/// checks instead of exiting.
pub fn bootstrap_store(path: impl Into<PathBuf>) -> (Store, StoreStatus) {
    let started_at = Instant::now();
    let store = Store::new(path);
    info!("event=store_bootstrap module=db status=start");

    if let Some(parent) = store.path().parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(err) = std::fs::create_dir_all(parent) {
                error!(
                    "event=store_bootstrap module=db status=error duration_ms={} error_code=store_dir_failed error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                let reason = format!(
                    "failed to create database directory `{}`: {err}",
                    parent.display()
                );
                return (store, StoreStatus::Degraded { reason });
            }
        }
    }

    match store.ensure_schema() {
        Ok(()) => {
            info!(
                "event=store_bootstrap module=db status=ok duration_ms={} schema_version={}",
                started_at.elapsed().as_millis(),
                latest_version()
            );
            (store, StoreStatus::Ready)
        }
        Err(err) => {
            error!(
                "event=store_bootstrap module=db status=error duration_ms={} error_code=schema_ensure_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            let reason = err.to_string();
            (store, StoreStatus::Degraded { reason })
        }
    }
}
