//! Shared request state.
//!
//! # Responsibility
//! - Carry the database location and the flight configuration loaded at
//!   startup into every handler.
//! - Run blocking SQLite work off the async executor.
//!
//! # Invariants
//! - Flight configuration is immutable for the lifetime of the process.
//! - Every database operation uses its own connection.

use crate::error::{ApiError, ServerError};
use azalea_core::db::open_db;
use azalea_core::{FlightConfig, FlightConfigService, SqliteFlightConfigRepository};
use log::info;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct AppState {
    db_path: Arc<PathBuf>,
    flight: Option<Arc<FlightConfig>>,
}

impl AppState {
    pub fn new(db_path: impl Into<PathBuf>, flight: Option<FlightConfig>) -> Self {
        Self {
            db_path: Arc::new(db_path.into()),
            flight: flight.map(Arc::new),
        }
    }

    /// Opens (and migrates) the database, then loads flight configuration.
    pub fn load(db_path: impl AsRef<Path>) -> Result<Self, ServerError> {
        let db_path = db_path.as_ref();
        let conn = open_db(db_path)?;
        let flight = FlightConfigService::new(SqliteFlightConfigRepository::new(&conn)).load()?;

        match &flight {
            Some(config) => info!(
                "event=flight_config_load module=server status=ok configured=true flight={} departure={}",
                config.flight_number, config.departure_date
            ),
            None => info!("event=flight_config_load module=server status=ok configured=false"),
        }

        Ok(Self::new(db_path, flight))
    }

    pub fn flight(&self) -> Option<&FlightConfig> {
        self.flight.as_deref()
    }

    /// Shared handle for moving the configuration into blocking work.
    pub fn flight_handle(&self) -> Option<Arc<FlightConfig>> {
        self.flight.clone()
    }

    /// Runs `op` against a fresh connection on the blocking thread pool.
    pub async fn with_db<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, ApiError> + Send + 'static,
    {
        let db_path = Arc::clone(&self.db_path);
        tokio::task::spawn_blocking(move || {
            let conn = open_db(db_path.as_path())?;
            op(&conn)
        })
        .await
        .map_err(|err| ApiError::storage(format!("blocking task failed: {err}")))?
    }
}
