//! Flight configuration key/value storage.
//!
//! # Responsibility
//! - Read and upsert rows of the `flight_config` table.
//!
//! # Invariants
//! - One row per key; writes replace the value and bump `updated_at`.

use crate::model::flight::FlightConfigKey;
use crate::repo::booking_repo::{RepoError, RepoResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

/// One stored configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

/// Repository interface for flight configuration values.
pub trait FlightConfigRepository {
    fn get_entry(&self, key: FlightConfigKey) -> RepoResult<Option<ConfigEntry>>;
    fn set_value(
        &self,
        key: FlightConfigKey,
        value: &str,
        updated_at: DateTime<Utc>,
    ) -> RepoResult<()>;
    /// Returns all stored entries sorted by key.
    fn list_entries(&self) -> RepoResult<Vec<ConfigEntry>>;
}

/// SQLite-backed flight configuration repository.
pub struct SqliteFlightConfigRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFlightConfigRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl FlightConfigRepository for SqliteFlightConfigRepository<'_> {
    fn get_entry(&self, key: FlightConfigKey) -> RepoResult<Option<ConfigEntry>> {
        let row = self
            .conn
            .query_row(
                "SELECT key, value, updated_at FROM flight_config WHERE key = ?1;",
                [key.as_str()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(key, value, updated_ms)| to_entry(key, value, updated_ms))
            .transpose()
    }

    fn set_value(
        &self,
        key: FlightConfigKey,
        value: &str,
        updated_at: DateTime<Utc>,
    ) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO flight_config (key, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key.as_str(), value, updated_at.timestamp_millis()],
        )?;
        Ok(())
    }

    fn list_entries(&self) -> RepoResult<Vec<ConfigEntry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, value, updated_at FROM flight_config ORDER BY key ASC;")?;
        let mut rows = stmt.query([])?;
        let mut entries = Vec::new();

        while let Some(row) = rows.next()? {
            entries.push(to_entry(row.get(0)?, row.get(1)?, row.get(2)?)?);
        }

        Ok(entries)
    }
}

fn to_entry(key: String, value: String, updated_ms: i64) -> RepoResult<ConfigEntry> {
    let updated_at = DateTime::from_timestamp_millis(updated_ms).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid timestamp `{updated_ms}` in flight_config.updated_at"
        ))
    })?;
    Ok(ConfigEntry {
        key,
        value,
        updated_at,
    })
}
