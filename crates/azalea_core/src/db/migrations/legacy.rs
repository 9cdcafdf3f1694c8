//! Adoption of databases written before schema versioning existed.
//!
//! # Responsibility
//! - Detect `rsvp` / `flight_config` tables present at `user_version = 0`.
//! - Move them aside before the versioned schema is created, then copy
//!   their rows across with timestamps converted to epoch milliseconds.
//!
//! # Invariants
//! - Runs inside the caller's migration transaction; any failure leaves the
//!   file untouched.
//! - Emails are stored trimmed and lowercased; for repeated emails only the
//!   earliest row (lowest id) is kept.
//! - A timestamp that cannot be parsed aborts the import.

use crate::db::{DbError, DbResult};
use log::{info, warn};
use rusqlite::Connection;

const LEGACY_RSVP: &str = "legacy_rsvp";
const LEGACY_FLIGHT_CONFIG: &str = "legacy_flight_config";

/// `CURRENT_TIMESTAMP` text (UTC) to epoch milliseconds; NULL when unparsable.
fn millis_sql(column: &str) -> String {
    format!("CAST(ROUND((julianday({column}) - 2440587.5) * 86400000.0) AS INTEGER)")
}

/// Tables found at version 0 and set aside for import.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(super) struct LegacyTables {
    rsvp: bool,
    flight_config: bool,
}

impl LegacyTables {
    pub(super) fn is_empty(self) -> bool {
        !self.rsvp && !self.flight_config
    }
}

/// Renames unversioned tables out of the way of migration `0001`.
pub(super) fn set_aside(conn: &Connection) -> DbResult<LegacyTables> {
    let mut found = LegacyTables::default();

    if table_exists(conn, "rsvp")? {
        if !column_exists(conn, "rsvp", "special_dietary_details")? {
            conn.execute_batch("ALTER TABLE rsvp ADD COLUMN special_dietary_details TEXT;")?;
        }
        conn.execute_batch(&format!("ALTER TABLE rsvp RENAME TO {LEGACY_RSVP};"))?;
        found.rsvp = true;
    }
    if table_exists(conn, "flight_config")? {
        conn.execute_batch(&format!(
            "ALTER TABLE flight_config RENAME TO {LEGACY_FLIGHT_CONFIG};"
        ))?;
        found.flight_config = true;
    }

    Ok(found)
}

/// Copies set-aside rows into the versioned tables and drops the originals.
pub(super) fn import(conn: &Connection, tables: LegacyTables) -> DbResult<()> {
    let mut bookings = 0;
    let mut skipped = 0;
    let mut entries = 0;

    if tables.rsvp {
        ensure_timestamps_parse(conn, LEGACY_RSVP, "date_created")?;
        let total = count_rows(conn, LEGACY_RSVP)?;
        bookings = conn.execute(
            &format!(
                "INSERT OR IGNORE INTO rsvp
                    (id, email, dietary_option, special_dietary_details, event_date, date_created)
                 SELECT id, lower(trim(email)), dietary_option, special_dietary_details,
                        event_date, {}
                 FROM {LEGACY_RSVP}
                 ORDER BY id ASC;",
                millis_sql("date_created")
            ),
            [],
        )?;
        skipped = total.saturating_sub(bookings);
        conn.execute_batch(&format!("DROP TABLE {LEGACY_RSVP};"))?;
    }

    if tables.flight_config {
        ensure_timestamps_parse(conn, LEGACY_FLIGHT_CONFIG, "updated_at")?;
        entries = conn.execute(
            &format!(
                "INSERT INTO flight_config (key, value, updated_at)
                 SELECT key, value, {}
                 FROM {LEGACY_FLIGHT_CONFIG};",
                millis_sql("updated_at")
            ),
            [],
        )?;
        conn.execute_batch(&format!("DROP TABLE {LEGACY_FLIGHT_CONFIG};"))?;
    }

    if skipped > 0 {
        warn!(
            "event=db_legacy_import module=db status=dedup skipped_duplicate_emails={skipped}"
        );
    }
    info!(
        "event=db_legacy_import module=db status=ok bookings={bookings} config_entries={entries}"
    );
    Ok(())
}

fn ensure_timestamps_parse(conn: &Connection, table: &str, column: &str) -> DbResult<()> {
    let sql = format!(
        "SELECT CAST({column} AS TEXT) FROM {table}
         WHERE {column} IS NULL OR julianday({column}) IS NULL
         LIMIT 1;"
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    if let Some(row) = rows.next()? {
        let raw: Option<String> = row.get(0)?;
        return Err(DbError::LegacyData(format!(
            "{table}.{column} holds unparsable timestamp `{}`",
            raw.unwrap_or_else(|| "NULL".to_string())
        )));
    }
    Ok(())
}

fn count_rows(conn: &Connection, table: &str) -> DbResult<usize> {
    let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })?;
    usize::try_from(count)
        .map_err(|_| DbError::LegacyData(format!("negative row count in {table}")))
}

fn table_exists(conn: &Connection, name: &str) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
        [name],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn column_exists(conn: &Connection, table: &str, column: &str) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM pragma_table_info(?1) WHERE name = ?2);",
        [table, column],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
