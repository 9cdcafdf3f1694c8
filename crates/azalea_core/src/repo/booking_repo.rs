//! Booking repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist and read booking rows in the `rsvp` table.
//! - Translate the unique email index into a semantic duplicate error.
//!
//! # Invariants
//! - Inserts are a single statement; a failed insert leaves no row behind.
//! - Read paths reject unparsable persisted dates instead of masking them.
//! - Unrecognized meal codes are not an error on read.

use crate::db::DbError;
use crate::model::booking::{BookingId, BookingRecord, NewBooking};
use crate::model::flight::format_date;
use crate::model::meal::MealChoice;
use chrono::{DateTime, NaiveDate};
use rusqlite::{ffi, params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const BOOKING_SELECT_SQL: &str = "SELECT
    id,
    email,
    dietary_option,
    special_dietary_details,
    event_date,
    date_created
FROM rsvp";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for booking and flight configuration storage.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    DuplicateEmail(String),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::DuplicateEmail(email) => write!(f, "booking already exists for {email}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::DuplicateEmail(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Listing order over `date_created`, ties broken by row id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    fn sql(self) -> &'static str {
        match self {
            Self::Ascending => "ORDER BY date_created ASC, id ASC",
            Self::Descending => "ORDER BY date_created DESC, id DESC",
        }
    }
}

/// Repository interface for booking storage.
pub trait BookingRepository {
    /// Inserts one booking and returns its row id.
    ///
    /// Returns `RepoError::DuplicateEmail` when the email is already booked.
    fn create_booking(&self, booking: &NewBooking) -> RepoResult<BookingId>;
    fn get_booking(&self, id: BookingId) -> RepoResult<Option<BookingRecord>>;
    fn list_bookings(&self, order: SortOrder) -> RepoResult<Vec<BookingRecord>>;
    fn count_bookings(&self) -> RepoResult<usize>;
}

/// SQLite-backed booking repository.
pub struct SqliteBookingRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBookingRepository<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl BookingRepository for SqliteBookingRepository<'_> {
    fn create_booking(&self, booking: &NewBooking) -> RepoResult<BookingId> {
        let inserted = self.conn.execute(
            "INSERT INTO rsvp (
                email,
                dietary_option,
                special_dietary_details,
                event_date,
                date_created
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                booking.email.as_str(),
                booking.dietary_option.code(),
                booking.special_dietary_details.as_deref(),
                format_date(booking.event_date),
                booking.date_created.timestamp_millis(),
            ],
        );

        match inserted {
            Ok(_) => Ok(self.conn.last_insert_rowid()),
            Err(err) if is_unique_violation(&err) => {
                Err(RepoError::DuplicateEmail(booking.email.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn get_booking(&self, id: BookingId) -> RepoResult<Option<BookingRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BOOKING_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_booking_row(row)?));
        }

        Ok(None)
    }

    fn list_bookings(&self, order: SortOrder) -> RepoResult<Vec<BookingRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BOOKING_SELECT_SQL} {};", order.sql()))?;
        let mut rows = stmt.query([])?;
        let mut bookings = Vec::new();

        while let Some(row) = rows.next()? {
            bookings.push(parse_booking_row(row)?);
        }

        Ok(bookings)
    }

    fn count_bookings(&self) -> RepoResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM rsvp;", [], |row| row.get(0))?;
        usize::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count `{count}`")))
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn parse_booking_row(row: &Row<'_>) -> RepoResult<BookingRecord> {
    let event_date_text: String = row.get("event_date")?;
    let event_date = NaiveDate::parse_from_str(&event_date_text, "%Y-%m-%d").map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid date `{event_date_text}` in rsvp.event_date"
        ))
    })?;

    let created_ms: i64 = row.get("date_created")?;
    let date_created = DateTime::from_timestamp_millis(created_ms).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid timestamp `{created_ms}` in rsvp.date_created"
        ))
    })?;

    let dietary_option: String = row.get("dietary_option")?;

    Ok(BookingRecord {
        id: row.get("id")?,
        email: row.get("email")?,
        dietary_option: MealChoice::from(dietary_option),
        special_dietary_details: row.get("special_dietary_details")?,
        event_date,
        date_created,
    })
}
