//! Booking use-case service.
//!
//! # Responsibility
//! - Validate submissions, stamp them from the flight configuration and
//!   persist them through the repository.
//! - Classify failures into caller-facing error kinds.
//!
//! # Invariants
//! - An unconfigured flight is rejected before any validation or write.
//! - The returned record is the stored row read back, so regenerating a
//!   boarding pass later yields the same fields.

use crate::model::booking::{
    email_domain, BookingId, BookingRecord, BookingRequest, BookingValidationError, NewBooking,
};
use crate::model::flight::FlightConfig;
use crate::repo::booking_repo::{BookingRepository, RepoError, RepoResult, SortOrder};
use chrono::{DateTime, Utc};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Caller-facing classification of booking failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingErrorKind {
    /// User-correctable input problem.
    InvalidInput,
    /// Email already booked.
    DuplicateEmail,
    /// Flight departure date not configured yet.
    Configuration,
    /// Persistence layer failure.
    Storage,
}

/// Service error for booking use-cases.
#[derive(Debug)]
pub enum BookingError {
    Validation(BookingValidationError),
    DuplicateEmail(String),
    NotConfigured,
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl BookingError {
    pub fn kind(&self) -> BookingErrorKind {
        match self {
            Self::Validation(_) => BookingErrorKind::InvalidInput,
            Self::DuplicateEmail(_) => BookingErrorKind::DuplicateEmail,
            Self::NotConfigured => BookingErrorKind::Configuration,
            Self::Repo(_) | Self::InconsistentState(_) => BookingErrorKind::Storage,
        }
    }
}

impl Display for BookingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::DuplicateEmail(email) => {
                write!(f, "A boarding pass has already been issued for {email}")
            }
            Self::NotConfigured => write!(
                f,
                "Flight departure date not configured. Please contact airline administration."
            ),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent booking state: {details}"),
        }
    }
}

impl Error for BookingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BookingValidationError> for BookingError {
    fn from(value: BookingValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for BookingError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::DuplicateEmail(email) => Self::DuplicateEmail(email),
            other => Self::Repo(other),
        }
    }
}

/// Booking service facade over repository implementations.
pub struct BookingService<R: BookingRepository> {
    repo: R,
}

impl<R: BookingRepository> BookingService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validates and stores one booking stamped with the current time.
    pub fn create_booking(
        &self,
        request: &BookingRequest,
        flight: Option<&FlightConfig>,
    ) -> Result<BookingRecord, BookingError> {
        self.create_booking_at(request, flight, Utc::now())
    }

    /// Validates and stores one booking stamped with `now`.
    ///
    /// # Errors
    /// - `NotConfigured` when `flight` is `None`.
    /// - `Validation` for malformed email, unknown meal or missing details.
    /// - `DuplicateEmail` when the normalized email is already booked.
    pub fn create_booking_at(
        &self,
        request: &BookingRequest,
        flight: Option<&FlightConfig>,
        now: DateTime<Utc>,
    ) -> Result<BookingRecord, BookingError> {
        let Some(flight) = flight else {
            warn!("event=booking_create module=service status=error error_code=not_configured");
            return Err(BookingError::NotConfigured);
        };

        let valid = request.validate().inspect_err(|err| {
            info!(
                "event=booking_create module=service status=rejected error_code=invalid_input error={}",
                err
            );
        })?;
        let booking = NewBooking::stamp(valid, flight.departure_date, now);

        let id = match self.repo.create_booking(&booking) {
            Ok(id) => id,
            Err(err) => {
                info!(
                    "event=booking_create module=service status=rejected email_domain={} error={}",
                    email_domain(&booking.email),
                    err
                );
                return Err(err.into());
            }
        };

        let record = self
            .repo
            .get_booking(id)?
            .ok_or(BookingError::InconsistentState(
                "created booking not found in read-back",
            ))?;

        info!(
            "event=booking_create module=service status=ok booking_id={} meal={} email_domain={}",
            record.id,
            record.dietary_option.code(),
            email_domain(&record.email)
        );
        Ok(record)
    }

    pub fn get_booking(&self, id: BookingId) -> RepoResult<Option<BookingRecord>> {
        self.repo.get_booking(id)
    }

    pub fn list_bookings(&self, order: SortOrder) -> RepoResult<Vec<BookingRecord>> {
        self.repo.list_bookings(order)
    }

    pub fn count_bookings(&self) -> RepoResult<usize> {
        self.repo.count_bookings()
    }
}
