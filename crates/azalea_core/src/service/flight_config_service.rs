//! Flight configuration use-case service.
//!
//! # Responsibility
//! - Resolve stored key/value rows into a `FlightConfig`.
//! - Validate operator input before writing configuration values.
//! - Build the status report shown by the CLI.
//!
//! # Invariants
//! - `load` returns `None` until a departure date is stored.
//! - New departure dates may not lie before the caller-supplied `today`.

use crate::model::flight::{
    format_date, format_time, parse_date, parse_time, FlightConfig, FlightConfigKey, FlightValueError,
    DEFAULT_DEPARTURE_TIME, DEFAULT_DESTINATION, DEFAULT_FLIGHT_NUMBER,
};
use crate::repo::booking_repo::{RepoError, RepoResult};
use crate::repo::flight_config_repo::{ConfigEntry, FlightConfigRepository};
use chrono::{DateTime, NaiveDate, Utc};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for flight configuration writes.
#[derive(Debug)]
pub enum FlightConfigError {
    InvalidValue(FlightValueError),
    DateInPast { date: NaiveDate, today: NaiveDate },
    EmptyValue(&'static str),
    Repo(RepoError),
}

impl Display for FlightConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue(err) => write!(f, "{err}"),
            Self::DateInPast { date, today } => write!(
                f,
                "departure date {date} is in the past (today is {today}); choose a future date"
            ),
            Self::EmptyValue(field) => write!(f, "{field} cannot be empty"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for FlightConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidValue(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<FlightValueError> for FlightConfigError {
    fn from(value: FlightValueError) -> Self {
        Self::InvalidValue(value)
    }
}

impl From<RepoError> for FlightConfigError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Snapshot of stored configuration for operator display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightStatus {
    pub config: Option<FlightConfig>,
    pub departure_updated_at: Option<DateTime<Utc>>,
    /// Negative when the departure date has passed.
    pub days_until_departure: Option<i64>,
    pub flight_number_is_default: bool,
    pub destination_is_default: bool,
}

/// Flight configuration service over repository implementations.
pub struct FlightConfigService<R: FlightConfigRepository> {
    repo: R,
}

impl<R: FlightConfigRepository> FlightConfigService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Resolves the stored flight configuration.
    ///
    /// Missing optional values fall back to their defaults. Stored values
    /// that no longer parse are reported as invalid data.
    pub fn load(&self) -> RepoResult<Option<FlightConfig>> {
        let Some(date_entry) = self.repo.get_entry(FlightConfigKey::DepartureDate)? else {
            return Ok(None);
        };
        let departure_date = parse_date(&date_entry.value).map_err(stored_value_error)?;

        let departure_time = self
            .value_or(FlightConfigKey::DepartureTime, DEFAULT_DEPARTURE_TIME)
            .and_then(|value| parse_time(&value).map_err(stored_value_error))?;

        Ok(Some(
            FlightConfig::new(departure_date)
                .with_departure_time(departure_time)
                .with_flight_number(
                    self.value_or(FlightConfigKey::FlightNumber, DEFAULT_FLIGHT_NUMBER)?,
                )
                .with_destination(
                    self.value_or(FlightConfigKey::Destination, DEFAULT_DESTINATION)?,
                ),
        ))
    }

    /// Stores the departure date after format and past-date checks.
    pub fn set_departure_date(
        &self,
        raw: &str,
        today: NaiveDate,
    ) -> Result<NaiveDate, FlightConfigError> {
        let date = parse_date(raw)?;
        if date < today {
            return Err(FlightConfigError::DateInPast { date, today });
        }
        self.write(FlightConfigKey::DepartureDate, &format_date(date))?;
        Ok(date)
    }

    pub fn set_departure_time(&self, raw: &str) -> Result<(), FlightConfigError> {
        let time = parse_time(raw)?;
        self.write(FlightConfigKey::DepartureTime, &format_time(time))
    }

    pub fn set_flight_number(&self, raw: &str) -> Result<(), FlightConfigError> {
        let value = non_empty(raw, "flight number")?;
        self.write(FlightConfigKey::FlightNumber, value)
    }

    pub fn set_destination(&self, raw: &str) -> Result<(), FlightConfigError> {
        let value = non_empty(raw, "destination")?;
        self.write(FlightConfigKey::Destination, value)
    }

    pub fn entries(&self) -> RepoResult<Vec<ConfigEntry>> {
        self.repo.list_entries()
    }

    /// Builds the operator status view relative to `today`.
    pub fn status(&self, today: NaiveDate) -> RepoResult<FlightStatus> {
        let config = self.load()?;
        let departure_updated_at = self
            .repo
            .get_entry(FlightConfigKey::DepartureDate)?
            .map(|entry| entry.updated_at);
        let days_until_departure = config
            .as_ref()
            .map(|config| (config.departure_date - today).num_days());

        Ok(FlightStatus {
            days_until_departure,
            departure_updated_at,
            flight_number_is_default: self.repo.get_entry(FlightConfigKey::FlightNumber)?.is_none(),
            destination_is_default: self.repo.get_entry(FlightConfigKey::Destination)?.is_none(),
            config,
        })
    }

    fn value_or(&self, key: FlightConfigKey, default: &str) -> RepoResult<String> {
        Ok(self
            .repo
            .get_entry(key)?
            .map_or_else(|| default.to_string(), |entry| entry.value))
    }

    fn write(&self, key: FlightConfigKey, value: &str) -> Result<(), FlightConfigError> {
        self.repo.set_value(key, value, Utc::now())?;
        info!(
            "event=flight_config_set module=service status=ok key={}",
            key.as_str()
        );
        Ok(())
    }
}

fn non_empty<'a>(raw: &'a str, field: &'static str) -> Result<&'a str, FlightConfigError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FlightConfigError::EmptyValue(field));
    }
    Ok(trimmed)
}

fn stored_value_error(err: FlightValueError) -> RepoError {
    RepoError::InvalidData(format!("flight_config: {err}"))
}
