//! Flight configuration model.
//!
//! # Responsibility
//! - Hold the per-deployment flight parameters used by boarding passes and
//!   the manifest.
//! - Parse and format the date/time representations shared with clients.
//!
//! # Invariants
//! - A flight counts as configured only when a departure date is set.
//! - Values are read-only once loaded by a running server.

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const DEFAULT_FLIGHT_NUMBER: &str = "AA-2025";
pub const DEFAULT_DESTINATION: &str = "Destination TBD";
pub const DEFAULT_DEPARTURE_TIME: &str = "12:00";

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

/// Storage keys of the `flight_config` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlightConfigKey {
    DepartureDate,
    DepartureTime,
    FlightNumber,
    Destination,
}

impl FlightConfigKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DepartureDate => "departure_date",
            Self::DepartureTime => "departure_time",
            Self::FlightNumber => "flight_number",
            Self::Destination => "destination",
        }
    }
}

/// Resolved flight parameters for the single configured flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightConfig {
    pub departure_date: NaiveDate,
    pub departure_time: NaiveTime,
    pub flight_number: String,
    pub destination: String,
}

impl FlightConfig {
    /// Creates a config for `departure_date` with default flight details.
    pub fn new(departure_date: NaiveDate) -> Self {
        Self {
            departure_date,
            departure_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default(),
            flight_number: DEFAULT_FLIGHT_NUMBER.to_string(),
            destination: DEFAULT_DESTINATION.to_string(),
        }
    }

    pub fn with_flight_number(mut self, flight_number: impl Into<String>) -> Self {
        self.flight_number = flight_number.into();
        self
    }

    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = destination.into();
        self
    }

    pub fn with_departure_time(mut self, departure_time: NaiveTime) -> Self {
        self.departure_time = departure_time;
        self
    }

    /// Long form, e.g. `Thursday, October 30, 2025`.
    pub fn formatted_date(&self) -> String {
        self.departure_date.format("%A, %B %d, %Y").to_string()
    }

    /// Flight number without separators, used in export file names.
    pub fn compact_flight_number(&self) -> String {
        self.flight_number
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect()
    }
}

/// Client-facing flight configuration payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlightConfigView {
    pub configured: bool,
    pub departure_date: Option<String>,
    pub formatted_date: Option<String>,
    pub flight_number: Option<String>,
    pub destination: Option<String>,
    pub departure_time: Option<String>,
}

impl FlightConfigView {
    pub fn from_config(config: Option<&FlightConfig>) -> Self {
        match config {
            Some(config) => Self {
                configured: true,
                departure_date: Some(format_date(config.departure_date)),
                formatted_date: Some(config.formatted_date()),
                flight_number: Some(config.flight_number.clone()),
                destination: Some(config.destination.clone()),
                departure_time: Some(format_time(config.departure_time)),
            },
            None => Self {
                configured: false,
                departure_date: None,
                formatted_date: None,
                flight_number: None,
                destination: None,
                departure_time: None,
            },
        }
    }
}

/// Parse failures for configured flight values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlightValueError {
    InvalidDate(String),
    InvalidTime(String),
}

impl Display for FlightValueError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDate(value) => write!(
                f,
                "invalid date format `{value}`; use YYYY-MM-DD (e.g. 2025-12-15)"
            ),
            Self::InvalidTime(value) => {
                write!(f, "invalid time format `{value}`; use HH:MM (e.g. 14:30)")
            }
        }
    }
}

impl Error for FlightValueError {}

pub fn parse_date(value: &str) -> Result<NaiveDate, FlightValueError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| FlightValueError::InvalidDate(value.trim().to_string()))
}

pub fn parse_time(value: &str) -> Result<NaiveTime, FlightValueError> {
    NaiveTime::parse_from_str(value.trim(), TIME_FORMAT)
        .map_err(|_| FlightValueError::InvalidTime(value.trim().to_string()))
}

pub fn format_date(value: NaiveDate) -> String {
    value.format(DATE_FORMAT).to_string()
}

pub fn format_time(value: NaiveTime) -> String {
    value.format(TIME_FORMAT).to_string()
}
