//! Passenger manifest CSV export.
//!
//! # Responsibility
//! - Serialize all bookings plus derived boarding fields into a CSV file.
//! - Prefix the data with a `#` comment preamble carrying the flight and
//!   meal summary.
//!
//! # Invariants
//! - Exactly one data row per booking, after one header row.
//! - Meal labels in rows and preamble come from the same summary labels.
//! - Field quoting follows standard CSV rules (via the `csv` writer).

use crate::model::booking::BookingRecord;
use crate::model::flight::{format_date, FlightConfig};
use crate::service::boarding_pass::confirmation_code;
use crate::service::summary::summarize;
use chrono::{DateTime, Utc};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Write;

pub const AIRLINE_NAME: &str = "Azalea Air";
pub const MANIFEST_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

pub const MANIFEST_HEADER: [&str; 7] = [
    "Passenger ID",
    "Booking Date",
    "Passenger Email",
    "Meal Preference",
    "Special Dietary Details",
    "Confirmation Code",
    "Departure Date",
];

const PREAMBLE_RULE: &str = "================================================";

/// Rendered manifest file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub filename: String,
    pub content: Vec<u8>,
    pub rows: usize,
}

impl Manifest {
    /// `Content-Disposition` header value for downloads.
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename={}", self.filename)
    }
}

#[derive(Debug)]
pub enum ManifestError {
    Csv(csv::Error),
    Io(std::io::Error),
}

impl Display for ManifestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Csv(err) => write!(f, "failed to write manifest row: {err}"),
            Self::Io(err) => write!(f, "failed to write manifest: {err}"),
        }
    }
}

impl Error for ManifestError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Csv(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<csv::Error> for ManifestError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<std::io::Error> for ManifestError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Builds the manifest for `records` as of `generated_at`.
pub fn export(
    records: &[BookingRecord],
    flight: &FlightConfig,
    generated_at: DateTime<Utc>,
) -> Result<Manifest, ManifestError> {
    let mut buffer = Vec::new();
    write_preamble(&mut buffer, records, flight, generated_at)?;

    let mut writer = csv::Writer::from_writer(buffer);
    writer.write_record(MANIFEST_HEADER)?;
    for record in records {
        writer.write_record([
            record.id.to_string(),
            record.date_created.format("%Y-%m-%d %H:%M:%S").to_string(),
            record.email.clone(),
            record.dietary_option.label().to_string(),
            record.special_dietary_details.clone().unwrap_or_default(),
            confirmation_code(record),
            format_date(record.event_date),
        ])?;
    }
    let content = writer
        .into_inner()
        .map_err(|err| ManifestError::Io(err.into_error()))?;

    let manifest = Manifest {
        filename: manifest_filename(flight, generated_at),
        content,
        rows: records.len(),
    };
    info!(
        "event=manifest_export module=service status=ok rows={} bytes={}",
        manifest.rows,
        manifest.content.len()
    );
    Ok(manifest)
}

/// e.g. `AzaleaAir_Flight_AA3010_PassengerManifest_20251001_093000.csv`.
pub fn manifest_filename(flight: &FlightConfig, generated_at: DateTime<Utc>) -> String {
    format!(
        "AzaleaAir_Flight_{}_PassengerManifest_{}.csv",
        flight.compact_flight_number(),
        generated_at.format("%Y%m%d_%H%M%S")
    )
}

fn write_preamble(
    out: &mut Vec<u8>,
    records: &[BookingRecord],
    flight: &FlightConfig,
    generated_at: DateTime<Utc>,
) -> std::io::Result<()> {
    let summary = summarize(records);

    writeln!(
        out,
        "# {AIRLINE_NAME} Flight {} - Passenger Manifest",
        single_line(&flight.flight_number)
    )?;
    writeln!(out, "# Destination: {}", single_line(&flight.destination))?;
    writeln!(out, "# Departure: {}", flight.formatted_date())?;
    writeln!(
        out,
        "# Generated on: {}",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(out, "# ")?;
    writeln!(out, "# FLIGHT SUMMARY")?;
    writeln!(out, "# Total Passengers: {}", summary.total_passengers)?;
    writeln!(out, "# ")?;
    writeln!(out, "# MEAL SERVICE SUMMARY")?;
    for (_, meal) in summary.by_count() {
        writeln!(out, "# {}: {}", single_line(&meal.label), meal.count)?;
    }
    writeln!(out, "# ")?;
    writeln!(out, "# {PREAMBLE_RULE}")?;
    writeln!(out, "# PASSENGER MANIFEST DATA")?;
    writeln!(out, "# {PREAMBLE_RULE}")?;
    Ok(())
}

fn single_line(value: &str) -> String {
    value.replace(['\n', '\r'], " ")
}
