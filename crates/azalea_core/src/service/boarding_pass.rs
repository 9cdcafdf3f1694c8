//! Boarding pass derivation.
//!
//! # Responsibility
//! - Derive the printable boarding pass for a stored booking.
//!
//! # Invariants
//! - `generate` is a pure function of the record and flight config; it never
//!   fails and repeated calls return identical passes.
//! - The confirmation code depends only on the email and creation time, so
//!   it is stable across re-display.
//! - Seat and gate are cosmetic; no seat inventory is tracked.

use crate::model::booking::{BookingId, BookingRecord};
use crate::model::flight::{format_date, format_time, FlightConfig};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

pub const CONFIRMATION_CODE_LEN: usize = 6;
/// Boarding opens this many minutes before departure.
pub const BOARDING_LEAD_MINUTES: i64 = 30;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const SEAT_ROWS: u16 = 30;
const SEAT_LETTERS: &[u8] = b"ABCDEF";
const GATE_CONCOURSES: &[u8] = b"ABC";
const GATES_PER_CONCOURSE: u8 = 20;
const BAR_PATTERNS: [&str; 5] = ["|| |", "| ||", "|||", "| | |", "||  |"];

/// Printable boarding pass derived from a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardingPass {
    pub booking_id: BookingId,
    pub confirmation_code: String,
    pub passenger_email: String,
    pub flight_number: String,
    pub departure_date: String,
    pub formatted_departure: String,
    pub destination: String,
    pub seat_number: String,
    pub gate: String,
    pub boarding_time: String,
    pub departure_time: String,
    pub meal_preference: String,
    pub meal_display: String,
    pub special_dietary_details: Option<String>,
    pub booking_date: DateTime<Utc>,
    pub barcode: String,
}

/// Derives the boarding pass for `record` on `flight`.
pub fn generate(record: &BookingRecord, flight: &FlightConfig) -> BoardingPass {
    let confirmation_code = confirmation_code(record);
    let placement = Sha256::digest(confirmation_code.as_bytes());
    let boarding_time = flight.departure_time - Duration::minutes(BOARDING_LEAD_MINUTES);

    BoardingPass {
        booking_id: record.id,
        passenger_email: record.email.clone(),
        flight_number: flight.flight_number.clone(),
        departure_date: format_date(record.event_date),
        formatted_departure: record.event_date.format("%B %d, %Y").to_string(),
        destination: flight.destination.clone(),
        seat_number: seat_number(&placement),
        gate: gate(&placement),
        boarding_time: format_time(boarding_time),
        departure_time: format_time(flight.departure_time),
        meal_preference: record.dietary_option.code().to_string(),
        meal_display: record.dietary_option.label().to_string(),
        special_dietary_details: record.special_dietary_details.clone(),
        booking_date: record.date_created,
        barcode: barcode(&confirmation_code),
        confirmation_code,
    }
}

/// Short booking reference derived from email and creation time.
pub fn confirmation_code(record: &BookingRecord) -> String {
    let mut hasher = Sha256::new();
    hasher.update(record.email.as_bytes());
    hasher.update(b"|");
    hasher.update(record.date_created.timestamp_millis().to_be_bytes());
    let digest = hasher.finalize();

    digest
        .iter()
        .take(CONFIRMATION_CODE_LEN)
        .map(|byte| char::from(CODE_ALPHABET[usize::from(*byte) % CODE_ALPHABET.len()]))
        .collect()
}

/// Renders a code as bars, one of five fixed patterns per character.
pub fn barcode(code: &str) -> String {
    code.chars()
        .map(|ch| BAR_PATTERNS[(u32::from(ch) % 5) as usize])
        .collect()
}

fn seat_number(digest: &[u8]) -> String {
    let row = u16::from_be_bytes([digest[0], digest[1]]) % SEAT_ROWS + 1;
    let letter = char::from(SEAT_LETTERS[usize::from(digest[2]) % SEAT_LETTERS.len()]);
    format!("{row}{letter}")
}

fn gate(digest: &[u8]) -> String {
    let concourse = char::from(GATE_CONCOURSES[usize::from(digest[3]) % GATE_CONCOURSES.len()]);
    let number = digest[4] % GATES_PER_CONCOURSE + 1;
    format!("{concourse}{number}")
}
