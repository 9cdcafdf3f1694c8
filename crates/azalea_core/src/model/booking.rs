//! Booking domain model.
//!
//! # Responsibility
//! - Define the persisted passenger booking record.
//! - Validate and normalize raw booking submissions.
//!
//! # Invariants
//! - `email` is trimmed and lowercase; it is the unique booking key.
//! - `special_dietary_details` is only kept for `MealChoice::Other`.
//! - `date_created` has millisecond precision, matching storage.

use crate::model::meal::MealChoice;
use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage row id, shown to admins as "Passenger ID".
pub type BookingId = i64;

const MAX_EMAIL_CHARS: usize = 254;
const MAX_DETAILS_CHARS: usize = 500;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)+$").expect("valid email regex")
});

/// Persisted passenger booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRecord {
    pub id: BookingId,
    pub email: String,
    pub dietary_option: MealChoice,
    pub special_dietary_details: Option<String>,
    /// Departure date copied from the flight configuration at insert time.
    pub event_date: NaiveDate,
    pub date_created: DateTime<Utc>,
}

/// Raw booking form submission as received from clients.
///
/// Fields default to empty so a missing field surfaces as a validation error
/// instead of a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BookingRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub dietary_option: String,
    #[serde(default)]
    pub special_dietary_details: Option<String>,
}

impl BookingRequest {
    pub fn new(email: impl Into<String>, dietary_option: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            dietary_option: dietary_option.into(),
            special_dietary_details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.special_dietary_details = Some(details.into());
        self
    }

    /// Validates the submission and returns its normalized form.
    ///
    /// Checks run in form order: email, meal, then details.
    pub fn validate(&self) -> Result<ValidBooking, BookingValidationError> {
        if self.email.trim().is_empty() {
            return Err(BookingValidationError::MissingField("email"));
        }
        let email = normalize_email(&self.email)?;

        if self.dietary_option.trim().is_empty() {
            return Err(BookingValidationError::MissingField("dietary_option"));
        }
        let meal = MealChoice::parse_known(self.dietary_option.trim()).ok_or_else(|| {
            BookingValidationError::InvalidMeal(self.dietary_option.trim().to_string())
        })?;

        let details = if meal.requires_details() {
            let details = self
                .special_dietary_details
                .as_deref()
                .map(str::trim)
                .unwrap_or_default();
            if details.is_empty() {
                return Err(BookingValidationError::MissingDetails);
            }
            if details.chars().count() > MAX_DETAILS_CHARS {
                return Err(BookingValidationError::DetailsTooLong {
                    max_chars: MAX_DETAILS_CHARS,
                });
            }
            Some(details.to_string())
        } else {
            None
        };

        Ok(ValidBooking {
            email,
            meal,
            special_dietary_details: details,
        })
    }
}

/// Submission that passed validation, ready to be stamped and stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidBooking {
    pub email: String,
    pub meal: MealChoice,
    pub special_dietary_details: Option<String>,
}

/// Fully stamped booking row awaiting insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub email: String,
    pub dietary_option: MealChoice,
    pub special_dietary_details: Option<String>,
    pub event_date: NaiveDate,
    pub date_created: DateTime<Utc>,
}

impl NewBooking {
    /// Stamps a validated submission with flight date and creation time.
    ///
    /// Sub-millisecond precision is dropped so the returned value equals what
    /// storage reads back.
    pub fn stamp(valid: ValidBooking, event_date: NaiveDate, now: DateTime<Utc>) -> Self {
        let date_created = DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now);
        Self {
            email: valid.email,
            dietary_option: valid.meal,
            special_dietary_details: valid.special_dietary_details,
            event_date,
            date_created,
        }
    }
}

/// Validation failures for booking submissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingValidationError {
    MissingField(&'static str),
    InvalidEmail(String),
    InvalidMeal(String),
    MissingDetails,
    DetailsTooLong { max_chars: usize },
}

impl Display for BookingValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "Missing required field: {field}"),
            Self::InvalidEmail(value) => write!(f, "Invalid email address: `{value}`"),
            Self::InvalidMeal(value) => write!(f, "Invalid meal selection: `{value}`"),
            Self::MissingDetails => write!(
                f,
                "special_dietary_details is required when dietary_option is `other`"
            ),
            Self::DetailsTooLong { max_chars } => write!(
                f,
                "special_dietary_details must be at most {max_chars} characters"
            ),
        }
    }
}

impl Error for BookingValidationError {}

/// Trims and lowercases an email address and checks its shape.
pub fn normalize_email(raw: &str) -> Result<String, BookingValidationError> {
    let normalized = raw.trim().to_lowercase();
    if normalized.chars().count() > MAX_EMAIL_CHARS || !EMAIL_RE.is_match(&normalized) {
        return Err(BookingValidationError::InvalidEmail(raw.trim().to_string()));
    }
    Ok(normalized)
}

/// Returns the domain part of an address for log lines.
pub fn email_domain(email: &str) -> &str {
    email.rsplit_once('@').map_or("unknown", |(_, domain)| domain)
}

#[cfg(test)]
mod tests {
    use super::{email_domain, normalize_email, BookingRequest, BookingValidationError};
    use crate::model::meal::MealChoice;

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(
            normalize_email("  Ada@Example.COM ").unwrap(),
            "ada@example.com"
        );
    }

    #[test]
    fn normalize_email_rejects_malformed_values() {
        for raw in ["plain", "a@b", "a b@x.com", "@x.com", "a@x..com", "a@@x.com"] {
            assert!(
                matches!(
                    normalize_email(raw),
                    Err(BookingValidationError::InvalidEmail(_))
                ),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn validate_reports_missing_fields_in_form_order() {
        let err = BookingRequest::new("", "").validate().unwrap_err();
        assert_eq!(err, BookingValidationError::MissingField("email"));

        let err = BookingRequest::new("a@x.com", " ").validate().unwrap_err();
        assert_eq!(err, BookingValidationError::MissingField("dietary_option"));
    }

    #[test]
    fn validate_drops_details_for_non_other_meals() {
        let valid = BookingRequest::new("a@x.com", "vegan")
            .with_details("extra")
            .validate()
            .unwrap();
        assert_eq!(valid.meal, MealChoice::Vegan);
        assert_eq!(valid.special_dietary_details, None);
    }

    #[test]
    fn validate_requires_details_for_other() {
        let err = BookingRequest::new("a@x.com", "other")
            .with_details("   ")
            .validate()
            .unwrap_err();
        assert_eq!(err, BookingValidationError::MissingDetails);

        let valid = BookingRequest::new("a@x.com", "other")
            .with_details(" no shellfish ")
            .validate()
            .unwrap();
        assert_eq!(valid.special_dietary_details.as_deref(), Some("no shellfish"));
    }

    #[test]
    fn validate_rejects_unknown_meal_codes() {
        let err = BookingRequest::new("a@x.com", "kids-meal")
            .validate()
            .unwrap_err();
        assert_eq!(err, BookingValidationError::InvalidMeal("kids-meal".to_string()));
    }

    #[test]
    fn validate_trims_meal_code() {
        let valid = BookingRequest::new("a@x.com", " vegan ").validate().unwrap();
        assert_eq!(valid.meal, MealChoice::Vegan);
    }

    #[test]
    fn email_length_limit_is_254_characters() {
        let at_limit = format!("{}@x.com", "a".repeat(248));
        assert_eq!(at_limit.len(), 254);
        assert_eq!(normalize_email(&at_limit).unwrap(), at_limit);

        let over_limit = format!("{}@x.com", "a".repeat(249));
        assert!(matches!(
            BookingRequest::new(over_limit, "vegan").validate(),
            Err(BookingValidationError::InvalidEmail(_))
        ));
    }

    #[test]
    fn details_length_limit_is_500_characters() {
        let valid = BookingRequest::new("a@x.com", "other")
            .with_details("é".repeat(500))
            .validate()
            .unwrap();
        assert_eq!(
            valid.special_dietary_details.map(|details| details.chars().count()),
            Some(500)
        );

        let err = BookingRequest::new("a@x.com", "other")
            .with_details("x".repeat(501))
            .validate()
            .unwrap_err();
        assert_eq!(
            err,
            BookingValidationError::DetailsTooLong { max_chars: 500 }
        );
    }

    #[test]
    fn email_domain_extracts_host_part() {
        assert_eq!(email_domain("ada@example.com"), "example.com");
        assert_eq!(email_domain("broken"), "unknown");
    }
}
