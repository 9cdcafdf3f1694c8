//! Core domain logic for the Azalea Air booking site.
//! This crate is the single source of truth for booking invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, LogSettings};
pub use model::booking::{
    normalize_email, BookingId, BookingRecord, BookingRequest, BookingValidationError, NewBooking,
};
pub use model::flight::{FlightConfig, FlightConfigKey, FlightConfigView};
pub use model::meal::MealChoice;
pub use repo::booking_repo::{
    BookingRepository, RepoError, RepoResult, SortOrder, SqliteBookingRepository,
};
pub use repo::flight_config_repo::{
    ConfigEntry, FlightConfigRepository, SqliteFlightConfigRepository,
};
pub use service::boarding_pass::{generate as generate_boarding_pass, BoardingPass};
pub use service::booking_service::{BookingError, BookingErrorKind, BookingService};
pub use service::flight_config_service::{FlightConfigError, FlightConfigService, FlightStatus};
pub use service::manifest::{export as export_manifest, Manifest, ManifestError};
pub use service::summary::{summarize, BookingSummary, MealCount};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
