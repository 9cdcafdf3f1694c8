use azalea_core::db::open_db_in_memory;
use azalea_core::{
    BookingError, BookingErrorKind, BookingRepository, BookingRequest, BookingService,
    BookingValidationError, FlightConfig, MealChoice, SortOrder, SqliteBookingRepository,
};
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use rusqlite::params;

fn flight() -> FlightConfig {
    FlightConfig::new(NaiveDate::from_ymd_opt(2025, 10, 30).unwrap())
        .with_flight_number("AA-3010")
        .with_destination("Padang")
}

fn at(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 1, 9, minute, 0).unwrap()
}

#[test]
fn create_stamps_flight_date_and_creation_time() {
    let conn = open_db_in_memory().unwrap();
    let service = BookingService::new(SqliteBookingRepository::new(&conn));

    let record = service
        .create_booking_at(&BookingRequest::new("A@X.com", "vegan"), Some(&flight()), at(0))
        .unwrap();

    assert_eq!(record.email, "a@x.com");
    assert_eq!(record.dietary_option, MealChoice::Vegan);
    assert_eq!(record.event_date, NaiveDate::from_ymd_opt(2025, 10, 30).unwrap());
    assert_eq!(record.date_created, at(0));
    assert_eq!(record.special_dietary_details, None);
}

#[test]
fn created_record_matches_read_back() {
    let conn = open_db_in_memory().unwrap();
    let service = BookingService::new(SqliteBookingRepository::new(&conn));

    let now = at(0) + Duration::nanoseconds(123_456_789);
    let created = service
        .create_booking_at(&BookingRequest::new("a@x.com", "carbonara-funghi"), Some(&flight()), now)
        .unwrap();

    let loaded = service.get_booking(created.id).unwrap().unwrap();
    assert_eq!(loaded, created);
    assert_eq!(loaded.date_created.timestamp_subsec_millis(), 123);
}

#[test]
fn second_submission_for_same_email_is_duplicate() {
    let conn = open_db_in_memory().unwrap();
    let service = BookingService::new(SqliteBookingRepository::new(&conn));

    service
        .create_booking_at(&BookingRequest::new("a@x.com", "vegan"), Some(&flight()), at(0))
        .unwrap();
    let err = service
        .create_booking_at(&BookingRequest::new(" A@x.COM ", "none"), Some(&flight()), at(1))
        .unwrap_err();

    assert!(matches!(&err, BookingError::DuplicateEmail(email) if email == "a@x.com"));
    assert_eq!(err.kind(), BookingErrorKind::DuplicateEmail);
    assert_eq!(service.count_bookings().unwrap(), 1);
}

#[test]
fn unconfigured_flight_is_rejected_before_validation() {
    let conn = open_db_in_memory().unwrap();
    let service = BookingService::new(SqliteBookingRepository::new(&conn));

    let err = service
        .create_booking_at(&BookingRequest::new("not-an-email", ""), None, at(0))
        .unwrap_err();

    assert!(matches!(err, BookingError::NotConfigured));
    assert_eq!(err.kind(), BookingErrorKind::Configuration);
    assert_eq!(service.count_bookings().unwrap(), 0);
}

#[test]
fn other_meal_without_details_is_invalid_input_and_writes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let service = BookingService::new(SqliteBookingRepository::new(&conn));

    let err = service
        .create_booking_at(
            &BookingRequest::new("a@x.com", "other").with_details(""),
            Some(&flight()),
            at(0),
        )
        .unwrap_err();

    assert!(matches!(
        err,
        BookingError::Validation(BookingValidationError::MissingDetails)
    ));
    assert_eq!(err.kind(), BookingErrorKind::InvalidInput);
    assert_eq!(service.count_bookings().unwrap(), 0);
}

#[test]
fn other_meal_keeps_details() {
    let conn = open_db_in_memory().unwrap();
    let service = BookingService::new(SqliteBookingRepository::new(&conn));

    let record = service
        .create_booking_at(
            &BookingRequest::new("a@x.com", "other").with_details("Halal, no nuts"),
            Some(&flight()),
            at(0),
        )
        .unwrap();

    assert_eq!(record.dietary_option, MealChoice::Other);
    assert_eq!(record.special_dietary_details.as_deref(), Some("Halal, no nuts"));
}

#[test]
fn invalid_email_and_meal_are_invalid_input() {
    let conn = open_db_in_memory().unwrap();
    let service = BookingService::new(SqliteBookingRepository::new(&conn));

    let email_err = service
        .create_booking_at(&BookingRequest::new("a@x", "vegan"), Some(&flight()), at(0))
        .unwrap_err();
    assert_eq!(email_err.kind(), BookingErrorKind::InvalidInput);

    let meal_err = service
        .create_booking_at(&BookingRequest::new("a@x.com", "lobster"), Some(&flight()), at(0))
        .unwrap_err();
    assert_eq!(meal_err.kind(), BookingErrorKind::InvalidInput);
}

#[test]
fn list_orders_by_creation_time_in_both_directions() {
    let conn = open_db_in_memory().unwrap();
    let service = BookingService::new(SqliteBookingRepository::new(&conn));

    for (minute, email) in [(5, "late@x.com"), (1, "early@x.com"), (3, "mid@x.com")] {
        service
            .create_booking_at(&BookingRequest::new(email, "none"), Some(&flight()), at(minute))
            .unwrap();
    }

    let ascending: Vec<_> = service
        .list_bookings(SortOrder::Ascending)
        .unwrap()
        .into_iter()
        .map(|record| record.email)
        .collect();
    assert_eq!(ascending, ["early@x.com", "mid@x.com", "late@x.com"]);

    let descending: Vec<_> = service
        .list_bookings(SortOrder::Descending)
        .unwrap()
        .into_iter()
        .map(|record| record.email)
        .collect();
    assert_eq!(descending, ["late@x.com", "mid@x.com", "early@x.com"]);
    assert_eq!(service.count_bookings().unwrap(), 3);
}

#[test]
fn same_timestamp_ties_break_by_insert_order() {
    let conn = open_db_in_memory().unwrap();
    let service = BookingService::new(SqliteBookingRepository::new(&conn));

    for email in ["first@x.com", "second@x.com"] {
        service
            .create_booking_at(&BookingRequest::new(email, "vegan"), Some(&flight()), at(0))
            .unwrap();
    }

    let listed = service.list_bookings(SortOrder::Ascending).unwrap();
    assert_eq!(listed[0].email, "first@x.com");
    assert_eq!(listed[1].email, "second@x.com");
}

#[test]
fn unknown_stored_meal_code_loads_as_unknown() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO rsvp (email, dietary_option, event_date, date_created)
         VALUES (?1, ?2, ?3, ?4);",
        params!["legacy@x.com", "kosher", "2025-10-30", at(0).timestamp_millis()],
    )
    .unwrap();

    let repo = SqliteBookingRepository::new(&conn);
    let listed = repo.list_bookings(SortOrder::Ascending).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].dietary_option, MealChoice::Unknown("kosher".to_string()));
}

#[test]
fn corrupt_stored_date_is_reported_not_masked() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO rsvp (email, dietary_option, event_date, date_created)
         VALUES (?1, ?2, ?3, ?4);",
        params!["bad@x.com", "vegan", "30/10/2025", at(0).timestamp_millis()],
    )
    .unwrap();

    let service = BookingService::new(SqliteBookingRepository::new(&conn));
    let err = service.list_bookings(SortOrder::Ascending).unwrap_err();
    assert!(err.to_string().contains("rsvp.event_date"));
}

#[test]
fn get_missing_booking_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookingRepository::new(&conn);
    assert_eq!(repo.get_booking(42).unwrap(), None);
}
