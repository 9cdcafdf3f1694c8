use azalea_core::service::boarding_pass::{barcode, confirmation_code, CONFIRMATION_CODE_LEN};
use azalea_core::{generate_boarding_pass, BookingRecord, FlightConfig, MealChoice};
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use std::collections::HashSet;

fn flight() -> FlightConfig {
    FlightConfig::new(NaiveDate::from_ymd_opt(2025, 10, 30).unwrap())
        .with_flight_number("AA-3010")
        .with_destination("Padang")
}

fn record(id: i64, email: &str, meal: MealChoice) -> BookingRecord {
    BookingRecord {
        id,
        email: email.to_string(),
        dietary_option: meal,
        special_dietary_details: None,
        event_date: NaiveDate::from_ymd_opt(2025, 10, 30).unwrap(),
        date_created: Utc.with_ymd_and_hms(2025, 10, 1, 9, 30, 0).unwrap(),
    }
}

#[test]
fn pass_echoes_flight_and_passenger_fields() {
    let pass = generate_boarding_pass(&record(1, "a@x.com", MealChoice::Vegan), &flight());

    assert_eq!(pass.flight_number, "AA-3010");
    assert_eq!(pass.destination, "Padang");
    assert_eq!(pass.passenger_email, "a@x.com");
    assert_eq!(pass.meal_preference, "vegan");
    assert_eq!(pass.meal_display, "Vegan Meals (VEGN)");
    assert_eq!(pass.departure_date, "2025-10-30");
    assert_eq!(pass.formatted_departure, "October 30, 2025");
    assert_eq!(pass.confirmation_code.len(), CONFIRMATION_CODE_LEN);
    assert!(pass
        .confirmation_code
        .chars()
        .all(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit()));
}

#[test]
fn generation_is_deterministic() {
    let booking = record(7, "repeat@x.com", MealChoice::CarbonaraFunghi);
    let first = generate_boarding_pass(&booking, &flight());
    let second = generate_boarding_pass(&booking, &flight());
    assert_eq!(first, second);
}

#[test]
fn confirmation_code_ignores_row_id_but_tracks_email_and_time() {
    let base = record(1, "a@x.com", MealChoice::Vegan);
    let same_inputs = record(99, "a@x.com", MealChoice::Standard);
    assert_eq!(confirmation_code(&base), confirmation_code(&same_inputs));

    let other_email = record(1, "b@x.com", MealChoice::Vegan);
    assert_ne!(confirmation_code(&base), confirmation_code(&other_email));

    let mut later = base.clone();
    later.date_created += chrono::Duration::milliseconds(1);
    assert_ne!(confirmation_code(&base), confirmation_code(&later));
}

#[test]
fn confirmation_codes_do_not_collide_for_a_full_flight() {
    let codes: HashSet<String> = (0..500)
        .map(|i| confirmation_code(&record(i, &format!("passenger{i}@x.com"), MealChoice::Vegan)))
        .collect();
    assert_eq!(codes.len(), 500);
}

#[test]
fn seat_and_gate_stay_within_cabin_layout() {
    for i in 0..200 {
        let pass = generate_boarding_pass(
            &record(i, &format!("seat{i}@x.com"), MealChoice::Vegan),
            &flight(),
        );

        let (row, letter) = pass.seat_number.split_at(pass.seat_number.len() - 1);
        let row: u16 = row.parse().unwrap();
        assert!((1..=30).contains(&row), "row {row}");
        assert!("ABCDEF".contains(letter), "letter {letter}");

        let (concourse, number) = pass.gate.split_at(1);
        let number: u8 = number.parse().unwrap();
        assert!("ABC".contains(concourse));
        assert!((1..=20).contains(&number));
    }
}

#[test]
fn boarding_time_is_thirty_minutes_before_departure() {
    let config = flight().with_departure_time(NaiveTime::from_hms_opt(14, 15, 0).unwrap());
    let pass = generate_boarding_pass(&record(1, "a@x.com", MealChoice::Vegan), &config);
    assert_eq!(pass.departure_time, "14:15");
    assert_eq!(pass.boarding_time, "13:45");

    let early = flight().with_departure_time(NaiveTime::from_hms_opt(0, 10, 0).unwrap());
    let pass = generate_boarding_pass(&record(1, "a@x.com", MealChoice::Vegan), &early);
    assert_eq!(pass.boarding_time, "23:40");
}

#[test]
fn barcode_is_derived_from_confirmation_code() {
    let pass = generate_boarding_pass(&record(1, "a@x.com", MealChoice::Vegan), &flight());
    assert_eq!(pass.barcode, barcode(&pass.confirmation_code));
    assert!(!pass.barcode.is_empty());
}

#[test]
fn unknown_meal_still_generates_with_raw_label() {
    let pass = generate_boarding_pass(
        &record(1, "a@x.com", MealChoice::Unknown("kosher".to_string())),
        &flight(),
    );
    assert_eq!(pass.meal_preference, "kosher");
    assert_eq!(pass.meal_display, "kosher");
}

#[test]
fn pass_serializes_with_wire_field_names() {
    let pass = generate_boarding_pass(&record(3, "a@x.com", MealChoice::Vegan), &flight());
    let json = serde_json::to_value(&pass).unwrap();
    assert_eq!(json["flight_number"], "AA-3010");
    assert_eq!(json["meal_preference"], "vegan");
    assert_eq!(json["booking_id"], 3);
    assert!(json["confirmation_code"].as_str().is_some_and(|code| !code.is_empty()));
}
