use azalea_core::db::open_db_in_memory;
use azalea_core::service::boarding_pass::confirmation_code;
use azalea_core::service::manifest::{manifest_filename, MANIFEST_HEADER};
use azalea_core::{
    export_manifest, summarize, BookingRecord, BookingRequest, BookingService, FlightConfig,
    MealChoice, SortOrder, SqliteBookingRepository,
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};

fn flight() -> FlightConfig {
    FlightConfig::new(NaiveDate::from_ymd_opt(2025, 10, 30).unwrap())
        .with_flight_number("AA-3010")
        .with_destination("Padang")
}

fn generated_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 2, 8, 0, 5).unwrap()
}

fn seeded_records() -> Vec<BookingRecord> {
    let conn = open_db_in_memory().unwrap();
    let service = BookingService::new(SqliteBookingRepository::new(&conn));
    let submissions = [
        BookingRequest::new("a@x.com", "vegan"),
        BookingRequest::new("b@x.com", "vegan"),
        BookingRequest::new("c@x.com", "shrimp-aglio-olio"),
        BookingRequest::new("d@x.com", "other").with_details("No \"spicy\", please, thanks"),
    ];
    for request in &submissions {
        service.create_booking(request, Some(&flight())).unwrap();
    }
    service.list_bookings(SortOrder::Ascending).unwrap()
}

fn data_rows(content: &[u8]) -> Vec<csv::StringRecord> {
    let text = std::str::from_utf8(content).unwrap();
    let body: String = text
        .lines()
        .filter(|line| !line.starts_with('#'))
        .map(|line| format!("{line}\n"))
        .collect();
    let mut reader = csv::Reader::from_reader(body.as_bytes());
    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.iter().collect::<Vec<_>>(), MANIFEST_HEADER);
    reader.records().map(Result::unwrap).collect()
}

#[test]
fn summary_counts_sum_to_total() {
    let records = seeded_records();
    let summary = summarize(&records);

    assert_eq!(summary.total_passengers, records.len());
    let sum: usize = summary.meal_summary.values().map(|meal| meal.count).sum();
    assert_eq!(sum, summary.total_passengers);
    assert_eq!(summary.meal_summary["vegan"].count, 2);
    assert_eq!(summary.meal_summary["vegan"].label, "Vegan Meals (VEGN)");
    assert_eq!(
        summary.meal_summary["shrimp-aglio-olio"].label,
        "Shrimp Linguine Aglio Olio"
    );
}

#[test]
fn summary_omits_meals_without_bookings() {
    let summary = summarize(&seeded_records());
    assert!(!summary.meal_summary.contains_key("carbonara-funghi"));
    assert!(!summary.meal_summary.contains_key("none"));
    assert_eq!(summary.meal_summary.len(), 3);
}

#[test]
fn summary_of_empty_store_is_empty() {
    let summary = summarize(&[]);
    assert_eq!(summary.total_passengers, 0);
    assert!(summary.meal_summary.is_empty());
}

#[test]
fn summary_labels_unknown_codes_with_raw_code() {
    let mut records = seeded_records();
    records[0].dietary_option = MealChoice::Unknown("kosher".to_string());

    let summary = summarize(&records);
    assert_eq!(summary.meal_summary["kosher"].label, "kosher");
    assert_eq!(summary.meal_summary["kosher"].count, 1);
}

#[test]
fn summary_serializes_to_wire_shape() {
    let json = serde_json::to_value(summarize(&seeded_records())).unwrap();
    assert_eq!(json["total_passengers"], 4);
    assert_eq!(json["meal_summary"]["vegan"]["count"], 2);
    assert_eq!(json["meal_summary"]["other"]["label"], "Special Dietary Requests");
}

#[test]
fn export_has_one_row_per_record_with_summary_labels() {
    let records = seeded_records();
    let summary = summarize(&records);
    let manifest = export_manifest(&records, &flight(), generated_at()).unwrap();

    let rows = data_rows(&manifest.content);
    assert_eq!(rows.len(), records.len());
    assert_eq!(manifest.rows, records.len());

    for (row, record) in rows.iter().zip(&records) {
        assert_eq!(&row[0], record.id.to_string());
        assert_eq!(&row[2], record.email);
        assert_eq!(&row[3], summary.meal_summary[record.dietary_option.code()].label);
        assert_eq!(&row[5], confirmation_code(record));
        assert_eq!(&row[6], "2025-10-30");
    }
}

#[test]
fn export_quotes_fields_with_delimiters_and_quotes() {
    let records = seeded_records();
    let manifest = export_manifest(&records, &flight(), generated_at()).unwrap();
    let text = String::from_utf8(manifest.content.clone()).unwrap();

    assert!(text.contains(r#""No ""spicy"", please, thanks""#));
    let rows = data_rows(&manifest.content);
    assert_eq!(&rows[3][4], r#"No "spicy", please, thanks"#);
}

#[test]
fn export_preamble_carries_flight_and_meal_summary() {
    let manifest = export_manifest(&seeded_records(), &flight(), generated_at()).unwrap();
    let text = String::from_utf8(manifest.content).unwrap();

    assert!(text.starts_with("# Azalea Air Flight AA-3010 - Passenger Manifest\n"));
    assert!(text.contains("# Generated on: 2025-10-02 08:00:05 UTC\n"));
    assert!(text.contains("# Total Passengers: 4\n"));
    assert!(text.contains("# Vegan Meals (VEGN): 2\n"));
}

#[test]
fn export_of_empty_store_has_header_only() {
    let manifest = export_manifest(&[], &flight(), generated_at()).unwrap();
    assert_eq!(manifest.rows, 0);
    assert!(data_rows(&manifest.content).is_empty());
}

#[test]
fn filename_and_disposition_name_the_manifest() {
    let manifest = export_manifest(&[], &flight(), generated_at()).unwrap();
    assert_eq!(
        manifest.filename,
        "AzaleaAir_Flight_AA3010_PassengerManifest_20251002_080005.csv"
    );
    assert_eq!(manifest.filename, manifest_filename(&flight(), generated_at()));
    assert_eq!(
        manifest.content_disposition(),
        "attachment; filename=AzaleaAir_Flight_AA3010_PassengerManifest_20251002_080005.csv"
    );
}
