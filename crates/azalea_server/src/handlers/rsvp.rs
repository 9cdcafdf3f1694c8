//! Booking endpoints.
//!
//! # Responsibility
//! - Accept booking submissions and answer with the issued boarding pass.
//! - Serve the booking list, meal summary and manifest download.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use azalea_core::service::manifest::MANIFEST_CONTENT_TYPE;
use azalea_core::{
    export_manifest, generate_boarding_pass, summarize, BoardingPass, BookingError, BookingId,
    BookingRecord, BookingRequest, BookingService, BookingSummary, SortOrder,
    SqliteBookingRepository,
};
use chrono::Utc;
use log::info;
use serde::{Deserialize, Serialize};

pub const CREATED_MESSAGE: &str = "RSVP submitted successfully!";

/// Response body for a newly created booking.
#[derive(Debug, Serialize)]
pub struct CreatedBooking {
    pub message: &'static str,
    pub rsvp_id: BookingId,
    pub departure_date: String,
    pub boarding_pass: BoardingPass,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub order: Option<String>,
}

fn parse_order(raw: Option<&str>) -> Result<SortOrder, ApiError> {
    match raw.map(str::trim) {
        None | Some("") | Some("asc") => Ok(SortOrder::Ascending),
        Some("desc") => Ok(SortOrder::Descending),
        Some(other) => Err(ApiError::invalid_input(format!(
            "unsupported order `{other}`; use `asc` or `desc`"
        ))),
    }
}

pub async fn create_rsvp(
    State(state): State<AppState>,
    payload: Result<Json<BookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedBooking>), ApiError> {
    let Json(request) = payload?;
    let flight = state.flight_handle();

    let created = state
        .with_db(move |conn| {
            let service = BookingService::new(SqliteBookingRepository::new(conn));
            let record = service.create_booking(&request, flight.as_deref())?;
            let flight = flight.as_deref().ok_or(BookingError::NotConfigured)?;
            let boarding_pass = generate_boarding_pass(&record, flight);

            Ok(CreatedBooking {
                message: CREATED_MESSAGE,
                rsvp_id: record.id,
                departure_date: boarding_pass.departure_date.clone(),
                boarding_pass,
            })
        })
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_rsvps(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<BookingRecord>>, ApiError> {
    let Query(params) = params?;
    let order = parse_order(params.order.as_deref())?;

    let records = state
        .with_db(move |conn| {
            let service = BookingService::new(SqliteBookingRepository::new(conn));
            Ok(service.list_bookings(order)?)
        })
        .await?;

    Ok(Json(records))
}

pub async fn rsvp_summary(State(state): State<AppState>) -> Result<Json<BookingSummary>, ApiError> {
    let summary = state
        .with_db(|conn| {
            let service = BookingService::new(SqliteBookingRepository::new(conn));
            Ok(summarize(&service.list_bookings(SortOrder::Ascending)?))
        })
        .await?;

    Ok(Json(summary))
}

pub async fn download_manifest(State(state): State<AppState>) -> Result<Response, ApiError> {
    let flight = state.flight_handle().ok_or_else(ApiError::not_configured)?;

    let manifest = state
        .with_db(move |conn| {
            let service = BookingService::new(SqliteBookingRepository::new(conn));
            let records = service.list_bookings(SortOrder::Ascending)?;
            Ok(export_manifest(&records, &flight, Utc::now())?)
        })
        .await?;

    info!(
        "event=manifest_download module=server status=ok rows={} filename={}",
        manifest.rows, manifest.filename
    );

    let disposition = manifest.content_disposition();
    Ok((
        [
            (header::CONTENT_TYPE, MANIFEST_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        manifest.content,
    )
        .into_response())
}
