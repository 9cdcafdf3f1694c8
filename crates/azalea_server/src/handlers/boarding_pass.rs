//! Boarding pass re-display.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::Json;
use azalea_core::{
    generate_boarding_pass, BoardingPass, BookingId, BookingService, SqliteBookingRepository,
};

/// Regenerates the boarding pass for a stored booking.
///
/// The pass is derived from the stored row, so it matches the one returned
/// at submission time.
pub async fn get_boarding_pass(
    State(state): State<AppState>,
    id: Result<Path<BookingId>, PathRejection>,
) -> Result<Json<BoardingPass>, ApiError> {
    let Path(id) = id?;
    let flight = state.flight_handle().ok_or_else(ApiError::not_configured)?;

    let record = state
        .with_db(move |conn| {
            let service = BookingService::new(SqliteBookingRepository::new(conn));
            Ok(service.get_booking(id)?)
        })
        .await?
        .ok_or_else(|| ApiError::not_found("booking", id))?;

    Ok(Json(generate_boarding_pass(&record, &flight)))
}
