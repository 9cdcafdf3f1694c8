use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use azalea_core::FlightConfigView;

pub async fn get_flight_config(State(state): State<AppState>) -> Json<FlightConfigView> {
    Json(FlightConfigView::from_config(state.flight()))
}
