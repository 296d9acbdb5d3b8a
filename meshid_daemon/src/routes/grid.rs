use super::UNAVAILABLE_SOURCES_HEADER;
use crate::state::AppState;
use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue},
    Json,
};
use meshid_core::OccupancyGrid;

/// Nested `row -> column -> cell` map over the short identifier space.
/// Failed sources are listed in a response header to keep the body shape fixed.
pub async fn grid(State(state): State<AppState>) -> (HeaderMap, Json<OccupancyGrid>) {
    let set = state.grid_working_set().await;
    let grid = state.engine.build_grid(&set);

    let mut headers = HeaderMap::new();
    if set.is_degraded() {
        let names: Vec<&str> = set.unavailable().iter().map(|f| f.source.as_str()).collect();
        if let Ok(value) = HeaderValue::from_str(&names.join(",")) {
            headers.insert(UNAVAILABLE_SOURCES_HEADER, value);
        }
    }

    (headers, Json(grid))
}
