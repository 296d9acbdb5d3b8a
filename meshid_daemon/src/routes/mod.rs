//! HTTP surface of the daemon

mod catalog;
mod contacts;
mod grid;
mod identifiers;
mod names;

use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Response header listing sources that failed while building the working set
pub const UNAVAILABLE_SOURCES_HEADER: &str = "x-meshid-unavailable-sources";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/identifiers/suggest", get(identifiers::suggest))
        .route("/identifiers/check/:candidate", get(identifiers::check))
        .route("/identifiers/prefill/:id", get(identifiers::prefill))
        .route("/grid", get(grid::grid))
        .route("/node-types", get(catalog::node_types))
        .route("/companion-roles", get(catalog::companion_roles))
        .route("/names", get(names::search))
        .route("/names/repeater", post(names::repeater))
        .route("/names/companion", post(names::companion))
        .route("/contacts/repeaters", get(contacts::repeaters))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn health() -> &'static str {
    "OK"
}
