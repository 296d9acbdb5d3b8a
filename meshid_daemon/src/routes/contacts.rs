use crate::state::AppState;
use axum::{extract::State, Json};
use meshid_core::ContactsExport;

/// Bulk-import document of every repeater and room server currently known
pub async fn repeaters(State(state): State<AppState>) -> Json<ContactsExport> {
    let set = state.working_set().await;
    let export = ContactsExport::repeaters(set.records());
    tracing::debug!("exporting {} contacts", export.len());
    Json(export)
}
