use crate::state::AppState;
use axum::{extract::State, Json};
use meshid_core::node::{CompanionRoleInfo, NodeTypeInfo};

pub async fn node_types(State(state): State<AppState>) -> Json<Vec<NodeTypeInfo>> {
    Json(state.engine.codec().node_types().iter().cloned().collect())
}

pub async fn companion_roles(State(state): State<AppState>) -> Json<Vec<CompanionRoleInfo>> {
    Json(state.engine.codec().companion_roles().iter().cloned().collect())
}
