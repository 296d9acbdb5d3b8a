use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use meshid_core::{IdWidth, Identifier, RecordSummary, SourceFailure};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct SuggestQuery {
    pub width: Option<IdWidth>,
}

#[derive(Debug, Serialize)]
pub struct SuggestResponse {
    pub identifier: Identifier,
    pub unavailable_sources: Vec<SourceFailure>,
}

pub async fn suggest(
    State(state): State<AppState>,
    Query(query): Query<SuggestQuery>,
) -> ApiResult<Json<SuggestResponse>> {
    let set = state.working_set().await;
    let width = query.width.unwrap_or_else(|| state.engine.width());
    let identifier = state
        .engine
        .allocator()
        .suggest_free_id_with_width(set.records(), width)
        .map_err(|e| ApiError::degraded(e, set.unavailable()))?;

    tracing::debug!("suggested {} from {} records", identifier, set.len());
    Ok(Json(SuggestResponse {
        identifier,
        unavailable_sources: set.unavailable().to_vec(),
    }))
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub candidate: Identifier,
    pub valid: bool,
    pub reserved: bool,
    pub duplicated: bool,
    pub conflicts: Vec<RecordSummary>,
    pub unavailable_sources: Vec<SourceFailure>,
}

/// Candidate may be a 2 or 4 character identifier or a full public key
pub async fn check(
    State(state): State<AppState>,
    Path(candidate): Path<String>,
) -> ApiResult<Json<CheckResponse>> {
    let allocator = state.engine.allocator();
    let candidate = allocator.resolve_candidate(&candidate)?;

    let set = state.working_set().await;
    let check = allocator.check(set.records(), candidate);

    Ok(Json(CheckResponse {
        valid: check.is_valid(),
        reserved: check.reserved,
        duplicated: check.is_duplicated(),
        conflicts: check
            .conflicts
            .iter()
            .map(|r| RecordSummary::new(r, set.as_of()))
            .collect(),
        candidate: check.candidate,
        unavailable_sources: set.unavailable().to_vec(),
    }))
}

#[derive(Debug, Serialize)]
pub struct PrefillResponse {
    pub public_key_id: Identifier,
}

/// Normalize a form prefill: short identifiers are padded to long width
pub async fn prefill(Path(id): Path<String>) -> ApiResult<Json<PrefillResponse>> {
    let id = Identifier::parse(&id)?;
    Ok(Json(PrefillResponse {
        public_key_id: id.widen(),
    }))
}
