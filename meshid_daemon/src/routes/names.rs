use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::store::StoredName;
use axum::{
    extract::{Query, State},
    Json,
};
use meshid_core::{
    ids_conflict, CompanionAttributes, IdWidth, Identifier, MeshIdError, RepeaterAttributes,
    SourceFailure,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct RepeaterRequest {
    #[serde(flatten)]
    pub attributes: RepeaterAttributes,
    #[serde(default, rename = "public-key-id", alias = "public_key_id")]
    pub public_key_id: Option<String>,
    #[serde(default, rename = "public-key", alias = "public_key")]
    pub public_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompanionRequest {
    #[serde(flatten)]
    pub attributes: CompanionAttributes,
    #[serde(default, rename = "public-key-id", alias = "public_key_id")]
    pub public_key_id: Option<String>,
    #[serde(default, rename = "public-key", alias = "public_key")]
    pub public_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NameResponse {
    pub name: String,
    pub public_key_id: Identifier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import_json: Option<Value>,
    pub import_json_file_name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unavailable_sources: Vec<SourceFailure>,
}

pub async fn repeater(
    State(state): State<AppState>,
    Json(request): Json<RepeaterRequest>,
) -> ApiResult<Json<NameResponse>> {
    let public_key = blank_to_none(request.public_key.as_deref());
    let (id, unavailable) =
        resolve_identifier(&state, blank_to_none(request.public_key_id.as_deref()), public_key)
            .await?;

    let name = state.engine.codec().encode_repeater(&request.attributes, &id)?;
    Ok(Json(
        finish(&state, "repeater", name, id, public_key, unavailable).await,
    ))
}

pub async fn companion(
    State(state): State<AppState>,
    Json(request): Json<CompanionRequest>,
) -> ApiResult<Json<NameResponse>> {
    let public_key = blank_to_none(request.public_key.as_deref());
    let (id, unavailable) =
        resolve_identifier(&state, blank_to_none(request.public_key_id.as_deref()), public_key)
            .await?;

    let name = state
        .engine
        .codec()
        .encode_companion(&request.attributes, Some(&id))?;
    Ok(Json(
        finish(&state, "companion", name, id, public_key, unavailable).await,
    ))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub partial: String,
}

pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<StoredName>> {
    Json(state.store.matching_partial_name(&query.partial))
}

fn blank_to_none(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Pick the identifier a new name is built around.
///
/// A caller-supplied identifier or public key is re-checked against fresh
/// data; a device's own record never conflicts with itself. Without either,
/// the lowest free identifier is suggested.
async fn resolve_identifier(
    state: &AppState,
    requested: Option<&str>,
    public_key: Option<&str>,
) -> ApiResult<(Identifier, Vec<SourceFailure>)> {
    let width = state.engine.width();
    let allocator = state.engine.allocator();

    let requested = match (requested, public_key) {
        (Some(raw), key) => {
            let id = fit_width(Identifier::parse(raw)?, width)?;
            if let Some(key) = key {
                if !ids_conflict(key, id.as_str()) {
                    return Err(MeshIdError::validation(
                        "public_key",
                        format!("does not start with identifier {}", id),
                    )
                    .into());
                }
            }
            Some(id)
        }
        (None, Some(key)) => Some(Identifier::from_public_key(key, width)?),
        (None, None) => None,
    };

    let set = state.working_set().await;
    let unavailable = set.unavailable().to_vec();

    let Some(id) = requested else {
        let id = allocator
            .suggest_free_id(set.records())
            .map_err(|e| ApiError::degraded(e, &unavailable))?;
        return Ok((id, unavailable));
    };

    let check = allocator.check(set.records(), id);
    if check.reserved {
        return Err(ApiError::Conflict {
            candidate: check.candidate,
            message: "identifier is reserved".to_string(),
        });
    }
    let others: Vec<&str> = check
        .conflicts
        .iter()
        .filter(|r| public_key.map_or(true, |key| !r.public_key().eq_ignore_ascii_case(key)))
        .map(|r| r.name())
        .collect();
    if !others.is_empty() {
        return Err(ApiError::Conflict {
            message: format!("identifier is already used by {}", others.join(", ")),
            candidate: check.candidate,
        });
    }

    Ok((check.candidate, unavailable))
}

/// A short identifier on a long-width deployment is padded with `00`.
/// A long identifier on a short-width deployment is rejected.
fn fit_width(id: Identifier, width: IdWidth) -> Result<Identifier, MeshIdError> {
    match (id.width(), width) {
        (IdWidth::Short, IdWidth::Long) => Ok(id.widen()),
        (IdWidth::Long, IdWidth::Short) => Err(MeshIdError::validation(
            "public_key_id",
            format!("must be {} characters long", IdWidth::Short.chars()),
        )),
        _ => Ok(id),
    }
}

async fn finish(
    state: &AppState,
    kind: &str,
    name: String,
    id: Identifier,
    public_key: Option<&str>,
    unavailable: Vec<SourceFailure>,
) -> NameResponse {
    if let Some(key) = public_key {
        let store = state.store.clone();
        let (key, stored) = (key.to_string(), name.clone());
        if let Err(e) = tokio::task::spawn_blocking(move || store.save(&key, &stored)).await {
            tracing::error!("name store task failed: {}", e);
        }
    }
    tracing::info!("generated {} name '{}' for {}", kind, name, id);

    let import_json = state.settings.as_deref().map(|template| {
        let mut settings = template.clone();
        if let Some(fields) = settings.as_object_mut() {
            fields.insert("name".to_string(), Value::String(name.clone()));
        }
        settings
    });

    NameResponse {
        import_json_file_name: format!("meshid_{}_config_{}", kind, name),
        name,
        public_key_id: id,
        import_json,
        unavailable_sources: unavailable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_width() {
        let short = Identifier::parse("3c").unwrap();
        assert_eq!(fit_width(short.clone(), IdWidth::Long).unwrap().as_str(), "3C00");
        assert_eq!(fit_width(short, IdWidth::Short).unwrap().as_str(), "3C");

        let long = Identifier::parse("3c4d").unwrap();
        assert_eq!(fit_width(long.clone(), IdWidth::Long).unwrap().as_str(), "3C4D");
        let err = fit_width(long, IdWidth::Short).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.field(), Some("public_key_id"));
    }

    #[test]
    fn test_request_wire_names() {
        let request: RepeaterRequest = serde_json::from_value(serde_json::json!({
            "region": "DEN",
            "landmark": "Hill",
            "node-type": "Repeater - Core",
            "public-key-id": "3c4d"
        }))
        .unwrap();
        assert_eq!(request.public_key_id.as_deref(), Some("3c4d"));
        assert!(request.public_key.is_none());

        let request: CompanionRequest = serde_json::from_value(serde_json::json!({
            "handle": "Alice",
            "suffix-number": 2,
            "public_key": "3c4d5e6f"
        }))
        .unwrap();
        assert_eq!(request.attributes.role_counter, Some(2));
        assert_eq!(request.public_key.as_deref(), Some("3c4d5e6f"));
    }
}
