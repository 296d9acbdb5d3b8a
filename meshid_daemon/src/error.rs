use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use meshid_core::{Identifier, MeshIdError, SourceFailure};
use serde::Serialize;

/// Failure body returned by every route
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// `validation`, `exhausted`, `conflict` or `internal`
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unavailable_sources: Vec<SourceFailure>,
}

#[derive(Debug)]
pub enum ApiError {
    Core(MeshIdError),
    /// A caller-chosen identifier that is reserved or already held
    Conflict {
        candidate: Identifier,
        message: String,
    },
    /// Core error that happened against a degraded working set
    Degraded(MeshIdError, Vec<SourceFailure>),
}

impl ApiError {
    pub fn degraded(err: MeshIdError, unavailable: &[SourceFailure]) -> Self {
        if unavailable.is_empty() {
            ApiError::Core(err)
        } else {
            ApiError::Degraded(err, unavailable.to_vec())
        }
    }
}

impl From<MeshIdError> for ApiError {
    fn from(err: MeshIdError) -> Self {
        ApiError::Core(err)
    }
}

fn core_response(err: MeshIdError, unavailable: Vec<SourceFailure>) -> (StatusCode, ErrorBody) {
    let (status, kind) = match &err {
        MeshIdError::Validation { .. } => (StatusCode::BAD_REQUEST, "validation"),
        MeshIdError::Exhaustion { .. } => (StatusCode::SERVICE_UNAVAILABLE, "exhausted"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
    };
    if status.is_server_error() {
        tracing::warn!("request failed: {}", err);
    }
    (
        status,
        ErrorBody {
            kind,
            field: err.field().map(str::to_string),
            message: err.to_string(),
            unavailable_sources: unavailable,
        },
    )
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Core(err) => core_response(err, Vec::new()),
            ApiError::Degraded(err, unavailable) => core_response(err, unavailable),
            ApiError::Conflict { candidate, message } => (
                StatusCode::CONFLICT,
                ErrorBody {
                    kind: "conflict",
                    field: Some("public_key_id".to_string()),
                    message: format!("{}: {}", candidate, message),
                    unavailable_sources: Vec::new(),
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
