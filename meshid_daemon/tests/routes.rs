use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use meshid_core::config::MeshIdConfig;
use meshid_core::{
    Engine, IdWidth, MeshIdError, MeshIdResult, NodeRecord, NodeSource, NodeType, StaticSource,
};
use meshid_daemon::routes::UNAVAILABLE_SOURCES_HEADER;
use meshid_daemon::store::NameStore;
use meshid_daemon::{router, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

struct BrokenSource;

impl NodeSource for BrokenSource {
    fn name(&self) -> &str {
        "broken"
    }

    fn fetch(&self) -> MeshIdResult<Vec<NodeRecord>> {
        Err(MeshIdError::source_unavailable("broken", "connection timed out"))
    }
}

fn node(key: &str, name: &str, node_type: NodeType) -> NodeRecord {
    NodeRecord::new(key, name, node_type).unwrap()
}

fn fixtures() -> Vec<NodeRecord> {
    vec![
        node("3c4d5e6f", "DEN-Hill-RC-3C4D", NodeType::RoomOrRepeater),
        node("3C4D0000", "DEN-Peak-RE-3C4D", NodeType::RoomOrRepeater),
        node("5a5a5a5a", "Alice MY01", NodeType::Companion),
    ]
}

fn state_with(config: &MeshIdConfig, sources: Vec<Arc<dyn NodeSource>>) -> AppState {
    let engine = Engine::from_config(config).unwrap();
    AppState::new(engine, sources, NameStore::in_memory())
}

fn app(records: Vec<NodeRecord>) -> Router {
    let source: Arc<dyn NodeSource> = Arc::new(StaticSource::new("fixtures", records));
    router(state_with(&MeshIdConfig::default(), vec![source]))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn post(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

#[tokio::test]
async fn test_health() {
    let response = app(Vec::new())
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn test_suggest_skips_reserved_and_taken() {
    let (status, body) = get(app(Vec::new()), "/identifiers/suggest").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["identifier"], "0100");
    assert_eq!(body["unavailable_sources"], json!([]));

    let taken = vec![node("01000000", "first", NodeType::RoomOrRepeater)];
    let (_, body) = get(app(taken.clone()), "/identifiers/suggest").await;
    assert_eq!(body["identifier"], "0101");

    let (_, body) = get(app(taken), "/identifiers/suggest?width=short").await;
    assert_eq!(body["identifier"], "02");
}

#[tokio::test]
async fn test_suggest_reports_unavailable_sources() {
    let sources: Vec<Arc<dyn NodeSource>> = vec![
        Arc::new(BrokenSource),
        Arc::new(StaticSource::new("fixtures", fixtures())),
    ];
    let app = router(state_with(&MeshIdConfig::default(), sources));

    let (status, body) = get(app, "/identifiers/suggest").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["identifier"], "0100");
    assert_eq!(body["unavailable_sources"][0]["source"], "broken");
}

#[tokio::test]
async fn test_suggest_exhausted() {
    let mut config = MeshIdConfig::default();
    config.identifiers.width = IdWidth::Short;
    let records: Vec<NodeRecord> = (0..=255u32)
        .map(|i| node(&format!("{:02X}0000", i), "full", NodeType::RoomOrRepeater))
        .collect();
    let source: Arc<dyn NodeSource> = Arc::new(StaticSource::new("fixtures", records));
    let app = router(state_with(&config, vec![source]));

    let (status, body) = get(app, "/identifiers/suggest").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["kind"], "exhausted");
}

#[tokio::test]
async fn test_check_reports_duplicates() {
    let (status, body) = get(app(fixtures()), "/identifiers/check/3c4d").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["candidate"], "3C4D");
    assert_eq!(body["valid"], false);
    assert_eq!(body["reserved"], false);
    assert_eq!(body["duplicated"], true);
    assert_eq!(body["conflicts"].as_array().unwrap().len(), 2);
    assert_eq!(body["conflicts"][0]["id"], "3C");
    assert_eq!(body["conflicts"][0]["status"], "unknown");
    assert_eq!(body["conflicts"][0]["last_heard"], "N/A");
}

#[tokio::test]
async fn test_check_accepts_public_keys_and_flags_reserved() {
    let (_, body) = get(app(fixtures()), "/identifiers/check/3c4d5e6f7a8b9c0d").await;
    assert_eq!(body["candidate"], "3C4D");

    let (_, body) = get(app(fixtures()), "/identifiers/check/00ab").await;
    assert_eq!(body["reserved"], true);
    assert_eq!(body["valid"], false);
    assert_eq!(body["conflicts"], json!([]));

    let (_, body) = get(app(fixtures()), "/identifiers/check/7777").await;
    assert_eq!(body["valid"], true);
}

#[tokio::test]
async fn test_check_rejects_malformed_candidates() {
    let (status, body) = get(app(fixtures()), "/identifiers/check/xyz").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");
    assert_eq!(body["field"], "candidate");
}

#[tokio::test]
async fn test_prefill_pads_short_ids() {
    let (_, body) = get(app(Vec::new()), "/identifiers/prefill/3c").await;
    assert_eq!(body["public_key_id"], "3C00");

    let (status, _) = get(app(Vec::new()), "/identifiers/prefill/3c4").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_grid_shape_and_classification() {
    let (status, body) = get(app(fixtures()), "/grid").await;
    assert_eq!(status, StatusCode::OK);

    let rows = body.as_object().unwrap();
    assert_eq!(rows.len(), 16);
    assert!(rows.values().all(|row| row.as_object().unwrap().len() == 16));

    assert_eq!(body["3"]["C"]["tags"][0], "duplicate");
    assert_eq!(body["3"]["C"]["occupants"].as_array().unwrap().len(), 2);
    // Companions stay off the grid by default
    assert_eq!(body["5"]["A"]["tags"][0], "free");
    assert!(body["0"]["0"]["tags"]
        .as_array()
        .unwrap()
        .contains(&json!("reserved")));
}

#[tokio::test]
async fn test_grid_lists_failed_sources_in_header() {
    let sources: Vec<Arc<dyn NodeSource>> = vec![Arc::new(BrokenSource)];
    let app = router(state_with(&MeshIdConfig::default(), sources));

    let response = app
        .oneshot(Request::get("/grid").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(UNAVAILABLE_SOURCES_HEADER).unwrap(),
        "broken"
    );
}

#[tokio::test]
async fn test_reference_tables() {
    let (_, body) = get(app(Vec::new()), "/node-types").await;
    let types = body.as_array().unwrap();
    assert_eq!(types.len(), 9);
    assert!(types
        .iter()
        .any(|t| t["label"] == "Repeater - Core" && t["acronym"] == "RC"));

    let (_, body) = get(app(Vec::new()), "/companion-roles").await;
    assert_eq!(body.as_array().unwrap().len(), 8);
}

#[tokio::test]
async fn test_repeater_name_with_suggested_id() {
    let (status, body) = post(
        app(fixtures()),
        "/names/repeater",
        json!({"region": "den", "landmark": "Hill", "node-type": "Repeater - Core"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "DEN-Hill-RC-0100");
    assert_eq!(body["public_key_id"], "0100");
    assert_eq!(
        body["import_json_file_name"],
        "meshid_repeater_config_DEN-Hill-RC-0100"
    );
    assert!(body.get("import_json").is_none());
}

#[tokio::test]
async fn test_repeater_name_rejects_taken_id() {
    let (status, body) = post(
        app(fixtures()),
        "/names/repeater",
        json!({
            "region": "DEN",
            "landmark": "Hill",
            "node-type": "Repeater - Core",
            "public-key-id": "3c4d"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "conflict");

    let (status, _) = post(
        app(fixtures()),
        "/names/repeater",
        json!({
            "region": "DEN",
            "landmark": "Hill",
            "node-type": "Repeater - Core",
            "public-key-id": "ff"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_repeater_name_validation_error() {
    let (status, body) = post(
        app(Vec::new()),
        "/names/repeater",
        json!({
            "region": "DEN",
            "city": "DENVR",
            "landmark": "CHESSMN",
            "node-type": "Repeater - Core"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "landmark");
}

#[tokio::test]
async fn test_named_device_is_stored_and_searchable() {
    let state = {
        let source: Arc<dyn NodeSource> = Arc::new(StaticSource::new("fixtures", fixtures()));
        state_with(&MeshIdConfig::default(), vec![source])
    };

    // Another device already holds 3C4D
    let (status, body) = post(
        router(state.clone()),
        "/names/repeater",
        json!({
            "region": "DEN",
            "landmark": "Hill",
            "node-type": "Repeater - Edge",
            "public-key": "3c4d5e6f"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{}", body);

    let (status, body) = post(
        router(state.clone()),
        "/names/repeater",
        json!({
            "region": "DEN",
            "landmark": "Ridge",
            "node-type": "Repeater - Edge",
            "public-key": "7e7e1234"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "DEN-Ridge-RE-7E7E");

    let (_, body) = get(router(state), "/names?partial=Ridge").await;
    assert_eq!(body, json!([{"public_key": "7e7e1234", "name": "DEN-Ridge-RE-7E7E"}]));
}

#[tokio::test]
async fn test_own_record_is_not_a_conflict() {
    let records = vec![node("6b6b0001", "old name", NodeType::RoomOrRepeater)];
    let (status, body) = post(
        app(records),
        "/names/repeater",
        json!({
            "region": "DEN",
            "landmark": "Hill",
            "node-type": "Repeater - Edge",
            "public-key": "6B6B0001"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "DEN-Hill-RE-6B6B");
}

#[tokio::test]
async fn test_mismatched_key_and_id() {
    let (status, body) = post(
        app(Vec::new()),
        "/names/companion",
        json!({
            "handle": "Alice",
            "suffix-number": 1,
            "public-key-id": "1234",
            "public-key": "56789abc"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "public_key");
}

#[tokio::test]
async fn test_long_id_rejected_on_short_deployment() {
    let mut config = MeshIdConfig::default();
    config.identifiers.width = IdWidth::Short;
    let source: Arc<dyn NodeSource> = Arc::new(StaticSource::new("fixtures", Vec::new()));
    let state = state_with(&config, vec![source]);

    let (status, body) = post(
        router(state.clone()),
        "/names/repeater",
        json!({
            "region": "DEN",
            "landmark": "Hill",
            "node-type": "Repeater - Core",
            "public-key-id": "7e7e"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");
    assert_eq!(body["field"], "public_key_id");

    let (status, body) = post(
        router(state),
        "/names/repeater",
        json!({
            "region": "DEN",
            "landmark": "Hill",
            "node-type": "Repeater - Core",
            "public-key-id": "7e"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "DEN-Hill-RC-7E");
}

#[tokio::test]
async fn test_companion_names() {
    let (status, body) = post(
        app(fixtures()),
        "/names/companion",
        json!({"handle": "Alice", "role-type": "primary"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Alice PRIM");
    assert_eq!(
        body["import_json_file_name"],
        "meshid_companion_config_Alice PRIM"
    );

    let (_, body) = post(app(fixtures()), "/names/companion", json!({"handle": "Bob"})).await;
    assert_eq!(body["name"], "Bob 0100");

    let (status, body) = post(
        app(fixtures()),
        "/names/companion",
        json!({"handle": "Bartholomew", "suffix-number": 1}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "handle");
}

#[tokio::test]
async fn test_settings_template_is_filled() {
    let source: Arc<dyn NodeSource> = Arc::new(StaticSource::new("fixtures", Vec::new()));
    let state = state_with(&MeshIdConfig::default(), vec![source])
        .with_settings(json!({"name": "", "radio": {"freq": 910.525}}));

    let (_, body) = post(
        router(state),
        "/names/companion",
        json!({"handle": "Alice", "suffix-number": 3}),
    )
    .await;
    assert_eq!(body["import_json"]["name"], "Alice MY03");
    assert_eq!(body["import_json"]["radio"]["freq"], 910.525);
}

#[tokio::test]
async fn test_repeater_contacts_export() {
    let (status, body) = get(app(fixtures()), "/contacts/repeaters").await;
    assert_eq!(status, StatusCode::OK);
    let contacts = body["contacts"].as_array().unwrap();
    assert_eq!(contacts.len(), 2);
    assert!(contacts.iter().all(|c| c["type"] == 2));
}
