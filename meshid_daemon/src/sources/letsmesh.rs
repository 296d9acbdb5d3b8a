use super::{http_get, map_rows, parse_timestamp, unavailable};
use meshid_core::{MeshIdError, MeshIdResult, NodeRecord, NodeSource, NodeType};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct NodesResponse {
    nodes: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct LetsMeshLocation {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct LetsMeshNode {
    public_key: String,
    name: String,
    /// 1 companion, 2 repeater, 3 room server
    device_role: u8,
    #[serde(default)]
    first_seen: Option<String>,
    #[serde(default)]
    last_seen: Option<String>,
    #[serde(default)]
    is_mqtt_connected: bool,
    #[serde(default)]
    location: Option<LetsMeshLocation>,
}

/// LetsMesh node API, e.g. `https://api.letsmesh.net/api/nodes?region=DEN`
pub struct LetsMeshSource {
    name: String,
    url: String,
}

impl LetsMeshSource {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
        }
    }

    /// Map a `{"nodes": [...]}` response body
    pub fn parse(&self, body: &str) -> MeshIdResult<Vec<NodeRecord>> {
        let response: NodesResponse =
            serde_json::from_str(body).map_err(|e| unavailable(&self.name, e))?;
        Ok(map_rows(&self.name, response.nodes, to_record))
    }
}

impl NodeSource for LetsMeshSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> MeshIdResult<Vec<NodeRecord>> {
        let body = http_get(&self.name, &self.url)?;
        self.parse(&body)
    }
}

fn to_record(node: LetsMeshNode) -> MeshIdResult<NodeRecord> {
    // The API does not say which repeater or room role a node plays
    let node_type = match node.device_role {
        1 => NodeType::Companion,
        2 | 3 => NodeType::RoomOrRepeater,
        other => {
            return Err(MeshIdError::validation(
                "device_role",
                format!("unknown device role {}", other),
            ))
        }
    };

    let mut record = NodeRecord::new(node.public_key, node.name, node_type)?
        .with_observer(!node.is_mqtt_connected)
        .with_created_at(node.first_seen.as_deref().and_then(parse_timestamp).unwrap_or(0))
        .with_last_heard(node.last_seen.as_deref().and_then(parse_timestamp).unwrap_or(0));
    if let Some(loc) = node.location {
        record = record.with_location(loc.latitude, loc.longitude);
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "nodes": [
            {
                "public_key": "3c4d5e6f",
                "name": "Alice PRIM",
                "device_role": 1,
                "regions": ["DEN"],
                "first_seen": "2025-01-01T00:00:00.000Z",
                "last_seen": "2025-01-02T00:00:00.000Z",
                "is_mqtt_connected": true,
                "location": {"latitude": 39.7, "longitude": -104.9}
            },
            {
                "public_key": "a1b2c3d4",
                "name": "DEN-Hill-RC-A1B2",
                "device_role": 2,
                "regions": ["DEN"],
                "first_seen": "2025-01-01T00:00:00.000Z",
                "last_seen": "2025-01-03T00:00:00.000Z",
                "is_mqtt_connected": false
            },
            {"public_key": "", "name": "broken", "device_role": 2},
            {"public_key": "b1b2c3d4", "name": "odd", "device_role": 9},
            {"name": "no key"}
        ]
    }"#;

    #[test]
    fn test_parse_maps_rows_and_skips_bad_ones() {
        let source = LetsMeshSource::new("letsmesh", "http://unused");
        let records = source.parse(BODY).unwrap();
        assert_eq!(records.len(), 2);

        let alice = &records[0];
        assert_eq!(alice.node_type(), NodeType::Companion);
        assert!(!alice.is_observer());
        assert_eq!(alice.created_at(), 1_735_689_600);
        assert_eq!(alice.last_heard(), Some(1_735_776_000));
        assert_eq!(alice.location().unwrap().latitude, 39.7);

        let hill = &records[1];
        assert_eq!(hill.node_type(), NodeType::RoomOrRepeater);
        assert!(hill.is_observer());
        assert!(hill.location().is_none());
    }

    #[test]
    fn test_malformed_body_is_unavailable() {
        let source = LetsMeshSource::new("letsmesh", "http://unused");
        let err = source.parse("<html>").unwrap_err();
        assert!(matches!(err, MeshIdError::SourceUnavailable { .. }));
    }
}
