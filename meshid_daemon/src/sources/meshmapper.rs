use super::{http_get, map_rows, parse_timestamp, unavailable};
use meshid_core::{MeshIdResult, NodeRecord, NodeSource, NodeType};
use serde::Deserialize;
use serde_json::Value;

/// One row of the MeshMapper repeater list. Unused columns are ignored.
#[derive(Debug, Deserialize)]
struct MeshMapperRepeater {
    hex_id: String,
    name: String,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    #[serde(default)]
    last_heard: i64,
    #[serde(default)]
    created_at: Option<String>,
}

/// MeshMapper repeater API, e.g. `https://den.meshmapper.net/api.php?request=repeaters`.
/// Only repeaters and room servers are listed, without their exact role.
pub struct MeshMapperSource {
    name: String,
    url: String,
}

impl MeshMapperSource {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
        }
    }

    /// Map a bare JSON array response body
    pub fn parse(&self, body: &str) -> MeshIdResult<Vec<NodeRecord>> {
        let rows: Vec<Value> = serde_json::from_str(body).map_err(|e| unavailable(&self.name, e))?;
        Ok(map_rows(&self.name, rows, to_record))
    }
}

impl NodeSource for MeshMapperSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> MeshIdResult<Vec<NodeRecord>> {
        let body = http_get(&self.name, &self.url)?;
        self.parse(&body)
    }
}

fn to_record(row: MeshMapperRepeater) -> MeshIdResult<NodeRecord> {
    let location = match (row.lat, row.lon) {
        (Some(latitude), Some(longitude)) => Some(meshid_core::node::Coordinates {
            latitude,
            longitude,
        }),
        _ => None,
    };
    Ok(
        NodeRecord::new(row.hex_id, row.name, NodeType::RoomOrRepeater)?
            .with_coordinates(location)
            .with_created_at(row.created_at.as_deref().and_then(parse_timestamp).unwrap_or(0))
            .with_last_heard(row.last_heard),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshid_core::MeshIdError;

    #[test]
    fn test_parse_repeater_rows() {
        let body = r#"[
            {
                "id": "17", "hex_id": "A1B2C3D4", "name": "DEN-Hill-RC-A1B2",
                "lat": 39.75, "lon": -105.0, "last_heard": 1760000000,
                "created_at": "2025-06-01 12:00:00", "enabled": 1, "power": "1W",
                "iata": "DEN", "can_reach": null, "notes": null, "locked": 0
            },
            {"id": "18", "hex_id": "zz", "name": "bad key", "lat": 0, "lon": 0, "last_heard": 0}
        ]"#;

        let source = MeshMapperSource::new("meshmapper", "http://unused");
        let records = source.parse(body).unwrap();
        assert_eq!(records.len(), 1);

        let hill = &records[0];
        assert_eq!(hill.node_type(), NodeType::RoomOrRepeater);
        assert!(!hill.is_observer());
        assert_eq!(hill.last_heard(), Some(1_760_000_000));
        assert_eq!(hill.created_at(), 1_748_779_200);
        assert_eq!(hill.location().unwrap().longitude, -105.0);
    }

    #[test]
    fn test_object_body_is_unavailable() {
        let source = MeshMapperSource::new("meshmapper", "http://unused");
        assert!(matches!(
            source.parse(r#"{"error": "rate limited"}"#).unwrap_err(),
            MeshIdError::SourceUnavailable { .. }
        ));
    }
}
