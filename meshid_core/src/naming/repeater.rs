//! Repeater and room server names
//!
//! `REGION-CITY-LANDMARK-TYPE-ID` when a city is given, otherwise
//! `REGION-LANDMARK-TYPE-ID`. Region, city, type and identifier are
//! upper-cased; the landmark keeps the caller's casing.

use super::{check_len, check_total, required};
use crate::error::{MeshIdError, MeshIdResult};
use crate::identifier::Identifier;
use crate::naming::schema::NameSchema;
use crate::node::{NodeType, NodeTypeTable};
use serde::{Deserialize, Serialize};

/// Attributes of a repeater or room server name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeaterAttributes {
    /// Regional code, usually an airport code
    pub region: String,
    /// Only meaningful together with a short landmark
    #[serde(default)]
    pub city: Option<String>,
    pub landmark: String,
    #[serde(rename = "node-type", alias = "node_type")]
    pub node_type: NodeType,
}

impl RepeaterAttributes {
    pub fn new(
        region: impl Into<String>,
        city: Option<&str>,
        landmark: impl Into<String>,
        node_type: NodeType,
    ) -> Self {
        Self {
            region: region.into(),
            city: city.map(str::to_string),
            landmark: landmark.into(),
            node_type,
        }
    }

    /// The city, if one was given; blank counts as absent
    pub fn city(&self) -> Option<&str> {
        self.city.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }
}

pub(super) fn encode(
    attrs: &RepeaterAttributes,
    id: &Identifier,
    schema: &NameSchema,
    node_types: &NodeTypeTable,
) -> MeshIdResult<String> {
    if attrs.node_type.is_companion() {
        return Err(MeshIdError::validation(
            "node_type",
            "companions are not repeaters, use the companion name schema",
        ));
    }
    let acronym = node_types.get(attrs.node_type).acronym.ok_or_else(|| {
        MeshIdError::validation(
            "node_type",
            format!("'{}' cannot be named, pick a specific role", attrs.node_type),
        )
    })?;

    let region = required("region", &attrs.region)?;
    check_len("region", region, schema.region_max, "")?;

    let landmark = required("landmark", &attrs.landmark)?;

    let name = match attrs.city() {
        Some(city) => {
            check_len("city", city, schema.city_max, "")?;
            check_len(
                "landmark",
                landmark,
                schema.landmark_with_city_max,
                " when a city is given",
            )?;
            format!(
                "{}-{}-{}-{}-{}",
                region.to_uppercase(),
                city.to_uppercase(),
                landmark,
                acronym,
                id
            )
        }
        None => {
            check_len(
                "landmark",
                landmark,
                schema.landmark_max,
                " when no city is given",
            )?;
            format!("{}-{}-{}-{}", region.to_uppercase(), landmark, acronym, id)
        }
    };

    check_total(&name, schema)?;
    Ok(name)
}
