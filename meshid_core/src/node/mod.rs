//! Canonical, source-agnostic node records
//!
//! Every upstream provider is mapped onto [`NodeRecord`]. Records are built
//! once per request and never mutated afterwards.

pub mod kind;

pub use kind::{
    CompanionRole, CompanionRoleInfo, CompanionRoleTable, LookupTable, NodeType, NodeTypeInfo,
    NodeTypeTable, TableKey,
};

use crate::error::{MeshIdError, MeshIdResult};
use crate::identifier::{IdWidth, Identifier};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

const SECONDS_PER_DAY: i64 = 86_400;

/// Nodes first heard within this window are NEW
pub const NEW_WINDOW_DAYS: i64 = 2;

/// Nodes last heard within this window are ACTIVE
pub const ACTIVE_WINDOW_DAYS: i64 = 7;

/// Derived liveness of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    New,
    Active,
    Stale,
    Unknown,
}

impl NodeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeStatus::New => "new",
            NodeStatus::Active => "active",
            NodeStatus::Stale => "stale",
            NodeStatus::Unknown => "unknown",
        }
    }

    /// NEW and ACTIVE nodes count as live
    pub fn is_live(self) -> bool {
        matches!(self, NodeStatus::New | NodeStatus::Active)
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

/// Whether `timestamp` lies within `days` of `now`, in either direction.
/// Zero means "never" and is never within any window.
pub fn within_days(timestamp: i64, now: i64, days: i64) -> bool {
    let window = days.unsigned_abs().saturating_mul(SECONDS_PER_DAY as u64);
    timestamp != 0 && now.abs_diff(timestamp) <= window
}

/// `YYYY-MM-DD HH:MM:SS` in UTC, or `N/A` for an unknown time
pub fn format_timestamp(timestamp: Option<i64>) -> String {
    match timestamp
        .filter(|ts| *ts != 0)
        .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
    {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "N/A".to_string(),
    }
}

/// A device on the mesh as reported by one source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NodeRecordRepr", into = "NodeRecordRepr")]
pub struct NodeRecord {
    public_key: String,
    name: String,
    node_type: NodeType,
    is_observer: bool,
    location: Option<Coordinates>,
    created_at: i64,
    last_heard: Option<i64>,
}

impl NodeRecord {
    /// The public key must be non-empty and start with at least one long identifier's worth of hex
    pub fn new(
        public_key: impl Into<String>,
        name: impl Into<String>,
        node_type: NodeType,
    ) -> MeshIdResult<Self> {
        let public_key = public_key.into().trim().to_string();
        if public_key.is_empty() {
            return Err(MeshIdError::validation("public_key", "must not be empty"));
        }
        Identifier::from_public_key(&public_key, IdWidth::Long)?;

        Ok(Self {
            public_key,
            name: name.into(),
            node_type,
            is_observer: false,
            location: None,
            created_at: 0,
            last_heard: None,
        })
    }

    pub fn with_location(mut self, latitude: f64, longitude: f64) -> Self {
        self.location = Some(Coordinates {
            latitude,
            longitude,
        });
        self
    }

    pub fn with_coordinates(mut self, location: Option<Coordinates>) -> Self {
        self.location = location;
        self
    }

    pub fn with_observer(mut self, is_observer: bool) -> Self {
        self.is_observer = is_observer;
        self
    }

    pub fn with_created_at(mut self, created_at: i64) -> Self {
        self.created_at = created_at;
        self
    }

    /// Zero is treated as "never heard"
    pub fn with_last_heard(mut self, last_heard: i64) -> Self {
        self.last_heard = Some(last_heard).filter(|ts| *ts != 0);
        self
    }

    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn is_observer(&self) -> bool {
        self.is_observer
    }

    pub fn location(&self) -> Option<Coordinates> {
        self.location
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub fn last_heard(&self) -> Option<i64> {
        self.last_heard
    }

    /// Identifier of the given width, sliced from the front of the public key
    pub fn identifier(&self, width: IdWidth) -> Identifier {
        Identifier::from_validated(&self.public_key[..width.chars()])
    }

    /// Status relative to `now` (Unix seconds). NEW is checked before ACTIVE.
    pub fn status_at(&self, now: i64) -> NodeStatus {
        let Some(last_heard) = self.last_heard else {
            return NodeStatus::Unknown;
        };
        if within_days(self.created_at, now, NEW_WINDOW_DAYS) {
            NodeStatus::New
        } else if within_days(last_heard, now, ACTIVE_WINDOW_DAYS) {
            NodeStatus::Active
        } else {
            NodeStatus::Stale
        }
    }

    pub fn status(&self) -> NodeStatus {
        self.status_at(Utc::now().timestamp())
    }

    /// MeshCore deep link that adds this node as a contact
    pub fn contact(&self) -> String {
        format!(
            "meshcore://contact/add?name={}&public_key={}&type={}",
            urlencoding::encode(&self.name),
            self.public_key,
            self.node_type.contact_type()
        )
    }
}

/// Wire shape of a record: flat coordinates plus the derived contact link
#[derive(Debug, Clone, Serialize, Deserialize)]
struct NodeRecordRepr {
    public_key: String,
    name: String,
    node_type: NodeType,
    #[serde(default)]
    is_observer: bool,
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
    #[serde(default)]
    created_at: i64,
    #[serde(default)]
    last_heard: i64,
    #[serde(default, skip_deserializing)]
    contact: Option<String>,
}

impl TryFrom<NodeRecordRepr> for NodeRecord {
    type Error = MeshIdError;

    fn try_from(repr: NodeRecordRepr) -> Result<Self, Self::Error> {
        let location = match (repr.latitude, repr.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates {
                latitude,
                longitude,
            }),
            (None, None) => None,
            _ => {
                return Err(MeshIdError::validation(
                    "location",
                    "latitude and longitude must be given together",
                ))
            }
        };
        Ok(NodeRecord::new(repr.public_key, repr.name, repr.node_type)?
            .with_observer(repr.is_observer)
            .with_coordinates(location)
            .with_created_at(repr.created_at)
            .with_last_heard(repr.last_heard))
    }
}

impl From<NodeRecord> for NodeRecordRepr {
    fn from(record: NodeRecord) -> Self {
        let contact = Some(record.contact());
        Self {
            public_key: record.public_key,
            name: record.name,
            node_type: record.node_type,
            is_observer: record.is_observer,
            latitude: record.location.map(|l| l.latitude),
            longitude: record.location.map(|l| l.longitude),
            created_at: record.created_at,
            last_heard: record.last_heard.unwrap_or(0),
            contact,
        }
    }
}
