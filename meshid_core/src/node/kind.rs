//! Node type and companion role vocabularies
//!
//! Acronyms and descriptions live in static tables. A [`LookupTable`] is built
//! once from a table and refuses to build if any variant is missing or
//! duplicated, so lookups afterwards cannot fail.

use crate::error::{MeshIdError, MeshIdResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Enumerable keys for a [`LookupTable`]
pub trait TableKey: Copy + Eq + fmt::Debug + 'static {
    const ALL: &'static [Self];

    /// Position of this variant in [`TableKey::ALL`]
    fn index(self) -> usize;
}

/// Every variant mapped to exactly one static entry
#[derive(Debug)]
pub struct LookupTable<K: TableKey, E: 'static> {
    entries: Vec<&'static E>,
    _key: std::marker::PhantomData<K>,
}

impl<K: TableKey, E: 'static> LookupTable<K, E> {
    pub fn build(entries: &'static [E], key_of: fn(&E) -> K) -> MeshIdResult<Self> {
        let mut resolved = Vec::with_capacity(K::ALL.len());
        for key in K::ALL {
            let mut matches = entries.iter().filter(|e| key_of(e) == *key);
            match (matches.next(), matches.next()) {
                (Some(entry), None) => resolved.push(entry),
                (None, _) => {
                    return Err(MeshIdError::config(format!(
                        "lookup table has no entry for {:?}",
                        key
                    )))
                }
                (Some(_), Some(_)) => {
                    return Err(MeshIdError::config(format!(
                        "lookup table has duplicate entries for {:?}",
                        key
                    )))
                }
            }
        }
        Ok(Self {
            entries: resolved,
            _key: std::marker::PhantomData,
        })
    }

    pub fn get(&self, key: K) -> &'static E {
        self.entries[key.index()]
    }

    /// Entries in variant order
    pub fn iter(&self) -> impl Iterator<Item = &'static E> + '_ {
        self.entries.iter().copied()
    }
}

/// Role of a node on the mesh
///
/// Serialized as its human label, which is also what the name forms submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    #[serde(rename = "Repeater - Core")]
    RepeaterCore,
    #[serde(rename = "Repeater - Distributor")]
    RepeaterDistributor,
    #[serde(rename = "Repeater - Edge")]
    RepeaterEdge,
    #[serde(rename = "Repeater - Mobile")]
    RepeaterMobile,
    #[serde(rename = "Room Server - Standard")]
    RoomServerStandard,
    #[serde(rename = "Room Server - Mobile")]
    RoomServerMobile,
    #[serde(rename = "Room Server - Repeat Enabled")]
    RoomServerRepeatEnabled,
    #[serde(rename = "Companion")]
    Companion,
    /// Upstream data says "repeater or room server" without saying which
    #[serde(rename = "Room or Repeater")]
    RoomOrRepeater,
}

impl NodeType {
    pub fn is_companion(self) -> bool {
        self == NodeType::Companion
    }

    pub fn is_room_server(self) -> bool {
        matches!(
            self,
            NodeType::RoomServerStandard
                | NodeType::RoomServerMobile
                | NodeType::RoomServerRepeatEnabled
        )
    }

    /// Human label, identical to the wire name
    pub fn label(self) -> &'static str {
        match self {
            NodeType::RepeaterCore => "Repeater - Core",
            NodeType::RepeaterDistributor => "Repeater - Distributor",
            NodeType::RepeaterEdge => "Repeater - Edge",
            NodeType::RepeaterMobile => "Repeater - Mobile",
            NodeType::RoomServerStandard => "Room Server - Standard",
            NodeType::RoomServerMobile => "Room Server - Mobile",
            NodeType::RoomServerRepeatEnabled => "Room Server - Repeat Enabled",
            NodeType::Companion => "Companion",
            NodeType::RoomOrRepeater => "Room or Repeater",
        }
    }

    /// Device type code used in MeshCore contact links
    pub fn contact_type(self) -> u8 {
        if self.is_companion() {
            1
        } else if self.is_room_server() {
            3
        } else {
            2
        }
    }
}

impl TableKey for NodeType {
    const ALL: &'static [Self] = &[
        NodeType::RepeaterCore,
        NodeType::RepeaterDistributor,
        NodeType::RepeaterEdge,
        NodeType::RepeaterMobile,
        NodeType::RoomServerStandard,
        NodeType::RoomServerMobile,
        NodeType::RoomServerRepeatEnabled,
        NodeType::Companion,
        NodeType::RoomOrRepeater,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeTypeInfo {
    pub node_type: NodeType,
    /// Two-letter suffix used in repeater names; `None` for types that cannot be named as repeaters
    pub acronym: Option<&'static str>,
    pub label: &'static str,
    pub description: &'static str,
}

const NODE_TYPE_INFO: &[NodeTypeInfo] = &[
    NodeTypeInfo {
        node_type: NodeType::RepeaterEdge,
        acronym: Some("RE"),
        label: "Repeater - Edge",
        description: "A repeater that connects a neighborhood or building to distributor or core repeaters. Should be installed on residential rooftops or near windows.",
    },
    NodeTypeInfo {
        node_type: NodeType::RepeaterDistributor,
        acronym: Some("RD"),
        label: "Repeater - Distributor",
        description: "A repeater that bridges core repeaters and edge repeaters. Should be placed in a fixed, elevated suburban location.",
    },
    NodeTypeInfo {
        node_type: NodeType::RepeaterCore,
        acronym: Some("RC"),
        label: "Repeater - Core",
        description: "A backbone repeater permanently installed at a fixed, high-elevation location. Coordinate with the community before installing one.",
    },
    NodeTypeInfo {
        node_type: NodeType::RepeaterMobile,
        acronym: Some("RM"),
        label: "Repeater - Mobile",
        description: "A repeater that is temporarily installed, moved between locations, or installed in a vehicle.",
    },
    NodeTypeInfo {
        node_type: NodeType::RoomServerStandard,
        acronym: Some("TS"),
        label: "Room Server - Standard",
        description: "A room server permanently installed at a fixed location.",
    },
    NodeTypeInfo {
        node_type: NodeType::RoomServerMobile,
        acronym: Some("TM"),
        label: "Room Server - Mobile",
        description: "A room server that is temporarily installed, moved between locations, or installed in a vehicle.",
    },
    NodeTypeInfo {
        node_type: NodeType::RoomServerRepeatEnabled,
        acronym: Some("TR"),
        label: "Room Server - Repeat Enabled",
        description: "A room server with repeating enabled. Supported, but not recommended.",
    },
    NodeTypeInfo {
        node_type: NodeType::Companion,
        acronym: None,
        label: "Companion",
        description: "A personal device carried by a user. Named with the companion schema.",
    },
    NodeTypeInfo {
        node_type: NodeType::RoomOrRepeater,
        acronym: None,
        label: "Room or Repeater",
        description: "A repeater or room server whose exact role is not reported by the data source.",
    },
];

/// Node type lookup table
pub type NodeTypeTable = LookupTable<NodeType, NodeTypeInfo>;

impl NodeTypeTable {
    pub fn standard() -> MeshIdResult<Self> {
        Self::build(NODE_TYPE_INFO, |e| e.node_type)
    }
}

/// Purpose of a companion device, rendered as a 4-letter name suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompanionRole {
    #[serde(alias = "PRIM")]
    Primary,
    #[serde(alias = "SECD")]
    Secondary,
    #[serde(alias = "TERT")]
    Tertiary,
    #[serde(alias = "BKUP")]
    Backup,
    #[serde(alias = "EMRG")]
    Emergency,
    #[serde(alias = "MOBL")]
    Mobile,
    #[serde(alias = "VHCL")]
    Vehicle,
    #[serde(alias = "HOME")]
    Home,
}

impl TableKey for CompanionRole {
    const ALL: &'static [Self] = &[
        CompanionRole::Primary,
        CompanionRole::Secondary,
        CompanionRole::Tertiary,
        CompanionRole::Backup,
        CompanionRole::Emergency,
        CompanionRole::Mobile,
        CompanionRole::Vehicle,
        CompanionRole::Home,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanionRoleInfo {
    pub role: CompanionRole,
    pub acronym: &'static str,
    pub description: &'static str,
}

const COMPANION_ROLE_INFO: &[CompanionRoleInfo] = &[
    CompanionRoleInfo {
        role: CompanionRole::Primary,
        acronym: "PRIM",
        description: "The primary companion device, the default way to contact a user.",
    },
    CompanionRoleInfo {
        role: CompanionRole::Secondary,
        acronym: "SECD",
        description: "A secondary device, used regularly but less critical than the primary.",
    },
    CompanionRoleInfo {
        role: CompanionRole::Tertiary,
        acronym: "TERT",
        description: "A device used occasionally or for a specific purpose.",
    },
    CompanionRoleInfo {
        role: CompanionRole::Backup,
        acronym: "BKUP",
        description: "A fallback device, not regularly used.",
    },
    CompanionRoleInfo {
        role: CompanionRole::Emergency,
        acronym: "EMRG",
        description: "A device reserved for critical situations.",
    },
    CompanionRoleInfo {
        role: CompanionRole::Mobile,
        acronym: "MOBL",
        description: "A portable device used on the go, such as hiking.",
    },
    CompanionRoleInfo {
        role: CompanionRole::Vehicle,
        acronym: "VHCL",
        description: "A device installed in a car or other vehicle.",
    },
    CompanionRoleInfo {
        role: CompanionRole::Home,
        acronym: "HOME",
        description: "A device used in a household or other fixed setting.",
    },
];

/// Companion role lookup table
pub type CompanionRoleTable = LookupTable<CompanionRole, CompanionRoleInfo>;

impl CompanionRoleTable {
    pub fn standard() -> MeshIdResult<Self> {
        Self::build(COMPANION_ROLE_INFO, |e| e.role)
    }
}
