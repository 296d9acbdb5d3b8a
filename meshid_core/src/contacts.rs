//! Bulk contact import document for MeshCore companions
//!
//! Produces `{"contacts": [...]}` with one entry per relaying node, ready to
//! be imported into a companion app in one go.

use crate::node::NodeRecord;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    /// 1 companion, 2 repeater, 3 room server
    #[serde(rename = "type")]
    pub contact_type: u8,
    pub name: String,
    pub custom_name: Option<String>,
    pub public_key: String,
    pub flags: u32,
    /// Coordinates are strings in the import format
    pub latitude: String,
    pub longitude: String,
    pub last_advert: i64,
    pub last_modified: i64,
    pub out_path: Option<String>,
}

impl Contact {
    pub fn from_record(record: &NodeRecord) -> Self {
        let (latitude, longitude) = match record.location() {
            Some(loc) => (loc.latitude.to_string(), loc.longitude.to_string()),
            None => ("0.0".to_string(), "0.0".to_string()),
        };
        let last_heard = record.last_heard().unwrap_or(0);
        Self {
            contact_type: record.node_type().contact_type(),
            name: record.name().to_string(),
            custom_name: None,
            public_key: record.public_key().to_string(),
            flags: 0,
            latitude,
            longitude,
            last_advert: last_heard,
            last_modified: last_heard,
            out_path: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactsExport {
    pub contacts: Vec<Contact>,
}

impl ContactsExport {
    /// Every non-companion record, in working-set order
    pub fn repeaters<'a>(records: impl IntoIterator<Item = &'a NodeRecord>) -> Self {
        Self {
            contacts: records
                .into_iter()
                .filter(|r| !r.node_type().is_companion())
                .map(Contact::from_record)
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }
}
