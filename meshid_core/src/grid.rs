//! Occupancy grid over the short identifier space
//!
//! The grid is 16 x 16: the row is the first hex digit of an identifier, the
//! column the second. It is rebuilt from the working set on every call.

use crate::aggregate::WorkingSet;
use crate::identifier::{IdWidth, Identifier, IdentifierSpace};
use crate::node::{format_timestamp, NodeRecord, NodeStatus};
use serde::Serialize;
use std::collections::BTreeMap;

/// Hex digits in ascending order, the row and column labels
pub const HEX_DIGITS: [char; 16] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F',
];

/// Classification tag on a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CellTag {
    Free,
    Used,
    Duplicate,
    /// Free but administratively excluded
    Reserved,
    /// Nothing in the cell is NEW or ACTIVE
    Inactive,
}

/// Display summary of one occupying record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordSummary {
    pub status: NodeStatus,
    /// `"lat, lon"` or `"unknown"`
    pub location: String,
    pub last_heard: String,
    pub id: String,
    pub public_key: String,
    pub name: String,
    pub contact: String,
}

impl RecordSummary {
    pub fn new(record: &NodeRecord, as_of: i64) -> Self {
        Self {
            status: record.status_at(as_of),
            location: record
                .location()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            last_heard: format_timestamp(record.last_heard()),
            id: record.identifier(IdWidth::Short).to_string(),
            public_key: record.public_key().to_string(),
            name: record.name().to_string(),
            contact: record.contact(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridCell {
    pub id: Identifier,
    pub tags: Vec<CellTag>,
    /// Empty for free cells
    pub occupants: Vec<RecordSummary>,
}

impl GridCell {
    pub fn has(&self, tag: CellTag) -> bool {
        self.tags.contains(&tag)
    }

    /// The primary classification: free, used or duplicate
    pub fn class(&self) -> CellTag {
        self.tags[0]
    }
}

/// Row label -> column label -> cell
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct OccupancyGrid {
    rows: BTreeMap<String, BTreeMap<String, GridCell>>,
}

impl OccupancyGrid {
    /// Classify every short identifier against the working set
    pub fn build(set: &WorkingSet, space: &IdentifierSpace) -> Self {
        let mut by_id: BTreeMap<Identifier, Vec<&NodeRecord>> = BTreeMap::new();
        for record in set.records() {
            by_id
                .entry(record.identifier(IdWidth::Short))
                .or_default()
                .push(record);
        }

        let mut rows: BTreeMap<String, BTreeMap<String, GridCell>> = BTreeMap::new();
        for id in space.with_width(IdWidth::Short).iter() {
            let occupants = by_id.get(&id).map(Vec::as_slice).unwrap_or(&[]);
            let cell = classify(id.clone(), occupants, space, set.as_of());
            rows.entry(id.nibble(0).to_string())
                .or_default()
                .insert(id.nibble(1).to_string(), cell);
        }

        Self { rows }
    }

    pub fn cell(&self, row: char, column: char) -> Option<&GridCell> {
        self.rows
            .get(&row.to_ascii_uppercase().to_string())?
            .get(&column.to_ascii_uppercase().to_string())
    }

    /// Cells in ascending identifier order
    pub fn cells(&self) -> impl Iterator<Item = &GridCell> {
        self.rows.values().flat_map(|row| row.values())
    }

    pub fn len(&self) -> usize {
        self.cells().count()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &BTreeMap<String, BTreeMap<String, GridCell>> {
        &self.rows
    }
}

fn classify(
    id: Identifier,
    occupants: &[&NodeRecord],
    space: &IdentifierSpace,
    as_of: i64,
) -> GridCell {
    let mut tags = Vec::with_capacity(2);
    match occupants.len() {
        0 => {
            tags.push(CellTag::Free);
            if space.is_reserved(id.as_str()) {
                tags.push(CellTag::Reserved);
            }
        }
        1 => tags.push(CellTag::Used),
        _ => tags.push(CellTag::Duplicate),
    }

    let summaries: Vec<RecordSummary> = occupants
        .iter()
        .map(|r| RecordSummary::new(r, as_of))
        .collect();
    if !summaries.iter().any(|s| s.status.is_live()) {
        tags.push(CellTag::Inactive);
    }

    GridCell {
        id,
        tags,
        occupants: summaries,
    }
}
