//! Node aggregation across sources
//!
//! Each source contributes its records verbatim. Nothing is de-duplicated:
//! the same device reported twice shows up twice, which is exactly what the
//! duplicate detection downstream wants to see. A source that fails
//! contributes nothing and is listed in [`WorkingSet::unavailable`].

use crate::error::MeshIdResult;
use crate::node::NodeRecord;
use chrono::Utc;
use log::{debug, warn};
use serde::Serialize;
use std::sync::Arc;

/// An upstream provider of node records
pub trait NodeSource: Send + Sync {
    /// Stable name used in logs and degraded-result reports
    fn name(&self) -> &str;

    /// Fetch and map every record the provider currently knows about
    fn fetch(&self) -> MeshIdResult<Vec<NodeRecord>>;
}

/// A source that failed to deliver during aggregation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFailure {
    pub source: String,
    pub message: String,
}

/// The merged, ordered records for one request
#[derive(Debug, Clone)]
pub struct WorkingSet {
    records: Vec<NodeRecord>,
    unavailable: Vec<SourceFailure>,
    as_of: i64,
}

impl WorkingSet {
    /// A working set evaluated at `as_of` (Unix seconds)
    pub fn new(records: Vec<NodeRecord>, as_of: i64) -> Self {
        Self {
            records,
            unavailable: Vec::new(),
            as_of,
        }
    }

    pub fn records(&self) -> &[NodeRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<NodeRecord> {
        self.records
    }

    pub fn unavailable(&self) -> &[SourceFailure] {
        &self.unavailable
    }

    /// True when at least one source failed, so the set may look emptier than reality
    pub fn is_degraded(&self) -> bool {
        !self.unavailable.is_empty()
    }

    /// The instant statuses are evaluated against
    pub fn as_of(&self) -> i64 {
        self.as_of
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Keep only matching records; failures and timestamp carry over
    pub fn retain(mut self, keep: impl FnMut(&NodeRecord) -> bool) -> Self {
        self.records.retain(keep);
        self
    }
}

/// Merge per-source results in the order given
pub fn aggregate<I, S>(outcomes: I, as_of: i64) -> WorkingSet
where
    I: IntoIterator<Item = (S, MeshIdResult<Vec<NodeRecord>>)>,
    S: Into<String>,
{
    let mut set = WorkingSet::new(Vec::new(), as_of);

    for (source, outcome) in outcomes {
        let source = source.into();
        match outcome {
            Ok(records) => {
                debug!("node source '{}' contributed {} records", source, records.len());
                set.records.extend(records);
            }
            Err(e) => {
                warn!("node source '{}' unavailable, continuing without it: {}", source, e);
                set.unavailable.push(SourceFailure {
                    source,
                    message: e.to_string(),
                });
            }
        }
    }

    set
}

/// Fetch every source in turn and aggregate at the current time
pub fn collect(sources: &[Arc<dyn NodeSource>]) -> WorkingSet {
    let outcomes = sources
        .iter()
        .map(|source| (source.name().to_string(), source.fetch()));
    aggregate(outcomes, Utc::now().timestamp())
}

/// Fixed records, for file-backed sources and tests
#[derive(Debug, Clone)]
pub struct StaticSource {
    name: String,
    records: Vec<NodeRecord>,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, records: Vec<NodeRecord>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }
}

impl NodeSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> MeshIdResult<Vec<NodeRecord>> {
        Ok(self.records.clone())
    }
}
