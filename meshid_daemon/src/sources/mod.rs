//! Node source adapters
//!
//! Each adapter maps one upstream format onto [`NodeRecord`]s. Rows that do
//! not map are logged and skipped; only a failure to reach or parse the
//! upstream as a whole marks the source unavailable.

mod file;
mod letsmesh;
mod meshmapper;

pub use file::FileSource;
pub use letsmesh::LetsMeshSource;
pub use meshmapper::MeshMapperSource;

use chrono::{DateTime, NaiveDateTime};
use meshid_core::config::{SourceConfig, SourceKind};
use meshid_core::{MeshIdError, MeshIdResult, NodeRecord, NodeSource};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// Build every configured source, in configuration order
pub fn from_config(configs: &[SourceConfig]) -> anyhow::Result<Vec<Arc<dyn NodeSource>>> {
    configs
        .iter()
        .map(|config| -> anyhow::Result<Arc<dyn NodeSource>> {
            let missing = |what: &str| {
                anyhow::anyhow!("source '{}' is missing its {}", config.name, what)
            };
            let source: Arc<dyn NodeSource> = match config.kind {
                SourceKind::Letsmesh => Arc::new(LetsMeshSource::new(
                    &config.name,
                    config.url.as_deref().ok_or_else(|| missing("url"))?,
                )),
                SourceKind::Meshmapper => Arc::new(MeshMapperSource::new(
                    &config.name,
                    config.url.as_deref().ok_or_else(|| missing("url"))?,
                )),
                SourceKind::File => Arc::new(FileSource::new(
                    &config.name,
                    config.path.clone().ok_or_else(|| missing("path"))?,
                )),
            };
            Ok(source)
        })
        .collect()
}

/// Blocking GET returning the response body; must run off the async runtime
fn http_get(source: &str, url: &str) -> MeshIdResult<String> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!("meshid/", env!("CARGO_PKG_VERSION")))
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(|e| MeshIdError::source_unavailable(source, e))?;

    let response = client
        .get(url)
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .map_err(|e| MeshIdError::source_unavailable(source, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(MeshIdError::source_unavailable(
            source,
            format!("{} returned {}", url, status),
        ));
    }

    response
        .text()
        .map_err(|e| MeshIdError::source_unavailable(source, e))
}

/// Deserialize and map each row on its own so one bad row cannot sink the source
fn map_rows<T, F>(source: &str, rows: Vec<Value>, to_record: F) -> Vec<NodeRecord>
where
    T: DeserializeOwned,
    F: Fn(T) -> MeshIdResult<NodeRecord>,
{
    let total = rows.len();
    let records: Vec<NodeRecord> = rows
        .into_iter()
        .enumerate()
        .filter_map(|(i, row)| {
            let mapped = serde_json::from_value::<T>(row)
                .map_err(MeshIdError::from)
                .and_then(&to_record);
            match mapped {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!("{}: skipping row {}: {}", source, i, e);
                    None
                }
            }
        })
        .collect();

    if records.len() < total {
        tracing::info!("{}: mapped {} of {} rows", source, records.len(), total);
    }
    records
}

/// Unix seconds from an RFC 3339 or `YYYY-MM-DD HH:MM:SS` (UTC) timestamp
fn parse_timestamp(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.and_utc().timestamp())
}

fn unavailable(source: &str, message: impl ToString) -> MeshIdError {
    MeshIdError::source_unavailable(source, message)
}
