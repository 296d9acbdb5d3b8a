use super::{map_rows, unavailable};
use meshid_core::{MeshIdResult, NodeRecord, NodeSource};
use serde_json::Value;
use std::path::PathBuf;

/// JSON array of node records on disk, re-read on every fetch
pub struct FileSource {
    name: String,
    path: PathBuf,
}

impl FileSource {
    pub fn new(name: &str, path: PathBuf) -> Self {
        Self {
            name: name.to_string(),
            path,
        }
    }
}

impl NodeSource for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> MeshIdResult<Vec<NodeRecord>> {
        let contents = std::fs::read_to_string(&self.path)
            .map_err(|e| unavailable(&self.name, format!("{}: {}", self.path.display(), e)))?;
        let rows: Vec<Value> =
            serde_json::from_str(&contents).map_err(|e| unavailable(&self.name, e))?;
        Ok(map_rows(&self.name, rows, Ok::<NodeRecord, _>))
    }
}
