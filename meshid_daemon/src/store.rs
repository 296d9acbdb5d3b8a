//! Persisted names, keyed by public key
//!
//! Backed by a JSON file when a path is configured, in memory otherwise.
//! Writes never fail the request that triggered them. Keys are stored
//! lowercase so one device never holds two entries.

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredName {
    pub public_key: String,
    pub name: String,
}

pub struct NameStore {
    names: RwLock<BTreeMap<String, String>>,
    path: Option<PathBuf>,
    /// Serializes file writes so an older snapshot never lands last
    persisting: Mutex<()>,
}

impl NameStore {
    pub fn in_memory() -> Self {
        Self {
            names: RwLock::new(BTreeMap::new()),
            path: None,
            persisting: Mutex::new(()),
        }
    }

    /// Open a file-backed store; a missing file starts empty
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let names: BTreeMap<String, String> = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            if contents.trim().is_empty() {
                BTreeMap::new()
            } else {
                let stored: BTreeMap<String, String> = serde_json::from_str(&contents)?;
                stored
                    .into_iter()
                    .map(|(key, name)| (normalize_key(&key), name))
                    .collect()
            }
        } else {
            BTreeMap::new()
        };
        tracing::info!("name store at {} holds {} names", path.display(), names.len());

        Ok(Self {
            names: RwLock::new(names),
            path: Some(path),
            persisting: Mutex::new(()),
        })
    }

    /// Record `name` for `public_key`, replacing any earlier name.
    /// Blocks on file I/O when file-backed; async callers go through the blocking pool.
    pub fn save(&self, public_key: &str, name: &str) {
        let _persisting = self.persisting.lock();
        let snapshot = {
            let mut names = self.names.write();
            names.insert(normalize_key(public_key), name.to_string());
            self.path.as_ref().map(|_| names.clone())
        };

        if let (Some(path), Some(snapshot)) = (&self.path, snapshot) {
            if let Err(e) = persist(path, &snapshot) {
                tracing::error!("Failed to save name '{}' to {}: {}", name, path.display(), e);
            }
        }
    }

    /// Names containing `partial`, case-sensitive
    pub fn matching_partial_name(&self, partial: &str) -> Vec<StoredName> {
        self.names
            .read()
            .iter()
            .filter(|(_, name)| name.contains(partial))
            .map(|(public_key, name)| StoredName {
                public_key: public_key.clone(),
                name: name.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.names.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.read().is_empty()
    }
}

fn normalize_key(public_key: &str) -> String {
    public_key.trim().to_ascii_lowercase()
}

fn persist(path: &Path, names: &BTreeMap<String, String>) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, serde_json::to_vec_pretty(names)?)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}
