/// Configuration file support for meshid
///
/// Loads identifier, naming, source and server settings from TOML or YAML.
/// Every section has defaults, so an empty file is a valid configuration.
use crate::error::{MeshIdError, MeshIdResult};
use crate::identifier::{IdWidth, ReservedBlocks};
use crate::naming::{NameSchema, NamingPreset};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Identifier width and reserved prefixes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentifierConfig {
    pub width: IdWidth,
    /// Leading bytes that are never handed out (2 hex chars each)
    pub reserved_bytes: Vec<String>,
    /// Leading nibbles that are never handed out (1 hex char each)
    pub reserved_nibbles: Vec<String>,
}

impl Default for IdentifierConfig {
    fn default() -> Self {
        Self {
            width: IdWidth::Long,
            reserved_bytes: vec!["00".to_string(), "FF".to_string()],
            reserved_nibbles: vec!["A".to_string()],
        }
    }
}

impl IdentifierConfig {
    pub fn reserved_blocks(&self) -> MeshIdResult<ReservedBlocks> {
        ReservedBlocks::new(&self.reserved_bytes, &self.reserved_nibbles)
    }
}

/// Naming preset plus optional per-field overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    pub preset: NamingPreset,
    pub region_max: Option<usize>,
    pub city_max: Option<usize>,
    pub landmark_with_city_max: Option<usize>,
    pub landmark_max: Option<usize>,
    pub handle_max: Option<usize>,
    pub total_max: Option<usize>,
}

impl NamingConfig {
    /// The preset with any overrides applied
    pub fn schema(&self) -> NameSchema {
        let base = NameSchema::from_preset(self.preset);
        NameSchema {
            region_max: self.region_max.unwrap_or(base.region_max),
            city_max: self.city_max.unwrap_or(base.city_max),
            landmark_with_city_max: self
                .landmark_with_city_max
                .unwrap_or(base.landmark_with_city_max),
            landmark_max: self.landmark_max.unwrap_or(base.landmark_max),
            handle_max: self.handle_max.unwrap_or(base.handle_max),
            total_max: self.total_max.unwrap_or(base.total_max),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// LetsMesh node API (`{"nodes": [...]}`)
    Letsmesh,
    /// MeshMapper repeater API (bare array)
    Meshmapper,
    /// Local JSON file of node records
    File,
}

/// One upstream node provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub kind: SourceKind,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl SourceConfig {
    fn validate(&self) -> MeshIdResult<()> {
        if self.name.trim().is_empty() {
            return Err(MeshIdError::config("source name must not be empty"));
        }
        match self.kind {
            SourceKind::Letsmesh | SourceKind::Meshmapper if self.url.is_none() => Err(
                MeshIdError::config(format!("source '{}' needs a url", self.name)),
            ),
            SourceKind::File if self.path.is_none() => Err(MeshIdError::config(format!(
                "source '{}' needs a path",
                self.name
            ))),
            _ => Ok(()),
        }
    }
}

/// Occupancy grid options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Companions do not relay traffic, so they are left off the grid by default
    pub include_companions: bool,
    /// Restrict the grid to these source names; all sources when unset
    pub sources: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    /// JSON list of `{hexcode, label, unicode}`
    pub emoji_catalog: Option<PathBuf>,
    /// JSON settings template whose `name` is filled on each generated name
    pub recommended_settings: Option<PathBuf>,
    /// JSON file backing the persisted-name store; in-memory when unset
    pub name_store: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8080,
            emoji_catalog: None,
            recommended_settings: None,
            name_store: None,
        }
    }
}

/// Full configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshIdConfig {
    pub identifiers: IdentifierConfig,
    pub naming: NamingConfig,
    pub sources: Vec<SourceConfig>,
    pub grid: GridConfig,
    pub server: ServerConfig,
}

impl MeshIdConfig {
    /// Load config from a file (auto-detect format)
    pub fn from_file<P: AsRef<Path>>(path: P) -> MeshIdResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| MeshIdError::config(format!("Failed to read config file: {}", e)))?;

        let extension = path.extension().and_then(|s| s.to_str());
        match extension {
            Some("toml") => Self::from_toml(&contents),
            Some("yaml") | Some("yml") => Self::from_yaml(&contents),
            _ => Self::from_toml(&contents).or_else(|_| Self::from_yaml(&contents)),
        }
    }

    /// Parse config from TOML string
    pub fn from_toml(contents: &str) -> MeshIdResult<Self> {
        toml::from_str(contents)
            .map_err(|e| MeshIdError::config(format!("Failed to parse TOML: {}", e)))
    }

    /// Parse config from YAML string
    pub fn from_yaml(contents: &str) -> MeshIdResult<Self> {
        serde_yaml::from_str(contents)
            .map_err(|e| MeshIdError::config(format!("Failed to parse YAML: {}", e)))
    }

    /// Find and load config file from standard search paths
    ///
    /// Search order:
    /// 1. ./meshid.toml or ./meshid.yaml
    /// 2. ~/.meshid/config.toml or ~/.meshid/config.yaml
    /// 3. /etc/meshid/config.toml or /etc/meshid/config.yaml
    pub fn find_and_load() -> MeshIdResult<Self> {
        for path in Self::get_search_paths() {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(MeshIdError::config(
            "No config file found in standard locations",
        ))
    }

    /// Get standard config file search paths
    pub fn get_search_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from("meshid.toml"),
            PathBuf::from("meshid.yaml"),
            PathBuf::from("meshid.yml"),
        ];

        if let Some(home) = dirs::home_dir() {
            let meshid_dir = home.join(".meshid");
            paths.push(meshid_dir.join("config.toml"));
            paths.push(meshid_dir.join("config.yaml"));
        }

        paths.push(PathBuf::from("/etc/meshid/config.toml"));
        paths.push(PathBuf::from("/etc/meshid/config.yaml"));

        paths
    }

    /// Check everything that would otherwise fail at request time
    pub fn validate(&self) -> MeshIdResult<()> {
        self.identifiers.reserved_blocks()?;
        self.naming.schema().validate(self.identifiers.width)?;

        let mut names = HashSet::new();
        for source in &self.sources {
            source.validate()?;
            if !names.insert(source.name.as_str()) {
                return Err(MeshIdError::config(format!(
                    "source name '{}' is used more than once",
                    source.name
                )));
            }
        }

        if let Some(subset) = &self.grid.sources {
            if let Some(unknown) = subset.iter().find(|n| !names.contains(n.as_str())) {
                return Err(MeshIdError::config(format!(
                    "grid.sources names unknown source '{}'",
                    unknown
                )));
            }
        }

        Ok(())
    }
}
