//! Immutable reference data built once from configuration

use crate::aggregate::WorkingSet;
use crate::allocator::Allocator;
use crate::config::{GridConfig, MeshIdConfig};
use crate::emoji::EmojiCatalog;
use crate::error::MeshIdResult;
use crate::grid::OccupancyGrid;
use crate::identifier::{IdWidth, IdentifierSpace};
use crate::naming::NameCodec;
use log::info;
use std::sync::Arc;

/// Identifier space, allocator, codec and grid options for one deployment.
/// Built at startup and shared read-only between requests.
#[derive(Debug)]
pub struct Engine {
    allocator: Allocator,
    codec: NameCodec,
    grid: GridConfig,
}

impl Engine {
    /// Validate `config` and build the engine; loads the emoji catalog if one is configured
    pub fn from_config(config: &MeshIdConfig) -> MeshIdResult<Self> {
        config.validate()?;

        let width = config.identifiers.width;
        let space = IdentifierSpace::new(width, config.identifiers.reserved_blocks()?);
        info!(
            "{} identifier space with {} allocatable slots",
            width,
            space.allocatable_count()
        );

        let mut codec = NameCodec::new(config.naming.schema(), width)?;
        if let Some(path) = &config.server.emoji_catalog {
            let catalog = EmojiCatalog::from_file(path)?;
            info!("loaded {} emoji from {}", catalog.len(), path.display());
            codec = codec.with_emoji_catalog(Arc::new(catalog));
        }

        Ok(Self {
            allocator: Allocator::new(space),
            codec,
            grid: config.grid.clone(),
        })
    }

    pub fn allocator(&self) -> &Allocator {
        &self.allocator
    }

    pub fn codec(&self) -> &NameCodec {
        &self.codec
    }

    pub fn space(&self) -> &IdentifierSpace {
        self.allocator.space()
    }

    pub fn width(&self) -> IdWidth {
        self.allocator.width()
    }

    pub fn grid_config(&self) -> &GridConfig {
        &self.grid
    }

    /// Grid over `set`, leaving companions out unless configured otherwise
    pub fn build_grid(&self, set: &WorkingSet) -> OccupancyGrid {
        if self.grid.include_companions {
            OccupancyGrid::build(set, self.space())
        } else {
            let relays = set.clone().retain(|r| !r.node_type().is_companion());
            OccupancyGrid::build(&relays, self.space())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::CellTag;
    use crate::node::{NodeRecord, NodeType};

    #[test]
    fn test_default_engine() {
        let engine = Engine::from_config(&MeshIdConfig::default()).unwrap();
        assert_eq!(engine.width(), IdWidth::Long);
        assert!(engine.space().is_reserved("00AB"));
        assert_eq!(engine.codec().schema().total_max, 23);
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let mut config = MeshIdConfig::default();
        config.naming.total_max = Some(10);
        assert!(Engine::from_config(&config).is_err());

        let mut config = MeshIdConfig::default();
        config.server.emoji_catalog = Some("/nonexistent/emojis.json".into());
        assert!(Engine::from_config(&config).is_err());
    }

    #[test]
    fn test_grid_companion_filter() {
        let set = WorkingSet::new(
            vec![NodeRecord::new("3c4d5e", "Alice MY01", NodeType::Companion).unwrap()],
            0,
        );

        let engine = Engine::from_config(&MeshIdConfig::default()).unwrap();
        let cell = engine.build_grid(&set).cell('3', 'C').cloned().unwrap();
        assert_eq!(cell.class(), CellTag::Free);

        let mut config = MeshIdConfig::default();
        config.grid.include_companions = true;
        let engine = Engine::from_config(&config).unwrap();
        let cell = engine.build_grid(&set).cell('3', 'C').cloned().unwrap();
        assert_eq!(cell.class(), CellTag::Used);
    }
}
