//! # meshid_core
//!
//! Identifier allocation and device naming for MeshCore radio meshes.
//!
//! A MeshCore node is addressed by the leading hex characters of its public
//! key. This crate merges node lists from several upstream sources into one
//! [`WorkingSet`](aggregate::WorkingSet), suggests identifiers nobody holds,
//! detects collisions, renders the occupancy grid, and builds device names
//! that fit the radio's name budget.
//!
//! Everything here is synchronous and free of I/O apart from configuration
//! and catalog loading. Fetching from upstream providers is the caller's job,
//! behind the [`NodeSource`](aggregate::NodeSource) trait.
//!
//! ```no_run
//! use meshid_core::prelude::*;
//!
//! let engine = Engine::from_config(&MeshIdConfig::default())?;
//! let set = WorkingSet::new(Vec::new(), 0);
//! let id = engine.allocator().suggest_free_id(set.records())?;
//! assert_eq!(id.as_str(), "0100");
//! # Ok::<(), MeshIdError>(())
//! ```

pub mod aggregate;
pub mod allocator;
pub mod config;
pub mod contacts;
pub mod emoji;
pub mod engine;
pub mod error;
pub mod grid;
pub mod identifier;
pub mod naming;
pub mod node;

pub use aggregate::{aggregate, collect, NodeSource, SourceFailure, StaticSource, WorkingSet};
pub use allocator::{Allocator, CandidateCheck};
pub use config::{MeshIdConfig, SourceConfig, SourceKind};
pub use contacts::{Contact, ContactsExport};
pub use emoji::{Emoji, EmojiCatalog};
pub use engine::Engine;
pub use error::{MeshIdError, MeshIdResult};
pub use grid::{CellTag, GridCell, OccupancyGrid, RecordSummary};
pub use identifier::{ids_conflict, IdWidth, Identifier, IdentifierSpace, ReservedBlocks};
pub use naming::{CompanionAttributes, NameCodec, NameSchema, NamingPreset, RepeaterAttributes};
pub use node::{CompanionRole, NodeRecord, NodeStatus, NodeType};

/// Common imports for daemon and tooling code
pub mod prelude {
    pub use crate::aggregate::{NodeSource, WorkingSet};
    pub use crate::allocator::Allocator;
    pub use crate::config::MeshIdConfig;
    pub use crate::engine::Engine;
    pub use crate::error::{MeshIdError, MeshIdResult};
    pub use crate::identifier::{IdWidth, Identifier};
    pub use crate::naming::{CompanionAttributes, RepeaterAttributes};
    pub use crate::node::{CompanionRole, NodeRecord, NodeType};
}
