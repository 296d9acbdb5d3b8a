//! Name codec
//!
//! Builds fixed-budget device names from typed attributes. There is no
//! decoder: fields are not escaped and may contain the `-` separator, so a
//! generated name cannot be split back into its attributes reliably.

pub mod companion;
pub mod repeater;
pub mod schema;

pub use companion::{CompanionAttributes, ROLE_COUNTER_RANGE};
pub use repeater::RepeaterAttributes;
pub use schema::{NameSchema, NamingPreset};

use crate::emoji::EmojiCatalog;
use crate::error::{MeshIdError, MeshIdResult};
use crate::identifier::{IdWidth, Identifier};
use crate::node::{CompanionRoleTable, NodeTypeTable};
use std::sync::Arc;

/// Encoder for repeater and companion names under one schema
#[derive(Debug)]
pub struct NameCodec {
    schema: NameSchema,
    node_types: NodeTypeTable,
    roles: CompanionRoleTable,
    emojis: Option<Arc<EmojiCatalog>>,
}

impl NameCodec {
    /// Validates the schema against the identifier width and builds the lookup tables
    pub fn new(schema: NameSchema, width: IdWidth) -> MeshIdResult<Self> {
        schema.validate(width)?;
        Ok(Self {
            schema,
            node_types: NodeTypeTable::standard()?,
            roles: CompanionRoleTable::standard()?,
            emojis: None,
        })
    }

    /// Reject companion emoji that are not in `catalog`
    pub fn with_emoji_catalog(mut self, catalog: Arc<EmojiCatalog>) -> Self {
        self.emojis = Some(catalog);
        self
    }

    pub fn schema(&self) -> &NameSchema {
        &self.schema
    }

    pub fn node_types(&self) -> &NodeTypeTable {
        &self.node_types
    }

    pub fn companion_roles(&self) -> &CompanionRoleTable {
        &self.roles
    }

    pub fn encode_repeater(
        &self,
        attrs: &RepeaterAttributes,
        id: &Identifier,
    ) -> MeshIdResult<String> {
        repeater::encode(attrs, id, &self.schema, &self.node_types)
    }

    /// `id` is the fallback suffix when neither a role type nor a counter is set
    pub fn encode_companion(
        &self,
        attrs: &CompanionAttributes,
        id: Option<&Identifier>,
    ) -> MeshIdResult<String> {
        companion::encode(attrs, id, &self.schema, &self.roles, self.emojis.as_deref())
    }
}

/// Trimmed, non-empty field value
fn required<'a>(field: &str, value: &'a str) -> MeshIdResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        Err(MeshIdError::validation(field, "is required"))
    } else {
        Ok(value)
    }
}

fn check_len(field: &str, value: &str, max: usize, context: &str) -> MeshIdResult<()> {
    if value.chars().count() > max {
        Err(MeshIdError::validation(
            field,
            format!("must be up to {} characters long{}", max, context),
        ))
    } else {
        Ok(())
    }
}

fn check_total(name: &str, schema: &NameSchema) -> MeshIdResult<()> {
    let len = name.chars().count();
    if len > schema.total_max {
        Err(MeshIdError::validation(
            "name",
            format!(
                "'{}' is {} characters, over the {} character budget",
                name, len, schema.total_max
            ),
        ))
    } else {
        Ok(())
    }
}
