//! Companion names: `[EMOJI ]HANDLE SUFFIX`
//!
//! The suffix is the role acronym if a role is set, else `MY` plus the
//! two-digit role counter, else the identifier.

use super::{check_len, check_total, required};
use crate::emoji::EmojiCatalog;
use crate::error::{MeshIdError, MeshIdResult};
use crate::identifier::Identifier;
use crate::naming::schema::NameSchema;
use crate::node::{CompanionRole, CompanionRoleTable};
use serde::{Deserialize, Serialize};

/// Accepted role counter range
pub const ROLE_COUNTER_RANGE: std::ops::RangeInclusive<u32> = 1..=99;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompanionAttributes {
    /// Owner's handle, e.g. "Alice"
    pub handle: String,
    #[serde(default)]
    pub emoji: Option<String>,
    #[serde(default, rename = "role-type", alias = "role_type")]
    pub role_type: Option<CompanionRole>,
    #[serde(default, rename = "suffix-number", alias = "role_counter")]
    pub role_counter: Option<u32>,
}

impl CompanionAttributes {
    pub fn new(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            ..Default::default()
        }
    }

    pub fn with_emoji(mut self, emoji: impl Into<String>) -> Self {
        self.emoji = Some(emoji.into());
        self
    }

    pub fn with_role_type(mut self, role: CompanionRole) -> Self {
        self.role_type = Some(role);
        self
    }

    pub fn with_role_counter(mut self, counter: u32) -> Self {
        self.role_counter = Some(counter);
        self
    }
}

pub(super) fn encode(
    attrs: &CompanionAttributes,
    id: Option<&Identifier>,
    schema: &NameSchema,
    roles: &CompanionRoleTable,
    emojis: Option<&EmojiCatalog>,
) -> MeshIdResult<String> {
    let handle = required("handle", &attrs.handle)?;
    check_len("handle", handle, schema.handle_max, "")?;

    let emoji = attrs
        .emoji
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty());
    if let (Some(glyph), Some(catalog)) = (emoji, emojis) {
        if !catalog.contains_unicode(glyph) {
            return Err(MeshIdError::validation(
                "emoji",
                format!("'{}' is not a recognised emoji", glyph),
            ));
        }
    }

    if let Some(counter) = attrs.role_counter {
        if !ROLE_COUNTER_RANGE.contains(&counter) {
            return Err(MeshIdError::validation(
                "role_counter",
                "must be between 1 and 99",
            ));
        }
    }

    let suffix = match (attrs.role_type, attrs.role_counter, id) {
        (Some(role), _, _) => roles.get(role).acronym.to_string(),
        (None, Some(counter), _) => format!("MY{:02}", counter),
        (None, None, Some(id)) => id.as_str().to_uppercase(),
        (None, None, None) => {
            return Err(MeshIdError::validation(
                "suffix",
                "a role type, role counter or identifier is required",
            ))
        }
    };

    let name = match emoji {
        Some(glyph) => format!("{} {} {}", glyph, handle, suffix),
        None => format!("{} {}", handle, suffix),
    };

    check_total(&name, schema)?;
    Ok(name)
}
