//! Emoji catalog used to validate companion name glyphs

use crate::error::MeshIdResult;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Emoji {
    /// Code point(s), e.g. `1F600`
    pub hexcode: String,
    pub label: String,
    /// The rendered glyph
    pub unicode: String,
}

/// Immutable set of accepted emoji, loaded once at startup
#[derive(Debug, Clone, Default)]
pub struct EmojiCatalog {
    emojis: Vec<Emoji>,
    unicode: HashSet<String>,
    hexcodes: HashSet<String>,
}

impl EmojiCatalog {
    pub fn new(emojis: Vec<Emoji>) -> Self {
        let unicode = emojis.iter().map(|e| e.unicode.clone()).collect();
        let hexcodes = emojis.iter().map(|e| e.hexcode.to_ascii_uppercase()).collect();
        Self {
            emojis,
            unicode,
            hexcodes,
        }
    }

    /// Parse a JSON array of `{hexcode, label, unicode}` objects
    pub fn from_json(json: &str) -> MeshIdResult<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn from_file(path: &Path) -> MeshIdResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn contains_unicode(&self, glyph: &str) -> bool {
        self.unicode.contains(glyph)
    }

    pub fn contains_hexcode(&self, hexcode: &str) -> bool {
        self.hexcodes.contains(&hexcode.to_ascii_uppercase())
    }

    pub fn emojis(&self) -> &[Emoji] {
        &self.emojis
    }

    pub fn len(&self) -> usize {
        self.emojis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emojis.is_empty()
    }
}
