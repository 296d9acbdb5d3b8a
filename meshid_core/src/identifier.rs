//! Identifier space model
//!
//! An identifier is the first 1 or 2 bytes of a node's public key, rendered as
//! 2 or 4 upper-case hex characters. The space of identifiers is tiny and
//! partially reserved, so allocation is a full ascending scan.

use crate::error::{MeshIdError, MeshIdResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdWidth {
    /// 1 byte, 2 hex characters
    Short,
    /// 2 bytes, 4 hex characters
    #[default]
    Long,
}

impl IdWidth {
    /// Number of hex characters
    pub const fn chars(self) -> usize {
        match self {
            IdWidth::Short => 2,
            IdWidth::Long => 4,
        }
    }

    /// Number of identifiers in the space (reserved ones included)
    pub const fn slot_count(self) -> u32 {
        1 << (4 * self.chars())
    }

    pub fn from_chars(len: usize) -> Option<Self> {
        match len {
            2 => Some(IdWidth::Short),
            4 => Some(IdWidth::Long),
            _ => None,
        }
    }
}

impl fmt::Display for IdWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdWidth::Short => write!(f, "short"),
            IdWidth::Long => write!(f, "long"),
        }
    }
}

impl std::str::FromStr for IdWidth {
    type Err = MeshIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "short" | "2" => Ok(IdWidth::Short),
            "long" | "4" => Ok(IdWidth::Long),
            other => Err(MeshIdError::validation(
                "width",
                format!("unknown identifier width '{}', expected 'short' or 'long'", other),
            )),
        }
    }
}

/// A normalized (upper-case) 2 or 4 character hex identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);

impl Identifier {
    /// Parse a user-supplied identifier in either case
    pub fn parse(raw: &str) -> MeshIdResult<Self> {
        let raw = raw.trim();
        if IdWidth::from_chars(raw.len()).is_none() {
            return Err(MeshIdError::validation(
                "public_key_id",
                "must be a 2 or 4 character hexadecimal string",
            ));
        }
        if !raw.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(MeshIdError::validation(
                "public_key_id",
                format!("'{}' is not hexadecimal", raw),
            ));
        }
        Ok(Self(raw.to_ascii_uppercase()))
    }

    /// Slice the identifier of the given width from the front of a public key
    pub fn from_public_key(public_key: &str, width: IdWidth) -> MeshIdResult<Self> {
        let prefix = public_key.get(..width.chars()).ok_or_else(|| {
            MeshIdError::validation(
                "public_key",
                format!("must be at least {} characters long", width.chars()),
            )
        })?;
        Self::parse(prefix).map_err(|_| {
            MeshIdError::validation("public_key", "must start with hexadecimal characters")
        })
    }

    /// Caller guarantees `prefix` is 2 or 4 ASCII hex characters
    pub(crate) fn from_validated(prefix: &str) -> Self {
        Self(prefix.to_ascii_uppercase())
    }

    /// Identifier at position `index` of the ascending enumeration
    pub fn from_index(index: u32, width: IdWidth) -> Self {
        Self(format!("{:0w$X}", index, w = width.chars()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn width(&self) -> IdWidth {
        if self.0.len() == 2 {
            IdWidth::Short
        } else {
            IdWidth::Long
        }
    }

    /// The first byte as two hex characters
    pub fn leading_byte(&self) -> &str {
        &self.0[..2]
    }

    /// The first hex digit
    pub fn leading_nibble(&self) -> char {
        self.nibble(0)
    }

    /// Hex digit at `position`
    pub fn nibble(&self, position: usize) -> char {
        self.0.as_bytes()[position] as char
    }

    /// Truncate to a narrower width; wider requests return the identifier unchanged
    pub fn truncate(&self, width: IdWidth) -> Self {
        if width.chars() >= self.0.len() {
            self.clone()
        } else {
            Self(self.0[..width.chars()].to_string())
        }
    }

    /// Pad a short identifier to long width with a zero second byte
    pub fn widen(&self) -> Self {
        match self.width() {
            IdWidth::Short => Self(format!("{}00", self.0)),
            IdWidth::Long => self.clone(),
        }
    }

    pub fn conflicts_with(&self, other: &Identifier) -> bool {
        ids_conflict(&self.0, &other.0)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Identifier {
    type Error = MeshIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Identifier::parse(&value)
    }
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> Self {
        id.0
    }
}

/// Two identifiers conflict when they agree, case-insensitively, on their
/// common prefix length. Empty inputs never conflict.
pub fn ids_conflict(a: &str, b: &str) -> bool {
    let len = a.len().min(b.len());
    len > 0 && a.as_bytes()[..len].eq_ignore_ascii_case(&b.as_bytes()[..len])
}

/// Prefixes administratively excluded from allocation
///
/// Reservation only ever looks at the leading byte and leading nibble, so a
/// long identifier inherits the status of its short prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedBlocks {
    bytes: Vec<String>,
    nibbles: Vec<char>,
}

impl ReservedBlocks {
    pub fn new<B, N>(bytes: B, nibbles: N) -> MeshIdResult<Self>
    where
        B: IntoIterator,
        B::Item: AsRef<str>,
        N: IntoIterator,
        N::Item: AsRef<str>,
    {
        let mut reserved = Self {
            bytes: Vec::new(),
            nibbles: Vec::new(),
        };

        for byte in bytes {
            let byte = byte.as_ref().trim();
            if byte.len() != 2 || !byte.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(MeshIdError::config(format!(
                    "reserved byte '{}' must be exactly 2 hex characters",
                    byte
                )));
            }
            reserved.bytes.push(byte.to_ascii_uppercase());
        }

        for nibble in nibbles {
            let nibble = nibble.as_ref().trim();
            let mut chars = nibble.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_hexdigit() => {
                    reserved.nibbles.push(c.to_ascii_uppercase())
                }
                _ => {
                    return Err(MeshIdError::config(format!(
                        "reserved nibble '{}' must be exactly 1 hex character",
                        nibble
                    )))
                }
            }
        }

        Ok(reserved)
    }

    /// Nothing reserved at all
    pub fn none() -> Self {
        Self {
            bytes: Vec::new(),
            nibbles: Vec::new(),
        }
    }

    /// Case-insensitive; accepts identifiers of any width and raw public keys
    pub fn is_reserved(&self, id: &str) -> bool {
        let id = id.trim();
        if let Some(leading_byte) = id.get(..2) {
            if self
                .bytes
                .iter()
                .any(|b| b.eq_ignore_ascii_case(leading_byte))
            {
                return true;
            }
        }
        match id.chars().next() {
            Some(first) => self
                .nibbles
                .iter()
                .any(|n| n.eq_ignore_ascii_case(&first)),
            None => false,
        }
    }

    pub fn bytes(&self) -> &[String] {
        &self.bytes
    }

    pub fn nibbles(&self) -> &[char] {
        &self.nibbles
    }
}

impl Default for ReservedBlocks {
    /// 00 and FF are reserved upstream, the A block is held back for future use
    fn default() -> Self {
        Self {
            bytes: vec!["00".to_string(), "FF".to_string()],
            nibbles: vec!['A'],
        }
    }
}

/// The ordered identifier space of one width
#[derive(Debug, Clone)]
pub struct IdentifierSpace {
    width: IdWidth,
    reserved: ReservedBlocks,
}

impl IdentifierSpace {
    pub fn new(width: IdWidth, reserved: ReservedBlocks) -> Self {
        Self { width, reserved }
    }

    pub fn width(&self) -> IdWidth {
        self.width
    }

    pub fn reserved(&self) -> &ReservedBlocks {
        &self.reserved
    }

    /// Same reservation rules, different width
    pub fn with_width(&self, width: IdWidth) -> Self {
        Self {
            width,
            reserved: self.reserved.clone(),
        }
    }

    /// Every identifier of this width in ascending numeric order
    pub fn iter(&self) -> impl Iterator<Item = Identifier> + '_ {
        (0..self.width.slot_count()).map(move |i| Identifier::from_index(i, self.width))
    }

    pub fn is_reserved(&self, id: &str) -> bool {
        self.reserved.is_reserved(id)
    }

    /// Number of identifiers that are not reserved
    pub fn allocatable_count(&self) -> usize {
        self.iter().filter(|id| !self.is_reserved(id.as_str())).count()
    }
}
