//! Identifier allocation and conflict detection
//!
//! Suggestions are advisory. Nothing is claimed or persisted; a submission
//! must call [`Allocator::check`] again against fresh data.

use crate::error::{MeshIdError, MeshIdResult};
use crate::identifier::{IdWidth, Identifier, IdentifierSpace};
use crate::node::NodeRecord;
use std::collections::HashSet;

/// Outcome of checking one candidate identifier
#[derive(Debug, Clone)]
pub struct CandidateCheck<'a> {
    pub candidate: Identifier,
    pub reserved: bool,
    pub conflicts: Vec<&'a NodeRecord>,
}

impl CandidateCheck<'_> {
    /// Free to use: not reserved and nobody holds it
    pub fn is_valid(&self) -> bool {
        !self.reserved && self.conflicts.is_empty()
    }

    /// More than one record already holds the identifier
    pub fn is_duplicated(&self) -> bool {
        self.conflicts.len() > 1
    }
}

#[derive(Debug, Clone)]
pub struct Allocator {
    space: IdentifierSpace,
}

impl Allocator {
    pub fn new(space: IdentifierSpace) -> Self {
        Self { space }
    }

    pub fn space(&self) -> &IdentifierSpace {
        &self.space
    }

    pub fn width(&self) -> IdWidth {
        self.space.width()
    }

    /// Lowest non-reserved identifier of the configured width that no record holds
    pub fn suggest_free_id(&self, records: &[NodeRecord]) -> MeshIdResult<Identifier> {
        self.suggest_free_id_with_width(records, self.space.width())
    }

    pub fn suggest_free_id_with_width(
        &self,
        records: &[NodeRecord],
        width: IdWidth,
    ) -> MeshIdResult<Identifier> {
        let occupied: HashSet<Identifier> = records.iter().map(|r| r.identifier(width)).collect();
        let space = self.space.with_width(width);

        let free = space
            .iter()
            .filter(|id| !space.is_reserved(id.as_str()))
            .find(|id| !occupied.contains(id));
        free.ok_or(MeshIdError::Exhaustion { width })
    }

    /// Every record whose identifier, at the candidate's width, equals the candidate.
    /// Zero results means free; more than one is an upstream duplicate, not an error.
    pub fn find_conflicts<'a>(
        &self,
        records: &'a [NodeRecord],
        candidate: &Identifier,
    ) -> Vec<&'a NodeRecord> {
        let width = candidate.width();
        records
            .iter()
            .filter(|r| r.identifier(width).conflicts_with(candidate))
            .collect()
    }

    /// Resolve user input to a candidate: a 2/4-char identifier as given,
    /// anything longer is a public key sliced at the configured width
    pub fn resolve_candidate(&self, raw: &str) -> MeshIdResult<Identifier> {
        let raw = raw.trim();
        if IdWidth::from_chars(raw.len()).is_some() {
            Identifier::parse(raw)
        } else if raw.len() > IdWidth::Long.chars() {
            if !raw.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(MeshIdError::validation(
                    "public_key",
                    "must be a hexadecimal string",
                ));
            }
            Identifier::from_public_key(raw, self.space.width())
        } else {
            Err(MeshIdError::validation(
                "candidate",
                "must be a 2 or 4 character identifier or a full public key",
            ))
        }
    }

    /// Reservation and conflict verdict for a candidate
    pub fn check<'a>(&self, records: &'a [NodeRecord], candidate: Identifier) -> CandidateCheck<'a> {
        CandidateCheck {
            reserved: self.space.is_reserved(candidate.as_str()),
            conflicts: self.find_conflicts(records, &candidate),
            candidate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::ReservedBlocks;
    use crate::node::NodeType;

    fn rec(key: &str) -> NodeRecord {
        NodeRecord::new(key, key, NodeType::RoomOrRepeater).unwrap()
    }

    fn allocator(width: IdWidth) -> Allocator {
        Allocator::new(IdentifierSpace::new(width, ReservedBlocks::default()))
    }

    #[test]
    fn test_suggest_skips_reserved_and_occupied() {
        let alloc = allocator(IdWidth::Short);
        assert_eq!(alloc.suggest_free_id(&[]).unwrap().as_str(), "01");

        let records = vec![rec("01aaaa"), rec("02bbbb"), rec("03cccc")];
        assert_eq!(alloc.suggest_free_id(&records).unwrap().as_str(), "04");
    }

    #[test]
    fn test_suggest_is_case_insensitive() {
        let alloc = allocator(IdWidth::Short);
        let mut records: Vec<_> = (1u32..10)
            .map(|i| rec(&format!("{:02x}0000", i)))
            .collect();
        records.push(rec("0aBBBB"));
        records.push(rec("0Bcccc"));
        let suggested = alloc.suggest_free_id(&records).unwrap();
        assert_eq!(suggested.as_str(), "0C");
    }

    #[test]
    fn test_suggest_long_width() {
        let alloc = allocator(IdWidth::Long);
        // 00xx is reserved, so the first candidate is 0100
        let records = vec![rec("0100ff"), rec("0101ff")];
        assert_eq!(alloc.suggest_free_id(&records).unwrap().as_str(), "0102");
    }

    #[test]
    fn test_exhaustion() {
        let alloc = allocator(IdWidth::Short);
        let records: Vec<_> = (0u32..256)
            .map(|i| rec(&format!("{:02x}0000", i)))
            .collect();
        let err = alloc.suggest_free_id(&records).unwrap_err();
        assert!(err.is_exhaustion());
    }

    #[test]
    fn test_everything_reserved_is_exhaustion() {
        let nibbles: Vec<String> = (0..16).map(|n| format!("{:X}", n)).collect();
        let reserved = ReservedBlocks::new(Vec::<String>::new(), nibbles).unwrap();
        let alloc = Allocator::new(IdentifierSpace::new(IdWidth::Short, reserved));
        assert!(alloc.suggest_free_id(&[]).unwrap_err().is_exhaustion());
    }

    #[test]
    fn test_find_conflicts_at_candidate_width() {
        let alloc = allocator(IdWidth::Long);
        let records = vec![rec("3c4d11"), rec("3C4E22"), rec("3c4d33"), rec("5f0000")];

        let long = Identifier::parse("3C4D").unwrap();
        assert_eq!(alloc.find_conflicts(&records, &long).len(), 2);

        let short = Identifier::parse("3c").unwrap();
        assert_eq!(alloc.find_conflicts(&records, &short).len(), 3);

        let free = Identifier::parse("7777").unwrap();
        assert!(alloc.find_conflicts(&records, &free).is_empty());
    }

    #[test]
    fn test_check_verdicts() {
        let alloc = allocator(IdWidth::Short);
        let records = vec![rec("3c4d11"), rec("3c0000"), rec("5f0000")];

        let dup = alloc.check(&records, Identifier::parse("3C").unwrap());
        assert!(!dup.is_valid());
        assert!(dup.is_duplicated());

        let reserved = alloc.check(&records, Identifier::parse("ff").unwrap());
        assert!(reserved.reserved);
        assert!(!reserved.is_valid());

        let free = alloc.check(&records, Identifier::parse("42").unwrap());
        assert!(free.is_valid());
    }

    #[test]
    fn test_resolve_candidate() {
        let alloc = allocator(IdWidth::Long);
        assert_eq!(alloc.resolve_candidate("3c").unwrap().as_str(), "3C");
        assert_eq!(alloc.resolve_candidate("3c4d").unwrap().as_str(), "3C4D");
        assert_eq!(
            alloc.resolve_candidate("3c4d5e6f7a8b").unwrap().as_str(),
            "3C4D"
        );
        assert!(alloc.resolve_candidate("3c4").is_err());
        assert!(alloc.resolve_candidate("not-a-key!").is_err());
    }
}
