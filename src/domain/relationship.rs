use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::MemberId;

/// The type of a relationship between two members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationshipKind {
    /// One member is the parent of the other.
    ///
    /// The record does not say which; see [`infer_lineage`](crate::infer_lineage).
    ParentChild,
    /// The members are married or partnered.
    Spouse,
    /// The members are siblings.
    Sibling,
}

impl RelationshipKind {
    /// All relationship kinds, in display order.
    pub const ALL: [Self; 3] = [Self::ParentChild, Self::Spouse, Self::Sibling];

    /// The canonical string form (`parent-child`, `spouse`, `sibling`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ParentChild => "parent-child",
            Self::Spouse => "spouse",
            Self::Sibling => "sibling",
        }
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationshipKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "parent-child" | "parent" | "child" => Ok(Self::ParentChild),
            "spouse" | "partner" => Ok(Self::Spouse),
            "sibling" => Ok(Self::Sibling),
            other => Err(format!(
                "unknown relationship kind '{other}' (expected parent-child, spouse or sibling)"
            )),
        }
    }
}

/// Identifier of a stored relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationshipId(Uuid);

impl RelationshipId {
    /// Generates a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl From<Uuid> for RelationshipId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl FromStr for RelationshipId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

impl fmt::Display for RelationshipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A typed, undirected edge between two distinct members.
///
/// `member_a` and `member_b` are logically unordered, but the order they were
/// recorded in is kept: it is the last-resort tie-break when inferring which
/// side of a parent-child record is the parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    /// Unique identifier.
    pub id: RelationshipId,
    /// The first-listed member.
    pub member_a: MemberId,
    /// The second-listed member.
    pub member_b: MemberId,
    /// The relationship type.
    pub kind: RelationshipKind,
}

/// Errors raised when constructing a relationship.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RelationshipError {
    /// Both endpoints are the same member.
    #[error("member {0} cannot be related to themselves")]
    SelfReference(MemberId),
}

impl Relationship {
    /// Creates a relationship with a fresh identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RelationshipError::SelfReference`] if `member_a == member_b`.
    pub fn new(
        member_a: MemberId,
        member_b: MemberId,
        kind: RelationshipKind,
    ) -> Result<Self, RelationshipError> {
        Self::with_id(RelationshipId::generate(), member_a, member_b, kind)
    }

    /// Creates a relationship with a caller-supplied identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RelationshipError::SelfReference`] if `member_a == member_b`.
    pub fn with_id(
        id: RelationshipId,
        member_a: MemberId,
        member_b: MemberId,
        kind: RelationshipKind,
    ) -> Result<Self, RelationshipError> {
        if member_a == member_b {
            return Err(RelationshipError::SelfReference(member_a));
        }
        Ok(Self {
            id,
            member_a,
            member_b,
            kind,
        })
    }

    /// Returns `true` if either endpoint is `member`.
    #[must_use]
    pub fn involves(&self, member: &MemberId) -> bool {
        &self.member_a == member || &self.member_b == member
    }

    /// Given one endpoint, returns the other.
    ///
    /// Returns `None` if `member` is not an endpoint of this relationship.
    #[must_use]
    pub fn other(&self, member: &MemberId) -> Option<&MemberId> {
        if &self.member_a == member {
            Some(&self.member_b)
        } else if &self.member_b == member {
            Some(&self.member_a)
        } else {
            None
        }
    }

    /// Returns `true` if this relationship joins `a` and `b`, in either order.
    #[must_use]
    pub fn connects(&self, a: &MemberId, b: &MemberId) -> bool {
        (&self.member_a == a && &self.member_b == b) || (&self.member_a == b && &self.member_b == a)
    }

    /// Returns `true` if `other` has the same kind and joins the same pair,
    /// regardless of endpoint order.
    #[must_use]
    pub fn duplicates(&self, other: &Self) -> bool {
        self.kind == other.kind && self.connects(&other.member_a, &other.member_b)
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn id(s: &str) -> MemberId {
        MemberId::try_from(s).unwrap()
    }

    #[test]
    fn rejects_self_reference() {
        let err = Relationship::new(id("alice"), id("alice"), RelationshipKind::Spouse)
            .expect_err("self reference should be rejected");
        assert_eq!(err, RelationshipError::SelfReference(id("alice")));
    }

    #[test]
    fn other_returns_opposite_endpoint() {
        let rel = Relationship::new(id("alice"), id("bob"), RelationshipKind::Spouse).unwrap();
        assert_eq!(rel.other(&id("alice")), Some(&id("bob")));
        assert_eq!(rel.other(&id("bob")), Some(&id("alice")));
        assert_eq!(rel.other(&id("carol")), None);
    }

    #[test]
    fn symmetric_records_are_duplicates() {
        let forward = Relationship::new(id("a"), id("b"), RelationshipKind::Sibling).unwrap();
        let backward = Relationship::new(id("b"), id("a"), RelationshipKind::Sibling).unwrap();
        let other_kind = Relationship::new(id("b"), id("a"), RelationshipKind::Spouse).unwrap();

        assert!(forward.duplicates(&backward));
        assert!(!forward.duplicates(&other_kind));
    }

    #[test_case("parent-child", RelationshipKind::ParentChild; "canonical parent child")]
    #[test_case("Spouse", RelationshipKind::Spouse; "capitalised spouse")]
    #[test_case("partner", RelationshipKind::Spouse; "partner alias")]
    #[test_case("sibling", RelationshipKind::Sibling; "sibling")]
    fn kind_parses(input: &str, expected: RelationshipKind) {
        assert_eq!(input.parse::<RelationshipKind>().unwrap(), expected);
    }

    #[test]
    fn kind_serialises_in_kebab_case() {
        let json = serde_json::to_string(&RelationshipKind::ParentChild).unwrap();
        assert_eq!(json, "\"parent-child\"");
    }
}
