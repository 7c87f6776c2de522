//! Family trees and kinship.
//!
//! A family is a flat list of members and typed, undirected relationships
//! between them. From that snapshot this crate derives a generational
//! hierarchy ([`build_forest`]) and resolves how any two members are related
//! ([`Resolver`]).

pub mod domain;
pub use domain::{
    Family, FamilyError, Forest, Gender, InferenceConfig, Kinship, Member, MemberDraft, MemberId,
    MemberUpdate, Relationship, RelationshipId, RelationshipKind, RelationshipPath, ResolveError,
    Resolver, Stats, TreeNode, build_forest, infer_lineage, primary_spouse,
};

/// Filesystem storage for families.
pub mod storage;
pub use storage::{Archive, ArchiveError};
