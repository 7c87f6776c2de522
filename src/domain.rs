//! Domain models for family trees.
//!
//! This module contains the member and relationship records, the inference
//! rules that give undirected records a direction, and the two derived views
//! built from them: the generational hierarchy and the relationship resolver.

/// Member records and identifiers.
pub mod member;
pub use member::{
    Gender, InvalidIdError, InvalidMemberError, Member, MemberDraft, MemberId, MemberUpdate,
};

/// Relationship records between members.
pub mod relationship;
pub use relationship::{Relationship, RelationshipError, RelationshipId, RelationshipKind};

mod config;
pub use config::{InferenceConfig, KinTerm};

pub mod inference;
pub use inference::{Lineage, infer_lineage, primary_spouse};

pub mod hierarchy;
pub use hierarchy::{Forest, TreeNode, build_forest};

pub mod resolver;
pub use resolver::{Kinship, RelationshipPath, ResolveError, Resolver};

pub mod family;
pub use family::{Family, FamilyError, Stats};
