//! The owned family snapshot: members, relationships, and the editing rules
//! that keep them consistent.
//!
//! [`Family`] knows nothing about the filesystem. It is the value the storage
//! layer loads and saves, and the snapshot handed to the hierarchy builder
//! and the relationship resolver.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::domain::{
    Forest, InferenceConfig, InvalidMemberError, Member, MemberDraft, MemberId, MemberUpdate,
    Relationship, RelationshipError, RelationshipId, RelationshipKind, ResolveError, Resolver,
    build_forest,
};

/// Errors raised when editing a [`Family`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FamilyError {
    /// No member has the given identifier.
    #[error("member {0} not found")]
    MemberNotFound(MemberId),
    /// A member with the given identifier already exists.
    #[error("member {0} already exists")]
    DuplicateMember(MemberId),
    /// No relationship has the given identifier.
    #[error("relationship {0} not found")]
    RelationshipNotFound(RelationshipId),
    /// The same pair is already related in the same way.
    #[error("{a} and {b} already have a {kind} relationship")]
    DuplicateRelationship {
        /// The first member.
        a: MemberId,
        /// The second member.
        b: MemberId,
        /// The existing relationship kind.
        kind: RelationshipKind,
    },
    /// A member cannot be related to themselves.
    #[error("member {0} cannot be related to themselves")]
    SelfRelationship(MemberId),
    /// The member's fields failed validation.
    #[error(transparent)]
    InvalidMember(#[from] InvalidMemberError),
}

impl From<RelationshipError> for FamilyError {
    fn from(error: RelationshipError) -> Self {
        match error {
            RelationshipError::SelfReference(id) => Self::SelfRelationship(id),
        }
    }
}

/// Summary counts for a family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// Number of members.
    pub members: usize,
    /// Number of relationship records.
    pub relationships: usize,
    /// Number of parent-child records.
    pub parent_child: usize,
    /// Number of spouse records.
    pub spouse: usize,
    /// Number of sibling records.
    pub sibling: usize,
    /// Number of root trees in the hierarchy.
    pub roots: usize,
    /// Depth of the deepest tree in the hierarchy.
    pub generations: usize,
}

/// An in-memory family: members and the relationships between them, each in
/// the order they were recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Family {
    #[serde(default)]
    members: Vec<Member>,
    #[serde(default)]
    relationships: Vec<Relationship>,
}

impl Family {
    /// Creates a family from previously stored records, as-is.
    ///
    /// No consistency checks are made; the core skips relationships whose
    /// endpoints are unknown. See [`Family::dangling_relationships`].
    #[must_use]
    pub const fn from_parts(members: Vec<Member>, relationships: Vec<Relationship>) -> Self {
        Self {
            members,
            relationships,
        }
    }

    /// All members, in recorded order.
    #[must_use]
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// All relationships, in recorded order.
    #[must_use]
    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    /// Looks up a member by identifier.
    #[must_use]
    pub fn member(&self, id: &MemberId) -> Option<&Member> {
        self.members.iter().find(|member| &member.id == id)
    }

    /// Looks up a relationship by identifier.
    #[must_use]
    pub fn relationship(&self, id: RelationshipId) -> Option<&Relationship> {
        self.relationships.iter().find(|rel| rel.id == id)
    }

    /// Members whose full name equals `name`, ignoring case.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Vec<&Member> {
        let wanted = name.trim().to_lowercase();
        self.members
            .iter()
            .filter(|member| member.full_name().to_lowercase() == wanted)
            .collect()
    }

    /// Validates a draft and adds it as a new member with a fresh identifier.
    ///
    /// # Errors
    ///
    /// Returns [`FamilyError::InvalidMember`] if the draft fails validation.
    #[instrument(level = "debug", skip(self, draft))]
    pub fn add_member(&mut self, draft: MemberDraft) -> Result<&Member, FamilyError> {
        self.insert_member(draft.into_member(MemberId::generate()))
    }

    /// Adds a member with a caller-supplied identifier.
    ///
    /// # Errors
    ///
    /// Returns [`FamilyError::DuplicateMember`] if the identifier is taken,
    /// or [`FamilyError::InvalidMember`] if validation fails.
    #[instrument(level = "debug", skip(self, member), fields(id = %member.id))]
    pub fn insert_member(&mut self, member: Member) -> Result<&Member, FamilyError> {
        member.validate()?;
        if self.member(&member.id).is_some() {
            return Err(FamilyError::DuplicateMember(member.id));
        }

        let index = self.members.len();
        self.members.push(member);
        Ok(&self.members[index])
    }

    /// Applies a partial update to an existing member.
    ///
    /// # Errors
    ///
    /// Returns [`FamilyError::MemberNotFound`] if there is no such member, or
    /// [`FamilyError::InvalidMember`] if the updated member fails validation.
    /// The stored member is unchanged on error.
    #[instrument(level = "debug", skip(self, update))]
    pub fn update_member(
        &mut self,
        id: &MemberId,
        update: MemberUpdate,
    ) -> Result<&Member, FamilyError> {
        let index = self.position(id)?;
        let updated = update.apply(&self.members[index]);
        updated.validate()?;

        self.members[index] = updated;
        Ok(&self.members[index])
    }

    /// Removes a member together with every relationship that references
    /// them.
    ///
    /// # Errors
    ///
    /// Returns [`FamilyError::MemberNotFound`] if there is no such member.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_member(
        &mut self,
        id: &MemberId,
    ) -> Result<(Member, Vec<Relationship>), FamilyError> {
        let index = self.position(id)?;
        let member = self.members.remove(index);

        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.relationships)
            .into_iter()
            .partition(|rel| rel.involves(id));
        self.relationships = kept;

        debug!(relationships = removed.len(), "removed member");
        Ok((member, removed))
    }

    /// Records a relationship between two existing members.
    ///
    /// # Errors
    ///
    /// - [`FamilyError::MemberNotFound`] if either member does not exist
    /// - [`FamilyError::SelfRelationship`] if `a == b`
    /// - [`FamilyError::DuplicateRelationship`] if the pair already has a
    ///   relationship of this kind, in either order
    #[instrument(level = "debug", skip(self))]
    pub fn add_relationship(
        &mut self,
        a: &MemberId,
        b: &MemberId,
        kind: RelationshipKind,
    ) -> Result<&Relationship, FamilyError> {
        self.position(a)?;
        self.position(b)?;

        let relationship = Relationship::new(a.clone(), b.clone(), kind)?;
        if self
            .relationships
            .iter()
            .any(|existing| existing.duplicates(&relationship))
        {
            return Err(FamilyError::DuplicateRelationship {
                a: a.clone(),
                b: b.clone(),
                kind,
            });
        }

        let index = self.relationships.len();
        self.relationships.push(relationship);
        Ok(&self.relationships[index])
    }

    /// Records several relationships in order, as if by repeated calls to
    /// [`Family::add_relationship`].
    ///
    /// A rejected row does not stop the rest. Rows are checked against the
    /// relationships recorded so far, so a pair repeated within the batch is
    /// added once and reported as a duplicate after that.
    #[instrument(level = "debug", skip_all)]
    pub fn add_relationships<I>(&mut self, rows: I) -> Vec<Result<RelationshipId, FamilyError>>
    where
        I: IntoIterator<Item = (MemberId, MemberId, RelationshipKind)>,
    {
        let results: Vec<_> = rows
            .into_iter()
            .map(|(a, b, kind)| self.add_relationship(&a, &b, kind).map(|rel| rel.id))
            .collect();

        debug!(
            added = results.iter().filter(|result| result.is_ok()).count(),
            rejected = results.iter().filter(|result| result.is_err()).count(),
            "added relationships"
        );
        results
    }

    /// Removes a relationship.
    ///
    /// # Errors
    ///
    /// Returns [`FamilyError::RelationshipNotFound`] if there is no such
    /// relationship.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_relationship(&mut self, id: RelationshipId) -> Result<Relationship, FamilyError> {
        let index = self
            .relationships
            .iter()
            .position(|rel| rel.id == id)
            .ok_or(FamilyError::RelationshipNotFound(id))?;
        Ok(self.relationships.remove(index))
    }

    /// Members ordered by given name, then family name.
    #[must_use]
    pub fn members_sorted(&self) -> Vec<&Member> {
        let mut members: Vec<_> = self.members.iter().collect();
        members.sort_by(|a, b| {
            a.given_name
                .cmp(&b.given_name)
                .then_with(|| a.family_name.cmp(&b.family_name))
        });
        members
    }

    /// Members matching a search term, in listing order.
    ///
    /// See [`Member::matches`].
    #[must_use]
    pub fn search(&self, term: &str) -> Vec<&Member> {
        let mut found = self.members_sorted();
        found.retain(|member| member.matches(term));
        found
    }

    /// Relationships that involve the given member.
    pub fn relationships_of<'a>(
        &'a self,
        id: &'a MemberId,
    ) -> impl Iterator<Item = &'a Relationship> + 'a {
        self.relationships.iter().filter(move |rel| rel.involves(id))
    }

    /// Relationships whose endpoints are not both known members.
    pub fn dangling_relationships(&self) -> impl Iterator<Item = &Relationship> + '_ {
        let known: HashSet<&MemberId> = self.members.iter().map(|member| &member.id).collect();
        self.relationships
            .iter()
            .filter(move |rel| !known.contains(&rel.member_a) || !known.contains(&rel.member_b))
    }

    /// Builds the hierarchy for this family.
    #[must_use]
    pub fn forest(&self, config: &InferenceConfig) -> Forest<'_> {
        build_forest(&self.members, &self.relationships, config)
    }

    /// Creates a resolver over this family.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::NoMembers`] if the family is empty.
    pub fn resolver(&self, config: &InferenceConfig) -> Result<Resolver<'_>, ResolveError> {
        Resolver::new(&self.members, &self.relationships, config)
    }

    /// Dashboard counts.
    #[must_use]
    pub fn stats(&self, config: &InferenceConfig) -> Stats {
        let count = |kind| {
            self.relationships
                .iter()
                .filter(|rel| rel.kind == kind)
                .count()
        };
        let forest = self.forest(config);

        Stats {
            members: self.members.len(),
            relationships: self.relationships.len(),
            parent_child: count(RelationshipKind::ParentChild),
            spouse: count(RelationshipKind::Spouse),
            sibling: count(RelationshipKind::Sibling),
            roots: forest.len(),
            generations: forest.generations(),
        }
    }

    fn position(&self, id: &MemberId) -> Result<usize, FamilyError> {
        self.members
            .iter()
            .position(|member| &member.id == id)
            .ok_or_else(|| FamilyError::MemberNotFound(id.clone()))
    }
}
