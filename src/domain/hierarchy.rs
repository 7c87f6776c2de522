//! Rooted family trees built from an unordered set of relationships.
//!
//! [`build_forest`] turns a snapshot of members and relationships into a
//! [`Forest`] of [`TreeNode`]s suitable for top-down rendering. The nodes
//! borrow from the member slice; nothing is cached between calls.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::domain::{
    InferenceConfig, Member, MemberId, Relationship, RelationshipKind,
    inference::{infer_lineage, primary_spouse},
};

/// One member placed in the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode<'a> {
    /// The member at this position.
    pub member: &'a Member,
    /// The member's spouse, shown alongside them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spouse: Option<&'a Member>,
    /// Children, in the order their relationships were recorded.
    pub children: Vec<TreeNode<'a>>,
    /// Distance from the root (the root is generation 0).
    pub generation: usize,
}

impl<'a> TreeNode<'a> {
    /// Number of nodes below this one.
    #[must_use]
    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| 1 + child.descendant_count())
            .sum()
    }

    /// Pre-order walk over this node and everything below it.
    pub fn iter(&self) -> impl Iterator<Item = &TreeNode<'a>> {
        PreOrder { stack: vec![self] }
    }
}

/// The output of [`build_forest`]: an ordered list of root nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Forest<'a> {
    roots: Vec<TreeNode<'a>>,
}

impl<'a> Forest<'a> {
    /// The root nodes, in the order they were placed.
    #[must_use]
    pub fn roots(&self) -> &[TreeNode<'a>] {
        &self.roots
    }

    /// Consumes the forest, returning the root nodes.
    #[must_use]
    pub fn into_roots(self) -> Vec<TreeNode<'a>> {
        self.roots
    }

    /// Returns `true` if the forest has no trees.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Number of trees.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Pre-order walk over every node in every tree.
    pub fn iter(&self) -> impl Iterator<Item = &TreeNode<'a>> {
        self.roots.iter().flat_map(TreeNode::iter)
    }

    /// Number of generations spanned by the deepest tree.
    #[must_use]
    pub fn generations(&self) -> usize {
        self.iter()
            .map(|node| node.generation + 1)
            .max()
            .unwrap_or(0)
    }

    /// Identifiers of the members placed as tree nodes, in pre-order.
    ///
    /// Spouses shown alongside a node are not included.
    #[must_use]
    pub fn placed_members(&self) -> Vec<&'a MemberId> {
        self.iter()
            .map(|node| {
                let member: &'a Member = node.member;
                &member.id
            })
            .collect()
    }

    /// Finds the node for the given member.
    #[must_use]
    pub fn find(&self, id: &MemberId) -> Option<&TreeNode<'a>> {
        self.iter().find(|node| &node.member.id == id)
    }
}

struct PreOrder<'f, 'a> {
    stack: Vec<&'f TreeNode<'a>>,
}

impl<'f, 'a> Iterator for PreOrder<'f, 'a> {
    type Item = &'f TreeNode<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Builds the display hierarchy for a snapshot of members and relationships.
///
/// - Parent-child direction is inferred with
///   [`infer_lineage`](crate::infer_lineage).
/// - For each spouse pair one partner is primary and the other is attached to
///   them as a spouse (see [`primary_spouse`](crate::primary_spouse)); the
///   secondary partner is never a root.
/// - Roots are members with no inferred parent that are not a secondary
///   spouse, in input order. If there are none, the oldest member is the only
///   root.
/// - Each member is placed at most once, under the first root that reaches
///   it. Members no root reaches are left out. This includes children whose
///   only recorded parent is a secondary spouse.
///
/// Relationships whose endpoints are not in `members` are skipped. Sibling
/// relationships do not affect the shape of the tree.
#[instrument(
    level = "debug",
    skip_all,
    fields(members = members.len(), relationships = relationships.len())
)]
#[must_use]
pub fn build_forest<'a>(
    members: &'a [Member],
    relationships: &[Relationship],
    config: &InferenceConfig,
) -> Forest<'a> {
    if members.is_empty() {
        return Forest::default();
    }

    let mut index: HashMap<&str, &'a Member> = HashMap::with_capacity(members.len());
    for member in members {
        index.entry(member.id.as_str()).or_insert(member);
    }

    let mut children: HashMap<&'a str, Vec<&'a Member>> = HashMap::new();
    let mut has_parent: HashSet<&'a str> = HashSet::new();
    let mut spouse_pairs: Vec<(&'a Member, &'a Member)> = Vec::new();

    for relationship in relationships {
        let (Some(&a), Some(&b)) = (
            index.get(relationship.member_a.as_str()),
            index.get(relationship.member_b.as_str()),
        ) else {
            debug!(
                relationship = %relationship.id,
                "skipping relationship with unknown member"
            );
            continue;
        };
        if a.id == b.id {
            debug!(relationship = %relationship.id, "skipping self relationship");
            continue;
        }

        match relationship.kind {
            RelationshipKind::ParentChild => {
                let lineage = infer_lineage(a, b, config);
                let siblings = children.entry(lineage.parent.id.as_str()).or_default();
                if !siblings.iter().any(|c| c.id == lineage.child.id) {
                    siblings.push(lineage.child);
                }
                has_parent.insert(lineage.child.id.as_str());
            }
            RelationshipKind::Spouse => spouse_pairs.push((a, b)),
            RelationshipKind::Sibling => {}
        }
    }

    let mut spouses: HashMap<&'a str, &'a Member> = HashMap::new();
    let mut secondary: HashSet<&'a str> = HashSet::new();
    for &(a, b) in &spouse_pairs {
        let a_has_children = children.contains_key(a.id.as_str());
        let b_has_children = children.contains_key(b.id.as_str());
        let (_, partner) = primary_spouse((a, a_has_children), (b, b_has_children), config);
        secondary.insert(partner.id.as_str());

        spouses.entry(a.id.as_str()).or_insert(b);
        spouses.entry(b.id.as_str()).or_insert(a);
    }

    let mut roots: Vec<&'a Member> = members
        .iter()
        .filter(|m| !has_parent.contains(m.id.as_str()) && !secondary.contains(m.id.as_str()))
        .collect();

    if roots.is_empty() {
        // every member has a parent or is a secondary spouse (e.g. a cycle)
        if let Some(oldest) = members
            .iter()
            .min_by_key(|m| (m.birth_date.is_none(), m.birth_date))
        {
            debug!(root = %oldest.id, "no natural roots, falling back to oldest member");
            roots.push(oldest);
        }
    }

    let mut builder = Builder {
        children,
        spouses,
        max_depth: config.max_depth,
        visited: HashSet::with_capacity(members.len()),
    };

    let roots = roots
        .into_iter()
        .filter_map(|root| builder.node(root, 0))
        .collect();

    Forest { roots }
}

struct Builder<'a> {
    children: HashMap<&'a str, Vec<&'a Member>>,
    spouses: HashMap<&'a str, &'a Member>,
    max_depth: usize,
    visited: HashSet<&'a str>,
}

impl<'a> Builder<'a> {
    fn node(&mut self, member: &'a Member, generation: usize) -> Option<TreeNode<'a>> {
        let id = member.id.as_str();
        if !self.visited.insert(id) {
            return None;
        }

        let spouse = self.spouses.get(id).copied();
        let child_members = self.children.get(id).cloned().unwrap_or_default();

        if !child_members.is_empty() && generation >= self.max_depth {
            warn!(
                member = %member.id,
                depth = generation,
                "maximum tree depth reached, omitting descendants"
            );
            return Some(TreeNode {
                member,
                spouse,
                children: Vec::new(),
                generation,
            });
        }

        let children = child_members
            .into_iter()
            .filter_map(|child| self.node(child, generation + 1))
            .collect();

        Some(TreeNode {
            member,
            spouse,
            children,
            generation,
        })
    }
}
