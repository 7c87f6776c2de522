//! Shortest relationship paths and kinship labels between members.

use std::{
    collections::{HashMap, HashSet, VecDeque},
    fmt,
};

use nonempty::NonEmpty;
use petgraph::graphmap::UnGraphMap;
use serde::{Serialize, Serializer, ser::SerializeSeq};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::domain::{
    Gender, InferenceConfig, KinTerm, Member, MemberId, Relationship, RelationshipKind,
    inference::infer_lineage,
};

/// What the far end of a [`RelationshipPath`] is to the near end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kinship {
    /// Both ends are the same member.
    Oneself,
    /// The far end is the near end's parent.
    Parent,
    /// The far end is the near end's child.
    Child,
    /// The two are married or partnered.
    Spouse,
    /// The two are siblings.
    Sibling,
    /// A female relative one step off the direct line.
    Niece,
    /// A male relative one step off the direct line.
    Nephew,
    /// A direct ancestor two or more generations up.
    Grandparent {
        /// Number of "great-" prefixes.
        greats: usize,
    },
    /// A direct descendant two or more generations down.
    Grandchild {
        /// Number of "great-" prefixes.
        greats: usize,
    },
    /// A relative joined through a longer chain.
    Cousin {
        /// 1 for first cousin, 2 for second, ...
        degree: usize,
    },
    /// Path-adjacent members with no recorded relationship.
    Unknown,
}

impl Kinship {
    /// Returns the label seen from the other end of the path, where one is
    /// defined by the relationship alone.
    ///
    /// Niece/nephew labels depend on the other member's gender and are
    /// returned unchanged.
    #[must_use]
    pub const fn complement(self) -> Self {
        match self {
            Self::Parent => Self::Child,
            Self::Child => Self::Parent,
            Self::Grandparent { greats } => Self::Grandchild { greats },
            Self::Grandchild { greats } => Self::Grandparent { greats },
            other => other,
        }
    }
}

impl fmt::Display for Kinship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Oneself => f.write_str("self"),
            Self::Parent => f.write_str("parent"),
            Self::Child => f.write_str("child"),
            Self::Spouse => f.write_str("spouse"),
            Self::Sibling => f.write_str("sibling"),
            Self::Niece => f.write_str("niece"),
            Self::Nephew => f.write_str("nephew"),
            Self::Grandparent { greats } => write!(f, "{}grandparent", "great-".repeat(*greats)),
            Self::Grandchild { greats } => write!(f, "{}grandchild", "great-".repeat(*greats)),
            Self::Cousin { degree } => write!(f, "{} cousin", ordinal(*degree)),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

impl Serialize for Kinship {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// `first` to `fifth` in words, numeric ordinals after that.
fn ordinal(n: usize) -> String {
    const WORDS: [&str; 5] = ["first", "second", "third", "fourth", "fifth"];

    if let Some(word) = n.checked_sub(1).and_then(|i| WORDS.get(i)) {
        return (*word).to_string();
    }

    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

/// The result of resolving the relationship between two members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationshipPath<'a> {
    /// The member the relationship is seen from.
    pub from: &'a Member,
    /// The member being described.
    pub to: &'a Member,
    /// The shortest chain of members from `from` to `to`, inclusive.
    #[serde(serialize_with = "serialize_path")]
    pub path: NonEmpty<&'a Member>,
    /// Path length minus two, floored at zero.
    pub degree: usize,
    /// What `to` is to `from`.
    #[serde(rename = "label")]
    pub kinship: Kinship,
}

impl RelationshipPath<'_> {
    /// The human-readable relationship label, e.g. `"second cousin"`.
    #[must_use]
    pub fn label(&self) -> String {
        self.kinship.to_string()
    }

    /// Identifiers along the path, in order.
    #[must_use]
    pub fn ids(&self) -> Vec<&MemberId> {
        self.path.iter().map(|member| &member.id).collect()
    }
}

fn serialize_path<S: Serializer>(
    path: &NonEmpty<&Member>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(path.len()))?;
    for member in path.iter() {
        seq.serialize_element(member)?;
    }
    seq.end()
}

/// Errors raised by [`Resolver::new`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// No members were supplied, so there is nothing to resolve between.
    #[error("cannot resolve relationships without any members")]
    NoMembers,
}

/// Computes shortest relationship paths over a snapshot of members and
/// relationships.
///
/// Every relationship is an undirected edge regardless of its kind. Records
/// whose endpoints are not among the members are ignored.
#[derive(Debug)]
pub struct Resolver<'a> {
    members: HashMap<&'a str, (usize, &'a Member)>,
    order: &'a [Member],
    graph: UnGraphMap<&'a str, ()>,
    /// The first record between each unordered pair.
    direct: HashMap<(&'a str, &'a str), &'a Relationship>,
    config: InferenceConfig,
}

fn pair<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b { (a, b) } else { (b, a) }
}

impl<'a> Resolver<'a> {
    /// Builds the relationship graph for the given snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::NoMembers`] if `members` is empty.
    #[instrument(
        level = "debug",
        skip_all,
        fields(members = members.len(), relationships = relationships.len())
    )]
    pub fn new(
        members: &'a [Member],
        relationships: &'a [Relationship],
        config: &InferenceConfig,
    ) -> Result<Self, ResolveError> {
        if members.is_empty() {
            return Err(ResolveError::NoMembers);
        }

        let mut index = HashMap::with_capacity(members.len());
        let mut graph = UnGraphMap::with_capacity(members.len(), relationships.len());
        for (position, member) in members.iter().enumerate() {
            index
                .entry(member.id.as_str())
                .or_insert((position, member));
            graph.add_node(member.id.as_str());
        }

        let mut direct = HashMap::with_capacity(relationships.len());
        for relationship in relationships {
            let a = relationship.member_a.as_str();
            let b = relationship.member_b.as_str();
            if a == b || !index.contains_key(a) || !index.contains_key(b) {
                debug!(relationship = %relationship.id, "ignoring malformed relationship");
                continue;
            }
            graph.add_edge(a, b, ());
            direct.entry(pair(a, b)).or_insert(relationship);
        }

        Ok(Self {
            members: index,
            order: members,
            graph,
            direct,
            config: config.clone(),
        })
    }

    /// Resolves the relationship of `to` as seen from `from`.
    ///
    /// Returns `None` if either member is unknown or no chain of
    /// relationships connects them.
    #[must_use]
    pub fn resolve(&self, from: &MemberId, to: &MemberId) -> Option<RelationshipPath<'a>> {
        let &(from_position, from_member) = self.members.get(from.as_str())?;
        let &(to_position, to_member) = self.members.get(to.as_str())?;

        // always search from the endpoint listed first so that resolving in
        // the other direction yields exactly the reversed path
        let path = if from_position <= to_position {
            self.shortest_path(from_member, to_member)?
        } else {
            let mut path = self.shortest_path(to_member, from_member)?;
            path.reverse();
            path
        };

        let kinship = self.classify(&path);
        let degree = path.len().saturating_sub(2);

        Some(RelationshipPath {
            from: from_member,
            to: to_member,
            path: NonEmpty::from_vec(path)?,
            degree,
            kinship,
        })
    }

    /// Resolves `from` against every other member.
    ///
    /// Members with no connecting path are left out. The result is sorted by
    /// ascending degree, keeping member order among equal degrees. An unknown
    /// `from` yields an empty list.
    #[instrument(level = "debug", skip(self))]
    #[must_use]
    pub fn resolve_all(&self, from: &MemberId) -> Vec<RelationshipPath<'a>> {
        if !self.members.contains_key(from.as_str()) {
            return Vec::new();
        }

        let mut seen = HashSet::from([from.as_str()]);
        let mut paths: Vec<_> = self
            .order
            .iter()
            .filter(|member| seen.insert(member.id.as_str()))
            .filter_map(|member| self.resolve(from, &member.id))
            .collect();

        paths.sort_by_key(|path| path.degree);
        paths
    }

    /// Breadth-first search; ties go to whichever edge was recorded first.
    fn shortest_path(&self, from: &'a Member, to: &'a Member) -> Option<Vec<&'a Member>> {
        let start = from.id.as_str();
        let target = to.id.as_str();

        let mut predecessors: HashMap<&'a str, &'a str> = HashMap::new();
        let mut visited = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);

        while let Some(current) = queue.pop_front() {
            if current == target {
                let mut path = vec![self.member(current)?];
                let mut cursor = current;
                while let Some(&previous) = predecessors.get(cursor) {
                    path.push(self.member(previous)?);
                    cursor = previous;
                }
                path.reverse();
                return Some(path);
            }

            for next in self.graph.neighbors(current) {
                if visited.insert(next) {
                    predecessors.insert(next, current);
                    queue.push_back(next);
                }
            }
        }

        None
    }

    fn member(&self, id: &str) -> Option<&'a Member> {
        self.members.get(id).map(|&(_, member)| member)
    }

    fn classify(&self, path: &[&'a Member]) -> Kinship {
        match path {
            [] | [_] => Kinship::Oneself,
            [from, to] => self.direct_kinship(from, to),
            _ => {
                let hops: Vec<Kinship> = path
                    .windows(2)
                    .map(|hop| self.direct_kinship(hop[0], hop[1]))
                    .collect();
                let greats = path.len() - 3;

                if hops.iter().all(|hop| *hop == Kinship::Child) {
                    return Kinship::Grandchild { greats };
                }
                if hops.iter().all(|hop| *hop == Kinship::Parent) {
                    return Kinship::Grandparent { greats };
                }

                match (path.len(), hops.as_slice()) {
                    (
                        3,
                        [Kinship::Parent, Kinship::Sibling] | [Kinship::Sibling, Kinship::Child],
                    ) => self.niece_or_nephew(path[2]),
                    (3, _) => Kinship::Cousin { degree: 1 },
                    (len, _) => Kinship::Cousin {
                        degree: (len - 2) / 2,
                    },
                }
            }
        }
    }

    /// What `to` is to `from`, judged from the first record between them.
    fn direct_kinship(&self, from: &Member, to: &Member) -> Kinship {
        let Some(relationship) = self.direct.get(&pair(from.id.as_str(), to.id.as_str())) else {
            return Kinship::Unknown;
        };

        match relationship.kind {
            RelationshipKind::Spouse => Kinship::Spouse,
            RelationshipKind::Sibling => Kinship::Sibling,
            RelationshipKind::ParentChild => {
                let (Some(first), Some(second)) = (
                    self.member(relationship.member_a.as_str()),
                    self.member(relationship.member_b.as_str()),
                ) else {
                    return Kinship::Unknown;
                };
                if infer_lineage(first, second, &self.config).is_parent(from) {
                    Kinship::Child
                } else {
                    Kinship::Parent
                }
            }
        }
    }

    fn niece_or_nephew(&self, member: &Member) -> Kinship {
        match member.gender {
            Gender::Male => Kinship::Nephew,
            Gender::Female => Kinship::Niece,
            Gender::Other => match self.config.other_gender_kin_term {
                KinTerm::Niece => Kinship::Niece,
                KinTerm::Nephew => Kinship::Nephew,
            },
        }
    }
}
