//! Direction inference for undirected relationship records.
//!
//! A parent-child [`Relationship`](crate::Relationship) does not say which
//! member is the parent, and a spouse record does not say which partner
//! anchors the family in a tree. Both the hierarchy builder and the
//! relationship resolver go through the functions here so that they always
//! agree.

use crate::domain::{InferenceConfig, Member};

/// The resolved direction of a parent-child record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lineage<'a> {
    /// The member inferred to be the parent.
    pub parent: &'a Member,
    /// The member inferred to be the child.
    pub child: &'a Member,
}

impl Lineage<'_> {
    /// Returns `true` if `member` is the inferred parent.
    #[must_use]
    pub fn is_parent(&self, member: &Member) -> bool {
        self.parent.id == member.id
    }
}

/// Infers which side of a parent-child record is the parent.
///
/// `first` and `second` must be given in the order the record lists them.
///
/// 1. If both birth years are known and at least
///    [`min_generation_gap`](InferenceConfig::min_generation_gap) apart, the
///    earlier-born member is the parent.
/// 2. If both are known but closer together, `first` is the parent.
/// 3. If only one is known, that member is the parent when born before
///    [`reference_year`](InferenceConfig::reference_year), otherwise the
///    undated member is.
/// 4. If neither is known, `first` is the parent.
#[must_use]
pub fn infer_lineage<'a>(
    first: &'a Member,
    second: &'a Member,
    config: &InferenceConfig,
) -> Lineage<'a> {
    let first_is_parent = match (first.birth_year(), second.birth_year()) {
        (Some(a), Some(b)) if (a - b).abs() >= config.min_generation_gap => a < b,
        (Some(_), Some(_)) | (None, None) => true,
        (Some(a), None) => a < config.reference_year,
        (None, Some(b)) => b >= config.reference_year,
    };

    if first_is_parent {
        Lineage {
            parent: first,
            child: second,
        }
    } else {
        Lineage {
            parent: second,
            child: first,
        }
    }
}

/// Decides which partner of a spouse record anchors the family.
///
/// Returns `(primary, secondary)`. The partner with children is primary.
/// When both or neither have children, `first` is primary if their gender is
/// [`primary_spouse_gender`](InferenceConfig::primary_spouse_gender),
/// otherwise `second` is.
#[must_use]
pub fn primary_spouse<'a>(
    first: (&'a Member, bool),
    second: (&'a Member, bool),
    config: &InferenceConfig,
) -> (&'a Member, &'a Member) {
    let (a, a_has_children) = first;
    let (b, b_has_children) = second;

    match (a_has_children, b_has_children) {
        (true, false) => (a, b),
        (false, true) => (b, a),
        _ if a.gender == config.primary_spouse_gender => (a, b),
        _ => (b, a),
    }
}
