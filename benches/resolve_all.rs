//! This bench resolves every relationship of one member in a large, generated
//! family, and builds the generational hierarchy for the same family.

#![allow(missing_docs)]

use chrono::NaiveDate;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use kinship::{
    Family, Gender, InferenceConfig, Member, MemberDraft, MemberId, RelationshipKind,
};

/// Generates `generations` generations where every couple has three children,
/// each of whom marries someone from outside the family.
fn generate_family(generations: usize) -> (Family, MemberId) {
    let mut family = Family::default();
    let add = |family: &mut Family, name: String, gender: Gender, year: i32| -> MemberId {
        family
            .add_member(MemberDraft {
                given_name: name,
                family_name: "Bench".to_string(),
                birth_date: NaiveDate::from_ymd_opt(year, 1, 1),
                gender,
                ..MemberDraft::default()
            })
            .unwrap()
            .id
            .clone()
    };

    let founder = add(&mut family, "founder".to_string(), Gender::Male, 1800);
    let partner = add(&mut family, "partner".to_string(), Gender::Female, 1802);
    family
        .add_relationship(&founder, &partner, RelationshipKind::Spouse)
        .unwrap();

    let mut couples = vec![(founder.clone(), partner)];
    for generation in 1..generations {
        let year = 1800 + i32::try_from(generation * 25).unwrap();
        let mut next = Vec::new();
        for (n, (parent, other_parent)) in couples.iter().enumerate() {
            let mut children: Vec<MemberId> = Vec::new();
            for c in 0..3 {
                let child = add(&mut family, format!("g{generation}-{n}-{c}"), Gender::Male, year);
                family
                    .add_relationship(parent, &child, RelationshipKind::ParentChild)
                    .unwrap();
                family
                    .add_relationship(other_parent, &child, RelationshipKind::ParentChild)
                    .unwrap();
                for sibling in &children {
                    family
                        .add_relationship(sibling, &child, RelationshipKind::Sibling)
                        .unwrap();
                }
                let spouse = add(
                    &mut family,
                    format!("s{generation}-{n}-{c}"),
                    Gender::Female,
                    year,
                );
                family
                    .add_relationship(&child, &spouse, RelationshipKind::Spouse)
                    .unwrap();
                children.push(child.clone());
                next.push((child, spouse));
            }
        }
        couples = next;
    }

    (family, founder)
}

fn resolve_all(c: &mut Criterion) {
    let config = InferenceConfig::default();
    let mut group = c.benchmark_group("resolve all");

    for generations in [3, 5] {
        let (family, founder) = generate_family(generations);
        let resolver = family.resolver(&config).unwrap();
        group.bench_with_input(
            BenchmarkId::from_parameter(family.members().len()),
            &founder,
            |b, founder| b.iter(|| resolver.resolve_all(founder)),
        );
    }

    group.finish();
}

fn build_forest(c: &mut Criterion) {
    let config = InferenceConfig::default();
    let (family, _) = generate_family(5);
    let members: &[Member] = family.members();

    c.bench_function("build forest", |b| {
        b.iter(|| kinship::build_forest(members, family.relationships(), &config));
    });
}

criterion_group!(benches, resolve_all, build_forest);
criterion_main!(benches);
