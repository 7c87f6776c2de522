use std::path::{Path, PathBuf};

use anyhow::Context;
use kinship::{Archive, Family, MemberId, RelationshipId, RelationshipKind};
use serde::Deserialize;
use tracing::instrument;

use super::{find_member, style};

#[derive(Debug, clap::Parser)]
pub struct Relate {
    /// Member id or full name
    #[arg(required_unless_present = "from_file")]
    a: Option<String>,

    /// Member id or full name
    #[arg(required_unless_present = "from_file")]
    b: Option<String>,

    /// Relationship kind (parent-child, spouse, sibling)
    #[arg(required_unless_present = "from_file")]
    kind: Option<RelationshipKind>,

    /// Add every relationship listed in a YAML file instead
    ///
    /// The file holds a list of rows, each with `a`, `b` and `kind` keys.
    /// Rows that name an unknown member, relate a member to themselves or
    /// repeat an existing relationship are reported and skipped.
    #[arg(long, value_name = "PATH", conflicts_with_all = ["a", "b", "kind"])]
    from_file: Option<PathBuf>,
}

/// One requested relationship, with members given by id or full name.
#[derive(Debug, Deserialize)]
struct Row {
    a: String,
    b: String,
    kind: RelationshipKind,
}

/// A row whose members were found, ready to be recorded.
struct Resolved {
    a: MemberId,
    b: MemberId,
    kind: RelationshipKind,
    summary: String,
}

impl Relate {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut archive = Archive::open(root)?;
        let rows = self.rows()?;
        let total = rows.len();

        let resolved: Vec<_> = rows
            .iter()
            .map(|row| resolve_row(archive.family(), row))
            .collect();

        let valid = resolved
            .iter()
            .flatten()
            .map(|row| (row.a.clone(), row.b.clone(), row.kind));
        let mut added = archive.family_mut().add_relationships(valid).into_iter();

        let mut recorded = 0;
        let mut errors = Vec::new();
        for (row, outcome) in rows.iter().zip(resolved) {
            let outcome = outcome.and_then(|resolved| {
                let id = added
                    .next()
                    .context("relationship outcome missing for row")??;
                Ok((resolved.summary, id))
            });
            match outcome {
                Ok((summary, id)) => {
                    recorded += 1;
                    println!("{}", style::success(summary));
                    println!("{}", style::dim(format_args!("relationship id: {id}")));
                }
                Err(error) => errors.push((row, error)),
            }
        }

        if recorded > 0 {
            archive.flush()?;
        }

        match errors.as_slice() {
            [] => Ok(()),
            [(_, error)] if total == 1 => anyhow::bail!("{error}"),
            errors => {
                for (row, error) in errors {
                    eprintln!(
                        "{}",
                        style::warning(format_args!(
                            "skipped {} / {} ({}): {error}",
                            row.a, row.b, row.kind
                        ))
                    );
                }
                anyhow::bail!(
                    "{} of {total} relationship(s) could not be added",
                    errors.len()
                )
            }
        }
    }

    fn rows(&self) -> anyhow::Result<Vec<Row>> {
        if let Some(path) = &self.from_file {
            return read_rows(path);
        }
        match (&self.a, &self.b, self.kind) {
            (Some(a), Some(b), Some(kind)) => Ok(vec![Row {
                a: a.clone(),
                b: b.clone(),
                kind,
            }]),
            _ => anyhow::bail!("give two members and a kind, or --from-file"),
        }
    }
}

fn read_rows(path: &Path) -> anyhow::Result<Vec<Row>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_yaml::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
}

fn resolve_row(family: &Family, row: &Row) -> anyhow::Result<Resolved> {
    let a = find_member(family, &row.a)?;
    let b = find_member(family, &row.b)?;
    Ok(Resolved {
        a: a.id.clone(),
        b: b.id.clone(),
        kind: row.kind,
        summary: format!("Related {} and {} ({})", a.full_name(), b.full_name(), row.kind),
    })
}

#[derive(Debug, clap::Parser)]
pub struct Unrelate {
    /// The relationship id, as shown by `kin relate` or `kin list --output json`
    id: RelationshipId,
}

impl Unrelate {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut archive = Archive::open(root)?;

        let relationship = archive.family_mut().remove_relationship(self.id)?;
        archive.flush()?;

        println!(
            "{}",
            style::success(format_args!(
                "Removed {} relationship between {} and {}",
                relationship.kind, relationship.member_a, relationship.member_b
            ))
        );
        Ok(())
    }
}
