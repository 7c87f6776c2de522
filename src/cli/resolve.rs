use std::{path::PathBuf, process};

use clap::{Parser, ValueEnum};
use kinship::{Archive, RelationshipPath};
use tracing::instrument;

use super::{
    find_member,
    style::{self, is_narrow},
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Parser)]
#[command(about = "Show how two members are related")]
pub struct Resolve {
    /// The member the relationship is seen from (id or full name)
    from: String,

    /// The member being described (id or full name)
    to: String,

    /// Output format (default: pretty).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

impl Resolve {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let archive = Archive::open(root)?;
        let family = archive.family();
        let from = find_member(family, &self.from)?;
        let to = find_member(family, &self.to)?;

        let resolver = family.resolver(archive.config())?;
        let Some(path) = resolver.resolve(&from.id, &to.id) else {
            eprintln!(
                "{}",
                style::warning(format_args!(
                    "{} and {} are not related",
                    from.full_name(),
                    to.full_name()
                ))
            );
            process::exit(1);
        };

        match self.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&path)?),
            OutputFormat::Pretty => {
                println!("{}", sentence(&path));
                println!("{}", style::dim(chain(&path)));
                println!("{}", style::dim(format_args!("degree {}", path.degree)));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Parser)]
#[command(about = "Show how every other member is related to one member")]
pub struct Relatives {
    /// Member id or full name
    member: String,

    /// Only show relatives up to this degree
    #[arg(long, value_name = "N")]
    max_degree: Option<usize>,

    /// Output format (default: pretty).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

impl Relatives {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let archive = Archive::open(root)?;
        let family = archive.family();
        let member = find_member(family, &self.member)?;

        let resolver = family.resolver(archive.config())?;
        let mut relatives = resolver.resolve_all(&member.id);
        if let Some(max) = self.max_degree {
            relatives.retain(|path| path.degree <= max);
        }

        match self.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&relatives)?),
            OutputFormat::Pretty if relatives.is_empty() => {
                eprintln!(
                    "{}",
                    style::warning(format_args!(
                        "{} has no recorded relatives",
                        member.full_name()
                    ))
                );
                process::exit(1);
            }
            OutputFormat::Pretty => {
                let narrow = is_narrow();
                if !narrow {
                    println!("{:<28}  {:<24}  Degree", "Name", "Relationship");
                }
                for path in &relatives {
                    if narrow {
                        println!(
                            "{}: {} ({})",
                            style::member_name(path.to, 0),
                            style::kinship(path.kinship, 0),
                            path.degree
                        );
                    } else {
                        println!(
                            "{}  {}  {}",
                            style::member_name(path.to, 28),
                            style::kinship(path.kinship, 24),
                            path.degree
                        );
                    }
                }
            }
        }

        Ok(())
    }
}

/// "Carol Smith is Alice Smith's child"
fn sentence(path: &RelationshipPath) -> String {
    format!(
        "{} is {}'s {}",
        style::member_name(path.to, 0),
        style::member_name(path.from, 0),
        style::kinship(path.kinship, 0)
    )
}

fn chain(path: &RelationshipPath) -> String {
    path.path
        .iter()
        .map(|member| member.full_name())
        .collect::<Vec<_>>()
        .join(" → ")
}
