use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use kinship::{Archive, Family, Member, Relationship};
use serde::Serialize;
use tracing::instrument;

use super::style::{self, is_narrow};

/// Command arguments for `kin list`.
#[derive(Debug, Parser)]
#[command(about = "List members, sorted by given name then family name")]
pub struct List {
    /// Case-insensitive substring match against name, birth place and
    /// occupation.
    #[arg(long, short)]
    search: Option<String>,

    /// Also list the relationships of the listed members.
    #[arg(long)]
    relationships: bool,

    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,

    /// Suppress headers and format rows for scripting.
    #[arg(long)]
    quiet: bool,

    /// Limit number of rows returned.
    #[arg(long)]
    limit: Option<usize>,

    /// Skip the first N rows.
    #[arg(long)]
    offset: Option<usize>,
}

/// Supported output formats.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

#[derive(Debug, Serialize)]
struct Listing<'a> {
    members: Vec<&'a Member>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    relationships: Vec<&'a Relationship>,
}

impl List {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let archive = Archive::open(root)?;
        let listing = self.select(archive.family());

        match self.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&listing)?),
            OutputFormat::Csv => Self::output_csv(&listing, self.quiet),
            OutputFormat::Table => Self::output_table(&listing, self.quiet),
        }

        Ok(())
    }

    fn select<'a>(&self, family: &'a Family) -> Listing<'a> {
        let members: Vec<_> = family
            .search(self.search.as_deref().unwrap_or_default())
            .into_iter()
            .skip(self.offset.unwrap_or(0))
            .take(self.limit.unwrap_or(usize::MAX))
            .collect();

        let relationships = if self.relationships {
            family
                .relationships()
                .iter()
                .filter(|rel| members.iter().any(|m| rel.involves(&m.id)))
                .collect()
        } else {
            Vec::new()
        };

        Listing {
            members,
            relationships,
        }
    }

    fn output_csv(listing: &Listing, quiet: bool) {
        if !quiet {
            println!("id,given_name,family_name,birth_date,gender");
        }
        for member in &listing.members {
            println!(
                "{},{},{},{},{}",
                csv_field(member.id.as_str()),
                csv_field(&member.given_name),
                csv_field(&member.family_name),
                member.birth_date.map(|d| d.to_string()).unwrap_or_default(),
                member.gender,
            );
        }
    }

    fn output_table(listing: &Listing, quiet: bool) {
        if listing.members.is_empty() {
            if !quiet {
                println!("No members found.");
            }
            return;
        }

        let narrow = is_narrow();
        if !quiet && !narrow {
            println!("{:<36}  {:<28}  {:<10}  Gender", "ID", "Name", "Born");
        }

        for member in &listing.members {
            let born = member
                .birth_date
                .map_or_else(|| "–".to_string(), |d| d.to_string());
            if narrow || quiet {
                println!("{} {}", member.id, member.full_name());
            } else {
                println!(
                    "{}  {}  {:<10}  {}",
                    style::dim(format!("{:<36}", member.id.as_str())),
                    style::member_name(member, 28),
                    born,
                    member.gender
                );
            }
        }

        if !listing.relationships.is_empty() {
            println!();
            if !quiet {
                println!("Relationships");
                println!("{}", style::dim("─────────────"));
            }
            for rel in &listing.relationships {
                println!(
                    "{}  {} {} {}",
                    style::dim(rel.id),
                    rel.member_a,
                    style::relationship_kind(rel.kind),
                    rel.member_b
                );
            }
        }
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use kinship::{Gender, MemberDraft, RelationshipKind};
    use test_case::test_case;

    use super::*;

    fn list(search: Option<&str>, relationships: bool) -> List {
        List {
            search: search.map(str::to_string),
            relationships,
            output: OutputFormat::Table,
            quiet: false,
            limit: None,
            offset: None,
        }
    }

    fn family() -> Family {
        let mut family = Family::default();
        let mut ids = Vec::new();
        for (given, place) in [("Cat", "Leeds"), ("Ann", "York"), ("Ben", "Leeds")] {
            let member = family
                .add_member(MemberDraft {
                    given_name: given.to_string(),
                    family_name: "Lee".to_string(),
                    birth_place: Some(place.to_string()),
                    gender: Gender::Other,
                    ..MemberDraft::default()
                })
                .unwrap();
            ids.push(member.id.clone());
        }
        family
            .add_relationship(&ids[0], &ids[2], RelationshipKind::Sibling)
            .unwrap();
        family
    }

    fn given_names<'a>(listing: &Listing<'a>) -> Vec<&'a str> {
        listing
            .members
            .iter()
            .map(|m| m.given_name.as_str())
            .collect()
    }

    #[test]
    fn lists_all_members_sorted() {
        let family = family();
        let listing = list(None, false).select(&family);

        assert_eq!(given_names(&listing), vec!["Ann", "Ben", "Cat"]);
        assert!(listing.relationships.is_empty());
    }

    #[test]
    fn search_matches_birth_place() {
        let family = family();
        let listing = list(Some("leeds"), true).select(&family);

        assert_eq!(given_names(&listing), vec!["Ben", "Cat"]);
        assert_eq!(listing.relationships.len(), 1);
    }

    #[test]
    fn offset_and_limit_page_results() {
        let family = family();
        let mut command = list(None, false);
        command.offset = Some(1);
        command.limit = Some(1);

        assert_eq!(given_names(&command.select(&family)), vec!["Ben"]);
    }

    #[test_case("plain", "plain"; "plain")]
    #[test_case("a,b", "\"a,b\""; "comma")]
    #[test_case("say \"hi\"", "\"say \"\"hi\"\"\""; "quotes")]
    fn csv_fields_are_escaped(input: &str, expected: &str) {
        assert_eq!(csv_field(input), expected);
    }
}
