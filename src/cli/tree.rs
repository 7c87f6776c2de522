use std::{fmt::Write as _, path::PathBuf};

use clap::{Parser, ValueEnum};
use kinship::{Archive, Forest, Member, TreeNode};
use tracing::instrument;

use super::style;

#[derive(Debug, Parser, Default)]
#[command(about = "Show the family as generational trees")]
pub struct Tree {
    /// Output format (default: pretty).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Pretty,
    Json,
}

impl Tree {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let archive = Archive::open(root)?;
        let forest = archive.family().forest(archive.config());

        match self.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&forest)?),
            OutputFormat::Pretty if forest.is_empty() => {
                println!("No members found yet. Add one with 'kin add'.");
            }
            OutputFormat::Pretty => print!("{}", render(&forest)),
        }

        Ok(())
    }
}

fn render(forest: &Forest) -> String {
    let mut out = String::new();
    for (i, root) in forest.roots().iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "{}", label(root));
        render_children(&mut out, root, "");
    }
    out
}

fn render_children(out: &mut String, node: &TreeNode, prefix: &str) {
    let count = node.children.len();
    for (i, child) in node.children.iter().enumerate() {
        let last = i + 1 == count;
        let (branch, indent) = if last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };
        let _ = writeln!(out, "{prefix}{branch}{}", label(child));
        render_children(out, child, &format!("{prefix}{indent}"));
    }
}

fn label(node: &TreeNode) -> String {
    let mut label = describe(node.member);
    if let Some(spouse) = node.spouse {
        let _ = write!(label, " {} {}", style::dim("&"), describe(spouse));
    }
    label
}

fn describe(member: &Member) -> String {
    format!("{}{}", style::member_name(member, 0), style::lifespan(member))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use kinship::{Gender, InferenceConfig, MemberId, Relationship, RelationshipKind, build_forest};

    use super::*;

    fn person(id: &str, born: i32) -> Member {
        Member::new(MemberId::try_from(id).unwrap(), id, "Lee", Gender::Other)
            .born(NaiveDate::from_ymd_opt(born, 1, 1).unwrap())
    }

    fn rel(a: &str, b: &str) -> Relationship {
        Relationship::new(
            MemberId::try_from(a).unwrap(),
            MemberId::try_from(b).unwrap(),
            RelationshipKind::ParentChild,
        )
        .unwrap()
    }

    #[test]
    fn renders_branches() {
        let members = vec![
            person("gran", 1920),
            person("mum", 1950),
            person("kid", 1980),
            person("aunt", 1952),
        ];
        let relationships = vec![rel("gran", "mum"), rel("mum", "kid"), rel("gran", "aunt")];
        let forest = build_forest(&members, &relationships, &InferenceConfig::default());

        let ansi = regex::Regex::new(r"\x1b\[[0-9;]*m").unwrap();
        let rendered = ansi.replace_all(&render(&forest), "").into_owned();
        let lines: Vec<_> = rendered.lines().collect();

        assert_eq!(
            lines,
            vec![
                "gran Lee (b. 1920)",
                "├── mum Lee (b. 1950)",
                "│   └── kid Lee (b. 1980)",
                "└── aunt Lee (b. 1952)",
            ]
        );
    }
}
