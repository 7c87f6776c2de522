use std::path::PathBuf;

use clap::Parser;
use kinship::{Archive, Stats};
use tracing::instrument;

use super::style::{self, is_narrow};

#[derive(Debug, Parser, Default)]
#[command(about = "Show member and relationship counts")]
pub struct Status {
    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Suppress headers and format for scripting
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Status {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let archive = Archive::open(root)?;
        let family = archive.family();
        let stats = family.stats(archive.config());
        let dangling = family.dangling_relationships().count();

        match self.output {
            OutputFormat::Json => Self::output_json(&stats, dangling)?,
            OutputFormat::Table if self.quiet => Self::output_quiet(&stats),
            OutputFormat::Table if stats.members == 0 => {
                println!("No members found yet. Add one with 'kin add'.");
            }
            OutputFormat::Table => Self::output_table(&stats, dangling),
        }

        Ok(())
    }

    fn output_json(stats: &Stats, dangling: usize) -> anyhow::Result<()> {
        use serde_json::json;

        let output = json!({
            "members": stats.members,
            "relationships": {
                "total": stats.relationships,
                "parent_child": stats.parent_child,
                "spouse": stats.spouse,
                "sibling": stats.sibling,
                "dangling": dangling,
            },
            "trees": stats.roots,
            "generations": stats.generations,
        });

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    fn output_quiet(stats: &Stats) {
        println!(
            "members={} relationships={} trees={} generations={}",
            stats.members, stats.relationships, stats.roots, stats.generations
        );
    }

    fn output_table(stats: &Stats, dangling: usize) {
        let narrow = is_narrow();

        println!("Family");
        println!("{}", style::dim("──────"));

        let rows = [
            ("Members", stats.members),
            ("Trees", stats.roots),
            ("Generations", stats.generations),
        ];
        for (name, count) in rows {
            if narrow {
                println!("{name}: {count}");
            } else {
                println!("{name:<14} {count}");
            }
        }

        println!();
        println!("Relationships");
        println!("{}", style::dim("─────────────"));

        let rows = [
            ("Parent-child", stats.parent_child),
            ("Spouse", stats.spouse),
            ("Sibling", stats.sibling),
        ];
        for (name, count) in rows {
            if narrow {
                println!("{name}: {count}");
            } else {
                println!("{name:<14} {count}");
            }
        }
        println!("Total          {}", stats.relationships);

        println!();
        if dangling == 0 {
            println!("Dangling relationships: {} ✅", style::success(0));
        } else {
            println!("Dangling relationships: {} ⚠️", style::warning(dangling));
            println!(
                "{}",
                style::dim(
                    "These reference members that no longer exist; remove them with 'kin unrelate'."
                )
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use kinship::Archive;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn status_runs_on_empty_family() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_path_buf();
        Archive::init(root.clone()).unwrap();

        Status::default().run(root).expect("status should succeed");
    }

    #[test]
    fn status_requires_a_family() {
        let tmp = tempdir().unwrap();
        let err = Status::default()
            .run(tmp.path().to_path_buf())
            .unwrap_err();
        assert!(err.to_string().contains("kin init"));
    }
}
