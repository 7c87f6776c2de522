use std::path::PathBuf;

mod init;
mod list;
mod member;
mod relate;
mod resolve;
mod status;
mod style;
mod tree;

use clap::ArgAction;
use kinship::{Family, Member, MemberId};
use list::List;
use member::{Add, Edit, Remove};
use relate::{Relate, Unrelate};
use resolve::{Relatives, Resolve};
use status::Status;
use tree::Tree;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global=true)]
    verbose: u8,

    /// The path to the directory holding the family
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command
            .unwrap_or_else(|| Command::Status(Status::default()))
            .run(self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Show member and relationship counts (default)
    Status(Status),

    /// Start a new, empty family in the root directory
    Init(init::Command),

    /// Add a member
    Add(Add),

    /// Change some of a member's details
    Edit(Edit),

    /// Remove a member and all of their relationships
    Remove(Remove),

    /// Record a relationship between two members, or many from a file
    ///
    /// Relationships are undirected. For parent-child records, which member
    /// is the parent is inferred from birth dates.
    Relate(Relate),

    /// Remove a relationship
    Unrelate(Unrelate),

    /// List members
    List(List),

    /// Show the family as generational trees
    Tree(Tree),

    /// Show how two members are related
    Resolve(Resolve),

    /// Show how every other member is related to one member
    Relatives(Relatives),
}

impl Command {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::Status(command) => command.run(root)?,
            Self::Init(command) => command.run(root)?,
            Self::Add(command) => command.run(root)?,
            Self::Edit(command) => command.run(root)?,
            Self::Remove(command) => command.run(root)?,
            Self::Relate(command) => command.run(root)?,
            Self::Unrelate(command) => command.run(root)?,
            Self::List(command) => command.run(root)?,
            Self::Tree(command) => command.run(root)?,
            Self::Resolve(command) => command.run(root)?,
            Self::Relatives(command) => command.run(root)?,
        }
        Ok(())
    }
}

/// Finds a member by identifier, or by full name when no identifier matches.
///
/// Names are compared case-insensitively and must match exactly one member.
fn find_member<'a>(family: &'a Family, key: &str) -> anyhow::Result<&'a Member> {
    if let Some(member) = MemberId::try_from(key)
        .ok()
        .and_then(|id| family.member(&id))
    {
        return Ok(member);
    }

    match family.find_by_name(key).as_slice() {
        [] => anyhow::bail!("no member with id or name '{key}'"),
        [member] => Ok(*member),
        matches => {
            let ids: Vec<_> = matches.iter().map(|m| m.id.as_str()).collect();
            anyhow::bail!(
                "'{key}' matches {} members; use an id instead ({})",
                matches.len(),
                ids.join(", ")
            )
        }
    }
}
