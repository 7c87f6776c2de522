use std::path::PathBuf;

use chrono::NaiveDate;
use kinship::{Archive, Gender, MemberDraft, MemberUpdate};
use tracing::instrument;

use super::{find_member, style};

/// Optional details shared by `add` and `edit`.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct Details {
    /// Gender (male, female, other)
    #[arg(long)]
    gender: Option<Gender>,

    /// Date of birth (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    born: Option<NaiveDate>,

    /// Date of death (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    died: Option<NaiveDate>,

    /// Place of birth
    #[arg(long, value_name = "PLACE")]
    birth_place: Option<String>,

    /// Occupation
    #[arg(long)]
    occupation: Option<String>,

    /// Short biography
    #[arg(long)]
    bio: Option<String>,

    /// Link to a photo (http or https)
    #[arg(long, value_name = "URL")]
    photo: Option<String>,
}

#[derive(Debug, clap::Parser)]
pub struct Add {
    /// Given (first) name
    #[arg(long)]
    given: String,

    /// Family (last) name
    #[arg(long)]
    family: String,

    #[command(flatten)]
    details: Details,
}

impl Add {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut archive = Archive::open(root)?;

        let draft = MemberDraft {
            given_name: self.given,
            family_name: self.family,
            birth_date: self.details.born,
            death_date: self.details.died,
            birth_place: self.details.birth_place,
            occupation: self.details.occupation,
            bio: self.details.bio,
            photo_url: self.details.photo,
            gender: self.details.gender.unwrap_or_default(),
        };

        let member = archive.family_mut().add_member(draft)?;
        let msg = format!("Added {} ({})", member.full_name(), member.id);
        archive.flush()?;

        println!("{}", style::success(msg));
        Ok(())
    }
}

/// Text fields given as an empty string are cleared.
#[derive(Debug, clap::Parser)]
pub struct Edit {
    /// Member id or full name
    member: String,

    /// New given (first) name
    #[arg(long)]
    given: Option<String>,

    /// New family (last) name
    #[arg(long)]
    family: Option<String>,

    #[command(flatten)]
    details: Details,
}

impl Edit {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut archive = Archive::open(root)?;
        let id = find_member(archive.family(), &self.member)?.id.clone();

        let update = MemberUpdate {
            given_name: self.given,
            family_name: self.family,
            birth_date: self.details.born,
            death_date: self.details.died,
            birth_place: self.details.birth_place,
            occupation: self.details.occupation,
            bio: self.details.bio,
            photo_url: self.details.photo,
            gender: self.details.gender,
        };
        if update.is_empty() {
            anyhow::bail!("nothing to change; pass at least one field to update");
        }

        let member = archive.family_mut().update_member(&id, update)?;
        let msg = format!("Updated {} ({})", member.full_name(), member.id);
        archive.flush()?;

        println!("{}", style::success(msg));
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Remove {
    /// Member id or full name
    member: String,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,
}

impl Remove {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut archive = Archive::open(root)?;
        let member = find_member(archive.family(), &self.member)?;
        let id = member.id.clone();

        if !self.yes {
            let relationships = archive.family().relationships_of(&id).count();
            let prompt = format!(
                "Remove {} and {relationships} relationship(s)?",
                member.full_name()
            );
            let theme: Box<dyn dialoguer::theme::Theme> = if style::colour_enabled() {
                Box::new(dialoguer::theme::ColorfulTheme::default())
            } else {
                Box::new(dialoguer::theme::SimpleTheme)
            };
            let confirmed = dialoguer::Confirm::with_theme(theme.as_ref())
                .with_prompt(prompt)
                .default(false)
                .interact()?;
            if !confirmed {
                println!("Cancelled");
                std::process::exit(130);
            }
        }

        let (member, relationships) = archive.family_mut().remove_member(&id)?;
        archive.flush()?;

        println!(
            "{}",
            style::success(format_args!(
                "Removed {} and {} relationship(s)",
                member.full_name(),
                relationships.len()
            ))
        );
        Ok(())
    }
}
