//! How members, kinship labels and status messages look on the terminal.

use std::{fmt::Display, sync::LazyLock};

use kinship::{Kinship, Member, RelationshipKind};
use owo_colors::{OwoColorize, Style};

/// Terminals narrower than this get one-line-per-row layouts.
const NARROW_COLUMNS: u16 = 60;

static COLOUR: LazyLock<bool> =
    LazyLock::new(|| supports_color::on(supports_color::Stream::Stdout).is_some());

/// Whether stdout accepts ANSI colours.
pub fn colour_enabled() -> bool {
    *COLOUR
}

/// Whether rows should be squeezed onto one short line each.
pub fn is_narrow() -> bool {
    terminal_size::terminal_size().is_some_and(|(width, _)| width.0 < NARROW_COLUMNS)
}

fn paint(text: impl Display, style: Style) -> String {
    paint_if(colour_enabled(), text, style)
}

fn paint_if(enabled: bool, text: impl Display, style: Style) -> String {
    if enabled {
        text.style(style).to_string()
    } else {
        text.to_string()
    }
}

/// A completed edit.
pub fn success(text: impl Display) -> String {
    paint(text, Style::new().green())
}

/// Something the user should look at, but not a failure.
pub fn warning(text: impl Display) -> String {
    paint(text, Style::new().yellow())
}

/// Secondary detail: ids, separators, path chains.
pub fn dim(text: impl Display) -> String {
    paint(text, Style::new().dimmed())
}

/// A member's full name, left-padded to `width` before colouring so escape
/// codes don't skew table columns. Deceased members are shown in italics.
pub fn member_name(member: &Member, width: usize) -> String {
    let name = format!("{:<width$}", member.full_name());
    let style = Style::new().bright_blue().bold();
    if member.death_date.is_some() {
        paint(name, style.italic())
    } else {
        paint(name, style)
    }
}

/// " (1920–1990)", " (b. 1920)", " (d. 1990)", or nothing when no dates are
/// recorded.
pub fn lifespan(member: &Member) -> String {
    let years = match (member.birth_year(), member.death_date) {
        (Some(born), Some(died)) => format!("({born}–{})", died.format("%Y")),
        (Some(born), None) => format!("(b. {born})"),
        (None, Some(died)) => format!("(d. {})", died.format("%Y")),
        (None, None) => return String::new(),
    };
    format!(" {}", dim(years))
}

/// A kinship label, coloured by the kind of kin it names.
pub fn kinship(kinship: Kinship, width: usize) -> String {
    let label = format!("{:<width$}", kinship.to_string());
    paint(label, kinship_style(kinship))
}

const fn kinship_style(kinship: Kinship) -> Style {
    match kinship {
        Kinship::Parent
        | Kinship::Child
        | Kinship::Grandparent { .. }
        | Kinship::Grandchild { .. } => Style::new().green(),
        Kinship::Spouse => Style::new().magenta(),
        Kinship::Sibling | Kinship::Niece | Kinship::Nephew | Kinship::Cousin { .. } => {
            Style::new().cyan()
        }
        Kinship::Oneself | Kinship::Unknown => Style::new().dimmed(),
    }
}

/// "(spouse)", "(parent-child)", "(sibling)".
pub fn relationship_kind(kind: RelationshipKind) -> String {
    dim(format!("({kind})"))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use kinship::{Gender, MemberId};
    use test_case::test_case;

    use super::*;

    fn member(born: Option<i32>, died: Option<i32>) -> Member {
        let date = |year| NaiveDate::from_ymd_opt(year, 3, 1).unwrap();
        let id = MemberId::try_from("m").unwrap();
        let mut member = Member::new(id, "Ann", "Lee", Gender::Female);
        member.birth_date = born.map(date);
        member.death_date = died.map(date);
        member
    }

    fn plain(text: &str) -> String {
        regex::Regex::new(r"\x1b\[[0-9;]*m")
            .unwrap()
            .replace_all(text, "")
            .into_owned()
    }

    #[test_case(Some(1920), Some(1990), " (1920–1990)"; "both dates")]
    #[test_case(Some(1920), None, " (b. 1920)"; "born only")]
    #[test_case(None, Some(1990), " (d. 1990)"; "died only")]
    #[test_case(None, None, ""; "no dates")]
    fn lifespan_shows_known_years(born: Option<i32>, died: Option<i32>, expected: &str) {
        assert_eq!(plain(&lifespan(&member(born, died))), expected);
    }

    #[test]
    fn names_are_padded_before_colouring() {
        assert_eq!(plain(&member_name(&member(None, None), 10)), "Ann Lee   ");
    }

    #[test_case(Kinship::Grandchild { greats: 1 }, Kinship::Parent; "lineal")]
    #[test_case(Kinship::Cousin { degree: 2 }, Kinship::Niece; "collateral")]
    #[test_case(Kinship::Oneself, Kinship::Unknown; "none")]
    fn kinship_colour_follows_line(a: Kinship, b: Kinship) {
        assert_eq!(kinship_style(a), kinship_style(b));
    }

    #[test]
    fn spouse_is_coloured_apart_from_blood_relatives() {
        assert_ne!(kinship_style(Kinship::Spouse), kinship_style(Kinship::Child));
        assert_ne!(kinship_style(Kinship::Spouse), kinship_style(Kinship::Sibling));
    }

    #[test]
    fn colour_can_be_switched_off() {
        let style = kinship_style(Kinship::Child);
        assert_eq!(paint_if(false, "child", style), "child");
        assert_ne!(paint_if(true, "child", style), "child");
        assert_eq!(plain(&paint_if(true, "child", style)), "child");
    }
}
