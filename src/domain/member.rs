use std::{
    fmt,
    hash::{Hash, Hasher},
    ops::Deref,
    str::FromStr,
    sync::LazyLock,
};

use chrono::{Datelike, NaiveDate};
use non_empty_string::NonEmptyString;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A validated, non-empty member identifier.
///
/// Identifiers are opaque strings. Members created through
/// [`Family::add_member`](crate::Family::add_member) receive a UUID v4
/// string, but snapshots supplied by a host may use any non-empty value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MemberId(NonEmptyString);

impl MemberId {
    /// Creates a new `MemberId` from a string.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidIdError`] if the string is empty or only whitespace.
    pub fn new(s: String) -> Result<Self, InvalidIdError> {
        if s.trim().is_empty() {
            return Err(InvalidIdError(s));
        }
        NonEmptyString::new(s.clone())
            .map(Self)
            .map_err(|_| InvalidIdError(s))
    }

    /// Generates a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(
            NonEmptyString::new(Uuid::new_v4().to_string())
                .expect("a UUID is never empty"),
        )
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Hash for MemberId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl Deref for MemberId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl AsRef<str> for MemberId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberId {
    type Err = InvalidIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for MemberId {
    type Error = InvalidIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for MemberId {
    type Error = InvalidIdError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value.to_string())
    }
}

impl From<MemberId> for String {
    fn from(id: MemberId) -> Self {
        id.as_str().to_string()
    }
}

/// Error returned when an identifier is empty.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid identifier '{0}': must be non-empty")]
pub struct InvalidIdError(String);

/// The gender recorded for a member.
///
/// Only used for choosing gendered kinship words and for the spouse
/// tie-break in the hierarchy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// Male.
    Male,
    /// Female.
    Female,
    /// Any other or unspecified gender.
    #[default]
    Other,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Other => "other",
        })
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Self::Male),
            "female" | "f" => Ok(Self::Female),
            "other" | "o" => Ok(Self::Other),
            other => Err(format!(
                "unknown gender '{other}' (expected male, female or other)"
            )),
        }
    }
}

/// A person recorded in the family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Unique, stable identifier.
    pub id: MemberId,
    /// Given (first) name.
    pub given_name: String,
    /// Family (last) name.
    pub family_name: String,
    /// Date of birth, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    /// Date of death, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death_date: Option<NaiveDate>,
    /// Place of birth.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_place: Option<String>,
    /// Occupation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
    /// Free-form biography.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// Link to a photo of the member.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    /// Recorded gender.
    #[serde(default)]
    pub gender: Gender,
}

impl Member {
    /// Creates a member with only the required fields set.
    #[must_use]
    pub fn new(
        id: MemberId,
        given_name: impl Into<String>,
        family_name: impl Into<String>,
        gender: Gender,
    ) -> Self {
        Self {
            id,
            given_name: given_name.into(),
            family_name: family_name.into(),
            birth_date: None,
            death_date: None,
            birth_place: None,
            occupation: None,
            bio: None,
            photo_url: None,
            gender,
        }
    }

    /// Sets the birth date, returning the updated member.
    #[must_use]
    pub fn born(mut self, date: NaiveDate) -> Self {
        self.birth_date = Some(date);
        self
    }

    /// The member's full display name ("given family").
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.given_name, self.family_name)
    }

    /// The calendar year of birth, if the birth date is known.
    #[must_use]
    pub fn birth_year(&self) -> Option<i32> {
        self.birth_date.map(|date| date.year())
    }

    /// Case-insensitive substring match on full name, birth place or
    /// occupation.
    ///
    /// An empty term matches every member.
    #[must_use]
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }

        self.full_name().to_lowercase().contains(&term)
            || self
                .birth_place
                .as_deref()
                .is_some_and(|place| place.to_lowercase().contains(&term))
            || self
                .occupation
                .as_deref()
                .is_some_and(|job| job.to_lowercase().contains(&term))
    }

    /// Checks the invariants required of a stored member.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidMemberError`] if either name is blank or the photo
    /// link is not an http(s) URL.
    pub fn validate(&self) -> Result<(), InvalidMemberError> {
        if self.given_name.trim().is_empty() {
            return Err(InvalidMemberError::EmptyGivenName);
        }
        if self.family_name.trim().is_empty() {
            return Err(InvalidMemberError::EmptyFamilyName);
        }
        if let Some(url) = &self.photo_url {
            if !PHOTO_URL.is_match(url) {
                return Err(InvalidMemberError::PhotoUrl(url.clone()));
            }
        }
        Ok(())
    }
}

static PHOTO_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://[^\s/?#]+[^\s]*$").expect("photo URL pattern is valid")
});

/// Reasons a member record is rejected.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InvalidMemberError {
    /// The given name is empty.
    #[error("given name is required")]
    EmptyGivenName,
    /// The family name is empty.
    #[error("family name is required")]
    EmptyFamilyName,
    /// The photo link is not a valid http(s) URL.
    #[error("invalid photo URL '{0}'")]
    PhotoUrl(String),
}

/// The user-supplied fields for a new member.
///
/// Blank optional strings are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberDraft {
    /// Given (first) name.
    pub given_name: String,
    /// Family (last) name.
    pub family_name: String,
    /// Date of birth.
    pub birth_date: Option<NaiveDate>,
    /// Date of death.
    pub death_date: Option<NaiveDate>,
    /// Place of birth.
    pub birth_place: Option<String>,
    /// Occupation.
    pub occupation: Option<String>,
    /// Biography.
    pub bio: Option<String>,
    /// Photo link.
    pub photo_url: Option<String>,
    /// Recorded gender.
    pub gender: Gender,
}

impl MemberDraft {
    /// Turns the draft into a member with the given identifier.
    #[must_use]
    pub fn into_member(self, id: MemberId) -> Member {
        Member {
            id,
            given_name: self.given_name.trim().to_string(),
            family_name: self.family_name.trim().to_string(),
            birth_date: self.birth_date,
            death_date: self.death_date,
            birth_place: clean(self.birth_place),
            occupation: clean(self.occupation),
            bio: clean(self.bio),
            photo_url: clean(self.photo_url),
            gender: self.gender,
        }
    }
}

/// A partial update to an existing member.
///
/// `None` leaves a field untouched. For optional text fields, `Some("")`
/// clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberUpdate {
    /// New given name.
    pub given_name: Option<String>,
    /// New family name.
    pub family_name: Option<String>,
    /// New birth date.
    pub birth_date: Option<NaiveDate>,
    /// New death date.
    pub death_date: Option<NaiveDate>,
    /// New birth place.
    pub birth_place: Option<String>,
    /// New occupation.
    pub occupation: Option<String>,
    /// New biography.
    pub bio: Option<String>,
    /// New photo link.
    pub photo_url: Option<String>,
    /// New gender.
    pub gender: Option<Gender>,
}

impl MemberUpdate {
    /// Returns `true` if the update changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Applies the update to a copy of `member`.
    #[must_use]
    pub fn apply(self, member: &Member) -> Member {
        let mut updated = member.clone();
        if let Some(given) = self.given_name {
            updated.given_name = given.trim().to_string();
        }
        if let Some(family) = self.family_name {
            updated.family_name = family.trim().to_string();
        }
        if let Some(date) = self.birth_date {
            updated.birth_date = Some(date);
        }
        if let Some(date) = self.death_date {
            updated.death_date = Some(date);
        }
        if let Some(place) = self.birth_place {
            updated.birth_place = clean(Some(place));
        }
        if let Some(job) = self.occupation {
            updated.occupation = clean(Some(job));
        }
        if let Some(bio) = self.bio {
            updated.bio = clean(Some(bio));
        }
        if let Some(url) = self.photo_url {
            updated.photo_url = clean(Some(url));
        }
        if let Some(gender) = self.gender {
            updated.gender = gender;
        }
        updated
    }
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn member(given: &str, family: &str) -> Member {
        Member::new(
            MemberId::try_from(given.to_lowercase().as_str()).unwrap(),
            given,
            family,
            Gender::Other,
        )
    }

    #[test]
    fn member_id_rejects_blank_strings() {
        assert!(MemberId::new(String::new()).is_err());
        assert!(MemberId::new("   ".to_string()).is_err());
        assert_eq!(MemberId::new("alice".to_string()).unwrap().as_str(), "alice");
    }

    #[test]
    fn generated_ids_are_distinct() {
        assert_ne!(MemberId::generate(), MemberId::generate());
    }

    #[test_case("male", Gender::Male; "male")]
    #[test_case("F", Gender::Female; "short female")]
    #[test_case(" Other ", Gender::Other; "padded other")]
    fn gender_parses(input: &str, expected: Gender) {
        assert_eq!(input.parse::<Gender>().unwrap(), expected);
    }

    #[test]
    fn gender_rejects_unknown_values() {
        assert!("robot".parse::<Gender>().is_err());
    }

    #[test]
    fn birth_year_comes_from_date() {
        let alice = member("Alice", "Smith").born(NaiveDate::from_ymd_opt(1950, 6, 1).unwrap());
        assert_eq!(alice.birth_year(), Some(1950));
        assert_eq!(member("Bob", "Smith").birth_year(), None);
    }

    #[test_case("alice", true; "given name")]
    #[test_case("ICE SMI", true; "across given and family name")]
    #[test_case("york", true; "birth place")]
    #[test_case("baker", true; "occupation")]
    #[test_case("", true; "empty term")]
    #[test_case("jones", false; "no match")]
    fn search_matches(term: &str, expected: bool) {
        let mut alice = member("Alice", "Smith");
        alice.birth_place = Some("New York".to_string());
        alice.occupation = Some("Baker".to_string());
        assert_eq!(alice.matches(term), expected);
    }

    #[test]
    fn validation_requires_names() {
        assert_eq!(
            member(" ", "Smith").validate(),
            Err(InvalidMemberError::EmptyGivenName)
        );
        assert_eq!(
            member("Alice", "").validate(),
            Err(InvalidMemberError::EmptyFamilyName)
        );
        assert!(member("Alice", "Smith").validate().is_ok());
    }

    #[test_case("https://example.com/alice.jpg", true; "https")]
    #[test_case("http://example.com", true; "http")]
    #[test_case("ftp://example.com/a.png", false; "wrong scheme")]
    #[test_case("not a url", false; "plain text")]
    fn validation_checks_photo_url(url: &str, ok: bool) {
        let mut alice = member("Alice", "Smith");
        alice.photo_url = Some(url.to_string());
        assert_eq!(alice.validate().is_ok(), ok);
    }

    #[test]
    fn draft_drops_blank_optional_fields() {
        let draft = MemberDraft {
            given_name: " Alice ".to_string(),
            family_name: "Smith".to_string(),
            birth_place: Some("   ".to_string()),
            occupation: Some("Baker".to_string()),
            ..MemberDraft::default()
        };
        let alice = draft.into_member(MemberId::try_from("alice").unwrap());
        assert_eq!(alice.given_name, "Alice");
        assert_eq!(alice.birth_place, None);
        assert_eq!(alice.occupation.as_deref(), Some("Baker"));
    }

    #[test]
    fn update_changes_only_provided_fields() {
        let mut alice = member("Alice", "Smith");
        alice.occupation = Some("Baker".to_string());
        alice.bio = Some("Loves bread".to_string());

        let update = MemberUpdate {
            family_name: Some("Jones".to_string()),
            bio: Some(String::new()),
            ..MemberUpdate::default()
        };
        let updated = update.apply(&alice);

        assert_eq!(updated.given_name, "Alice");
        assert_eq!(updated.family_name, "Jones");
        assert_eq!(updated.occupation.as_deref(), Some("Baker"));
        assert_eq!(updated.bio, None);
    }

    #[test]
    fn member_round_trips_through_yaml() {
        let alice = member("Alice", "Smith").born(NaiveDate::from_ymd_opt(1950, 1, 2).unwrap());
        let yaml = serde_yaml::to_string(&alice).unwrap();
        assert!(yaml.contains("birth_date: 1950-01-02"));
        assert!(!yaml.contains("occupation"));
        let parsed: Member = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, alice);
    }
}
