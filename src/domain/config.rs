use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::Gender;

/// Tunable constants for the inference heuristics.
///
/// Relationship records do not say which side of a parent-child pair is the
/// parent, nor which spouse anchors a family in the tree. These settings
/// control the deterministic rules used to decide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct InferenceConfig {
    /// The smallest difference in birth years for which the earlier-born
    /// member of a parent-child pair is taken to be the parent.
    ///
    /// Below this gap the first-listed member of the record is the parent.
    pub min_generation_gap: i32,

    /// Cut-off year used when only one side of a parent-child pair has a
    /// birth date.
    ///
    /// A dated member born before this year is taken to be the parent;
    /// otherwise the undated member is.
    pub reference_year: i32,

    /// Spouse tie-break: when both or neither partner has children, the
    /// first-listed partner anchors the family if they have this gender,
    /// otherwise the second-listed partner does.
    pub primary_spouse_gender: Gender,

    /// Which word to use for a niece or nephew whose gender is
    /// [`Gender::Other`].
    pub other_gender_kin_term: KinTerm,

    /// Maximum number of generations below a root that the hierarchy will
    /// descend.
    pub max_depth: usize,
}

/// The gendered word for a sibling's child.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KinTerm {
    /// "niece"
    #[default]
    Niece,
    /// "nephew"
    Nephew,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            min_generation_gap: default_min_generation_gap(),
            reference_year: default_reference_year(),
            primary_spouse_gender: default_primary_spouse_gender(),
            other_gender_kin_term: KinTerm::default(),
            max_depth: default_max_depth(),
        }
    }
}

impl InferenceConfig {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }
}

const fn default_min_generation_gap() -> i32 {
    // more than ten years
    11
}

const fn default_reference_year() -> i32 {
    1970
}

const fn default_primary_spouse_gender() -> Gender {
    Gender::Male
}

const fn default_max_depth() -> usize {
    64
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_min_generation_gap")]
        min_generation_gap: i32,

        #[serde(default = "default_reference_year")]
        reference_year: i32,

        #[serde(default = "default_primary_spouse_gender")]
        primary_spouse_gender: Gender,

        #[serde(default)]
        other_gender_kin_term: KinTerm,

        #[serde(default = "default_max_depth")]
        max_depth: usize,
    },
}

impl From<Versions> for InferenceConfig {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                min_generation_gap,
                reference_year,
                primary_spouse_gender,
                other_gender_kin_term,
                max_depth,
            } => Self {
                min_generation_gap,
                reference_year,
                primary_spouse_gender,
                other_gender_kin_term,
                max_depth,
            },
        }
    }
}

impl From<InferenceConfig> for Versions {
    fn from(config: InferenceConfig) -> Self {
        Self::V1 {
            min_generation_gap: config.min_generation_gap,
            reference_year: config.reference_year,
            primary_spouse_gender: config.primary_spouse_gender,
            other_gender_kin_term: config.other_gender_kin_term,
            max_depth: config.max_depth,
        }
    }
}
