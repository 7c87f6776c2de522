//! A filesystem backed family archive.
//!
//! An [`Archive`] is a directory holding a `family.yaml` file with the
//! members and relationships, and an optional `.kin/config.toml` with the
//! [`InferenceConfig`]. It is a wrapper around the filesystem agnostic
//! [`Family`].

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::{debug, instrument, warn};

use crate::domain::{Family, InferenceConfig};

/// A filesystem backed family.
#[derive(Debug)]
pub struct Archive {
    /// The directory the family is stored in.
    root: PathBuf,
    family: Family,
    config: InferenceConfig,
}

/// Errors raised when reading or writing an [`Archive`].
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// There is no `family.yaml` in the directory.
    #[error("no family found in {}; run `kin init` first", .0.display())]
    NotInitialised(PathBuf),
    /// `family.yaml` already exists.
    #[error("a family already exists in {}", .0.display())]
    AlreadyInitialised(PathBuf),
    /// A file could not be read or written.
    #[error("failed to access {}: {source}", path.display())]
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
    /// `family.yaml` is not valid.
    #[error("failed to parse {}: {source}", path.display())]
    Yaml {
        /// The file being parsed.
        path: PathBuf,
        /// The underlying error.
        source: serde_yaml::Error,
    },
    /// The configuration file could not be written.
    #[error("{0}")]
    Config(String),
}

impl Archive {
    /// Name of the file holding members and relationships.
    pub const FAMILY_FILE: &str = "family.yaml";

    /// Path of the configuration file, relative to the root.
    pub const CONFIG_FILE: &str = ".kin/config.toml";

    /// Loads the family stored at `root`.
    ///
    /// A missing or unreadable configuration file falls back to the default
    /// configuration. Relationships that reference unknown members are kept,
    /// and reported as warnings.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::NotInitialised`] if there is no family file,
    /// or an error if it cannot be read or parsed.
    #[instrument(level = "debug")]
    pub fn open(root: PathBuf) -> Result<Self, ArchiveError> {
        let path = root.join(Self::FAMILY_FILE);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ArchiveError::NotInitialised(root));
            }
            Err(source) => return Err(ArchiveError::Io { path, source }),
        };

        let family: Family = if content.trim().is_empty() {
            Family::default()
        } else {
            serde_yaml::from_str(&content).map_err(|source| ArchiveError::Yaml {
                path: path.clone(),
                source,
            })?
        };

        for relationship in family.dangling_relationships() {
            warn!(
                relationship = %relationship.id,
                member_a = %relationship.member_a,
                member_b = %relationship.member_b,
                "relationship references an unknown member"
            );
        }

        let config = load_config(&root);
        debug!(
            members = family.members().len(),
            relationships = family.relationships().len(),
            "loaded family"
        );

        Ok(Self {
            root,
            family,
            config,
        })
    }

    /// Creates an empty family and a default configuration at `root`.
    ///
    /// An existing configuration file is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::AlreadyInitialised`] if a family file already
    /// exists, or an error if the files cannot be written.
    #[instrument(level = "debug")]
    pub fn init(root: PathBuf) -> Result<Self, ArchiveError> {
        if root.join(Self::FAMILY_FILE).exists() {
            return Err(ArchiveError::AlreadyInitialised(root));
        }

        let config_path = root.join(Self::CONFIG_FILE);
        let config = if config_path.exists() {
            load_config(&root)
        } else {
            if let Some(parent) = config_path.parent() {
                fs::create_dir_all(parent).map_err(|source| ArchiveError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            let config = InferenceConfig::default();
            config.save(&config_path).map_err(ArchiveError::Config)?;
            config
        };

        let archive = Self {
            root,
            family: Family::default(),
            config,
        };
        archive.flush()?;
        Ok(archive)
    }

    /// The directory the family is stored in.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The loaded family.
    #[must_use]
    pub const fn family(&self) -> &Family {
        &self.family
    }

    /// Mutable access to the loaded family. Changes are not written until
    /// [`Archive::flush`] is called.
    pub fn family_mut(&mut self) -> &mut Family {
        &mut self.family
    }

    /// The loaded configuration.
    #[must_use]
    pub const fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Writes the family back to `family.yaml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the family cannot be serialised or the file cannot
    /// be written.
    #[instrument(level = "debug", skip(self), fields(root = %self.root.display()))]
    pub fn flush(&self) -> Result<(), ArchiveError> {
        let path = self.root.join(Self::FAMILY_FILE);
        let content = serde_yaml::to_string(&self.family).map_err(|source| ArchiveError::Yaml {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, content).map_err(|source| ArchiveError::Io { path, source })
    }
}

fn load_config(root: &Path) -> InferenceConfig {
    let path = root.join(Archive::CONFIG_FILE);
    InferenceConfig::load(&path).unwrap_or_else(|e| {
        debug!("Failed to load config: {e}");
        InferenceConfig::default()
    })
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::domain::{MemberDraft, RelationshipKind};

    fn draft(given: &str) -> MemberDraft {
        MemberDraft {
            given_name: given.to_string(),
            family_name: "Test".to_string(),
            ..MemberDraft::default()
        }
    }

    #[test]
    fn open_without_family_file_fails() {
        let tmp = TempDir::new().unwrap();
        let err = Archive::open(tmp.path().to_path_buf()).unwrap_err();
        assert!(matches!(err, ArchiveError::NotInitialised(_)));
    }

    #[test]
    fn init_creates_both_files() {
        let tmp = TempDir::new().unwrap();
        let archive = Archive::init(tmp.path().to_path_buf()).unwrap();

        assert!(tmp.path().join(Archive::FAMILY_FILE).is_file());
        assert!(tmp.path().join(Archive::CONFIG_FILE).is_file());
        assert_eq!(archive.config(), &InferenceConfig::default());
        assert!(archive.family().members().is_empty());
    }

    #[test]
    fn init_twice_fails() {
        let tmp = TempDir::new().unwrap();
        Archive::init(tmp.path().to_path_buf()).unwrap();

        let err = Archive::init(tmp.path().to_path_buf()).unwrap_err();
        assert!(matches!(err, ArchiveError::AlreadyInitialised(_)));
    }

    #[test]
    fn flush_then_open_preserves_family() {
        let tmp = TempDir::new().unwrap();
        let mut archive = Archive::init(tmp.path().to_path_buf()).unwrap();

        let a = archive.family_mut().add_member(draft("Ann")).unwrap().id.clone();
        let b = archive.family_mut().add_member(draft("Ben")).unwrap().id.clone();
        archive
            .family_mut()
            .add_relationship(&a, &b, RelationshipKind::Sibling)
            .unwrap();
        archive.flush().unwrap();

        let reopened = Archive::open(tmp.path().to_path_buf()).unwrap();
        assert_eq!(reopened.family(), archive.family());
    }

    #[test]
    fn missing_config_falls_back_to_default() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(Archive::FAMILY_FILE), "").unwrap();

        let archive = Archive::open(tmp.path().to_path_buf()).unwrap();

        assert_eq!(archive.config(), &InferenceConfig::default());
        assert!(archive.family().members().is_empty());
    }

    #[test]
    fn custom_config_is_loaded() {
        let tmp = TempDir::new().unwrap();
        Archive::init(tmp.path().to_path_buf()).unwrap();
        fs::write(
            tmp.path().join(Archive::CONFIG_FILE),
            "_version = \"1\"\nmin_generation_gap = 20\n",
        )
        .unwrap();

        let archive = Archive::open(tmp.path().to_path_buf()).unwrap();
        assert_eq!(archive.config().min_generation_gap, 20);
    }

    #[test]
    fn dangling_relationships_are_kept() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(Archive::FAMILY_FILE),
            r"members:
  - id: ann
    given_name: Ann
    family_name: Test
relationships:
  - id: 0b1c3f2e-8a54-4a31-9d0b-3f0e3f1b9a10
    member_a: ann
    member_b: ghost
    kind: sibling
",
        )
        .unwrap();

        let archive = Archive::open(tmp.path().to_path_buf()).unwrap();

        assert_eq!(archive.family().relationships().len(), 1);
        assert_eq!(archive.family().dangling_relationships().count(), 1);
    }

    #[test]
    fn malformed_family_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(Archive::FAMILY_FILE), "members: 42\n").unwrap();

        let err = Archive::open(tmp.path().to_path_buf()).unwrap_err();
        assert!(matches!(err, ArchiveError::Yaml { .. }));
    }
}
