use std::path::PathBuf;

use kinship::Archive;
use tracing::instrument;

#[derive(Debug, clap::Parser)]
pub struct Command {}

impl Command {
    #[instrument]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        Archive::init(root.clone())?;

        println!("Initialized family in {}", root.display());
        println!("  Created: {}", Archive::FAMILY_FILE);
        println!("  Created: {}", Archive::CONFIG_FILE);
        println!();
        println!("Next steps:");
        println!("  kin add --given Ada --family Lovelace --born 1815-12-10");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use kinship::Archive;
    use tempfile::tempdir;

    use super::Command;

    #[test]
    fn init_creates_an_empty_family() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_path_buf();

        Command {}.run(root.clone()).expect("init should succeed");

        let archive = Archive::open(root.clone()).expect("family should load");
        assert!(archive.family().members().is_empty());
        assert!(Command {}.run(root).is_err());
    }
}
