//! First-run setup: sample roster and empty prior snapshot

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::Config;
use crate::roster::{sample_roster, write_roster};

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create {}", parent.display()))?;
    }
    Ok(())
}

/// Create whichever of the roster and prior snapshot are missing.
///
/// Existing files are left untouched. Returns the paths that were created.
pub fn bootstrap(config: &Config) -> Result<Vec<PathBuf>> {
    let mut created = Vec::new();

    if !config.roster_path.exists() {
        ensure_parent(&config.roster_path)?;
        write_roster(&config.roster_path, &sample_roster())?;
        log::info!("Created sample roster {}", config.roster_path.display());
        created.push(config.roster_path.clone());
    }

    if !config.prior_path.exists() {
        ensure_parent(&config.prior_path)?;
        fs::File::create(&config.prior_path)
            .with_context(|| format!("Cannot create {}", config.prior_path.display()))?;
        log::info!("Created empty prior snapshot {}", config.prior_path.display());
        created.push(config.prior_path.clone());
    }

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::load_roster;
    use crate::snapshot::load_prior_identifiers;
    use tempfile::TempDir;

    fn config(dir: &Path) -> Config {
        Config {
            roster_path: dir.join("conf/authors.csv"),
            prior_path: dir.join("old_publications.csv"),
            ..Default::default()
        }
    }

    #[test]
    fn creates_both_when_missing() {
        let dir = TempDir::new().unwrap();
        let config = config(dir.path());

        let created = bootstrap(&config).unwrap();
        assert_eq!(created, vec![config.roster_path.clone(), config.prior_path.clone()]);
        assert_eq!(load_roster(&config.roster_path).unwrap(), sample_roster());
        let prior = load_prior_identifiers(&config.prior_path).unwrap().unwrap();
        assert!(prior.is_empty());
    }

    #[test]
    fn existing_files_are_kept() {
        let dir = TempDir::new().unwrap();
        let config = config(dir.path());
        fs::create_dir_all(config.roster_path.parent().unwrap()).unwrap();
        fs::write(&config.roster_path, "full_name,zbmath_id\nMine,mine\n").unwrap();
        fs::write(&config.prior_path, "zbl_id\n1\n").unwrap();

        assert!(bootstrap(&config).unwrap().is_empty());
        let content = fs::read_to_string(&config.roster_path).unwrap();
        assert!(content.contains("Mine,mine"));
    }
}
