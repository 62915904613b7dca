//! Author roster CSV

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// A tracked author. Identity is `external_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub full_name: String,
    /// zbMATH author identifier, e.g. `stoyanova.maya`
    #[serde(rename = "zbmath_id")]
    pub external_id: String,
}

impl Author {
    pub fn new(full_name: impl Into<String>, external_id: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            external_id: external_id.into(),
        }
    }
}

/// Read the whole roster, in file order.
///
/// Columns are matched by header name, surrounding whitespace is trimmed.
pub fn load_roster(path: &Path) -> Result<Vec<Author>> {
    anyhow::ensure!(
        path.exists(),
        "Roster not found: {} (run `pubwatch init` to create a sample)",
        path.display()
    );
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Cannot open roster {}", path.display()))?;

    let authors = reader
        .deserialize::<Author>()
        .enumerate()
        .map(|(idx, row)| {
            // +2: header line, 1-based
            row.with_context(|| format!("{}: bad roster row {}", path.display(), idx + 2))
        })
        .collect::<Result<Vec<Author>>>()?;

    log::debug!("Loaded {} authors from {}", authors.len(), path.display());
    Ok(authors)
}

/// Write `authors` as a roster CSV, header included.
pub fn write_roster(path: &Path, authors: &[Author]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Cannot create roster {}", path.display()))?;
    if authors.is_empty() {
        writer.write_record(["full_name", "zbmath_id"])?;
    }
    for author in authors {
        writer.serialize(author)?;
    }
    writer.flush()?;
    Ok(())
}

/// Two-author roster written by `pubwatch init`.
pub fn sample_roster() -> Vec<Author> {
    vec![
        Author::new("Maya Stoyanova", "stoyanova.maya"),
        Author::new("Ivan Ivanov", "ivanov.ivan"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_preserves_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("authors.csv");
        std::fs::write(
            &path,
            "full_name,zbmath_id\nB Person,b.person\nA Person,a.person\n",
        )
        .unwrap();

        let roster = load_roster(&path).unwrap();
        assert_eq!(
            roster,
            vec![
                Author::new("B Person", "b.person"),
                Author::new("A Person", "a.person"),
            ]
        );
    }

    #[test]
    fn load_trims_and_ignores_column_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("authors.csv");
        std::fs::write(&path, "zbmath_id , full_name\n x.y ,  X Y \n").unwrap();

        let roster = load_roster(&path).unwrap();
        assert_eq!(roster, vec![Author::new("X Y", "x.y")]);
    }

    #[test]
    fn header_only_is_empty_roster() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("authors.csv");
        std::fs::write(&path, "full_name,zbmath_id\n").unwrap();
        assert!(load_roster(&path).unwrap().is_empty());
    }

    #[test]
    fn missing_roster_mentions_init() {
        let dir = TempDir::new().unwrap();
        let err = load_roster(&dir.path().join("nope.csv")).unwrap_err();
        assert!(format!("{err}").contains("pubwatch init"));
    }

    #[test]
    fn missing_column_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("authors.csv");
        std::fs::write(&path, "full_name\nSomeone\n").unwrap();
        let err = load_roster(&path).unwrap_err();
        assert!(format!("{err:#}").contains("row 2"));
    }

    #[test]
    fn sample_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("authors.csv");
        write_roster(&path, &sample_roster()).unwrap();
        assert_eq!(load_roster(&path).unwrap(), sample_roster());

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("full_name,zbmath_id\n"));
    }
}
