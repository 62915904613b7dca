//! zbMATH sync configuration

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use anyhow::{Result, ensure};
use chrono::NaiveDate;

use crate::snapshot::SnapshotFormat;

/// Placeholder in [`Config::full_stem`] replaced by the run date
pub const DATE_PLACEHOLDER: &str = "{date}";

/// Runtime configuration for one sync run.
///
/// Built once by the caller and passed by reference; nothing in this crate
/// reads the process environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// API root, without the `/authors/...` suffix
    pub base_url: String,
    /// Sent as the `apikey` query parameter when set
    pub api_key: Option<String>,
    /// Prefix of the per-record link; the identifier is appended as-is
    pub link_base: String,
    /// Minimum gap between two author requests
    pub request_interval: Duration,
    /// Upper bound for a single request, body included
    pub request_timeout: Duration,
    /// CSV with `full_name,zbmath_id` columns
    pub roster_path: PathBuf,
    /// Snapshot from a previous run; absent means "everything is new"
    pub prior_path: PathBuf,
    /// Directory receiving the full and new snapshots
    pub output_dir: PathBuf,
    /// Full snapshot file stem, may contain `{date}` (YYYYMMDD)
    pub full_stem: String,
    /// New-records file stem
    pub new_stem: String,
    pub format: SnapshotFormat,
    /// Fetch and diff, but write nothing
    pub dry_run: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://zbmath.org/api/v1".to_string(),
            api_key: None,
            link_base: "https://zbmath.org/".to_string(),
            request_interval: Duration::from_millis(1500),
            request_timeout: Duration::from_secs(30),
            roster_path: PathBuf::from("authors.csv"),
            prior_path: PathBuf::from("old_publications.csv"),
            output_dir: PathBuf::from("."),
            full_stem: "publications_{date}".to_string(),
            new_stem: "new_publications".to_string(),
            format: SnapshotFormat::Csv,
            dry_run: false,
        }
    }
}

impl Config {
    /// Path of the full snapshot for a run on `date`.
    pub fn full_path(&self, date: NaiveDate) -> PathBuf {
        let stem = self
            .full_stem
            .replace(DATE_PLACEHOLDER, &date.format("%Y%m%d").to_string());
        self.output_dir
            .join(format!("{stem}.{}", self.format.extension()))
    }

    /// Path of the new-records snapshot.
    pub fn new_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", self.new_stem, self.format.extension()))
    }

    /// Fail if any two of the prior, full and new snapshot paths name the
    /// same file.
    pub fn check_paths(&self, date: NaiveDate) -> Result<()> {
        let prior = comparable(&self.prior_path);
        let full = comparable(&self.full_path(date));
        let new = comparable(&self.new_path());
        ensure!(
            full != prior,
            "Full snapshot path {} is the prior snapshot; change full_stem or output_dir",
            self.full_path(date).display()
        );
        ensure!(
            new != prior,
            "New snapshot path {} is the prior snapshot; change new_stem or output_dir",
            self.new_path().display()
        );
        ensure!(
            new != full,
            "Full and new snapshots share the path {}",
            self.new_path().display()
        );
        Ok(())
    }
}

/// Absolute form without `.` components, for equality checks only.
fn comparable(path: &Path) -> PathBuf {
    std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}
