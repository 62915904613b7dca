//! Snapshot files: writing full/new outputs and reading prior identifiers.
//!
//! Both CSV and Parquet use the same seven string columns. Files are written
//! to `<name>.tmp` first and renamed into place, so a crash never leaves a
//! truncated snapshot behind under the final name.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Array, ArrayRef, RecordBatch, StringArray};
use arrow::datatypes::DataType;
use chrono::NaiveDate;
use parquet::arrow::ArrowWriter;
use parquet::arrow::ProjectionMask;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::properties::WriterProperties;
use serde::Deserialize;

use crate::config::Config;
use crate::diff::PriorIdentifiers;
use crate::schema::{self, COLUMNS, ID_COLUMN, PublicationRecord};

const ZSTD_LEVEL: i32 = 3;

/// On-disk snapshot encoding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotFormat {
    #[default]
    Csv,
    Parquet,
}

impl SnapshotFormat {
    /// Guess from the file extension; anything but `.parquet` is CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("parquet") => Self::Parquet,
            _ => Self::Csv,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Parquet => "parquet",
        }
    }
}

impl std::fmt::Display for SnapshotFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Writes the full and new-only snapshots of one run.
#[derive(Debug)]
pub struct SnapshotWriter<'a> {
    config: &'a Config,
    date: NaiveDate,
}

impl<'a> SnapshotWriter<'a> {
    pub fn new(config: &'a Config, date: NaiveDate) -> Self {
        Self { config, date }
    }

    /// Write every record of the run. Nothing is written for an empty run.
    pub fn write_full(&self, records: &[PublicationRecord]) -> Result<Option<PathBuf>> {
        if records.is_empty() {
            log::info!("No publications fetched, full snapshot not written");
            return Ok(None);
        }
        self.write(&self.config.full_path(self.date), records).map(Some)
    }

    /// Write the records not seen before. An empty delta writes no file.
    pub fn write_new(&self, records: &[PublicationRecord]) -> Result<Option<PathBuf>> {
        if records.is_empty() {
            log::info!("No new publications, new snapshot not written");
            return Ok(None);
        }
        self.write(&self.config.new_path(), records).map(Some)
    }

    fn write(&self, path: &Path, records: &[PublicationRecord]) -> Result<PathBuf> {
        fs::create_dir_all(&self.config.output_dir).with_context(|| {
            format!(
                "Cannot create output directory {}",
                self.config.output_dir.display()
            )
        })?;
        write_snapshot(path, records, self.config.format)?;
        log::info!("Wrote {} publications to {}", records.len(), path.display());
        Ok(path.to_path_buf())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Write `records` to `path` in `format`, atomically via tmp → rename.
pub fn write_snapshot(
    path: &Path,
    records: &[PublicationRecord],
    format: SnapshotFormat,
) -> Result<()> {
    let tmp = tmp_path(path);
    let file =
        File::create(&tmp).with_context(|| format!("Cannot create {}", tmp.display()))?;

    let written = match format {
        SnapshotFormat::Csv => write_csv(file, records),
        SnapshotFormat::Parquet => write_parquet(file, records),
    };
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(e.context(format!("Cannot write {}", path.display())));
    }

    fs::rename(&tmp, path)
        .with_context(|| format!("Cannot move {} into place", tmp.display()))?;
    Ok(())
}

fn write_csv(file: File, records: &[PublicationRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(BufWriter::new(file));
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(file: File, records: &[PublicationRecord]) -> Result<()> {
    let schema = schema::publications().clone();
    let columns: Vec<ArrayRef> = (0..COLUMNS.len())
        .map(|col| {
            let values = records.iter().map(|r| r.values()[col]);
            Arc::new(StringArray::from_iter_values(values)) as ArrayRef
        })
        .collect();
    let batch = RecordBatch::try_new(schema.clone(), columns)?;

    let props = WriterProperties::builder()
        .set_compression(Compression::ZSTD(ZstdLevel::try_new(ZSTD_LEVEL)?))
        .build();
    let mut writer = ArrowWriter::try_new(file, schema, Some(props))?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

/// Identifiers of the prior snapshot at `path`.
///
/// - file absent → `None` (no prior snapshot; everything is new)
/// - file empty, or header only → empty set
/// - no `zbl_id` column, or existence cannot be checked → error
///
/// The format follows the file extension. Empty identifiers are skipped.
pub fn load_prior_identifiers(path: &Path) -> Result<Option<PriorIdentifiers>> {
    let exists = path
        .try_exists()
        .with_context(|| format!("Cannot check prior snapshot {}", path.display()))?;
    if !exists {
        log::info!(
            "No prior snapshot at {}, every publication counts as new",
            path.display()
        );
        return Ok(None);
    }
    let len = fs::metadata(path)
        .with_context(|| format!("Cannot stat {}", path.display()))?
        .len();
    if len == 0 {
        log::info!("Prior snapshot {} is empty", path.display());
        return Ok(Some(PriorIdentifiers::new()));
    }

    let ids = match SnapshotFormat::from_path(path) {
        SnapshotFormat::Csv => read_csv_ids(path),
        SnapshotFormat::Parquet => read_parquet_ids(path),
    }
    .with_context(|| format!("Cannot read prior snapshot {}", path.display()))?;

    log::info!(
        "Prior snapshot {}: {} known identifiers",
        path.display(),
        ids.len()
    );
    Ok(Some(ids))
}

fn read_csv_ids(path: &Path) -> Result<PriorIdentifiers> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    if headers.iter().all(str::is_empty) {
        return Ok(PriorIdentifiers::new());
    }
    let idx = headers
        .iter()
        .position(|h| h == ID_COLUMN)
        .with_context(|| format!("No '{ID_COLUMN}' column"))?;

    let mut ids = PriorIdentifiers::new();
    for row in reader.records() {
        let row = row?;
        if let Some(id) = row.get(idx) {
            ids.insert(id);
        }
    }
    Ok(ids)
}

fn read_parquet_ids(path: &Path) -> Result<PriorIdentifiers> {
    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    let col_idx = builder
        .schema()
        .fields()
        .iter()
        .position(|f| f.name() == ID_COLUMN)
        .with_context(|| format!("No '{ID_COLUMN}' column"))?;
    let mask = ProjectionMask::roots(builder.parquet_schema(), [col_idx]);
    let reader = builder.with_projection(mask).build()?;

    let mut ids = PriorIdentifiers::new();
    for batch in reader {
        let batch = batch?;
        // Other writers may use LargeUtf8 or dictionaries
        let col = arrow::compute::cast(batch.column(0).as_ref(), &DataType::Utf8)?;
        let col = col
            .as_any()
            .downcast_ref::<StringArray>()
            .context("zbl_id column is not a string column")?;
        for i in 0..col.len() {
            if col.is_valid(i) {
                ids.insert(col.value(i));
            }
        }
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn rec(id: &str, author: &str) -> PublicationRecord {
        PublicationRecord {
            identifier: id.to_string(),
            title: format!("On {id}, with commas, and \"quotes\""),
            year: "2022".to_string(),
            authors: "A, B.; C, D.".to_string(),
            source_name: "Ann. Math.".to_string(),
            link: format!("https://zbmath.org/{id}"),
            owning_author_id: author.to_string(),
        }
    }

    fn config(dir: &Path, format: SnapshotFormat) -> Config {
        Config {
            output_dir: dir.join("out"),
            format,
            ..Default::default()
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()
    }

    fn read_csv(path: &Path) -> Vec<PublicationRecord> {
        csv::Reader::from_path(path)
            .unwrap()
            .deserialize()
            .map(|r| r.unwrap())
            .collect()
    }

    #[test]
    fn format_from_path() {
        assert_eq!(
            SnapshotFormat::from_path(Path::new("a/b.PARQUET")),
            SnapshotFormat::Parquet
        );
        assert_eq!(
            SnapshotFormat::from_path(Path::new("old_publications.csv")),
            SnapshotFormat::Csv
        );
        assert_eq!(
            SnapshotFormat::from_path(Path::new("no_extension")),
            SnapshotFormat::Csv
        );
    }

    #[test]
    fn csv_full_snapshot_has_header_and_rows() {
        let dir = TempDir::new().unwrap();
        let config = config(dir.path(), SnapshotFormat::Csv);
        let records = vec![rec("1", "x"), rec("2", "y")];

        let path = SnapshotWriter::new(&config, date())
            .write_full(&records)
            .unwrap()
            .unwrap();
        assert_eq!(path, dir.path().join("out/publications_20250131.csv"));

        let content = fs::read_to_string(&path).unwrap();
        let header = content.lines().next().unwrap();
        assert_eq!(header, COLUMNS.join(","));
        assert_eq!(read_csv(&path), records);
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn empty_collections_write_nothing() {
        let dir = TempDir::new().unwrap();
        let config = config(dir.path(), SnapshotFormat::Csv);
        let writer = SnapshotWriter::new(&config, date());

        assert!(writer.write_full(&[]).unwrap().is_none());
        assert!(writer.write_new(&[]).unwrap().is_none());
        assert!(!config.output_dir.exists());
    }

    #[test]
    fn new_snapshot_uses_new_stem() {
        let dir = TempDir::new().unwrap();
        let config = config(dir.path(), SnapshotFormat::Csv);
        let path = SnapshotWriter::new(&config, date())
            .write_new(&[rec("9", "x")])
            .unwrap()
            .unwrap();
        assert_eq!(path, dir.path().join("out/new_publications.csv"));
    }

    #[test]
    fn unwritable_destination_is_error() {
        let dir = TempDir::new().unwrap();
        // output_dir is a regular file, so create_dir_all fails
        let blocker = dir.path().join("out");
        fs::write(&blocker, b"").unwrap();
        let config = config(dir.path(), SnapshotFormat::Csv);
        let err = SnapshotWriter::new(&config, date())
            .write_full(&[rec("1", "x")])
            .unwrap_err();
        assert!(format!("{err}").contains("Cannot create output directory"));
    }

    #[test]
    fn prior_absent_is_none() {
        let dir = TempDir::new().unwrap();
        let prior = load_prior_identifiers(&dir.path().join("old.csv")).unwrap();
        assert!(prior.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn prior_behind_unreadable_directory_is_error() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let locked = dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("old.csv"), "zbl_id\n1\n").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Privileged users are not stopped by directory permissions
        let enforced = fs::metadata(locked.join("old.csv")).is_err();
        let result = load_prior_identifiers(&locked.join("old.csv"));
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        if enforced {
            let err = result.unwrap_err();
            assert!(format!("{err}").contains("Cannot check prior snapshot"));
        } else {
            assert_eq!(result.unwrap().unwrap().len(), 1);
        }
    }

    #[test]
    fn prior_zero_bytes_is_empty_set() {
        let dir = TempDir::new().unwrap();
        for name in ["old.csv", "old.parquet"] {
            let path = dir.path().join(name);
            fs::write(&path, b"").unwrap();
            let prior = load_prior_identifiers(&path).unwrap().unwrap();
            assert!(prior.is_empty());
        }
    }

    #[test]
    fn prior_header_only_is_empty_set() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("old.csv");
        fs::write(&path, "zbl_id,title\n").unwrap();
        assert!(load_prior_identifiers(&path).unwrap().unwrap().is_empty());
    }

    #[test]
    fn prior_csv_from_other_tool() {
        // Extra columns, different order, a blank id
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("old.csv");
        fs::write(
            &path,
            "title,zbl_id,note\nT1,1111.11111,x\nT2,,y\nT3,2222.22222,z\n",
        )
        .unwrap();
        let prior = load_prior_identifiers(&path).unwrap().unwrap();
        assert_eq!(prior.len(), 2);
        assert!(prior.contains("1111.11111"));
        assert!(prior.contains("2222.22222"));
        assert!(!prior.contains(""));
    }

    #[test]
    fn prior_without_id_column_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("old.csv");
        fs::write(&path, "title,year\nT,2020\n").unwrap();
        let err = load_prior_identifiers(&path).unwrap_err();
        assert!(format!("{err:#}").contains("zbl_id"));
    }

    #[test]
    fn csv_snapshot_reads_back_as_prior() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snap.csv");
        let records = [rec("1", "x"), rec("", "x"), rec("3", "y")];
        write_snapshot(&path, &records, SnapshotFormat::Csv).unwrap();
        let prior = load_prior_identifiers(&path).unwrap().unwrap();
        assert_eq!(prior.len(), 2);
        assert!(prior.contains("1") && prior.contains("3"));
    }

    #[test]
    fn parquet_snapshot_reads_back_as_prior() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snap.parquet");
        write_snapshot(
            &path,
            &[rec("1", "x"), rec("2", "x"), rec("1", "y")],
            SnapshotFormat::Parquet,
        )
        .unwrap();
        assert!(!tmp_path(&path).exists());

        let prior = load_prior_identifiers(&path).unwrap().unwrap();
        assert_eq!(prior.len(), 2);
        assert!(prior.contains("1") && prior.contains("2"));
    }

    #[test]
    fn tmp_path_appends_suffix() {
        assert_eq!(
            tmp_path(Path::new("out/new_publications.csv")),
            PathBuf::from("out/new_publications.csv.tmp")
        );
    }
}
