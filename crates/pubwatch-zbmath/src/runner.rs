//! Main runner: roster → fetch → diff → full and new snapshots

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::NaiveDate;
use pubwatch_core::{Pacer, ProgressContext, SharedProgress, fmt_num};

use crate::api::{FetchFailure, RecordSource, ZbmathApi};
use crate::config::Config;
use crate::diff::diff;
use crate::roster::{Author, load_roster};
use crate::snapshot::{SnapshotWriter, load_prior_identifiers};
use crate::transform::Normalizer;
use crate::walker::walk_roster;

/// Sync run summary
#[derive(Debug)]
pub struct Summary {
    pub authors: usize,
    /// Authors that contributed nothing because their fetch failed
    pub failures: Vec<FetchFailure>,
    pub total_records: usize,
    pub new_records: usize,
    /// Whether a prior snapshot existed to diff against
    pub had_prior: bool,
    pub full_path: Option<PathBuf>,
    pub new_path: Option<PathBuf>,
    pub elapsed: Duration,
}

/// Run a sync against the live zbMATH API.
///
/// `date` stamps the full snapshot file name.
pub fn run(config: &Config, date: NaiveDate, progress: SharedProgress) -> Result<Summary> {
    let roster = load_roster(&config.roster_path)?;
    let api = ZbmathApi::new(config);
    run_with_source(config, &roster, &api, date, &progress)
}

/// Run a sync over an already loaded roster and an arbitrary record source.
pub fn run_with_source<S: RecordSource + ?Sized>(
    config: &Config,
    roster: &[Author],
    source: &S,
    date: NaiveDate,
    progress: &ProgressContext,
) -> Result<Summary> {
    let start = Instant::now();
    config.check_paths(date)?;
    log::info!(
        "Processing {} authors ({:?} between requests)",
        roster.len(),
        config.request_interval
    );

    let normalizer = Normalizer::new(config.link_base.as_str());
    let mut pacer = Pacer::new(config.request_interval);
    let pb = progress.roster_bar("authors", roster.len());
    let walk = walk_roster(source, roster, &normalizer, &mut pacer, &pb);

    // Diff before writing anything, the prior file must be read as it was
    let prior = load_prior_identifiers(&config.prior_path)?;
    let new = diff(&walk.records, prior.as_ref());

    let writer = SnapshotWriter::new(config, date);
    let (full_path, new_path) = if config.dry_run {
        log::info!("Dry run: skipping snapshot files");
        (None, None)
    } else {
        (writer.write_full(&walk.records)?, writer.write_new(&new)?)
    };

    let summary = Summary {
        authors: roster.len(),
        failures: walk.failures,
        total_records: walk.records.len(),
        new_records: new.len(),
        had_prior: prior.is_some(),
        full_path,
        new_path,
        elapsed: start.elapsed(),
    };

    log::info!("=== zbMATH Sync Summary ===");
    log::info!(
        "Authors: {} ({} failed)",
        summary.authors,
        summary.failures.len()
    );
    log::info!(
        "Publications: {} total, {} new",
        fmt_num(summary.total_records),
        fmt_num(summary.new_records)
    );
    log::info!("Time: {:.1}s", summary.elapsed.as_secs_f64());

    Ok(summary)
}
