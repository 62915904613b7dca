//! Sync subcommand - fetch the roster's publications and compute the delta

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, ValueEnum};
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

use pubwatch_core::{SharedProgress, fmt_num};
use pubwatch_zbmath::{SnapshotFormat, Summary};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Roster CSV (full_name,zbmath_id)
    #[arg(short, long)]
    pub roster: Option<PathBuf>,

    /// Prior snapshot to diff against
    #[arg(short, long)]
    pub prior: Option<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Snapshot file format
    #[arg(short, long, value_enum)]
    pub format: Option<FormatArg>,

    /// Minimum milliseconds between author requests
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Fetch and diff without writing any file
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Clone, Copy, ValueEnum, Debug)]
pub enum FormatArg {
    Csv,
    Parquet,
}

impl From<FormatArg> for SnapshotFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Csv => SnapshotFormat::Csv,
            FormatArg::Parquet => SnapshotFormat::Parquet,
        }
    }
}

/// Build the pipeline configuration: config file values, then CLI overrides.
fn sync_config(args: SyncArgs, config: &Config) -> pubwatch_zbmath::Config {
    let mut sync = config.sync_config();
    if let Some(roster) = args.roster {
        sync.roster_path = roster;
    }
    if let Some(prior) = args.prior {
        sync.prior_path = prior;
    }
    if let Some(output) = args.output {
        sync.output_dir = output;
    }
    if let Some(format) = args.format {
        sync.format = format.into();
    }
    if let Some(ms) = args.interval_ms {
        sync.request_interval = Duration::from_millis(ms);
    }
    sync.dry_run = args.dry_run;
    sync
}

/// Print a key-value summary table on stderr
fn print_summary(summary: &Summary) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("zbMATH").fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);

    let path_or_dash = |p: &Option<PathBuf>| {
        p.as_ref()
            .map_or_else(|| "-".to_string(), |p| p.display().to_string())
    };
    let rows = [
        (
            "Authors",
            format!("{} ({} failed)", summary.authors, summary.failures.len()),
        ),
        ("Publications", fmt_num(summary.total_records)),
        (
            "New",
            if summary.had_prior {
                fmt_num(summary.new_records)
            } else {
                format!("{} (no prior snapshot)", fmt_num(summary.new_records))
            },
        ),
        ("Full snapshot", path_or_dash(&summary.full_path)),
        ("New snapshot", path_or_dash(&summary.new_path)),
        ("Time", format!("{:.1}s", summary.elapsed.as_secs_f64())),
    ];
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    for failure in &summary.failures {
        table.add_row(vec![
            Cell::new(format!("Failed: {}", failure.author_id)).fg(Color::Yellow),
            Cell::new(&failure.error),
        ]);
    }
    eprintln!("\n{table}");
}

pub fn run(args: SyncArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    let sync = sync_config(args, config);
    let today = chrono::Local::now().date_naive();

    log::info!("Syncing zbMATH publications");
    log::info!("  Roster: {}", sync.roster_path.display());
    log::info!("  Prior: {}", sync.prior_path.display());
    log::info!("  Output: {} ({})", sync.output_dir.display(), sync.format);

    let summary = pubwatch_zbmath::run(&sync, today, progress.clone())?;
    print_summary(&summary);

    match (&summary.new_path, summary.new_records) {
        (_, 0) => progress.println("No new publications"),
        (Some(path), n) => {
            progress.println(format!("{} new publications in {}", fmt_num(n), path.display()))
        }
        (None, n) => progress.println(format!("{} new publications (dry run)", fmt_num(n))),
    }

    if summary.failures.len() == summary.authors && summary.authors > 0 {
        log::warn!("Every author request failed; check the API key and connectivity");
    }
    Ok(())
}
