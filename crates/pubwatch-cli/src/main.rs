//! pubwatch - track new zbMATH publications for a roster of authors
//!
//! Fetches every author's publication list, writes a dated full snapshot
//! and a snapshot of the records not present in the previous one.

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "pubwatch")]
#[command(about = "Track new zbMATH publications for a roster of authors")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Config file path (default: ./pubwatch.toml or ~/.config/pubwatch/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch publications, write the full snapshot and the new-records delta
    Sync(cmd::sync::SyncArgs),
    /// Create a sample roster and an empty prior snapshot if missing
    Init(cmd::init::InitArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let progress = Arc::new(pubwatch_core::ProgressContext::new());
    let multi = if progress.is_tty() {
        Some(progress.multi())
    } else {
        None
    };
    pubwatch_core::init_logging(cli.quiet, cli.debug, multi);

    let config = if let Some(path) = cli.config {
        Config::from_file(&path)?
    } else {
        Config::load()?
    };

    match cli.command {
        Command::Sync(args) => cmd::sync::run(args, &config, &progress),
        Command::Init(args) => cmd::init::run(args, &config, &progress),
        Command::Config => {
            use comfy_table::{
                Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL,
            };

            let sync = config.sync_config();
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_header(vec![
                    Cell::new("Setting").fg(Color::Cyan),
                    Cell::new("Value").fg(Color::Cyan),
                ]);

            table.add_row(vec!["API URL", &sync.base_url]);
            table.add_row(vec![
                "API key",
                if sync.api_key.is_some() {
                    "configured"
                } else {
                    "not set"
                },
            ]);
            table.add_row(vec!["Link base", &sync.link_base]);
            table.add_row(vec![
                "Request interval",
                &format!("{}ms", sync.request_interval.as_millis()),
            ]);
            table.add_row(vec![
                "Request timeout",
                &format!("{}s", sync.request_timeout.as_secs()),
            ]);
            table.add_row(vec!["Roster", &sync.roster_path.display().to_string()]);
            table.add_row(vec!["Prior snapshot", &sync.prior_path.display().to_string()]);
            table.add_row(vec![
                "Output directory",
                &sync.output_dir.display().to_string(),
            ]);
            table.add_row(vec!["Full snapshot stem", &sync.full_stem]);
            table.add_row(vec!["New snapshot stem", &sync.new_stem]);
            table.add_row(vec!["Format", &sync.format.to_string()]);

            eprintln!("\n{table}");
            Ok(())
        }
    }
}
