//! Init subcommand - create a sample roster and an empty prior snapshot

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use pubwatch_core::SharedProgress;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Roster CSV to create
    #[arg(short, long)]
    pub roster: Option<PathBuf>,

    /// Prior snapshot to create (empty)
    #[arg(short, long)]
    pub prior: Option<PathBuf>,
}

pub fn run(args: InitArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    let mut sync = config.sync_config();
    if let Some(roster) = args.roster {
        sync.roster_path = roster;
    }
    if let Some(prior) = args.prior {
        sync.prior_path = prior;
    }

    let created = pubwatch_zbmath::bootstrap::bootstrap(&sync)?;
    if created.is_empty() {
        progress.println("Nothing to do: roster and prior snapshot already exist");
    }
    for path in created {
        progress.println(format!("Created {}", path.display()));
    }
    Ok(())
}
