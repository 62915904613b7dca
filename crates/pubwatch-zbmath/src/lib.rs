//! Pubwatch zbMATH - incremental publication sync against zbMATH
//!
//! Walks an author roster, pulls each author's publications from the
//! zbMATH API, flattens them into fixed-schema rows and diffs the result
//! against the previous snapshot.
//!
//! # Example
//!
//! ```ignore
//! use pubwatch_zbmath::{Config, run};
//!
//! let config = Config {
//!     api_key: std::env::var("ZBMATH_API_KEY").ok(),
//!     ..Default::default()
//! };
//! let today = chrono::NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
//! let summary = run(&config, today, Default::default())?;
//! println!("{} new publications", summary.new_records);
//! ```

pub mod api;
pub mod bootstrap;
pub mod config;
pub mod diff;
pub mod roster;
pub mod runner;
pub mod schema;
pub mod snapshot;
pub mod transform;
pub mod walker;

// Re-exports
pub use api::{FetchFailure, RecordSource, ZbmathApi};
pub use config::Config;
pub use diff::{PriorIdentifiers, diff};
pub use roster::{Author, load_roster};
pub use runner::{Summary, run, run_with_source};
pub use schema::PublicationRecord;
pub use snapshot::{SnapshotFormat, SnapshotWriter, load_prior_identifiers};
pub use transform::{Normalizer, RawRecord};
pub use walker::{WalkResult, walk_roster};
