//! Sequential, paced walk over the roster

use indicatif::ProgressBar;
use pubwatch_core::Pacer;

use crate::api::{FetchFailure, RecordSource, fetch_author_records};
use crate::roster::Author;
use crate::schema::PublicationRecord;
use crate::transform::Normalizer;

/// Everything collected by one walk
#[derive(Debug, Default)]
pub struct WalkResult {
    /// Roster order, then provider order within each author
    pub records: Vec<PublicationRecord>,
    pub failures: Vec<FetchFailure>,
}

/// Fetch and normalize every author in `roster`, one at a time.
///
/// `pacer` is consulted before each request. An empty roster makes no
/// requests.
pub fn walk_roster<S: RecordSource + ?Sized>(
    source: &S,
    roster: &[Author],
    normalizer: &Normalizer,
    pacer: &mut Pacer,
    pb: &ProgressBar,
) -> WalkResult {
    let mut result = WalkResult::default();
    let total = roster.len();

    for (idx, author) in roster.iter().enumerate() {
        pb.set_message(format!("{} ({})", author.full_name, author.external_id));
        log::info!(
            "{}/{total}: fetching {} ({})",
            idx + 1,
            author.full_name,
            author.external_id
        );

        pacer.pace();
        let raw = fetch_author_records(source, author, &mut result.failures);
        log::debug!("{}: {} records", author.external_id, raw.len());

        result.records.extend(
            raw.iter()
                .map(|r| normalizer.normalize(r, &author.external_id)),
        );
        pb.inc(1);
    }

    pb.finish_and_clear();
    result
}
