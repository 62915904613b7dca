//! zbMATH author publications client

use std::time::Duration;

use pubwatch_core::FetchError;
use pubwatch_core::http::get_text;
use serde_json::Value;

use crate::config::Config;
use crate::roster::Author;
use crate::transform::RawRecord;

/// Anything that can list an author's raw publication records.
///
/// [`ZbmathApi`] is the real implementation; tests substitute canned
/// sources.
pub trait RecordSource {
    fn fetch(&self, author_id: &str) -> Result<Vec<RawRecord>, FetchError>;
}

/// One author whose records could not be fetched in this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub author_id: String,
    pub error: String,
}

/// HTTP client for `GET {base_url}/authors/{id}/publications/`
#[derive(Debug, Clone)]
pub struct ZbmathApi {
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl ZbmathApi {
    pub fn new(config: &Config) -> Self {
        if config.api_key.is_none() {
            log::warn!("No zbMATH API key configured, requests are sent without one");
        }
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            timeout: config.request_timeout,
        }
    }

    pub fn publications_url(&self, author_id: &str) -> String {
        format!("{}/authors/{author_id}/publications/", self.base_url)
    }

    fn query(&self) -> Vec<(&str, &str)> {
        let mut query = Vec::with_capacity(2);
        if let Some(key) = &self.api_key {
            query.push(("apikey", key.as_str()));
        }
        query.push(("format", "json"));
        query
    }
}

impl RecordSource for ZbmathApi {
    fn fetch(&self, author_id: &str) -> Result<Vec<RawRecord>, FetchError> {
        let body = get_text(&self.publications_url(author_id), &self.query(), self.timeout)?;
        parse_publications(&body)
    }
}

/// Pull the `publications` array out of a response body.
///
/// A body without the array (or with something else under that key) means
/// the author has no records; only undecodable JSON is an error.
pub fn parse_publications(body: &str) -> Result<Vec<RawRecord>, FetchError> {
    let mut parsed: Value =
        serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;
    match parsed.get_mut("publications").map(Value::take) {
        Some(Value::Array(items)) => Ok(items),
        Some(other) => {
            log::debug!("'publications' is not an array ({other}), treating as empty");
            Ok(Vec::new())
        }
        None => Ok(Vec::new()),
    }
}

/// Fetch one author's records, turning failure into an empty result.
///
/// The failure is logged and appended to `failures`; the run carries on
/// with the next author. No retry.
pub fn fetch_author_records<S: RecordSource + ?Sized>(
    source: &S,
    author: &Author,
    failures: &mut Vec<FetchFailure>,
) -> Vec<RawRecord> {
    match source.fetch(&author.external_id) {
        Ok(records) => records,
        Err(e) => {
            log::warn!(
                "{} ({}): fetch failed: {e}",
                author.full_name,
                author.external_id
            );
            failures.push(FetchFailure {
                author_id: author.external_id.clone(),
                error: e.to_string(),
            });
            Vec::new()
        }
    }
}
