//! Canonical publication row and its tabular schema

use std::sync::{Arc, LazyLock};

use arrow::datatypes::{DataType, Field, Schema};
use serde::{Deserialize, Serialize};

/// Column holding the provider's record key
pub const ID_COLUMN: &str = "zbl_id";

/// Column names in output order. Must match the serde names on
/// [`PublicationRecord`] field for field.
pub const COLUMNS: [&str; 7] = [
    ID_COLUMN,
    "title",
    "year",
    "authors",
    "source",
    "link",
    "author_id",
];

/// One flattened publication, attributed to the roster author it was
/// fetched for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationRecord {
    /// zbMATH identifier; may be empty
    #[serde(rename = "zbl_id")]
    pub identifier: String,
    pub title: String,
    pub year: String,
    /// Co-author display names joined with `"; "`
    pub authors: String,
    #[serde(rename = "source")]
    pub source_name: String,
    pub link: String,
    #[serde(rename = "author_id")]
    pub owning_author_id: String,
}

impl PublicationRecord {
    /// Values in [`COLUMNS`] order.
    pub fn values(&self) -> [&str; 7] {
        [
            self.identifier.as_str(),
            self.title.as_str(),
            self.year.as_str(),
            self.authors.as_str(),
            self.source_name.as_str(),
            self.link.as_str(),
            self.owning_author_id.as_str(),
        ]
    }
}

/// Arrow schema for Parquet snapshots. Every column is a non-null string;
/// absent values are empty strings, same as in CSV.
pub static PUBLICATIONS: LazyLock<Arc<Schema>> = LazyLock::new(|| {
    Arc::new(Schema::new(
        COLUMNS
            .iter()
            .map(|name| Field::new(*name, DataType::Utf8, false))
            .collect::<Vec<_>>(),
    ))
});

pub fn publications() -> &'static Arc<Schema> {
    &PUBLICATIONS
}
