//! Raw zbMATH JSON → [`PublicationRecord`]
//!
//! The provider's record shape is loose: fields go missing, `year` is
//! sometimes a number, `title` is sometimes a bare string. Everything is
//! read through [`text`], which turns whatever is there into a string and
//! anything absent into `""`. Normalization never fails.

use serde_json::Value;

use crate::schema::PublicationRecord;

/// Untyped provider record, exactly as decoded from the response body
pub type RawRecord = Value;

/// Separator between co-author names in the `authors` column
pub const AUTHOR_SEPARATOR: &str = "; ";

/// Scalar → string, everything else → empty.
fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// `parent.key` when `parent` is an object, or `parent` itself when the
/// provider flattened it to a scalar.
fn nested_text(raw: &Value, parent: &str, key: &str) -> String {
    match raw.get(parent) {
        Some(obj @ Value::Object(_)) => text(obj.get(key)),
        other => text(other),
    }
}

/// Co-author display names in provider order. Entries without a name are
/// skipped.
fn author_names(raw: &Value) -> Vec<String> {
    let Some(Value::Array(authors)) = raw.get("authors") else {
        return Vec::new();
    };
    authors
        .iter()
        .map(|a| match a {
            Value::Object(_) => text(a.get("display_name")),
            other => text(Some(other)),
        })
        .filter(|name| !name.is_empty())
        .collect()
}

/// Turns raw records into rows. Holds the link prefix so callers only
/// supply the record and the owning author.
#[derive(Debug, Clone)]
pub struct Normalizer {
    link_base: String,
}

impl Normalizer {
    pub fn new(link_base: impl Into<String>) -> Self {
        Self {
            link_base: link_base.into(),
        }
    }

    /// Flatten `raw`, attributing it to `author_id` from the roster.
    pub fn normalize(&self, raw: &RawRecord, author_id: &str) -> PublicationRecord {
        let identifier = text(raw.get("zbl_id"));
        let link = format!("{}{identifier}", self.link_base);
        PublicationRecord {
            title: nested_text(raw, "title", "text"),
            year: text(raw.get("year")),
            authors: author_names(raw).join(AUTHOR_SEPARATOR),
            source_name: nested_text(raw, "journal", "name"),
            link,
            owning_author_id: author_id.to_string(),
            identifier,
        }
    }
}
