//! Delta of the current snapshot against a prior one

use rustc_hash::FxHashSet;

use crate::schema::PublicationRecord;

/// Distinct non-empty identifiers seen in a prior snapshot.
///
/// Empty identifiers are dropped on insert, so an empty identifier is never
/// a member and a record without one always counts as new.
#[derive(Debug, Default, Clone)]
pub struct PriorIdentifiers {
    set: FxHashSet<String>,
}

impl PriorIdentifiers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>) {
        let id = id.into();
        if !id.is_empty() {
            self.set.insert(id);
        }
    }

    /// Exact string match, no case or whitespace folding.
    pub fn contains(&self, id: &str) -> bool {
        self.set.contains(id)
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for PriorIdentifiers {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut ids = Self::new();
        for id in iter {
            ids.insert(id);
        }
        ids
    }
}

/// Records of `current` whose identifier is not in `prior`, in order.
///
/// `None` means there is no prior snapshot at all: everything is new.
pub fn diff(
    current: &[PublicationRecord],
    prior: Option<&PriorIdentifiers>,
) -> Vec<PublicationRecord> {
    match prior {
        None => current.to_vec(),
        Some(prior) => current
            .iter()
            .filter(|r| !prior.contains(&r.identifier))
            .cloned()
            .collect(),
    }
}
