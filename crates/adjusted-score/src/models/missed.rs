//! Lookups deferred for a later retry pass.

use std::collections::BTreeSet;

/// An institution/author pair whose retrieval failed with a deferrable error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MissedLookup {
    /// Institution the author was being scored for.
    pub institution: String,

    /// Author name as listed in the roster.
    pub author: String,

    /// Year of a failed year-partitioned query. `None` for the single-call search.
    pub year: Option<i32>,
}

impl MissedLookup {
    #[must_use]
    pub fn new(institution: impl Into<String>, author: impl Into<String>) -> Self {
        Self { institution: institution.into(), author: author.into(), year: None }
    }

    #[must_use]
    pub fn for_year(institution: impl Into<String>, author: impl Into<String>, year: i32) -> Self {
        Self { year: Some(year), ..Self::new(institution, author) }
    }
}

/// Set of pending missed lookups, owned by whoever drives the run.
#[derive(Debug, Clone, Default)]
pub struct MissedLookups {
    entries: BTreeSet<MissedLookup>,
}

impl MissedLookups {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a pair for the single-call search. Returns false if it was already pending.
    pub fn record(&mut self, institution: &str, author: &str) -> bool {
        self.insert(MissedLookup::new(institution, author))
    }

    /// Queue one year of a partitioned search. Returns false if it was already pending.
    pub fn record_year(&mut self, institution: &str, author: &str, year: i32) -> bool {
        self.insert(MissedLookup::for_year(institution, author, year))
    }

    fn insert(&mut self, lookup: MissedLookup) -> bool {
        if self.entries.contains(&lookup) {
            return false;
        }
        tracing::warn!(
            institution = %lookup.institution,
            author = %lookup.author,
            year = ?lookup.year,
            "Deferred lookup for later retry"
        );
        self.entries.insert(lookup)
    }

    /// Drop a pair after it has been retried successfully.
    pub fn resolve(&mut self, lookup: &MissedLookup) -> bool {
        self.entries.remove(lookup)
    }

    /// Snapshot of pending pairs, safe to iterate while resolving.
    #[must_use]
    pub fn snapshot(&self) -> Vec<MissedLookup> {
        self.entries.iter().cloned().collect()
    }

    /// Whether any lookup, single-call or per-year, is pending for the pair.
    #[must_use]
    pub fn contains(&self, institution: &str, author: &str) -> bool {
        // `None` sorts before every year, so the first entry at or after it decides.
        self.entries
            .range(MissedLookup::new(institution, author)..)
            .next()
            .is_some_and(|m| m.institution == institution && m.author == author)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
