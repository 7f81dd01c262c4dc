//! Roster and institution-name sources.

use std::collections::{BTreeSet, HashSet};
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use serde::Deserialize;

use crate::error::PipelineResult;

/// Source of institutions and their affiliated authors.
pub trait Roster {
    /// Distinct affiliation values.
    fn affiliations(&self) -> BTreeSet<String>;

    /// Author names affiliated with `institution`, one per unique author id.
    fn authors_of(&self, institution: &str) -> Vec<String>;
}

/// Decides whether a roster affiliation is a recognized institution.
pub trait InstitutionValidator {
    fn is_recognized(&self, institution: &str) -> bool;
}

/// One roster row. Extra CSV columns are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RosterEntry {
    pub name: String,
    pub affiliation: String,
    pub scholarid: String,
}

/// Roster backed by a CSV file with `name`, `affiliation` and `scholarid` headers.
#[derive(Debug, Clone, Default)]
pub struct CsvRoster {
    entries: Vec<RosterEntry>,
}

impl CsvRoster {
    /// Load a roster from a CSV file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or a row is malformed.
    pub fn from_path(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let reader = ReaderBuilder::new().has_headers(true).trim(Trim::All).from_path(path)?;
        Self::from_csv(reader)
    }

    /// Load a roster from any CSV source.
    ///
    /// # Errors
    ///
    /// Returns error if a row is malformed.
    pub fn from_reader<R: Read>(rdr: R) -> PipelineResult<Self> {
        let reader = ReaderBuilder::new().has_headers(true).trim(Trim::All).from_reader(rdr);
        Self::from_csv(reader)
    }

    #[must_use]
    pub fn from_entries(entries: Vec<RosterEntry>) -> Self {
        Self { entries }
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>) -> PipelineResult<Self> {
        let entries = reader.deserialize().collect::<Result<Vec<RosterEntry>, _>>()?;
        tracing::info!(rows = entries.len(), "Loaded roster");
        Ok(Self { entries })
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

impl Roster for CsvRoster {
    fn affiliations(&self) -> BTreeSet<String> {
        self.entries.iter().map(|e| e.affiliation.clone()).collect()
    }

    fn authors_of(&self, institution: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .filter(|e| e.affiliation == institution)
            .filter(|e| seen.insert(e.scholarid.as_str()))
            .map(|e| e.name.clone())
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct UniversityRecord {
    name: String,
    #[serde(default)]
    alias: Option<String>,
}

const NO_ALIAS: &str = "NOT AVAILABLE";

/// Recognizes institutions by substring match against known names and aliases.
#[derive(Debug, Clone, Default)]
pub struct UniversityFinder {
    names: BTreeSet<String>,
}

impl UniversityFinder {
    /// Load a JSON array of `{ "name": ..., "alias": "A|B" }` records.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or is not such an array.
    pub fn from_path(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    /// Parse the JSON records from a string.
    ///
    /// # Errors
    ///
    /// Returns error if the input is not an array of records.
    pub fn from_json(data: &str) -> PipelineResult<Self> {
        let records: Vec<UniversityRecord> = serde_json::from_str(data)?;

        let mut names = BTreeSet::new();
        for record in records {
            names.insert(record.name.trim().to_uppercase());
            if let Some(alias) = record.alias.filter(|a| a.trim() != NO_ALIAS) {
                names.extend(
                    alias
                        .split('|')
                        .map(str::trim)
                        .filter(|a| !a.is_empty())
                        .map(str::to_uppercase),
                );
            }
        }

        tracing::info!(names = names.len(), "Loaded institution names");
        Ok(Self { names })
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self { names: names.into_iter().map(|n| n.as_ref().to_uppercase()).collect() }
    }
}

impl InstitutionValidator for UniversityFinder {
    fn is_recognized(&self, institution: &str) -> bool {
        let needle = institution.trim().to_uppercase();
        !needle.is_empty() && self.names.iter().any(|name| name.contains(&needle))
    }
}
