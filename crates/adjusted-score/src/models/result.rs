//! Per-institution score tree.
//!
//! Nested maps are materialized on first use with zero-valued defaults, so
//! an area, venue or year only appears once something was credited to it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Area;

/// Results for every scored institution, keyed by institution name.
pub type Rankings = BTreeMap<String, InstitutionResult>;

/// Accumulated scores for one institution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstitutionResult {
    /// Sum of every credited fraction across all authors.
    #[serde(default)]
    pub total_score: f64,

    /// Institution-wide score per area.
    #[serde(default)]
    pub area_scores: BTreeMap<Area, f64>,

    /// Institution-wide qualifying publication count per area.
    #[serde(default)]
    pub area_paper_counts: BTreeMap<Area, u64>,

    /// Author records keyed by roster name.
    #[serde(default)]
    pub authors: BTreeMap<String, AuthorRecord>,

    /// Number of authors, filled in by the final enrichment pass.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_count: Option<usize>,
}

impl InstitutionResult {
    /// Create a result with an empty record for each author.
    #[must_use]
    pub fn with_authors<I, S>(authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            authors: authors.into_iter().map(|a| (a.into(), AuthorRecord::default())).collect(),
            ..Self::default()
        }
    }

    /// Get the author's record, creating an empty one if absent.
    pub fn author_entry(&mut self, author: &str) -> &mut AuthorRecord {
        self.authors.entry(author.to_string()).or_default()
    }

    /// Sum of every author's area contributions.
    #[must_use]
    pub fn authors_total(&self) -> f64 {
        self.authors.values().map(AuthorRecord::contributed_score).sum()
    }

    /// Reset `total_score` to the sum of author contributions.
    pub fn recompute_total(&mut self) {
        self.total_score = self.authors_total();
    }
}

/// One author's contributions to an institution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthorRecord {
    /// Canonical DBLP profile URL, when it could be resolved.
    #[serde(default)]
    pub dblp_link: Option<String>,

    /// Qualifying publications credited to this author.
    #[serde(default)]
    pub paper_count: u64,

    /// Score per area, serialized as one top-level key per area.
    #[serde(flatten)]
    pub area_scores: BTreeMap<Area, f64>,

    /// Per-area breakdown by venue and year.
    #[serde(default)]
    pub area_paper_counts: BTreeMap<Area, AreaDetail>,
}

impl AuthorRecord {
    /// Sum of this author's per-area scores. Counts and links are excluded.
    #[must_use]
    pub fn contributed_score(&self) -> f64 {
        self.area_scores.values().sum()
    }
}

/// An author's breakdown within a single area.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AreaDetail {
    /// Sum of all venue/year scores in this area.
    #[serde(default)]
    pub area_adjusted_score: f64,

    /// Venue name -> publication year -> bucket.
    #[serde(flatten)]
    pub venues: BTreeMap<String, BTreeMap<String, YearBucket>>,
}

impl AreaDetail {
    /// Get the bucket for a venue and year, creating it if absent.
    pub fn bucket(&mut self, venue: &str, year: &str) -> &mut YearBucket {
        self.venues.entry(venue.to_string()).or_default().entry(year.to_string()).or_default()
    }

    /// Sum of every bucket score.
    #[must_use]
    pub fn bucket_total(&self) -> f64 {
        self.venues.values().flat_map(BTreeMap::values).map(|b| b.score).sum()
    }
}

/// Score and publication count for one venue in one year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct YearBucket {
    pub score: f64,
    pub year_paper_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_with_authors_initializes_empty_records() {
        let result = InstitutionResult::with_authors(["Jane Doe", "John Roe"]);
        assert_eq!(result.authors.len(), 2);
        assert_eq!(result.authors["Jane Doe"], AuthorRecord::default());
        assert!(result.total_score.abs() < f64::EPSILON);
    }

    #[test]
    fn test_recompute_total_excludes_bookkeeping() {
        let mut result = InstitutionResult::with_authors(["Jane Doe"]);
        let record = result.author_entry("Jane Doe");
        record.paper_count = 7;
        record.dblp_link = Some("https://dblp.org/pid/1".into());
        record.area_scores.insert(Area::OperatingSystems, 0.5);
        record.area_scores.insert(Area::Databases, 0.25);

        result.recompute_total();
        assert!((result.total_score - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_author_record_serializes_areas_at_top_level() {
        let mut record = AuthorRecord::default();
        record.paper_count = 1;
        record.area_scores.insert(Area::OperatingSystems, 0.5);
        let detail = record.area_paper_counts.entry(Area::OperatingSystems).or_default();
        detail.area_adjusted_score = 0.5;
        *detail.bucket("SOSP", "2019") = YearBucket { score: 0.5, year_paper_count: 1 };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({
                "dblp_link": null,
                "paper_count": 1,
                "operating_systems": 0.5,
                "area_paper_counts": {
                    "operating_systems": {
                        "area_adjusted_score": 0.5,
                        "SOSP": {"2019": {"score": 0.5, "year_paper_count": 1}}
                    }
                }
            })
        );
    }

    #[test]
    fn test_author_count_only_serialized_after_enrichment() {
        let mut result = InstitutionResult::with_authors(["Jane Doe"]);
        let value = serde_json::to_value(&result).unwrap();
        assert!(value.get("author_count").is_none());

        result.author_count = Some(1);
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["author_count"], 1);
    }
}
