//! Fractional credit accumulation into an institution's score tree.

use crate::config::Config;
use crate::error::ScoreError;
use crate::models::{Area, InstitutionResult, PublicationHit, SearchResponse};

use super::{pages, venue};

/// What one payload contributed.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BatchSummary {
    /// Records in the payload.
    pub hits: usize,
    /// Records that qualified and were credited.
    pub credited: usize,
    /// Sum of credited fractions.
    pub score: f64,
}

/// Classifies, filters and credits publication hits.
#[derive(Debug, Clone, Copy)]
pub struct ScoreAggregator {
    min_page_count: u32,
}

impl ScoreAggregator {
    #[must_use]
    pub const fn new(min_page_count: u32) -> Self {
        Self { min_page_count }
    }

    #[must_use]
    pub const fn from_config(config: &Config) -> Self {
        Self::new(config.min_page_count)
    }

    /// Area a hit is credited to, or `None` if it does not qualify.
    #[must_use]
    pub fn qualify(&self, hit: &PublicationHit) -> Option<Area> {
        let area = venue::classify(hit.venue.as_deref()?)?;
        let pages = pages::count_pages(hit.pages.as_deref());
        (pages >= self.min_page_count).then_some(area)
    }

    /// Credit every qualifying hit in `payload` to `author`.
    ///
    /// Accumulates: applying the same payload twice credits it twice.
    ///
    /// # Errors
    ///
    /// Returns [`ScoreError::UnknownAuthor`] if a hit qualifies and `author`
    /// has no record in `result`. Hits credited before the failure stay.
    pub fn apply(
        &self,
        payload: &SearchResponse,
        result: &mut InstitutionResult,
        author: &str,
    ) -> Result<BatchSummary, ScoreError> {
        let mut summary = BatchSummary::default();

        for hit in payload.publications() {
            summary.hits += 1;

            let Some(area) = self.qualify(&hit) else {
                continue;
            };
            let score = fractional_credit(hit.author_count);
            let venue = hit.venue.as_deref().unwrap_or_default();

            credit(result, author, area, venue, &hit.year, score)?;

            summary.credited += 1;
            summary.score += score;
        }

        tracing::debug!(
            author,
            hits = summary.hits,
            credited = summary.credited,
            score = summary.score,
            "Applied payload"
        );
        Ok(summary)
    }
}

/// Each listed author's share of a publication. Zero authors credit nothing.
#[must_use]
pub fn fractional_credit(author_count: usize) -> f64 {
    if author_count == 0 { 0.0 } else { 1.0 / author_count as f64 }
}

fn credit(
    result: &mut InstitutionResult,
    author: &str,
    area: Area,
    venue: &str,
    year: &str,
    score: f64,
) -> Result<(), ScoreError> {
    let Some(record) = result.authors.get_mut(author) else {
        tracing::error!(author, %area, venue, "Author missing from institution result");
        return Err(ScoreError::UnknownAuthor { author: author.to_string() });
    };

    *record.area_scores.entry(area).or_default() += score;
    record.paper_count += 1;

    let detail = record.area_paper_counts.entry(area).or_default();
    detail.area_adjusted_score += score;

    let bucket = detail.bucket(venue, year);
    bucket.score += score;
    bucket.year_paper_count += 1;

    *result.area_scores.entry(area).or_default() += score;
    *result.area_paper_counts.entry(area).or_default() += 1;
    result.total_score += score;

    Ok(())
}
