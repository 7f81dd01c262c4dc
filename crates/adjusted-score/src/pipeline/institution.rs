//! Scores every author of one institution.

use crate::client::{DblpClient, Fetched};
use crate::config::Config;
use crate::error::PipelineResult;
use crate::models::{InstitutionResult, MissedLookups};
use crate::scoring::ScoreAggregator;

/// Retrieves each author's publications and accumulates them into one
/// institution's result.
#[derive(Debug)]
pub struct InstitutionProcessor<'a> {
    client: &'a DblpClient,
    aggregator: ScoreAggregator,
    years: std::ops::RangeInclusive<i32>,
}

impl<'a> InstitutionProcessor<'a> {
    #[must_use]
    pub fn new(client: &'a DblpClient, config: &Config) -> Self {
        Self {
            client,
            aggregator: ScoreAggregator::from_config(config),
            years: config.year_range(),
        }
    }

    #[must_use]
    pub const fn aggregator(&self) -> &ScoreAggregator {
        &self.aggregator
    }

    /// Score an institution from its author list.
    ///
    /// Deferred lookups are recorded in `missed` and do not fail the call.
    ///
    /// # Errors
    ///
    /// Returns error on a fatal client failure or a scoring error.
    pub async fn process(
        &self,
        institution: &str,
        authors: &[String],
        missed: &mut MissedLookups,
    ) -> PipelineResult<InstitutionResult> {
        tracing::info!(institution, authors = authors.len(), "Calculating institution score");

        let mut result = InstitutionResult::with_authors(authors.iter().cloned());
        for author in authors {
            self.process_author(institution, author, &mut result, missed).await?;
        }

        result.recompute_total();
        tracing::info!(institution, total_score = result.total_score, "Institution scored");
        Ok(result)
    }

    /// Score one author into `result`.
    ///
    /// # Errors
    ///
    /// Returns error on a fatal client failure or a scoring error.
    pub async fn process_author(
        &self,
        institution: &str,
        author: &str,
        result: &mut InstitutionResult,
        missed: &mut MissedLookups,
    ) -> PipelineResult<()> {
        tracing::info!(institution, author, "Retrieving publication score");

        let profile = match self.client.find_author_profile(author).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(author, error = %e, "Could not resolve DBLP profile");
                None
            }
        };
        result.author_entry(author).dblp_link = profile;

        let probe = self.client.probe_publications(author).await?;
        match (probe.below_threshold, probe.payload) {
            (Some(true), Some(payload)) => {
                self.aggregator.apply(&payload, result, author)?;
            }
            (Some(_), Some(_)) => {
                tracing::info!(author, "Hit count truncated, querying year by year");
                self.process_by_year(institution, author, result, missed).await?;
            }
            _ => {
                missed.record(institution, author);
            }
        }
        Ok(())
    }

    async fn process_by_year(
        &self,
        institution: &str,
        author: &str,
        result: &mut InstitutionResult,
        missed: &mut MissedLookups,
    ) -> PipelineResult<()> {
        for year in self.years.clone() {
            match self.client.search_publications(author, Some(year)).await? {
                Fetched::Payload(payload) => {
                    self.aggregator.apply(&payload, result, author)?;
                }
                Fetched::Deferred { status } => {
                    tracing::warn!(author, year, status, "Year query deferred");
                    missed.record_year(institution, author, year);
                }
            }
        }
        Ok(())
    }
}
