//! End-to-end run over all eligible institutions.
//!
//! Stages run strictly in order:
//! `EnumerateInstitutions -> ProcessEachInstitution -> DeferredRetry -> Enrich -> Done`.
//! The result mapping and the missed-lookup set are owned here and lent to
//! the components that mutate them.

use std::time::{Duration, Instant};

use chrono::Local;

use super::institution::InstitutionProcessor;
use super::roster::{InstitutionValidator, Roster};
use super::store::{ResultStore, final_document_name};
use crate::client::DblpClient;
use crate::config::Config;
use crate::config::pipeline::CHECKPOINT_NAME;
use crate::error::PipelineResult;
use crate::models::{InstitutionResult, MissedLookup, MissedLookups, Rankings};
use crate::scoring::ScoreAggregator;

/// Pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    EnumerateInstitutions,
    ProcessEachInstitution,
    DeferredRetry,
    Enrich,
    Done,
}

/// What a completed run did.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Institutions processed in the main pass.
    pub institutions: usize,
    /// Deferred-retry passes run.
    pub retry_passes: u32,
    /// Lookups still failing after the last retry pass. Not in the output.
    pub abandoned: Vec<MissedLookup>,
    /// Name the final document was written under.
    pub final_document: String,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

/// Drives one run. Collaborators are borrowed for the lifetime of the run.
pub struct PipelineDriver<'a> {
    config: &'a Config,
    client: &'a DblpClient,
    roster: &'a dyn Roster,
    validator: &'a dyn InstitutionValidator,
    store: &'a dyn ResultStore,
    results: Rankings,
    missed: MissedLookups,
    stage: Stage,
}

impl<'a> PipelineDriver<'a> {
    #[must_use]
    pub fn new(
        config: &'a Config,
        client: &'a DblpClient,
        roster: &'a dyn Roster,
        validator: &'a dyn InstitutionValidator,
        store: &'a dyn ResultStore,
    ) -> Self {
        Self {
            config,
            client,
            roster,
            validator,
            store,
            results: Rankings::new(),
            missed: MissedLookups::new(),
            stage: Stage::EnumerateInstitutions,
        }
    }

    #[must_use]
    pub const fn stage(&self) -> Stage {
        self.stage
    }

    #[must_use]
    pub const fn results(&self) -> &Rankings {
        &self.results
    }

    #[must_use]
    pub const fn missed(&self) -> &MissedLookups {
        &self.missed
    }

    pub fn missed_mut(&mut self) -> &mut MissedLookups {
        &mut self.missed
    }

    #[must_use]
    pub fn into_results(self) -> Rankings {
        self.results
    }

    /// Run every stage to completion.
    ///
    /// # Errors
    ///
    /// Returns error on a fatal failure during the main pass. The last
    /// checkpoint stays on disk.
    pub async fn run(&mut self) -> PipelineResult<RunSummary> {
        let started = Instant::now();

        let institutions = self.enumerate_institutions();
        self.process_institutions(&institutions).await?;
        let retry_passes = self.retry_missed().await;
        let final_document = self.enrich();

        let elapsed = started.elapsed();
        tracing::info!(
            elapsed = %format_elapsed(elapsed),
            institutions = institutions.len(),
            retry_passes,
            abandoned = self.missed.len(),
            %final_document,
            "Run complete (days:hours:minutes:seconds)"
        );

        Ok(RunSummary {
            institutions: institutions.len(),
            retry_passes,
            abandoned: self.missed.snapshot(),
            final_document,
            elapsed,
        })
    }

    /// Distinct roster affiliations that are recognized and not denylisted.
    pub fn enumerate_institutions(&mut self) -> Vec<String> {
        self.transition(Stage::EnumerateInstitutions);

        let affiliations = self.roster.affiliations();
        let candidates = affiliations.len();
        let institutions: Vec<String> = affiliations
            .into_iter()
            .filter(|a| self.validator.is_recognized(a))
            .filter(|a| !self.config.denylist.contains(a))
            .collect();

        tracing::info!(candidates, eligible = institutions.len(), "Enumerated institutions");
        institutions
    }

    /// Score each institution, checkpointing after every one.
    ///
    /// # Errors
    ///
    /// Returns error on a fatal client or scoring failure.
    pub async fn process_institutions(&mut self, institutions: &[String]) -> PipelineResult<()> {
        self.transition(Stage::ProcessEachInstitution);

        let processor = InstitutionProcessor::new(self.client, self.config);
        let total = institutions.len();

        for (done, institution) in institutions.iter().enumerate() {
            let authors = self.roster.authors_of(institution);
            let result = processor.process(institution, &authors, &mut self.missed).await?;
            self.results.insert(institution.clone(), result);
            self.checkpoint();

            let processed = done + 1;
            tracing::info!(
                processed,
                total,
                percent = %format!("{:.2}", processed as f64 / total as f64 * 100.0),
                "Processed institution"
            );
        }
        Ok(())
    }

    /// Retry deferred lookups until none remain or the pass cap is hit.
    ///
    /// Returns the number of passes run. A fatal error ends the retry stage
    /// early and is logged, not returned.
    pub async fn retry_missed(&mut self) -> u32 {
        self.transition(Stage::DeferredRetry);

        let aggregator = ScoreAggregator::from_config(self.config);
        let max_passes = self.config.max_retry_passes;
        let mut pass = 0;

        while !self.missed.is_empty() && pass < max_passes {
            pass += 1;

            for lookup in self.missed.snapshot() {
                match self.retry_lookup(&aggregator, &lookup).await {
                    Ok(true) => {
                        self.missed.resolve(&lookup);
                    }
                    Ok(false) => {}
                    Err(e) => {
                        tracing::error!(
                            pass,
                            error = %e,
                            "Deferred retry failed, stopping retries"
                        );
                        return pass;
                    }
                }
            }
            self.checkpoint();

            if !self.missed.is_empty() {
                tracing::info!(pass, remaining = self.missed.len(), "Lookups still deferred");
                if pass < max_passes {
                    tokio::time::sleep(self.config.retry_interval).await;
                }
            }
        }

        if !self.missed.is_empty() {
            tracing::warn!(
                abandoned = self.missed.len(),
                passes = pass,
                "Giving up on deferred lookups"
            );
        }
        pass
    }

    /// Add derived counts and write the final document. Returns its name.
    pub fn enrich(&mut self) -> String {
        self.transition(Stage::Enrich);

        for result in self.results.values_mut() {
            result.author_count = Some(result.authors.len());
        }

        let name = final_document_name(Local::now().date_naive());
        if let Err(e) = self.store.write(&self.results, &name) {
            tracing::error!(%name, error = %e, "Could not write final results");
        }

        self.transition(Stage::Done);
        name
    }

    /// Re-issue the failed search for one lookup: the single call, or the one
    /// year that failed. `Ok(false)` if still deferred.
    async fn retry_lookup(
        &mut self,
        aggregator: &ScoreAggregator,
        lookup: &MissedLookup,
    ) -> PipelineResult<bool> {
        let fetched = self.client.search_publications(&lookup.author, lookup.year).await?;
        let Some(payload) = fetched.into_payload() else {
            return Ok(false);
        };

        let result = self.results.entry(lookup.institution.clone()).or_insert_with(|| {
            tracing::info!(institution = %lookup.institution, "Deferred retry added institution");
            InstitutionResult::default()
        });
        if !result.authors.contains_key(&lookup.author) {
            tracing::info!(author = %lookup.author, "Deferred retry added author");
        }
        result.author_entry(&lookup.author);

        aggregator.apply(&payload, result, &lookup.author)?;
        tracing::info!(
            institution = %lookup.institution,
            author = %lookup.author,
            year = ?lookup.year,
            "Deferred lookup resolved"
        );
        Ok(true)
    }

    fn checkpoint(&self) {
        if let Err(e) = self.store.write(&self.results, CHECKPOINT_NAME) {
            tracing::error!(error = %e, "Could not write checkpoint");
        }
    }

    fn transition(&mut self, next: Stage) {
        tracing::debug!(from = ?self.stage, to = ?next, "Pipeline stage");
        self.stage = next;
    }
}

impl std::fmt::Debug for PipelineDriver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineDriver")
            .field("stage", &self.stage)
            .field("institutions", &self.results.len())
            .field("missed", &self.missed.len())
            .finish_non_exhaustive()
    }
}

/// Format a duration as `DD:HH:MM:SS`.
#[must_use]
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let (days, rem) = (secs / 86_400, secs % 86_400);
    let (hours, rem) = (rem / 3_600, rem % 3_600);
    let (minutes, seconds) = (rem / 60, rem % 60);
    format!("{days:02}:{hours:02}:{minutes:02}:{seconds:02}")
}
