//! Configuration for the adjusted-score pipeline.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{Datelike, Utc};

/// DBLP API configuration constants.
pub mod api {
    use std::time::Duration;

    /// Publication search endpoint.
    pub const PUBLICATION_API: &str = "https://dblp.uni-trier.de/search/publ/api";

    /// Author profile search endpoint.
    pub const AUTHOR_API: &str = "https://dblp.dagstuhl.de/search/author/api";

    /// Hits requested per call. DBLP never returns more than this.
    pub const HITS_PER_REQUEST: u32 = 1000;

    /// Request timeout.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Fixed wait after an HTTP 429 before the next attempt (3 minutes).
    pub const RATE_LIMIT_BACKOFF: Duration = Duration::from_secs(180);

    /// Attempts per call when rate limited, including the first one.
    pub const RATE_LIMIT_ATTEMPTS: u32 = 3;

    /// Maximum cached author profiles.
    pub const PROFILE_CACHE_SIZE: u64 = 50_000;
}

/// Scoring constants.
pub mod scoring {
    /// Minimum page count for a publication to qualify.
    pub const MIN_PAGE_COUNT: u32 = 12;

    /// Total hit count at which a single search is considered truncated.
    pub const TRUNCATION_THRESHOLD: u64 = 1000;

    /// First publication year queried when partitioning by year.
    pub const FIRST_YEAR: i32 = 1935;
}

/// Pipeline constants.
pub mod pipeline {
    use std::time::Duration;

    /// Maximum number of deferred-retry passes.
    pub const MAX_RETRY_PASSES: u32 = 16;

    /// Sleep between deferred-retry passes (10 minutes).
    pub const RETRY_INTERVAL: Duration = Duration::from_secs(600);

    /// Checkpoint document name, overwritten after each institution.
    pub const CHECKPOINT_NAME: &str = "all-school-scores.json";

    /// Prefix of the final, enriched document name.
    pub const FINAL_NAME_PREFIX: &str = "all-school-scores-final";

    /// Roster affiliations known to produce bad data.
    pub const DENYLIST: &[&str] = &["HUST", "UFF", "UNSW", "Heidelberg University", "JUST", "CMI"];
}

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Publication search endpoint.
    pub publication_api_url: String,

    /// Author profile search endpoint.
    pub author_api_url: String,

    /// Request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Wait between rate-limited attempts.
    pub rate_limit_backoff: Duration,

    /// Attempts per call when rate limited.
    pub rate_limit_attempts: u32,

    /// Minimum page count for a qualifying publication.
    pub min_page_count: u32,

    /// Hit count at which retrieval switches to per-year queries.
    pub truncation_threshold: u64,

    /// First year of the per-year partition.
    pub first_year: i32,

    /// Last year of the per-year partition.
    pub last_year: i32,

    /// Maximum deferred-retry passes.
    pub max_retry_passes: u32,

    /// Sleep between deferred-retry passes.
    pub retry_interval: Duration,

    /// Institutions excluded from every run.
    pub denylist: Vec<String>,

    /// Directory checkpoints and the final document are written to.
    pub output_dir: PathBuf,
}

impl Config {
    /// Create the production configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            publication_api_url: api::PUBLICATION_API.to_string(),
            author_api_url: api::AUTHOR_API.to_string(),
            request_timeout: api::REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            rate_limit_backoff: api::RATE_LIMIT_BACKOFF,
            rate_limit_attempts: api::RATE_LIMIT_ATTEMPTS,
            min_page_count: scoring::MIN_PAGE_COUNT,
            truncation_threshold: scoring::TRUNCATION_THRESHOLD,
            first_year: scoring::FIRST_YEAR,
            last_year: Utc::now().year(),
            max_retry_passes: pipeline::MAX_RETRY_PASSES,
            retry_interval: pipeline::RETRY_INTERVAL,
            denylist: pipeline::DENYLIST.iter().map(ToString::to_string).collect(),
            output_dir: PathBuf::from("."),
        }
    }

    /// Create a test configuration pointing at a mock server.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            publication_api_url: format!("{}/search/publ/api", base_url),
            author_api_url: format!("{}/search/author/api", base_url),
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            rate_limit_backoff: Duration::from_millis(0), // No waiting in tests
            retry_interval: Duration::from_millis(0),
            ..Self::new()
        }
    }

    /// Create configuration from the environment (and a `.env` file, if any).
    ///
    /// # Errors
    ///
    /// Returns error if a numeric override does not parse.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let mut config = Self::new();
        if let Ok(url) = std::env::var("DBLP_PUBLICATION_API") {
            config.publication_api_url = url;
        }
        if let Ok(url) = std::env::var("DBLP_AUTHOR_API") {
            config.author_api_url = url;
        }
        if let Ok(secs) = std::env::var("DBLP_RATE_LIMIT_BACKOFF_SECS") {
            config.rate_limit_backoff = Duration::from_secs(secs.parse()?);
        }
        if let Ok(secs) = std::env::var("DBLP_RETRY_INTERVAL_SECS") {
            config.retry_interval = Duration::from_secs(secs.parse()?);
        }
        Ok(config)
    }

    /// Years queried when an author's hits are truncated.
    #[must_use]
    pub fn year_range(&self) -> std::ops::RangeInclusive<i32> {
        self.first_year..=self.last_year
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
