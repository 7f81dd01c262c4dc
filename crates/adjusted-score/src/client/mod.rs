//! DBLP search API client.
//!
//! Provides async HTTP access with:
//! - Query URL construction for publication and author-profile search
//! - Fixed-wait retry on rate limiting (HTTP 429)
//! - Deferral of server errors and oversized responses (HTTP 500/413)
//! - Caching of resolved author profiles

pub mod retry;

use moka::future::Cache;
use reqwest::Client;
use url::Url;

use crate::config::{Config, api};
use crate::error::{ClientError, ClientResult};
use crate::models::SearchResponse;

pub use retry::{RetryPolicy, RetryPredicate};

/// Outcome of a search call that did not fail fatally.
#[derive(Debug, Clone)]
pub enum Fetched {
    /// Parsed response body.
    Payload(SearchResponse),
    /// DBLP could not serve the query right now; try again in a later pass.
    Deferred {
        /// HTTP status that caused the deferral.
        status: u16,
    },
}

impl Fetched {
    /// The payload, if the call produced one.
    #[must_use]
    pub fn into_payload(self) -> Option<SearchResponse> {
        match self {
            Self::Payload(payload) => Some(payload),
            Self::Deferred { .. } => None,
        }
    }

    #[must_use]
    pub const fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred { .. })
    }
}

/// Result of the first, unpartitioned publication search for an author.
#[derive(Debug, Clone, Default)]
pub struct HitProbe {
    /// Whether the total hit count is below the truncation threshold.
    /// `None` when the call produced no payload.
    pub below_threshold: Option<bool>,

    /// The payload of the unpartitioned search.
    pub payload: Option<SearchResponse>,
}

/// DBLP API client.
#[derive(Clone)]
pub struct DblpClient {
    /// HTTP client.
    client: Client,

    /// Resolved profile URLs by author name.
    profile_cache: Cache<String, Option<String>>,

    /// Publication search endpoint.
    publication_api_url: Url,

    /// Author search endpoint.
    author_api_url: Url,

    /// Retry policy for rate-limited calls.
    retry: RetryPolicy,

    /// Hit count at which an unpartitioned search is considered truncated.
    truncation_threshold: u64,
}

impl DblpClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if an endpoint URL is invalid or the HTTP client cannot
    /// be built.
    pub fn new(config: &Config) -> ClientResult<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .gzip(true)
            .build()?;

        let profile_cache = Cache::builder().max_capacity(api::PROFILE_CACHE_SIZE).build();

        Ok(Self {
            client,
            profile_cache,
            publication_api_url: Url::parse(&config.publication_api_url)?,
            author_api_url: Url::parse(&config.author_api_url)?,
            retry: RetryPolicy::rate_limit(config),
            truncation_threshold: config.truncation_threshold,
        })
    }

    /// Publication search URL for an author, optionally restricted to one year.
    #[must_use]
    pub fn publication_url(&self, author: &str, year: Option<i32>) -> String {
        let term = match year {
            Some(year) => format!("{author} year:{year}:"),
            None => author.to_string(),
        };
        query_url(&self.publication_api_url, &term)
    }

    /// Author-profile search URL.
    #[must_use]
    pub fn author_url(&self, author: &str) -> String {
        query_url(&self.author_api_url, author)
    }

    /// Search an author's publications, optionally for a single year.
    ///
    /// # Errors
    ///
    /// Returns error on a fatal failure: rate limiting that outlasts the
    /// retry policy, any non-deferrable HTTP status, transport errors, or an
    /// unparseable body.
    pub async fn search_publications(
        &self,
        author: &str,
        year: Option<i32>,
    ) -> ClientResult<Fetched> {
        let url = self.publication_url(author, year);
        self.get(&url).await
    }

    /// Run the unpartitioned search and report whether it was truncated.
    ///
    /// # Errors
    ///
    /// Same as [`Self::search_publications`].
    pub async fn probe_publications(&self, author: &str) -> ClientResult<HitProbe> {
        match self.search_publications(author, None).await? {
            Fetched::Payload(payload) => Ok(HitProbe {
                below_threshold: Some(payload.total_hits() < self.truncation_threshold),
                payload: Some(payload),
            }),
            Fetched::Deferred { .. } => Ok(HitProbe::default()),
        }
    }

    /// Resolve an author's canonical DBLP profile URL.
    ///
    /// Returns `Ok(None)` when the author is not found or DBLP deferred the call.
    ///
    /// # Errors
    ///
    /// Same as [`Self::search_publications`].
    pub async fn find_author_profile(&self, author: &str) -> ClientResult<Option<String>> {
        if let Some(cached) = self.profile_cache.get(author).await {
            return Ok(cached);
        }

        let url = self.author_url(author);
        let profile = match self.get(&url).await? {
            Fetched::Payload(payload) => payload.first_profile_url().map(ToString::to_string),
            Fetched::Deferred { .. } => return Ok(None),
        };

        self.profile_cache.insert(author.to_string(), profile.clone()).await;
        Ok(profile)
    }

    /// GET a search URL with rate-limit retries, deferring 500/413.
    async fn get(&self, url: &str) -> ClientResult<Fetched> {
        match self.retry.run(|| self.send(url)).await {
            Ok(payload) => Ok(Fetched::Payload(payload)),
            Err(e) if e.is_deferrable() => {
                let status = e.status().unwrap_or_default();
                tracing::error!(url, status, error = %e, "Deferring lookup");
                Ok(Fetched::Deferred { status })
            }
            Err(e) => {
                tracing::error!(url, error = %e, "Request failed");
                Err(e)
            }
        }
    }

    /// Make a single GET request.
    async fn send(&self, url: &str) -> ClientResult<SearchResponse> {
        let response = self.client.get(url).send().await?;
        tracing::debug!(url, status = response.status().as_u16(), "DBLP response");

        let response = self.handle_response(response).await?;
        let body = response.text().await?;

        serde_json::from_str(&body).map_err(ClientError::from)
    }

    /// Handle API response status codes.
    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> ClientResult<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        match status.as_u16() {
            429 => {
                tracing::info!(
                    wait_secs = self.retry.wait.as_secs(),
                    "Too many requests, backing off"
                );
                Err(ClientError::rate_limited(self.retry.wait))
            }
            413 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::payload_too_large(text))
            }
            500..=599 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::server(status.as_u16(), text))
            }
            _ => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::UnexpectedStatus { status: status.as_u16(), message: text })
            }
        }
    }
}

impl std::fmt::Debug for DblpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DblpClient")
            .field("publication_api_url", &self.publication_api_url.as_str())
            .field("author_api_url", &self.author_api_url.as_str())
            .finish_non_exhaustive()
    }
}

fn query_url(base: &Url, term: &str) -> String {
    let mut url = base.clone();
    url.query_pairs_mut()
        .append_pair("q", term)
        .append_pair("h", &api::HITS_PER_REQUEST.to_string())
        .append_pair("format", "json");
    url.into()
}
