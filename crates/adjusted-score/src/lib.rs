//! Adjusted research-output scores for academic institutions.
//!
//! For every author on an institution roster, queries the DBLP search API,
//! classifies each publication by research area, drops short papers, and
//! credits each author `1 / co-author count` per qualifying paper into a
//! nested institution/author/area/venue/year score tree.
//!
//! # Features
//!
//! - **Truncation-aware retrieval**: authors with 1000+ hits are re-queried year by year
//! - **Failure classification**: 429s are retried in place, 500/413s are deferred
//! - **Bounded deferred retries**: up to 16 passes over lookups DBLP could not serve
//! - **Checkpointing**: results are written after every institution
//!
//! # Example
//!
//! ```no_run
//! use adjusted_score::pipeline::{CsvRoster, JsonFileStore, PipelineDriver, UniversityFinder};
//! use adjusted_score::{Config, DblpClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let client = DblpClient::new(&config)?;
//!     let roster = CsvRoster::from_path("csrankings.csv")?;
//!     let finder = UniversityFinder::from_path("us-colleges-and-universities.json")?;
//!     let store = JsonFileStore::new(&config.output_dir);
//!
//!     let mut driver = PipelineDriver::new(&config, &client, &roster, &finder, &store);
//!     driver.run().await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod scoring;

pub use client::DblpClient;
pub use config::Config;
pub use error::{ClientError, PipelineError, ScoreError};
