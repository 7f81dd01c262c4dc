//! Adjusted score pipeline - Entry Point
//!
//! Scores every eligible institution on the roster and writes the results.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use adjusted_score::pipeline::{CsvRoster, JsonFileStore, PipelineDriver, UniversityFinder};
use adjusted_score::{Config, DblpClient};

#[derive(Parser, Debug)]
#[command(name = "adjusted-score")]
#[command(about = "Compute DBLP-based adjusted research scores per institution")]
#[command(version)]
struct Cli {
    /// Roster CSV with name, affiliation and scholarid columns
    #[arg(long, default_value = "files/csrankings.csv", env = "ROSTER_CSV")]
    roster: PathBuf,

    /// JSON list of known institutions ({"name", "alias"} records)
    #[arg(
        long,
        default_value = "files/us-colleges-and-universities.json",
        env = "INSTITUTIONS_JSON"
    )]
    institutions: PathBuf,

    /// Directory for checkpoints and the final document
    #[arg(long, default_value = ".", env = "OUTPUT_DIR")]
    output_dir: PathBuf,

    /// Minimum page count for a qualifying publication
    #[arg(long, env = "MIN_PAGE_COUNT")]
    min_page_count: Option<u32>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        subscriber.with(tracing_subscriber::fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        roster = %cli.roster.display(),
        output_dir = %cli.output_dir.display(),
        "Generating scores for all institutions"
    );

    let mut config = Config::from_env()?;
    config.output_dir = cli.output_dir;
    if let Some(min_page_count) = cli.min_page_count {
        config.min_page_count = min_page_count;
    }

    let client = DblpClient::new(&config)?;
    let roster = CsvRoster::from_path(&cli.roster)?;
    let finder = UniversityFinder::from_path(&cli.institutions)?;
    let store = JsonFileStore::new(&config.output_dir);

    let mut driver = PipelineDriver::new(&config, &client, &roster, &finder, &store);
    let summary = driver.run().await?;

    if !summary.abandoned.is_empty() {
        tracing::warn!(
            abandoned = summary.abandoned.len(),
            "Some authors could not be retrieved and are missing from the output"
        );
    }

    Ok(())
}
