//! Venue classification, page counting and score accumulation.

pub mod aggregator;
pub mod pages;
pub mod venue;

pub use aggregator::{BatchSummary, ScoreAggregator, fractional_credit};
pub use pages::count_pages;
pub use venue::classify;
