//! Per-institution processing and the end-to-end run.

pub mod driver;
pub mod institution;
pub mod roster;
pub mod store;

pub use driver::{PipelineDriver, RunSummary, Stage, format_elapsed};
pub use institution::InstitutionProcessor;
pub use roster::{CsvRoster, InstitutionValidator, Roster, RosterEntry, UniversityFinder};
pub use store::{JsonFileStore, ResultStore, final_document_name};
