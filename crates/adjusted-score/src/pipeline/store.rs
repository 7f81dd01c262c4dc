//! Persistence of result documents.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::config::pipeline::FINAL_NAME_PREFIX;
use crate::error::PipelineResult;
use crate::models::Rankings;

/// Writes the full result mapping under a name, replacing earlier content.
pub trait ResultStore {
    /// # Errors
    ///
    /// Returns error if the document cannot be written.
    fn write(&self, results: &Rankings, name: &str) -> PipelineResult<()>;
}

/// Pretty-printed JSON files in one directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

impl ResultStore for JsonFileStore {
    fn write(&self, results: &Rankings, name: &str) -> PipelineResult<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(name);

        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, results)?;
        writer.flush()?;

        tracing::info!(path = %path.display(), institutions = results.len(), "Wrote results");
        Ok(())
    }
}

/// Name of the final document for a run completed on `date`,
/// e.g. `all-school-scores-final-October-19-2026.json`.
#[must_use]
pub fn final_document_name(date: NaiveDate) -> String {
    format!("{FINAL_NAME_PREFIX}-{}.json", date.format("%B-%d-%Y"))
}
