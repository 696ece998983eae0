//! Calendar document importer.
//!
//! Reads calendar definitions from JSON documents on disk and validates them
//! before they reach the registry.

use std::path::{Path, PathBuf};

use almanac_domain::{CalendarDefinition, CalendarError};
use thiserror::Error;
use tokio::fs;

/// Errors that can occur during import.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Calendar directory not found: {0}")]
    DirectoryNotFound(PathBuf),
    #[error("Invalid calendar: {0}")]
    Calendar(#[from] CalendarError),
}

/// Importer for a directory of calendar documents.
pub struct CalendarImporter {
    calendar_dir: PathBuf,
}

impl CalendarImporter {
    /// Create a new importer pointing to a directory of `*.json` documents.
    pub fn new(calendar_dir: impl Into<PathBuf>) -> Self {
        Self {
            calendar_dir: calendar_dir.into(),
        }
    }

    pub fn calendar_dir(&self) -> &Path {
        &self.calendar_dir
    }

    /// Parse and validate a single calendar document.
    pub async fn load_file(&self, path: impl AsRef<Path>) -> Result<CalendarDefinition, ImportError> {
        let content = fs::read_to_string(path.as_ref()).await?;
        let definition: CalendarDefinition = serde_json::from_str(&content)?;
        definition.validate()?;
        Ok(definition)
    }

    /// Load every `*.json` document in the directory, in file-name order.
    ///
    /// Documents that cannot be read, parsed or validated are logged and
    /// skipped.
    pub async fn load_all(&self) -> Result<Vec<CalendarDefinition>, ImportError> {
        if !self.calendar_dir.is_dir() {
            return Err(ImportError::DirectoryNotFound(self.calendar_dir.clone()));
        }

        let mut paths = Vec::new();
        let mut entries = fs::read_dir(&self.calendar_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut definitions = Vec::with_capacity(paths.len());
        for path in paths {
            match self.load_file(&path).await {
                Ok(definition) => definitions.push(definition),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping calendar document");
                }
            }
        }

        tracing::debug!(
            dir = %self.calendar_dir.display(),
            count = definitions.len(),
            "Read calendar documents"
        );
        Ok(definitions)
    }
}
