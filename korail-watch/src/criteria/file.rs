//! JSON criteria file.

use std::path::{Path, PathBuf};

use crate::config::ConfigError;
use crate::domain::SearchCriterion;

use super::record::{CriterionRecord, validate_records};

/// Default file name for the criteria list.
pub const DEFAULT_CRITERIA_FILE: &str = "search_configs.json";

/// The criteria list on disk.
///
/// The reservation loop reads it once per run through [`CriteriaFile::load`];
/// the web panel reads and rewrites the raw records.
#[derive(Debug, Clone)]
pub struct CriteriaFile {
    path: PathBuf,
}

impl CriteriaFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and validate the criteria, in file order.
    ///
    /// Fails if the file is missing, is not a JSON array of records, or any
    /// record is invalid. An empty list is returned as-is; the loop rejects it.
    pub fn load(&self) -> Result<Vec<SearchCriterion>, ConfigError> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::Read {
            path: self.path.display().to_string(),
            source: e,
        })?;
        parse_criteria(&contents).map_err(|e| match e {
            ConfigError::Malformed { message, .. } => ConfigError::Malformed {
                path: self.path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    /// Read the raw records without validating them.
    ///
    /// A missing file reads as an empty list, so a fresh install shows an
    /// empty editor instead of an error.
    pub fn read_records(&self) -> Result<Vec<CriterionRecord>, ConfigError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::Read {
            path: self.path.display().to_string(),
            source: e,
        })?;
        serde_json::from_str(&contents).map_err(|e| ConfigError::Malformed {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Validate and write records, replacing the file.
    ///
    /// Nothing is written if any record is invalid.
    pub fn write_records(&self, records: &[CriterionRecord]) -> Result<(), ConfigError> {
        validate_records(records)?;

        let json = serde_json::to_string_pretty(records).map_err(|e| ConfigError::Malformed {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }

        std::fs::write(&self.path, json + "\n").map_err(|e| ConfigError::Write {
            path: self.path.display().to_string(),
            source: e,
        })
    }
}

impl Default for CriteriaFile {
    fn default() -> Self {
        Self::new(DEFAULT_CRITERIA_FILE)
    }
}

/// Parse and validate a criteria list from JSON text.
pub fn parse_criteria(json: &str) -> Result<Vec<SearchCriterion>, ConfigError> {
    let records: Vec<CriterionRecord> =
        serde_json::from_str(json).map_err(|e| ConfigError::Malformed {
            path: "criteria".to_string(),
            message: e.to_string(),
        })?;
    validate_records(&records)
}
