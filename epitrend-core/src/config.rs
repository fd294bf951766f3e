//! Pipeline configuration.
//!
//! Stored as TOML. Every key is optional; the defaults cover a
//! five-country analysis of the Our World in Data dataset.

use crate::data::{ObservationSchema, SourceLocator};
use crate::pipeline::SelectionConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_SOURCE: &str = "https://covid.ourworldindata.org/data/owid-covid-data.csv";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {reason}")]
    Io { path: PathBuf, reason: String },

    #[error("parse config TOML: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// The complete pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// URL or local path of the CSV.
    pub source: String,
    /// HTTP timeout for remote sources.
    pub timeout_secs: u64,
    /// Entity allow-list, in display order.
    pub entities: Vec<String>,
    /// Column projection applied by the selector.
    pub columns: Vec<String>,
    pub entity_column: String,
    pub date_column: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let schema = ObservationSchema::default();
        Self {
            source: DEFAULT_SOURCE.into(),
            timeout_secs: 120,
            entities: ["Kenya", "United States", "India", "Germany", "Brazil"]
                .into_iter()
                .map(String::from)
                .collect(),
            columns: schema.default_columns(),
            entity_column: schema.entity_column,
            date_column: schema.date_column,
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.trim().is_empty() {
            return Err(ConfigError::Invalid("source must not be empty".into()));
        }
        for required in [&self.entity_column, &self.date_column] {
            if !self.columns.iter().any(|c| c == required) {
                return Err(ConfigError::Invalid(format!(
                    "columns must include '{required}'"
                )));
            }
        }
        Ok(())
    }

    pub fn locator(&self) -> SourceLocator {
        SourceLocator::parse(&self.source)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn schema(&self) -> ObservationSchema {
        ObservationSchema {
            entity_column: self.entity_column.clone(),
            date_column: self.date_column.clone(),
            ..ObservationSchema::default()
        }
    }

    pub fn selection(&self) -> SelectionConfig {
        SelectionConfig {
            entity_column: self.entity_column.clone(),
            entities: self.entities.clone(),
            columns: self.columns.clone(),
        }
    }
}
