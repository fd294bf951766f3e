//! Fatal pipeline errors.
//!
//! Every variant aborts the run. Undefined ratios in the metrics stage are
//! not errors; they surface as `None`.

use crate::data::DataError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("data unavailable: {0}")]
    DataUnavailable(#[from] DataError),

    #[error("schema mismatch: column '{column}' {reason}")]
    SchemaMismatch { column: String, reason: String },

    #[error("invalid date at row {row}: {value:?}")]
    InvalidDate { row: usize, value: Option<String> },
}

impl PipelineError {
    pub(crate) fn missing_column(column: &str) -> Self {
        PipelineError::SchemaMismatch {
            column: column.to_string(),
            reason: "is absent from the dataset".into(),
        }
    }
}
