//! Entity allow-list filter and column projection.

use crate::data::{Dataset, ObservationSchema};
use crate::error::PipelineError;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// What the selector keeps: rows whose `entity_column` is in `entities`,
/// projected to `columns` in the given order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionConfig {
    pub entity_column: String,
    pub entities: Vec<String>,
    pub columns: Vec<String>,
}

pub struct Selector;

impl Selector {
    /// Filter and project, preserving input row order.
    ///
    /// Fails with `SchemaMismatch` if the entity column or any listed column
    /// is absent from the input.
    pub fn select(dataset: &Dataset, config: &SelectionConfig) -> Result<Dataset, PipelineError> {
        let frame = dataset.frame();
        ObservationSchema::require_columns(frame, &[config.entity_column.as_str()])?;
        ObservationSchema::require_columns(frame, config.columns.as_slice())?;

        let entity = config.entity_column.as_str();
        let predicate = config
            .entities
            .iter()
            .fold(lit(false), |acc, name| {
                acc.or(col(entity).eq(lit(name.as_str())))
            });
        let projection: Vec<Expr> = config.columns.iter().map(|c| col(c.as_str())).collect();

        let selected = frame
            .clone()
            .lazy()
            .filter(predicate)
            .select(projection)
            .collect()
            .map_err(|e| PipelineError::SchemaMismatch {
                column: config.columns.join(","),
                reason: format!("projection failed: {e}"),
            })?;

        tracing::debug!(
            input_rows = dataset.height(),
            selected_rows = selected.height(),
            entities = config.entities.len(),
            "selection applied"
        );
        Ok(Dataset::new(selected))
    }
}
