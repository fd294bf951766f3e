//! Observation column naming and the canonical polars schema.

use crate::domain::FillColumn;
use crate::error::PipelineError;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Column naming for observation data.
///
/// The numeric column names are fixed by [`FillColumn`] and `population`;
/// the entity and date columns are configurable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationSchema {
    pub entity_column: String,
    pub date_column: String,
    pub iso_code_column: String,
    pub population_column: String,
}

impl Default for ObservationSchema {
    fn default() -> Self {
        Self {
            entity_column: "location".into(),
            date_column: "date".into(),
            iso_code_column: "iso_code".into(),
            population_column: "population".into(),
        }
    }
}

impl ObservationSchema {
    /// Get the canonical observation schema.
    ///
    /// Text columns are `String`; every numeric column is `Float64`.
    pub fn schema(&self) -> Schema {
        let mut fields = vec![
            Field::new(self.date_column.as_str().into(), DataType::String),
            Field::new(self.entity_column.as_str().into(), DataType::String),
            Field::new(self.iso_code_column.as_str().into(), DataType::String),
        ];
        fields.extend(
            FillColumn::ALL
                .iter()
                .map(|c| Field::new(c.name().into(), DataType::Float64)),
        );
        fields.push(Field::new(
            self.population_column.as_str().into(),
            DataType::Float64,
        ));
        Schema::from_iter(fields)
    }

    /// Column order used when no explicit projection is configured.
    pub fn default_columns(&self) -> Vec<String> {
        let mut cols = vec![self.date_column.clone(), self.entity_column.clone()];
        cols.extend(FillColumn::ALL.iter().map(|c| c.name().to_string()));
        cols.push(self.population_column.clone());
        cols.push(self.iso_code_column.clone());
        cols
    }

    /// Fail fast on the first listed column the frame does not carry.
    pub fn require_columns<S: AsRef<str>>(
        frame: &DataFrame,
        columns: &[S],
    ) -> Result<(), PipelineError> {
        for name in columns {
            let name = name.as_ref();
            if frame.column(name).is_err() {
                return Err(PipelineError::missing_column(name));
            }
        }
        Ok(())
    }

    /// Cast every present schema column to its canonical type.
    ///
    /// Columns absent from the frame are left absent. Non-numeric text in a
    /// numeric column becomes null.
    pub fn conform(&self, frame: &DataFrame) -> Result<DataFrame, PipelineError> {
        let expected = self.schema();
        let mut out = frame.clone();
        for field in expected.iter_fields() {
            let name = field.name().as_str();
            let Ok(column) = frame.column(name) else {
                continue;
            };
            if column.dtype() == field.dtype() {
                continue;
            }
            let cast = column
                .as_materialized_series()
                .cast(field.dtype())
                .map_err(|e| PipelineError::SchemaMismatch {
                    column: name.to_string(),
                    reason: format!("cannot be read as {:?}: {e}", field.dtype()),
                })?;
            out.with_column(cast)
                .map_err(|e| PipelineError::SchemaMismatch {
                    column: name.to_string(),
                    reason: e.to_string(),
                })?;
        }
        Ok(out)
    }
}
