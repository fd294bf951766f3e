//! Per-entity date sort and forward-fill.
//!
//! Rows are partitioned by entity, each partition is sorted and filled on
//! its own, and the partitions are concatenated in ascending entity order.
//! Partitions share no state, so they are cleaned in parallel; the result
//! is identical to a sequential pass.

use crate::data::{Dataset, ObservationSchema};
use crate::domain::{CleanedSeries, EntitySeries, FillColumn, Observation};
use crate::error::PipelineError;
use chrono::NaiveDate;
use polars::prelude::*;
use rayon::prelude::*;
use std::collections::BTreeMap;

pub struct Cleaner;

impl Cleaner {
    /// Parse the selected dataset into observations and clean them.
    pub fn clean(
        dataset: &Dataset,
        schema: &ObservationSchema,
    ) -> Result<CleanedSeries, PipelineError> {
        let rows = Self::parse_observations(dataset, schema)?;
        let series = Self::clean_observations(rows);
        tracing::debug!(
            rows = series.len(),
            entities = series.groups().len(),
            "cleaning complete"
        );
        Ok(series)
    }

    /// Convert a table into typed observations, in table order.
    ///
    /// The entity and date columns are required. Numeric columns missing
    /// from the projection read as all-null.
    pub fn parse_observations(
        dataset: &Dataset,
        schema: &ObservationSchema,
    ) -> Result<Vec<Observation>, PipelineError> {
        let frame = schema.conform(dataset.frame())?;
        ObservationSchema::require_columns(
            &frame,
            &[schema.entity_column.as_str(), schema.date_column.as_str()],
        )?;

        let height = frame.height();
        let entities = text_values(&frame, &schema.entity_column)?;
        let dates = text_values(&frame, &schema.date_column)?;
        let iso_codes = match frame.column(&schema.iso_code_column) {
            Ok(_) => text_values(&frame, &schema.iso_code_column)?,
            Err(_) => vec![None; height],
        };
        let mut numeric: Vec<Vec<Option<f64>>> = Vec::with_capacity(FillColumn::ALL.len());
        for col in FillColumn::ALL {
            numeric.push(numeric_values(&frame, col.name(), height)?);
        }
        let population = numeric_values(&frame, &schema.population_column, height)?;

        let mut rows = Vec::with_capacity(height);
        for row in 0..height {
            let date = parse_date(row, dates[row].as_deref())?;
            let entity_id = entities[row].clone().ok_or_else(|| PipelineError::SchemaMismatch {
                column: schema.entity_column.clone(),
                reason: format!("is null at row {row}"),
            })?;

            let mut obs = Observation::empty(entity_id, date);
            obs.iso_code = iso_codes[row].clone();
            for (i, col) in FillColumn::ALL.iter().enumerate() {
                *col.slot_mut(&mut obs) = numeric[i][row];
            }
            obs.population = population[row];
            rows.push(obs);
        }
        Ok(rows)
    }

    /// Partition by entity, sort each partition by date, forward-fill.
    ///
    /// Output is grouped in ascending entity order, not input order.
    pub fn clean_observations(rows: Vec<Observation>) -> CleanedSeries {
        let groups: Vec<EntitySeries> = partition_by_entity(rows)
            .into_par_iter()
            .map(|mut group| {
                // stable: same-date rows keep input order
                group.rows.sort_by_key(|o| o.date);
                forward_fill(&mut group.rows);
                group
            })
            .collect();
        CleanedSeries::from_groups(groups)
    }
}

/// Replace each null in a fill-eligible column with the nearest preceding
/// non-null value. A leading null stays null.
///
/// `rows` must belong to a single entity and already be in date order.
pub fn forward_fill(rows: &mut [Observation]) {
    let mut last_seen: [Option<f64>; FillColumn::ALL.len()] = [None; FillColumn::ALL.len()];
    for obs in rows.iter_mut() {
        for (i, col) in FillColumn::ALL.iter().enumerate() {
            let slot = col.slot_mut(obs);
            match *slot {
                Some(v) => last_seen[i] = Some(v),
                None => *slot = last_seen[i],
            }
        }
    }
}

fn partition_by_entity(rows: Vec<Observation>) -> Vec<EntitySeries> {
    let mut groups: BTreeMap<String, Vec<Observation>> = BTreeMap::new();
    for obs in rows {
        groups.entry(obs.entity_id.clone()).or_default().push(obs);
    }
    groups
        .into_iter()
        .map(|(entity_id, rows)| EntitySeries { entity_id, rows })
        .collect()
}

fn parse_date(row: usize, raw: Option<&str>) -> Result<NaiveDate, PipelineError> {
    raw.and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
        .ok_or_else(|| PipelineError::InvalidDate {
            row,
            value: raw.map(str::to_string),
        })
}

fn text_values(frame: &DataFrame, name: &str) -> Result<Vec<Option<String>>, PipelineError> {
    let column = frame
        .column(name)
        .map_err(|_| PipelineError::missing_column(name))?;
    let series = column
        .as_materialized_series()
        .cast(&DataType::String)
        .map_err(|e| type_error(name, e))?;
    let values = series.str().map_err(|e| type_error(name, e))?;
    Ok(values.into_iter().map(|v| v.map(str::to_string)).collect())
}

fn numeric_values(
    frame: &DataFrame,
    name: &str,
    height: usize,
) -> Result<Vec<Option<f64>>, PipelineError> {
    let Ok(column) = frame.column(name) else {
        return Ok(vec![None; height]);
    };
    let series = column
        .as_materialized_series()
        .cast(&DataType::Float64)
        .map_err(|e| type_error(name, e))?;
    let values = series.f64().map_err(|e| type_error(name, e))?;
    // NaN is a missing value, not a number to carry forward
    Ok(values
        .into_iter()
        .map(|v| v.filter(|x| x.is_finite()))
        .collect())
}

fn type_error(column: &str, e: PolarsError) -> PipelineError {
    PipelineError::SchemaMismatch {
        column: column.to_string(),
        reason: e.to_string(),
    }
}
