//! Post-cleaning summary.

use epitrend_core::domain::CleanedSeries;
use serde::{Deserialize, Serialize};

/// What is left missing after forward-fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningSummary {
    pub rows: usize,
    pub entities: usize,
    /// Remaining nulls per numeric column, fill-eligible columns first.
    pub remaining_by_column: Vec<(String, usize)>,
}

impl CleaningSummary {
    pub fn from_series(series: &CleanedSeries) -> Self {
        let mut remaining_by_column: Vec<(String, usize)> = series
            .remaining_nulls()
            .into_iter()
            .map(|(col, n)| (col.name().to_string(), n))
            .collect();
        remaining_by_column.push((
            "population".into(),
            series.rows().filter(|o| o.population.is_none()).count(),
        ));
        remaining_by_column.push((
            "iso_code".into(),
            series.rows().filter(|o| o.iso_code.is_none()).count(),
        ));

        Self {
            rows: series.len(),
            entities: series.groups().len(),
            remaining_by_column,
        }
    }

    pub fn remaining_total(&self) -> usize {
        self.remaining_by_column.iter().map(|(_, n)| n).sum()
    }
}
