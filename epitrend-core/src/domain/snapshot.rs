//! Point-in-time snapshot with derived ratios.

use super::observation::Observation;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One entity's observation on the snapshot date, plus derived rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRow {
    pub observation: Observation,
    /// `total_deaths / total_cases × 100`, `None` when undefined.
    pub death_rate: Option<f64>,
    /// `people_vaccinated / population × 100`, `None` when undefined.
    pub vaccination_rate: Option<f64>,
}

/// Rows matching the global maximum date of a cleaned series.
///
/// An entity with no observation on that date is absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatestSnapshot {
    pub date: Option<NaiveDate>,
    pub rows: Vec<SnapshotRow>,
}

impl LatestSnapshot {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, entity_id: &str) -> Option<&SnapshotRow> {
        self.rows
            .iter()
            .find(|r| r.observation.entity_id == entity_id)
    }
}
