//! Cleaned per-entity series.

use super::observation::{FillColumn, Observation};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Observations for one entity, sorted ascending by date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySeries {
    pub entity_id: String,
    pub rows: Vec<Observation>,
}

impl EntitySeries {
    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|o| o.date)
    }
}

/// Output of the cleaner: entity groups in ascending entity order,
/// each sorted by date with fill-eligible nulls carried forward.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleanedSeries {
    groups: Vec<EntitySeries>,
}

impl CleanedSeries {
    pub(crate) fn from_groups(groups: Vec<EntitySeries>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[EntitySeries] {
        &self.groups
    }

    /// All rows in grouped/sorted order.
    pub fn rows(&self) -> impl Iterator<Item = &Observation> {
        self.groups.iter().flat_map(|g| g.rows.iter())
    }

    /// Consume the series, yielding rows in grouped/sorted order.
    pub fn into_rows(self) -> Vec<Observation> {
        self.groups.into_iter().flat_map(|g| g.rows).collect()
    }

    pub fn entity(&self, entity_id: &str) -> Option<&EntitySeries> {
        self.groups.iter().find(|g| g.entity_id == entity_id)
    }

    pub fn entity_ids(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.entity_id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.rows.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum date across every entity.
    pub fn max_date(&self) -> Option<NaiveDate> {
        self.groups.iter().filter_map(|g| g.latest_date()).max()
    }

    /// Nulls left after cleaning, per fill-eligible column.
    pub fn remaining_nulls(&self) -> Vec<(FillColumn, usize)> {
        FillColumn::ALL
            .iter()
            .map(|&col| (col, self.rows().filter(|o| col.get(o).is_none()).count()))
            .collect()
    }
}
