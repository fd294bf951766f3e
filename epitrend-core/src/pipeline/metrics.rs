//! Snapshot selection and derived ratios.
//!
//! This stage never fails. An undefined ratio is `None`.

use crate::domain::{CleanedSeries, LatestSnapshot, Observation, SnapshotRow};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// `numerator / denominator × 100`, or `None` when either side is null,
/// the denominator is zero, or the result is not finite. Unclamped.
pub fn ratio_pct(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let (n, d) = (numerator?, denominator?);
    if d == 0.0 {
        return None;
    }
    let pct = n / d * 100.0;
    pct.is_finite().then_some(pct)
}

/// A derived percentage for one entity on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatePoint {
    pub entity_id: String,
    pub date: NaiveDate,
    pub rate: f64,
}

pub struct Metrics;

impl Metrics {
    pub fn death_rate(obs: &Observation) -> Option<f64> {
        ratio_pct(obs.total_deaths, obs.total_cases)
    }

    pub fn vaccination_rate(obs: &Observation) -> Option<f64> {
        ratio_pct(obs.people_vaccinated, obs.population)
    }

    /// Snapshot at the global maximum date of the series.
    ///
    /// The maximum is taken over all entities. An entity whose own latest
    /// observation is earlier does not appear.
    pub fn latest_snapshot(series: &CleanedSeries) -> LatestSnapshot {
        match series.max_date() {
            Some(date) => Self::snapshot_at(series, date),
            None => LatestSnapshot::default(),
        }
    }

    /// Every row on `date`, in series order, with derived rates.
    pub fn snapshot_at(series: &CleanedSeries, date: NaiveDate) -> LatestSnapshot {
        let rows: Vec<SnapshotRow> = series
            .rows()
            .filter(|o| o.date == date)
            .map(|o| SnapshotRow {
                death_rate: Self::death_rate(o),
                vaccination_rate: Self::vaccination_rate(o),
                observation: o.clone(),
            })
            .collect();

        let missing: Vec<&str> = series
            .groups()
            .iter()
            .filter(|g| g.latest_date() != Some(date))
            .map(|g| g.entity_id.as_str())
            .collect();
        if !missing.is_empty() {
            tracing::debug!(%date, ?missing, "entities not observed on snapshot date");
        }

        LatestSnapshot {
            date: Some(date),
            rows,
        }
    }

    /// Percentage of population vaccinated over time.
    ///
    /// Rows without `people_vaccinated`, or whose ratio is undefined, are
    /// skipped.
    pub fn vaccination_progress(series: &CleanedSeries) -> Vec<RatePoint> {
        series
            .rows()
            .filter(|o| o.people_vaccinated.is_some())
            .filter_map(|o| {
                Self::vaccination_rate(o).map(|rate| RatePoint {
                    entity_id: o.entity_id.clone(),
                    date: o.date,
                    rate,
                })
            })
            .collect()
    }
}
